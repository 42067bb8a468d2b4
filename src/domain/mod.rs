pub mod settings;
pub mod entry;
pub mod notification;

pub use settings::Settings;
pub use entry::FeedEntry;
pub use notification::Notification;
