pub mod admin_service;
pub mod import_export_service;
pub mod notification_service;
pub mod pipeline_service;

pub use admin_service::AdminService;
pub use import_export_service::{ImportExportService, ImportResult};
pub use notification_service::{Notify, SlackNotifier};
pub use pipeline_service::{PipelineService, RunPipeline, RunReport};
