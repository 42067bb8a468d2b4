pub mod script;
pub mod translator;
pub mod localizer;

pub use localizer::Localizer;
pub use translator::{HttpTranslator, PassthroughTranslator, Translate};

#[cfg(test)]
pub use translator::MockTranslate;
