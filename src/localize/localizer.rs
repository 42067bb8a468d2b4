use tracing::warn;

use super::script;
use super::translator::Translate;

/// Decides whether an entry needs translation and produces the
/// delivery-ready summary.
pub struct Localizer {
    translator: Box<dyn Translate>,
    source_lang: String,
    target_lang: String,
}

impl Localizer {
    pub fn new(translator: Box<dyn Translate>, source_lang: String, target_lang: String) -> Self {
        Self {
            translator,
            source_lang,
            target_lang,
        }
    }

    /// The decision runs over the combined title+summary text; the translated
    /// payload is the summary alone. Translation failure falls back to the
    /// original summary and never blocks delivery.
    pub fn localize_summary(&self, combined_text: &str, summary: &str) -> String {
        if script::contains_japanese(combined_text) {
            return summary.to_string();
        }

        match self
            .translator
            .translate(summary, &self.source_lang, &self.target_lang)
        {
            Ok(translated) => translated,
            Err(e) => {
                warn!(error = %e, "translation failed, delivering original text");
                summary.to_string()
            }
        }
    }
}
