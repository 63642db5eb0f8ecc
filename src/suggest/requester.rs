use tracing::{debug, info, warn};

use crate::error::FormError;
use crate::fields::extractor::relevant_fields;
use crate::page::page_model::{FieldDescriptor, SuggestionMap};
use crate::suggest::backend::TextGeneration;
use crate::suggest::prompt::build_prompt;
use crate::suggest::response::parse_suggestions;

/// Turns a field list plus free-text requirements into a suggestion map
/// with exactly one backend call.
pub struct SuggestionRequester {
    backend: Box<dyn TextGeneration>,
}

impl SuggestionRequester {
    pub fn new(backend: Box<dyn TextGeneration>) -> Self {
        Self { backend }
    }

    pub fn request_suggestions(
        &self,
        fields: &[FieldDescriptor],
        requirements: &str,
    ) -> Result<SuggestionMap, FormError> {
        if requirements.trim().is_empty() {
            return Err(FormError::EmptyRequirements);
        }

        let relevant = relevant_fields(fields);
        debug!(detected = fields.len(), relevant = relevant.len(), "filtered fields for prompt");
        if relevant.is_empty() {
            return Err(FormError::NoRelevantFields);
        }

        let prompt = build_prompt(&relevant, requirements)?;
        let text = self.backend.generate(&prompt)?;

        match parse_suggestions(&text) {
            Ok(suggestions) => {
                info!(suggested = suggestions.len(), "received suggestions");
                Ok(suggestions)
            }
            Err(e) => {
                warn!(raw = %text, "model response was not a JSON object");
                Err(e)
            }
        }
    }
}
