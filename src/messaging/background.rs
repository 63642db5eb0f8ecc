use tracing::{error, info};

use crate::messaging::message::{MessageHandler, Request, Response};
use crate::suggest::requester::SuggestionRequester;

/// Background side: owns the model credentials and answers
/// `processFormWithAI`. Nothing else is served here.
pub struct Background {
    requester: SuggestionRequester,
}

impl Background {
    pub fn new(requester: SuggestionRequester) -> Self {
        Self { requester }
    }
}

impl MessageHandler for Background {
    fn handle(&mut self, request: Request) -> Response {
        match request {
            Request::ProcessFormWithAi {
                fields,
                requirements,
            } => {
                info!(fields = fields.len(), "processing form with model");
                match self.requester.request_suggestions(&fields, &requirements) {
                    Ok(values) => Response::filled(values),
                    Err(e) if e.is_validation() => Response::from_error(&e),
                    Err(e) => {
                        error!(error = %e, "suggestion request failed");
                        Response::failure(format!("Failed to get AI suggestions: {}", e))
                    }
                }
            }
            other => Response::failure(format!("Unknown action: {}", other.action())),
        }
    }
}
