use tracing::{error, info};

use crate::apply::applier::{ApplyReport, apply_values};
use crate::error::FormError;
use crate::fields::extractor::extract_fields;
use crate::messaging::channel::MessageChannel;
use crate::messaging::message::{MessageHandler, Request, Response};
use crate::page::control::FormPage;
use crate::page::page_model::ApplyMap;

const NO_SUGGESTIONS_MESSAGE: &str = "AI failed to provide valid suggestions.";

/// Page side: the only component that reads or mutates the page. Relays
/// suggestion requests to the background over its channel.
pub struct ContentScript<P, C> {
    page: P,
    background: C,
    last_report: Option<ApplyReport>,
}

impl<P: FormPage, C: MessageChannel> ContentScript<P, C> {
    pub fn new(page: P, background: C) -> Self {
        Self {
            page,
            background,
            last_report: None,
        }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn into_page(self) -> P {
        self.page
    }

    /// Outcome of the most recent `fillForm`.
    pub fn last_report(&self) -> Option<&ApplyReport> {
        self.last_report.as_ref()
    }

    fn suggest(&mut self, requirements: String) -> Response {
        let fields = extract_fields(&self.page);
        if fields.is_empty() {
            return Response::from_error(&FormError::NoFields);
        }

        info!(fields = fields.len(), "requesting suggestions from background");
        let reply = self.background.send(Request::ProcessFormWithAi {
            fields: fields.clone(),
            requirements,
        });

        match reply {
            Ok(Response {
                success: true,
                filled_values: Some(values),
                ..
            }) => Response::suggested(values, fields),
            Ok(reply) => Response::failure(reply.message_or(NO_SUGGESTIONS_MESSAGE)),
            Err(e) => {
                error!(error = %e, "background channel failed");
                Response::failure(format!("Content script error: {}", e))
            }
        }
    }

    fn fill(&mut self, values: ApplyMap) -> Response {
        let report = apply_values(&mut self.page, &values);
        let response = Response::ok(report.summary());
        self.last_report = Some(report);
        response
    }
}

impl<P: FormPage, C: MessageChannel> MessageHandler for ContentScript<P, C> {
    fn handle(&mut self, request: Request) -> Response {
        match request {
            Request::GetAiSuggestions { requirements } => self.suggest(requirements),
            Request::FillForm { values } => self.fill(values),
            other => Response::failure(format!("Unknown action: {}", other.action())),
        }
    }
}
