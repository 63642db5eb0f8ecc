use serde::{Deserialize, Serialize};

use crate::error::FormError;
use crate::page::page_model::{ApplyMap, FieldDescriptor, SuggestionMap};

/// One-shot request exchanged between the controller, the content side and
/// the background side. Serialized as `{"action": "...", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Request {
    /// Content → background: suggest values for these fields
    #[serde(rename = "processFormWithAI")]
    ProcessFormWithAi {
        fields: Vec<FieldDescriptor>,
        requirements: String,
    },

    /// Controller → content: extract fields and fetch suggestions
    #[serde(rename = "getAISuggestions")]
    GetAiSuggestions { requirements: String },

    /// Controller → content: write the confirmed values
    #[serde(rename = "fillForm")]
    FillForm { values: ApplyMap },
}

impl Request {
    pub fn action(&self) -> &'static str {
        match self {
            Request::ProcessFormWithAi { .. } => "processFormWithAI",
            Request::GetAiSuggestions { .. } => "getAISuggestions",
            Request::FillForm { .. } => "fillForm",
        }
    }
}

/// The single reply to a `Request`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filled_values: Option<SuggestionMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_values: Option<SuggestionMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_fields: Option<Vec<FieldDescriptor>>,
}

impl Response {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn from_error(error: &FormError) -> Self {
        Self::failure(error.to_string())
    }

    /// Reply to `processFormWithAI`.
    pub fn filled(values: SuggestionMap) -> Self {
        Self {
            success: true,
            filled_values: Some(values),
            ..Self::default()
        }
    }

    /// Reply to `getAISuggestions`.
    pub fn suggested(values: SuggestionMap, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            success: true,
            suggested_values: Some(values),
            detected_fields: Some(fields),
            ..Self::default()
        }
    }

    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.message.as_deref().unwrap_or(fallback)
    }
}

/// Anything that answers requests: the content side, the background side.
pub trait MessageHandler {
    fn handle(&mut self, request: Request) -> Response;
}

/// Parse one message, turning an unrecognised `action` into a readable error.
pub fn parse_request(line: &str) -> Result<Request, FormError> {
    let value: serde_json::Value =
        serde_json::from_str(line).map_err(|e| FormError::JsonParse {
            context: "request line".into(),
            source: e,
        })?;

    let action = value
        .get("action")
        .and_then(|a| a.as_str())
        .unwrap_or_default()
        .to_string();

    if !matches!(action.as_str(), "processFormWithAI" | "getAISuggestions" | "fillForm") {
        return Err(FormError::UnknownAction(action));
    }

    serde_json::from_value(value).map_err(|e| FormError::JsonParse {
        context: format!("{} payload", action),
        source: e,
    })
}
