use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::FormError;

pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// A hosted text-completion service: prompt in, free text out.
pub trait TextGeneration {
    fn generate(&self, prompt: &str) -> Result<String, FormError>;
}

// ============================================================================
// Gemini Backend
// ============================================================================

pub struct GeminiBackend {
    pub endpoint: String,
    pub model: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TextPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl GeminiBackend {
    pub fn new(endpoint: &str, model: &str, api_key: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.endpoint, self.model, self.api_key
        )
    }
}

impl TextGeneration for GeminiBackend {
    fn generate(&self, prompt: &str) -> Result<String, FormError> {
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![TextPart {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        // The call is made exactly once and never times out on our side
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<std::time::Duration>)
            .build()
            .map_err(|e| FormError::Transport(e.to_string()))?;

        debug!(model = %self.model, prompt_chars = prompt.len(), "sending generateContent");

        let response = client
            .post(self.url())
            .json(&request)
            .send()
            .map_err(|e| FormError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| FormError::Transport(e.to_string()))?;

        parse_envelope(status, &body)
    }
}

/// Turn a `generateContent` HTTP exchange into the generated text.
///
/// Non-2xx statuses carry `error.message`; success carries the text of the
/// first candidate's first part.
pub fn parse_envelope(status: u16, body: &str) -> Result<String, FormError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<GeminiError>(body)
            .ok()
            .and_then(|e| e.error.message)
            .filter(|m| !m.is_empty())
            .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
            .unwrap_or_else(|| "Unknown error".to_string());
        warn!(status, %message, "model endpoint returned an error");
        return Err(FormError::Upstream { status, message });
    }

    let envelope: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| FormError::JsonParse {
            context: "generateContent response".into(),
            source: e,
        })?;

    envelope
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .filter(|t| !t.trim().is_empty())
        .ok_or(FormError::EmptyGeneration)
}

// ============================================================================
// Mock Backend (for testing without a model)
// ============================================================================

pub struct MockTextGeneration {
    pub response: String,
}

impl MockTextGeneration {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
        }
    }
}

impl TextGeneration for MockTextGeneration {
    fn generate(&self, _prompt: &str) -> Result<String, FormError> {
        Ok(self.response.clone())
    }
}

impl<T: TextGeneration + ?Sized> TextGeneration for Box<T> {
    fn generate(&self, prompt: &str) -> Result<String, FormError> {
        (**self).generate(prompt)
    }
}
