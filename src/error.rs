use thiserror::Error;

/// Message shown when the model answered with something that is not a JSON object.
pub const INVALID_RESPONSE_MESSAGE: &str =
    "AI response was not valid JSON. Please try refining your requirements or the prompt.";

#[derive(Debug, Error)]
pub enum FormError {
    // ---- validation: resolved locally, never reach the network ----
    /// Requirements string was empty after trimming
    #[error("Please enter your requirements.")]
    EmptyRequirements,

    /// The page has no fillable controls
    #[error("No forms or detectable fields found on this page.")]
    NoFields,

    /// Controls were detected but all of them are read-only or unaddressable
    #[error("No editable fields with an id or name were found on this page.")]
    NoRelevantFields,

    // ---- transport ----
    /// Endpoint unreachable or the HTTP exchange broke down
    #[error("Failed to reach the model endpoint: {0}")]
    Transport(String),

    /// Endpoint answered with a non-success status
    #[error("Gemini API error: {status} - {message}")]
    Upstream { status: u16, message: String },

    // ---- response shape ----
    /// The envelope carried no generated text
    #[error("No text generated by the model. Please try refining your requirements or the prompt.")]
    EmptyGeneration,

    /// Generated text held no parsable JSON object
    #[error("{}", INVALID_RESPONSE_MESSAGE)]
    InvalidResponse { raw: String },

    // ---- plumbing ----
    /// JSON parsing failed (message line, value map, envelope)
    #[error("JSON parse error ({context}): {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization failed (outgoing message, field list)
    #[error("JSON serialize error ({context}): {source}")]
    JsonSerialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Reading or writing a message channel failed
    #[error("Channel I/O error: {0}")]
    ChannelIo(String),

    /// A handler received an action it does not serve
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// Writing live control state back into HTML failed
    #[error("Failed to render page: {0}")]
    Render(String),

    /// Reading or writing a local file failed
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl FormError {
    /// Validation errors are resolved locally and never touched the network.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            FormError::EmptyRequirements | FormError::NoFields | FormError::NoRelevantFields
        )
    }
}
