use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Identifier → suggested value, as produced by one model call.
pub type SuggestionMap = BTreeMap<String, String>;

/// Identifier → value confirmed by the user, written back to the page.
pub type ApplyMap = BTreeMap<String, String>;

// ============================================================================
// Field descriptors (serialized into the prompt and the review session)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    TextLike,
    Textarea,
    Select,
    Radio,
    Checkbox,
}

/// One `(displayText, value)` pair of a select or radio group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub text: String,
    pub value: String,
}

impl FieldOption {
    pub fn new(text: &str, value: &str) -> Self {
        Self {
            text: text.to_string(),
            value: value.to_string(),
        }
    }
}

/// Validation attributes. Each entry is present only when the control's
/// type supports it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConstraints {
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// Normalized description of one form control (or one radio group).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Element id if present, else the name attribute. Map key for suggestions.
    pub identifier: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub kind: FieldKind,
    #[serde(rename = "type")]
    pub input_type: String,
    pub tag_name: String,
    pub label: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub current_value: String,
    #[serde(flatten)]
    pub constraints: FieldConstraints,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
}

impl FieldDescriptor {
    pub fn is_read_only(&self) -> bool {
        self.constraints.read_only.unwrap_or(false)
    }

    /// Eligible to be sent to the model: addressable and editable.
    pub fn is_relevant(&self) -> bool {
        !self.identifier.is_empty() && !self.is_read_only()
    }
}

// ============================================================================
// Notifications emitted on mutated controls
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Input,
    Change,
}

/// Handle to one form control inside a page, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ControlRef(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomEvent {
    pub target: ControlRef,
    pub kind: EventKind,
    pub bubbles: bool,
}
