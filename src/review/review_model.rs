use crate::apply::applier::is_truthy;
use crate::page::page_model::{ApplyMap, FieldDescriptor, FieldKind, FieldOption, SuggestionMap};

// ============================================================================
// Status line
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// The one human-readable message shown after every stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub message: String,
    pub kind: StatusKind,
}

impl Status {
    pub fn info(message: impl Into<String>) -> Self {
        Self { message: message.into(), kind: StatusKind::Info }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { message: message.into(), kind: StatusKind::Success }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { message: message.into(), kind: StatusKind::Error }
    }

    pub fn ready() -> Self {
        Self::info("Ready.")
    }

    pub fn is_success(&self) -> bool {
        self.kind == StatusKind::Success
    }

    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

// ============================================================================
// Review rows
// ============================================================================

/// Editable control of a review row, mirroring the field's kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowControl {
    Select { options: Vec<FieldOption>, value: String },
    Checkbox { checked: bool },
    /// Radios are edited here too, as the value of the option to select
    Text { value: String, input_type: String, multiline: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRow {
    pub field_id: String,
    pub label: String,
    pub control: RowControl,
}

impl ReviewRow {
    pub fn from_field(field: &FieldDescriptor, suggestion: Option<&str>) -> Self {
        let suggested = suggestion.unwrap_or_default();

        let control = match field.kind {
            FieldKind::Select if !field.options.is_empty() => RowControl::Select {
                value: match_option(&field.options, suggested),
                options: field.options.clone(),
            },
            FieldKind::Checkbox => RowControl::Checkbox {
                checked: is_truthy(suggested),
            },
            FieldKind::Textarea => RowControl::Text {
                value: suggested.to_string(),
                input_type: "textarea".to_string(),
                multiline: true,
            },
            FieldKind::Radio | FieldKind::Select => RowControl::Text {
                value: suggested.to_string(),
                input_type: "text".to_string(),
                multiline: false,
            },
            FieldKind::TextLike => RowControl::Text {
                value: suggested.to_string(),
                input_type: match field.input_type.as_str() {
                    "password" | "hidden" => "text".to_string(),
                    other => other.to_string(),
                },
                multiline: false,
            },
        };

        Self {
            field_id: field.identifier.clone(),
            label: row_label(field),
            control,
        }
    }

    /// Value this row contributes to the apply map.
    pub fn value(&self) -> String {
        match &self.control {
            RowControl::Select { value, .. } => value.clone(),
            RowControl::Checkbox { checked } => checked.to_string(),
            RowControl::Text { value, .. } => value.clone(),
        }
    }

    /// Edit the row the way its control would accept input.
    pub fn set_value(&mut self, input: &str) {
        match &mut self.control {
            RowControl::Select { options, value } => *value = match_option(options, input),
            RowControl::Checkbox { checked } => *checked = is_truthy(input),
            RowControl::Text { value, .. } => *value = input.to_string(),
        }
    }
}

/// A select only holds one of its option values; anything else reads as empty.
fn match_option(options: &[FieldOption], input: &str) -> String {
    options
        .iter()
        .find(|o| o.value == input || o.text == input)
        .map(|o| o.value.clone())
        .unwrap_or_default()
}

fn row_label(field: &FieldDescriptor) -> String {
    let base = [&field.label, &field.placeholder, &field.name, &field.id]
        .into_iter()
        .find(|s| !s.is_empty())
        .map(String::as_str)
        .unwrap_or("Unknown Field");

    if field.constraints.required {
        format!("{} (Required)", base)
    } else {
        base.to_string()
    }
}

// ============================================================================
// Review session
// ============================================================================

/// Everything one review cycle needs, from a successful analyze to fill or
/// cancel. Created fresh per analysis, never shared across cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSession {
    pub fields: Vec<FieldDescriptor>,
    pub suggestions: SuggestionMap,
    pub rows: Vec<ReviewRow>,
}

impl ReviewSession {
    pub fn new(fields: Vec<FieldDescriptor>, suggestions: SuggestionMap) -> Self {
        let rows = fields
            .iter()
            .filter(|f| !f.identifier.is_empty())
            .map(|f| ReviewRow::from_field(f, suggestions.get(&f.identifier).map(String::as_str)))
            .collect();

        Self {
            fields,
            suggestions,
            rows,
        }
    }

    pub fn row(&self, field_id: &str) -> Option<&ReviewRow> {
        self.rows.iter().find(|r| r.field_id == field_id)
    }

    /// Edit a row by field identifier. Returns false if no such row.
    pub fn set_value(&mut self, field_id: &str, value: &str) -> bool {
        match self.rows.iter_mut().find(|r| r.field_id == field_id) {
            Some(row) => {
                row.set_value(value);
                true
            }
            None => false,
        }
    }

    /// Collect every row into the map handed to the applier.
    pub fn apply_map(&self) -> ApplyMap {
        self.rows
            .iter()
            .map(|r| (r.field_id.clone(), r.value()))
            .collect()
    }
}
