use crate::page::page_model::{ControlRef, EventKind, FieldKind, FieldOption};

// ============================================================================
// Static attributes of a control
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlTag {
    Input,
    Textarea,
    Select,
}

impl ControlTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlTag::Input => "input",
            ControlTag::Textarea => "textarea",
            ControlTag::Select => "select",
        }
    }
}

/// Typed view of the attributes the extractor and applier care about.
/// `input_type` follows the DOM `type` property: unknown input types read as
/// `text`, textareas as `textarea`, selects as `select-one`/`select-multiple`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlElement {
    pub tag: ControlTag,
    pub input_type: String,
    pub id: String,
    pub name: String,
    pub placeholder: String,
    pub required: bool,
    pub read_only: bool,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub pattern: Option<String>,
    pub aria_label: Option<String>,
    pub aria_labelledby: Option<String>,
}

/// Input types that never hold user data.
const EXCLUDED_INPUT_TYPES: &[&str] = &["hidden", "submit", "button", "reset", "image"];

/// Input types that carry the `pattern` attribute.
const PATTERN_INPUT_TYPES: &[&str] = &["text", "search", "url", "tel", "email", "password"];

impl ControlElement {
    pub fn kind(&self) -> FieldKind {
        match self.tag {
            ControlTag::Textarea => FieldKind::Textarea,
            ControlTag::Select => FieldKind::Select,
            ControlTag::Input => match self.input_type.as_str() {
                "radio" => FieldKind::Radio,
                "checkbox" => FieldKind::Checkbox,
                _ => FieldKind::TextLike,
            },
        }
    }

    /// Element id, else name. Empty when the control has neither.
    pub fn identifier(&self) -> &str {
        if self.id.is_empty() { &self.name } else { &self.id }
    }

    /// Whether the extractor should describe this control at all.
    pub fn is_fillable(&self) -> bool {
        self.tag != ControlTag::Input || !EXCLUDED_INPUT_TYPES.contains(&self.input_type.as_str())
    }

    pub fn supports_length(&self) -> bool {
        matches!(self.kind(), FieldKind::TextLike | FieldKind::Textarea)
    }

    pub fn supports_pattern(&self) -> bool {
        self.tag == ControlTag::Input && PATTERN_INPUT_TYPES.contains(&self.input_type.as_str())
    }
}

// ============================================================================
// Capabilities
// ============================================================================

/// Controls whose state is a text value (text-like inputs, textareas, selects).
pub trait ReadableValue {
    fn value(&self, control: ControlRef) -> String;
    fn set_value(&mut self, control: ControlRef, value: &str);
}

/// Controls that expose a list of choices (selects).
pub trait SelectableOptions {
    fn options(&self, control: ControlRef) -> Vec<FieldOption>;
}

/// Controls with a checked state (radios, checkboxes).
pub trait Checkable {
    fn is_checked(&self, control: ControlRef) -> bool;
    fn set_checked(&mut self, control: ControlRef, checked: bool);
}

/// The DOM surface the extractor and applier run against.
pub trait FormPage: ReadableValue + SelectableOptions + Checkable {
    /// Every input, textarea and select in document order, fillable or not.
    fn controls(&self) -> Vec<ControlRef>;

    fn element(&self, control: ControlRef) -> &ControlElement;

    fn find_by_id(&self, id: &str) -> Option<ControlRef>;

    /// First control whose name attribute matches.
    fn find_by_name(&self, name: &str) -> Option<ControlRef>;

    /// Text of the first `<label for=id>`.
    fn label_for(&self, id: &str) -> Option<String>;

    /// Text content of any element carrying this id (for `aria-labelledby`).
    fn text_of_id(&self, id: &str) -> Option<String>;

    /// Nearest preceding sibling text node with visible content.
    fn preceding_text(&self, control: ControlRef) -> Option<String>;

    /// Whitespace-collapsed text content of the control's parent element.
    fn parent_text(&self, control: ControlRef) -> Option<String>;

    /// Text of the nearest `<label>` wrapping the control.
    fn enclosing_label(&self, control: ControlRef) -> Option<String>;

    /// Fire a bubbling notification on the control.
    fn dispatch(&mut self, control: ControlRef, kind: EventKind);

    /// Radio controls sharing a name, in document order.
    fn radio_group(&self, name: &str) -> Vec<ControlRef> {
        self.controls()
            .into_iter()
            .filter(|c| {
                let el = self.element(*c);
                el.kind() == FieldKind::Radio && el.name == name
            })
            .collect()
    }
}

// ============================================================================
// Typed view per control kind
// ============================================================================

/// A resolved write target. Radios resolve to their whole group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    TextLike(ControlRef),
    Select(ControlRef),
    RadioGroup { name: String, members: Vec<ControlRef> },
    Checkbox(ControlRef),
}

impl Control {
    pub fn resolve<P: FormPage + ?Sized>(page: &P, control: ControlRef) -> Control {
        let el = page.element(control);
        match el.kind() {
            FieldKind::Select => Control::Select(control),
            FieldKind::Checkbox => Control::Checkbox(control),
            FieldKind::Radio if !el.name.is_empty() => Control::RadioGroup {
                name: el.name.clone(),
                members: page.radio_group(&el.name),
            },
            // A nameless radio is its own group
            FieldKind::Radio => Control::RadioGroup {
                name: String::new(),
                members: vec![control],
            },
            FieldKind::TextLike | FieldKind::Textarea => Control::TextLike(control),
        }
    }
}

/// Collapse runs of whitespace and trim, the way rendered label text reads.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
