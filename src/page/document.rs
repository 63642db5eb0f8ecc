use std::collections::HashMap;
use std::path::Path;

use scraper::{ElementRef, Html, Node};
use tracing::debug;

use crate::error::FormError;
use crate::page::control::{
    Checkable, ControlElement, ControlTag, FormPage, ReadableValue, SelectableOptions,
    collapse_whitespace,
};
use crate::page::page_model::{ControlRef, DomEvent, EventKind, FieldKind, FieldOption};

/// Input types the DOM `type` property reports as-is. Anything else reads as `text`.
const KNOWN_INPUT_TYPES: &[&str] = &[
    "text", "email", "password", "search", "number", "tel", "url", "date", "time",
    "datetime-local", "month", "week", "range", "color", "file", "hidden", "submit",
    "button", "reset", "image", "radio", "checkbox",
];

#[derive(Debug, Clone)]
pub(crate) struct OptionState {
    pub text: String,
    pub value: String,
    pub selected: bool,
}

/// Live state of one control plus the label context captured at parse time.
#[derive(Debug, Clone)]
pub(crate) struct ControlState {
    pub element: ControlElement,
    pub value: String,
    pub checked: bool,
    pub options: Vec<OptionState>,
    preceding_text: Option<String>,
    parent_text: Option<String>,
    enclosing_label: Option<String>,
}

/// An HTML document whose form controls carry live, mutable state.
///
/// Structure (labels, sibling text, ids) is read once with `scraper`; values,
/// checked flags and selections live in a side table indexed by `ControlRef`
/// so the applier can mutate them. `render_html` writes that table back into
/// the source markup.
#[derive(Debug, Clone)]
pub struct HtmlPage {
    source: String,
    pub(crate) controls: Vec<ControlState>,
    labels: HashMap<String, String>,
    id_text: HashMap<String, String>,
    events: Vec<DomEvent>,
}

impl HtmlPage {
    pub fn parse(source: &str) -> Self {
        let html = Html::parse_document(source);
        let mut controls = Vec::new();
        let mut labels = HashMap::new();
        let mut id_text = HashMap::new();

        for node in html.tree.root().descendants() {
            let Some(el) = ElementRef::wrap(node) else {
                continue;
            };

            if let Some(id) = el.value().attr("id").filter(|id| !id.is_empty()) {
                id_text
                    .entry(id.to_string())
                    .or_insert_with(|| text_content(el));
            }

            match el.value().name() {
                "label" => {
                    if let Some(target) = el.value().attr("for").filter(|f| !f.is_empty()) {
                        labels
                            .entry(target.to_string())
                            .or_insert_with(|| text_content(el));
                    }
                }
                "input" | "textarea" | "select" => controls.push(read_control(el)),
                _ => {}
            }
        }

        debug!(controls = controls.len(), labels = labels.len(), "parsed page");

        Self {
            source: source.to_string(),
            controls,
            labels,
            id_text,
            events: Vec::new(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, FormError> {
        let source = std::fs::read_to_string(path).map_err(|e| FormError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Self::parse(&source))
    }

    /// Markup the page was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Notifications dispatched so far, oldest first.
    pub fn events(&self) -> &[DomEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<DomEvent> {
        std::mem::take(&mut self.events)
    }

    fn state(&self, control: ControlRef) -> &ControlState {
        &self.controls[control.0]
    }

    fn state_mut(&mut self, control: ControlRef) -> &mut ControlState {
        &mut self.controls[control.0]
    }
}

// ============================================================================
// Parsing helpers
// ============================================================================

fn text_content(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

fn non_empty_attr(el: ElementRef<'_>, name: &str) -> Option<String> {
    el.value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn numeric_attr(el: ElementRef<'_>, name: &str) -> Option<u32> {
    el.value().attr(name).and_then(|v| v.trim().parse().ok())
}

fn preceding_sibling_text(el: ElementRef<'_>) -> Option<String> {
    let mut sibling = el.prev_sibling();
    while let Some(node) = sibling {
        if let Node::Text(text) = node.value() {
            let collapsed = collapse_whitespace(text);
            if !collapsed.is_empty() {
                return Some(collapsed);
            }
        }
        sibling = node.prev_sibling();
    }
    None
}

fn read_control(el: ElementRef<'_>) -> ControlState {
    let attrs = el.value();
    let tag = match attrs.name() {
        "textarea" => ControlTag::Textarea,
        "select" => ControlTag::Select,
        _ => ControlTag::Input,
    };

    let input_type = match tag {
        ControlTag::Textarea => "textarea".to_string(),
        ControlTag::Select if attrs.attr("multiple").is_some() => "select-multiple".to_string(),
        ControlTag::Select => "select-one".to_string(),
        ControlTag::Input => {
            let raw = attrs.attr("type").unwrap_or("text").trim().to_lowercase();
            if KNOWN_INPUT_TYPES.contains(&raw.as_str()) {
                raw
            } else {
                "text".to_string()
            }
        }
    };

    let element = ControlElement {
        tag,
        input_type,
        id: attrs.attr("id").unwrap_or_default().to_string(),
        name: attrs.attr("name").unwrap_or_default().to_string(),
        placeholder: attrs.attr("placeholder").unwrap_or_default().trim().to_string(),
        required: attrs.attr("required").is_some(),
        read_only: attrs.attr("readonly").is_some(),
        min_length: numeric_attr(el, "minlength"),
        max_length: numeric_attr(el, "maxlength"),
        pattern: attrs.attr("pattern").map(str::to_string),
        aria_label: non_empty_attr(el, "aria-label"),
        aria_labelledby: non_empty_attr(el, "aria-labelledby"),
    };

    let mut options: Vec<OptionState> = if tag == ControlTag::Select {
        el.descendants()
            .filter_map(ElementRef::wrap)
            .filter(|o| o.value().name() == "option")
            .map(|o| {
                let text = text_content(o);
                OptionState {
                    value: o.value().attr("value").map(str::to_string).unwrap_or_else(|| text.clone()),
                    text,
                    selected: o.value().attr("selected").is_some(),
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    // A single-choice select keeps only the last option marked selected
    if element.input_type == "select-one" {
        if let Some(last) = options.iter().rposition(|o| o.selected) {
            for option in &mut options[..last] {
                option.selected = false;
            }
        }
    }

    let value = match element.kind() {
        FieldKind::Textarea => el.text().collect::<String>(),
        FieldKind::Select => options
            .iter()
            .find(|o| o.selected)
            .or_else(|| {
                if element.input_type == "select-one" {
                    options.first()
                } else {
                    None
                }
            })
            .map(|o| o.value.clone())
            .unwrap_or_default(),
        FieldKind::Radio | FieldKind::Checkbox => attrs.attr("value").unwrap_or("on").to_string(),
        FieldKind::TextLike => attrs.attr("value").unwrap_or_default().to_string(),
    };

    ControlState {
        checked: attrs.attr("checked").is_some(),
        preceding_text: preceding_sibling_text(el),
        parent_text: el.parent().and_then(ElementRef::wrap).map(text_content),
        enclosing_label: el
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|a| a.value().name() == "label")
            .map(text_content),
        element,
        value,
        options,
    }
}

// ============================================================================
// FormPage implementation
// ============================================================================

impl ReadableValue for HtmlPage {
    fn value(&self, control: ControlRef) -> String {
        self.state(control).value.clone()
    }

    fn set_value(&mut self, control: ControlRef, value: &str) {
        let state = self.state_mut(control);
        state.value = value.to_string();

        if state.element.tag == ControlTag::Select {
            let mut matched = false;
            for option in &mut state.options {
                option.selected = !matched && option.value == value;
                matched |= option.selected;
            }
        }
    }
}

impl SelectableOptions for HtmlPage {
    fn options(&self, control: ControlRef) -> Vec<FieldOption> {
        self.state(control)
            .options
            .iter()
            .map(|o| FieldOption::new(&o.text, &o.value))
            .collect()
    }
}

impl Checkable for HtmlPage {
    fn is_checked(&self, control: ControlRef) -> bool {
        self.state(control).checked
    }

    fn set_checked(&mut self, control: ControlRef, checked: bool) {
        let element = self.state(control).element.clone();

        // Checking a radio unchecks the rest of its group
        if checked && element.kind() == FieldKind::Radio && !element.name.is_empty() {
            for other in self.radio_group(&element.name) {
                self.state_mut(other).checked = false;
            }
        }

        self.state_mut(control).checked = checked;
    }
}

impl FormPage for HtmlPage {
    fn controls(&self) -> Vec<ControlRef> {
        (0..self.controls.len()).map(ControlRef).collect()
    }

    fn element(&self, control: ControlRef) -> &ControlElement {
        &self.state(control).element
    }

    fn find_by_id(&self, id: &str) -> Option<ControlRef> {
        self.controls
            .iter()
            .position(|c| !id.is_empty() && c.element.id == id)
            .map(ControlRef)
    }

    fn find_by_name(&self, name: &str) -> Option<ControlRef> {
        self.controls
            .iter()
            .position(|c| !name.is_empty() && c.element.name == name)
            .map(ControlRef)
    }

    fn label_for(&self, id: &str) -> Option<String> {
        self.labels.get(id).cloned()
    }

    fn text_of_id(&self, id: &str) -> Option<String> {
        self.id_text.get(id).cloned()
    }

    fn preceding_text(&self, control: ControlRef) -> Option<String> {
        self.state(control).preceding_text.clone()
    }

    fn parent_text(&self, control: ControlRef) -> Option<String> {
        self.state(control).parent_text.clone()
    }

    fn enclosing_label(&self, control: ControlRef) -> Option<String> {
        self.state(control).enclosing_label.clone()
    }

    fn dispatch(&mut self, control: ControlRef, kind: EventKind) {
        debug!(control = control.0, ?kind, "dispatch");
        self.events.push(DomEvent {
            target: control,
            kind,
            bubbles: true,
        });
    }
}
