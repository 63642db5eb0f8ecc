use std::collections::HashSet;

use tracing::debug;

use crate::fields::label::resolve_label;
use crate::page::control::FormPage;
use crate::page::page_model::{ControlRef, FieldConstraints, FieldDescriptor, FieldKind, FieldOption};

// ============================================================================
// Extraction
// ============================================================================

/// Describe every fillable control on the page, in document order.
///
/// Reads live state only; the page is not touched. Radio controls sharing a
/// name collapse into one descriptor placed at the group's first member.
pub fn extract_fields<P: FormPage + ?Sized>(page: &P) -> Vec<FieldDescriptor> {
    let mut fields = Vec::new();
    let mut seen_groups: HashSet<String> = HashSet::new();

    for control in page.controls() {
        let el = page.element(control);
        if !el.is_fillable() {
            continue;
        }

        // Later members of an already described group
        if el.kind() == FieldKind::Radio
            && !el.name.is_empty()
            && !seen_groups.insert(el.name.clone())
        {
            continue;
        }

        fields.push(describe_control(page, control));
    }

    debug!(fields = fields.len(), "extracted form fields");
    fields
}

/// Build the descriptor for a single control.
pub fn describe_control<P: FormPage + ?Sized>(page: &P, control: ControlRef) -> FieldDescriptor {
    let el = page.element(control);
    let kind = el.kind();
    let (label, _source) = resolve_label(page, control);

    let (current_value, options) = match kind {
        FieldKind::Select => (page.value(control), page.options(control)),
        FieldKind::Checkbox => (page.is_checked(control).to_string(), Vec::new()),
        FieldKind::Radio => radio_group_state(page, control),
        FieldKind::TextLike | FieldKind::Textarea => (page.value(control), Vec::new()),
    };

    let supports_length = el.supports_length();
    let constraints = FieldConstraints {
        required: el.required,
        read_only: supports_length.then_some(el.read_only),
        min_length: el.min_length.filter(|_| supports_length),
        max_length: el.max_length.filter(|_| supports_length),
        pattern: el.pattern.clone().filter(|_| el.supports_pattern()),
    };

    FieldDescriptor {
        identifier: el.identifier().to_string(),
        id: el.id.clone(),
        name: el.name.clone(),
        kind,
        input_type: el.input_type.clone(),
        tag_name: el.tag.as_str().to_string(),
        label,
        placeholder: el.placeholder.clone(),
        current_value,
        constraints,
        options,
    }
}

/// Options and checked value of the group the radio belongs to.
fn radio_group_state<P: FormPage + ?Sized>(
    page: &P,
    control: ControlRef,
) -> (String, Vec<FieldOption>) {
    let name = &page.element(control).name;
    let members = if name.is_empty() {
        vec![control]
    } else {
        page.radio_group(name)
    };

    let options = members
        .iter()
        .map(|member| {
            let value = page.value(*member);
            let id = &page.element(*member).id;
            let for_label = if id.is_empty() { None } else { page.label_for(id) };
            let text = for_label
                .filter(|t| !t.is_empty())
                .or_else(|| page.enclosing_label(*member).filter(|t| !t.is_empty()))
                .unwrap_or_else(|| value.clone());
            FieldOption { text, value }
        })
        .collect();

    let checked = members
        .iter()
        .find(|m| page.is_checked(**m))
        .map(|m| page.value(*m))
        .unwrap_or_default();

    (checked, options)
}

// ============================================================================
// Relevance filter (applied before prompting)
// ============================================================================

/// Fields worth sending to the model: editable and addressable by id or name.
pub fn relevant_fields(fields: &[FieldDescriptor]) -> Vec<FieldDescriptor> {
    fields.iter().filter(|f| f.is_relevant()).cloned().collect()
}
