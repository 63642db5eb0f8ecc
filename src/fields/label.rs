use crate::page::control::{FormPage, collapse_whitespace};
use crate::page::page_model::ControlRef;

/// Parent text longer than this is assumed to be unrelated page content.
pub const MAX_PARENT_LABEL_CHARS: usize = 150;

/// Where a resolved label came from, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LabelSource {
    LabelFor,
    AriaLabel,
    AriaLabelledBy,
    Placeholder,
    PrecedingText,
    ParentText,
    Identifier,
}

/// Resolve a control's caption. The first non-empty source wins:
///
/// 1. `<label for=id>` text
/// 2. `aria-label`
/// 3. elements referenced by `aria-labelledby`
/// 4. placeholder
/// 5. nearest preceding sibling text node
/// 6. parent text, if short and mentioning the control's name or id
/// 7. raw name, else id
pub fn resolve_label<P: FormPage + ?Sized>(page: &P, control: ControlRef) -> (String, LabelSource) {
    let el = page.element(control);

    let label_for = if el.id.is_empty() { None } else { page.label_for(&el.id) };
    if let Some(text) = non_empty(label_for) {
        return (text, LabelSource::LabelFor);
    }

    if let Some(text) = non_empty(el.aria_label.clone()) {
        return (text, LabelSource::AriaLabel);
    }

    let labelled_by = el.aria_labelledby.as_deref().map(|ids| {
        ids.split_whitespace()
            .filter_map(|id| page.text_of_id(id))
            .collect::<Vec<_>>()
            .join(" ")
    });
    if let Some(text) = non_empty(labelled_by) {
        return (text, LabelSource::AriaLabelledBy);
    }

    if let Some(text) = non_empty(Some(el.placeholder.clone())) {
        return (text, LabelSource::Placeholder);
    }

    if let Some(text) = non_empty(page.preceding_text(control)) {
        return (text, LabelSource::PrecedingText);
    }

    let parent = page
        .parent_text(control)
        .filter(|text| parent_text_mentions(text, &el.name, &el.id));
    if let Some(text) = non_empty(parent) {
        return (text, LabelSource::ParentText);
    }

    let fallback = if el.name.is_empty() { &el.id } else { &el.name };
    (fallback.clone(), LabelSource::Identifier)
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.map(|t| collapse_whitespace(&t)).filter(|t| !t.is_empty())
}

/// Parent text is only trusted when it is short and names the control.
fn parent_text_mentions(text: &str, name: &str, id: &str) -> bool {
    if text.chars().count() >= MAX_PARENT_LABEL_CHARS {
        return false;
    }

    let haystack = text.to_lowercase();
    [name, id]
        .iter()
        .any(|needle| !needle.is_empty() && haystack.contains(&needle.to_lowercase()))
}
