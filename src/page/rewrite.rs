use std::cell::RefCell;
use std::collections::HashMap;

use lol_html::html_content::ContentType;
use lol_html::{RewriteStrSettings, element, rewrite_str};

use crate::error::FormError;
use crate::page::control::ControlTag;
use crate::page::document::HtmlPage;
use crate::page::page_model::FieldKind;

/// What a control is recognised by in both the parsed tree and the stream.
type ControlKey = (String, String, String);

fn control_key(tag: &str, id: &str, name: &str) -> ControlKey {
    (tag.to_ascii_lowercase(), id.to_string(), name.to_string())
}

/// Position of the rewriter inside the control table.
#[derive(Default)]
struct Cursor {
    seen: HashMap<ControlKey, usize>,
    visited: usize,
    select: Option<usize>,
    option_index: usize,
}

/// Write the page's live control state back into its source markup.
///
/// The parser may move mis-nested controls (an `<input>` directly inside a
/// `<table>` is hoisted before it), so streamed elements are matched to the
/// control table by tag, id and name, the n-th streamed occurrence of a key
/// taking the n-th parsed control with that key. A streamed control with no
/// counterpart fails the render instead of writing state into the wrong
/// element.
///
/// Written back: `value` attributes for text inputs, `checked` for radios and
/// checkboxes, `selected` for options, and the body of textareas.
pub fn render_html(page: &HtmlPage) -> Result<String, FormError> {
    let mut table: HashMap<ControlKey, Vec<usize>> = HashMap::new();
    for (index, state) in page.controls.iter().enumerate() {
        let el = &state.element;
        table
            .entry(control_key(el.tag.as_str(), &el.id, &el.name))
            .or_default()
            .push(index);
    }

    let cursor = RefCell::new(Cursor::default());

    let output = rewrite_str(
        page.source(),
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("input, textarea, select", |el| {
                    let key = control_key(
                        &el.tag_name(),
                        &el.get_attribute("id").unwrap_or_default(),
                        &el.get_attribute("name").unwrap_or_default(),
                    );

                    let mut cursor = cursor.borrow_mut();
                    let occurrence = cursor.seen.entry(key.clone()).or_insert(0);
                    let nth = *occurrence;
                    *occurrence += 1;

                    let Some(index) = table.get(&key).and_then(|i| i.get(nth)).copied() else {
                        return Err(format!(
                            "<{} id=\"{}\" name=\"{}\"> has no parsed counterpart",
                            key.0, key.1, key.2
                        )
                        .into());
                    };
                    cursor.visited += 1;
                    let state = &page.controls[index];

                    match state.element.tag {
                        ControlTag::Select => {
                            cursor.select = Some(index);
                            cursor.option_index = 0;
                        }
                        ControlTag::Textarea => {
                            el.set_inner_content(&state.value, ContentType::Text);
                        }
                        ControlTag::Input => match state.element.kind() {
                            FieldKind::Radio | FieldKind::Checkbox => {
                                if state.checked {
                                    el.set_attribute("checked", "")?;
                                } else {
                                    el.remove_attribute("checked");
                                }
                            }
                            _ => el.set_attribute("value", &state.value)?,
                        },
                    }
                    Ok(())
                }),
                element!("option", |el| {
                    let mut cursor = cursor.borrow_mut();
                    let Some(select) = cursor.select else {
                        return Ok(());
                    };
                    let options = &page.controls[select].options;
                    let Some(option) = options.get(cursor.option_index) else {
                        cursor.select = None;
                        return Ok(());
                    };
                    cursor.option_index += 1;
                    if cursor.option_index == options.len() {
                        cursor.select = None;
                    }

                    if option.selected {
                        el.set_attribute("selected", "")?;
                    } else {
                        el.remove_attribute("selected");
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| FormError::Render(e.to_string()))?;

    let visited = cursor.borrow().visited;
    if visited != page.controls.len() {
        return Err(FormError::Render(format!(
            "matched {} of {} controls",
            visited,
            page.controls.len()
        )));
    }

    Ok(output)
}
