use std::fmt;

use tracing::{debug, warn};

use crate::page::control::{Control, FormPage};
use crate::page::page_model::{ApplyMap, ControlRef, EventKind};

/// Literal forms (compared lowercased) that check a checkbox.
pub const CHECKBOX_TRUE_VALUES: &[&str] = &["true", "yes", "1"];

pub fn is_truthy(value: &str) -> bool {
    CHECKBOX_TRUE_VALUES.contains(&value.to_lowercase().as_str())
}

// ============================================================================
// Outcomes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyWarning {
    /// No control with this id or name
    NotFound,
    /// Radio group has no member with this value
    NoMatchingRadio { group: String, value: String },
}

impl fmt::Display for ApplyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplyWarning::NotFound => write!(f, "no element with this id or name"),
            ApplyWarning::NoMatchingRadio { group, value } => {
                write!(f, "no radio in group '{}' has value '{}'", group, value)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// Select had no matching option; the raw value was written instead
    AppliedRaw,
    Skipped(ApplyWarning),
}

/// Per-entry results of one apply pass, in map order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub entries: Vec<(String, ApplyOutcome)>,
}

impl ApplyReport {
    pub fn applied_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, o)| !matches!(o, ApplyOutcome::Skipped(_)))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.entries.len() - self.applied_count()
    }

    pub fn outcome(&self, identifier: &str) -> Option<&ApplyOutcome> {
        self.entries
            .iter()
            .find(|(id, _)| id == identifier)
            .map(|(_, o)| o)
    }

    pub fn warnings(&self) -> impl Iterator<Item = (&str, &ApplyWarning)> {
        self.entries.iter().filter_map(|(id, o)| match o {
            ApplyOutcome::Skipped(w) => Some((id.as_str(), w)),
            _ => None,
        })
    }

    /// One-line status for the user.
    pub fn summary(&self) -> String {
        match self.skipped_count() {
            0 => format!("Form filled: {} field(s) updated.", self.applied_count()),
            skipped => format!(
                "Form filled: {} field(s) updated, {} skipped.",
                self.applied_count(),
                skipped
            ),
        }
    }
}

// ============================================================================
// Application
// ============================================================================

/// Locate a write target: element id first, then the first matching name.
pub fn find_target<P: FormPage + ?Sized>(page: &P, identifier: &str) -> Option<ControlRef> {
    page.find_by_id(identifier)
        .or_else(|| page.find_by_name(identifier))
}

/// Write every entry into the page. Entries are independent: a missing
/// target or unmatched radio value is reported and the rest still apply.
pub fn apply_values<P: FormPage + ?Sized>(page: &mut P, values: &ApplyMap) -> ApplyReport {
    let mut report = ApplyReport::default();

    for (identifier, value) in values {
        let outcome = match find_target(page, identifier) {
            Some(control) => apply_value(page, control, value),
            None => ApplyOutcome::Skipped(ApplyWarning::NotFound),
        };

        if let ApplyOutcome::Skipped(warning) = &outcome {
            warn!(identifier = %identifier, %warning, "could not apply value");
        } else {
            debug!(identifier = %identifier, ?outcome, "applied value");
        }

        report.entries.push((identifier.clone(), outcome));
    }

    report
}

/// Write one value with the semantics of the control's kind. Every write is
/// followed by the notifications host frameworks listen for.
pub fn apply_value<P: FormPage + ?Sized>(
    page: &mut P,
    control: ControlRef,
    value: &str,
) -> ApplyOutcome {
    match Control::resolve(page, control) {
        // select: match option value or text, else write raw; `change` either way
        Control::Select(select) => {
            let matched = page
                .options(select)
                .into_iter()
                .find(|o| o.value == value || o.text == value);

            let outcome = match matched {
                Some(option) => {
                    page.set_value(select, &option.value);
                    ApplyOutcome::Applied
                }
                None => {
                    page.set_value(select, value);
                    ApplyOutcome::AppliedRaw
                }
            };
            page.dispatch(select, EventKind::Change);
            outcome
        }

        // radio: check the member with this value, `change` on it only
        Control::RadioGroup { name, members } => {
            let Some(radio) = members.into_iter().find(|m| page.value(*m) == value) else {
                return ApplyOutcome::Skipped(ApplyWarning::NoMatchingRadio {
                    group: name,
                    value: value.to_string(),
                });
            };
            page.set_checked(radio, true);
            page.dispatch(radio, EventKind::Change);
            ApplyOutcome::Applied
        }

        // checkbox: true/yes/1 checks, anything else unchecks; always `change`
        Control::Checkbox(checkbox) => {
            page.set_checked(checkbox, is_truthy(value));
            page.dispatch(checkbox, EventKind::Change);
            ApplyOutcome::Applied
        }

        // text-like and textarea: `input` then `change`
        Control::TextLike(text) => {
            page.set_value(text, value);
            page.dispatch(text, EventKind::Input);
            page.dispatch(text, EventKind::Change);
            ApplyOutcome::Applied
        }
    }
}
