use std::io::{self, BufRead, Write};

use crate::apply::applier::CHECKBOX_TRUE_VALUES;
use crate::review::review_model::{ReviewRow, ReviewSession, RowControl, Status, StatusKind};

// ============================================================================
// Console review: render and edit a session in the terminal
// ============================================================================

/// Format a review session for terminal output.
///
/// Produces output like:
/// ```text
/// === Review suggestions (3 fields) ===
///
///   [text]     First name (Required)       = Jane
///   [select]   Country                     = US  (US, CA)
///   [checkbox] Subscribe                   = [x]
/// ```
pub fn format_review(session: &ReviewSession) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "=== Review suggestions ({} fields) ===\n\n",
        session.rows.len()
    ));

    let width = session
        .rows
        .iter()
        .map(|r| r.label.chars().count())
        .max()
        .unwrap_or(0);

    for row in &session.rows {
        out.push_str(&format!(
            "  {:<10} {:<width$} = {}\n",
            format!("[{}]", control_name(row)),
            row.label,
            display_value(row),
            width = width
        ));
    }

    out
}

pub fn format_status(status: &Status) -> String {
    let marker = match status.kind {
        StatusKind::Info => "\u{2022}",
        StatusKind::Success => "\u{2713}",
        StatusKind::Error => "\u{2717}",
    };
    format!("{} {}", marker, status.message)
}

fn control_name(row: &ReviewRow) -> &'static str {
    match &row.control {
        RowControl::Select { .. } => "select",
        RowControl::Checkbox { .. } => "checkbox",
        RowControl::Text { multiline: true, .. } => "textarea",
        RowControl::Text { .. } => "text",
    }
}

fn display_value(row: &ReviewRow) -> String {
    match &row.control {
        RowControl::Select { options, value } => {
            let choices = options
                .iter()
                .map(|o| o.value.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}  ({})", value, choices)
        }
        RowControl::Checkbox { checked: true } => "[x]".to_string(),
        RowControl::Checkbox { checked: false } => "[ ]".to_string(),
        RowControl::Text { value, .. } => value.clone(),
    }
}

/// Walk every row, letting the user keep or replace its value.
///
/// Enter keeps the value, `-` clears it. Select rows also accept an option
/// number; checkbox rows accept y/n.
pub fn edit_session<R: BufRead, W: Write>(
    session: &mut ReviewSession,
    input: &mut R,
    output: &mut W,
) -> io::Result<()> {
    for row in &mut session.rows {
        if let RowControl::Select { options, .. } = &row.control {
            for (i, option) in options.iter().enumerate() {
                writeln!(output, "    {}) {} [{}]", i + 1, option.text, option.value)?;
            }
        }
        write!(output, "{} [{}]: ", row.label, display_value(row))?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let answer = line.trim();
        if answer.is_empty() {
            continue;
        }

        match &row.control {
            RowControl::Select { options, .. } => {
                let picked = answer
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| options.get(i))
                    .map(|o| o.value.clone());
                match picked {
                    Some(value) => row.set_value(&value),
                    None if answer == "-" => row.set_value(""),
                    None => row.set_value(answer),
                }
            }
            RowControl::Checkbox { .. } => {
                let lower = answer.to_lowercase();
                if lower == "y" || CHECKBOX_TRUE_VALUES.contains(&lower.as_str()) {
                    row.set_value("true");
                } else if matches!(lower.as_str(), "n" | "no" | "false" | "0" | "-") {
                    row.set_value("false");
                }
            }
            RowControl::Text { .. } if answer == "-" => row.set_value(""),
            RowControl::Text { .. } => row.set_value(answer),
        }
    }
    Ok(())
}

/// Ask a yes/no question; anything but y/yes is a no.
pub fn confirm<R: BufRead, W: Write>(question: &str, input: &mut R, output: &mut W) -> io::Result<bool> {
    write!(output, "{} [y/N]: ", question)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}
