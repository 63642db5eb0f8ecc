use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Duration;

use tracing::warn;

use crate::apply::applier::apply_values;
use crate::cli::config::GeminiSettings;
use crate::error::FormError;
use crate::fields::extractor::extract_fields;
use crate::messaging::background::Background;
use crate::messaging::channel::{LocalChannel, serve_ndjson};
use crate::messaging::content::ContentScript;
use crate::messaging::message::{MessageHandler, Request};
use crate::page::document::HtmlPage;
use crate::page::page_model::ApplyMap;
use crate::page::rewrite::render_html;
use crate::review::console::{confirm, edit_session, format_review, format_status};
use crate::review::controller::{Phase, ReviewController};
use crate::review::review_model::Status;
use crate::suggest::backend::{GeminiBackend, MockTextGeneration, TextGeneration};
use crate::suggest::requester::SuggestionRequester;

type CommandResult<T> = Result<T, Box<dyn std::error::Error>>;

// ============================================================================
// detect subcommand
// ============================================================================

pub fn cmd_detect(page_path: &str) -> CommandResult<()> {
    let page = HtmlPage::from_file(Path::new(page_path))?;
    let fields = extract_fields(&page);

    if fields.is_empty() {
        eprintln!("{}", FormError::NoFields);
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(&fields)?);
    Ok(())
}

// ============================================================================
// suggest subcommand
// ============================================================================

/// Print the suggestion map. Returns whether suggestions were produced.
pub fn cmd_suggest(
    page_path: &str,
    requirements: &str,
    backend: Box<dyn TextGeneration>,
) -> CommandResult<bool> {
    let page = HtmlPage::from_file(Path::new(page_path))?;
    let mut content = content_script(page, backend);

    let reply = content.handle(Request::GetAiSuggestions {
        requirements: requirements.to_string(),
    });

    match reply.suggested_values {
        Some(values) if reply.success => {
            println!("{}", serde_json::to_string_pretty(&values)?);
            Ok(true)
        }
        _ => {
            eprintln!("{}", reply.message_or("AI failed to provide valid suggestions."));
            Ok(false)
        }
    }
}

// ============================================================================
// fill subcommand
// ============================================================================

pub fn cmd_fill(page_path: &str, values_path: &str, output: Option<&str>) -> CommandResult<()> {
    let mut page = HtmlPage::from_file(Path::new(page_path))?;
    let values = load_values(values_path)?;

    let report = apply_values(&mut page, &values);
    for (identifier, warning) in report.warnings() {
        eprintln!("  skipped '{}': {}", identifier, warning);
    }
    println!("{}", report.summary());

    write_page(&page, output)
}

/// Read a JSON object of identifier → value. Non-string scalars are kept as text.
pub fn load_values(path: &str) -> CommandResult<ApplyMap> {
    let content = std::fs::read_to_string(path).map_err(|e| FormError::Io {
        path: path.to_string(),
        source: e,
    })?;
    let raw: BTreeMap<String, serde_json::Value> =
        serde_json::from_str(&content).map_err(|e| FormError::JsonParse {
            context: format!("values file '{}'", path),
            source: e,
        })?;

    Ok(raw
        .into_iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| match v {
            serde_json::Value::String(s) => (k, s),
            other => (k, other.to_string()),
        })
        .collect())
}

// ============================================================================
// assist subcommand
// ============================================================================

/// Full analyze → review → fill cycle on one page. Returns whether the form
/// was filled.
#[allow(clippy::too_many_arguments)]
pub fn cmd_assist<R: BufRead, W: Write>(
    page_path: &str,
    requirements: &str,
    output: Option<&str>,
    accept_all: bool,
    reset_delay: Duration,
    backend: Box<dyn TextGeneration>,
    input: &mut R,
    out: &mut W,
) -> CommandResult<bool> {
    let page = HtmlPage::from_file(Path::new(page_path))?;
    let content = content_script(page, backend);
    let mut controller =
        ReviewController::new(LocalChannel::new(content)).with_reset_delay(reset_delay);

    let status = controller.analyze(requirements);
    writeln!(out, "{}", format_status(&status))?;
    if controller.phase() != Phase::Reviewing {
        return Ok(false);
    }

    if let Some(session) = controller.session_mut() {
        write!(out, "{}", format_review(session))?;
        if !accept_all {
            writeln!(out)?;
            edit_session(session, input, out)?;
        }
    }

    if !accept_all && !confirm("Fill the form with these values?", input, out)? {
        controller.cancel();
        writeln!(out, "{}", format_status(&Status::info("Cancelled.")))?;
        return Ok(false);
    }

    let result = controller.fill();
    writeln!(out, "{}", format_status(&result))?;

    let content = controller.into_channel().into_inner();
    write_page(content.page(), output)?;
    Ok(result.is_success())
}

// ============================================================================
// serve subcommand
// ============================================================================

/// Serve the background side over stdin/stdout until EOF.
pub fn cmd_serve(backend: Box<dyn TextGeneration>) -> CommandResult<()> {
    let mut background = Background::new(SuggestionRequester::new(backend));
    let stdin = io::stdin();
    let stdout = io::stdout();
    serve_ndjson(stdin.lock(), stdout.lock(), &mut background)?;
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Build the text generation backend: a canned response file, or Gemini.
pub fn build_backend(
    settings: &GeminiSettings,
    mock_response: Option<&str>,
) -> CommandResult<Box<dyn TextGeneration>> {
    if let Some(path) = mock_response {
        let response = std::fs::read_to_string(path).map_err(|e| FormError::Io {
            path: path.to_string(),
            source: e,
        })?;
        return Ok(Box::new(MockTextGeneration::new(&response)));
    }

    if settings.api_key.is_empty() {
        warn!("no Gemini API key configured; requests will be rejected upstream");
    }
    Ok(Box::new(GeminiBackend::new(
        &settings.endpoint,
        &settings.model,
        &settings.api_key,
    )))
}

fn content_script(
    page: HtmlPage,
    backend: Box<dyn TextGeneration>,
) -> ContentScript<HtmlPage, LocalChannel<Background>> {
    let background = Background::new(SuggestionRequester::new(backend));
    ContentScript::new(page, LocalChannel::new(background))
}

fn write_page(page: &HtmlPage, output: Option<&str>) -> CommandResult<()> {
    if let Some(path) = output {
        let html = render_html(page)?;
        std::fs::write(path, html).map_err(|e| FormError::Io {
            path: path.to_string(),
            source: e,
        })?;
        eprintln!("Wrote filled page to {}", path);
    }
    Ok(())
}
