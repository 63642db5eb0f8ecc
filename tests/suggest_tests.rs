use form_autofill::apply::applier::apply_values;
use form_autofill::error::{FormError, INVALID_RESPONSE_MESSAGE};
use form_autofill::fields::extractor::extract_fields;
use form_autofill::page::control::{FormPage, ReadableValue};
use form_autofill::page::page_model::{
    FieldConstraints, FieldDescriptor, FieldKind, FieldOption, SuggestionMap,
};
use form_autofill::suggest::backend::{GeminiBackend, TextGeneration, parse_envelope};
use form_autofill::suggest::prompt::build_prompt;
use form_autofill::suggest::requester::SuggestionRequester;
use form_autofill::suggest::response::{extract_fenced_json, parse_suggestions};

mod common;
use common::{FailingBackend, RecordingBackend, page};

fn descriptor(identifier: &str, kind: FieldKind, input_type: &str) -> FieldDescriptor {
    FieldDescriptor {
        identifier: identifier.into(),
        id: identifier.into(),
        name: String::new(),
        kind,
        input_type: input_type.into(),
        tag_name: "input".into(),
        label: identifier.into(),
        placeholder: String::new(),
        current_value: String::new(),
        constraints: FieldConstraints::default(),
        options: Vec::new(),
    }
}

fn age_and_country() -> Vec<FieldDescriptor> {
    let mut country = descriptor("country", FieldKind::Select, "select-one");
    country.tag_name = "select".into();
    country.options = vec![FieldOption::new("USA", "US"), FieldOption::new("Canada", "CA")];
    vec![descriptor("age", FieldKind::TextLike, "number"), country]
}

fn map(entries: &[(&str, &str)]) -> SuggestionMap {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// ============================================================================
// Prompt
// ============================================================================

#[test]
fn prompt_embeds_instructions_fields_and_requirements() {
    let prompt = build_prompt(&age_and_country(), "fill as a 30-year-old US-based developer").unwrap();

    assert!(prompt.starts_with("You are an AI assistant specialized in filling out web forms."));
    assert!(prompt.contains("For 'checkbox' fields, provide 'true' or 'false'."));
    assert!(prompt.contains("dates as YYYY-MM-DD"));
    assert!(prompt.contains("\"identifier\": \"age\""));
    assert!(prompt.contains("\"type\": \"number\""));
    assert!(prompt.contains("\"value\": \"CA\""));
    assert!(prompt.contains("\"fill as a 30-year-old US-based developer\""));
    assert!(prompt.ends_with("Please generate the JSON object:"));
}

#[test]
fn requirements_are_embedded_verbatim() {
    let requirements = "Name: \"Ada\"\nRole: engineer";
    let prompt = build_prompt(&age_and_country(), requirements).unwrap();
    assert!(prompt.contains(requirements));
}

// ============================================================================
// Response parsing
// ============================================================================

#[test]
fn fenced_block_is_preferred_over_surrounding_prose() {
    let text = "Here you go:\n```json\n{\"age\": \"30\", \"country\": \"US\"}\n```\nAnything else?";
    assert_eq!(parse_suggestions(text).unwrap(), map(&[("age", "30"), ("country", "US")]));
}

#[test]
fn bare_json_object_is_accepted() {
    let text = "  {\"firstName\": \"Ada\", \"subscribe\": true, \"age\": 36, \"nickname\": null}  ";
    assert_eq!(
        parse_suggestions(text).unwrap(),
        map(&[("firstName", "Ada"), ("subscribe", "true"), ("age", "36")])
    );
}

#[test]
fn prose_without_json_is_a_parse_error() {
    let err = parse_suggestions("Sure! Here's something").unwrap_err();

    assert!(matches!(&err, FormError::InvalidResponse { raw } if raw == "Sure! Here's something"));
    assert_eq!(err.to_string(), INVALID_RESPONSE_MESSAGE);
}

#[test]
fn non_object_json_is_rejected() {
    assert!(matches!(
        parse_suggestions("[\"a\", \"b\"]"),
        Err(FormError::InvalidResponse { .. })
    ));
    assert!(matches!(
        parse_suggestions("```json\n\"just a string\"\n```"),
        Err(FormError::InvalidResponse { .. })
    ));
}

#[test]
fn unlabelled_fence_is_not_extracted() {
    assert_eq!(extract_fenced_json("```\n{}\n```"), None);
    assert_eq!(extract_fenced_json("```json\n{\"a\": \"1\"}\n```"), Some("{\"a\": \"1\"}"));
}

// ============================================================================
// Envelope
// ============================================================================

#[test]
fn envelope_returns_first_candidate_text() {
    let body = r#"{"candidates":[{"content":{"parts":[{"text":"{\"age\":\"30\"}"},{"text":"ignored"}]}},{"content":{"parts":[{"text":"second"}]}}]}"#;
    assert_eq!(parse_envelope(200, body).unwrap(), "{\"age\":\"30\"}");
}

#[test]
fn envelope_error_carries_status_and_message() {
    let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
    let err = parse_envelope(400, body).unwrap_err();

    assert!(matches!(&err, FormError::Upstream { status: 400, message } if message == "API key not valid."));
    assert_eq!(err.to_string(), "Gemini API error: 400 - API key not valid.");
}

#[test]
fn envelope_error_without_json_uses_body_or_placeholder() {
    assert!(matches!(
        parse_envelope(503, "Service Unavailable"),
        Err(FormError::Upstream { status: 503, message }) if message == "Service Unavailable"
    ));
    assert!(matches!(
        parse_envelope(500, ""),
        Err(FormError::Upstream { status: 500, message }) if message == "Unknown error"
    ));
}

#[test]
fn envelope_without_text_is_empty_generation() {
    assert!(matches!(parse_envelope(200, r#"{"candidates":[]}"#), Err(FormError::EmptyGeneration)));
    assert!(matches!(parse_envelope(200, r#"{}"#), Err(FormError::EmptyGeneration)));
    assert!(matches!(
        parse_envelope(200, r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#),
        Err(FormError::EmptyGeneration)
    ));
    assert!(matches!(
        parse_envelope(200, r#"{"candidates":[{"finishReason":"SAFETY"}]}"#),
        Err(FormError::EmptyGeneration)
    ));
}

#[test]
fn empty_generation_message_suggests_refining_requirements() {
    let message = parse_envelope(200, r#"{"candidates":[]}"#).unwrap_err().to_string();

    assert_eq!(
        message,
        "No text generated by the model. Please try refining your requirements or the prompt."
    );
}

// ============================================================================
// Requester
// ============================================================================

#[test]
fn requester_makes_exactly_one_call() {
    let backend = RecordingBackend::new("```json\n{\"age\": 30, \"country\": \"US\"}\n```");
    let requester = SuggestionRequester::new(Box::new(backend.clone()));

    let suggestions = requester
        .request_suggestions(&age_and_country(), "fill as a 30-year-old US-based developer")
        .unwrap();

    assert_eq!(suggestions, map(&[("age", "30"), ("country", "US")]));
    assert_eq!(backend.calls(), 1);
    assert!(backend.last_prompt().unwrap().contains("30-year-old"));
}

#[test]
fn empty_requirements_never_reach_the_backend() {
    let backend = RecordingBackend::new("{}");
    let requester = SuggestionRequester::new(Box::new(backend.clone()));

    let err = requester.request_suggestions(&age_and_country(), "   ").unwrap_err();
    assert!(matches!(err, FormError::EmptyRequirements));
    assert!(err.is_validation());
    assert_eq!(backend.calls(), 0);
}

#[test]
fn only_relevant_fields_are_prompted() {
    let backend = RecordingBackend::new("{}");
    let requester = SuggestionRequester::new(Box::new(backend.clone()));
    let fields = extract_fields(&page("signup.html"));

    requester.request_suggestions(&fields, "a new member").unwrap();
    let prompt = backend.last_prompt().unwrap();

    assert!(prompt.contains("\"identifier\": \"firstName\""));
    assert!(!prompt.contains("memberId"));
    assert!(!prompt.contains("Search this site"));
}

#[test]
fn all_read_only_fields_skip_the_backend() {
    let backend = RecordingBackend::new("{}");
    let requester = SuggestionRequester::new(Box::new(backend.clone()));
    let mut locked = descriptor("memberId", FieldKind::TextLike, "text");
    locked.constraints.read_only = Some(true);

    let err = requester.request_suggestions(&[locked], "anything").unwrap_err();
    assert!(matches!(err, FormError::NoRelevantFields));
    assert_eq!(backend.calls(), 0);
}

#[test]
fn transport_failures_propagate() {
    let requester = SuggestionRequester::new(Box::new(FailingBackend));
    let err = requester.request_suggestions(&age_and_country(), "anything").unwrap_err();

    assert!(matches!(err, FormError::Transport(_)));
    assert!(!err.is_validation());
}

#[test]
fn malformed_reply_is_an_error_not_a_partial_map() {
    let requester = SuggestionRequester::new(Box::new(RecordingBackend::new("Sure! Here's something")));
    assert!(matches!(
        requester.request_suggestions(&age_and_country(), "anything"),
        Err(FormError::InvalidResponse { .. })
    ));
}

#[test]
fn suggestions_apply_to_the_page_end_to_end() {
    let mut page = page("checkout.html");
    let fields: Vec<_> = extract_fields(&page)
        .into_iter()
        .filter(|f| f.identifier == "age" || f.identifier == "country")
        .collect();
    let requester = SuggestionRequester::new(Box::new(RecordingBackend::new(
        "{\"age\": \"30\", \"country\": \"US\"}",
    )));

    let suggestions = requester
        .request_suggestions(&fields, "fill as a 30-year-old US-based developer")
        .unwrap();
    apply_values(&mut page, &suggestions);

    assert_eq!(page.value(page.find_by_id("age").unwrap()), "30");
    assert_eq!(page.value(page.find_by_id("country").unwrap()), "US");
}

// ============================================================================
// Gemini over HTTP
// ============================================================================

mod gemini_http {
    use super::*;
    use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

    fn generate_blocking(backend: GeminiBackend, prompt: &str) -> tokio::task::JoinHandle<Result<String, FormError>> {
        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || backend.generate(&prompt))
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn posts_prompt_as_single_text_part() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::path("/v1beta/models/gemini-test:generateContent"))
            .and(matchers::query_param("key", "test-key"))
            .and(matchers::body_json(serde_json::json!({
                "contents": [{ "parts": [{ "text": "hello" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"candidates":[{"content":{"parts":[{"text":"{\"age\":\"30\"}"}],"role":"model"}}]}"#,
            ))
            .expect(1)
            .mount(&mock_server)
            .await;

        let endpoint = format!("{}/v1beta/", mock_server.uri());
        let backend = GeminiBackend::new(&endpoint, "gemini-test", "test-key");
        let text = generate_blocking(backend, "hello").await.unwrap().unwrap();

        assert_eq!(text, "{\"age\":\"30\"}");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn upstream_error_is_surfaced() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string(
                r#"{"error":{"code":403,"message":"Permission denied","status":"PERMISSION_DENIED"}}"#,
            ))
            .mount(&mock_server)
            .await;

        let backend = GeminiBackend::new(&mock_server.uri(), "gemini-test", "bad-key");
        let err = generate_blocking(backend, "hello").await.unwrap().unwrap_err();

        assert_eq!(err.to_string(), "Gemini API error: 403 - Permission denied");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unreachable_endpoint_is_a_transport_error() {
        let backend = GeminiBackend::new("http://127.0.0.1:1", "gemini-test", "key");
        let err = generate_blocking(backend, "hello").await.unwrap().unwrap_err();

        assert!(matches!(err, FormError::Transport(_)));
    }
}
