use form_autofill::apply::applier::{
    ApplyOutcome, ApplyWarning, apply_values, find_target, is_truthy,
};
use form_autofill::fields::extractor::extract_fields;
use form_autofill::page::control::{Checkable, FormPage, ReadableValue};
use form_autofill::page::document::HtmlPage;
use form_autofill::page::page_model::{ApplyMap, ControlRef, DomEvent, EventKind};
use form_autofill::page::rewrite::render_html;

mod common;
use common::{field, page};

fn values(entries: &[(&str, &str)]) -> ApplyMap {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn by_id(page: &HtmlPage, id: &str) -> ControlRef {
    page.find_by_id(id).unwrap()
}

fn radio(page: &HtmlPage, value: &str) -> ControlRef {
    page.radio_group("plan")
        .into_iter()
        .find(|r| page.value(*r) == value)
        .unwrap()
}

// ============================================================================
// Select
// ============================================================================

#[test]
fn select_matches_option_value() {
    let mut page = page("checkout.html");
    let report = apply_values(&mut page, &values(&[("country", "CA")]));

    assert_eq!(report.outcome("country"), Some(&ApplyOutcome::Applied));
    assert_eq!(page.value(by_id(&page, "country")), "CA");
}

#[test]
fn select_matches_option_text() {
    let mut page = page("checkout.html");
    apply_values(&mut page, &values(&[("country", "Canada")]));
    assert_eq!(page.value(by_id(&page, "country")), "CA");

    apply_values(&mut page, &values(&[("country", "United States")]));
    assert_eq!(page.value(by_id(&page, "country")), "US");
}

#[test]
fn select_without_matching_option_takes_raw_value() {
    let mut page = page("checkout.html");
    let country = by_id(&page, "country");
    let report = apply_values(&mut page, &values(&[("country", "XX")]));

    assert_eq!(report.outcome("country"), Some(&ApplyOutcome::AppliedRaw));
    assert_eq!(page.value(country), "XX");
    assert_eq!(
        page.events(),
        &[DomEvent { target: country, kind: EventKind::Change, bubbles: true }]
    );
}

// ============================================================================
// Radio
// ============================================================================

#[test]
fn radio_checks_exactly_the_matching_member() {
    let mut page = page("checkout.html");
    let report = apply_values(&mut page, &values(&[("plan", "pro")]));

    assert_eq!(report.outcome("plan"), Some(&ApplyOutcome::Applied));
    assert!(page.is_checked(radio(&page, "pro")));
    assert!(!page.is_checked(radio(&page, "basic")));

    let pro = radio(&page, "pro");
    assert_eq!(
        page.events(),
        &[DomEvent { target: pro, kind: EventKind::Change, bubbles: true }]
    );
}

#[test]
fn radio_without_matching_value_warns_and_changes_nothing() {
    let mut page = HtmlPage::parse(
        r#"<form>
            <input type="radio" name="plan" value="basic">
            <input type="radio" name="plan" value="pro">
        </form>"#,
    );
    let report = apply_values(&mut page, &values(&[("plan", "enterprise")]));

    assert_eq!(
        report.outcome("plan"),
        Some(&ApplyOutcome::Skipped(ApplyWarning::NoMatchingRadio {
            group: "plan".into(),
            value: "enterprise".into(),
        }))
    );
    assert!(page.controls().iter().all(|c| !page.is_checked(*c)));
    assert!(page.events().is_empty());
}

// ============================================================================
// Checkbox
// ============================================================================

#[test]
fn checkbox_truthiness_is_three_literals_case_insensitive() {
    for value in ["true", "TRUE", "Yes", "1"] {
        assert!(is_truthy(value), "{value} should check");
    }
    for value in ["false", "no", "0", "", "on", "y", "checked"] {
        assert!(!is_truthy(value), "{value} should uncheck");
    }
}

#[test]
fn checkbox_apply_sets_state_and_fires_change() {
    let mut page = page("checkout.html");
    let newsletter = by_id(&page, "newsletter");

    apply_values(&mut page, &values(&[("newsletter", "Yes")]));
    assert!(page.is_checked(newsletter));

    apply_values(&mut page, &values(&[("newsletter", "nope")]));
    assert!(!page.is_checked(newsletter));

    let kinds: Vec<EventKind> = page.events().iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![EventKind::Change, EventKind::Change]);
}

// ============================================================================
// Text and lookup
// ============================================================================

#[test]
fn text_write_fires_input_then_change() {
    let mut page = page("checkout.html");
    let age = by_id(&page, "age");
    apply_values(&mut page, &values(&[("age", "30")]));

    assert_eq!(page.value(age), "30");
    assert_eq!(
        page.events(),
        &[
            DomEvent { target: age, kind: EventKind::Input, bubbles: true },
            DomEvent { target: age, kind: EventKind::Change, bubbles: true },
        ]
    );
}

#[test]
fn id_lookup_wins_over_name() {
    let mut page = page("checkout.html");
    let by_name = page.find_by_name("contact").unwrap();
    let by_id = by_id(&page, "contact");
    assert_ne!(by_name, by_id);

    assert_eq!(find_target(&page, "contact"), Some(by_id));
    apply_values(&mut page, &values(&[("contact", "ops@example.com")]));

    assert_eq!(page.value(by_id), "ops@example.com");
    assert_eq!(page.value(by_name), "");
}

#[test]
fn missing_target_is_skipped_and_the_rest_still_apply() {
    let mut page = page("checkout.html");
    let report = apply_values(&mut page, &values(&[("missing", "x"), ("notes", "Leave at door")]));

    assert_eq!(
        report.outcome("missing"),
        Some(&ApplyOutcome::Skipped(ApplyWarning::NotFound))
    );
    assert_eq!(page.value(by_id(&page, "notes")), "Leave at door");
    assert_eq!(report.applied_count(), 1);
    assert_eq!(report.skipped_count(), 1);
    assert_eq!(report.summary(), "Form filled: 1 field(s) updated, 1 skipped.");
    assert_eq!(report.warnings().count(), 1);
}

#[test]
fn empty_map_applies_nothing() {
    let mut page = page("checkout.html");
    let report = apply_values(&mut page, &ApplyMap::new());

    assert!(report.entries.is_empty());
    assert_eq!(report.summary(), "Form filled: 0 field(s) updated.");
    assert!(page.events().is_empty());
}

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn re_extraction_reads_back_applied_text_values() {
    let mut page = page("checkout.html");
    let applied = values(&[("age", "30"), ("notes", "Leave at door")]);
    apply_values(&mut page, &applied);

    let fields = extract_fields(&page);
    for (identifier, value) in &applied {
        assert_eq!(&field(&fields, identifier).current_value, value);
    }
}

#[test]
fn rendered_html_carries_the_live_state() {
    let mut page = page("checkout.html");
    apply_values(
        &mut page,
        &values(&[
            ("age", "30"),
            ("country", "CA"),
            ("plan", "pro"),
            ("newsletter", "true"),
            ("notes", "Leave at door"),
        ]),
    );

    let html = render_html(&page).unwrap();
    let reparsed = HtmlPage::parse(&html);
    let fields = extract_fields(&reparsed);

    assert_eq!(field(&fields, "age").current_value, "30");
    assert_eq!(field(&fields, "country").current_value, "CA");
    assert_eq!(field(&fields, "plan").current_value, "pro");
    assert_eq!(field(&fields, "newsletter").current_value, "true");
    assert_eq!(field(&fields, "notes").current_value, "Leave at door");
    assert!(html.contains("<title>Checkout</title>"));
}

#[test]
fn rendered_html_follows_controls_the_parser_moved() {
    // An input directly inside <table> is hoisted before the table when parsed
    let mut page = HtmlPage::parse(
        r#"<form><table>
            <tr><td><input id="a" value="1"></td></tr>
            <input id="b" value="2">
        </table></form>"#,
    );
    apply_values(&mut page, &values(&[("a", "AAA"), ("b", "BBB")]));

    let html = render_html(&page).unwrap();
    let reparsed = HtmlPage::parse(&html);
    let fields = extract_fields(&reparsed);

    assert_eq!(field(&fields, "a").current_value, "AAA");
    assert_eq!(field(&fields, "b").current_value, "BBB");
}

#[test]
fn rendered_html_matches_repeated_controls_by_occurrence() {
    let mut page = HtmlPage::parse(
        r#"<form>
            <input name="alias" value="first">
            <input name="alias" value="second">
        </form>"#,
    );
    let second = page.controls()[1];
    page.set_value(second, "changed");

    let html = render_html(&page).unwrap();
    let reparsed = HtmlPage::parse(&html);
    let controls = reparsed.controls();

    assert_eq!(reparsed.value(controls[0]), "first");
    assert_eq!(reparsed.value(controls[1]), "changed");
}

#[test]
fn unchanged_page_renders_equivalent_state() {
    let page = page("signup.html");
    let html = render_html(&page).unwrap();

    assert_eq!(extract_fields(&HtmlPage::parse(&html)), extract_fields(&page));
}

#[test]
fn set_checked_on_radio_clears_its_group() {
    let mut page = page("checkout.html");
    let pro = radio(&page, "pro");
    page.set_checked(pro, true);

    let checked: Vec<_> = page
        .radio_group("plan")
        .into_iter()
        .filter(|r| page.is_checked(*r))
        .collect();
    assert_eq!(checked, vec![pro]);
}
