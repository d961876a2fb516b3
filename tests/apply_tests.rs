use std::cell::Cell;
use std::time::{Duration, Instant};

use serde_json::json;

use form_autofill::apply::{Applicator, WaitPolicy, cascader_paths, set_input_value};
use form_autofill::dom::{Document, DomEvent, NodeId, Page};
use form_autofill::field::{DiscoveredField, FieldHandle, discover};
use form_autofill::resolve::ResolvedValue;

use crate::common::fixtures::{
    antd_cascader, antd_date_picker, antd_panel_of, antd_range_picker, antd_select, antd_switch,
    el_select, el_switch, form, inputs_of, labeled_input, select,
};

mod common;

// =========================================================================
// Helpers
// =========================================================================

fn applicator() -> Applicator {
    Applicator::new(WaitPolicy::immediate())
}

/// The single discovered field of `doc`.
fn only_field(doc: &Document) -> DiscoveredField {
    let mut fields = discover(doc);
    assert_eq!(fields.len(), 1, "expected exactly one field, got {:?}", fields);
    fields.remove(0)
}

fn apply(doc: &mut Document, field: &DiscoveredField, value: ResolvedValue) -> bool {
    applicator().apply(doc, field.handle, &field.descriptor, &value)
}

// =========================================================================
// Native controls
// =========================================================================

#[test]
fn text_input_gets_value_and_full_event_sequence() {
    let mut doc = Document::new();
    let parent = form(&mut doc);
    let input = labeled_input(&mut doc, parent, "Email", "email", "email");
    let field = only_field(&doc);

    assert!(apply(&mut doc, &field, ResolvedValue::text("a@b.com")));
    assert_eq!(doc.value(input).unwrap(), "a@b.com");
    assert_eq!(
        doc.events_for(input),
        vec![DomEvent::Focus, DomEvent::Input, DomEvent::Change, DomEvent::Blur]
    );
    assert_eq!(doc.active_element(), None);
}

#[test]
fn set_input_value_is_usable_directly() {
    let mut doc = Document::new();
    let parent = form(&mut doc);
    let input = doc.append_element(parent, "textarea", &[]);

    set_input_value(&mut doc, input, "hello").unwrap();
    assert_eq!(doc.value(input).unwrap(), "hello");
}

#[test]
fn null_value_clears_text() {
    let mut doc = Document::new();
    let parent = form(&mut doc);
    let input = doc.append_element(parent, "input", &[("name", "note"), ("value", "old")]);
    let field = only_field(&doc);

    assert!(apply(&mut doc, &field, ResolvedValue::Scalar(serde_json::Value::Null)));
    assert_eq!(doc.value(input).unwrap(), "");
}

#[test]
fn checkbox_follows_truthiness() {
    let mut doc = Document::new();
    let parent = form(&mut doc);
    let cb = labeled_input(&mut doc, parent, "Subscribe", "subscribe", "checkbox");
    let field = only_field(&doc);

    assert!(apply(&mut doc, &field, ResolvedValue::text("yes")));
    assert!(doc.is_checked(cb).unwrap());

    assert!(apply(&mut doc, &field, ResolvedValue::Scalar(json!(0))));
    assert!(!doc.is_checked(cb).unwrap());
    assert!(doc.events_for(cb).contains(&DomEvent::Change));
}

#[test]
fn radio_is_checked_only_when_its_value_matches() {
    let mut doc = Document::new();
    let parent = form(&mut doc);
    doc.append_element(parent, "input", &[("type", "radio"), ("name", "size"), ("value", "s")]);
    doc.append_element(parent, "input", &[("type", "radio"), ("name", "size"), ("value", "m")]);
    let fields = discover(&doc);
    assert_eq!(fields.len(), 2);

    let value = ResolvedValue::text("m");
    let results: Vec<bool> = fields
        .iter()
        .map(|f| applicator().apply(&mut doc, f.handle, &f.descriptor, &value))
        .collect();

    assert_eq!(results, vec![false, true]);
    assert!(!doc.is_checked(fields[0].handle.node()).unwrap());
    assert!(doc.is_checked(fields[1].handle.node()).unwrap());
}

#[test]
fn radio_ignores_empty_target() {
    let mut doc = Document::new();
    let parent = form(&mut doc);
    doc.append_element(parent, "input", &[("type", "radio"), ("name", "x"), ("value", "")]);
    let field = only_field(&doc);

    assert!(!apply(&mut doc, &field, ResolvedValue::text("")));
}

#[test]
fn select_matches_value_or_visible_text() {
    let mut doc = Document::new();
    let parent = form(&mut doc);
    let s = select(&mut doc, parent, "city", &[("sh", "Shanghai"), ("bj", " Beijing ")]);
    let field = only_field(&doc);

    assert!(apply(&mut doc, &field, ResolvedValue::text("Beijing")));
    assert_eq!(doc.value(s).unwrap(), "bj");

    assert!(apply(&mut doc, &field, ResolvedValue::text("sh")));
    assert_eq!(doc.value(s).unwrap(), "sh");

    assert!(!apply(&mut doc, &field, ResolvedValue::text("Tokyo")));
    assert_eq!(doc.value(s).unwrap(), "sh");
}

#[test]
fn content_editable_text_is_replaced() {
    let mut doc = Document::new();
    let parent = form(&mut doc);
    let editor = doc.append_element(parent, "div", &[("contenteditable", "true"), ("aria-label", "Notes")]);
    doc.append_text(editor, "draft");
    let field = only_field(&doc);

    assert!(apply(&mut doc, &field, ResolvedValue::text("final")));
    assert_eq!(doc.text_content(editor).unwrap(), "final");
    assert_eq!(doc.events_for(editor), vec![DomEvent::Input]);
}

#[test]
fn undefined_is_never_applied() {
    let mut doc = Document::new();
    let parent = form(&mut doc);
    let input = labeled_input(&mut doc, parent, "Email", "email", "email");
    let field = only_field(&doc);

    assert!(!apply(&mut doc, &field, ResolvedValue::Undefined));
    assert!(doc.events_for(input).is_empty());
}

#[test]
fn page_failure_is_contained_as_false() {
    let mut doc = Document::new();
    let parent = form(&mut doc);
    labeled_input(&mut doc, parent, "Email", "email", "email");
    let field = only_field(&doc);
    let stale = FieldHandle(NodeId(10_000));

    assert!(!applicator().apply(&mut doc, stale, &field.descriptor, &ResolvedValue::text("x")));
}

// =========================================================================
// Switches
// =========================================================================

#[test]
fn switch_already_in_state_is_not_clicked() {
    let mut doc = Document::new();
    let parent = form(&mut doc);
    let root = antd_switch(&mut doc, parent, "Notify", true);
    let field = only_field(&doc);

    assert!(apply(&mut doc, &field, ResolvedValue::Scalar(json!(true))));
    assert!(!doc.events_for(root).contains(&DomEvent::Click));
    assert!(doc.has_class(root, "ant-switch-checked").unwrap());
}

#[test]
fn switch_toggles_through_a_click() {
    let mut doc = Document::new();
    let parent = form(&mut doc);
    let root = antd_switch(&mut doc, parent, "Notify", true);
    let field = only_field(&doc);

    assert!(apply(&mut doc, &field, ResolvedValue::Scalar(json!(false))));
    assert_eq!(doc.events_for(root), vec![DomEvent::Click]);
    assert!(!doc.has_class(root, "ant-switch-checked").unwrap());
}

#[test]
fn switch_reads_state_from_inner_input() {
    let mut doc = Document::new();
    let parent = form(&mut doc);
    let (_, input) = el_switch(&mut doc, parent, "agree", false);
    let field = only_field(&doc);

    assert!(apply(&mut doc, &field, ResolvedValue::text("on")));
    assert!(doc.is_checked(input).unwrap());

    // second application finds it on and leaves it alone
    assert!(apply(&mut doc, &field, ResolvedValue::text("on")));
    assert!(doc.is_checked(input).unwrap());
}

// =========================================================================
// Date pickers
// =========================================================================

#[test]
fn date_picker_writes_its_input() {
    let mut doc = Document::new();
    let parent = form(&mut doc);
    let root = antd_date_picker(&mut doc, parent, "Select date");
    let field = only_field(&doc);

    assert!(apply(&mut doc, &field, ResolvedValue::text("2026-02-04")));
    assert_eq!(doc.value(inputs_of(&doc, root)[0]).unwrap(), "2026-02-04");
}

#[test]
fn date_range_splits_text_and_lists() {
    let mut doc = Document::new();
    let parent = form(&mut doc);
    let root = antd_range_picker(&mut doc, parent, "period", 2);
    let field = only_field(&doc);
    let inputs = inputs_of(&doc, root);

    assert!(apply(&mut doc, &field, ResolvedValue::text("2026-01-01, 2026-01-31")));
    assert_eq!(doc.value(inputs[0]).unwrap(), "2026-01-01");
    assert_eq!(doc.value(inputs[1]).unwrap(), "2026-01-31");

    let list = ResolvedValue::List(vec![json!("2026-03-01"), json!("2026-03-02")]);
    assert!(apply(&mut doc, &field, list));
    assert_eq!(doc.value(inputs[1]).unwrap(), "2026-03-02");
}

#[test]
fn date_range_with_missing_end_clears_it() {
    let mut doc = Document::new();
    let parent = form(&mut doc);
    let root = antd_range_picker(&mut doc, parent, "period", 2);
    let field = only_field(&doc);
    let inputs = inputs_of(&doc, root);

    assert!(apply(&mut doc, &field, ResolvedValue::text("2026-02-04")));
    assert_eq!(doc.value(inputs[0]).unwrap(), "2026-02-04");
    assert_eq!(doc.value(inputs[1]).unwrap(), "");
}

#[test]
fn date_range_needs_exactly_two_inputs() {
    let mut doc = Document::new();
    let parent = form(&mut doc);
    let root = antd_range_picker(&mut doc, parent, "period", 1);
    let field = only_field(&doc);

    assert!(!apply(&mut doc, &field, ResolvedValue::text("2026-01-01,2026-01-31")));
    assert_eq!(doc.value(inputs_of(&doc, root)[0]).unwrap(), "");
}

// =========================================================================
// Dropdowns
// =========================================================================

#[test]
fn dropdown_clicks_the_option_containing_the_text() {
    let mut doc = Document::new();
    let parent = form(&mut doc);
    let root = antd_select(&mut doc, parent, "Country", &["United States", "China"], false);
    let field = only_field(&doc);

    assert!(apply(&mut doc, &field, ResolvedValue::text("china")));
    assert_eq!(doc.attribute(root, "data-selected").unwrap().as_deref(), Some("China"));
}

#[test]
fn dropdown_without_match_takes_first_option() {
    let mut doc = Document::new();
    let parent = form(&mut doc);
    let root = antd_select(&mut doc, parent, "Country", &["United States", "China"], false);
    let field = only_field(&doc);

    assert!(apply(&mut doc, &field, ResolvedValue::text("Atlantis")));
    assert_eq!(
        doc.attribute(root, "data-selected").unwrap().as_deref(),
        Some("United States")
    );
}

#[test]
fn multi_dropdown_clicks_each_target() {
    let mut doc = Document::new();
    let parent = form(&mut doc);
    let root = antd_select(&mut doc, parent, "Tags", &["Red", "Green", "Blue"], true);
    let field = only_field(&doc);

    assert!(apply(&mut doc, &field, ResolvedValue::text("blue, red")));
    assert_eq!(doc.attribute(root, "data-selected").unwrap().as_deref(), Some("Blue,Red"));
}

#[test]
fn dropdown_without_options_reports_false() {
    let mut doc = Document::new();
    let parent = form(&mut doc);
    let root = antd_select(&mut doc, parent, "Country", &[], false);
    let field = only_field(&doc);

    assert!(!apply(&mut doc, &field, ResolvedValue::text("China")));
    assert_eq!(doc.attribute(root, "data-selected").unwrap(), None);
}

#[test]
fn dropdown_options_come_from_its_own_panel() {
    let mut doc = Document::new();
    let parent = form(&mut doc);
    let fruit = antd_select(&mut doc, parent, "Fruit", &["China Rose", "Banana"], false);
    let country = antd_select(&mut doc, parent, "Country", &["United States", "China"], false);
    let fields = discover(&doc);
    assert_eq!(fields.len(), 2);

    assert!(apply(&mut doc, &fields[0], ResolvedValue::text("Banana")));
    let fruit_panel = antd_panel_of(&doc, fruit).unwrap();
    assert!(doc.has_class(fruit_panel, "ant-select-dropdown-hidden").unwrap());

    // "China Rose" in the closed fruit panel must not satisfy "China"
    assert!(apply(&mut doc, &fields[1], ResolvedValue::text("China")));
    assert_eq!(doc.attribute(fruit, "data-selected").unwrap().as_deref(), Some("Banana"));
    assert_eq!(doc.attribute(country, "data-selected").unwrap().as_deref(), Some("China"));
}

#[test]
fn dropdown_fallback_stays_inside_its_panel() {
    let mut doc = Document::new();
    let parent = form(&mut doc);
    let fruit = antd_select(&mut doc, parent, "Fruit", &["China Rose", "Banana"], false);
    let country = antd_select(&mut doc, parent, "Country", &["United States", "China"], false);
    let fields = discover(&doc);

    assert!(apply(&mut doc, &fields[0], ResolvedValue::text("Banana")));
    assert!(apply(&mut doc, &fields[1], ResolvedValue::text("Atlantis")));
    assert_eq!(doc.attribute(fruit, "data-selected").unwrap().as_deref(), Some("Banana"));
    assert_eq!(
        doc.attribute(country, "data-selected").unwrap().as_deref(),
        Some("United States")
    );
}

#[test]
fn reopened_dropdown_reuses_its_panel() {
    let mut doc = Document::new();
    let parent = form(&mut doc);
    let fruit = antd_select(&mut doc, parent, "Fruit", &["China Rose", "Banana"], false);
    let field = only_field(&doc);

    assert!(apply(&mut doc, &field, ResolvedValue::text("Banana")));
    assert!(apply(&mut doc, &field, ResolvedValue::text("rose")));
    assert_eq!(
        doc.attribute(fruit, "data-selected").unwrap().as_deref(),
        Some("Banana,China Rose")
    );
}

#[test]
fn open_multi_dropdown_does_not_capture_the_next_dropdown() {
    let mut doc = Document::new();
    let parent = form(&mut doc);
    let tags = antd_select(&mut doc, parent, "Tags", &["Red", "Green"], true);
    let country = antd_select(&mut doc, parent, "Country", &["United States", "China"], false);
    let fields = discover(&doc);

    assert!(apply(&mut doc, &fields[0], ResolvedValue::text("green")));
    let tags_panel = antd_panel_of(&doc, tags).unwrap();
    assert!(!doc.has_class(tags_panel, "ant-select-dropdown-hidden").unwrap());

    assert!(apply(&mut doc, &fields[1], ResolvedValue::text("china")));
    assert_eq!(doc.attribute(tags, "data-selected").unwrap().as_deref(), Some("Green"));
    assert_eq!(doc.attribute(country, "data-selected").unwrap().as_deref(), Some("China"));
}

#[test]
fn element_dropdowns_skip_panels_hidden_by_style() {
    let mut doc = Document::new();
    let parent = form(&mut doc);
    let city = el_select(&mut doc, parent, "City", &["Shanghai", "Beijing"]);
    let size = el_select(&mut doc, parent, "Size", &["Small", "Large"]);
    let fields = discover(&doc);
    assert_eq!(fields.len(), 2);

    assert!(apply(&mut doc, &fields[0], ResolvedValue::text("beijing")));
    assert!(apply(&mut doc, &fields[1], ResolvedValue::text("large")));
    assert!(apply(&mut doc, &fields[0], ResolvedValue::text("shanghai")));

    assert_eq!(
        doc.attribute(city, "data-selected").unwrap().as_deref(),
        Some("Beijing,Shanghai")
    );
    assert_eq!(doc.attribute(size, "data-selected").unwrap().as_deref(), Some("Large"));
}

// =========================================================================
// Cascader
// =========================================================================

#[test]
fn cascader_paths_accept_text_and_lists() {
    assert_eq!(
        cascader_paths(&ResolvedValue::text("Zhejiang / Hangzhou, Jiangsu/Nanjing")),
        vec![
            vec!["Zhejiang".to_string(), "Hangzhou".to_string()],
            vec!["Jiangsu".to_string(), "Nanjing".to_string()],
        ]
    );
    assert_eq!(
        cascader_paths(&ResolvedValue::List(vec![json!("Zhejiang"), json!("Hangzhou")])),
        vec![vec!["Zhejiang".to_string(), "Hangzhou".to_string()]]
    );
    assert_eq!(
        cascader_paths(&ResolvedValue::List(vec![json!(["A", "B"]), json!(["C"])])),
        vec![vec!["A".to_string(), "B".to_string()], vec!["C".to_string()]]
    );
    assert!(cascader_paths(&ResolvedValue::Undefined).is_empty());
}

#[test]
fn cascader_walks_one_menu_per_segment() {
    let mut doc = Document::new();
    let parent = form(&mut doc);
    let root = antd_cascader(
        &mut doc,
        parent,
        "Region",
        &[("Zhejiang", &["Ningbo", "Hangzhou"]), ("Jiangsu", &["Nanjing"])],
    );
    let field = only_field(&doc);

    assert!(apply(&mut doc, &field, ResolvedValue::text("Zhejiang / Hangzhou")));
    assert_eq!(
        doc.attribute(root, "data-selected").unwrap().as_deref(),
        Some("Zhejiang/Hangzhou")
    );
}

#[test]
fn cascader_with_empty_path_clicks_nothing_but_the_root() {
    let mut doc = Document::new();
    let parent = form(&mut doc);
    let root = antd_cascader(&mut doc, parent, "Region", &[("Zhejiang", &["Hangzhou"])]);
    let field = only_field(&doc);

    assert!(!apply(&mut doc, &field, ResolvedValue::text(" , ")));
    assert_eq!(doc.events_for(root), vec![DomEvent::Click]);
}

// =========================================================================
// Bounded wait
// =========================================================================

#[test]
fn wait_returns_as_soon_as_the_check_succeeds() {
    let calls = Cell::new(0);
    let policy = WaitPolicy::from_millis(1000, 1);
    let found = policy
        .wait_for(|| {
            calls.set(calls.get() + 1);
            Ok((calls.get() >= 3).then_some("ready"))
        })
        .unwrap();

    assert_eq!(found, Some("ready"));
    assert_eq!(calls.get(), 3);
}

#[test]
fn wait_gives_up_after_its_timeout() {
    let policy = WaitPolicy::from_millis(30, 5);
    let started = Instant::now();
    let found: Option<()> = policy.wait_for(|| Ok(None)).unwrap();

    assert!(found.is_none());
    assert!(started.elapsed() >= Duration::from_millis(30));
}

#[test]
fn immediate_wait_checks_once() {
    let calls = Cell::new(0);
    let found: Option<()> = WaitPolicy::immediate()
        .wait_for(|| {
            calls.set(calls.get() + 1);
            Ok(None)
        })
        .unwrap();

    assert!(found.is_none());
    assert_eq!(calls.get(), 1);
}
