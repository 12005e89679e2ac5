//! End-to-end update behaviour over real documents

use std::cell::Cell;
use std::rc::Rc;

use fos_dom::{Document, Element, ElementArray, EventHandler};
use fos_enhance::{
    classify_update_keys, Config, EnhancedCollection, Enhancer, NativeUpdate, UpdateReport, Updates, Value,
};
use rstest::rstest;
use serde_json::json;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("fos_enhance=debug")
        .with_test_writer()
        .try_init();
}

fn buttons(n: usize) -> (Document, Enhancer, EnhancedCollection) {
    init_logging();
    let doc = Document::new("about:blank");
    for i in 0..n {
        let button = doc.create_element("button");
        button.set_text_content(&format!("Button {i}")).unwrap();
        doc.body().append_child(&button).unwrap();
    }
    let enhancer = Enhancer::default();
    let coll = enhancer.enhance_collection(doc.get_elements_by_tag_name("button"));
    (doc, enhancer, coll)
}

fn texts(doc: &Document) -> Vec<String> {
    doc.body().children().iter().map(Element::text_content).collect()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn scenario_bulk_class_with_first_and_last_text() {
    let (doc, _enhancer, coll) = buttons(3);

    let report = coll.update_with_report(json!({
        "classList": { "add": "btn" },
        "0": { "textContent": "First" },
        "-1": { "textContent": "Last" }
    }));

    assert!(report.is_clean());
    assert!(coll.every(|el| el.has_class("btn")));
    assert_eq!(texts(&doc), ["First", "Button 1", "Last"]);
}

#[test]
fn scenario_empty_collection_is_quiet() {
    init_logging();
    let doc = Document::default();
    let enhancer = Enhancer::default();
    let coll = enhancer.enhance_collection(doc.get_elements_by_class_name("missing"));
    let before = doc.generation();

    let report = coll.update_with_report(json!({ "style": { "color": "red" } }));

    assert!(report.is_clean());
    assert_eq!(report.applied, 0);
    assert_eq!(doc.generation(), before);
    assert_eq!(enhancer.stats().warnings, 0);
    assert_eq!(enhancer.stats().updates_applied, 0);
}

#[test]
fn scenario_toggle_twice_restores() {
    init_logging();
    let doc = Document::default();
    let el = doc.create_element("div");
    let el = Enhancer::default().enhance_element(&el).unwrap();

    el.update(json!({ "classList": { "toggle": ["a", "b"] } }));
    assert!(el.has_class("a") && el.has_class("b"));

    el.update(json!({ "classList": { "toggle": ["a", "b"] } }));
    assert!(!el.has_class("a") && !el.has_class("b"));
}

// ============================================================================
// Laws
// ============================================================================

#[rstest]
#[case(json!({ "style": { "color": "blue" }, "0": { "style": { "color": "red" } } }))]
#[case(json!({ "0": { "style": { "color": "red" } }, "style": { "color": "blue" } }))]
fn index_overrides_bulk(#[case] updates: serde_json::Value) {
    let (_doc, _enhancer, coll) = buttons(4);
    coll.update(updates);

    let colors = coll.map(|el, _| el.style_property("color").unwrap_or_default());
    assert_eq!(colors, ["red", "blue", "blue", "blue"]);
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(5)]
fn negative_index_matches_positive(#[case] len: usize) {
    let (left_doc, _, left) = buttons(len);
    let (right_doc, _, right) = buttons(len);

    left.update(json!({ "-1": { "textContent": "X", "title": "t" } }));
    let last = (len - 1).to_string();
    right.update(Updates::new().with(last.as_str(), json!({ "textContent": "X", "title": "t" })));

    assert_eq!(texts(&left_doc), texts(&right_doc));
    assert_eq!(left.at(-1).unwrap().title(), right.at(-1).unwrap().title());
}

#[rstest]
#[case("3")]
#[case("-4")]
#[case("100")]
fn out_of_bounds_is_reported(#[case] key: &str) {
    let (doc, _enhancer, coll) = buttons(3);
    let before = texts(&doc);

    let report = coll.update_with_report(Updates::new().with(key, json!({ "textContent": "X" })));

    assert_eq!(report.warning_count(), 1);
    assert_eq!(report.issues[0].key.as_deref(), Some(key));
    assert!(report.issues[0].message.contains("length 3"));
    assert_eq!(texts(&doc), before);
}

#[test]
fn listener_added_twice_fires_once() {
    let (_doc, _enhancer, coll) = buttons(1);
    let hits = Rc::new(Cell::new(0));
    let counter = hits.clone();
    let handler = EventHandler::new(move |_| counter.set(counter.get() + 1));
    let updates = Updates::new().with(
        "addEventListener",
        Value::Array(vec!["click".into(), handler.into()]),
    );

    let el = coll.first().unwrap();
    el.update(updates.clone()).update(updates);
    el.click();

    assert_eq!(hits.get(), 1);
    assert_eq!(el.listener_count("click"), 1);
}

#[test]
fn one_bad_directive_does_not_stop_the_rest() {
    let (_doc, enhancer, coll) = buttons(1);
    let el = coll.first().unwrap();

    let report = el.update_with_report(json!({
        "style": { "color": "red" },
        "classList": { "explode": "x" },
        "dataset": { "userId": "7" },
        "title": "ok",
        "setAttribute": ["type", "submit"]
    }));

    assert_eq!(report.applied, 4);
    assert_eq!(report.warning_count(), 1);
    assert_eq!(el.style_property("color").as_deref(), Some("red"));
    assert_eq!(el.get_attribute("data-user-id").as_deref(), Some("7"));
    assert_eq!(el.title(), "ok");
    assert_eq!(el.get_attribute("type").as_deref(), Some("submit"));
    assert_eq!(enhancer.stats().warnings, 1);
}

#[test]
fn classification_partitions_keys() {
    let updates = Updates::from_iter(
        ["0", "-1", "3.14", "1e2", "abc", "", "-0", "01", "12"]
            .into_iter()
            .map(|k| (k.into(), Value::Null)),
    );
    let classified = classify_update_keys(&updates);

    let index: Vec<i64> = classified.index_updates.iter().map(|u| u.index).collect();
    let bulk: Vec<&str> = classified.bulk_updates.string_entries().map(|(k, _)| k).collect();
    assert_eq!(index, [0, -1, 12]);
    assert_eq!(bulk, ["3.14", "1e2", "abc", "", "-0", "01"]);
}

#[test]
fn element_with_own_update_keeps_it_inside_collections() {
    let (doc, enhancer, coll) = buttons(3);
    let own = doc.body().children().remove(1);
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    NativeUpdate::new(move |_, _| {
        counter.set(counter.get() + 1);
        UpdateReport::new()
    })
    .install(&own)
    .unwrap();

    coll.update(json!({ "title": "bulk", "1": { "title": "indexed" } }));

    assert_eq!(calls.get(), 2);
    assert_eq!(own.title(), "");
    assert!(!enhancer.is_enhanced(&own));
    assert_eq!(coll.at(0).unwrap().title(), "bulk");
    assert_eq!(coll.at(-1).unwrap().title(), "bulk");
}

// ============================================================================
// Idempotence
// ============================================================================

#[test]
fn repeated_enhancement_adds_nothing() {
    let (doc, enhancer, coll) = buttons(2);
    let again = enhancer.enhance_collection(doc.get_elements_by_tag_name("button"));

    for el in coll.iter().chain(again.iter()) {
        assert!(enhancer.is_enhanced(&el));
        assert_eq!(el.with_slots(|s| s.len()), Some(1));
    }
    assert_eq!(enhancer.stats().elements_enhanced, 2);

    let same = enhancer.enhance_collection(coll.clone());
    assert!(same.ptr_eq(&coll));
}

#[test]
fn frozen_collection_still_updates() {
    init_logging();
    let doc = Document::default();
    let items: Vec<Element> = (0..2).map(|_| doc.create_element("li")).collect();
    let array = ElementArray::new(items.clone());
    fos_dom::ArrayLike::slots(&array).borrow_mut().freeze();

    let enhancer = Enhancer::default();
    let coll = enhancer.enhance_collection(array);
    assert!(enhancer.is_enhanced(&coll));

    coll.update(json!({ "className": "item", "-1": { "className": "item last" } }));
    assert_eq!(items[0].class_name(), "item");
    assert_eq!(items[1].class_name(), "item last");
}

#[test]
fn fine_grained_mode_skips_unchanged_writes() {
    init_logging();
    let doc = Document::default();
    for _ in 0..3 {
        doc.body().append_child(&doc.create_element("p")).unwrap();
    }
    let enhancer = Enhancer::new(Config {
        fine_grained: true,
        ..Config::default()
    });
    let coll = enhancer.enhance_collection(doc.get_elements_by_tag_name("p"));
    let updates = json!({ "style": { "color": "red" }, "hidden": false, "-1": { "title": "end" } });

    coll.update(updates.clone());
    let settled = doc.generation();
    coll.update(updates);
    assert_eq!(doc.generation(), settled);
}
