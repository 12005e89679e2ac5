//! Edge case and stress tests for fos-dom
//!
//! These tests cover handle identity, stale handles, live collections under
//! mutation, and re-entrant event handlers.

use std::cell::Cell;
use std::rc::Rc;

use fos_dom::{
    ArrayLike, Document, DomError, Element, EventHandler, Integrity, ListenerOptions, SlotAttrs,
};

fn list(doc: &Document, n: usize, class: &str) -> Vec<Element> {
    (0..n)
        .map(|i| {
            let el = doc.create_element("li");
            el.set_class_name(class).unwrap();
            el.set_id(&format!("{class}-{i}")).unwrap();
            doc.body().append_child(&el).unwrap();
            el
        })
        .collect()
}

// ============================================================================
// HANDLE IDENTITY
// ============================================================================

#[test]
fn test_lookup_returns_same_identity() {
    let doc = Document::default();
    let items = list(&doc, 3, "row");

    let by_id = doc.get_element_by_id("row-1").unwrap();
    let by_class = doc.get_elements_by_class_name("row").get(1).unwrap();
    let by_query = doc.query_selector("#row-1").unwrap().unwrap();

    assert_eq!(by_id, items[1]);
    assert_eq!(by_class, items[1]);
    assert_eq!(by_query, items[1]);
}

#[test]
fn test_handles_from_different_documents_differ() {
    let a = Document::default();
    let b = Document::default();
    assert_ne!(a.body(), b.body());
    assert_eq!(a.body(), a.body());
}

#[test]
fn test_cross_document_append_rejected() {
    let a = Document::default();
    let b = Document::default();
    let foreign = b.create_element("div");
    assert_eq!(a.body().append_child(&foreign), Err(DomError::HierarchyRequest));
}

#[test]
fn test_append_ancestor_into_descendant_rejected() {
    let doc = Document::default();
    let outer = doc.create_element("div");
    let inner = doc.create_element("div");
    outer.append_child(&inner).unwrap();
    assert_eq!(inner.append_child(&outer), Err(DomError::HierarchyRequest));
}

// ============================================================================
// STALE HANDLES
// ============================================================================

#[test]
fn test_freed_subtree_handles_fail_cleanly() {
    let doc = Document::default();
    let parent = doc.create_element("section");
    let child = doc.create_element("p");
    parent.append_child(&child).unwrap();
    doc.body().append_child(&parent).unwrap();

    parent.free().unwrap();

    assert!(!child.is_live());
    assert!(child.get_attribute("id").is_none());
    assert_eq!(child.set_text_content("x"), Err(DomError::NotFound));
    assert_eq!(child.listener_count("click"), 0);
    assert!(doc.query_selector("p").unwrap().is_none());
}

#[test]
fn test_removed_element_stays_usable() {
    let doc = Document::default();
    let el = doc.create_element("div");
    doc.body().append_child(&el).unwrap();

    el.remove();
    assert!(!el.is_connected());
    el.set_attribute("data-x", "1").unwrap();
    assert_eq!(el.dataset_get("x").as_deref(), Some("1"));

    // Removing twice is a no-op
    el.remove();
}

// ============================================================================
// LIVE COLLECTIONS
// ============================================================================

#[test]
fn test_live_collection_tracks_removal_while_iterating() {
    let doc = Document::default();
    list(&doc, 5, "todo");
    let todos = doc.get_elements_by_class_name("todo");

    // Removing the class from index 0 repeatedly drains the collection
    let mut rounds = 0;
    while let Some(first) = todos.get(0) {
        first.set_class_name("done").unwrap();
        rounds += 1;
    }
    assert_eq!(rounds, 5);
    assert!(todos.is_empty());
}

#[test]
fn test_many_elements() {
    let doc = Document::default();
    list(&doc, 1_000, "n");
    let all = doc.get_elements_by_tag_name("li");
    assert_eq!(all.length(), 1_000);
    assert_eq!(all.item(999).unwrap().as_element().unwrap().id(), "n-999");
}

// ============================================================================
// EVENTS
// ============================================================================

#[test]
fn test_duplicate_listener_is_ignored() {
    let doc = Document::default();
    let el = doc.create_element("button");
    let hits = Rc::new(Cell::new(0));
    let h = hits.clone();
    let handler = EventHandler::new(move |_| h.set(h.get() + 1));

    assert!(el.add_event_listener("click", &handler, ListenerOptions::default()).unwrap());
    assert!(!el.add_event_listener("click", &handler, ListenerOptions::default()).unwrap());
    el.click();
    assert_eq!(hits.get(), 1);

    assert!(el.remove_event_listener("click", &handler, false).unwrap());
    el.click();
    assert_eq!(hits.get(), 1);
}

#[test]
fn test_once_listener() {
    let doc = Document::default();
    let el = doc.create_element("button");
    let hits = Rc::new(Cell::new(0));
    let h = hits.clone();
    let options = ListenerOptions {
        once: true,
        ..Default::default()
    };
    el.add_event_listener("click", &EventHandler::new(move |_| h.set(h.get() + 1)), options)
        .unwrap();

    el.click();
    el.click();
    assert_eq!(hits.get(), 1);
}

#[test]
fn test_handler_adding_listener_during_dispatch() {
    let doc = Document::default();
    let el = doc.create_element("button");
    let hits = Rc::new(Cell::new(0));

    let target = el.clone();
    let h = hits.clone();
    el.add_event_listener(
        "click",
        &EventHandler::new(move |_| {
            let h = h.clone();
            target
                .add_event_listener(
                    "click",
                    &EventHandler::new(move |_| h.set(h.get() + 1)),
                    ListenerOptions::default(),
                )
                .unwrap();
        }),
        ListenerOptions::default(),
    )
    .unwrap();

    el.click();
    assert_eq!(hits.get(), 0);
    assert_eq!(el.listener_count("click"), 2);
}

#[test]
fn test_prevent_default_and_disabled_click() {
    let doc = Document::default();
    let el = doc.create_element("a");
    el.add_event_listener(
        "click",
        &EventHandler::new(|e| e.prevent_default()),
        ListenerOptions::default(),
    )
    .unwrap();
    assert!(!el.click());

    let button = doc.create_element("button");
    button.set_disabled(true).unwrap();
    let hits = Rc::new(Cell::new(0));
    let h = hits.clone();
    button
        .set_inline_handler("onclick", Some(EventHandler::new(move |_| h.set(1))))
        .unwrap();
    button.click();
    assert_eq!(hits.get(), 0);
}

// ============================================================================
// HOST SLOTS
// ============================================================================

#[test]
fn test_slots_follow_integrity() {
    let doc = Document::default();
    let el = doc.create_element("div");

    el.with_slots_mut(|s| s.define("seen", true, SlotAttrs::PLAIN)).unwrap().unwrap();
    el.with_slots_mut(|s| s.seal());
    assert_eq!(el.with_slots(|s| s.integrity()), Some(Integrity::Sealed));
    assert!(el.with_slots_mut(|s| s.define("other", true, SlotAttrs::PLAIN)).unwrap().is_err());
    assert!(el.with_slots_mut(|s| s.assign("seen", false)).unwrap());

    // Slot writes are not DOM mutations
    let before = doc.generation();
    el.with_slots_mut(|s| s.assign("seen", true));
    assert_eq!(doc.generation(), before);
}
