//! Enhanced collections
//!
//! Wraps any `ArrayLike` with live length, enhanced index access,
//! array-style helpers and a two-phase `update`:
//!
//! 1. Bulk keys are applied to every element of a snapshot, in order.
//! 2. Index keys (negative ones count from the end) are applied to the
//!    element they name, overriding what the bulk phase wrote.
//!
//! Bulk always runs first, whatever the key order in the update object.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use fos_dom::{ArrayLike, Element, ElementArray, EventHandler, HiddenSlots, NodeRef, SlotAttrs, SlotError};

use crate::classify::{classify_update_keys, Classified, IndexUpdate};
use crate::element::apply_updates;
use crate::guard::Markable;
use crate::index::{resolve_index, ResolvedIndex};
use crate::{EnhancedElement, Enhancer, UpdateReport, Updates, Value};

struct Shared {
    raw: Rc<dyn ArrayLike>,
    slots: RefCell<HiddenSlots>,
}

/// Collection with enhanced element access and `update`
#[derive(Clone)]
pub struct EnhancedCollection {
    shared: Rc<Shared>,
    enhancer: Enhancer,
}

impl EnhancedCollection {
    pub(crate) fn new(raw: Rc<dyn ArrayLike>, enhancer: Enhancer) -> Self {
        Self {
            shared: Rc::new(Shared {
                raw,
                slots: RefCell::new(HiddenSlots::new()),
            }),
            enhancer,
        }
    }

    /// Wrapped collection
    pub fn raw(&self) -> &Rc<dyn ArrayLike> {
        &self.shared.raw
    }

    pub fn enhancer(&self) -> &Enhancer {
        &self.enhancer
    }

    /// Same wrapper (clones share identity)
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }

    /// Current length of the wrapped collection
    pub fn length(&self) -> usize {
        self.shared.raw.length()
    }

    pub fn is_empty(&self) -> bool {
        self.length() == 0
    }

    /// Enhanced element at `index`, read from the collection now
    pub fn get(&self, index: usize) -> Option<EnhancedElement> {
        let element = self.shared.raw.item(index)?.as_element()?;
        self.enhancer.enhance_element(&element)
    }

    /// Like `get`, with negative indices counting from the end
    pub fn at(&self, index: i64) -> Option<EnhancedElement> {
        match resolve_index(index, self.length()) {
            ResolvedIndex::InBounds(i) => self.get(i),
            ResolvedIndex::OutOfBounds(_) => None,
        }
    }

    pub fn first(&self) -> Option<EnhancedElement> {
        self.get(0)
    }

    pub fn last(&self) -> Option<EnhancedElement> {
        self.at(-1)
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            collection: self,
            next: 0,
        }
    }

    pub fn to_vec(&self) -> Vec<EnhancedElement> {
        self.iter().collect()
    }

    pub fn for_each(&self, mut f: impl FnMut(&EnhancedElement, usize)) -> &Self {
        for (i, el) in self.iter().enumerate() {
            f(&el, i);
        }
        self
    }

    pub fn map<T>(&self, mut f: impl FnMut(&EnhancedElement, usize) -> T) -> Vec<T> {
        self.iter().enumerate().map(|(i, el)| f(&el, i)).collect()
    }

    /// Matching elements as a new enhanced collection
    pub fn filter(&self, mut pred: impl FnMut(&EnhancedElement) -> bool) -> EnhancedCollection {
        let kept: Vec<Element> = self
            .iter()
            .filter(|el| pred(el))
            .map(Element::from)
            .collect();
        self.enhancer.enhance_collection(ElementArray::new(kept))
    }

    pub fn find(&self, mut pred: impl FnMut(&EnhancedElement) -> bool) -> Option<EnhancedElement> {
        self.iter().find(|el| pred(el))
    }

    pub fn some(&self, mut pred: impl FnMut(&EnhancedElement) -> bool) -> bool {
        self.iter().any(|el| pred(&el))
    }

    pub fn every(&self, mut pred: impl FnMut(&EnhancedElement) -> bool) -> bool {
        self.iter().all(|el| pred(&el))
    }

    pub fn reduce<A>(&self, init: A, mut f: impl FnMut(A, &EnhancedElement) -> A) -> A {
        self.iter().fold(init, |acc, el| f(acc, &el))
    }

    /// Not `hidden` and not `display: none`
    pub fn visible(&self) -> EnhancedCollection {
        self.filter(|el| is_visible(el))
    }

    pub fn hidden(&self) -> EnhancedCollection {
        self.filter(|el| !is_visible(el))
    }

    pub fn enabled(&self) -> EnhancedCollection {
        self.filter(|el| !el.disabled())
    }

    pub fn disabled(&self) -> EnhancedCollection {
        self.filter(|el| el.disabled())
    }

    pub fn add_class(&self, names: &[&str]) -> &Self {
        self.apply_to_all(class_op("add", names))
    }

    pub fn remove_class(&self, names: &[&str]) -> &Self {
        self.apply_to_all(class_op("remove", names))
    }

    pub fn toggle_class(&self, name: &str) -> &Self {
        self.apply_to_all(class_op("toggle", &[name]))
    }

    pub fn set_style(&self, styles: impl Into<Value>) -> &Self {
        self.apply_to_all(Updates::new().with("style", styles))
    }

    pub fn set_attribute(&self, name: &str, value: impl Into<Value>) -> &Self {
        let pair = Value::Array(vec![name.into(), value.into()]);
        self.apply_to_all(Updates::new().with("setAttribute", pair))
    }

    /// Property, method or attribute write through the element fallback
    pub fn set_property(&self, name: &str, value: impl Into<Value>) -> &Self {
        self.apply_to_all(Updates::new().with(name, value))
    }

    pub fn on(&self, event: &str, handler: &EventHandler) -> &Self {
        let args = Value::Array(vec![event.into(), handler.clone().into()]);
        self.apply_to_all(Updates::new().with("addEventListener", args))
    }

    pub fn off(&self, event: &str, handler: &EventHandler) -> &Self {
        let args = Value::Array(vec![event.into(), handler.clone().into()]);
        self.apply_to_all(Updates::new().with("removeEventListener", args))
    }

    fn apply_to_all(&self, updates: Updates) -> &Self {
        let updates = Value::Object(updates);
        for el in self.iter() {
            apply_updates(&self.enhancer, &el, &updates);
        }
        self
    }

    /// Two-phase update. Never fails; problems are logged.
    pub fn update(&self, updates: impl Into<Value>) -> &Self {
        self.update_with_report(updates);
        self
    }

    /// Same as `update`, returning what happened
    pub fn update_with_report(&self, updates: impl Into<Value>) -> UpdateReport {
        let updates = updates.into();
        let mut own = UpdateReport::new();
        let mut report = UpdateReport::new();

        let Some(map) = updates.as_object() else {
            let message = format!("update() expects an object, got {}", updates.kind());
            tracing::warn!("[Collection] {}", message);
            own.warn(None, message);
            self.enhancer.record(&own);
            return own;
        };

        let snapshot = self.snapshot();
        if snapshot.is_empty() {
            if self.enhancer.config().log_empty_collections {
                tracing::info!("[Collection] update() on empty collection, nothing to do");
            }
            own.info(None, "empty collection");
            self.enhancer.record(&own);
            return own;
        }

        let Classified {
            index_updates,
            bulk_updates,
        } = classify_update_keys(map);

        if !bulk_updates.is_empty() {
            let bulk = Value::Object(bulk_updates);
            for element in snapshot.iter().flatten() {
                if let Some(el) = self.enhancer.enhance_element(element) {
                    report.absorb(apply_updates(&self.enhancer, &el, &bulk));
                }
            }
        }

        let length = snapshot.len();
        for IndexUpdate { key, index, value } in index_updates {
            match resolve_index(index, length) {
                ResolvedIndex::InBounds(i) => {
                    let target = snapshot[i]
                        .as_ref()
                        .and_then(|el| self.enhancer.enhance_element(el));
                    match target {
                        Some(el) => report.absorb(apply_updates(&self.enhancer, &el, &value)),
                        None => {
                            tracing::warn!("[Collection] Index {} is not a live element", key);
                            own.warn(Some(&key), format!("index {key} is not a live element"));
                        }
                    }
                }
                ResolvedIndex::OutOfBounds(offset) => {
                    tracing::warn!(
                        "[Collection] Index {} out of bounds (resolved to {}, length {})",
                        key,
                        offset,
                        length
                    );
                    own.warn(
                        Some(&key),
                        format!("index {key} out of bounds (resolved to {offset}, length {length})"),
                    );
                }
            }
        }

        self.enhancer.record(&own);
        report.absorb(own);
        report
    }

    /// Elements at update time. Reads through a wrapped collection when
    /// there is one; non-element items keep their slot as `None`.
    fn snapshot(&self) -> Vec<Option<Element>> {
        let raw: &dyn ArrayLike = &*self.shared.raw;
        let source = raw.inner().unwrap_or(raw);
        (0..source.length())
            .map(|i| source.item(i).and_then(|node| node.as_element()))
            .collect()
    }
}

fn is_visible(el: &EnhancedElement) -> bool {
    !el.hidden() && el.style_property("display").as_deref() != Some("none")
}

fn class_op(op: &str, names: &[&str]) -> Updates {
    let names: Vec<Value> = names.iter().map(|&n| n.into()).collect();
    Updates::new().with("classList", Updates::new().with(op, Value::Array(names)))
}

impl ArrayLike for EnhancedCollection {
    fn length(&self) -> usize {
        self.shared.raw.length()
    }

    fn item(&self, index: usize) -> Option<NodeRef> {
        self.shared.raw.item(index)
    }

    fn slots(&self) -> &RefCell<HiddenSlots> {
        &self.shared.slots
    }

    fn inner(&self) -> Option<&dyn ArrayLike> {
        Some(&*self.shared.raw)
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

impl Markable for EnhancedCollection {
    fn read_slot(&self, key: &str) -> Option<bool> {
        (self as &dyn ArrayLike).read_slot(key)
    }

    fn define_slot(&self, key: &str, attrs: SlotAttrs) -> Result<(), SlotError> {
        (self as &dyn ArrayLike).define_slot(key, attrs)
    }

    fn assign_slot(&self, key: &str) -> bool {
        (self as &dyn ArrayLike).assign_slot(key)
    }
}

impl fmt::Debug for EnhancedCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnhancedCollection")
            .field("length", &self.length())
            .finish()
    }
}

/// Iterator over enhanced elements; re-reads the length on every step
pub struct Iter<'a> {
    collection: &'a EnhancedCollection,
    next: usize,
}

impl Iterator for Iter<'_> {
    type Item = EnhancedElement;

    fn next(&mut self) -> Option<EnhancedElement> {
        while self.next < self.collection.length() {
            let i = self.next;
            self.next += 1;
            if let Some(el) = self.collection.get(i) {
                return Some(el);
            }
        }
        None
    }
}

impl<'a> IntoIterator for &'a EnhancedCollection {
    type Item = EnhancedElement;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use fos_dom::Document;
    use serde_json::json;

    fn buttons(n: usize) -> (Document, EnhancedCollection) {
        let doc = Document::default();
        for i in 0..n {
            let b = doc.create_element("button");
            b.set_text_content(&format!("b{i}")).unwrap();
            doc.body().append_child(&b).unwrap();
        }
        let enhancer = Enhancer::new(Config::default());
        let coll = enhancer.enhance_collection(doc.get_elements_by_tag_name("button"));
        (doc, coll)
    }

    fn texts(coll: &EnhancedCollection) -> Vec<String> {
        coll.map(|el, _| el.text_content())
    }

    #[test]
    fn test_bulk_then_index_regardless_of_key_order() {
        let (_doc, coll) = buttons(3);
        coll.update(json!({
            "0": { "style": { "color": "red" } },
            "style": { "color": "blue" }
        }));

        let colors = coll.map(|el, _| el.style_property("color").unwrap());
        assert_eq!(colors, ["red", "blue", "blue"]);
    }

    #[test]
    fn test_negative_index_equivalence() {
        let (_a, left) = buttons(4);
        let (_b, right) = buttons(4);
        left.update(json!({ "-1": { "textContent": "end" } }));
        right.update(json!({ "3": { "textContent": "end" } }));
        assert_eq!(texts(&left), texts(&right));
    }

    #[test]
    fn test_out_of_bounds_warns() {
        let (_doc, coll) = buttons(3);
        let report = coll.update_with_report(json!({
            "3": { "textContent": "x" },
            "-4": { "textContent": "y" }
        }));

        assert_eq!(report.warning_count(), 2);
        assert_eq!(report.issues[0].key.as_deref(), Some("3"));
        assert!(report.issues[1].message.contains("resolved to -1, length 3"));
        assert_eq!(texts(&coll), ["b0", "b1", "b2"]);
    }

    #[test]
    fn test_empty_collection() {
        let (_doc, coll) = buttons(0);
        let report = coll.update_with_report(json!({ "style": { "color": "red" } }));
        assert!(report.is_clean());
        assert_eq!(report.issues.len(), 1);

        assert!(coll.first().is_none());
        assert!(coll.at(-1).is_none());
        assert!(coll.to_vec().is_empty());
        assert!(coll.every(|_| false));
        assert!(!coll.some(|_| true));
        assert_eq!(coll.reduce(0, |n, _| n + 1), 0);
        coll.add_class(&["x"]).set_style(json!({ "color": "red" })).toggle_class("y");
        assert!(coll.visible().is_empty());
    }

    #[test]
    fn test_live_length_and_access() {
        let (doc, coll) = buttons(2);
        assert_eq!(coll.length(), 2);
        doc.body().append_child(&doc.create_element("button")).unwrap();
        assert_eq!(coll.length(), 3);
        assert_eq!(coll.last().unwrap().text_content(), "");
        assert_eq!(coll.at(-3), coll.first());
    }

    #[test]
    fn test_helpers() {
        let (_doc, coll) = buttons(4);
        coll.get(1).unwrap().set_disabled(true).unwrap();
        coll.get(2).unwrap().set_hidden(true).unwrap();
        coll.get(3).unwrap().set_style_property("display", "none").unwrap();

        assert_eq!(coll.enabled().length(), 3);
        assert_eq!(coll.disabled().length(), 1);
        assert_eq!(coll.visible().length(), 2);
        assert_eq!(coll.hidden().length(), 2);

        coll.add_class(&["a", "b"]).remove_class(&["a"]).set_attribute("type", "button");
        assert!(coll.every(|el| el.class_name() == "b"));
        assert!(coll.every(|el| el.get_attribute("type").as_deref() == Some("button")));
        assert_eq!(coll.find(|el| el.disabled()), coll.get(1));
    }

    #[test]
    fn test_snapshot_sees_through_wrapper() {
        let (_doc, coll) = buttons(2);
        let rewrapped = coll.enhancer().enhance_collection(coll.clone());
        rewrapped.update(json!({ "-1": { "title": "last" } }));
        assert_eq!(coll.get(1).unwrap().title(), "last");
    }

    #[test]
    fn test_non_element_items_warn() {
        let doc = Document::default();
        let text = doc.create_text_node("t");
        let el = doc.create_element("p");
        let list = fos_dom::NodeList::snapshot(doc.clone(), vec![text.node_id(), el.node_id()]);
        let coll = Enhancer::default().enhance_collection(list);

        let report = coll.update_with_report(json!({ "title": "all", "0": { "title": "first" } }));
        assert_eq!(report.warning_count(), 1);
        assert_eq!(el.title(), "all");
        assert_eq!(coll.length(), 2);
        assert_eq!(coll.to_vec().len(), 1);
    }
}
