//! Node and Element handles
//!
//! A handle is (document, node id). Handles compare equal when they point at
//! the same node of the same document, so identity survives cloning.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::attributes::validate_name;
use crate::dataset::DOMStringMap;
use crate::{
    CssStyleDeclaration, DOMTokenList, Document, DomError, DomResult, ElementData, Event,
    EventHandler, HiddenSlots, ListenerOptions, NodeId, NodeList, NodeType,
};

/// Handle to any node
#[derive(Clone)]
pub struct NodeRef {
    doc: Document,
    id: NodeId,
}

impl NodeRef {
    pub fn new(doc: Document, id: NodeId) -> Self {
        Self { doc, id }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn node_id(&self) -> NodeId {
        self.id
    }

    /// Node type, `None` once the slot is released
    pub fn node_type(&self) -> Option<NodeType> {
        self.doc.tree().get(self.id).and_then(|n| n.node_type())
    }

    pub fn is_element(&self) -> bool {
        self.node_type() == Some(NodeType::Element)
    }

    /// Element view of this node
    pub fn as_element(&self) -> Option<Element> {
        self.is_element()
            .then(|| Element::from_parts(self.doc.clone(), self.id))
    }

    pub fn text_content(&self) -> String {
        self.doc.tree().text_content(self.id)
    }

    pub fn is_connected(&self) -> bool {
        self.doc.tree().is_connected(self.id)
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.doc.ptr_eq(&other.doc)
    }
}

impl Eq for NodeRef {}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeRef({:?}, {:?})", self.id, self.node_type())
    }
}

impl From<Element> for NodeRef {
    fn from(el: Element) -> Self {
        el.node
    }
}

/// Handle to an element node
#[derive(Clone, PartialEq, Eq)]
pub struct Element {
    node: NodeRef,
}

impl Element {
    pub(crate) fn from_parts(doc: Document, id: NodeId) -> Self {
        Self {
            node: NodeRef::new(doc, id),
        }
    }

    pub fn node(&self) -> &NodeRef {
        &self.node
    }

    pub fn document(&self) -> &Document {
        &self.node.doc
    }

    pub fn node_id(&self) -> NodeId {
        self.node.id
    }

    /// Still an element (its slot has not been released)
    pub fn is_live(&self) -> bool {
        self.document().tree().element(self.node_id()).is_some()
    }

    pub fn is_connected(&self) -> bool {
        self.node.is_connected()
    }

    /// Read element data
    pub fn with_data<R>(&self, f: impl FnOnce(&ElementData) -> R) -> Option<R> {
        self.document().tree().element(self.node_id()).map(f)
    }

    /// Mutate element data and record a DOM mutation
    pub fn with_data_mut<R>(&self, f: impl FnOnce(&mut ElementData) -> R) -> DomResult<R> {
        let mut tree = self.document().tree_mut();
        let el = tree.element_mut(self.node_id()).ok_or(DomError::NotFound)?;
        let out = f(el);
        tree.touch();
        Ok(out)
    }

    /// Read host slots
    pub fn with_slots<R>(&self, f: impl FnOnce(&HiddenSlots) -> R) -> Option<R> {
        self.with_data(|d| f(&d.slots))
    }

    /// Mutate host slots. Not a DOM mutation, so the generation is kept.
    pub fn with_slots_mut<R>(&self, f: impl FnOnce(&mut HiddenSlots) -> R) -> Option<R> {
        let mut tree = self.document().tree_mut();
        tree.element_mut(self.node_id()).map(|d| f(&mut d.slots))
    }

    /// Lowercase local name
    pub fn local_name(&self) -> String {
        self.with_data(|d| d.tag_name.clone()).unwrap_or_default()
    }

    /// Uppercase tag name
    pub fn tag_name(&self) -> String {
        self.local_name().to_ascii_uppercase()
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    pub fn get_attribute(&self, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        self.with_data(|d| d.get_attr(&name)).flatten()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }

    pub fn set_attribute(&self, name: &str, value: &str) -> DomResult<()> {
        let name = name.to_ascii_lowercase();
        validate_name(&name)?;
        self.with_data_mut(|d| {
            if name == "style" {
                d.style = CssStyleDeclaration::parse(value);
                Ok(())
            } else {
                d.attrs.set_attribute(&name, value)
            }
        })?
    }

    /// Remove an attribute, returning whether it was present
    pub fn remove_attribute(&self, name: &str) -> DomResult<bool> {
        let name = name.to_ascii_lowercase();
        self.with_data_mut(|d| {
            if name == "style" {
                let had = !d.style.is_empty();
                d.style = CssStyleDeclaration::new();
                had
            } else {
                d.attrs.remove_named_item(&name).is_some()
            }
        })
    }

    pub fn toggle_attribute(&self, name: &str, force: Option<bool>) -> DomResult<bool> {
        let name = name.to_ascii_lowercase();
        self.with_data_mut(|d| d.attrs.toggle_attribute(&name, force))?
    }

    pub fn attribute_names(&self) -> Vec<String> {
        self.with_data(|d| {
            let mut names: Vec<String> = d
                .attrs
                .get_attribute_names()
                .into_iter()
                .map(str::to_string)
                .collect();
            if !d.style.is_empty() {
                names.push("style".to_string());
            }
            names
        })
        .unwrap_or_default()
    }

    /// The `id` attribute, empty when absent
    pub fn id(&self) -> String {
        self.get_attribute("id").unwrap_or_default()
    }

    pub fn set_id(&self, id: &str) -> DomResult<()> {
        self.set_attribute("id", id)
    }

    // ------------------------------------------------------------------
    // Classes
    // ------------------------------------------------------------------

    pub fn class_name(&self) -> String {
        self.get_attribute("class").unwrap_or_default()
    }

    pub fn set_class_name(&self, value: &str) -> DomResult<()> {
        self.set_attribute("class", value)
    }

    /// Snapshot of the class list
    pub fn class_list(&self) -> DOMTokenList {
        DOMTokenList::from_string(&self.class_name())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.with_data(|d| d.has_class(class)).unwrap_or(false)
    }

    /// Edit the class list; the result is written back to `class`
    pub fn update_class_list<R>(
        &self,
        f: impl FnOnce(&mut DOMTokenList) -> DomResult<R>,
    ) -> DomResult<R> {
        let mut list = self.class_list();
        let out = f(&mut list)?;
        self.set_attribute("class", &list.value())?;
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Style and dataset
    // ------------------------------------------------------------------

    pub fn style(&self) -> CssStyleDeclaration {
        self.with_data(|d| d.style.clone()).unwrap_or_default()
    }

    pub fn style_property(&self, name: &str) -> Option<String> {
        self.with_data(|d| d.style.get_property_value(name).map(str::to_string))
            .flatten()
    }

    pub fn set_style_property(&self, name: &str, value: &str) -> DomResult<()> {
        self.with_data_mut(|d| d.style.set_property(name, value))?
    }

    pub fn remove_style_property(&self, name: &str) -> DomResult<Option<String>> {
        self.with_data_mut(|d| d.style.remove_property(name))
    }

    pub fn dataset(&self) -> DOMStringMap {
        self.with_data(|d| {
            DOMStringMap::from_attributes(d.attrs.iter().map(|a| (a.name.as_str(), a.value.as_str())))
        })
        .unwrap_or_default()
    }

    pub fn dataset_get(&self, key: &str) -> Option<String> {
        self.get_attribute(&DOMStringMap::to_attribute_name(key))
    }

    /// Set a dataset entry. Keys with `-` followed by a lowercase letter
    /// are rejected, as the DOM does.
    pub fn dataset_set(&self, key: &str, value: &str) -> DomResult<()> {
        let bytes = key.as_bytes();
        if bytes
            .windows(2)
            .any(|w| w[0] == b'-' && w[1].is_ascii_lowercase())
        {
            return Err(DomError::InvalidCharacter(key.to_string()));
        }
        self.set_attribute(&DOMStringMap::to_attribute_name(key), value)
    }

    pub fn dataset_remove(&self, key: &str) -> DomResult<bool> {
        self.remove_attribute(&DOMStringMap::to_attribute_name(key))
    }

    // ------------------------------------------------------------------
    // Content and state
    // ------------------------------------------------------------------

    pub fn text_content(&self) -> String {
        self.node.text_content()
    }

    pub fn set_text_content(&self, text: &str) -> DomResult<()> {
        self.document().tree_mut().set_text_content(self.node_id(), text)
    }

    pub fn value(&self) -> String {
        self.with_data(|d| d.value.clone()).unwrap_or_default()
    }

    pub fn set_value(&self, value: &str) -> DomResult<()> {
        self.with_data_mut(|d| d.value = value.to_string())
    }

    pub fn checked(&self) -> bool {
        self.with_data(|d| d.checked).unwrap_or(false)
    }

    pub fn set_checked(&self, checked: bool) -> DomResult<()> {
        self.with_data_mut(|d| d.checked = checked)
    }

    pub fn hidden(&self) -> bool {
        self.has_attribute("hidden")
    }

    pub fn set_hidden(&self, hidden: bool) -> DomResult<()> {
        self.toggle_attribute("hidden", Some(hidden)).map(|_| ())
    }

    pub fn disabled(&self) -> bool {
        self.has_attribute("disabled")
    }

    pub fn set_disabled(&self, disabled: bool) -> DomResult<()> {
        self.toggle_attribute("disabled", Some(disabled)).map(|_| ())
    }

    pub fn title(&self) -> String {
        self.get_attribute("title").unwrap_or_default()
    }

    pub fn set_title(&self, title: &str) -> DomResult<()> {
        self.set_attribute("title", title)
    }

    /// Parsed `tabindex`, -1 when absent or malformed
    pub fn tab_index(&self) -> i32 {
        self.get_attribute("tabindex")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(-1)
    }

    pub fn set_tab_index(&self, index: i32) -> DomResult<()> {
        self.set_attribute("tabindex", &index.to_string())
    }

    // ------------------------------------------------------------------
    // Tree
    // ------------------------------------------------------------------

    pub fn parent_element(&self) -> Option<Element> {
        let parent = self.document().tree().parent_element(self.node_id())?;
        self.document().element(parent)
    }

    /// Child elements
    pub fn children(&self) -> Vec<Element> {
        let ids: Vec<NodeId> = {
            let tree = self.document().tree();
            tree.children(self.node_id())
                .filter(|(_, n)| n.is_element())
                .map(|(id, _)| id)
                .collect()
        };
        ids.into_iter()
            .map(|id| Element::from_parts(self.document().clone(), id))
            .collect()
    }

    pub fn append_child(&self, child: &Element) -> DomResult<()> {
        if !child.document().ptr_eq(self.document()) {
            return Err(DomError::HierarchyRequest);
        }
        self.document()
            .tree_mut()
            .append_child(self.node_id(), child.node_id())
    }

    /// Append a text node
    pub fn append_text(&self, text: &str) -> DomResult<()> {
        let mut tree = self.document().tree_mut();
        let node = tree.create_text(text);
        tree.append_child(self.node_id(), node)
    }

    /// Detach from the parent; the element stays usable
    pub fn remove(&self) {
        let mut tree = self.document().tree_mut();
        if tree.get(self.node_id()).is_some_and(|n| n.parent.is_valid()) {
            tree.detach(self.node_id());
            tree.touch();
        }
    }

    /// Detach and release this subtree's arena slots
    pub fn free(&self) -> DomResult<()> {
        self.document().tree_mut().free_subtree(self.node_id())
    }

    pub fn query_selector(&self, selector: &str) -> DomResult<Option<Element>> {
        self.node.query_first(selector)
    }

    pub fn query_selector_all(&self, selector: &str) -> DomResult<NodeList> {
        self.node.query_all(selector)
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Register a listener. Returns false for a duplicate registration.
    pub fn add_event_listener(
        &self,
        event_type: &str,
        handler: &EventHandler,
        options: ListenerOptions,
    ) -> DomResult<bool> {
        let mut tree = self.document().tree_mut();
        let el = tree.element_mut(self.node_id()).ok_or(DomError::NotFound)?;
        Ok(el.listeners.add(event_type, handler.clone(), options))
    }

    pub fn remove_event_listener(
        &self,
        event_type: &str,
        handler: &EventHandler,
        capture: bool,
    ) -> DomResult<bool> {
        let mut tree = self.document().tree_mut();
        let el = tree.element_mut(self.node_id()).ok_or(DomError::NotFound)?;
        Ok(el.listeners.remove(event_type, handler, capture))
    }

    pub fn listener_count(&self, event_type: &str) -> usize {
        self.with_data(|d| d.listeners.count(event_type))
            .unwrap_or(0)
    }

    /// Set or clear an inline `on*` handler property
    pub fn set_inline_handler(&self, name: &str, handler: Option<EventHandler>) -> DomResult<()> {
        let name = name.to_ascii_lowercase();
        let mut tree = self.document().tree_mut();
        let el = tree.element_mut(self.node_id()).ok_or(DomError::NotFound)?;
        el.inline_handlers.retain(|(n, _)| *n != name);
        if let Some(handler) = handler {
            el.inline_handlers.push((name, handler));
        }
        Ok(())
    }

    /// Attach a host object under `name`, or remove it with `None`. Not a
    /// DOM mutation; the object is dropped when the node is released.
    pub fn set_expando(&self, name: &str, value: Option<Rc<dyn Any>>) -> DomResult<()> {
        let mut tree = self.document().tree_mut();
        let el = tree.element_mut(self.node_id()).ok_or(DomError::NotFound)?;
        el.expandos.retain(|(n, _)| n != name);
        if let Some(value) = value {
            el.expandos.push((name.to_string(), value));
        }
        Ok(())
    }

    pub fn expando(&self, name: &str) -> Option<Rc<dyn Any>> {
        self.with_data(|d| d.expando(name).cloned()).flatten()
    }

    pub fn inline_handler(&self, name: &str) -> Option<EventHandler> {
        let name = name.to_ascii_lowercase();
        self.with_data(|d| d.inline_handler(&name).cloned()).flatten()
    }

    /// Dispatch an event at this element, bubbling through element
    /// ancestors. Returns false if the default action was prevented.
    pub fn dispatch_event(&self, event: &Event) -> bool {
        event.set_target(self);

        let mut current = Some(self.clone());
        while let Some(el) = current {
            event.set_current_target(Some(&el));
            let inline_name = format!("on{}", event.event_type());
            let handlers: Vec<EventHandler> = {
                let mut tree = self.document().tree_mut();
                match tree.element_mut(el.node_id()) {
                    Some(data) => {
                        let mut hs = data.listeners.take_for_dispatch(event.event_type());
                        hs.extend(data.inline_handler(&inline_name).cloned());
                        hs
                    }
                    None => Vec::new(),
                }
            };
            // No tree borrow is held while handlers run
            for handler in handlers {
                handler.call(event);
            }

            if !event.bubbles() || event.is_propagation_stopped() {
                break;
            }
            current = el.parent_element();
        }

        event.set_current_target(None);
        !event.is_default_prevented()
    }

    /// Fire a click unless the element is disabled
    pub fn click(&self) -> bool {
        if self.disabled() {
            return false;
        }
        self.dispatch_event(&Event::cancelable("click"))
    }

    pub fn focus(&self) {
        if !self.is_live() || self.is_focused() {
            return;
        }
        let previous = self.document().active_element();
        if let Some(prev) = previous {
            prev.blur();
        }
        self.document().tree_mut().set_active_element(self.node_id());
        self.dispatch_event(&Event::non_bubbling("focus"));
    }

    pub fn blur(&self) {
        if !self.is_focused() {
            return;
        }
        self.document().tree_mut().set_active_element(NodeId::NONE);
        self.dispatch_event(&Event::non_bubbling("blur"));
    }

    pub fn is_focused(&self) -> bool {
        self.document().tree().active_element() == self.node_id()
    }

    /// Record a scroll request (there is no viewport to move)
    pub fn scroll_into_view(&self) {
        let mut tree = self.document().tree_mut();
        if let Some(el) = tree.element_mut(self.node_id()) {
            el.scroll_requests += 1;
        }
    }

    pub fn scroll_requests(&self) -> u32 {
        self.with_data(|d| d.scroll_requests).unwrap_or(0)
    }
}

impl PartialEq<NodeRef> for Element {
    fn eq(&self, other: &NodeRef) -> bool {
        self.node == *other
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Element(<{}> {:?})", self.local_name(), self.node_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn attached(doc: &Document, tag: &str) -> Element {
        let el = doc.create_element(tag);
        doc.body().append_child(&el).unwrap();
        el
    }

    #[test]
    fn test_handle_identity() {
        let doc = Document::default();
        let a = attached(&doc, "div");
        let b = doc.element(a.node_id()).unwrap();
        let other_doc = Document::default();
        let c = other_doc.element(a.node_id());

        assert_eq!(a, b);
        assert!(c.is_none() || c.unwrap() != a);
    }

    #[test]
    fn test_style_attribute_reflection() {
        let doc = Document::default();
        let el = attached(&doc, "div");
        el.set_style_property("color", "red").unwrap();
        assert_eq!(el.get_attribute("style").as_deref(), Some("color: red;"));

        el.set_attribute("style", "margin-top: 4px").unwrap();
        assert_eq!(el.style_property("marginTop").as_deref(), Some("4px"));
        assert!(el.style_property("color").is_none());
    }

    #[test]
    fn test_class_list_write_back() {
        let doc = Document::default();
        let el = attached(&doc, "div");
        el.update_class_list(|l| l.add(&["a", "b"])).unwrap();
        assert_eq!(el.class_name(), "a b");
        assert!(el.has_class("b"));

        let err = el.update_class_list(|l| l.add(&["bad token"]));
        assert!(err.is_err());
        assert_eq!(el.class_name(), "a b");
    }

    #[test]
    fn test_dataset() {
        let doc = Document::default();
        let el = attached(&doc, "div");
        el.dataset_set("userId", "7").unwrap();

        assert_eq!(el.get_attribute("data-user-id").as_deref(), Some("7"));
        assert_eq!(el.dataset().get("userId"), Some("7"));
        assert!(el.dataset_set("user-id", "x").is_err());
    }

    #[test]
    fn test_dispatch_bubbles_and_inline() {
        let doc = Document::default();
        let outer = attached(&doc, "div");
        let inner = doc.create_element("button");
        outer.append_child(&inner).unwrap();

        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        outer
            .add_event_listener("click", &EventHandler::new(move |_| h.set(h.get() + 1)), ListenerOptions::default())
            .unwrap();
        let h = hits.clone();
        inner
            .set_inline_handler("onclick", Some(EventHandler::new(move |_| h.set(h.get() + 10))))
            .unwrap();

        assert!(inner.click());
        assert_eq!(hits.get(), 11);
    }

    #[test]
    fn test_handlers_may_mutate_dom() {
        let doc = Document::default();
        let el = attached(&doc, "button");
        let target = el.clone();
        el.add_event_listener(
            "click",
            &EventHandler::new(move |_| target.set_text_content("clicked").unwrap()),
            ListenerOptions::default(),
        )
        .unwrap();

        el.click();
        assert_eq!(el.text_content(), "clicked");
    }

    #[test]
    fn test_focus_and_blur() {
        let doc = Document::default();
        let a = attached(&doc, "input");
        let b = attached(&doc, "input");

        a.focus();
        assert!(a.is_focused());
        b.focus();
        assert!(!a.is_focused());
        assert_eq!(doc.active_element(), Some(b.clone()));
        b.blur();
        assert!(doc.active_element().is_none());
    }

    #[test]
    fn test_freed_element_is_not_live() {
        let doc = Document::default();
        let el = attached(&doc, "div");
        el.free().unwrap();

        assert!(!el.is_live());
        assert!(el.set_attribute("a", "b").is_err());
        assert!(!el.click());
    }

    #[test]
    fn test_expando_lifetime() {
        let doc = Document::default();
        let el = attached(&doc, "div");
        let before = doc.generation();
        let payload: Rc<dyn Any> = Rc::new(42u32);

        el.set_expando("hook", Some(payload.clone())).unwrap();
        assert_eq!(doc.generation(), before);
        assert_eq!(el.expando("hook").unwrap().downcast_ref::<u32>(), Some(&42));
        assert_eq!(Rc::strong_count(&payload), 2);

        el.free().unwrap();
        assert!(el.expando("hook").is_none());
        assert_eq!(Rc::strong_count(&payload), 1);
    }
}
