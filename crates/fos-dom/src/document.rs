//! Document - High-level document API
//!
//! `Document` is a cheap, clonable handle to one tree. Single-threaded by
//! design: the tree sits behind `Rc<RefCell<..>>`, and borrows never outlive
//! a single call so event handlers are free to mutate the DOM.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::collection::{CollectionFilter, HtmlCollection, NodeList};
use crate::{DomResult, DomTree, Element, Generation, NodeId, NodeRef, SelectorList};

struct DocumentInner {
    tree: RefCell<DomTree>,
    url: String,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
}

/// HTML Document handle
#[derive(Clone)]
pub struct Document {
    inner: Rc<DocumentInner>,
}

impl Document {
    /// Create a document with the basic html/head/body structure
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        // Fresh nodes under the root cannot violate hierarchy rules
        let root = tree.root();
        for (parent, child) in [(root, html), (html, head), (html, body)] {
            let _ = tree.append_child(parent, child);
        }
        tracing::debug!("Created document: {}", url);

        Self {
            inner: Rc::new(DocumentInner {
                tree: RefCell::new(tree),
                url: url.to_string(),
                html_element: html,
                head_element: head,
                body_element: body,
            }),
        }
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Borrow the tree
    pub fn tree(&self) -> Ref<'_, DomTree> {
        self.inner.tree.borrow()
    }

    /// Borrow the tree mutably
    pub fn tree_mut(&self) -> RefMut<'_, DomTree> {
        self.inner.tree.borrow_mut()
    }

    /// Same underlying document
    pub fn ptr_eq(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Non-owning reference, for caches that must not keep the tree alive
    pub fn downgrade(&self) -> WeakDocument {
        WeakDocument(Rc::downgrade(&self.inner))
    }

    /// Current mutation generation
    pub fn generation(&self) -> Generation {
        self.tree().generation()
    }

    /// Get document title
    pub fn title(&self) -> String {
        let tree = self.tree();
        tree.children(self.inner.head_element)
            .find(|(_, node)| node.as_element().is_some_and(|e| e.tag_name == "title"))
            .map(|(id, _)| tree.text_content(id))
            .unwrap_or_default()
    }

    /// Get <html> element
    pub fn document_element(&self) -> Element {
        Element::from_parts(self.clone(), self.inner.html_element)
    }

    /// Get <head> element
    pub fn head(&self) -> Element {
        Element::from_parts(self.clone(), self.inner.head_element)
    }

    /// Get <body> element
    pub fn body(&self) -> Element {
        Element::from_parts(self.clone(), self.inner.body_element)
    }

    /// Create a detached element
    pub fn create_element(&self, tag_name: &str) -> Element {
        let id = self.tree_mut().create_element(tag_name);
        Element::from_parts(self.clone(), id)
    }

    /// Create a detached text node
    pub fn create_text_node(&self, text: &str) -> NodeRef {
        let id = self.tree_mut().create_text(text);
        NodeRef::new(self.clone(), id)
    }

    /// Handle for any node id
    pub fn node(&self, id: NodeId) -> NodeRef {
        NodeRef::new(self.clone(), id)
    }

    /// Handle for an element id, if the slot holds an element
    pub fn element(&self, id: NodeId) -> Option<Element> {
        self.tree()
            .element(id)
            .map(|_| Element::from_parts(self.clone(), id))
    }

    /// Get element by ID (first in tree order)
    pub fn get_element_by_id(&self, id: &str) -> Option<Element> {
        let found = {
            let tree = self.tree();
            tree.descendants(tree.root()).find(|&nid| {
                tree.element(nid)
                    .is_some_and(|e| e.attrs.get_attribute("id") == Some(id))
            })
        };
        found.map(|nid| Element::from_parts(self.clone(), nid))
    }

    /// Live collection of elements carrying all the given classes
    pub fn get_elements_by_class_name(&self, class_names: &str) -> HtmlCollection {
        let classes = class_names.split_whitespace().map(str::to_string).collect();
        HtmlCollection::new(self.clone(), NodeId::ROOT, CollectionFilter::ByClass(classes))
    }

    /// Live collection of elements with the given tag (`*` for all)
    pub fn get_elements_by_tag_name(&self, tag_name: &str) -> HtmlCollection {
        HtmlCollection::new(
            self.clone(),
            NodeId::ROOT,
            CollectionFilter::ByTag(tag_name.to_ascii_lowercase()),
        )
    }

    /// Live node list of elements with the given `name` attribute
    pub fn get_elements_by_name(&self, name: &str) -> NodeList {
        NodeList::live(self.clone(), CollectionFilter::ByName(name.to_string()))
    }

    /// First element matching a selector
    pub fn query_selector(&self, selector: &str) -> DomResult<Option<Element>> {
        self.document_node().query_first(selector)
    }

    /// Static snapshot of all elements matching a selector
    pub fn query_selector_all(&self, selector: &str) -> DomResult<NodeList> {
        self.document_node().query_all(selector)
    }

    fn document_node(&self) -> NodeRef {
        NodeRef::new(self.clone(), NodeId::ROOT)
    }

    /// Focused element
    pub fn active_element(&self) -> Option<Element> {
        let id = self.tree().active_element();
        self.element(id)
    }
}

impl NodeRef {
    pub(crate) fn query_first(&self, selector: &str) -> DomResult<Option<Element>> {
        let list = SelectorList::parse(selector)?;
        let doc = self.document();
        let found = {
            let tree = doc.tree();
            tree.descendants(self.node_id())
                .find(|&id| list.matches(&tree, id))
        };
        Ok(found.map(|id| Element::from_parts(doc.clone(), id)))
    }

    pub(crate) fn query_all(&self, selector: &str) -> DomResult<NodeList> {
        let list = SelectorList::parse(selector)?;
        let doc = self.document();
        let ids: Vec<NodeId> = {
            let tree = doc.tree();
            tree.descendants(self.node_id())
                .filter(|&id| list.matches(&tree, id))
                .collect()
        };
        Ok(NodeList::snapshot(doc.clone(), ids))
    }
}

/// Weak document reference
#[derive(Clone)]
pub struct WeakDocument(Weak<DocumentInner>);

impl WeakDocument {
    pub fn upgrade(&self) -> Option<Document> {
        self.0.upgrade().map(|inner| Document { inner })
    }

    /// Points at `doc` (and `doc` is still alive)
    pub fn is(&self, doc: &Document) -> bool {
        std::ptr::eq(self.0.as_ptr(), Rc::as_ptr(&doc.inner))
    }
}

impl fmt::Debug for WeakDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WeakDocument(alive: {})", self.0.strong_count() > 0)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("url", &self.inner.url)
            .field("nodes", &self.inner.tree.borrow().len())
            .finish()
    }
}
