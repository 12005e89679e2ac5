//! Array-like node collections
//!
//! `HtmlCollection` is always live, `NodeList` is live or a static snapshot,
//! and `ElementArray` is a plain list of element handles. Live collections
//! re-run their filter lazily, once per tree generation.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;

use crate::{Document, Element, ElementData, Generation, HiddenSlots, NodeId, NodeRef};

/// Indexed, length-carrying collection of nodes
pub trait ArrayLike {
    /// Current number of items
    fn length(&self) -> usize;

    /// Item at a non-negative index
    fn item(&self, index: usize) -> Option<NodeRef>;

    /// Host slots attached to the collection object itself
    fn slots(&self) -> &RefCell<HiddenSlots>;

    /// Wrapped collection, for decorators that forward to another one
    fn inner(&self) -> Option<&dyn ArrayLike> {
        None
    }

    /// Concrete type, for decorators that need to recognise themselves
    fn as_any(&self) -> Option<&dyn Any> {
        None
    }

    /// Items in index order
    fn to_vec(&self) -> Vec<NodeRef> {
        (0..self.length()).filter_map(|i| self.item(i)).collect()
    }
}

/// Element filter for live collections
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionFilter {
    /// Carries every listed class; an empty list matches nothing
    ByClass(Vec<String>),
    /// Lowercase tag name, `*` for any
    ByTag(String),
    /// `name` attribute
    ByName(String),
}

impl CollectionFilter {
    pub fn matches(&self, el: &ElementData) -> bool {
        match self {
            Self::ByClass(classes) => {
                !classes.is_empty() && classes.iter().all(|c| el.has_class(c))
            }
            Self::ByTag(tag) => tag == "*" || el.tag_name == *tag,
            Self::ByName(name) => el.attrs.get_attribute("name") == Some(name.as_str()),
        }
    }
}

struct LiveQuery {
    doc: Document,
    root: NodeId,
    filter: CollectionFilter,
    cache: RefCell<Option<(Generation, Vec<NodeId>)>>,
}

impl LiveQuery {
    fn new(doc: Document, root: NodeId, filter: CollectionFilter) -> Self {
        Self {
            doc,
            root,
            filter,
            cache: RefCell::new(None),
        }
    }

    fn with_ids<R>(&self, f: impl FnOnce(&[NodeId]) -> R) -> R {
        let tree = self.doc.tree();
        let generation = tree.generation();
        let mut cache = self.cache.borrow_mut();

        let stale = !matches!(&*cache, Some((g, _)) if *g == generation);
        if stale {
            let ids = tree
                .descendants(self.root)
                .filter(|&id| tree.element(id).is_some_and(|e| self.filter.matches(e)))
                .collect();
            *cache = Some((generation, ids));
        }
        match &*cache {
            Some((_, ids)) => f(ids),
            None => f(&[]),
        }
    }
}

/// Live collection of elements
pub struct HtmlCollection {
    query: LiveQuery,
    slots: RefCell<HiddenSlots>,
}

impl HtmlCollection {
    pub fn new(doc: Document, root: NodeId, filter: CollectionFilter) -> Self {
        Self {
            query: LiveQuery::new(doc, root, filter),
            slots: RefCell::new(HiddenSlots::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.query.with_ids(<[NodeId]>::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Element> {
        let id = self.query.with_ids(|ids| ids.get(index).copied())?;
        Some(Element::from_parts(self.query.doc.clone(), id))
    }

    /// First element whose `id` or `name` attribute equals `name`
    pub fn named_item(&self, name: &str) -> Option<Element> {
        self.elements().into_iter().find(|el| {
            el.get_attribute("id").as_deref() == Some(name)
                || el.get_attribute("name").as_deref() == Some(name)
        })
    }

    pub fn elements(&self) -> Vec<Element> {
        let doc = &self.query.doc;
        self.query.with_ids(|ids| {
            ids.iter()
                .map(|&id| Element::from_parts(doc.clone(), id))
                .collect()
        })
    }

    pub fn filter(&self) -> &CollectionFilter {
        &self.query.filter
    }
}

impl ArrayLike for HtmlCollection {
    fn length(&self) -> usize {
        self.len()
    }

    fn item(&self, index: usize) -> Option<NodeRef> {
        self.get(index).map(NodeRef::from)
    }

    fn slots(&self) -> &RefCell<HiddenSlots> {
        &self.slots
    }
}

impl fmt::Debug for HtmlCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtmlCollection")
            .field("filter", &self.query.filter)
            .field("length", &self.len())
            .finish()
    }
}

enum NodeListKind {
    Static(Vec<NodeId>),
    Live(LiveQuery),
}

/// Static or live list of nodes
pub struct NodeList {
    doc: Document,
    kind: NodeListKind,
    slots: RefCell<HiddenSlots>,
}

impl NodeList {
    /// Fixed snapshot; later DOM changes are not reflected
    pub fn snapshot(doc: Document, ids: Vec<NodeId>) -> Self {
        Self {
            doc,
            kind: NodeListKind::Static(ids),
            slots: RefCell::new(HiddenSlots::new()),
        }
    }

    /// Live list over the whole document
    pub fn live(doc: Document, filter: CollectionFilter) -> Self {
        Self {
            doc: doc.clone(),
            kind: NodeListKind::Live(LiveQuery::new(doc, NodeId::ROOT, filter)),
            slots: RefCell::new(HiddenSlots::new()),
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self.kind, NodeListKind::Live(_))
    }

    pub fn len(&self) -> usize {
        match &self.kind {
            NodeListKind::Static(ids) => ids.len(),
            NodeListKind::Live(q) => q.with_ids(<[NodeId]>::len),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<NodeRef> {
        let id = match &self.kind {
            NodeListKind::Static(ids) => ids.get(index).copied(),
            NodeListKind::Live(q) => q.with_ids(|ids| ids.get(index).copied()),
        }?;
        Some(NodeRef::new(self.doc.clone(), id))
    }
}

impl ArrayLike for NodeList {
    fn length(&self) -> usize {
        self.len()
    }

    fn item(&self, index: usize) -> Option<NodeRef> {
        self.get(index)
    }

    fn slots(&self) -> &RefCell<HiddenSlots> {
        &self.slots
    }
}

impl fmt::Debug for NodeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeList")
            .field("live", &self.is_live())
            .field("length", &self.len())
            .finish()
    }
}

/// Plain array of element handles
#[derive(Debug, Default)]
pub struct ElementArray {
    items: Vec<Element>,
    slots: RefCell<HiddenSlots>,
}

impl ElementArray {
    pub fn new(items: Vec<Element>) -> Self {
        Self {
            items,
            slots: RefCell::new(HiddenSlots::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Element> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.items.iter()
    }
}

impl From<Vec<Element>> for ElementArray {
    fn from(items: Vec<Element>) -> Self {
        Self::new(items)
    }
}

impl ArrayLike for ElementArray {
    fn length(&self) -> usize {
        self.items.len()
    }

    fn item(&self, index: usize) -> Option<NodeRef> {
        self.items.get(index).cloned().map(NodeRef::from)
    }

    fn slots(&self) -> &RefCell<HiddenSlots> {
        &self.slots
    }
}
