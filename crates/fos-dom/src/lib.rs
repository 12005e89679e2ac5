//! fOS DOM - Document Object Model
//!
//! Arena-backed DOM tree with cheap shared handles. Elements, text nodes and
//! collections are addressed through handles that carry their document, so
//! higher layers can decorate them without owning the tree.

mod attributes;
mod classlist;
mod collection;
mod dataset;
mod document;
mod element;
mod error;
mod events;
mod generation;
mod node;
mod selector;
mod slots;
mod style;
mod tree;

pub use attributes::{Attr, NamedNodeMap};
pub use classlist::DOMTokenList;
pub use collection::{ArrayLike, CollectionFilter, ElementArray, HtmlCollection, NodeList};
pub use dataset::{to_camel_case, to_kebab_case, DOMStringMap};
pub use document::{Document, WeakDocument};
pub use element::{Element, NodeRef};
pub use error::{DomError, DomResult};
pub use events::{Event, EventHandler, EventListenerList, ListenerOptions};
pub use generation::Generation;
pub use node::{ElementData, Node, NodeData, NodeType, TextData};
pub use selector::{Compound, SelectorList};
pub use slots::{HiddenSlots, Integrity, SlotAttrs, SlotError};
pub use style::CssStyleDeclaration;
pub use tree::DomTree;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check that this is not the sentinel
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
