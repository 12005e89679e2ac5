//! DOM Node - arena record
//!
//! Nodes link to each other through `NodeId`s instead of pointers; the
//! payload lives in `NodeData`. Released slots become `Vacant` so stale ids
//! never alias a newer node's data.

use std::any::Any;
use std::rc::Rc;

use crate::{
    CssStyleDeclaration, EventHandler, EventListenerList, HiddenSlots, NamedNodeMap, NodeId,
};

/// DOM node type, numbered as in the DOM standard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Text = 3,
    Comment = 8,
    Document = 9,
}

/// DOM Node - Core structure
#[derive(Debug)]
pub struct Node {
    /// Parent node (NONE if root or detached)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    fn with_data(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Create a new element node
    pub fn element(tag_name: &str) -> Self {
        Self::with_data(NodeData::Element(Box::new(ElementData::new(tag_name))))
    }

    /// Create a new text node
    pub fn text(content: String) -> Self {
        Self::with_data(NodeData::Text(TextData { content }))
    }

    /// Create a comment node
    pub fn comment(content: String) -> Self {
        Self::with_data(NodeData::Comment(content))
    }

    /// Create a document node
    pub fn document() -> Self {
        Self::with_data(NodeData::Document)
    }

    /// Node type, `None` for released slots
    pub fn node_type(&self) -> Option<NodeType> {
        match &self.data {
            NodeData::Document => Some(NodeType::Document),
            NodeData::Element(_) => Some(NodeType::Element),
            NodeData::Text(_) => Some(NodeType::Text),
            NodeData::Comment(_) => Some(NodeType::Comment),
            NodeData::Vacant => None,
        }
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Check if this is text
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    /// Check if the slot was released
    #[inline]
    pub fn is_vacant(&self) -> bool {
        matches!(self.data, NodeData::Vacant)
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(&t.content),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug)]
pub enum NodeData {
    /// Document root
    Document,
    /// Element
    Element(Box<ElementData>),
    /// Text content
    Text(TextData),
    /// Comment
    Comment(String),
    /// Released arena slot
    Vacant,
}

/// Element-specific data
#[derive(Debug)]
pub struct ElementData {
    /// Lowercase local name
    pub tag_name: String,
    /// Attributes; `class` and `id` are stored here
    pub attrs: NamedNodeMap,
    /// Inline style (reflected as the `style` attribute)
    pub style: CssStyleDeclaration,
    /// Form control value
    pub value: String,
    /// Form control checkedness
    pub checked: bool,
    /// addEventListener registrations
    pub listeners: EventListenerList,
    /// Inline `on*` handler properties
    pub inline_handlers: Vec<(String, EventHandler)>,
    /// Host bookkeeping flags
    pub slots: HiddenSlots,
    /// Host objects attached by name (script expandos)
    pub expandos: Vec<(String, Rc<dyn Any>)>,
    /// scrollIntoView requests
    pub scroll_requests: u32,
}

impl ElementData {
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs: NamedNodeMap::new(),
            style: CssStyleDeclaration::new(),
            value: String::new(),
            checked: false,
            listeners: EventListenerList::new(),
            inline_handlers: Vec::new(),
            slots: HiddenSlots::new(),
            expandos: Vec::new(),
            scroll_requests: 0,
        }
    }

    /// Get an attribute value; `style` is serialized from the declaration
    pub fn get_attr(&self, name: &str) -> Option<String> {
        if name == "style" {
            return (!self.style.is_empty()).then(|| self.style.css_text());
        }
        self.attrs.get_attribute(name).map(str::to_string)
    }

    /// Class attribute tokens
    pub fn has_class(&self, class: &str) -> bool {
        self.attrs
            .get_attribute("class")
            .is_some_and(|c| c.split_whitespace().any(|t| t == class))
    }

    pub fn expando(&self, name: &str) -> Option<&Rc<dyn Any>> {
        self.expandos.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Inline handler for an `on*` property
    pub fn inline_handler(&self, name: &str) -> Option<&EventHandler> {
        self.inline_handlers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, h)| h)
    }
}

/// Text node data
#[derive(Debug)]
pub struct TextData {
    pub content: String,
}
