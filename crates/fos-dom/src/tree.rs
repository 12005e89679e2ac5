//! DOM Tree (arena-based allocation)

use crate::{DomError, DomResult, ElementData, Generation, Node, NodeId};

/// Arena-based DOM tree
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
    generation: Generation,
    active_element: NodeId,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
            generation: Generation::INITIAL,
            active_element: NodeId::NONE,
        }
    }

    /// Document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID (released slots included)
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Get element data
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    /// Get mutable element data. Callers that mutate must `touch` the tree.
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(Node::as_element_mut)
    }

    /// Number of arena slots
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree has no slots
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of slots that still hold a node
    pub fn live_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.is_vacant()).count()
    }

    /// Current mutation generation
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Record a mutation
    pub fn touch(&mut self) -> Generation {
        self.generation = self.generation.next();
        self.generation
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.alloc(Node::element(tag_name))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(Node::text(text.to_string()))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.alloc(Node::comment(text.to_string()))
    }

    fn live(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id)
            .filter(|n| !n.is_vacant())
            .ok_or(DomError::NotFound)
    }

    /// Check whether `ancestor` is `node` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = node;
        while current.is_valid() {
            if current == ancestor {
                return true;
            }
            current = match self.get(current) {
                Some(n) => n.parent,
                None => return false,
            };
        }
        false
    }

    /// Append a child, moving it from its current parent if needed
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let parent_node = self.live(parent)?;
        if !(parent_node.is_element() || parent == NodeId::ROOT) {
            return Err(DomError::HierarchyRequest);
        }
        self.live(child)?;
        if child == NodeId::ROOT || self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest);
        }

        self.detach(child);

        let last = self.nodes[parent.index()].last_child;
        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = last;
        }
        if last.is_valid() {
            self.nodes[last.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        self.nodes[parent.index()].last_child = child;

        self.touch();
        Ok(())
    }

    /// Remove a child from its parent. The node stays allocated.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        if self.live(child)?.parent != parent {
            return Err(DomError::NotAChild);
        }
        self.detach(child);
        self.touch();
        Ok(())
    }

    /// Unlink a node from its parent and siblings
    pub fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else {
            return;
        };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);
        if !parent.is_valid() {
            return;
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }

        let node = &mut self.nodes[id.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    /// Detach a subtree and release its slots. Listener registrations and
    /// host slots go with the node data.
    pub fn free_subtree(&mut self, id: NodeId) -> DomResult<()> {
        if id == NodeId::ROOT {
            return Err(DomError::HierarchyRequest);
        }
        self.live(id)?;
        self.detach(id);

        let mut doomed: Vec<NodeId> = self.descendants(id).collect();
        doomed.push(id);
        tracing::trace!("Releasing {} nodes under {:?}", doomed.len(), id);
        for nid in doomed {
            if nid == self.active_element {
                self.active_element = NodeId::NONE;
            }
            let node = &mut self.nodes[nid.index()];
            node.data = crate::NodeData::Vacant;
            node.parent = NodeId::NONE;
            node.first_child = NodeId::NONE;
            node.last_child = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }

        self.touch();
        Ok(())
    }

    /// Iterate direct children
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let first = self.get(id).map_or(NodeId::NONE, |n| n.first_child);
        Children { tree: self, next: first }
    }

    /// Iterate descendants in tree order (excluding `root` itself)
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        let first = self.get(root).map_or(NodeId::NONE, |n| n.first_child);
        Descendants {
            tree: self,
            root,
            next: first,
        }
    }

    /// Check if the node is attached to the document
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|n| !n.is_vacant()) && self.is_inclusive_ancestor(NodeId::ROOT, id)
    }

    /// Nearest element ancestor
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.get(id)?.parent;
        self.element(parent).map(|_| parent)
    }

    /// Concatenated text of the node and its descendants
    pub fn text_content(&self, id: NodeId) -> String {
        let Some(node) = self.get(id) else {
            return String::new();
        };
        if let Some(text) = node.as_text() {
            return text.to_string();
        }
        self.descendants(id)
            .filter_map(|d| self.get(d).and_then(Node::as_text))
            .collect()
    }

    /// Replace all children with a single text node
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> DomResult<()> {
        if let Some(crate::NodeData::Text(t)) = self.get_mut(id).map(|n| &mut n.data) {
            t.content = text.to_string();
            self.touch();
            return Ok(());
        }
        self.live(id)?;

        let children: Vec<NodeId> = self.children(id).map(|(cid, _)| cid).collect();
        for child in children {
            self.free_subtree(child)?;
        }
        if !text.is_empty() {
            let node = self.create_text(text);
            self.append_child(id, node)?;
        }
        self.touch();
        Ok(())
    }

    /// Focused element
    pub fn active_element(&self) -> NodeId {
        self.active_element
    }

    pub fn set_active_element(&mut self, id: NodeId) {
        self.active_element = id;
    }
}

/// Child iterator
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

/// Pre-order descendant iterator
pub struct Descendants<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: NodeId,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next;
        let node = self.tree.get(current)?;

        self.next = if node.first_child.is_valid() {
            node.first_child
        } else {
            let mut n = current;
            loop {
                if n == self.root {
                    break NodeId::NONE;
                }
                let Some(up) = self.tree.get(n) else {
                    break NodeId::NONE;
                };
                if up.next_sibling.is_valid() {
                    break up.next_sibling;
                }
                n = up.parent;
                if !n.is_valid() {
                    break NodeId::NONE;
                }
            }
        };
        Some(current)
    }
}
