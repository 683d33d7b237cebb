//! The element tree arena and its structural operations.

use slotmap::SlotMap;

use super::event::Listener;
use super::mutation::Observer;
use super::node::{ElementData, Node, NodeKind};
use super::{DomError, ListenerId, NodeId, ObserverId, Result};

/// An arena-backed element tree.
///
/// Nodes are created detached and inserted with [`append_child`] or
/// [`insert_before`]. Every structural change and attribute write is
/// reported to the registered mutation observers.
///
/// [`append_child`]: DomTree::append_child
/// [`insert_before`]: DomTree::insert_before
pub struct DomTree {
    pub(super) nodes: SlotMap<NodeId, Node>,
    pub(super) document: NodeId,
    pub(super) focused: Option<NodeId>,
    pub(super) active: Option<NodeId>,
    pub(super) observers: SlotMap<ObserverId, Observer>,
    pub(super) listeners: SlotMap<ListenerId, Listener>,
    pub(super) next_listener_seq: u64,
    pub(super) pending_slot_changes: Vec<NodeId>,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// Create a tree containing only a document node.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let document = nodes.insert(Node::new(NodeKind::Document));
        Self {
            nodes,
            document,
            focused: None,
            active: None,
            observers: SlotMap::with_key(),
            listeners: SlotMap::with_key(),
            next_listener_seq: 0,
            pending_slot_changes: Vec::new(),
        }
    }

    /// The document node.
    pub fn document(&self) -> NodeId {
        self.document
    }

    /// Create a detached element. The tag name is stored lowercase.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes
            .insert(Node::new(NodeKind::Element(ElementData::new(tag))))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.nodes.insert(Node::new(NodeKind::Text(text.to_string())))
    }

    /// Whether the handle refers to a node of this tree.
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.nodes.get(node).map(|n| &n.kind)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|n| n.parent)
    }

    /// All child nodes, in order. Empty for unknown nodes.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Element children, in order.
    pub fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .filter(|&child| self.is_element(child))
            .collect()
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(|n| n.element().is_some())
    }

    /// The lowercase tag name of an element.
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node)?.element().map(ElementData::tag)
    }

    /// The parent, or the host when `node` is a shadow root.
    pub fn composed_parent(&self, node: NodeId) -> Option<NodeId> {
        let n = self.nodes.get(node)?;
        match n.kind {
            NodeKind::ShadowRoot { host } => Some(host),
            _ => n.parent,
        }
    }

    /// Whether `node` is reachable from the document, crossing shadow roots.
    pub fn is_connected(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == self.document {
                return true;
            }
            current = self.composed_parent(n);
        }
        false
    }

    /// The topmost ancestor reachable through parent links.
    pub fn root_of(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Whether `ancestor` is `node` or one of its parents.
    pub(super) fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    /// Like [`is_inclusive_ancestor`](Self::is_inclusive_ancestor) but
    /// continues from shadow roots to their hosts.
    pub(super) fn is_shadow_including_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.composed_parent(n);
        }
        false
    }

    /// Nodes under `node` in tree order, excluding `node` itself. Shadow
    /// trees are not entered.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev().copied());
        }
        out
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Append `child` as the last child of `parent`, moving it if it is
    /// already attached somewhere.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` into `parent` before `reference`, or last when
    /// `reference` is `None`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) -> Result<()> {
        let parent_node = self.nodes.get(parent).ok_or(DomError::NodeNotFound(parent))?;
        let child_node = self.nodes.get(child).ok_or(DomError::NodeNotFound(child))?;

        if !parent_node.is_container()
            || matches!(child_node.kind, NodeKind::Document | NodeKind::ShadowRoot { .. })
            || self.is_shadow_including_inclusive_ancestor(child, parent)
        {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) {
                return Err(DomError::NotAChild { child: reference, parent });
            }
            if reference == child {
                return Ok(());
            }
        }

        if let Some(old_parent) = self.parent(child) {
            self.detach(old_parent, child);
        }

        let node = self.nodes.get_mut(parent).ok_or(DomError::NodeNotFound(parent))?;
        let position = reference
            .and_then(|r| node.children.iter().position(|&c| c == r))
            .unwrap_or(node.children.len());
        node.children.insert(position, child);
        if let Some(child_node) = self.nodes.get_mut(child) {
            child_node.parent = Some(parent);
        }

        tracing::trace!(target: "horizon_select::dom", ?parent, ?child, "inserted node");
        self.record_child_list(parent, vec![child], Vec::new());
        self.note_child_assignment(parent, child);
        self.note_slots_inserted(child);
        Ok(())
    }

    /// Remove `child` from `parent`. The node stays in the arena, detached.
    ///
    /// Focus and active state inside the removed subtree are cleared.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if !self.contains_node(parent) {
            return Err(DomError::NodeNotFound(parent));
        }
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotAChild { child, parent });
        }
        self.detach(parent, child);
        Ok(())
    }

    fn detach(&mut self, parent: NodeId, child: NodeId) {
        // Assignment must be computed while the child is still attached.
        self.note_child_assignment(parent, child);

        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.retain(|&c| c != child);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = None;
        }

        if self
            .focused
            .is_some_and(|f| self.is_shadow_including_inclusive_ancestor(child, f))
        {
            self.focused = None;
        }
        if self
            .active
            .is_some_and(|a| self.is_shadow_including_inclusive_ancestor(child, a))
        {
            self.active = None;
        }

        tracing::trace!(target: "horizon_select::dom", ?parent, ?child, "removed node");
        self.record_child_list(parent, Vec::new(), vec![child]);
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    pub fn get_attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes.get(node)?.element()?.get(name)
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.get_attribute(node, name).is_some()
    }

    /// Set an attribute. Always produces a mutation record, even when the
    /// value is unchanged.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        let element = self.element_mut(node)?;
        let old = element.set(name, value);

        if name == "slot" && old.as_deref() != Some(value) {
            self.note_slot_attribute_change(node, old.as_deref(), Some(value));
        }
        self.record_attribute(node, name, old);
        Ok(())
    }

    /// Remove an attribute. Returns whether it was present; removing an
    /// absent attribute produces no mutation record.
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<bool> {
        let element = self.element_mut(node)?;
        let Some(old) = element.remove(name) else {
            return Ok(false);
        };

        if name == "slot" {
            self.note_slot_attribute_change(node, Some(old.as_str()), None);
        }
        self.record_attribute(node, name, Some(old));
        Ok(true)
    }

    /// Add the attribute with an empty value if absent, otherwise remove it.
    /// Returns whether the attribute is present afterwards.
    pub fn toggle_attribute(&mut self, node: NodeId, name: &str) -> Result<bool> {
        if self.has_attribute(node, name) {
            self.remove_attribute(node, name)?;
            Ok(false)
        } else {
            self.set_attribute(node, name, "")?;
            Ok(true)
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut ElementData> {
        self.nodes
            .get_mut(node)
            .ok_or(DomError::NodeNotFound(node))?
            .element_mut()
            .ok_or(DomError::NotAnElement(node))
    }
}

impl std::fmt::Debug for DomTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomTree")
            .field("nodes", &self.nodes.len())
            .field("focused", &self.focused)
            .field("observers", &self.observers.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
