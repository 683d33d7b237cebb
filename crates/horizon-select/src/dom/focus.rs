//! Focus and active state.
//!
//! At most one element has focus. `:focus-within` and `:active` style
//! queries are answered by walking from the focused (or active) node up
//! through parents and shadow hosts.

use super::{DomError, DomTree, NodeId, Result};

impl DomTree {
    /// Move focus to an element.
    ///
    /// Elements that are not connected to the document cannot take focus;
    /// the call is then ignored.
    pub fn focus(&mut self, node: NodeId) -> Result<()> {
        if !self.contains_node(node) {
            return Err(DomError::NodeNotFound(node));
        }
        if !self.is_element(node) {
            return Err(DomError::NotAnElement(node));
        }
        if !self.is_connected(node) {
            tracing::trace!(target: "horizon_select::dom", ?node, "ignoring focus on disconnected element");
            return Ok(());
        }
        if self.focused != Some(node) {
            tracing::trace!(target: "horizon_select::dom", ?node, previous = ?self.focused, "focus moved");
            self.focused = Some(node);
        }
        Ok(())
    }

    /// Remove focus from `node` if it has it.
    pub fn blur(&mut self, node: NodeId) {
        if self.focused == Some(node) {
            tracing::trace!(target: "horizon_select::dom", ?node, "blurred");
            self.focused = None;
        }
    }

    /// The focused element, if any.
    pub fn focused_node(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn is_focused(&self, node: NodeId) -> bool {
        self.focused == Some(node)
    }

    /// Whether `node` or something inside it (including its shadow tree)
    /// has focus.
    pub fn has_focus_within(&self, node: NodeId) -> bool {
        self.focused
            .is_some_and(|f| self.is_shadow_including_inclusive_ancestor(node, f))
    }

    /// Mark `node` as being activated (e.g. pressed), or clear with `None`.
    pub fn set_active(&mut self, node: Option<NodeId>) {
        self.active = node;
    }

    /// Whether `node` is the active element or one of its ancestors.
    pub fn is_active(&self, node: NodeId) -> bool {
        self.active
            .is_some_and(|a| self.is_shadow_including_inclusive_ancestor(node, a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_and_blur() {
        let mut tree = DomTree::new();
        let list = tree.create_element("x-list");
        let item = tree.create_element("x-item");
        tree.append_child(tree.document(), list).unwrap();
        tree.append_child(list, item).unwrap();

        tree.focus(item).unwrap();
        assert!(tree.is_focused(item));
        assert!(tree.has_focus_within(list));
        assert!(!tree.is_focused(list));

        tree.blur(list);
        assert_eq!(tree.focused_node(), Some(item));
        tree.blur(item);
        assert_eq!(tree.focused_node(), None);
    }

    #[test]
    fn test_focus_within_crosses_shadow_root() {
        let mut tree = DomTree::new();
        let item = tree.create_element("x-item");
        tree.append_child(tree.document(), item).unwrap();
        let root = tree.attach_shadow(item).unwrap();
        let button = tree.create_element("button");
        tree.append_child(root, button).unwrap();

        tree.focus(button).unwrap();
        assert!(tree.has_focus_within(item));
    }

    #[test]
    fn test_disconnected_element_does_not_take_focus() {
        let mut tree = DomTree::new();
        let item = tree.create_element("x-item");
        tree.focus(item).unwrap();
        assert_eq!(tree.focused_node(), None);
    }

    #[test]
    fn test_removing_subtree_clears_focus() {
        let mut tree = DomTree::new();
        let list = tree.create_element("x-list");
        let item = tree.create_element("x-item");
        tree.append_child(tree.document(), list).unwrap();
        tree.append_child(list, item).unwrap();
        tree.focus(item).unwrap();
        tree.set_active(Some(item));

        tree.remove_child(tree.document(), list).unwrap();
        assert_eq!(tree.focused_node(), None);
        assert!(!tree.is_active(item));
    }

    #[test]
    fn test_active_applies_to_ancestors() {
        let mut tree = DomTree::new();
        let list = tree.create_element("x-list");
        let item = tree.create_element("x-item");
        tree.append_child(list, item).unwrap();

        tree.set_active(Some(item));
        assert!(tree.is_active(item));
        assert!(tree.is_active(list));
        tree.set_active(None);
        assert!(!tree.is_active(list));
    }

    #[test]
    fn test_focus_text_is_error() {
        let mut tree = DomTree::new();
        let text = tree.create_text("x");
        assert_eq!(tree.focus(text), Err(DomError::NotAnElement(text)));
    }
}
