//! Shadow roots, slots and slot-change bookkeeping.
//!
//! A host's element children are assigned to the first `<slot>` in its
//! shadow tree whose `name` matches the child's `slot` attribute; children
//! without a `slot` attribute go to the first unnamed slot. When a slot's
//! assignment may have changed the slot is queued, and
//! [`DomTree::dispatch_slot_changes`] later fires one bubbling
//! `slotchange` event per queued slot.

use super::node::{Node, NodeKind};
use super::{DomError, DomTree, Event, NodeId, Result};

fn slot_name(name: Option<&str>) -> &str {
    name.unwrap_or_default()
}

impl DomTree {
    /// Attach a shadow root to an element.
    pub fn attach_shadow(&mut self, host: NodeId) -> Result<NodeId> {
        let host_node = self.nodes.get(host).ok_or(DomError::NodeNotFound(host))?;
        if host_node.element().is_none() {
            return Err(DomError::NotAnElement(host));
        }
        if host_node.shadow_root.is_some() {
            return Err(DomError::ShadowRootExists(host));
        }

        let root = self.nodes.insert(Node::new(NodeKind::ShadowRoot { host }));
        if let Some(host_node) = self.nodes.get_mut(host) {
            host_node.shadow_root = Some(root);
        }
        Ok(root)
    }

    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.nodes.get(host)?.shadow_root
    }

    pub fn shadow_host(&self, root: NodeId) -> Option<NodeId> {
        match self.kind(root)? {
            NodeKind::ShadowRoot { host } => Some(*host),
            _ => None,
        }
    }

    /// The first slot in `host`'s shadow tree with the given name. `None`
    /// finds the unnamed slot.
    pub fn find_slot(&self, host: NodeId, name: Option<&str>) -> Option<NodeId> {
        let root = self.shadow_root(host)?;
        let wanted = slot_name(name);
        self.descendants(root).into_iter().find(|&node| {
            self.tag_name(node) == Some("slot") && slot_name(self.get_attribute(node, "name")) == wanted
        })
    }

    /// Elements assigned to a slot, in the host's child order.
    pub fn assigned_elements(&self, slot: NodeId) -> Vec<NodeId> {
        if self.tag_name(slot) != Some("slot") {
            return Vec::new();
        }
        let Some(host) = self.shadow_host(self.root_of(slot)) else {
            return Vec::new();
        };
        let name = self.get_attribute(slot, "name");
        if self.find_slot(host, name) != Some(slot) {
            return Vec::new();
        }

        let wanted = slot_name(name);
        self.element_children(host)
            .into_iter()
            .filter(|&child| slot_name(self.get_attribute(child, "slot")) == wanted)
            .collect()
    }

    /// Whether any slot is waiting for a `slotchange` dispatch.
    pub fn has_pending_slot_changes(&self) -> bool {
        !self.pending_slot_changes.is_empty()
    }

    /// Fire `slotchange` on every queued slot that still exists. Returns
    /// the number of events dispatched.
    pub fn dispatch_slot_changes(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending_slot_changes);
        let mut dispatched = 0;
        for slot in pending {
            if self.contains_node(slot) {
                self.dispatch_event(slot, Event::new("slotchange").bubbles(true));
                dispatched += 1;
            }
        }
        dispatched
    }

    fn queue_slot_change(&mut self, slot: NodeId) {
        if !self.pending_slot_changes.contains(&slot) {
            tracing::trace!(target: "horizon_select::dom", ?slot, "slot change queued");
            self.pending_slot_changes.push(slot);
        }
    }

    /// `child` is being added to or removed from `parent`.
    pub(super) fn note_child_assignment(&mut self, parent: NodeId, child: NodeId) {
        if !self.is_element(child) || self.shadow_root(parent).is_none() {
            return;
        }
        let name = self.get_attribute(child, "slot").map(str::to_string);
        if let Some(slot) = self.find_slot(parent, name.as_deref()) {
            self.queue_slot_change(slot);
        }
    }

    /// The `slot` attribute of `node` changed from `old` to `new`.
    pub(super) fn note_slot_attribute_change(&mut self, node: NodeId, old: Option<&str>, new: Option<&str>) {
        let Some(host) = self.parent(node) else {
            return;
        };
        for name in [old, new] {
            if let Some(slot) = self.find_slot(host, name) {
                self.queue_slot_change(slot);
            }
        }
    }

    /// `node` was inserted; queue any slot in its subtree that now has
    /// assigned elements.
    pub(super) fn note_slots_inserted(&mut self, node: NodeId) {
        let mut candidates = vec![node];
        candidates.extend(self.descendants(node));
        let slots: Vec<NodeId> = candidates
            .into_iter()
            .filter(|&n| self.tag_name(n) == Some("slot") && !self.assigned_elements(n).is_empty())
            .collect();
        for slot in slots {
            self.queue_slot_change(slot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn host_with_slots() -> (DomTree, NodeId, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let host = tree.create_element("x-list");
        tree.append_child(tree.document(), host).unwrap();
        let root = tree.attach_shadow(host).unwrap();
        let named = tree.create_element("slot");
        tree.set_attribute(named, "name", "header").unwrap();
        let unnamed = tree.create_element("slot");
        tree.append_child(root, named).unwrap();
        tree.append_child(root, unnamed).unwrap();
        (tree, host, named, unnamed)
    }

    #[test]
    fn test_attach_shadow_twice_fails() {
        let (mut tree, host, _, _) = host_with_slots();
        assert_eq!(tree.attach_shadow(host), Err(DomError::ShadowRootExists(host)));
    }

    #[test]
    fn test_find_slot() {
        let (tree, host, named, unnamed) = host_with_slots();
        assert_eq!(tree.find_slot(host, None), Some(unnamed));
        assert_eq!(tree.find_slot(host, Some("header")), Some(named));
        assert_eq!(tree.find_slot(host, Some("footer")), None);
    }

    #[test]
    fn test_assigned_elements_follow_slot_attribute() {
        let (mut tree, host, named, unnamed) = host_with_slots();
        let a = tree.create_element("x-item");
        let b = tree.create_element("x-item");
        let text = tree.create_text("text");
        tree.append_child(host, a).unwrap();
        tree.append_child(host, text).unwrap();
        tree.append_child(host, b).unwrap();
        tree.set_attribute(b, "slot", "header").unwrap();

        assert_eq!(tree.assigned_elements(unnamed), vec![a]);
        assert_eq!(tree.assigned_elements(named), vec![b]);
    }

    #[test]
    fn test_slot_changes_are_coalesced_and_dispatched() {
        let (mut tree, host, named, unnamed) = host_with_slots();
        tree.dispatch_slot_changes();

        let fired = Arc::new(Mutex::new(Vec::new()));
        let fired_clone = fired.clone();
        let root = tree.shadow_root(host).unwrap();
        tree.add_event_listener(root, "slotchange", move |e| {
            fired_clone.lock().push(e.target().unwrap());
        });

        for _ in 0..3 {
            let item = tree.create_element("x-item");
            tree.append_child(host, item).unwrap();
        }
        assert!(tree.has_pending_slot_changes());
        assert_eq!(tree.dispatch_slot_changes(), 1);
        assert_eq!(*fired.lock(), vec![unnamed]);
        assert!(!tree.has_pending_slot_changes());

        let child = tree.element_children(host)[0];
        tree.set_attribute(child, "slot", "header").unwrap();
        assert_eq!(tree.dispatch_slot_changes(), 2);
        assert_eq!(*fired.lock(), vec![unnamed, unnamed, named]);
    }

    #[test]
    fn test_inserting_slot_with_assignees_queues_it() {
        let mut tree = DomTree::new();
        let host = tree.create_element("x-list");
        let item = tree.create_element("x-item");
        tree.append_child(host, item).unwrap();
        let root = tree.attach_shadow(host).unwrap();

        let slot = tree.create_element("slot");
        tree.append_child(root, slot).unwrap();
        assert!(tree.has_pending_slot_changes());
        assert_eq!(tree.assigned_elements(slot), vec![item]);
    }
}
