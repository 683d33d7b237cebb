//! Mutation observers.
//!
//! An observer watches a target node (and optionally its light-tree
//! descendants) for attribute and child-list changes. Records are queued
//! per observer in the order the changes happened and handed out in one
//! batch by [`DomTree::take_records`].

use slotmap::new_key_type;

use super::{DomError, DomTree, NodeId, Result};

new_key_type! {
    /// Identifier of a registered mutation observer.
    pub struct ObserverId;
}

/// What an observer watches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationObserverInit {
    /// Report attribute changes.
    pub attributes: bool,
    /// Include the previous attribute value in records.
    pub attribute_old_value: bool,
    /// Only report these attribute names. `None` reports all.
    pub attribute_filter: Option<Vec<String>>,
    /// Report child insertions and removals.
    pub child_list: bool,
    /// Extend observation to all descendants of the target.
    pub subtree: bool,
}

impl MutationObserverInit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attributes(mut self) -> Self {
        self.attributes = true;
        self
    }

    pub fn with_attribute_old_value(mut self) -> Self {
        self.attribute_old_value = true;
        self
    }

    pub fn with_attribute_filter<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attribute_filter = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_child_list(mut self) -> Self {
        self.child_list = true;
        self
    }

    pub fn with_subtree(mut self) -> Self {
        self.subtree = true;
        self
    }

    /// Asking for old values or filtering attributes implies `attributes`.
    fn normalized(mut self) -> Self {
        if self.attribute_old_value || self.attribute_filter.is_some() {
            self.attributes = true;
        }
        self
    }

    fn wants_attribute(&self, name: &str) -> bool {
        self.attributes
            && self
                .attribute_filter
                .as_ref()
                .is_none_or(|filter| filter.iter().any(|f| f == name))
    }
}

/// The kind of change a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Attributes,
    ChildList,
}

/// One observed change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub kind: MutationKind,
    /// The element whose attribute changed, or the parent whose children
    /// changed.
    pub target: NodeId,
    pub attribute_name: Option<String>,
    /// The attribute value before the change, when requested. `None` means
    /// the attribute was absent.
    pub old_value: Option<String>,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
}

#[derive(Debug)]
pub(super) struct Observer {
    target: NodeId,
    init: MutationObserverInit,
    records: Vec<MutationRecord>,
}

impl DomTree {
    /// Start observing `target`.
    pub fn observe(&mut self, target: NodeId, init: MutationObserverInit) -> Result<ObserverId> {
        if !self.contains_node(target) {
            return Err(DomError::NodeNotFound(target));
        }
        let id = self.observers.insert(Observer {
            target,
            init: init.normalized(),
            records: Vec::new(),
        });
        tracing::debug!(target: "horizon_select::dom", ?id, ?target, "observer registered");
        Ok(id)
    }

    /// Stop an observer and drop its queued records. Returns `false` if it
    /// was not registered.
    pub fn disconnect_observer(&mut self, id: ObserverId) -> bool {
        let removed = self.observers.remove(id).is_some();
        if removed {
            tracing::debug!(target: "horizon_select::dom", ?id, "observer disconnected");
        }
        removed
    }

    /// Take all records queued for an observer, oldest first.
    pub fn take_records(&mut self, id: ObserverId) -> Vec<MutationRecord> {
        self.observers
            .get_mut(id)
            .map(|o| std::mem::take(&mut o.records))
            .unwrap_or_default()
    }

    /// Whether an observer has queued records.
    pub fn has_records(&self, id: ObserverId) -> bool {
        self.observers.get(id).is_some_and(|o| !o.records.is_empty())
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn observes(&self, observer: &Observer, node: NodeId) -> bool {
        observer.target == node || (observer.init.subtree && self.is_inclusive_ancestor(observer.target, node))
    }

    pub(super) fn record_attribute(&mut self, target: NodeId, name: &str, old_value: Option<String>) {
        let interested: Vec<ObserverId> = self
            .observers
            .iter()
            .filter(|(_, o)| o.init.wants_attribute(name) && self.observes(o, target))
            .map(|(id, _)| id)
            .collect();

        for id in interested {
            if let Some(observer) = self.observers.get_mut(id) {
                let old_value = if observer.init.attribute_old_value {
                    old_value.clone()
                } else {
                    None
                };
                observer.records.push(MutationRecord {
                    kind: MutationKind::Attributes,
                    target,
                    attribute_name: Some(name.to_string()),
                    old_value,
                    added_nodes: Vec::new(),
                    removed_nodes: Vec::new(),
                });
            }
        }
    }

    pub(super) fn record_child_list(&mut self, parent: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) {
        let interested: Vec<ObserverId> = self
            .observers
            .iter()
            .filter(|(_, o)| o.init.child_list && self.observes(o, parent))
            .map(|(id, _)| id)
            .collect();

        for id in interested {
            if let Some(observer) = self.observers.get_mut(id) {
                observer.records.push(MutationRecord {
                    kind: MutationKind::ChildList,
                    target: parent,
                    attribute_name: None,
                    old_value: None,
                    added_nodes: added.clone(),
                    removed_nodes: removed.clone(),
                });
            }
        }
    }
}
