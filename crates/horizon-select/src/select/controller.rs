//! The selectable collection controller.
//!
//! [`SelectController`] holds the state of one selectable collection: the
//! item list, the configuration and the caches used to report old values.
//! Everything else (which item is selected, which is focused) is derived on
//! demand from the item list and the element tree, where the marker
//! attribute is the only record of selection.
//!
//! # Update pipeline
//!
//! The controller never reacts to the tree synchronously. Attribute writes
//! and child changes are queued by a mutation observer; keyboard input,
//! `items-changed`, `select` and `slotchange` events are queued by the
//! listeners installed on the host. [`SelectController::flush`] drains all
//! of these in order, then runs the update cycle that reports changed
//! properties and calls [`SelectController::updated`]. Writes made while
//! handling one source (stripping a stale marker, say) are picked up by
//! the next round, so the tree and the controller converge through a
//! single loop.

use std::collections::VecDeque;
use std::sync::Arc;

use horizon_select_core::logging::span_names;
use horizon_select_core::{Property, PropertyError, Signal};
use parking_lot::Mutex;

use crate::dom::{
    DomTree, Key, ListenerId, MutationKind, MutationObserverInit, MutationRecord, NodeId, ObserverId,
};
use crate::fire::{Fire, FireInit};

use super::allowed::AllowedChildren;
use super::codec::IndexList;
use super::config::{DEFAULT_ATTRIBUTE_FOR_SELECTED, SelectConfig};
use super::host::{ChangedProperties, PropertyChange, PropertyValue, SelectProperty};
use super::item::{self, IndexArg, Item, SelectedIndex, SelectedItem, SelectedValue};

/// Upper bound on drain/update rounds in one [`SelectController::flush`].
pub const MAX_FLUSH_ROUNDS: usize = 64;

/// Attribute mirroring each item's position.
pub const ITEM_INDEX_ATTRIBUTE: &str = "data-item-index";

/// Input queued by host listeners until the next flush.
#[derive(Debug)]
enum Inbound {
    ItemsChanged(Vec<NodeId>),
    Select(SelectedItem),
    Keydown { key: Key, default_prevented: bool },
    SlotChange(NodeId),
}

type Inbox = Arc<Mutex<VecDeque<Inbound>>>;

/// Selection state machine for the children of one host element.
///
/// # Example
///
/// ```
/// use horizon_select::dom::DomTree;
/// use horizon_select::select::{SelectConfig, SelectController, SelectedIndex};
///
/// let mut tree = DomTree::new();
/// let host = tree.create_element("x-list");
/// tree.append_child(tree.document(), host).unwrap();
/// for _ in 0..3 {
///     let item = tree.create_element("x-item");
///     tree.append_child(host, item).unwrap();
/// }
///
/// let mut select = SelectController::new(host, SelectConfig::default());
/// select.connected(&mut tree);
/// select.first_updated(&mut tree);
/// select.flush(&mut tree);
///
/// select.select_index(&mut tree, 1);
/// select.flush(&mut tree);
/// assert_eq!(select.selected_index(&tree), SelectedIndex::Single(Some(1)));
/// ```
#[derive(Debug)]
pub struct SelectController {
    host: NodeId,
    allowed_children: AllowedChildren,
    multi: Property<bool>,
    attribute_for_selected: Property<String>,
    items: Vec<Item>,
    /// Selection as of the end of the previous reconciliation.
    previous_selected_item: SelectedItem,
    previous_selected_index: SelectedIndex,
    /// Focus as last reported.
    last_focused_item: Property<Option<NodeId>>,
    last_focused_index: Property<Option<usize>>,
    observer: Option<ObserverId>,
    content_slot: Option<NodeId>,
    host_listeners: Vec<ListenerId>,
    slot_listener: Option<ListenerId>,
    inbox: Inbox,
    pending: ChangedProperties,

    /// Emitted with the new item list when the host receives `items-changed`.
    pub items_changed: Signal<Vec<NodeId>>,
    /// Emitted with the selection when the host receives `select`.
    pub selected: Signal<SelectedItem>,
    /// Emitted for every property whose value changed during an update.
    pub property_changed: Signal<PropertyChange>,
}

impl SelectController {
    /// Create a controller for `host`. Nothing is observed until
    /// [`connected`](Self::connected) is called.
    pub fn new(host: NodeId, config: SelectConfig) -> Self {
        Self {
            host,
            allowed_children: config.allowed_children,
            multi: Property::new(config.multi),
            attribute_for_selected: Property::new(config.attribute_for_selected),
            items: Vec::new(),
            previous_selected_item: SelectedItem::default(),
            previous_selected_index: SelectedIndex::default(),
            last_focused_item: Property::new(None),
            last_focused_index: Property::new(None),
            observer: None,
            content_slot: None,
            host_listeners: Vec::new(),
            slot_listener: None,
            inbox: Arc::new(Mutex::new(VecDeque::new())),
            pending: ChangedProperties::new(),
            items_changed: Signal::new(),
            selected: Signal::new(),
            property_changed: Signal::new(),
        }
    }

    pub fn host(&self) -> NodeId {
        self.host
    }

    /// Whether [`connected`](Self::connected) ran without a later
    /// [`disconnected`](Self::disconnected).
    pub fn is_connected(&self) -> bool {
        !self.host_listeners.is_empty()
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    pub fn allowed_children(&self) -> &AllowedChildren {
        &self.allowed_children
    }

    /// Replace the item filter. Applies from the next reconciliation.
    pub fn set_allowed_children(&mut self, allowed_children: AllowedChildren) {
        self.allowed_children = allowed_children;
    }

    pub fn multi(&self) -> bool {
        self.multi.get()
    }

    pub fn set_multi(&mut self, tree: &DomTree, multi: bool) {
        if let Some(old) = self.multi.replace(multi) {
            self.request_update(tree, SelectProperty::Multi, PropertyValue::Bool(old));
        }
    }

    pub fn attribute_for_selected(&self) -> String {
        self.attribute_for_selected.get()
    }

    /// Change the marker attribute. The mutation observer is restarted for
    /// the new name by the next update cycle.
    pub fn set_attribute_for_selected(&mut self, tree: &DomTree, attribute: impl Into<String>) {
        if let Some(old) = self.attribute_for_selected.replace(attribute.into()) {
            self.request_update(tree, SelectProperty::AttributeForSelected, PropertyValue::Text(old));
        }
    }

    // =========================================================================
    // Derived state
    // =========================================================================

    /// The items found by the last reconciliation.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item_nodes(&self) -> Vec<NodeId> {
        self.items.iter().map(Item::node).collect()
    }

    fn position_of(&self, node: NodeId) -> Option<usize> {
        self.items.iter().position(|item| item.node() == node)
    }

    fn marked_nodes<'a>(&'a self, tree: &'a DomTree, attribute: &'a str) -> impl Iterator<Item = NodeId> + 'a {
        self.items
            .iter()
            .map(Item::node)
            .filter(move |&node| tree.has_attribute(node, attribute))
    }

    /// The item(s) carrying the marker attribute.
    pub fn selected_item(&self, tree: &DomTree) -> SelectedItem {
        let attribute = self.attribute_for_selected.get();
        if self.multi.get() {
            SelectedItem::Multi(self.marked_nodes(tree, &attribute).collect())
        } else {
            SelectedItem::Single(self.marked_nodes(tree, &attribute).next())
        }
    }

    /// Position(s) of the selected item(s) in the current item list.
    pub fn selected_index(&self, tree: &DomTree) -> SelectedIndex {
        match self.selected_item(tree) {
            SelectedItem::Single(node) => SelectedIndex::Single(node.and_then(|n| self.position_of(n))),
            SelectedItem::Multi(nodes) => {
                SelectedIndex::Multi(nodes.into_iter().filter_map(|n| self.position_of(n)).collect())
            }
        }
    }

    /// The `value` attribute of the selected item(s).
    pub fn value(&self, tree: &DomTree) -> SelectedValue {
        value_of(tree, &self.selected_item(tree))
    }

    /// The first item that has focus or contains it.
    pub fn focused_item(&self, tree: &DomTree) -> Option<NodeId> {
        self.items
            .iter()
            .map(Item::node)
            .find(|&node| tree.has_focus_within(node))
    }

    pub fn focused_index(&self, tree: &DomTree) -> Option<usize> {
        self.focused_item(tree).and_then(|n| self.position_of(n))
    }

    /// Whether any item is focused or being activated.
    pub fn has_active_item(&self, tree: &DomTree) -> bool {
        self.items
            .iter()
            .any(|item| tree.is_focused(item.node()) || tree.is_active(item.node()))
    }

    /// The selection in `selected-index` attribute form: `"2"`, `"1,3"`, or
    /// `"-1"` when nothing is selected.
    pub fn selected_index_attribute(&self, tree: &DomTree) -> String {
        IndexList::from(&self.selected_index(tree)).to_string()
    }

    /// Current value of any observable property.
    pub fn property_value(&self, tree: &DomTree, property: SelectProperty) -> PropertyValue {
        match property {
            SelectProperty::Items => PropertyValue::Nodes(self.item_nodes()),
            SelectProperty::Multi => PropertyValue::Bool(self.multi.get()),
            SelectProperty::AttributeForSelected => PropertyValue::Text(self.attribute_for_selected.get()),
            SelectProperty::SelectedIndex => PropertyValue::SelectedIndex(self.selected_index(tree)),
            SelectProperty::SelectedItem => PropertyValue::SelectedItem(self.selected_item(tree)),
            SelectProperty::Value => PropertyValue::Value(self.value(tree)),
            SelectProperty::FocusedIndex => PropertyValue::FocusedIndex(self.focused_index(tree)),
            SelectProperty::FocusedItem => PropertyValue::FocusedItem(self.focused_item(tree)),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Install the host listeners, mark the host as a popup owner and start
    /// observing the marker attribute.
    pub fn connected(&mut self, tree: &mut DomTree) {
        if self.is_connected() {
            tracing::debug!(target: "horizon_select::select", host = ?self.host, "already connected");
            return;
        }

        let inbox = self.inbox.clone();
        let items_changed = tree.add_event_listener(self.host, "items-changed", move |event| {
            let nodes = event.detail().as_nodes().map(<[NodeId]>::to_vec).unwrap_or_default();
            inbox.lock().push_back(Inbound::ItemsChanged(nodes));
        });

        let inbox = self.inbox.clone();
        let keydown = tree.add_event_listener(self.host, "keydown", move |event| {
            if let Some(key) = event.key() {
                inbox.lock().push_back(Inbound::Keydown {
                    key: key.clone(),
                    default_prevented: event.default_prevented(),
                });
            }
        });

        let inbox = self.inbox.clone();
        let select = tree.add_event_listener(self.host, "select", move |event| {
            inbox
                .lock()
                .push_back(Inbound::Select(SelectedItem::from_detail(event.detail())));
        });

        self.host_listeners = vec![items_changed, keydown, select];

        if let Err(err) = tree.set_attribute(self.host, "aria-haspopup", "true") {
            tracing::warn!(target: "horizon_select::select", %err, "could not mark host");
        }
        if let Some(slot) = self.content_slot {
            self.bind_slot_listener(tree, slot);
        }
        self.init_mutation_observer(tree);
        tracing::debug!(target: "horizon_select::select", host = ?self.host, "connected");
    }

    /// Remove every listener installed by [`connected`](Self::connected)
    /// and [`first_updated`](Self::first_updated), stop observing and drop
    /// events queued but not yet flushed.
    pub fn disconnected(&mut self, tree: &mut DomTree) {
        for id in self.host_listeners.drain(..) {
            tree.remove_event_listener(id);
        }
        if let Some(id) = self.slot_listener.take() {
            tree.remove_event_listener(id);
        }
        if let Some(observer) = self.observer.take() {
            tree.disconnect_observer(observer);
        }
        self.inbox.lock().clear();
        tracing::debug!(target: "horizon_select::select", host = ?self.host, "disconnected");
    }

    /// Bind the unnamed shadow slot's `slotchange` and run the initial
    /// reconciliation.
    pub fn first_updated(&mut self, tree: &mut DomTree) {
        self.content_slot = tree.find_slot(self.host, None);
        if let Some(slot) = self.content_slot {
            self.bind_slot_listener(tree, slot);
        }
        self.update_items(tree, None);
    }

    /// React to a completed update: restart the observer when the marker
    /// attribute changed, fire `select` when the selected item changed.
    pub fn updated(&mut self, tree: &mut DomTree, changed: &ChangedProperties) {
        if changed.has(SelectProperty::AttributeForSelected) && self.is_connected() {
            self.init_mutation_observer(tree);
        }
        if changed.has(SelectProperty::SelectedItem) {
            self.selected_item_changed(tree);
        }
    }

    /// Route an attribute written on the host to its property.
    pub fn attribute_changed(&mut self, tree: &mut DomTree, name: &str, value: Option<&str>) {
        match SelectProperty::from_attribute(name) {
            Some(SelectProperty::SelectedIndex) => {
                let Some(value) = value else {
                    return;
                };
                match value.parse::<IndexList>() {
                    Ok(indices) => self.assign_selected_index(tree, indices),
                    Err(err) => {
                        tracing::debug!(target: "horizon_select::select", %err, "ignoring selected-index attribute");
                    }
                }
            }
            Some(SelectProperty::AttributeForSelected) => {
                self.set_attribute_for_selected(tree, value.unwrap_or(DEFAULT_ATTRIBUTE_FOR_SELECTED));
            }
            Some(SelectProperty::Multi) => self.set_multi(tree, value.is_some()),
            _ => {}
        }
    }

    fn bind_slot_listener(&mut self, tree: &mut DomTree, slot: NodeId) {
        if let Some(old) = self.slot_listener.take() {
            tree.remove_event_listener(old);
        }
        let inbox = self.inbox.clone();
        self.slot_listener = Some(tree.add_event_listener(slot, "slotchange", move |event| {
            if event.target() == Some(slot) {
                inbox.lock().push_back(Inbound::SlotChange(slot));
            }
        }));
    }

    /// (Re)start the observer for the current marker attribute, releasing
    /// any previous registration first.
    fn init_mutation_observer(&mut self, tree: &mut DomTree) {
        if let Some(old) = self.observer.take() {
            tree.disconnect_observer(old);
        }
        let init = MutationObserverInit::new()
            .with_attributes()
            .with_attribute_filter([self.attribute_for_selected.get()])
            .with_attribute_old_value()
            .with_child_list()
            .with_subtree();
        match tree.observe(self.host, init) {
            Ok(id) => self.observer = Some(id),
            Err(err) => tracing::warn!(target: "horizon_select::select", %err, "could not observe host"),
        }
    }

    fn selected_item_changed(&self, tree: &DomTree) {
        let item = self.selected_item(tree);
        if item.is_empty() {
            return;
        }
        self.fire(tree, "select", item, FireInit::default());
    }

    // =========================================================================
    // Update cycle
    // =========================================================================

    /// Record that `property` may have changed from `old`. Nothing is
    /// recorded when the current value equals `old`; when the property is
    /// already pending, the first old value is kept.
    pub fn request_update(&mut self, tree: &DomTree, property: SelectProperty, old: PropertyValue) {
        if self.property_value(tree, property) != old {
            self.pending.record(property, old);
        }
    }

    /// Whether a property change is waiting for the update cycle.
    pub fn is_update_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Process everything queued since the last flush until nothing is
    /// left. Returns the number of rounds that did work.
    pub fn flush(&mut self, tree: &mut DomTree) -> usize {
        let _span = tracing::debug_span!(target: "horizon_select::select", span_names::FLUSH, host = ?self.host).entered();

        for round in 0..MAX_FLUSH_ROUNDS {
            if self.drain_sources(tree) || self.perform_update(tree) {
                continue;
            }
            tracing::trace!(target: "horizon_select::select", rounds = round, "flush settled");
            return round;
        }
        tracing::warn!(
            target: "horizon_select::select",
            host = ?self.host,
            "flush stopped after {MAX_FLUSH_ROUNDS} rounds without settling"
        );
        MAX_FLUSH_ROUNDS
    }

    /// Handle queued slot changes, mutation records and host events.
    fn drain_sources(&mut self, tree: &mut DomTree) -> bool {
        let mut progressed = tree.dispatch_slot_changes() > 0;

        if let Some(observer) = self.observer {
            let records = tree.take_records(observer);
            if !records.is_empty() {
                self.mutated(tree, &records);
                progressed = true;
            }
        }

        loop {
            let next = self.inbox.lock().pop_front();
            let Some(message) = next else {
                break;
            };
            self.handle_inbound(tree, message);
            progressed = true;
        }
        progressed
    }

    fn handle_inbound(&mut self, tree: &mut DomTree, message: Inbound) {
        match message {
            Inbound::ItemsChanged(nodes) => self.items_changed.emit(nodes),
            Inbound::Select(item) => self.selected.emit(item),
            Inbound::Keydown { key, default_prevented } => {
                if !default_prevented {
                    self.handle_key(tree, &key);
                }
            }
            Inbound::SlotChange(slot) => self.update_items(tree, Some(slot)),
        }
    }

    /// Report pending property changes and run [`updated`](Self::updated).
    /// Returns `false` if nothing was pending.
    fn perform_update(&mut self, tree: &mut DomTree) -> bool {
        if self.pending.is_empty() {
            return false;
        }

        let mut changed = ChangedProperties::new();
        for (property, old) in std::mem::take(&mut self.pending) {
            let new = self.property_value(tree, property);
            if new == old {
                continue;
            }
            changed.record(property, old.clone());
            self.property_changed.emit(PropertyChange { property, old, new });
        }

        if !changed.is_empty() {
            tracing::debug!(target: "horizon_select::select", changed = changed.len(), "update");
            self.updated(tree, &changed);
        }
        true
    }

    // =========================================================================
    // Reconciliation
    // =========================================================================

    /// Rebuild the item list from the host's children, or from the
    /// elements assigned to `trigger` when a slot changed.
    pub fn update_items(&mut self, tree: &mut DomTree, trigger: Option<NodeId>) {
        let _span = tracing::trace_span!(target: "horizon_select::select", span_names::RECONCILE, ?trigger).entered();

        let old_items = self.item_nodes();
        let old_index = self.selected_index(tree);
        let candidates = match trigger {
            Some(slot) => tree.assigned_elements(slot),
            None => tree.children(self.host).to_vec(),
        };
        let nodes: Vec<NodeId> = candidates
            .into_iter()
            .filter(|&node| self.allowed_children.allows(tree, node))
            .collect();

        for (index, &node) in nodes.iter().enumerate() {
            if let Err(err) = tree.set_attribute(node, ITEM_INDEX_ATTRIBUTE, &index.to_string()) {
                tracing::debug!(target: "horizon_select::select", %err, "could not index item");
            }
        }
        self.items = nodes
            .iter()
            .enumerate()
            .map(|(index, &node)| Item::new(node, index))
            .collect();
        tracing::debug!(target: "horizon_select::select", count = self.items.len(), "items reconciled");

        self.request_update(tree, SelectProperty::Items, PropertyValue::Nodes(old_items));
        self.request_update(tree, SelectProperty::SelectedIndex, PropertyValue::SelectedIndex(old_index));
        self.fire(tree, "items-changed", nodes, FireInit::default());
    }

    /// Reselect after a batch of mutation records.
    ///
    /// In single mode a batch touching the marker is scanned for the item
    /// that just gained it and the item that just lost it (falling back to
    /// the previously selected item), and stale markers are stripped: the
    /// lost item's, plus every other marked item when something gained the
    /// marker. In multi mode markers are left alone. Either way the selection change
    /// is then reported.
    pub fn mutated(&mut self, tree: &mut DomTree, records: &[MutationRecord]) {
        let _span = tracing::trace_span!(target: "horizon_select::select", span_names::MUTATED, records = records.len()).entered();

        if self.content_slot.is_none()
            && records
                .iter()
                .any(|r| r.kind == MutationKind::ChildList && r.target == self.host)
        {
            self.update_items(tree, None);
        }

        let mut previous_item = self.previous_selected_item.clone();
        let mut previous_index = self.previous_selected_index.clone();

        let attribute = self.attribute_for_selected.get();
        let marker_records = || {
            records.iter().filter(|r| {
                r.kind == MutationKind::Attributes && r.attribute_name.as_deref() == Some(attribute.as_str())
            })
        };

        // Child-list batches say nothing about who lost the marker.
        if !self.multi.get() && marker_records().next().is_some() {
            let newly_selected = marker_records()
                .rev()
                .find(|r| r.old_value.is_none() && tree.has_attribute(r.target, &attribute))
                .map(|r| r.target);
            let newly_deselected = marker_records()
                .find(|r| r.old_value.as_deref() == Some("") && !tree.has_attribute(r.target, &attribute))
                .map(|r| r.target)
                .or(self.previous_selected_item.single());

            previous_index = SelectedIndex::Single(newly_deselected.and_then(|n| self.position_of(n)));
            previous_item = SelectedItem::Single(newly_deselected);

            let mut stale: Vec<NodeId> = newly_deselected
                .filter(|&n| Some(n) != newly_selected)
                .into_iter()
                .collect();
            // One batch may mark several items; the last one marked keeps it.
            if let Some(selected) = newly_selected {
                let also_marked: Vec<NodeId> = self
                    .items
                    .iter()
                    .map(Item::node)
                    .filter(|&n| n != selected && !stale.contains(&n) && tree.has_attribute(n, &attribute))
                    .collect();
                stale.extend(also_marked);
            }

            for node in stale {
                tracing::trace!(target: "horizon_select::select", ?node, "unselecting item");
                if let Err(err) = tree.remove_attribute(node, &attribute) {
                    tracing::debug!(target: "horizon_select::select", %err, "could not unselect item");
                }
            }
        }

        self.update_selected(tree, previous_item, previous_index);
    }

    /// Snapshot the current selection as "previous" and report changes
    /// against the given old values.
    pub fn update_selected(&mut self, tree: &DomTree, previous_item: SelectedItem, previous_index: SelectedIndex) {
        let previous_value = value_of(tree, &previous_item);
        self.previous_selected_item = self.selected_item(tree);
        self.previous_selected_index = self.selected_index(tree);
        self.request_update(tree, SelectProperty::SelectedItem, PropertyValue::SelectedItem(previous_item));
        self.request_update(tree, SelectProperty::SelectedIndex, PropertyValue::SelectedIndex(previous_index));
        self.request_update(tree, SelectProperty::Value, PropertyValue::Value(previous_value));
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Select the item at `index`. Strings are read leniently (`"2"`,
    /// `" 2px"`); unparseable input is ignored.
    pub fn select_index(&mut self, tree: &mut DomTree, index: impl Into<IndexArg>) {
        self.set_selected_index(tree, index.into());
    }

    /// Move the marker to the item at `index`.
    ///
    /// Does nothing when the index is unparseable or already selected. In
    /// single mode the old item loses its marker first, so an index with no
    /// item deselects.
    pub fn set_selected_index(&mut self, tree: &mut DomTree, index: IndexArg) {
        let Some(index) = index.to_index() else {
            tracing::debug!(target: "horizon_select::select", ?index, "ignoring unparseable index");
            return;
        };
        if self.selected_index(tree).is_single(index) {
            return;
        }

        let attribute = self.attribute_for_selected.get();
        let new_item = usize::try_from(index)
            .ok()
            .and_then(|i| self.items.get(i))
            .map(Item::node);

        if !self.multi.get() {
            if let Some(old_item) = self.selected_item(tree).single() {
                if let Err(err) = tree.remove_attribute(old_item, &attribute) {
                    tracing::debug!(target: "horizon_select::select", %err, "could not unselect item");
                }
            }
        }
        match new_item {
            Some(node) => {
                if let Err(err) = tree.set_attribute(node, &attribute, "") {
                    tracing::debug!(target: "horizon_select::select", %err, "could not select item");
                }
            }
            None => tracing::debug!(target: "horizon_select::select", index, "no item at index"),
        }
    }

    /// Make exactly the items at `indices` selected.
    pub fn select_multi_index(&mut self, tree: &mut DomTree, indices: &[i64]) {
        for &index in indices {
            self.set_selected_index(tree, IndexArg::Number(index));
        }

        let attribute = self.attribute_for_selected.get();
        let excluded: Vec<NodeId> = self
            .items
            .iter()
            .enumerate()
            .filter(|(position, _)| !i64::try_from(*position).is_ok_and(|p| indices.contains(&p)))
            .map(|(_, item)| item.node())
            .collect();
        for node in excluded {
            if let Err(err) = tree.remove_attribute(node, &attribute) {
                tracing::debug!(target: "horizon_select::select", %err, "could not unselect item");
            }
        }
    }

    /// Select the next item, wrapping from the last to the first. Does
    /// nothing in multi mode.
    pub fn select_next(&mut self, tree: &mut DomTree) {
        if self.multi.get() {
            return;
        }
        if let Some(next) = item::next_index(self.selected_index(tree).single(), self.items.len()) {
            self.select_index(tree, next);
        }
    }

    /// Select the previous item, wrapping from the first to the last. Does
    /// nothing in multi mode.
    pub fn select_previous(&mut self, tree: &mut DomTree) {
        if self.multi.get() {
            return;
        }
        if let Some(previous) = item::previous_index(self.selected_index(tree).single(), self.items.len()) {
            self.select_index(tree, previous);
        }
    }

    /// Assign a property by value.
    ///
    /// `multi` and `attribute_for_selected` are writable. `selected_index`
    /// selects the given indices, ignoring values that name no item.
    /// Assigning a read-only property is accepted and has no effect.
    pub fn set_property(
        &mut self,
        tree: &mut DomTree,
        property: SelectProperty,
        value: PropertyValue,
    ) -> Result<(), PropertyError> {
        match (property, value) {
            (SelectProperty::Multi, PropertyValue::Bool(multi)) => self.set_multi(tree, multi),
            (SelectProperty::AttributeForSelected, PropertyValue::Text(attribute)) => {
                self.set_attribute_for_selected(tree, attribute)
            }
            (SelectProperty::SelectedIndex, PropertyValue::Indices(indices)) => {
                self.assign_selected_index(tree, indices)
            }
            (SelectProperty::SelectedIndex, PropertyValue::SelectedIndex(index)) => {
                self.assign_selected_index(tree, IndexList::from(&index))
            }
            (SelectProperty::SelectedIndex, PropertyValue::Text(text)) => match text.parse::<IndexList>() {
                Ok(indices) => self.assign_selected_index(tree, indices),
                Err(err) => {
                    tracing::debug!(target: "horizon_select::select", %err, "ignoring selected index");
                }
            },
            (property, _) if property.meta().read_only => {
                tracing::trace!(target: "horizon_select::select", property = property.name(), "ignoring read-only assignment");
            }
            (property, value) => {
                return Err(PropertyError::TypeMismatch {
                    name: property.name(),
                    expected: property.value_kind(),
                    got: value.kind_name(),
                });
            }
        }
        Ok(())
    }

    /// Assign a property looked up by name.
    pub fn set_property_by_name(
        &mut self,
        tree: &mut DomTree,
        name: &str,
        value: PropertyValue,
    ) -> Result<(), PropertyError> {
        let property = SelectProperty::from_name(name).ok_or_else(|| PropertyError::NotFound {
            name: name.to_string(),
        })?;
        self.set_property(tree, property, value)
    }

    fn assign_selected_index(&mut self, tree: &mut DomTree, indices: IndexList) {
        let len = self.items.len();
        let in_range = |i: &i64| usize::try_from(*i).is_ok_and(|i| i < len);
        if !indices.to_vec().iter().all(in_range) {
            tracing::debug!(target: "horizon_select::select", %indices, "ignoring out-of-range selected index");
            return;
        }

        match indices {
            IndexList::One(index) => self.set_selected_index(tree, IndexArg::Number(index)),
            IndexList::Many(list) if !self.multi.get() => {
                if let Some(&first) = list.first() {
                    self.set_selected_index(tree, IndexArg::Number(first));
                }
            }
            IndexList::Many(list) => self.select_multi_index(tree, &list),
        }
    }

    // =========================================================================
    // Focus
    // =========================================================================

    /// Focus the item at `index`. An index with no item leaves focus where
    /// it is but still refreshes the focus properties.
    pub fn focus_index(&mut self, tree: &mut DomTree, index: usize) {
        let node = self.items.get(index).map(Item::node);
        self.focus_item(tree, node);
    }

    /// Focus the next item, wrapping from the last to the first.
    pub fn focus_next(&mut self, tree: &mut DomTree) {
        match item::next_index(self.focused_index(tree), self.items.len()) {
            Some(next) => self.focus_index(tree, next),
            None => self.focus_item(tree, None),
        }
    }

    /// Focus the previous item, wrapping from the first to the last.
    pub fn focus_previous(&mut self, tree: &mut DomTree) {
        match item::previous_index(self.focused_index(tree), self.items.len()) {
            Some(previous) => self.focus_index(tree, previous),
            None => self.focus_item(tree, None),
        }
    }

    /// Move input focus to `item` and report the focus properties.
    pub fn focus_item(&mut self, tree: &mut DomTree, item: Option<NodeId>) {
        if let Some(node) = item {
            if let Err(err) = tree.focus(node) {
                tracing::debug!(target: "horizon_select::select", %err, "could not focus item");
            }
        }
        self.sync_focus(tree);
    }

    /// Blur `item` and take it out of the tab order.
    pub fn unfocus_item(&mut self, tree: &mut DomTree, item: Option<NodeId>) {
        let Some(node) = item else {
            return;
        };
        tree.blur(node);
        if let Err(err) = tree.set_attribute(node, "tabindex", "-1") {
            tracing::debug!(target: "horizon_select::select", %err, "could not set tabindex");
        }
        self.sync_focus(tree);
    }

    /// Toggle the marker on the focused item, if any.
    pub fn toggle_focused_item(&mut self, tree: &mut DomTree) {
        let Some(node) = self.focused_item(tree) else {
            return;
        };
        let attribute = self.attribute_for_selected.get();
        if let Err(err) = tree.toggle_attribute(node, &attribute) {
            tracing::debug!(target: "horizon_select::select", %err, "could not toggle item");
        }
    }

    fn sync_focus(&mut self, tree: &DomTree) {
        let index = self.focused_index(tree);
        let item = self.focused_item(tree);
        if let Some(old) = self.last_focused_index.replace(index) {
            self.request_update(tree, SelectProperty::FocusedIndex, PropertyValue::FocusedIndex(old));
        }
        if let Some(old) = self.last_focused_item.replace(item) {
            self.request_update(tree, SelectProperty::FocusedItem, PropertyValue::FocusedItem(old));
        }
    }

    pub(super) fn handle_key(&mut self, tree: &mut DomTree, key: &Key) {
        match key {
            Key::ArrowUp => self.focus_previous(tree),
            Key::ArrowDown => self.focus_next(tree),
            Key::Enter | Key::Space => self.toggle_focused_item(tree),
            _ => {}
        }
    }
}

impl Fire for SelectController {
    fn fire_target(&self) -> NodeId {
        self.host
    }
}

fn value_of(tree: &DomTree, item: &SelectedItem) -> SelectedValue {
    let value = |node: NodeId| tree.get_attribute(node, "value").map(str::to_string);
    match item {
        SelectedItem::Single(node) => SelectedValue::Single(node.and_then(value)),
        SelectedItem::Multi(nodes) => SelectedValue::Multi(nodes.iter().map(|&n| value(n)).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A light-DOM host (no shadow root) with `count` custom-element
    /// children plus a text node and a plain `div` that are not items.
    fn setup(count: usize, config: SelectConfig) -> (DomTree, SelectController, Vec<NodeId>) {
        let mut tree = DomTree::new();
        let host = tree.create_element("x-list");
        tree.append_child(tree.document(), host).unwrap();

        let text = tree.create_text("label");
        tree.append_child(host, text).unwrap();
        let mut items = Vec::new();
        for _ in 0..count {
            let item = tree.create_element("x-item");
            tree.append_child(host, item).unwrap();
            items.push(item);
        }
        let div = tree.create_element("div");
        tree.append_child(host, div).unwrap();

        let mut select = SelectController::new(host, config);
        select.connected(&mut tree);
        select.first_updated(&mut tree);
        select.flush(&mut tree);
        (tree, select, items)
    }

    #[test]
    fn test_items_follow_default_filter() {
        let (tree, select, items) = setup(3, SelectConfig::default());
        assert_eq!(select.item_nodes(), items);
        for (index, &item) in items.iter().enumerate() {
            assert_eq!(tree.get_attribute(item, ITEM_INDEX_ATTRIBUTE), Some(index.to_string().as_str()));
        }
        assert_eq!(tree.get_attribute(select.host(), "aria-haspopup"), Some("true"));
    }

    #[test]
    fn test_nothing_selected_initially() {
        let (tree, select, _) = setup(3, SelectConfig::default());
        assert_eq!(select.selected_item(&tree), SelectedItem::Single(None));
        assert_eq!(select.selected_index(&tree), SelectedIndex::Single(None));
        assert_eq!(select.value(&tree), SelectedValue::Single(None));
        assert_eq!(select.selected_index_attribute(&tree), "-1");
    }

    #[test]
    fn test_value_reads_value_attribute() {
        let (mut tree, mut select, items) = setup(2, SelectConfig::default());
        tree.set_attribute(items[1], "value", "beta").unwrap();
        select.select_index(&mut tree, 1);
        select.flush(&mut tree);
        assert_eq!(select.value(&tree), SelectedValue::Single(Some("beta".to_string())));
    }

    #[test]
    fn test_unparseable_index_is_ignored() {
        let (mut tree, mut select, _) = setup(3, SelectConfig::default());
        select.select_index(&mut tree, "two");
        assert_eq!(select.flush(&mut tree), 0);
        assert_eq!(select.selected_index(&tree), SelectedIndex::Single(None));
    }

    #[test]
    fn test_lenient_string_index() {
        let (mut tree, mut select, _) = setup(3, SelectConfig::default());
        select.select_index(&mut tree, " 2px");
        select.flush(&mut tree);
        assert_eq!(select.selected_index(&tree), SelectedIndex::Single(Some(2)));
    }

    #[test]
    fn test_out_of_range_index_deselects() {
        let (mut tree, mut select, items) = setup(3, SelectConfig::default());
        select.select_index(&mut tree, 1);
        select.flush(&mut tree);
        select.select_index(&mut tree, 7);
        select.flush(&mut tree);
        assert!(!tree.has_attribute(items[1], "selected"));
        assert_eq!(select.selected_index(&tree), SelectedIndex::Single(None));
    }

    #[test]
    fn test_request_update_skips_unchanged_values() {
        let (tree, mut select, _) = setup(2, SelectConfig::default());
        select.request_update(&tree, SelectProperty::Multi, PropertyValue::Bool(false));
        assert!(!select.is_update_pending());
        select.request_update(&tree, SelectProperty::Multi, PropertyValue::Bool(true));
        assert!(select.is_update_pending());
    }

    #[test]
    fn test_property_changed_reports_old_and_new() {
        let (mut tree, mut select, items) = setup(3, SelectConfig::default());
        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = changes.clone();
        select.property_changed.connect(move |change| sink.lock().push(change.clone()));

        select.select_index(&mut tree, 0);
        select.flush(&mut tree);

        let changes = changes.lock();
        let item_change = changes
            .iter()
            .find(|c| c.property == SelectProperty::SelectedItem)
            .unwrap();
        assert_eq!(item_change.old, PropertyValue::SelectedItem(SelectedItem::Single(None)));
        assert_eq!(item_change.new, PropertyValue::SelectedItem(SelectedItem::Single(Some(items[0]))));
        assert!(changes.iter().any(|c| c.property == SelectProperty::SelectedIndex));
    }

    #[test]
    fn test_light_dom_children_are_reconciled() {
        let (mut tree, mut select, items) = setup(2, SelectConfig::default());
        let extra = tree.create_element("x-item");
        tree.insert_before(select.host(), extra, Some(items[0])).unwrap();
        select.flush(&mut tree);
        assert_eq!(select.item_nodes(), vec![extra, items[0], items[1]]);
        assert_eq!(tree.get_attribute(items[1], ITEM_INDEX_ATTRIBUTE), Some("2"));
    }

    #[test]
    fn test_multi_index_attribute_form() {
        let (mut tree, mut select, _) = setup(4, SelectConfig::new().with_multi(true));
        select.select_multi_index(&mut tree, &[0, 2]);
        select.flush(&mut tree);
        assert_eq!(select.selected_index(&tree), SelectedIndex::Multi(vec![0, 2]));
        assert_eq!(select.selected_index_attribute(&tree), "0,2");
    }

    #[test]
    fn test_attribute_changed_routes_to_properties() {
        let (mut tree, mut select, _) = setup(3, SelectConfig::default());

        select.attribute_changed(&mut tree, "selected-index", Some("2"));
        select.attribute_changed(&mut tree, "multi", Some(""));
        select.flush(&mut tree);
        assert!(select.multi());
        assert_eq!(select.selected_index(&tree), SelectedIndex::Multi(vec![2]));

        select.attribute_changed(&mut tree, "attribute-for-selected", Some("checked"));
        assert_eq!(select.attribute_for_selected(), "checked");
        select.attribute_changed(&mut tree, "attribute-for-selected", None);
        assert_eq!(select.attribute_for_selected(), DEFAULT_ATTRIBUTE_FOR_SELECTED);
    }

    #[test]
    fn test_focus_on_empty_list_is_harmless() {
        let (mut tree, mut select, _) = setup(0, SelectConfig::default());
        select.focus_next(&mut tree);
        select.focus_previous(&mut tree);
        select.toggle_focused_item(&mut tree);
        select.flush(&mut tree);
        assert_eq!(select.focused_item(&tree), None);
        assert!(!select.has_active_item(&tree));
    }

    #[test]
    fn test_focus_properties_are_reported() {
        let (mut tree, mut select, items) = setup(3, SelectConfig::default());
        let focused = Arc::new(Mutex::new(Vec::new()));
        let sink = focused.clone();
        select.property_changed.connect(move |change| {
            if change.property == SelectProperty::FocusedIndex {
                sink.lock().push(change.new.clone());
            }
        });

        select.focus_index(&mut tree, 1);
        select.flush(&mut tree);
        select.unfocus_item(&mut tree, Some(items[1]));
        select.flush(&mut tree);

        assert_eq!(
            *focused.lock(),
            vec![PropertyValue::FocusedIndex(Some(1)), PropertyValue::FocusedIndex(None)]
        );
        assert_eq!(tree.get_attribute(items[1], "tabindex"), Some("-1"));
    }

    #[test]
    fn test_active_item() {
        let (mut tree, select, items) = setup(2, SelectConfig::default());
        tree.set_active(Some(items[0]));
        assert!(select.has_active_item(&tree));
        tree.set_active(None);
        assert!(!select.has_active_item(&tree));
    }

    #[test]
    fn test_connected_twice_does_not_duplicate_listeners() {
        let (mut tree, mut select, _) = setup(1, SelectConfig::default());
        let before = tree.listener_count(select.host());
        select.connected(&mut tree);
        assert_eq!(tree.listener_count(select.host()), before);
        assert_eq!(tree.observer_count(), 1);
    }
}
