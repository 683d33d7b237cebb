//! Selectable collections.
//!
//! A host element owns a [`SelectController`]. The controller turns the
//! host's allowed children into an ordered item list, treats a marker
//! attribute on an item as "selected", keeps single selection exclusive,
//! and moves focus and selection in response to keyboard input.
//!
//! Hosts get the full selection API by implementing [`Selectable`], which
//! only asks for access to the controller:
//!
//! ```
//! use horizon_select::dom::DomTree;
//! use horizon_select::select::{SelectConfig, SelectController, Selectable};
//!
//! struct ListBox {
//!     select: SelectController,
//! }
//!
//! impl Selectable for ListBox {
//!     fn select_controller(&self) -> &SelectController {
//!         &self.select
//!     }
//!     fn select_controller_mut(&mut self) -> &mut SelectController {
//!         &mut self.select
//!     }
//! }
//!
//! let mut tree = DomTree::new();
//! let host = tree.create_element("list-box");
//! tree.append_child(tree.document(), host).unwrap();
//! let first = tree.create_element("list-item");
//! tree.append_child(host, first).unwrap();
//!
//! let mut list = ListBox { select: SelectController::new(host, SelectConfig::default()) };
//! list.connect(&mut tree);
//! list.select_next(&mut tree);
//! list.flush(&mut tree);
//! assert_eq!(list.selected_item(&tree).single(), Some(first));
//! ```

mod allowed;
pub mod codec;
mod config;
mod controller;
mod host;
mod item;

pub use allowed::AllowedChildren;
pub use codec::{CodecError, IndexList};
pub use config::{ConfigError, DEFAULT_ATTRIBUTE_FOR_SELECTED, SelectConfig};
pub use controller::{ITEM_INDEX_ATTRIBUTE, MAX_FLUSH_ROUNDS, SelectController};
pub use host::{ChangedProperties, PropertyChange, PropertyValue, SelectProperty};
pub use item::{IndexArg, Item, SelectedIndex, SelectedItem, SelectedValue};

use horizon_select_core::PropertyError;

use crate::dom::{DomTree, Event, NodeId};

/// A host element with selectable children.
///
/// Implementors provide the controller; every other method delegates to
/// it. Override a provided method to customise one behaviour while keeping
/// the rest.
pub trait Selectable {
    fn select_controller(&self) -> &SelectController;
    fn select_controller_mut(&mut self) -> &mut SelectController;

    /// Attach to the tree: install listeners, start observing and run the
    /// initial reconciliation.
    fn connect(&mut self, tree: &mut DomTree) {
        let select = self.select_controller_mut();
        select.connected(tree);
        select.first_updated(tree);
    }

    fn disconnect(&mut self, tree: &mut DomTree) {
        self.select_controller_mut().disconnected(tree);
    }

    /// Process all queued changes. See [`SelectController::flush`].
    fn flush(&mut self, tree: &mut DomTree) -> usize {
        self.select_controller_mut().flush(tree)
    }

    fn items(&self) -> Vec<NodeId> {
        self.select_controller().item_nodes()
    }

    fn selected_item(&self, tree: &DomTree) -> SelectedItem {
        self.select_controller().selected_item(tree)
    }

    fn selected_index(&self, tree: &DomTree) -> SelectedIndex {
        self.select_controller().selected_index(tree)
    }

    fn value(&self, tree: &DomTree) -> SelectedValue {
        self.select_controller().value(tree)
    }

    fn focused_item(&self, tree: &DomTree) -> Option<NodeId> {
        self.select_controller().focused_item(tree)
    }

    fn focused_index(&self, tree: &DomTree) -> Option<usize> {
        self.select_controller().focused_index(tree)
    }

    fn has_active_item(&self, tree: &DomTree) -> bool {
        self.select_controller().has_active_item(tree)
    }

    fn select_index(&mut self, tree: &mut DomTree, index: impl Into<IndexArg>)
    where
        Self: Sized,
    {
        self.select_controller_mut().select_index(tree, index);
    }

    fn select_multi_index(&mut self, tree: &mut DomTree, indices: &[i64]) {
        self.select_controller_mut().select_multi_index(tree, indices);
    }

    fn select_next(&mut self, tree: &mut DomTree) {
        self.select_controller_mut().select_next(tree);
    }

    fn select_previous(&mut self, tree: &mut DomTree) {
        self.select_controller_mut().select_previous(tree);
    }

    fn focus_index(&mut self, tree: &mut DomTree, index: usize) {
        self.select_controller_mut().focus_index(tree, index);
    }

    fn focus_next(&mut self, tree: &mut DomTree) {
        self.select_controller_mut().focus_next(tree);
    }

    fn focus_previous(&mut self, tree: &mut DomTree) {
        self.select_controller_mut().focus_previous(tree);
    }

    fn focus_item(&mut self, tree: &mut DomTree, item: Option<NodeId>) {
        self.select_controller_mut().focus_item(tree, item);
    }

    fn unfocus_item(&mut self, tree: &mut DomTree, item: Option<NodeId>) {
        self.select_controller_mut().unfocus_item(tree, item);
    }

    fn toggle_focused_item(&mut self, tree: &mut DomTree) {
        self.select_controller_mut().toggle_focused_item(tree);
    }

    /// Handle a keydown delivered directly rather than through the tree.
    fn on_keydown(&mut self, tree: &mut DomTree, event: &Event) {
        if event.default_prevented() {
            return;
        }
        if let Some(key) = event.key() {
            self.select_controller_mut().handle_key(tree, key);
        }
    }

    fn set_property(
        &mut self,
        tree: &mut DomTree,
        property: SelectProperty,
        value: PropertyValue,
    ) -> Result<(), PropertyError> {
        self.select_controller_mut().set_property(tree, property, value)
    }

    fn attribute_changed(&mut self, tree: &mut DomTree, name: &str, value: Option<&str>) {
        self.select_controller_mut().attribute_changed(tree, name, value);
    }
}
