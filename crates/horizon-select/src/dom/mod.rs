//! A small retained element tree.
//!
//! The tree is an arena of nodes addressed by [`NodeId`]. It supports the
//! operations the selection controller relies on:
//!
//! - element attributes, parent/child links and text/comment nodes
//! - shadow roots with named and unnamed slots
//! - focus and active state
//! - event listeners with bubbling and shadow-boundary crossing
//! - mutation observers that queue records until taken
//!
//! Observers never run callbacks. Their records accumulate until the owner
//! calls [`DomTree::take_records`], which lets a single reconciler drain
//! every source of change in order.
//!
//! # Example
//!
//! ```
//! use horizon_select::dom::DomTree;
//!
//! let mut tree = DomTree::new();
//! let list = tree.create_element("x-list");
//! let item = tree.create_element("x-item");
//! tree.append_child(tree.document(), list).unwrap();
//! tree.append_child(list, item).unwrap();
//!
//! tree.set_attribute(item, "selected", "").unwrap();
//! assert!(tree.has_attribute(item, "selected"));
//! assert_eq!(tree.element_children(list), vec![item]);
//! ```

pub mod event;
mod focus;
pub mod mutation;
mod node;
mod shadow;
mod tree;

use slotmap::new_key_type;

pub use event::{Event, EventDetail, Key, ListenerId};
pub use mutation::{MutationKind, MutationObserverInit, MutationRecord, ObserverId};
pub use node::{ElementData, NodeKind};
pub use tree::DomTree;

new_key_type! {
    /// Handle to a node in a [`DomTree`].
    ///
    /// Handles stay valid after a node is detached from its parent; a
    /// detached node can be re-inserted elsewhere.
    pub struct NodeId;
}

/// Result type alias for element tree operations.
pub type Result<T> = std::result::Result<T, DomError>;

/// Errors raised by structural element tree operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// The node handle does not refer to a node in this tree.
    #[error("node {0:?} does not exist")]
    NodeNotFound(NodeId),

    /// The operation requires an element.
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    /// The insertion would create a cycle or put a node under a leaf.
    #[error("cannot insert {child:?} under {parent:?}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    /// The reference node is not a child of the given parent.
    #[error("{child:?} is not a child of {parent:?}")]
    NotAChild { child: NodeId, parent: NodeId },

    /// The element already hosts a shadow root.
    #[error("element {0:?} already has a shadow root")]
    ShadowRootExists(NodeId),
}
