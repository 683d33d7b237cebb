//! Commonly used types.
//!
//! ```ignore
//! use horizon_select::prelude::*;
//! ```

// ============================================================================
// Element Tree
// ============================================================================

pub use crate::dom::{DomError, DomTree, Event, EventDetail, Key, NodeId};

// ============================================================================
// Selection
// ============================================================================

pub use crate::select::{
    AllowedChildren, PropertyValue, SelectConfig, SelectController, SelectProperty, Selectable,
    SelectedIndex, SelectedItem, SelectedValue,
};

// ============================================================================
// Events and Signals
// ============================================================================

pub use crate::fire::{Fire, FireInit};
pub use horizon_select_core::Signal;

pub use crate::error::SelectError;
