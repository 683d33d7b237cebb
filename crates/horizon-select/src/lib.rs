//! Horizon Select - selectable collections over a retained element tree.
//!
//! A host element owns a [`SelectController`](select::SelectController)
//! that tracks its item children, keeps the selection in a marker
//! attribute, and moves focus and selection from the keyboard. The element
//! tree lives in [`dom`]; event dispatch from an owning element in
//! [`fire`].
//!
//! # Example
//!
//! ```
//! use horizon_select::prelude::*;
//!
//! fn main() -> Result<(), SelectError> {
//!     let mut tree = DomTree::new();
//!     let host = tree.create_element("x-menu");
//!     tree.append_child(tree.document(), host)?;
//!     for _ in 0..3 {
//!         let item = tree.create_element("x-option");
//!         tree.append_child(host, item)?;
//!     }
//!
//!     let config = SelectConfig::from_json_str(r#"{ "allowedChildren": ["x-option"] }"#)?;
//!     let mut select = SelectController::new(host, config);
//!     select.connected(&mut tree);
//!     select.first_updated(&mut tree);
//!
//!     select.select_previous(&mut tree);
//!     select.flush(&mut tree);
//!     assert_eq!(select.selected_index(&tree), SelectedIndex::Single(Some(2)));
//!     Ok(())
//! }
//! ```

pub mod dom;
pub mod error;
pub mod fire;
pub mod prelude;
pub mod select;

pub use error::{Result, SelectError};
pub use horizon_select_core::{ConnectionGuard, ConnectionId, Property, PropertyError, Signal};
