//! Core systems for Horizon Select.
//!
//! The reactive pieces the selection controller is built from:
//!
//! - [`Signal`]: ordered, synchronous notifications
//! - [`Property`]: values that report whether a write changed them
//! - [`logging`]: `tracing` target and span names
//!
//! A component typically keeps its state in properties and emits a signal
//! when a write reports a change:
//!
//! ```
//! use horizon_select_core::{Property, Signal};
//!
//! struct Marker {
//!     attribute: Property<String>,
//!     attribute_changed: Signal<(String, String)>,
//! }
//!
//! impl Marker {
//!     fn set_attribute(&self, attribute: &str) {
//!         if let Some(old) = self.attribute.replace(attribute.to_string()) {
//!             self.attribute_changed.emit((old, attribute.to_string()));
//!         }
//!     }
//! }
//!
//! let marker = Marker {
//!     attribute: Property::new("selected".to_string()),
//!     attribute_changed: Signal::new(),
//! };
//! marker.attribute_changed.connect(|(old, new)| println!("{old} -> {new}"));
//! marker.set_attribute("checked");
//! marker.set_attribute("checked");
//! assert_eq!(marker.attribute.get(), "checked");
//! ```

pub mod logging;
pub mod property;
pub mod signal;

pub use property::{Property, PropertyError, PropertyMeta};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
