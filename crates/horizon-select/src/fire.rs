//! Dispatching events from an owning element.
//!
//! [`Fire`] gives any type that owns an element a one-call way to dispatch
//! an event with a payload. Fired events neither bubble nor cross shadow
//! boundaries unless a [`FireInit`] says otherwise.
//!
//! # Example
//!
//! ```
//! use horizon_select::dom::{DomTree, EventDetail};
//! use horizon_select::fire::{Fire, FireInit};
//!
//! let mut tree = DomTree::new();
//! let button = tree.create_element("x-button");
//!
//! let delivered = button.fire(&tree, "pressed", EventDetail::None, FireInit::default());
//! assert!(delivered);
//! ```

use crate::dom::{DomTree, Event, EventDetail, NodeId};

/// Propagation options for [`Fire::fire`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FireInit {
    /// Propagate to ancestors.
    pub bubbles: bool,
    /// Continue past shadow roots to their hosts.
    pub composed: bool,
}

impl FireInit {
    /// Bubbling and composed, for events meant to reach the whole page.
    pub fn bubbling_composed() -> Self {
        Self {
            bubbles: true,
            composed: true,
        }
    }
}

/// Something that dispatches events from an element it owns.
pub trait Fire {
    /// The element events are dispatched from.
    fn fire_target(&self) -> NodeId;

    /// Dispatch an event of `kind` carrying `detail`.
    ///
    /// Returns `true` unless a listener prevented the default action.
    /// Dispatching never fails; an event nobody listens to is simply
    /// delivered to no one.
    fn fire(&self, tree: &DomTree, kind: &str, detail: impl Into<EventDetail>, init: FireInit) -> bool {
        let target = self.fire_target();
        tracing::trace!(target: "horizon_select::fire", kind, ?target, bubbles = init.bubbles, composed = init.composed, "firing event");
        let event = Event::new(kind)
            .with_detail(detail)
            .bubbles(init.bubbles)
            .composed(init.composed)
            .cancelable(true);
        tree.dispatch_event(target, event)
    }
}

impl Fire for NodeId {
    fn fire_target(&self) -> NodeId {
        *self
    }
}
