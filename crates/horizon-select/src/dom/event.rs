//! Structured events and listener dispatch.
//!
//! An [`Event`] carries a kind string, a typed [`EventDetail`] payload and
//! the propagation flags. [`DomTree::dispatch_event`] walks the event path
//! from the target upward, invoking listeners registered for the event's
//! kind on each node in registration order.
//!
//! # Propagation
//!
//! - A non-bubbling event reaches only the target's listeners.
//! - A bubbling event continues to each ancestor until it reaches the root
//!   of the target's tree or propagation is stopped.
//! - A bubbling event that is also `composed` continues from a shadow root
//!   to its host, and listeners beyond the boundary see the host as the
//!   event target.

use std::fmt;
use std::sync::Arc;

use slotmap::new_key_type;

use super::node::NodeKind;
use super::{DomTree, NodeId};

new_key_type! {
    /// Identifier of a registered event listener.
    pub struct ListenerId;
}

/// Keyboard key identifiers, as reported by a keydown event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    // Navigation
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    Enter,
    Space,

    /// A printable character other than space.
    Character(char),
    /// Any other named key.
    Other(String),
}

impl Key {
    /// Map a key value string (`"ArrowDown"`, `"Enter"`, `" "`) to a key.
    pub fn from_key_str(key: &str) -> Self {
        match key {
            "ArrowUp" | "Up" => Key::ArrowUp,
            "ArrowDown" | "Down" => Key::ArrowDown,
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowRight" | "Right" => Key::ArrowRight,
            "Enter" => Key::Enter,
            " " | "Spacebar" => Key::Space,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Character(c),
                    _ => Key::Other(other.to_string()),
                }
            }
        }
    }
}

/// Payload carried by an event.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EventDetail {
    /// No payload.
    #[default]
    None,
    /// A single node.
    Node(NodeId),
    /// An ordered list of nodes.
    Nodes(Vec<NodeId>),
    /// The key of a keyboard event.
    Key(Key),
    /// Arbitrary structured data.
    Json(serde_json::Value),
}

impl EventDetail {
    /// The payload node, if this detail is a single node.
    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            EventDetail::Node(node) => Some(*node),
            _ => None,
        }
    }

    /// The payload nodes, if this detail is a node list.
    pub fn as_nodes(&self) -> Option<&[NodeId]> {
        match self {
            EventDetail::Nodes(nodes) => Some(nodes),
            _ => None,
        }
    }

    /// The payload key, if this is a keyboard detail.
    pub fn as_key(&self) -> Option<&Key> {
        match self {
            EventDetail::Key(key) => Some(key),
            _ => None,
        }
    }
}

impl From<NodeId> for EventDetail {
    fn from(node: NodeId) -> Self {
        EventDetail::Node(node)
    }
}

impl From<Vec<NodeId>> for EventDetail {
    fn from(nodes: Vec<NodeId>) -> Self {
        EventDetail::Nodes(nodes)
    }
}

impl From<Key> for EventDetail {
    fn from(key: Key) -> Self {
        EventDetail::Key(key)
    }
}

impl From<serde_json::Value> for EventDetail {
    fn from(value: serde_json::Value) -> Self {
        EventDetail::Json(value)
    }
}

/// A structured event.
#[derive(Debug, Clone)]
pub struct Event {
    kind: String,
    detail: EventDetail,
    bubbles: bool,
    composed: bool,
    cancelable: bool,
    default_prevented: bool,
    propagation_stopped: bool,
    target: Option<NodeId>,
    current_target: Option<NodeId>,
}

impl Event {
    /// Create a non-bubbling, non-composed, non-cancelable event.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            detail: EventDetail::None,
            bubbles: false,
            composed: false,
            cancelable: false,
            default_prevented: false,
            propagation_stopped: false,
            target: None,
            current_target: None,
        }
    }

    /// Create a keydown event as a user agent would: bubbling, composed
    /// and cancelable.
    pub fn keydown(key: Key) -> Self {
        Self::new("keydown")
            .with_detail(key)
            .bubbles(true)
            .composed(true)
            .cancelable(true)
    }

    /// Set the payload.
    pub fn with_detail(mut self, detail: impl Into<EventDetail>) -> Self {
        self.detail = detail.into();
        self
    }

    /// Set whether the event propagates to ancestors.
    pub fn bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    /// Set whether the event crosses shadow boundaries.
    pub fn composed(mut self, composed: bool) -> Self {
        self.composed = composed;
        self
    }

    /// Set whether listeners may prevent the default action.
    pub fn cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    /// The event kind, e.g. `"keydown"`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The payload.
    pub fn detail(&self) -> &EventDetail {
        &self.detail
    }

    /// The key, for keyboard events.
    pub fn key(&self) -> Option<&Key> {
        self.detail.as_key()
    }

    pub fn is_bubbling(&self) -> bool {
        self.bubbles
    }

    pub fn is_composed(&self) -> bool {
        self.composed
    }

    pub fn is_cancelable(&self) -> bool {
        self.cancelable
    }

    /// Whether a listener has prevented the default action.
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Prevent the default action. Has no effect on non-cancelable events.
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Stop the event from reaching further nodes on its path. Listeners on
    /// the current node still run.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// The node the event was dispatched to, as seen from the current
    /// listener's tree.
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    /// The node whose listener is currently running.
    pub fn current_target(&self) -> Option<NodeId> {
        self.current_target
    }
}

pub(super) type Callback = Arc<dyn Fn(&mut Event) + Send + Sync>;

pub(super) struct Listener {
    pub(super) node: NodeId,
    pub(super) kind: String,
    pub(super) callback: Callback,
    pub(super) seq: u64,
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("node", &self.node)
            .field("kind", &self.kind)
            .field("seq", &self.seq)
            .finish()
    }
}

impl DomTree {
    /// Register a listener for events of `kind` reaching `node`.
    pub fn add_event_listener<F>(&mut self, node: NodeId, kind: &str, callback: F) -> ListenerId
    where
        F: Fn(&mut Event) + Send + Sync + 'static,
    {
        let seq = self.next_listener_seq;
        self.next_listener_seq += 1;
        self.listeners.insert(Listener {
            node,
            kind: kind.to_string(),
            callback: Arc::new(callback),
            seq,
        })
    }

    /// Remove a listener. Returns `false` if it was already removed.
    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id).is_some()
    }

    /// Number of listeners registered on `node`, across all kinds.
    pub fn listener_count(&self, node: NodeId) -> usize {
        self.listeners.values().filter(|l| l.node == node).count()
    }

    /// Dispatch `event` to `target` and along its propagation path.
    ///
    /// Returns `false` if a listener prevented the default action. A target
    /// that is not in the tree reaches no listeners.
    #[tracing::instrument(skip_all, target = "horizon_select::dom", level = "trace", fields(kind = event.kind()))]
    pub fn dispatch_event(&self, target: NodeId, mut event: Event) -> bool {
        if !self.contains_node(target) {
            tracing::trace!(target: "horizon_select::dom", ?target, "dispatch to unknown node");
            return true;
        }

        for (node, seen_target) in self.event_path(target, &event) {
            event.target = Some(seen_target);
            event.current_target = Some(node);

            let mut callbacks: Vec<(u64, Callback)> = self
                .listeners
                .values()
                .filter(|l| l.node == node && l.kind == event.kind)
                .map(|l| (l.seq, l.callback.clone()))
                .collect();
            callbacks.sort_by_key(|(seq, _)| *seq);

            for (_, callback) in callbacks {
                callback(&mut event);
            }

            if event.propagation_stopped {
                break;
            }
        }

        !event.default_prevented
    }

    /// Nodes the event visits, each paired with the target it appears to
    /// have from that node.
    fn event_path(&self, target: NodeId, event: &Event) -> Vec<(NodeId, NodeId)> {
        let mut path = vec![(target, target)];
        if !event.bubbles {
            return path;
        }

        let mut seen_target = target;
        let mut current = target;
        loop {
            let next = match (self.parent(current), self.kind(current)) {
                (Some(parent), _) => parent,
                (None, Some(NodeKind::ShadowRoot { host })) if event.composed => {
                    seen_target = *host;
                    *host
                }
                _ => break,
            };
            path.push((next, seen_target));
            current = next;
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_key_from_str() {
        assert_eq!(Key::from_key_str("ArrowDown"), Key::ArrowDown);
        assert_eq!(Key::from_key_str(" "), Key::Space);
        assert_eq!(Key::from_key_str("Enter"), Key::Enter);
        assert_eq!(Key::from_key_str("a"), Key::Character('a'));
        assert_eq!(Key::from_key_str("F13"), Key::Other("F13".into()));
        assert_eq!(Key::from_key_str("Escape"), Key::Other("Escape".into()));
    }

    #[test]
    fn test_prevent_default_requires_cancelable() {
        let mut event = Event::new("custom");
        event.prevent_default();
        assert!(!event.default_prevented());

        let mut event = Event::new("custom").cancelable(true);
        event.prevent_default();
        assert!(event.default_prevented());
    }

    #[test]
    fn test_non_bubbling_event_stays_on_target() {
        let mut tree = DomTree::new();
        let parent = tree.create_element("div");
        let child = tree.create_element("span");
        tree.append_child(tree.document(), parent).unwrap();
        tree.append_child(parent, child).unwrap();

        let hits = Arc::new(Mutex::new(Vec::new()));
        for node in [parent, child] {
            let hits = hits.clone();
            tree.add_event_listener(node, "ping", move |e| {
                hits.lock().push(e.current_target().unwrap());
            });
        }

        tree.dispatch_event(child, Event::new("ping"));
        assert_eq!(*hits.lock(), vec![child]);

        tree.dispatch_event(child, Event::new("ping").bubbles(true));
        assert_eq!(*hits.lock(), vec![child, child, parent]);
    }

    #[test]
    fn test_stop_propagation() {
        let mut tree = DomTree::new();
        let parent = tree.create_element("div");
        let child = tree.create_element("span");
        tree.append_child(parent, child).unwrap();

        let hits = Arc::new(Mutex::new(0));
        let hits_clone = hits.clone();
        tree.add_event_listener(child, "ping", |e| e.stop_propagation());
        tree.add_event_listener(parent, "ping", move |_| *hits_clone.lock() += 1);

        tree.dispatch_event(child, Event::new("ping").bubbles(true));
        assert_eq!(*hits.lock(), 0);
    }

    #[test]
    fn test_dispatch_reports_cancellation() {
        let mut tree = DomTree::new();
        let node = tree.create_element("div");
        tree.add_event_listener(node, "keydown", |e| e.prevent_default());

        assert!(!tree.dispatch_event(node, Event::keydown(Key::Enter)));
        assert!(tree.dispatch_event(node, Event::new("keydown")));
    }

    #[test]
    fn test_composed_event_crosses_shadow_boundary() {
        let mut tree = DomTree::new();
        let host = tree.create_element("x-host");
        tree.append_child(tree.document(), host).unwrap();
        let root = tree.attach_shadow(host).unwrap();
        let inner = tree.create_element("button");
        tree.append_child(root, inner).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        tree.add_event_listener(host, "ping", move |e| {
            seen_clone.lock().push(e.target().unwrap());
        });

        tree.dispatch_event(inner, Event::new("ping").bubbles(true));
        assert!(seen.lock().is_empty());

        tree.dispatch_event(inner, Event::new("ping").bubbles(true).composed(true));
        assert_eq!(*seen.lock(), vec![host]);
    }

    #[test]
    fn test_remove_listener() {
        let mut tree = DomTree::new();
        let node = tree.create_element("div");
        let id = tree.add_event_listener(node, "ping", |_| {});
        assert_eq!(tree.listener_count(node), 1);
        assert!(tree.remove_event_listener(id));
        assert!(!tree.remove_event_listener(id));
        assert_eq!(tree.listener_count(node), 0);
    }
}
