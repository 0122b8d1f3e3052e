//! Change notification for the node graph.
//!
//! A Subscriber represents anything that wants to hear about graph mutations,
//! typically the renderer scheduling a redraw.
//!
//! Delivery is synchronous and single-threaded: subscribers run in
//! registration order, after the mutating call has finished updating the
//! graph and before it returns to the caller.

use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

use super::NodeId;
use crate::layout::LayoutMode;

/// Unique identifier for a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// What changed in the graph.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    NodeCreated(NodeId),

    /// A subtree was removed; `removed` counts the node and its descendants.
    NodeDeleted { id: NodeId, removed: usize },

    TextChanged(NodeId),

    /// A node was repositioned; `moved` counts every node whose position changed.
    NodeMoved { id: NodeId, moved: usize },

    SizeChanged(NodeId),

    /// A node's children were reordered; carries the parent.
    ChildrenReordered(NodeId),

    CollapseToggled(NodeId),
    SelectionChanged(Option<NodeId>),
    MetadataChanged(NodeId),

    /// Title, layout mode or theme changed.
    DocumentChanged,

    LayoutApplied(LayoutMode),

    /// Every node was translated by the same vector to recenter the map.
    Arranged,

    /// The whole graph was replaced by an imported document.
    Imported,
}

type Callback = Box<dyn FnMut(&GraphEvent)>;

/// Registered subscribers, kept in registration order.
#[derive(Default)]
pub(crate) struct Subscribers {
    callbacks: IndexMap<SubscriberId, Callback>,
}

impl Subscribers {
    pub(crate) fn subscribe<F>(&mut self, callback: F) -> SubscriberId
    where
        F: FnMut(&GraphEvent) + 'static,
    {
        let id = SubscriberId::new();
        self.callbacks.insert(id, Box::new(callback));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        // shift_remove keeps the remaining subscribers in registration order
        self.callbacks.shift_remove(&id).is_some()
    }

    pub(crate) fn notify(&mut self, event: &GraphEvent) {
        for callback in self.callbacks.values_mut() {
            callback(event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.callbacks.len()
    }
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.callbacks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn subscriber_ids_are_unique() {
        let id1 = SubscriberId::new();
        let id2 = SubscriberId::new();
        let id3 = SubscriberId::new();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }

    #[test]
    fn notifies_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut subscribers = Subscribers::default();

        for name in ["first", "second", "third"] {
            let log = log.clone();
            subscribers.subscribe(move |_| log.borrow_mut().push(name));
        }

        subscribers.notify(&GraphEvent::DocumentChanged);
        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn unsubscribed_callbacks_stop_receiving() {
        let count = Rc::new(RefCell::new(0));
        let mut subscribers = Subscribers::default();

        let counter = count.clone();
        let id = subscribers.subscribe(move |_| *counter.borrow_mut() += 1);

        subscribers.notify(&GraphEvent::Imported);
        assert!(subscribers.unsubscribe(id));
        assert!(!subscribers.unsubscribe(id));
        subscribers.notify(&GraphEvent::Imported);

        assert_eq!(*count.borrow(), 1);
        assert_eq!(subscribers.len(), 0);
    }
}
