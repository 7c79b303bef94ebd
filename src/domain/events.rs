//! Per-node event channels
//!
//! Each node has two channels: collection-changed (containers only) and
//! property-changed. Listeners receive the tree mutably so they can react to
//! an event by changing the tree again; dispatch is a plain synchronous call.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::domain::arena::ConnectionTree;
use crate::domain::node::{NodeId, Property};

/// Change to a container's direct child sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionChange {
    Added { node: NodeId, index: usize },
    Removed { node: NodeId, index: usize },
    Moved { node: NodeId, from: usize, to: usize },
    Sorted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeEvent {
    CollectionChanged {
        container: NodeId,
        change: CollectionChange,
    },
    /// `sender` owns the channel the event is delivered on, `source` is the
    /// node whose property changed. They differ for bubbled events.
    PropertyChanged {
        sender: NodeId,
        source: NodeId,
        property: Property,
    },
}

impl TreeEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            TreeEvent::CollectionChanged { .. } => EventKind::CollectionChanged,
            TreeEvent::PropertyChanged { .. } => EventKind::PropertyChanged,
        }
    }

    pub fn is_bubbled(&self) -> bool {
        matches!(self, TreeEvent::PropertyChanged { sender, source, .. } if sender != source)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    CollectionChanged,
    PropertyChanged,
}

/// Handle returned by subscribe calls, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

pub type Listener = Rc<dyn Fn(&mut ConnectionTree, &TreeEvent)>;

struct Subscription {
    id: SubscriptionId,
    kind: EventKind,
    listener: Listener,
}

/// Registry of external listeners keyed by the node whose channel they watch.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: u64,
    by_node: HashMap<NodeId, Vec<Subscription>>,
    owners: HashMap<SubscriptionId, NodeId>,
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("subscriptions", &self.owners.len())
            .finish()
    }
}

impl ListenerRegistry {
    pub fn subscribe(&mut self, node: NodeId, kind: EventKind, listener: Listener) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.by_node.entry(node).or_default().push(Subscription { id, kind, listener });
        self.owners.insert(id, node);
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let Some(node) = self.owners.remove(&id) else {
            return false;
        };
        if let Some(subs) = self.by_node.get_mut(&node) {
            subs.retain(|s| s.id != id);
            if subs.is_empty() {
                self.by_node.remove(&node);
            }
        }
        true
    }

    pub fn is_active(&self, id: SubscriptionId) -> bool {
        self.owners.contains_key(&id)
    }

    /// Listeners of `node` for `kind`, in subscription order.
    ///
    /// Returns clones so dispatch can hand the tree to each listener.
    pub fn snapshot(&self, node: NodeId, kind: EventKind) -> Vec<(SubscriptionId, Listener)> {
        self.by_node
            .get(&node)
            .map(|subs| {
                subs.iter()
                    .filter(|s| s.kind == kind)
                    .map(|s| (s.id, Rc::clone(&s.listener)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Drops every listener registered on `node`. Returns how many were dropped.
    pub fn forget(&mut self, node: NodeId) -> usize {
        let Some(subs) = self.by_node.remove(&node) else {
            return 0;
        };
        for s in &subs {
            self.owners.remove(&s.id);
        }
        subs.len()
    }

    pub fn count(&self, node: NodeId) -> usize {
        self.by_node.get(&node).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use generational_arena::Index;
    use uuid::Uuid;

    fn node(slot: usize) -> NodeId {
        NodeId::new(Uuid::nil(), Index::from_raw_parts(slot, 0))
    }

    fn noop() -> Listener {
        Rc::new(|_: &mut ConnectionTree, _: &TreeEvent| {})
    }

    #[test]
    fn given_mixed_kinds_when_snapshot_then_filters_by_kind_in_order() {
        let mut registry = ListenerRegistry::default();
        let a = registry.subscribe(node(1), EventKind::PropertyChanged, noop());
        registry.subscribe(node(1), EventKind::CollectionChanged, noop());
        let c = registry.subscribe(node(1), EventKind::PropertyChanged, noop());

        let ids: Vec<_> = registry
            .snapshot(node(1), EventKind::PropertyChanged)
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[test]
    fn given_subscription_when_unsubscribed_twice_then_second_is_false() {
        let mut registry = ListenerRegistry::default();
        let id = registry.subscribe(node(1), EventKind::PropertyChanged, noop());

        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));
        assert!(!registry.is_active(id));
        assert_eq!(registry.count(node(1)), 0);
    }

    #[test]
    fn given_listeners_on_node_when_forget_then_all_inactive() {
        let mut registry = ListenerRegistry::default();
        let a = registry.subscribe(node(1), EventKind::PropertyChanged, noop());
        let b = registry.subscribe(node(1), EventKind::CollectionChanged, noop());
        let other = registry.subscribe(node(2), EventKind::PropertyChanged, noop());

        assert_eq!(registry.forget(node(1)), 2);
        assert!(!registry.is_active(a));
        assert!(!registry.is_active(b));
        assert!(registry.is_active(other));
    }
}
