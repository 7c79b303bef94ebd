//! Forwarding table for property-changed bubbling
//!
//! A container forwards the property changes of every node in its subtree.
//! The table records those links explicitly: `attach` is called with the
//! ancestor chain that gains a subtree, `detach` with the chain that loses
//! one. Both are driven by the tree at the exact point of structural change.

use std::collections::{HashMap, HashSet};

use tracing::{trace, warn};

use crate::domain::node::NodeId;

#[derive(Debug, Default)]
pub struct ForwardingTable {
    links: HashMap<NodeId, HashSet<NodeId>>,
}

impl ForwardingTable {
    /// Every ancestor starts forwarding every subtree node.
    /// Returns the number of links created.
    pub fn attach(&mut self, ancestors: &[NodeId], subtree: &[NodeId]) -> usize {
        let mut created = 0;
        for &ancestor in ancestors {
            let sources = self.links.entry(ancestor).or_default();
            for &node in subtree {
                if sources.insert(node) {
                    created += 1;
                } else {
                    warn!(%ancestor, %node, "forwarding link already present");
                }
            }
        }
        trace!(created, "forwarding attached");
        created
    }

    /// Every ancestor stops forwarding every subtree node.
    /// Returns the number of links removed.
    pub fn detach(&mut self, ancestors: &[NodeId], subtree: &[NodeId]) -> usize {
        let mut removed = 0;
        for &ancestor in ancestors {
            if let Some(sources) = self.links.get_mut(&ancestor) {
                for node in subtree {
                    if sources.remove(node) {
                        removed += 1;
                    }
                }
                if sources.is_empty() {
                    self.links.remove(&ancestor);
                }
            }
        }
        trace!(removed, "forwarding detached");
        removed
    }

    pub fn forwards(&self, ancestor: NodeId, source: NodeId) -> bool {
        self.links
            .get(&ancestor)
            .is_some_and(|sources| sources.contains(&source))
    }

    pub fn sources(&self, ancestor: NodeId) -> HashSet<NodeId> {
        self.links.get(&ancestor).cloned().unwrap_or_default()
    }

    /// Drops everything `node` forwards and every link pointing at it.
    pub fn forget(&mut self, node: NodeId) {
        self.links.remove(&node);
        self.links.retain(|_, sources| {
            sources.remove(&node);
            !sources.is_empty()
        });
    }

    pub fn link_count(&self) -> usize {
        self.links.values().map(HashSet::len).sum()
    }
}
