//! Reordering within one container's child sequence
//!
//! None of these touch parentage. A `Moved` (or `Sorted`) notification is
//! raised only when the order actually changed.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use crate::domain::arena::ConnectionTree;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::events::CollectionChange;
use crate::domain::node::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl ConnectionTree {
    /// Moves `node` to `index`, clamped to the last position.
    ///
    /// A negative index leaves the node where it is.
    #[instrument(level = "debug", skip(self))]
    pub fn set_child_position(&mut self, container: NodeId, node: NodeId, index: isize) -> DomainResult<()> {
        let from = self.require_child(container, node)?;
        let Ok(index) = usize::try_from(index) else {
            trace!(index, "negative position ignored");
            return Ok(());
        };
        let last = self.container(container)?.children.len() - 1;
        self.move_child(container, from, index.min(last))
    }

    /// Moves `node` to the index `reference` held before the move.
    #[instrument(level = "debug", skip(self))]
    pub fn set_child_above(&mut self, container: NodeId, node: NodeId, reference: NodeId) -> DomainResult<()> {
        self.require_child(container, node)?;
        let target = self.require_child(container, reference)?;
        self.set_child_position(container, node, target as isize)
    }

    /// Moves `node` to the index `reference` held before the move, plus one.
    #[instrument(level = "debug", skip(self))]
    pub fn set_child_below(&mut self, container: NodeId, node: NodeId, reference: NodeId) -> DomainResult<()> {
        self.require_child(container, node)?;
        let target = self.require_child(container, reference)?;
        self.set_child_position(container, node, target as isize + 1)
    }

    /// Swaps `node` with its predecessor.
    #[instrument(level = "debug", skip(self))]
    pub fn promote_child(&mut self, container: NodeId, node: NodeId) -> DomainResult<()> {
        let from = self.require_child(container, node)?;
        match from.checked_sub(1) {
            Some(to) => self.move_child(container, from, to),
            None => Ok(()),
        }
    }

    /// Swaps `node` with its successor.
    #[instrument(level = "debug", skip(self))]
    pub fn demote_child(&mut self, container: NodeId, node: NodeId) -> DomainResult<()> {
        let from = self.require_child(container, node)?;
        let len = self.container(container)?.children.len();
        if from + 1 < len {
            self.move_child(container, from, from + 1)
        } else {
            Ok(())
        }
    }

    /// Stable, case-insensitive sort of the direct children by name.
    #[instrument(level = "debug", skip(self))]
    pub fn sort_children(&mut self, container: NodeId, order: SortOrder) -> DomainResult<()> {
        let current = self.container(container)?.children.clone();
        let mut keyed: Vec<(NodeId, String)> = current
            .iter()
            .map(|&child| Ok((child, self.node(child)?.name().to_string())))
            .collect::<DomainResult<_>>()?;
        keyed.sort_by(|(_, a), (_, b)| compare_names(a, b, order));
        let sorted: Vec<NodeId> = keyed.into_iter().map(|(child, _)| child).collect();
        if sorted == current {
            return Ok(());
        }
        self.container_mut(container)?.children = sorted;
        self.raise_collection_changed(container, CollectionChange::Sorted);
        Ok(())
    }

    /// Sorts `container` and every container below it.
    #[instrument(level = "debug", skip(self))]
    pub fn sort_recursive(&mut self, container: NodeId, order: SortOrder) -> DomainResult<()> {
        self.container(container)?;
        let containers: Vec<NodeId> = self
            .subtree(container)?
            .into_iter()
            .filter(|&id| self.is_container(id).unwrap_or(false))
            .collect();
        for id in containers {
            // a listener may have restructured the tree meanwhile
            if self.container(id).is_ok() {
                self.sort_children(id, order)?;
            }
        }
        Ok(())
    }

    fn require_child(&self, container: NodeId, node: NodeId) -> DomainResult<usize> {
        self.node(node)?;
        self.container(container)?
            .position(node)
            .ok_or(DomainError::NotAChild { node, container })
    }

    fn move_child(&mut self, container: NodeId, from: usize, to: usize) -> DomainResult<()> {
        if from == to {
            return Ok(());
        }
        let children = &mut self.container_mut(container)?.children;
        let node = children.remove(from);
        children.insert(to, node);
        self.raise_collection_changed(container, CollectionChange::Moved { node, from, to });
        Ok(())
    }
}

fn compare_names(a: &str, b: &str, order: SortOrder) -> Ordering {
    let ordering = a.to_lowercase().cmp(&b.to_lowercase());
    match order {
        SortOrder::Ascending => ordering,
        SortOrder::Descending => ordering.reverse(),
    }
}
