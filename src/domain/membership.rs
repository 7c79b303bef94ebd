//! Container membership: add, remove, reparent
//!
//! Every operation finishes its structural work (child sequence, parent link,
//! forwarding table) before raising the collection-changed notification.

use std::iter;

use itertools::Itertools;
use tracing::{debug, instrument, trace};

use crate::domain::arena::ConnectionTree;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::events::CollectionChange;
use crate::domain::node::NodeId;

impl ConnectionTree {
    /// Appends `node` to the children of `container`.
    #[instrument(level = "debug", skip(self))]
    pub fn add_child(&mut self, container: NodeId, node: NodeId) -> DomainResult<()> {
        let index = self.container(container)?.children.len();
        self.insert_child(container, node, index)
    }

    /// Inserts `node` at `index`, clamped to the end of the sequence.
    #[instrument(level = "debug", skip(self))]
    pub fn add_child_at(&mut self, container: NodeId, node: NodeId, index: usize) -> DomainResult<()> {
        let len = self.container(container)?.children.len();
        self.insert_child(container, node, index.min(len))
    }

    /// Appends every node in order, one `Added` event each.
    ///
    /// All nodes are validated before the first one is added.
    #[instrument(level = "debug", skip(self, nodes), fields(count = nodes.len()))]
    pub fn add_child_range(&mut self, container: NodeId, nodes: &[NodeId]) -> DomainResult<()> {
        if let Some(&duplicate) = nodes.iter().duplicates().next() {
            return Err(DomainError::DuplicateNode(duplicate));
        }
        for &node in nodes {
            self.check_attachable(container, node)?;
        }
        for &node in nodes {
            self.add_child(container, node)?;
        }
        Ok(())
    }

    /// Removes `node` if it is a direct child. Returns whether anything changed.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_child(&mut self, container: NodeId, node: NodeId) -> DomainResult<bool> {
        self.node(node)?;
        let Some(index) = self.container(container)?.position(node) else {
            trace!("not a child, nothing to remove");
            return Ok(false);
        };

        let chain = self.forwarding_chain(container)?;
        let subtree = self.subtree(node)?;
        let unlinked = self.forwarding.detach(&chain, &subtree);

        self.container_mut(container)?.children.remove(index);
        self.node_mut(node)?.parent = None;
        debug!(%node, index, unlinked, "child removed");

        self.raise_collection_changed(container, CollectionChange::Removed { node, index });
        Ok(true)
    }

    /// Removes each listed node that is a direct child; others are skipped.
    /// Returns how many were removed.
    #[instrument(level = "debug", skip(self, nodes), fields(count = nodes.len()))]
    ///
    /// Every id is checked before the first removal.
    pub fn remove_child_range(&mut self, container: NodeId, nodes: &[NodeId]) -> DomainResult<usize> {
        self.container(container)?;
        for &node in nodes {
            self.node(node)?;
        }
        let mut removed = 0;
        for &node in nodes {
            if self.remove_child(container, node)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Removes `node` from whatever container holds it.
    pub fn detach(&mut self, node: NodeId) -> DomainResult<bool> {
        match self.parent(node)? {
            Some(parent) => self.remove_child(parent, node),
            None => Ok(false),
        }
    }

    /// Moves `node` to the end of `target`, detaching it first if needed.
    ///
    /// Validated up front so a rejected move leaves `node` where it was.
    #[instrument(level = "debug", skip(self))]
    pub fn reparent(&mut self, node: NodeId, target: NodeId) -> DomainResult<()> {
        self.container(target)?;
        self.check_no_cycle(target, node)?;
        if self.parent(node)? == Some(target) {
            return Ok(());
        }
        self.detach(node)?;
        self.add_child(target, node)
    }

    fn insert_child(&mut self, container: NodeId, node: NodeId, index: usize) -> DomainResult<()> {
        self.check_attachable(container, node)?;

        self.container_mut(container)?.children.insert(index, node);
        self.node_mut(node)?.parent = Some(container);

        let chain = self.forwarding_chain(container)?;
        let subtree = self.subtree(node)?;
        let linked = self.forwarding.attach(&chain, &subtree);
        debug!(%node, index, linked, "child added");

        self.raise_collection_changed(container, CollectionChange::Added { node, index });
        Ok(())
    }

    fn check_attachable(&self, container: NodeId, node: NodeId) -> DomainResult<()> {
        self.container(container)?;
        if node == self.root() {
            return Err(DomainError::RootImmovable(node));
        }
        if let Some(parent) = self.node(node)?.parent {
            return Err(DomainError::AlreadyParented { node, parent });
        }
        self.check_no_cycle(container, node)
    }

    fn check_no_cycle(&self, container: NodeId, node: NodeId) -> DomainResult<()> {
        if node == container || self.ancestors(container)?.contains(&node) {
            return Err(DomainError::WouldCreateCycle { node, container });
        }
        Ok(())
    }

    /// `container` and all of its ancestors: everyone forwarding its subtree.
    fn forwarding_chain(&self, container: NodeId) -> DomainResult<Vec<NodeId>> {
        Ok(iter::once(container).chain(self.ancestors(container)?).collect())
    }
}
