use std::collections::HashSet;
use std::fmt;

use generational_arena::Arena;
use tracing::{debug, instrument, trace};
use uuid::Uuid;

use crate::domain::bubbling::ForwardingTable;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::events::{
    CollectionChange, EventKind, Listener, ListenerRegistry, SubscriptionId, TreeEvent,
};
use crate::domain::node::{ConnectionProperties, ContainerData, NodeId, Property, TreeNode};

/// Arena-based connection tree.
///
/// Owns every node it creates, attached or not. Exactly one root container
/// exists for the lifetime of the tree; all other nodes start unparented and
/// gain a parent only through the membership operations.
///
/// Listeners get `&mut ConnectionTree`, which makes the tree `!Send`: it has a
/// single logical owner by construction.
pub struct ConnectionTree {
    id: Uuid,
    arena: Arena<TreeNode>,
    root: NodeId,
    pub(crate) forwarding: ForwardingTable,
    pub(crate) listeners: ListenerRegistry,
}

impl fmt::Debug for ConnectionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionTree")
            .field("id", &self.id)
            .field("root", &self.root)
            .field("nodes", &self.arena.len())
            .field("forwarding_links", &self.forwarding.link_count())
            .field("listeners", &self.listeners)
            .finish()
    }
}

impl ConnectionTree {
    pub fn new(root_name: impl Into<String>) -> Self {
        let id = Uuid::new_v4();
        let mut arena = Arena::new();
        let index = arena.insert(TreeNode::container(ConnectionProperties::named(root_name)));
        Self {
            id,
            arena,
            root: NodeId::new(id, index),
            forwarding: ForwardingTable::default(),
            listeners: ListenerRegistry::default(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, attached or not, root included.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn create_connection(&mut self, name: impl Into<String>) -> NodeId {
        self.create_connection_with(ConnectionProperties::named(name))
    }

    #[instrument(level = "trace", skip(self))]
    pub fn create_connection_with(&mut self, properties: ConnectionProperties) -> NodeId {
        NodeId::new(self.id, self.arena.insert(TreeNode::connection(properties)))
    }

    pub fn create_container(&mut self, name: impl Into<String>) -> NodeId {
        self.create_container_with(ConnectionProperties::named(name))
    }

    #[instrument(level = "trace", skip(self))]
    pub fn create_container_with(&mut self, properties: ConnectionProperties) -> NodeId {
        NodeId::new(self.id, self.arena.insert(TreeNode::container(properties)))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.tree == self.id && self.arena.contains(id.index)
    }

    pub fn node(&self, id: NodeId) -> DomainResult<&TreeNode> {
        if id.tree != self.id {
            return Err(DomainError::ForeignNode(id));
        }
        self.arena.get(id.index).ok_or(DomainError::NodeNotFound(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> DomainResult<&mut TreeNode> {
        if id.tree != self.id {
            return Err(DomainError::ForeignNode(id));
        }
        self.arena.get_mut(id.index).ok_or(DomainError::NodeNotFound(id))
    }

    pub fn container(&self, id: NodeId) -> DomainResult<&ContainerData> {
        self.node(id)?
            .as_container()
            .ok_or(DomainError::NotAContainer(id))
    }

    pub(crate) fn container_mut(&mut self, id: NodeId) -> DomainResult<&mut ContainerData> {
        self.node_mut(id)?
            .as_container_mut()
            .ok_or(DomainError::NotAContainer(id))
    }

    pub fn parent(&self, id: NodeId) -> DomainResult<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    pub(crate) fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).ok().and_then(TreeNode::parent)
    }

    pub fn children(&self, container: NodeId) -> DomainResult<&[NodeId]> {
        Ok(self.container(container)?.children())
    }

    pub fn child_index(&self, container: NodeId, node: NodeId) -> DomainResult<Option<usize>> {
        self.node(node)?;
        Ok(self.container(container)?.position(node))
    }

    pub fn has_children(&self, container: NodeId) -> DomainResult<bool> {
        Ok(!self.container(container)?.children.is_empty())
    }

    pub fn is_container(&self, id: NodeId) -> DomainResult<bool> {
        Ok(self.node(id)?.is_container())
    }

    /// Ancestors of `id`, nearest first, ending at the topmost container.
    pub fn ancestors(&self, id: NodeId) -> DomainResult<Vec<NodeId>> {
        let mut chain = Vec::new();
        let mut cursor = self.node(id)?.parent;
        while let Some(ancestor) = cursor {
            chain.push(ancestor);
            cursor = self.parent_of(ancestor);
        }
        Ok(chain)
    }

    /// Every node below `id` in pre-order, `id` itself excluded.
    pub fn descendants(&self, id: NodeId) -> DomainResult<Vec<NodeId>> {
        let mut nodes = self.subtree(id)?;
        nodes.remove(0);
        Ok(nodes)
    }

    /// `id` followed by every node below it, pre-order.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn subtree(&self, id: NodeId) -> DomainResult<Vec<NodeId>> {
        self.node(id)?;
        let mut nodes = Vec::new();
        self.collect_subtree(id, &mut nodes);
        Ok(nodes)
    }

    fn collect_subtree(&self, id: NodeId, nodes: &mut Vec<NodeId>) {
        if let Ok(node) = self.node(id) {
            nodes.push(id);
            for &child in node.children() {
                self.collect_subtree(child, nodes);
            }
        }
    }

    /// Names from the topmost container down to `id`.
    pub fn path_of(&self, id: NodeId) -> DomainResult<Vec<String>> {
        let mut path: Vec<String> = self
            .ancestors(id)?
            .into_iter()
            .rev()
            .filter_map(|a| self.node(a).ok().map(|n| n.name().to_string()))
            .collect();
        path.push(self.node(id)?.name().to_string());
        Ok(path)
    }

    /// Nodes under the root whose name matches exactly, pre-order.
    pub fn find_by_name(&self, name: &str) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| node.name() == name)
            .map(|(id, _)| id)
            .collect()
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self, self.root)
    }

    pub fn iter_from(&self, start: NodeId) -> TreeIterator<'_> {
        TreeIterator::new(self, start)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self, self.root)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.calculate_depth(self.root)
    }

    fn calculate_depth(&self, id: NodeId) -> usize {
        if let Ok(node) = self.node(id) {
            1 + node
                .children()
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Connections reachable from the root, in display order.
    pub fn leaf_connections(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| !node.is_container())
            .map(|(id, _)| id)
            .collect()
    }

    /// Removes an unattached node and its whole subtree from the tree.
    ///
    /// Their listeners and forwarding links go with them; the ids become stale.
    #[instrument(level = "debug", skip(self))]
    pub fn discard(&mut self, id: NodeId) -> DomainResult<usize> {
        if id == self.root {
            return Err(DomainError::RootImmovable(id));
        }
        if self.node(id)?.parent.is_some() {
            return Err(DomainError::StillAttached(id));
        }
        let nodes = self.subtree(id)?;
        for &node in &nodes {
            let dropped = self.listeners.forget(node);
            self.forwarding.forget(node);
            self.arena.remove(node.index);
            trace!(%node, dropped, "discarded");
        }
        debug!(count = nodes.len(), "subtree discarded");
        Ok(nodes.len())
    }

    // ---- event surface ----

    pub fn on_collection_changed<F>(&mut self, container: NodeId, listener: F) -> DomainResult<SubscriptionId>
    where
        F: Fn(&mut ConnectionTree, &TreeEvent) + 'static,
    {
        self.container(container)?;
        let listener: Listener = std::rc::Rc::new(listener);
        Ok(self
            .listeners
            .subscribe(container, EventKind::CollectionChanged, listener))
    }

    pub fn on_property_changed<F>(&mut self, node: NodeId, listener: F) -> DomainResult<SubscriptionId>
    where
        F: Fn(&mut ConnectionTree, &TreeEvent) + 'static,
    {
        self.node(node)?;
        let listener: Listener = std::rc::Rc::new(listener);
        Ok(self
            .listeners
            .subscribe(node, EventKind::PropertyChanged, listener))
    }

    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        self.listeners.unsubscribe(subscription)
    }

    /// Delivers `event` to the listeners of `node`.
    ///
    /// Listener set is fixed when delivery starts; listeners unsubscribed
    /// meanwhile are skipped. A listener that changes the tree may be called
    /// again for the nested event before it returns.
    fn notify(&mut self, node: NodeId, event: &TreeEvent) {
        for (subscription, listener) in self.listeners.snapshot(node, event.kind()) {
            if !self.listeners.is_active(subscription) {
                trace!(%subscription, "unsubscribed during dispatch, skipped");
                continue;
            }
            listener(self, event);
        }
    }

    pub(crate) fn raise_collection_changed(&mut self, container: NodeId, change: CollectionChange) {
        trace!(%container, ?change, "collection changed");
        self.notify(container, &TreeEvent::CollectionChanged { container, change });
    }

    /// Raises on `source`, then on each forwarding ancestor, nearest first.
    ///
    /// Parent chain and forwarding table are re-read after every delivery,
    /// so a listener that detaches `source` ends the bubbling.
    pub(crate) fn raise_property_changed(&mut self, source: NodeId, property: Property) {
        trace!(%source, %property, "property changed");
        self.notify(
            source,
            &TreeEvent::PropertyChanged {
                sender: source,
                source,
                property,
            },
        );
        let mut cursor = self.parent_of(source);
        while let Some(ancestor) = cursor {
            if self.forwarding.forwards(ancestor, source) {
                self.notify(
                    ancestor,
                    &TreeEvent::PropertyChanged {
                        sender: ancestor,
                        source,
                        property,
                    },
                );
            }
            cursor = self.parent_of(ancestor);
        }
    }

    /// Audits parent links, child sequences and forwarding sets.
    #[instrument(level = "debug", skip(self))]
    pub fn verify(&self) -> DomainResult<()> {
        let violation = |msg: String| Err(DomainError::InvariantViolation(msg));

        if let Some(parent) = self.node(self.root)?.parent {
            return violation(format!("root has parent {}", parent));
        }
        for (index, node) in self.arena.iter() {
            let id = NodeId::new(self.id, index);
            if let Some(parent) = node.parent {
                let Ok(data) = self.container(parent) else {
                    return violation(format!("{} points at missing or non-container parent {}", id, parent));
                };
                let occurrences = data.children.iter().filter(|&&c| c == id).count();
                if occurrences != 1 {
                    return violation(format!("{} appears {} times under its parent {}", id, occurrences, parent));
                }
            }
            if let Some(data) = node.as_container() {
                let mut seen = HashSet::new();
                for &child in &data.children {
                    if !seen.insert(child) {
                        return violation(format!("{} listed twice under {}", child, id));
                    }
                    match self.node(child) {
                        Ok(c) if c.parent == Some(id) => {}
                        Ok(c) => {
                            return violation(format!("{} under {} has parent {:?}", child, id, c.parent));
                        }
                        Err(_) => return violation(format!("{} lists missing child {}", id, child)),
                    }
                }
                let expected: HashSet<NodeId> = self.descendants(id)?.into_iter().collect();
                if self.forwarding.sources(id) != expected {
                    return violation(format!("forwarding set of {} differs from its descendants", id));
                }
            }
        }
        Ok(())
    }
}

/// Pre-order traversal, children in display order.
pub struct TreeIterator<'a> {
    tree: &'a ConnectionTree,
    stack: Vec<NodeId>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a ConnectionTree, start: NodeId) -> Self {
        let mut stack = Vec::new();
        if tree.contains(start) {
            stack.push(start);
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Ok(node) = self.tree.node(current) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children().iter().rev() {
                    self.stack.push(child);
                }
                return Some((current, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    tree: &'a ConnectionTree,
    stack: Vec<(NodeId, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a ConnectionTree, start: NodeId) -> Self {
        let mut stack = Vec::new();
        if tree.contains(start) {
            stack.push((start, false));
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if let Ok(node) = self.tree.node(current) {
                if !visited {
                    self.stack.push((current, true));
                    for &child in node.children().iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current, node));
                }
            }
        }
        None
    }
}
