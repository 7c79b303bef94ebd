//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::node::NodeId;

/// Domain errors represent misuse of the tree that would otherwise corrupt it.
///
/// Caller mistakes with a well-defined "nothing to do" outcome (removing a
/// non-child, promoting the first child) are not errors and never show up here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node not found (stale or discarded): {0}")]
    NodeNotFound(NodeId),

    #[error("node belongs to a different tree: {0}")]
    ForeignNode(NodeId),

    #[error("node is not a container: {0}")]
    NotAContainer(NodeId),

    #[error("{node} is not a direct child of {container}")]
    NotAChild { node: NodeId, container: NodeId },

    #[error("{node} already has parent {parent}, remove it first")]
    AlreadyParented { node: NodeId, parent: NodeId },

    #[error("adding {node} to {container} would create a cycle")]
    WouldCreateCycle { node: NodeId, container: NodeId },

    #[error("node listed more than once: {0}")]
    DuplicateNode(NodeId),

    #[error("node is still attached to a container: {0}")]
    StillAttached(NodeId),

    #[error("the root container cannot be attached or discarded: {0}")]
    RootImmovable(NodeId),

    #[error("tree invariant violated: {0}")]
    InvariantViolation(String),
}

/// Result type for tree operations.
pub type DomainResult<T> = Result<T, DomainError>;
