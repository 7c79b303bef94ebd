//! Domain layer: the connection tree and its notification bus
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod bubbling;
pub mod error;
pub mod events;
pub mod membership;
pub mod node;
pub mod ordering;
pub mod properties;

pub use arena::{ConnectionTree, PostOrderIterator, TreeIterator};
pub use error::{DomainError, DomainResult};
pub use events::{CollectionChange, EventKind, SubscriptionId, TreeEvent};
pub use node::{ConnectionProperties, ContainerData, NodeId, NodeKind, Property, Protocol, TreeNode};
pub use ordering::SortOrder;
