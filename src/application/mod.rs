//! Application layer: collaborators built on top of the tree
//!
//! Nothing here reaches into the tree's internals; it only calls public tree
//! operations and reads node properties.

pub mod error;
pub mod error_ext;
pub mod layout;
pub mod summary;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use layout::{ConnectionEntry, ContainerEntry, Layout, LayoutEntry};
pub use summary::TreeSummary;
