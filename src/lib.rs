//! Hierarchical connection tree
//!
//! Containers own ordered children; every node keeps a non-owning link to its
//! parent. Property changes bubble from any node up through each ancestor, and
//! the forwarding bookkeeping is rewired on every structural change.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod tree_traits;
pub mod util;

pub use domain::{ConnectionTree, DomainError, DomainResult, NodeId};
