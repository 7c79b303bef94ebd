//! Seed layouts: build a connection tree from a TOML description
//!
//! The layout is an input format only. It builds the tree exclusively through
//! the public tree operations, the same way any other collaborator would.
//!
//! ```toml
//! name = "Connections"
//!
//! [[children]]
//! kind = "container"
//! name = "Production"
//! expanded = true
//!
//! [[children.children]]
//! kind = "connection"
//! name = "web01"
//! hostname = "10.0.0.11"
//! protocol = "ssh"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{ConnectionProperties, ConnectionTree, DomainResult, NodeId, Protocol};

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
pub struct Layout {
    /// Root container name; falls back to `Settings::root_name`
    pub name: Option<String>,
    #[serde(default)]
    pub expanded: bool,
    #[serde(default)]
    pub children: Vec<LayoutEntry>,
    #[serde(skip)]
    pub origin: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LayoutEntry {
    Container(ContainerEntry),
    Connection(ConnectionEntry),
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ContainerEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub expanded: bool,
    #[serde(default)]
    pub children: Vec<LayoutEntry>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ConnectionEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub protocol: Protocol,
    /// Defaults to the protocol's well-known port
    pub port: Option<u16>,
    #[serde(default)]
    pub username: String,
}

impl ConnectionEntry {
    fn properties(&self) -> ConnectionProperties {
        ConnectionProperties {
            name: self.name.clone(),
            description: self.description.clone(),
            hostname: self.hostname.clone(),
            port: self.port.unwrap_or_else(|| self.protocol.default_port()),
            protocol: self.protocol,
            username: self.username.clone(),
        }
    }
}

impl Layout {
    /// Parse layout content; `origin` is only used for error messages.
    pub fn parse(content: &str, origin: &Path) -> ApplicationResult<Self> {
        let mut layout: Layout = toml::from_str(content).map_err(|e| ApplicationError::Layout {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        layout.origin = Some(origin.to_path_buf());
        Ok(layout)
    }

    #[instrument(level = "debug")]
    pub fn load(path: &Path) -> ApplicationResult<Self> {
        let content = std::fs::read_to_string(path).with_path_context("read layout", path)?;
        Self::parse(&content, path)
    }

    /// Build a fresh tree from this layout.
    #[instrument(level = "debug", skip(self, settings))]
    pub fn build(&self, settings: &Settings) -> ApplicationResult<ConnectionTree> {
        let root_name = self.name.clone().unwrap_or_else(|| settings.root_name.clone());
        let mut tree = ConnectionTree::new(root_name);
        let root = tree.root();
        tree.set_expanded(root, self.expanded)?;
        for entry in &self.children {
            attach(&mut tree, root, entry)?;
        }
        debug!(nodes = tree.len(), depth = tree.depth(), "layout built");
        Ok(tree)
    }
}

fn attach(tree: &mut ConnectionTree, parent: NodeId, entry: &LayoutEntry) -> DomainResult<()> {
    match entry {
        LayoutEntry::Connection(conn) => {
            let id = tree.create_connection_with(conn.properties());
            tree.add_child(parent, id)
        }
        LayoutEntry::Container(group) => {
            let id = tree.create_container_with(ConnectionProperties {
                description: group.description.clone(),
                ..ConnectionProperties::named(group.name.clone())
            });
            tree.set_expanded(id, group.expanded)?;
            tree.add_child(parent, id)?;
            for child in &group.children {
                attach(tree, id, child)?;
            }
            Ok(())
        }
    }
}
