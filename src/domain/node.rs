//! Node identity and payload: scalar properties, parent link, container data

use std::fmt;

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies a node inside one particular [`ConnectionTree`](crate::domain::ConnectionTree).
///
/// Carries the tree's identity next to the arena index, so an id handed to
/// the wrong tree is rejected instead of aliasing an unrelated node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) tree: Uuid,
    pub(crate) index: Index,
}

impl NodeId {
    pub(crate) fn new(tree: Uuid, index: Index) -> Self {
        Self { tree, index }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.index.into_raw_parts();
        write!(f, "node#{}.{}", slot, generation)
    }
}

/// Remote access protocol of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Rdp,
    Ssh,
    Telnet,
    Vnc,
    Http,
    Https,
    Raw,
}

impl Protocol {
    pub fn default_port(self) -> u16 {
        match self {
            Protocol::Rdp => 3389,
            Protocol::Ssh => 22,
            Protocol::Telnet => 23,
            Protocol::Vnc => 5900,
            Protocol::Http => 80,
            Protocol::Https => 443,
            Protocol::Raw => 23,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Protocol::Rdp => "rdp",
            Protocol::Ssh => "ssh",
            Protocol::Telnet => "telnet",
            Protocol::Vnc => "vnc",
            Protocol::Http => "http",
            Protocol::Https => "https",
            Protocol::Raw => "raw",
        };
        f.write_str(s)
    }
}

/// Names a scalar property in a property-changed notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Name,
    Description,
    Hostname,
    Port,
    Protocol,
    Username,
    Expanded,
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Property::Name => "name",
            Property::Description => "description",
            Property::Hostname => "hostname",
            Property::Port => "port",
            Property::Protocol => "protocol",
            Property::Username => "username",
            Property::Expanded => "expanded",
        };
        f.write_str(s)
    }
}

/// Scalar properties shared by connections and containers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionProperties {
    pub name: String,
    pub description: String,
    pub hostname: String,
    pub port: u16,
    pub protocol: Protocol,
    pub username: String,
}

impl ConnectionProperties {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for ConnectionProperties {
    fn default() -> Self {
        let protocol = Protocol::default();
        Self {
            name: String::new(),
            description: String::new(),
            hostname: String::new(),
            port: protocol.default_port(),
            protocol,
            username: String::new(),
        }
    }
}

/// Child sequence of a container. Order is display order.
#[derive(Debug, Clone, Default)]
pub struct ContainerData {
    pub(crate) children: Vec<NodeId>,
    pub(crate) expanded: bool,
}

impl ContainerData {
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub(crate) fn position(&self, node: NodeId) -> Option<usize> {
        self.children.iter().position(|&c| c == node)
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Connection,
    Container(ContainerData),
}

/// Tree node stored in the arena.
#[derive(Debug)]
pub struct TreeNode {
    pub(crate) properties: ConnectionProperties,
    /// Owning container; never an ownership edge
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind,
}

impl TreeNode {
    pub(crate) fn connection(properties: ConnectionProperties) -> Self {
        Self {
            properties,
            parent: None,
            kind: NodeKind::Connection,
        }
    }

    pub(crate) fn container(properties: ConnectionProperties) -> Self {
        Self {
            properties,
            parent: None,
            kind: NodeKind::Container(ContainerData::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.properties.name
    }

    pub fn properties(&self) -> &ConnectionProperties {
        &self.properties
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Container(_))
    }

    pub fn as_container(&self) -> Option<&ContainerData> {
        match &self.kind {
            NodeKind::Container(data) => Some(data),
            NodeKind::Connection => None,
        }
    }

    pub(crate) fn as_container_mut(&mut self) -> Option<&mut ContainerData> {
        match &mut self.kind {
            NodeKind::Container(data) => Some(data),
            NodeKind::Connection => None,
        }
    }

    /// Direct children; empty for connections.
    pub fn children(&self) -> &[NodeId] {
        self.as_container().map(|c| c.children()).unwrap_or(&[])
    }
}
