//! Scalar property setters
//!
//! Every setter assigns the value and raises property-changed on the node,
//! which then bubbles through every forwarding ancestor.

use tracing::instrument;

use crate::domain::arena::ConnectionTree;
use crate::domain::error::DomainResult;
use crate::domain::node::{ConnectionProperties, NodeId, Property, Protocol};

impl ConnectionTree {
    #[instrument(level = "debug", skip(self, name))]
    pub fn set_name(&mut self, node: NodeId, name: impl Into<String>) -> DomainResult<()> {
        let name = name.into();
        self.update_property(node, Property::Name, |p| p.name = name)
    }

    pub fn set_description(&mut self, node: NodeId, description: impl Into<String>) -> DomainResult<()> {
        let description = description.into();
        self.update_property(node, Property::Description, |p| p.description = description)
    }

    pub fn set_hostname(&mut self, node: NodeId, hostname: impl Into<String>) -> DomainResult<()> {
        let hostname = hostname.into();
        self.update_property(node, Property::Hostname, |p| p.hostname = hostname)
    }

    pub fn set_port(&mut self, node: NodeId, port: u16) -> DomainResult<()> {
        self.update_property(node, Property::Port, |p| p.port = port)
    }

    pub fn set_protocol(&mut self, node: NodeId, protocol: Protocol) -> DomainResult<()> {
        self.update_property(node, Property::Protocol, |p| p.protocol = protocol)
    }

    pub fn set_username(&mut self, node: NodeId, username: impl Into<String>) -> DomainResult<()> {
        let username = username.into();
        self.update_property(node, Property::Username, |p| p.username = username)
    }

    /// Container-only display state.
    #[instrument(level = "debug", skip(self))]
    pub fn set_expanded(&mut self, container: NodeId, expanded: bool) -> DomainResult<()> {
        self.container_mut(container)?.expanded = expanded;
        self.raise_property_changed(container, Property::Expanded);
        Ok(())
    }

    fn update_property<F>(&mut self, node: NodeId, property: Property, apply: F) -> DomainResult<()>
    where
        F: FnOnce(&mut ConnectionProperties),
    {
        apply(&mut self.node_mut(node)?.properties);
        self.raise_property_changed(node, property);
        Ok(())
    }
}
