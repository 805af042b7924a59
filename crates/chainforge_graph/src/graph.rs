// SPDX-License-Identifier: MIT OR Apache-2.0
//! Owning graph: node and connection stores, resolution and removal passes.

use crate::connection::{Connection, ConnectionId};
use crate::node::{Node, NodeId};
use crate::port::{PortDirection, PortError, PortName};
use crate::recipe::RecipeCatalog;
use indexmap::IndexMap;

/// A production graph owning nodes and the connections between them.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: IndexMap<NodeId, Node>,
    connections: IndexMap<ConnectionId, Connection>,
}

/// A connection detached because its port vanished in a recipe rebuild.
///
/// The graph has already dropped the connection; the host decides whether
/// to discard it for good or re-attach it to a compatible port.
#[derive(Debug, Clone, PartialEq)]
pub struct OrphanEvent {
    /// Node whose port set changed.
    pub node: NodeId,
    /// Name of the port that no longer exists.
    pub port: PortName,
    /// Side of the node the port was on.
    pub direction: PortDirection,
    /// The detached connection.
    pub connection: Connection,
}

/// Error when creating a connection
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// Node not found
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// Port missing, occupied, or otherwise unusable
    #[error(transparent)]
    Port(#[from] PortError),

    /// Self-loop not allowed
    #[error("cannot connect a node to itself")]
    SelfLoop,
}

impl Graph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Get all nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get a connection by ID
    pub fn connection(&self, connection_id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&connection_id)
    }

    /// Get all connections
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Get connections involving a node
    pub fn connections_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections
            .values()
            .filter(move |c| c.involves_node(node_id))
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Connect an output port to an input port.
    ///
    /// Output ports take a single connection; input ports take any number.
    pub fn connect(
        &mut self,
        from_node: NodeId,
        from_port: &PortName,
        to_node: NodeId,
        to_port: &PortName,
    ) -> Result<ConnectionId, ConnectError> {
        if from_node == to_node {
            return Err(ConnectError::SelfLoop);
        }

        let source = self
            .nodes
            .get(&from_node)
            .ok_or(ConnectError::NodeNotFound(from_node))?;
        let target = self
            .nodes
            .get(&to_node)
            .ok_or(ConnectError::NodeNotFound(to_node))?;

        if !source.ports().has_output(from_port) {
            return Err(PortError::UnknownPort(from_port.clone(), PortDirection::Output).into());
        }
        if !target.ports().has_input(to_port) {
            return Err(PortError::UnknownPort(to_port.clone(), PortDirection::Input).into());
        }
        if source.ports().output_endpoint(from_port).is_some() {
            return Err(PortError::OutputOccupied(from_port.clone()).into());
        }

        let connection = Connection::new(from_node, from_port.clone(), to_node, to_port.clone());
        let id = connection.id;

        // Both ports exist and the output slot is free at this point.
        if let Some(source) = self.nodes.get_mut(&from_node) {
            source.ports_mut().set_output(from_port, id)?;
        }
        if let Some(target) = self.nodes.get_mut(&to_node) {
            target.ports_mut().attach_input(to_port, id)?;
        }

        self.connections.insert(id, connection);
        Ok(id)
    }

    /// Remove a connection, detaching it from both endpoint registries.
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Option<Connection> {
        let connection = self.connections.shift_remove(&connection_id)?;
        if let Some(source) = self.nodes.get_mut(&connection.from_node) {
            source.ports_mut().detach(connection_id);
        }
        if let Some(target) = self.nodes.get_mut(&connection.to_node) {
            target.ports_mut().detach(connection_id);
        }
        Some(connection)
    }

    /// Resolve every node against the catalog and drop orphaned connections.
    ///
    /// Unknown hashes leave their nodes in the unresolved state without
    /// interrupting the pass; connections whose ports vanished are removed
    /// from the graph and reported. Typically run once after loading a
    /// saved graph and again after a catalog reload.
    pub fn resolve_all(&mut self, catalog: &impl RecipeCatalog) -> Vec<OrphanEvent> {
        let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        let mut events = Vec::new();

        for node_id in ids {
            let Some(node) = self.nodes.get_mut(&node_id) else {
                continue;
            };
            for orphan in node.resolve(catalog) {
                for endpoint in orphan.endpoints {
                    let Some(connection) = self.connections.shift_remove(&endpoint) else {
                        // Already dropped via the connection's other end.
                        continue;
                    };
                    let peer = if connection.from_node == node_id {
                        connection.to_node
                    } else {
                        connection.from_node
                    };
                    if let Some(peer) = self.nodes.get_mut(&peer) {
                        peer.ports_mut().detach(endpoint);
                    }
                    tracing::debug!(node = %node_id, port = %orphan.port, "connection orphaned");
                    events.push(OrphanEvent {
                        node: node_id,
                        port: orphan.port.clone(),
                        direction: orphan.direction,
                        connection,
                    });
                }
            }
        }

        events
    }

    /// Remove every node marked for removal, along with its connections.
    ///
    /// Second phase of removal: nodes mark themselves via
    /// [`Node::request_removal`] and stay addressable until this sweep.
    /// Returns the removed nodes.
    pub fn sweep(&mut self) -> Vec<Node> {
        let marked: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|node| node.pending_removal())
            .map(|node| node.id)
            .collect();

        let mut removed = Vec::new();
        for node_id in marked {
            let stale: Vec<ConnectionId> = self
                .connections
                .values()
                .filter(|c| c.involves_node(node_id))
                .map(|c| c.id)
                .collect();
            for connection_id in stale {
                self.disconnect(connection_id);
            }
            if let Some(node) = self.nodes.shift_remove(&node_id) {
                removed.push(node);
            }
        }

        if !removed.is_empty() {
            tracing::debug!(count = removed.len(), "swept removed nodes");
        }
        removed
    }
}
