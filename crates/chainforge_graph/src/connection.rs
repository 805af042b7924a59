// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (edge) definitions between node ports.

use crate::node::NodeId;
use crate::port::PortName;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// A connection from one node's output port to another node's input port.
///
/// Endpoints are keyed by port name rather than a per-port id: port sets are
/// rebuilt wholesale whenever a node's recipe changes, and names are the
/// stable handle across rebuilds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Source node ID
    pub from_node: NodeId,
    /// Source output port name
    pub from_port: PortName,
    /// Target node ID
    pub to_node: NodeId,
    /// Target input port name
    pub to_port: PortName,
}

impl Connection {
    /// Create a new connection
    pub fn new(
        from_node: NodeId,
        from_port: PortName,
        to_node: NodeId,
        to_port: PortName,
    ) -> Self {
        Self {
            id: ConnectionId::new(),
            from_node,
            from_port,
            to_node,
            to_port,
        }
    }

    /// Check if this connection involves a specific node
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.from_node == node_id || self.to_node == node_id
    }
}
