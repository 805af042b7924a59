// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node graph core for the chainforge production-chain planner.
//!
//! This crate provides the document model behind the planner canvas:
//! - Production nodes bound to recipes by stable hash
//! - Voltage tier classification with derived EU/t throughput
//! - Named input/output ports rebuilt from the bound recipe
//! - Flat per-node records for persistence round-trips
//!
//! ## Architecture
//!
//! The model is deliberately presentation-free: rendering, theming and the
//! recipe catalog's storage live elsewhere. Nodes reference recipes only by
//! hash and resolve them through the [`RecipeCatalog`] trait; the port
//! registry is rebuilt wholesale on every recipe change so it can never
//! drift from the bound recipe. All mutation is single-threaded by
//! contract; the core takes no locks and performs no I/O.

pub mod tier;
pub mod recipe;
pub mod port;
pub mod connection;
pub mod node;
pub mod record;
pub mod graph;

pub use tier::Tier;
pub use recipe::{InMemoryCatalog, Pile, Recipe, RecipeCatalog, UNBOUND_HASH};
pub use port::{
    OrphanedConnection, PortDirection, PortError, PortLayout, PortName, PortRegistry, NODE_WIDTH,
};
pub use connection::{Connection, ConnectionId};
pub use node::{Node, NodeId, Resolution};
pub use record::{DecodeError, NodeRecord};
pub use graph::{ConnectError, Graph, OrphanEvent};
