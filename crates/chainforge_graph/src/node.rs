// SPDX-License-Identifier: MIT OR Apache-2.0
//! Production node: identity, position, tier override, recipe binding.

use crate::port::{OrphanedConnection, PortDirection, PortError, PortName, PortRegistry};
use crate::recipe::{RecipeCatalog, UNBOUND_HASH};
use crate::tier::Tier;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Outcome of resolving the node's recipe hash against a catalog.
///
/// `Unresolved` is a normal state, not an error: the stored hash may simply
/// be unknown to the catalog version currently loaded. The presentation
/// layer flags it visually and the rest of the graph stays usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// No recipe bound (hash is the unbound sentinel).
    Unbound,
    /// The stored hash is unknown to the current catalog.
    Unresolved {
        /// Hash that failed to resolve.
        hash: i64,
    },
    /// The hash resolved against the catalog.
    Resolved {
        /// Hash of the resolved recipe.
        hash: i64,
        /// Tier implied by the recipe's power draw, if classifiable.
        tier: Option<Tier>,
    },
}

/// A placed production unit bound to a recipe.
///
/// The node stores a recipe *hash*, never the recipe itself; the binding is
/// resolved on demand via [`resolve`](Node::resolve), which also rebuilds
/// the port registry to match the recipe's piles. The id is assigned once
/// and survives persistence round-trips unchanged.
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique instance ID, stable across the node's whole lifetime.
    pub id: NodeId,
    position: [f32; 2],
    tier_override: Option<Tier>,
    recipe_hash: i64,
    resolution: Resolution,
    ports: PortRegistry,
    pending_removal: bool,
    needs_layout: bool,
}

impl Node {
    /// Create a new node with a fresh id.
    ///
    /// The node starts unresolved; call [`resolve`](Node::resolve) once a
    /// catalog is available to bind ports.
    pub fn new(position: [f32; 2], recipe_hash: i64, tier_override: Option<Tier>) -> Self {
        Self::with_id(NodeId::new(), position, recipe_hash, tier_override)
    }

    /// Reconstruct a node with an explicit id.
    ///
    /// Used when loading persisted records; new nodes go through
    /// [`Node::new`] so ids are never reused.
    pub fn with_id(
        id: NodeId,
        position: [f32; 2],
        recipe_hash: i64,
        tier_override: Option<Tier>,
    ) -> Self {
        let resolution = if recipe_hash == UNBOUND_HASH {
            Resolution::Unbound
        } else {
            Resolution::Unresolved { hash: recipe_hash }
        };
        Self {
            id,
            position,
            tier_override,
            recipe_hash,
            resolution,
            ports: PortRegistry::new(),
            pending_removal: false,
            needs_layout: true,
        }
    }

    /// Canvas position of the node origin.
    pub fn position(&self) -> [f32; 2] {
        self.position
    }

    /// Move the node.
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position = [x, y];
    }

    /// The tier override, if any.
    pub fn tier_override(&self) -> Option<Tier> {
        self.tier_override
    }

    /// Set or clear the tier override.
    ///
    /// Purely parametric: the recipe binding is untouched, only derived
    /// throughput and display change.
    pub fn set_override(&mut self, tier: Option<Tier>) {
        self.tier_override = tier;
        self.needs_layout = true;
    }

    /// The persisted recipe hash; [`UNBOUND_HASH`] when no recipe is bound.
    pub fn recipe_hash(&self) -> i64 {
        self.recipe_hash
    }

    /// Current resolution state of the recipe binding.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Whether the stored hash failed to resolve against the last catalog.
    pub fn is_unresolved(&self) -> bool {
        matches!(self.resolution, Resolution::Unresolved { .. })
    }

    /// Tier used for display and throughput math.
    ///
    /// The override wins when set; otherwise the tier implied by the
    /// resolved recipe's power draw, if any.
    pub fn effective_tier(&self) -> Option<Tier> {
        self.tier_override.or(match self.resolution {
            Resolution::Resolved { tier, .. } => tier,
            _ => None,
        })
    }

    /// Bind the node to a different recipe hash.
    ///
    /// The id is untouched. Ports are rebuilt by the next
    /// [`resolve`](Node::resolve); endpoints on ports whose names persist
    /// across the rebind survive it.
    pub fn rebind(&mut self, recipe_hash: i64) {
        self.recipe_hash = recipe_hash;
        self.resolution = if recipe_hash == UNBOUND_HASH {
            Resolution::Unbound
        } else {
            Resolution::Unresolved { hash: recipe_hash }
        };
        self.needs_layout = true;
    }

    /// Resolve the stored hash against a catalog and rebuild ports.
    ///
    /// Idempotent for a fixed catalog state. Returns connections orphaned
    /// by ports disappearing from the registry; an unknown hash is recorded
    /// as [`Resolution::Unresolved`], never raised as an error.
    pub fn resolve(&mut self, catalog: &impl RecipeCatalog) -> Vec<OrphanedConnection> {
        self.needs_layout = true;

        if self.recipe_hash == UNBOUND_HASH {
            self.resolution = Resolution::Unbound;
            return self.ports.clear();
        }

        let Some(recipe) = catalog.find_by_hash(self.recipe_hash) else {
            tracing::warn!(node = %self.id, hash = self.recipe_hash, "recipe hash not in catalog");
            self.resolution = Resolution::Unresolved {
                hash: self.recipe_hash,
            };
            return self.ports.clear();
        };

        let port_names = |piles: &[crate::recipe::Pile]| -> Vec<PortName> {
            piles
                .iter()
                .filter_map(|pile| match PortName::new(pile.material.clone()) {
                    Ok(name) => Some(name),
                    Err(_) => {
                        tracing::warn!(hash = recipe.hash, "skipping pile with blank material name");
                        None
                    }
                })
                .collect()
        };
        let inputs = port_names(&recipe.inputs);
        let outputs = port_names(&recipe.outputs);

        self.resolution = Resolution::Resolved {
            hash: recipe.hash,
            tier: Tier::from_throughput(recipe.eu_per_tick),
        };
        tracing::debug!(node = %self.id, hash = recipe.hash, "recipe resolved");
        self.ports.rebuild(inputs, outputs)
    }

    /// The node's port registry.
    pub fn ports(&self) -> &PortRegistry {
        &self.ports
    }

    pub(crate) fn ports_mut(&mut self) -> &mut PortRegistry {
        &mut self.ports
    }

    /// Store layout for a port, injected by the presentation layout pass.
    pub fn register_port_layout(
        &mut self,
        name: &PortName,
        direction: PortDirection,
        y_offset: f32,
        height: f32,
    ) -> Result<(), PortError> {
        self.ports
            .register_layout(name, direction, y_offset, height)
    }

    /// Canvas position where connections attach to one of this node's ports.
    pub fn port_anchor(
        &self,
        name: &PortName,
        direction: PortDirection,
    ) -> Result<[f32; 2], PortError> {
        self.ports.anchor(self.position, name, direction)
    }

    /// Mark the node for removal.
    ///
    /// The node stays addressable until the owning graph sweeps it, giving
    /// open connections a chance to detach first.
    pub fn request_removal(&mut self) {
        self.pending_removal = true;
    }

    /// Whether the node is waiting for the owning graph's removal sweep.
    pub fn pending_removal(&self) -> bool {
        self.pending_removal
    }

    /// Whether the node changed shape since the last layout pass.
    pub fn needs_layout(&self) -> bool {
        self.needs_layout
    }

    /// Clear the layout-dirty flag after the presentation pass ran.
    pub fn mark_laid_out(&mut self) {
        self.needs_layout = false;
    }
}
