// SPDX-License-Identifier: MIT OR Apache-2.0
//! Recipe lookup contract consumed by the graph core.
//!
//! Recipes are owned by an external catalog; nodes persist only a recipe
//! hash and resolve it on demand through [`RecipeCatalog`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Sentinel hash meaning "no recipe bound".
pub const UNBOUND_HASH: i64 = -1;

/// A (material, quantity) pair used as a recipe input or output.
///
/// Equality and hashing consider the material only; quantity is payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pile {
    /// Material name; doubles as the port key on a bound node.
    pub material: String,
    /// Amount of the material consumed or produced per cycle.
    pub quantity: u32,
}

impl Pile {
    /// Create a new pile.
    pub fn new(material: impl Into<String>, quantity: u32) -> Self {
        Self {
            material: material.into(),
            quantity,
        }
    }
}

impl PartialEq for Pile {
    fn eq(&self, other: &Self) -> bool {
        self.material == other.material
    }
}

impl Eq for Pile {}

impl std::hash::Hash for Pile {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.material.hash(state);
    }
}

/// A crafting/processing definition.
///
/// Opaque to the graph core beyond its stable hash and the ordered input
/// and output piles whose material names become port names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Stable identity of this recipe across catalog versions.
    pub hash: i64,
    /// Power draw in EU/t; classifies the recipe's implied tier.
    pub eu_per_tick: u32,
    /// Ordered inputs; duplicate material names collapse to one port.
    pub inputs: Vec<Pile>,
    /// Ordered outputs.
    pub outputs: Vec<Pile>,
}

impl Recipe {
    /// Create a new recipe.
    pub fn new(hash: i64, eu_per_tick: u32, inputs: Vec<Pile>, outputs: Vec<Pile>) -> Self {
        Self {
            hash,
            eu_per_tick,
            inputs,
            outputs,
        }
    }
}

/// Lookup contract the core requires of a recipe catalog.
///
/// A hash that the current catalog does not know is a normal, expected
/// outcome (catalog versions change between saves), not an error.
pub trait RecipeCatalog {
    /// Find a recipe by its stable hash.
    fn find_by_hash(&self, hash: i64) -> Option<&Recipe>;
}

/// Simple in-memory catalog keyed by recipe hash.
///
/// Suitable for tests and hosts without a dedicated catalog backend.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    recipes: IndexMap<i64, Recipe>,
}

impl InMemoryCatalog {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a recipe, replacing any previous entry with the same hash.
    pub fn register(&mut self, recipe: Recipe) {
        self.recipes.insert(recipe.hash, recipe);
    }

    /// Remove a recipe by hash.
    pub fn remove(&mut self, hash: i64) -> Option<Recipe> {
        self.recipes.shift_remove(&hash)
    }

    /// Number of registered recipes.
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Whether the catalog holds no recipes.
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

impl RecipeCatalog for InMemoryCatalog {
    fn find_by_hash(&self, hash: i64) -> Option<&Recipe> {
        self.recipes.get(&hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pile_equality_by_material_only() {
        assert_eq!(Pile::new("iron", 4), Pile::new("iron", 16));
        assert_ne!(Pile::new("iron", 4), Pile::new("copper", 4));
    }

    #[test]
    fn test_catalog_lookup() {
        let mut catalog = InMemoryCatalog::new();
        catalog.register(Recipe::new(42, 32, vec![Pile::new("iron", 1)], vec![]));

        assert!(catalog.find_by_hash(42).is_some());
        assert!(catalog.find_by_hash(7).is_none());
        assert!(catalog.find_by_hash(UNBOUND_HASH).is_none());
    }

    #[test]
    fn test_catalog_register_replaces() {
        let mut catalog = InMemoryCatalog::new();
        catalog.register(Recipe::new(1, 8, vec![Pile::new("tin", 1)], vec![]));
        catalog.register(Recipe::new(1, 8, vec![Pile::new("lead", 2)], vec![]));

        assert_eq!(catalog.len(), 1);
        let recipe = catalog.find_by_hash(1).unwrap();
        assert_eq!(recipe.inputs[0].material, "lead");
    }
}
