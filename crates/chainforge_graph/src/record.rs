// SPDX-License-Identifier: MIT OR Apache-2.0
//! Flat persisted record for a node and its round-trip codec.
//!
//! Records never reference the recipe catalog: a decoded node comes back
//! unresolved, and the owning graph performs resolution as a separate pass
//! once every node is loaded. That keeps loading independent of catalog
//! availability and of record order.

use crate::node::{Node, NodeId};
use crate::tier::Tier;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted form of one node.
///
/// The `override` field is omitted entirely when no tier override is set;
/// absence is semantically distinct from every valid ordinal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Node id in canonical UUID string form.
    pub id: String,
    /// Canvas x coordinate.
    pub x: f32,
    /// Canvas y coordinate.
    pub y: f32,
    /// Tier override ordinal (1..=11), absent when no override is set.
    #[serde(rename = "override", default, skip_serializing_if = "Option::is_none")]
    pub tier_override: Option<u8>,
    /// Bound recipe hash; -1 means unbound.
    #[serde(rename = "recipeHash")]
    pub recipe_hash: i64,
}

/// Error decoding a persisted node record.
///
/// Fatal for the single record only; the loader decides whether to skip
/// the node or abort the whole load.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The id field is not a well-formed UUID.
    #[error("malformed node id {id:?}")]
    MalformedId {
        /// The offending id string.
        id: String,
        /// Parse failure detail.
        #[source]
        source: uuid::Error,
    },

    /// The override ordinal matches no known tier.
    #[error("unknown tier ordinal {0}")]
    UnknownTierOrdinal(u8),
}

impl NodeRecord {
    /// Encode a node into its persisted record.
    pub fn encode(node: &Node) -> Self {
        let [x, y] = node.position();
        Self {
            id: node.id.0.to_string(),
            x,
            y,
            tier_override: node.tier_override().map(Tier::ordinal),
            recipe_hash: node.recipe_hash(),
        }
    }

    /// Decode the record into a node carrying its persisted id.
    ///
    /// The node is returned unresolved; callers resolve it against a
    /// catalog afterwards.
    pub fn decode(self) -> Result<Node, DecodeError> {
        let uuid = Uuid::parse_str(&self.id).map_err(|source| DecodeError::MalformedId {
            id: self.id.clone(),
            source,
        })?;

        let tier_override = self
            .tier_override
            .map(|ordinal| Tier::from_ordinal(ordinal).ok_or(DecodeError::UnknownTierOrdinal(ordinal)))
            .transpose()?;

        Ok(Node::with_id(
            NodeId(uuid),
            [self.x, self.y],
            self.recipe_hash,
            tier_override,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::UNBOUND_HASH;

    #[test]
    fn test_round_trip_preserves_identity_and_fields() {
        let node = Node::new([12.5, -3.0], 42, Some(Tier::Hv));
        let decoded = NodeRecord::encode(&node).decode().unwrap();

        assert_eq!(decoded.id, node.id);
        assert_eq!(decoded.position(), [12.5, -3.0]);
        assert_eq!(decoded.tier_override(), Some(Tier::Hv));
        assert_eq!(decoded.recipe_hash(), 42);
    }

    #[test]
    fn test_round_trip_without_override() {
        let node = Node::new([0.0, 0.0], UNBOUND_HASH, None);
        let decoded = NodeRecord::encode(&node).decode().unwrap();

        assert_eq!(decoded.tier_override(), None);
        assert_eq!(decoded.recipe_hash(), UNBOUND_HASH);
    }

    #[test]
    fn test_json_field_names_match_record_format() {
        let node = Node::new([1.0, 2.0], 7, Some(Tier::Lv));
        let json = serde_json::to_value(NodeRecord::encode(&node)).unwrap();

        assert!(json.get("id").is_some());
        assert_eq!(json["x"], 1.0);
        assert_eq!(json["y"], 2.0);
        assert_eq!(json["override"], 2);
        assert_eq!(json["recipeHash"], 7);
    }

    #[test]
    fn test_json_omits_override_when_unset() {
        let node = Node::new([0.0, 0.0], 7, None);
        let json = serde_json::to_value(NodeRecord::encode(&node)).unwrap();

        assert!(json.get("override").is_none());

        let record: NodeRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.decode().unwrap().tier_override(), None);
    }

    #[test]
    fn test_unknown_override_ordinal_fails_decode() {
        let record = NodeRecord {
            id: Uuid::new_v4().to_string(),
            x: 0.0,
            y: 0.0,
            tier_override: Some(99),
            recipe_hash: 1,
        };

        let err = record.decode().unwrap_err();
        assert!(matches!(err, DecodeError::UnknownTierOrdinal(99)));
    }

    #[test]
    fn test_malformed_id_fails_decode() {
        let record = NodeRecord {
            id: "not-a-uuid".to_owned(),
            x: 0.0,
            y: 0.0,
            tier_override: None,
            recipe_hash: UNBOUND_HASH,
        };

        assert!(matches!(
            record.decode(),
            Err(DecodeError::MalformedId { .. })
        ));
    }

    #[test]
    fn test_missing_required_field_rejected_by_serde() {
        let json = r#"{ "id": "00000000-0000-0000-0000-000000000000", "x": 1.0, "recipeHash": -1 }"#;
        assert!(serde_json::from_str::<NodeRecord>(json).is_err());
    }

    #[test]
    fn test_decoded_node_starts_unresolved() {
        let record = NodeRecord {
            id: Uuid::new_v4().to_string(),
            x: 0.0,
            y: 0.0,
            tier_override: None,
            recipe_hash: 123,
        };

        let node = record.decode().unwrap();
        assert!(node.is_unresolved());
        assert!(node.ports().is_empty());
    }
}
