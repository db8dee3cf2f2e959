//! Lineage edges and graphs

use super::common::EntityReference;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Directed edge between two entities, as submitted by callers
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitiesEdge {
    pub from_entity: EntityReference,
    pub to_entity: EntityReference,
}

/// Request to record one lineage edge
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLineage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub edge: EntitiesEdge,
}

impl AddLineage {
    pub fn new(from_entity: EntityReference, to_entity: EntityReference) -> Self {
        Self {
            description: None,
            edge: EntitiesEdge {
                from_entity,
                to_entity,
            },
        }
    }
}

/// Edge as returned inside a lineage graph
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub from_entity: Uuid,
    pub to_entity: Uuid,
    #[serde(default)]
    pub description: Option<String>,
}

/// Lineage graph around one entity
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityLineage {
    pub entity: EntityReference,
    #[serde(default)]
    pub nodes: Vec<EntityReference>,
    #[serde(default)]
    pub upstream_edges: Vec<Edge>,
    #[serde(default)]
    pub downstream_edges: Vec<Edge>,
}

self_paired_shape!(Lineage => AddLineage);
