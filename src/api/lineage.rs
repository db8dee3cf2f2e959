//! Lineage operations

use super::get_optional;
use crate::entity::models::{AddLineage, EntityLineage};
use crate::entity::{registry, route_for, EntityKind};
use crate::error::{OmetaError, Result};
use crate::rest::Transport;
use reqwest::Method;
use serde_json::Value;
use uuid::Uuid;

/// Depth used when callers do not pick one
pub const DEFAULT_LINEAGE_DEPTH: u32 = 1;

/// Lineage helper borrowed from [`super::OpenMetadata::lineage`]
pub struct LineageApi<'a, T: Transport> {
    transport: &'a T,
}

impl<'a, T: Transport> LineageApi<'a, T> {
    pub(crate) fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    /// Record an edge between two entities; returns the server's answer verbatim
    pub async fn add_lineage(&self, data: &AddLineage) -> Result<Value> {
        let path = route_for(data)?;
        let body = serde_json::to_value(data)
            .map_err(|e| OmetaError::decode("AddLineage request body", e))?;

        tracing::info!(
            "Adding lineage {} -> {}",
            data.edge.from_entity.id,
            data.edge.to_entity.id
        );
        self.transport.send(Method::PUT, path, Some(body)).await
    }

    /// Lineage graph around an entity id; `None` when the entity does not exist
    pub async fn get_lineage_by_id(
        &self,
        kind: EntityKind,
        id: Uuid,
        upstream_depth: u32,
        downstream_depth: u32,
    ) -> Result<Option<EntityLineage>> {
        self.get_lineage(kind, &id.to_string(), upstream_depth, downstream_depth)
            .await
    }

    /// Lineage graph around an entity's fully qualified name
    pub async fn get_lineage_by_name(
        &self,
        kind: EntityKind,
        fqn: &str,
        upstream_depth: u32,
        downstream_depth: u32,
    ) -> Result<Option<EntityLineage>> {
        let suffix = format!("name/{}", urlencoding::encode(fqn));
        self.get_lineage(kind, &suffix, upstream_depth, downstream_depth)
            .await
    }

    async fn get_lineage(
        &self,
        kind: EntityKind,
        suffix: &str,
        upstream_depth: u32,
        downstream_depth: u32,
    ) -> Result<Option<EntityLineage>> {
        if kind == EntityKind::Lineage {
            return Err(OmetaError::InvalidEntity {
                type_name: kind.name().to_string(),
                reason: "lineage is looked up around an entity, not another edge".to_string(),
            });
        }

        let path = format!(
            "{}/{}/{}?upstreamDepth={}&downstreamDepth={}",
            registry::resolve_path(EntityKind::Lineage)?,
            kind.name(),
            suffix,
            upstream_depth,
            downstream_depth
        );

        get_optional(self.transport, &path, "EntityLineage").await
    }
}
