//! Table-specific operations: sample data, profiles, usage and joins

use super::decode;
use crate::entity::models::{Table, TableData, TableJoins, TableProfile, TableUsageRequest};
use crate::entity::{registry, EntityKind};
use crate::error::{OmetaError, Result};
use crate::rest::Transport;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Table helper borrowed from [`super::OpenMetadata::tables`]
pub struct TableApi<'a, T: Transport> {
    transport: &'a T,
}

impl<'a, T: Transport> TableApi<'a, T> {
    pub(crate) fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    fn table_path(&self, table_id: Uuid, action: &str) -> Result<String> {
        Ok(format!(
            "{}/{}/{}",
            registry::resolve_path(EntityKind::Table)?,
            table_id,
            action
        ))
    }

    async fn put_table<B: Serialize>(
        &self,
        table_id: Uuid,
        action: &str,
        body: &B,
    ) -> Result<Value> {
        let path = self.table_path(table_id, action)?;
        let body = serde_json::to_value(body)
            .map_err(|e| OmetaError::decode(format!("{} request body", action), e))?;
        self.transport.send(Method::PUT, &path, Some(body)).await
    }

    /// Attach sample rows to a table; returns the sample data the server stored
    pub async fn ingest_sample_data(&self, table_id: Uuid, data: &TableData) -> Result<TableData> {
        let response = self.put_table(table_id, "sampleData", data).await?;
        let table: Table = decode(response, "Table")?;
        Ok(table.sample_data.unwrap_or_default())
    }

    /// Attach a profile to a table; returns every profile the table now carries
    pub async fn ingest_profile_data(
        &self,
        table_id: Uuid,
        profile: &TableProfile,
    ) -> Result<Vec<TableProfile>> {
        let response = self.put_table(table_id, "tableProfile", profile).await?;
        let table: Table = decode(response, "Table")?;
        Ok(table.table_profile)
    }

    /// Report a usage count for one day
    pub async fn publish_table_usage(
        &self,
        table_id: Uuid,
        usage: &TableUsageRequest,
    ) -> Result<()> {
        let path = format!("/usage/{}/{}", EntityKind::Table.name(), table_id);
        let body = serde_json::to_value(usage)
            .map_err(|e| OmetaError::decode("TableUsageRequest body", e))?;
        let response = self.transport.send(Method::POST, &path, Some(body)).await?;
        tracing::debug!("published table usage {}", response);
        Ok(())
    }

    /// Report columns frequently joined with this table's columns
    pub async fn publish_frequently_joined_with(
        &self,
        table_id: Uuid,
        joins: &TableJoins,
    ) -> Result<()> {
        let response = self.put_table(table_id, "joins", joins).await?;
        tracing::debug!("published frequently joined with {}", response);
        Ok(())
    }
}
