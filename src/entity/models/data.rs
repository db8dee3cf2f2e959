//! Data asset schemas: tables, databases, dashboards, charts, pipelines,
//! topics, models, reports and metrics

use super::common::{EntityReference, TagLabel, UsageDetails};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// =============================================================================
// Tables
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    pub data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_length: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fully_qualified_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordinal_position: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Column>>,
}

/// Sample rows captured during profiling
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnProfile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_proportion: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_proportion: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stddev: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableProfile {
    pub profile_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub column_profile: Vec<ColumnProfile>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedWith {
    pub fully_qualified_name: String,
    pub join_count: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnJoins {
    pub column_name: String,
    pub joined_with: Vec<JoinedWith>,
}

/// Frequently joined columns observed over a window of days
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableJoins {
    pub start_date: String,
    pub day_count: i32,
    pub column_joins: Vec<ColumnJoins>,
}

/// Usage count reported for a single table on one date
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableUsageRequest {
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub fully_qualified_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub table_type: Option<String>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub database: Option<EntityReference>,
    #[serde(default)]
    pub owner: Option<EntityReference>,
    #[serde(default)]
    pub tags: Vec<TagLabel>,
    #[serde(default)]
    pub followers: Vec<EntityReference>,
    #[serde(default)]
    pub view_definition: Option<String>,
    #[serde(default)]
    pub usage_summary: Option<UsageDetails>,
    #[serde(default)]
    pub sample_data: Option<TableData>,
    #[serde(default)]
    pub table_profile: Vec<TableProfile>,
    #[serde(default)]
    pub joins: Option<TableJoins>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub version: Option<f64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTable {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_type: Option<String>,
    pub columns: Vec<Column>,
    /// Id of the owning database
    pub database: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<EntityReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_definition: Option<String>,
}

// =============================================================================
// Databases
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub fully_qualified_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub service: EntityReference,
    #[serde(default)]
    pub owner: Option<EntityReference>,
    #[serde(default)]
    pub tables: Option<Vec<EntityReference>>,
    #[serde(default)]
    pub usage_summary: Option<UsageDetails>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub version: Option<f64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDatabase {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub service: EntityReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<EntityReference>,
}

// =============================================================================
// Dashboards and charts
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub fully_qualified_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub dashboard_url: Option<String>,
    #[serde(default)]
    pub charts: Vec<EntityReference>,
    #[serde(default)]
    pub service: Option<EntityReference>,
    #[serde(default)]
    pub owner: Option<EntityReference>,
    #[serde(default)]
    pub tags: Vec<TagLabel>,
    #[serde(default)]
    pub followers: Vec<EntityReference>,
    #[serde(default)]
    pub usage_summary: Option<UsageDetails>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub version: Option<f64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDashboard {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charts: Option<Vec<EntityReference>>,
    pub service: EntityReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<EntityReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagLabel>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub fully_qualified_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub chart_type: Option<String>,
    #[serde(default)]
    pub chart_url: Option<String>,
    #[serde(default)]
    pub service: Option<EntityReference>,
    #[serde(default)]
    pub owner: Option<EntityReference>,
    #[serde(default)]
    pub tags: Vec<TagLabel>,
    #[serde(default)]
    pub followers: Vec<EntityReference>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub version: Option<f64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChart {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_url: Option<String>,
    pub service: EntityReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<EntityReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagLabel>,
}

// =============================================================================
// Pipelines
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub downstream_tasks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub fully_qualified_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub pipeline_url: Option<String>,
    #[serde(default)]
    pub concurrency: Option<i32>,
    #[serde(default)]
    pub pipeline_location: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub service: Option<EntityReference>,
    #[serde(default)]
    pub owner: Option<EntityReference>,
    #[serde(default)]
    pub tags: Vec<TagLabel>,
    #[serde(default)]
    pub followers: Vec<EntityReference>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub version: Option<f64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePipeline {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<Task>,
    pub service: EntityReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<EntityReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagLabel>,
}

// =============================================================================
// Topics
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub fully_qualified_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub service: EntityReference,
    pub partitions: i32,
    #[serde(default)]
    pub cleanup_policies: Vec<String>,
    #[serde(default)]
    pub replication_factor: Option<i32>,
    #[serde(default)]
    pub retention_time: Option<f64>,
    #[serde(default)]
    pub retention_size: Option<f64>,
    #[serde(default)]
    pub max_message_size: Option<i64>,
    #[serde(default)]
    pub min_in_sync_replicas: Option<i32>,
    #[serde(default)]
    pub schema_text: Option<String>,
    #[serde(default)]
    pub schema_type: Option<String>,
    #[serde(default)]
    pub owner: Option<EntityReference>,
    #[serde(default)]
    pub tags: Vec<TagLabel>,
    #[serde(default)]
    pub followers: Vec<EntityReference>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub version: Option<f64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTopic {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub service: EntityReference,
    pub partitions: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cleanup_policies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_factor: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_message_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_in_sync_replicas: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<EntityReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagLabel>,
}

// =============================================================================
// ML models
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub fully_qualified_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub algorithm: String,
    #[serde(default)]
    pub dashboard: Option<EntityReference>,
    #[serde(default)]
    pub owner: Option<EntityReference>,
    #[serde(default)]
    pub tags: Vec<TagLabel>,
    #[serde(default)]
    pub followers: Vec<EntityReference>,
    #[serde(default)]
    pub usage_summary: Option<UsageDetails>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub version: Option<f64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateModel {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub algorithm: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard: Option<EntityReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<EntityReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagLabel>,
}

// =============================================================================
// Reports and metrics (a single shape serves reads and writes)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fully_qualified_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<EntityReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_summary: Option<UsageDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fully_qualified_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<EntityReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<EntityReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_summary: Option<UsageDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

paired_shapes!(Table => CreateTable, Table);
paired_shapes!(Database => CreateDatabase, Database);
paired_shapes!(Dashboard => CreateDashboard, Dashboard);
paired_shapes!(Chart => CreateChart, Chart);
paired_shapes!(Pipeline => CreatePipeline, Pipeline);
paired_shapes!(Topic => CreateTopic, Topic);
paired_shapes!(Model => CreateModel, Model);
self_paired_shape!(Report => Report);
self_paired_shape!(Metrics => Metrics);
