//! Service schemas. Services are created with POST only.

use super::common::Schedule;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JDBC connection details for database services
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JdbcInfo {
    pub driver_class: String,
    pub connection_url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseService {
    pub id: Uuid,
    pub name: String,
    pub service_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub jdbc: Option<JdbcInfo>,
    #[serde(default)]
    pub ingestion_schedule: Option<Schedule>,
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
pub struct CreateDatabaseService {
    pub name: String,
    pub service_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jdbc: Option<JdbcInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingestion_schedule: Option<Schedule>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardService {
    pub id: Uuid,
    pub name: String,
    pub service_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub dashboard_url: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub ingestion_schedule: Option<Schedule>,
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
pub struct CreateDashboardService {
    pub name: String,
    pub service_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub dashboard_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingestion_schedule: Option<Schedule>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagingService {
    pub id: Uuid,
    pub name: String,
    pub service_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub brokers: Vec<String>,
    #[serde(default)]
    pub schema_registry: Option<String>,
    #[serde(default)]
    pub ingestion_schedule: Option<Schedule>,
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
pub struct CreateMessagingService {
    pub name: String,
    pub service_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub brokers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_registry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingestion_schedule: Option<Schedule>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineService {
    pub id: Uuid,
    pub name: String,
    pub service_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub pipeline_url: Option<String>,
    #[serde(default)]
    pub ingestion_schedule: Option<Schedule>,
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
pub struct CreatePipelineService {
    pub name: String,
    pub service_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub pipeline_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingestion_schedule: Option<Schedule>,
}

paired_shapes!(DatabaseService => CreateDatabaseService, DatabaseService);
paired_shapes!(DashboardService => CreateDashboardService, DashboardService);
paired_shapes!(MessagingService => CreateMessagingService, MessagingService);
paired_shapes!(PipelineService => CreatePipelineService, PipelineService);
