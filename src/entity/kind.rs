//! Entity kinds known to the catalog

use crate::error::OmetaError;
use std::fmt;
use std::str::FromStr;

/// Closed set of catalog entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Table,
    Database,
    Dashboard,
    Pipeline,
    Topic,
    Chart,
    Model,
    Report,
    Metrics,
    User,
    DatabaseService,
    DashboardService,
    MessagingService,
    PipelineService,
    Lineage,
}

impl EntityKind {
    pub const ALL: [EntityKind; 15] = [
        EntityKind::Table,
        EntityKind::Database,
        EntityKind::Dashboard,
        EntityKind::Pipeline,
        EntityKind::Topic,
        EntityKind::Chart,
        EntityKind::Model,
        EntityKind::Report,
        EntityKind::Metrics,
        EntityKind::User,
        EntityKind::DatabaseService,
        EntityKind::DashboardService,
        EntityKind::MessagingService,
        EntityKind::PipelineService,
        EntityKind::Lineage,
    ];

    /// Lowercase name, as used by the usage and lineage endpoints
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Table => "table",
            EntityKind::Database => "database",
            EntityKind::Dashboard => "dashboard",
            EntityKind::Pipeline => "pipeline",
            EntityKind::Topic => "topic",
            EntityKind::Chart => "chart",
            EntityKind::Model => "model",
            EntityKind::Report => "report",
            EntityKind::Metrics => "metrics",
            EntityKind::User => "user",
            EntityKind::DatabaseService => "databaseservice",
            EntityKind::DashboardService => "dashboardservice",
            EntityKind::MessagingService => "messagingservice",
            EntityKind::PipelineService => "pipelineservice",
            EntityKind::Lineage => "lineage",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityKind {
    type Err = OmetaError;

    /// Accepts the lowercase name, case-insensitively, with `-` or `_` separators
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        EntityKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| OmetaError::UnknownEntityKind {
                type_name: s.to_string(),
            })
    }
}
