//! Entity Registry - static table of kinds, routes and shape pairings
//!
//! One row per [`EntityKind`]. The table is the only place that knows which
//! REST collection a kind lives under, which create/read shapes pair with
//! it, and whether writes go through POST (services) or PUT.

use super::kind::EntityKind;
use super::shape::{ShapeDescriptor, ShapeRole};
use crate::error::{OmetaError, Result};

/// Schema family a kind belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleCategory {
    Data,
    Services,
    Teams,
    Lineage,
}

/// Registry row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindSpec {
    pub kind: EntityKind,
    pub path: &'static str,
    pub create_shape: &'static str,
    pub read_shape: &'static str,
    pub category: ModuleCategory,
    /// Services accept POST only; every other kind is PUT create-or-update
    pub is_service: bool,
}

impl KindSpec {
    const fn new(
        kind: EntityKind,
        path: &'static str,
        create_shape: &'static str,
        read_shape: &'static str,
        category: ModuleCategory,
    ) -> Self {
        Self {
            kind,
            path,
            create_shape,
            read_shape,
            category,
            is_service: matches!(category, ModuleCategory::Services),
        }
    }

    /// True when one shape serves both reads and writes
    pub fn is_self_paired(&self) -> bool {
        self.create_shape == self.read_shape
    }

    /// True when `shape_name` is this kind's create or read shape
    pub fn pairs(&self, shape_name: &str) -> bool {
        self.create_shape == shape_name || self.read_shape == shape_name
    }

    pub fn create_descriptor(&self) -> ShapeDescriptor {
        ShapeDescriptor {
            kind: self.kind,
            role: if self.is_self_paired() {
                ShapeRole::SelfPaired
            } else {
                ShapeRole::Create
            },
            name: self.create_shape,
        }
    }

    pub fn read_descriptor(&self) -> ShapeDescriptor {
        ShapeDescriptor {
            kind: self.kind,
            role: if self.is_self_paired() {
                ShapeRole::SelfPaired
            } else {
                ShapeRole::Read
            },
            name: self.read_shape,
        }
    }
}

use EntityKind as K;
use ModuleCategory as M;

static REGISTRY: &[KindSpec] = &[
    KindSpec::new(K::Table, "/tables", "CreateTable", "Table", M::Data),
    KindSpec::new(K::Database, "/databases", "CreateDatabase", "Database", M::Data),
    KindSpec::new(K::Dashboard, "/dashboards", "CreateDashboard", "Dashboard", M::Data),
    KindSpec::new(K::Pipeline, "/pipelines", "CreatePipeline", "Pipeline", M::Data),
    KindSpec::new(K::Topic, "/topics", "CreateTopic", "Topic", M::Data),
    KindSpec::new(K::Chart, "/charts", "CreateChart", "Chart", M::Data),
    KindSpec::new(K::Model, "/models", "CreateModel", "Model", M::Data),
    KindSpec::new(K::Report, "/reports", "Report", "Report", M::Data),
    KindSpec::new(K::Metrics, "/metrics", "Metrics", "Metrics", M::Data),
    KindSpec::new(K::User, "/users", "CreateUser", "User", M::Teams),
    KindSpec::new(
        K::DatabaseService,
        "/services/databaseServices",
        "CreateDatabaseService",
        "DatabaseService",
        M::Services,
    ),
    KindSpec::new(
        K::DashboardService,
        "/services/dashboardServices",
        "CreateDashboardService",
        "DashboardService",
        M::Services,
    ),
    KindSpec::new(
        K::MessagingService,
        "/services/messagingServices",
        "CreateMessagingService",
        "MessagingService",
        M::Services,
    ),
    KindSpec::new(
        K::PipelineService,
        "/services/pipelineServices",
        "CreatePipelineService",
        "PipelineService",
        M::Services,
    ),
    KindSpec::new(K::Lineage, "/lineage", "AddLineage", "AddLineage", M::Lineage),
];

/// All registry rows
pub fn all_specs() -> &'static [KindSpec] {
    REGISTRY
}

/// Registry row for a kind
pub fn spec_for(kind: EntityKind) -> Result<&'static KindSpec> {
    REGISTRY
        .iter()
        .find(|spec| spec.kind == kind)
        .ok_or_else(|| OmetaError::UnknownEntityKind {
            type_name: kind.name().to_string(),
        })
}

/// REST path segment for a kind
pub fn resolve_path(kind: EntityKind) -> Result<&'static str> {
    spec_for(kind).map(|spec| spec.path)
}

/// Create shape paired with a kind
pub fn create_shape_for(kind: EntityKind) -> Result<ShapeDescriptor> {
    spec_for(kind).map(KindSpec::create_descriptor)
}

/// Read shape paired with a create shape
pub fn read_shape_for(create: &ShapeDescriptor) -> Result<ShapeDescriptor> {
    if !create.role.can_write() {
        return Err(OmetaError::InvalidEntity {
            type_name: create.name.to_string(),
            reason: "expected a create shape, got a read shape".to_string(),
        });
    }

    let spec = spec_for(create.kind)?;
    if spec.create_shape != create.name {
        return Err(OmetaError::UnknownEntityKind {
            type_name: create.name.to_string(),
        });
    }

    Ok(spec.read_descriptor())
}

/// Kind owning a shape name, create or read
pub fn kind_for_shape(shape_name: &str) -> Result<EntityKind> {
    REGISTRY
        .iter()
        .find(|spec| spec.pairs(shape_name))
        .map(|spec| spec.kind)
        .ok_or_else(|| OmetaError::UnknownEntityKind {
            type_name: shape_name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_kind_has_exactly_one_row() {
        for kind in EntityKind::ALL {
            let rows = REGISTRY.iter().filter(|spec| spec.kind == kind).count();
            assert_eq!(rows, 1, "{kind} should have exactly one registry row");
        }
        assert_eq!(REGISTRY.len(), EntityKind::ALL.len());
    }

    #[test]
    fn test_paths_and_shapes_are_unique() {
        let paths: HashSet<_> = REGISTRY.iter().map(|spec| spec.path).collect();
        assert_eq!(paths.len(), REGISTRY.len(), "no two kinds may share a path");

        let creates: HashSet<_> = REGISTRY.iter().map(|spec| spec.create_shape).collect();
        let reads: HashSet<_> = REGISTRY.iter().map(|spec| spec.read_shape).collect();
        assert_eq!(creates.len(), REGISTRY.len());
        assert_eq!(reads.len(), REGISTRY.len());
    }

    #[test]
    fn test_service_flag_matches_category() {
        for spec in all_specs() {
            assert_eq!(spec.is_service, spec.category == ModuleCategory::Services);
        }
        assert!(spec_for(EntityKind::MessagingService).unwrap().is_service);
        assert!(!spec_for(EntityKind::Table).unwrap().is_service);
        assert!(!spec_for(EntityKind::User).unwrap().is_service);
    }

    #[test]
    fn test_resolve_path() {
        assert_eq!(resolve_path(EntityKind::Table).unwrap(), "/tables");
        assert_eq!(
            resolve_path(EntityKind::PipelineService).unwrap(),
            "/services/pipelineServices"
        );
        assert_eq!(resolve_path(EntityKind::User).unwrap(), "/users");
    }

    #[test]
    fn test_create_to_read_pairing() {
        let create = create_shape_for(EntityKind::Dashboard).unwrap();
        assert_eq!(create.name, "CreateDashboard");
        assert_eq!(create.role, ShapeRole::Create);

        let read = read_shape_for(&create).unwrap();
        assert_eq!(read.name, "Dashboard");
        assert_eq!(read.kind, EntityKind::Dashboard);
    }

    #[test]
    fn test_self_paired_kinds() {
        for kind in [EntityKind::Report, EntityKind::Metrics, EntityKind::Lineage] {
            let spec = spec_for(kind).unwrap();
            assert!(spec.is_self_paired(), "{kind} should be self-paired");
            let create = create_shape_for(kind).unwrap();
            assert_eq!(create.role, ShapeRole::SelfPaired);
            assert_eq!(read_shape_for(&create).unwrap().name, create.name);
        }
    }

    #[test]
    fn test_read_shape_for_rejects_read_shapes() {
        let read = spec_for(EntityKind::Table).unwrap().read_descriptor();
        let err = read_shape_for(&read).unwrap_err();
        assert!(matches!(err, OmetaError::InvalidEntity { .. }));
    }

    #[test]
    fn test_kind_for_shape() {
        assert_eq!(kind_for_shape("CreateTopic").unwrap(), EntityKind::Topic);
        assert_eq!(kind_for_shape("Topic").unwrap(), EntityKind::Topic);
        assert!(matches!(
            kind_for_shape("CreateGlossary"),
            Err(OmetaError::UnknownEntityKind { .. })
        ));
    }
}
