//! Shape typing and route resolution
//!
//! Every schema type declares, at compile time, which [`EntityKind`] it
//! belongs to and whether it is the create or the read shape of that kind.
//! Routing goes through the registry only; type names are carried for
//! error messages and drift checks, never parsed.

use super::kind::EntityKind;
use super::registry;
use crate::error::{OmetaError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Role a shape plays for its kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeRole {
    /// Write-intent payload
    Create,
    /// Server representation with server-assigned fields
    Read,
    /// One shape serves both reads and writes
    SelfPaired,
}

impl ShapeRole {
    pub fn can_write(self) -> bool {
        matches!(self, ShapeRole::Create | ShapeRole::SelfPaired)
    }

    pub fn can_read(self) -> bool {
        matches!(self, ShapeRole::Read | ShapeRole::SelfPaired)
    }
}

/// Runtime description of a shape type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeDescriptor {
    pub kind: EntityKind,
    pub role: ShapeRole,
    pub name: &'static str,
}

/// A schema type bound to one entity kind
pub trait Shape: Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;
    const ROLE: ShapeRole;
    const NAME: &'static str;

    /// Read shape of the same kind (`Self` for read and self-paired shapes)
    type Read: Shape;

    fn descriptor() -> ShapeDescriptor
    where
        Self: Sized,
    {
        ShapeDescriptor {
            kind: Self::KIND,
            role: Self::ROLE,
            name: Self::NAME,
        }
    }
}

/// Path segment for any create or read value
pub fn route_for<S: Shape>(_value: &S) -> Result<&'static str> {
    route_for_shape(&S::descriptor())
}

/// Path segment for a shape descriptor
///
/// Fails with `UnknownEntityKind` when the registry row for the kind does
/// not list this shape, which means the schemas and the registry drifted.
pub fn route_for_shape(shape: &ShapeDescriptor) -> Result<&'static str> {
    let spec = registry::spec_for(shape.kind)?;
    if !spec.pairs(shape.name) {
        return Err(OmetaError::UnknownEntityKind {
            type_name: shape.name.to_string(),
        });
    }
    Ok(spec.path)
}

/// Implements [`Shape`] for a create/read pair of one kind
macro_rules! paired_shapes {
    ($kind:ident => $create:ident, $read:ident) => {
        impl $crate::entity::Shape for $create {
            const KIND: $crate::entity::EntityKind = $crate::entity::EntityKind::$kind;
            const ROLE: $crate::entity::ShapeRole = $crate::entity::ShapeRole::Create;
            const NAME: &'static str = stringify!($create);
            type Read = $read;
        }

        impl $crate::entity::Shape for $read {
            const KIND: $crate::entity::EntityKind = $crate::entity::EntityKind::$kind;
            const ROLE: $crate::entity::ShapeRole = $crate::entity::ShapeRole::Read;
            const NAME: &'static str = stringify!($read);
            type Read = $read;
        }
    };
}

/// Implements [`Shape`] for a kind served by a single shape
macro_rules! self_paired_shape {
    ($kind:ident => $shape:ident) => {
        impl $crate::entity::Shape for $shape {
            const KIND: $crate::entity::EntityKind = $crate::entity::EntityKind::$kind;
            const ROLE: $crate::entity::ShapeRole = $crate::entity::ShapeRole::SelfPaired;
            const NAME: &'static str = stringify!($shape);
            type Read = $shape;
        }
    };
}
