//! Entity abstraction layer
//!
//! Maps typed schema values to catalog REST collections.
//!
//! # Architecture
//!
//! - [`kind`] - The closed set of entity kinds
//! - [`registry`] - Static table of kind, path, shape pairing and write verb
//! - [`shape`] - Compile-time binding of schema types to kinds, and route resolution
//! - [`models`] - Create and read schemas for every kind
//!
//! # Example
//!
//! ```
//! use ometa::entity::{route_for, models::CreateTable};
//!
//! let request = CreateTable { name: "orders".to_string(), ..Default::default() };
//! assert_eq!(route_for(&request).unwrap(), "/tables");
//! ```

mod kind;
pub mod registry;
#[macro_use]
mod shape;
pub mod models;

pub use kind::EntityKind;
pub use registry::{
    create_shape_for, kind_for_shape, read_shape_for, resolve_path, spec_for, KindSpec,
    ModuleCategory,
};
pub use shape::{route_for, route_for_shape, Shape, ShapeDescriptor, ShapeRole};
