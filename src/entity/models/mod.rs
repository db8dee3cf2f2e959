//! Entity schemas exchanged with the catalog server
//!
//! Each kind has a "create" request shape, carrying only the fields legal
//! at write time, and a "read" shape that adds server-assigned fields such
//! as `id`, `href`, `version` and `updatedAt`. Reports, metrics and lineage
//! edges use a single shape for both.

mod common;
mod data;
mod lineage;
mod services;
mod teams;

pub use common::*;
pub use data::*;
pub use lineage::*;
pub use services::*;
pub use teams::*;
