//! Typed client for the metadata catalog REST API.
//!
//! Schema values map to REST collections through a static entity registry;
//! [`OpenMetadata`] dispatches create-or-update, lookups, paginated listings,
//! deletes, usage and lineage calls over a pluggable [`rest::Transport`].
//!
//! # Module Structure
//!
//! - [`api`] - The operation surface and kind-specific helpers
//! - [`entity`] - Entity kinds, the registry, shape typing and schemas
//! - [`rest`] - Authentication and the HTTP transport
//! - [`config`] - Server and credential configuration
//! - [`error`] - Error types

pub mod api;
pub mod config;
pub mod entity;
pub mod error;
pub mod rest;

pub use api::{EntityList, ListParams, OpenMetadata};
pub use config::{AuthProviderType, ClientConfig, MetadataServerConfig};
pub use entity::{EntityKind, Shape};
pub use error::{OmetaError, Result};
