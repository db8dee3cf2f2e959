//! REST plumbing
//!
//! - [`auth`] - Token acquisition for the supported identity backends
//! - [`http`] - The [`Transport`] seam and its reqwest implementation

pub mod auth;
pub mod http;

pub use auth::{AuthProvider, TokenSource};
pub use http::{RestClient, Transport};
