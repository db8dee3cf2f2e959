//! Error types
//!
//! Every fallible library call returns [`OmetaError`]. Status-coded API
//! failures keep the HTTP status so callers can tell a missing entity apart
//! from a broken server.

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, OmetaError>;

/// Errors surfaced by the catalog client
#[derive(Debug, Error)]
pub enum OmetaError {
    /// A type or name that has no row in the entity registry
    #[error("unknown entity kind: {type_name}")]
    UnknownEntityKind { type_name: String },

    /// The operation received the wrong shape category
    #[error("invalid entity {type_name}: {reason}")]
    InvalidEntity { type_name: String, reason: String },

    /// The server answered with a non-2xx status
    #[error("API request failed: {method} {path} returned {status}: {message}")]
    Api {
        method: String,
        path: String,
        status: u16,
        message: String,
    },

    /// The request never produced a response
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body did not match the expected shape
    #[error("failed to decode {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The server handed back a cursor that would restart the listing
    #[error("pagination of {path} did not advance past cursor {cursor}")]
    StalledCursor { path: String, cursor: String },

    /// Token acquisition failed
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Configuration is unusable
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl OmetaError {
    pub(crate) fn decode(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            context: context.into(),
            source,
        }
    }

    /// HTTP status carried by the error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True for 404-class responses
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Format an error for display to an operator
/// Security: never echoes raw server bodies
pub fn format_error(error: &OmetaError) -> String {
    match error.status() {
        Some(401) => {
            return "Authentication failed. Check the configured auth provider.".to_string()
        },
        Some(403) => return "Permission denied by the catalog server.".to_string(),
        Some(404) => return "Entity not found.".to_string(),
        Some(409) => return "Conflict. The entity may already exist or be in use.".to_string(),
        Some(429) => return "Rate limit exceeded. Please try again later.".to_string(),
        Some(400) => return "Invalid request. Check your parameters.".to_string(),
        Some(s) if s >= 500 => {
            return "Catalog server temporarily unavailable. Please try again.".to_string()
        },
        _ => {},
    }

    match error {
        OmetaError::Http(_) => {
            "Request failed. Check your network connection and try again.".to_string()
        },
        other => {
            let text = other.to_string();
            let sanitized = text
                .chars()
                .filter(|c| c.is_ascii_graphic() || *c == ' ')
                .take(120)
                .collect::<String>();

            if sanitized.len() < text.len() {
                format!("{}...", sanitized)
            } else {
                sanitized
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> OmetaError {
        OmetaError::Api {
            method: "GET".to_string(),
            path: "/tables/name/x".to_string(),
            status,
            message: "{\"code\":404}".to_string(),
        }
    }

    #[test]
    fn test_not_found_detection() {
        assert!(api(404).is_not_found());
        assert!(!api(500).is_not_found());
        assert!(!OmetaError::Auth("nope".to_string()).is_not_found());
    }

    #[test]
    fn test_format_error_hides_body() {
        let msg = format_error(&api(404));
        assert_eq!(msg, "Entity not found.");
        assert!(!format_error(&api(503)).contains("code"));
    }

    #[test]
    fn test_format_error_passes_through_local_errors() {
        let err = OmetaError::UnknownEntityKind {
            type_name: "glossary".to_string(),
        };
        assert_eq!(format_error(&err), "unknown entity kind: glossary");
    }
}
