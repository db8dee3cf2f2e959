//! HTTP transport for catalog REST calls

use super::auth::TokenSource;
use crate::config::ClientConfig;
use crate::error::{OmetaError, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::{Client, Method};
use serde_json::Value;
use std::sync::Arc;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut cut = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Performs one request against a path relative to `{base_url}/{api_version}`
///
/// Non-2xx responses surface as [`OmetaError::Api`]; an empty success body
/// decodes to `Value::Null`. Implementations must be safe to share between
/// tasks; timeouts and cancellation belong to the implementation.
pub trait Transport: Send + Sync {
    fn send<'a>(
        &'a self,
        method: Method,
        path: &'a str,
        body: Option<Value>,
    ) -> BoxFuture<'a, Result<Value>>;
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    config: ClientConfig,
    tokens: Arc<dyn TokenSource>,
}

impl RestClient {
    pub fn new(config: ClientConfig, tokens: Arc<dyn TokenSource>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("ometa/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            config,
            tokens,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn execute(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let url = self.config.url_for(path);
        tracing::debug!("{} {}", method, url);

        let token = self.tokens.token().await?;
        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(self.config.auth_header.as_str(), format!("Bearer {}", token));

        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await?;

        let status = response.status();
        let response_body = response.text().await?;

        if !status.is_success() {
            let message = sanitize_for_log(&response_body);
            if status.as_u16() == 404 {
                tracing::debug!("Not found: {} {}", method, path);
            } else {
                // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
                tracing::error!("API error: {} - {}", status, message);
            }
            return Err(OmetaError::Api {
                method: method.to_string(),
                path: path.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        // Handle empty response
        if response_body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&response_body)
            .map_err(|e| OmetaError::decode(format!("response of {} {}", method, path), e))
    }
}

impl Transport for RestClient {
    fn send<'a>(
        &'a self,
        method: Method,
        path: &'a str,
        body: Option<Value>,
    ) -> BoxFuture<'a, Result<Value>> {
        self.execute(method, path, body).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.starts_with(&"x".repeat(MAX_LOG_BODY_LENGTH)));
        assert!(sanitized.contains("[truncated, 500 bytes total]"));
    }

    #[test]
    fn test_sanitize_strips_control_characters() {
        assert_eq!(sanitize_for_log("line1\nline2\t!"), "line1line2!");
    }

    #[test]
    fn test_sanitize_respects_char_boundaries() {
        let body = format!("{}é{}", "a".repeat(MAX_LOG_BODY_LENGTH - 1), "b".repeat(50));
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.contains("truncated"));
    }
}
