//! Authentication
//!
//! Token acquisition for the supported identity backends. The provider is
//! picked once from configuration; the transport only sees the
//! [`TokenSource`] capability.

use crate::config::{AuthProviderType, MetadataServerConfig};
use crate::error::{OmetaError, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use gcp_auth::TokenProvider;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Scopes requested from Google when none are configured
pub const DEFAULT_GOOGLE_SCOPES: &[&str] = &["https://www.googleapis.com/auth/cloud-platform"];

/// Token sent when authentication is disabled
pub const NO_AUTH_TOKEN: &str = "no_token";

/// Token expiry buffer - refresh tokens this much before they actually expire
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Default token TTL if we can't determine expiry (conservative: 30 minutes)
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// Upper bound on server-reported token lifetimes
const MAX_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Supplies the current bearer token
pub trait TokenSource: Send + Sync {
    fn token(&self) -> BoxFuture<'_, Result<String>>;
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Shared token cache with expiry
#[derive(Clone, Default)]
struct TokenCache {
    inner: Arc<RwLock<Option<CachedToken>>>,
}

impl TokenCache {
    async fn get(&self) -> Option<String> {
        let cache = self.inner.read().await;
        match cache.as_ref() {
            Some(cached) if cached.is_valid() => Some(cached.token.clone()),
            Some(_) => {
                tracing::debug!("Cached token expired, fetching new token");
                None
            },
            None => None,
        }
    }

    async fn store(&self, token: &str, ttl: Duration) {
        let ttl = ttl.min(MAX_TOKEN_TTL).saturating_sub(TOKEN_EXPIRY_BUFFER);
        let expires_at = Instant::now() + ttl;
        let mut cache = self.inner.write().await;
        *cache = Some(CachedToken {
            token: token.to_string(),
            expires_at,
        });
        tracing::debug!("New token cached, expires in ~{} minutes", ttl.as_secs() / 60);
    }

    async fn clear(&self) {
        let mut cache = self.inner.write().await;
        *cache = None;
    }
}

// =============================================================================
// Google
// =============================================================================

/// Google credentials: a service-account key file or Application Default Credentials
#[derive(Clone)]
pub struct GoogleAuth {
    provider: Arc<dyn TokenProvider>,
    scopes: Vec<String>,
    cache: TokenCache,
}

impl GoogleAuth {
    pub async fn new(secret_key: Option<&Path>, scopes: &[String]) -> Result<Self> {
        let provider: Arc<dyn TokenProvider> = match secret_key {
            Some(path) => Arc::new(gcp_auth::CustomServiceAccount::from_file(path).map_err(
                |e| OmetaError::Auth(format!("failed to load {}: {}", path.display(), e)),
            )?),
            None => gcp_auth::provider().await.map_err(|e| {
                OmetaError::Auth(format!(
                    "failed to initialize Google Application Default Credentials: {}",
                    e
                ))
            })?,
        };

        let scopes = if scopes.is_empty() {
            DEFAULT_GOOGLE_SCOPES.iter().map(|s| s.to_string()).collect()
        } else {
            scopes.to_vec()
        };

        Ok(Self {
            provider,
            scopes,
            cache: TokenCache::default(),
        })
    }

    async fn fetch(&self) -> Result<String> {
        if let Some(token) = self.cache.get().await {
            return Ok(token);
        }

        let scopes: Vec<&str> = self.scopes.iter().map(String::as_str).collect();
        let token = self
            .provider
            .token(&scopes)
            .await
            .map_err(|e| OmetaError::Auth(format!("failed to get Google access token: {}", e)))?;

        let token = token.as_str().to_string();
        self.cache.store(&token, DEFAULT_TOKEN_TTL).await;
        Ok(token)
    }
}

// =============================================================================
// OAuth2 client credentials (Okta, Auth0)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GrantStyle {
    /// Form body with HTTP basic client authentication
    Okta,
    /// JSON body carrying the client secret
    Auth0,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Client-credentials grant against an OAuth2 token endpoint
#[derive(Clone)]
pub struct ClientCredentials {
    style: GrantStyle,
    token_url: String,
    client_id: String,
    client_secret: String,
    scopes: Vec<String>,
    audience: Option<String>,
    http: reqwest::Client,
    cache: TokenCache,
}

impl ClientCredentials {
    fn from_config(style: GrantStyle, config: &MetadataServerConfig) -> Result<Self> {
        let missing = |name: &str| OmetaError::Config(format!("{} is required", name));

        let token_url = match style {
            GrantStyle::Okta => {
                let org_url = config.org_url.as_deref().ok_or_else(|| missing("org_url"))?;
                format!("{}/v1/token", org_url.trim_end_matches('/'))
            },
            GrantStyle::Auth0 => {
                let domain = config.domain.as_deref().ok_or_else(|| missing("domain"))?;
                let domain = domain
                    .trim_start_matches("https://")
                    .trim_end_matches('/');
                format!("https://{}/oauth/token", domain)
            },
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            style,
            token_url,
            client_id: config.client_id.clone().ok_or_else(|| missing("client_id"))?,
            client_secret: config
                .client_secret
                .clone()
                .ok_or_else(|| missing("client_secret"))?,
            scopes: config.scopes.clone(),
            audience: config.audience.clone(),
            http,
            cache: TokenCache::default(),
        })
    }

    /// Point the grant at another token endpoint
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    async fn fetch(&self) -> Result<String> {
        if let Some(token) = self.cache.get().await {
            return Ok(token);
        }

        tracing::debug!("POST {} (client credentials)", self.token_url);

        let request = match self.style {
            GrantStyle::Okta => {
                let scope = self.scopes.join(" ");
                let mut form = vec![("grant_type", "client_credentials")];
                if !scope.is_empty() {
                    form.push(("scope", scope.as_str()));
                }
                self.http
                    .post(&self.token_url)
                    .basic_auth(&self.client_id, Some(&self.client_secret))
                    .form(&form)
            },
            GrantStyle::Auth0 => {
                let mut body = serde_json::json!({
                    "grant_type": "client_credentials",
                    "client_id": self.client_id,
                    "client_secret": self.client_secret,
                });
                if let Some(audience) = &self.audience {
                    body["audience"] = serde_json::Value::String(audience.clone());
                }
                self.http.post(&self.token_url).json(&body)
            },
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Security: token endpoint bodies may echo client ids
            tracing::error!("Token request failed: {}", status);
            return Err(OmetaError::Auth(format!("token endpoint returned {}", status)));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| OmetaError::decode("token response", e))?;

        let ttl = parsed
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_TTL);
        self.cache.store(&parsed.access_token, ttl).await;

        Ok(parsed.access_token)
    }
}

// =============================================================================
// Provider selection
// =============================================================================

/// Identity backend selected once at configuration time
#[derive(Clone)]
pub enum AuthProvider {
    NoOp,
    Google(GoogleAuth),
    Okta(ClientCredentials),
    Auth0(ClientCredentials),
}

impl AuthProvider {
    pub async fn from_config(config: &MetadataServerConfig) -> Result<Self> {
        let provider = match config.auth_provider_type {
            AuthProviderType::NoAuth => Self::NoOp,
            AuthProviderType::Google => {
                Self::Google(GoogleAuth::new(config.secret_key.as_deref(), &config.scopes).await?)
            },
            AuthProviderType::Okta => {
                Self::Okta(ClientCredentials::from_config(GrantStyle::Okta, config)?)
            },
            AuthProviderType::Auth0 => {
                Self::Auth0(ClientCredentials::from_config(GrantStyle::Auth0, config)?)
            },
        };

        tracing::info!("Using {:?} authentication", config.auth_provider_type);
        Ok(provider)
    }

    /// Drop any cached token and fetch a fresh one
    pub async fn refresh(&self) -> Result<String> {
        match self {
            Self::NoOp => {},
            Self::Google(google) => google.cache.clear().await,
            Self::Okta(grant) | Self::Auth0(grant) => grant.cache.clear().await,
        }
        self.current_token().await
    }

    async fn current_token(&self) -> Result<String> {
        match self {
            Self::NoOp => Ok(NO_AUTH_TOKEN.to_string()),
            Self::Google(google) => google.fetch().await,
            Self::Okta(grant) | Self::Auth0(grant) => grant.fetch().await,
        }
    }
}

impl TokenSource for AuthProvider {
    fn token(&self) -> BoxFuture<'_, Result<String>> {
        self.current_token().boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_provider_token() {
        let provider = AuthProvider::from_config(&MetadataServerConfig::default())
            .await
            .unwrap();
        assert_eq!(provider.token().await.unwrap(), NO_AUTH_TOKEN);
        assert_eq!(provider.refresh().await.unwrap(), NO_AUTH_TOKEN);
    }

    #[tokio::test]
    async fn test_token_cache_expiry() {
        let cache = TokenCache::default();
        assert!(cache.get().await.is_none());

        cache.store("abc", Duration::from_secs(600)).await;
        assert_eq!(cache.get().await.as_deref(), Some("abc"));

        // A TTL inside the expiry buffer is already stale
        cache.store("short", Duration::from_secs(10)).await;
        assert!(cache.get().await.is_none());

        cache.clear().await;
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn test_token_cache_caps_huge_lifetimes() {
        let cache = TokenCache::default();
        cache.store("forever", Duration::from_secs(u64::MAX)).await;
        assert_eq!(cache.get().await.as_deref(), Some("forever"));

        let cached = cache.inner.read().await.clone().unwrap();
        assert!(cached.expires_at <= Instant::now() + MAX_TOKEN_TTL);
    }

    #[test]
    fn test_auth0_token_url() {
        let config = MetadataServerConfig {
            auth_provider_type: AuthProviderType::Auth0,
            client_id: Some("id".to_string()),
            client_secret: Some("secret".to_string()),
            domain: Some("https://tenant.auth0.com/".to_string()),
            ..Default::default()
        };
        let grant = ClientCredentials::from_config(GrantStyle::Auth0, &config).unwrap();
        assert_eq!(grant.token_url, "https://tenant.auth0.com/oauth/token");
    }

    #[test]
    fn test_okta_token_url() {
        let config = MetadataServerConfig {
            auth_provider_type: AuthProviderType::Okta,
            client_id: Some("id".to_string()),
            client_secret: Some("secret".to_string()),
            org_url: Some("https://org.okta.com/oauth2/default".to_string()),
            ..Default::default()
        };
        let grant = ClientCredentials::from_config(GrantStyle::Okta, &config).unwrap();
        assert_eq!(grant.token_url, "https://org.okta.com/oauth2/default/v1/token");
    }
}
