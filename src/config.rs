//! Configuration Management
//!
//! Loads the catalog server connection settings from YAML (or JSON, which
//! YAML accepts) with environment overrides.

use crate::error::{OmetaError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_AUTH_HEADER: &str = "X-Catalog-Source";

/// Identity backend used to obtain bearer tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthProviderType {
    #[default]
    #[serde(alias = "no_auth")]
    NoAuth,
    Google,
    Okta,
    Auth0,
}

impl std::str::FromStr for AuthProviderType {
    type Err = OmetaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "no-auth" | "no_auth" | "none" => Ok(Self::NoAuth),
            "google" => Ok(Self::Google),
            "okta" => Ok(Self::Okta),
            "auth0" => Ok(Self::Auth0),
            other => Err(OmetaError::Config(format!("unknown auth provider: {}", other))),
        }
    }
}

fn default_api_version() -> String {
    "v1".to_string()
}

fn default_auth_header() -> String {
    DEFAULT_AUTH_HEADER.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Catalog server settings as written by operators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataServerConfig {
    pub api_endpoint: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default)]
    pub auth_provider_type: AuthProviderType,
    #[serde(default = "default_auth_header")]
    pub auth_header: String,
    /// Google service-account key file
    #[serde(default)]
    pub secret_key: Option<PathBuf>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Okta authorization server, e.g. `https://org.okta.com/oauth2/default`
    #[serde(default)]
    pub org_url: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Auth0 tenant domain
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MetadataServerConfig {
    fn default() -> Self {
        Self {
            api_endpoint: "http://localhost:8585/api".to_string(),
            api_version: default_api_version(),
            auth_provider_type: AuthProviderType::NoAuth,
            auth_header: default_auth_header(),
            secret_key: None,
            client_id: None,
            client_secret: None,
            org_url: None,
            scopes: Vec::new(),
            domain: None,
            audience: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl MetadataServerConfig {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ometa").join("config.yaml"))
    }

    /// Load from a file, then apply environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            OmetaError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let mut config: Self = serde_yaml::from_str(&content).map_err(|e| {
            OmetaError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the default location, falling back to defaults when absent
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                tracing::debug!("No config file found, using defaults");
                let mut config = Self::default();
                config.apply_env()?;
                config.validate()?;
                Ok(config)
            },
        }
    }

    /// Save configuration to disk
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Apply `OMETA_*` environment overrides
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(endpoint) = std::env::var("OMETA_API_ENDPOINT") {
            self.api_endpoint = endpoint;
        }
        if let Ok(version) = std::env::var("OMETA_API_VERSION") {
            self.api_version = version;
        }
        if let Ok(provider) = std::env::var("OMETA_AUTH_PROVIDER") {
            self.auth_provider_type = provider.parse()?;
        }
        Ok(())
    }

    /// Check the endpoint parses and the selected provider has its credentials
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api_endpoint).map_err(|e| {
            OmetaError::Config(format!("invalid api_endpoint {:?}: {}", self.api_endpoint, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(OmetaError::Config(format!(
                "api_endpoint must be http or https, got {}",
                url.scheme()
            )));
        }
        if self.api_version.trim().is_empty() || self.api_version.contains('/') {
            return Err(OmetaError::Config(format!(
                "invalid api_version {:?}",
                self.api_version
            )));
        }

        let require = |field: &Option<String>, name: &str| {
            if field.as_deref().map_or(true, str::is_empty) {
                Err(OmetaError::Config(format!(
                    "{} is required for the {:?} auth provider",
                    name, self.auth_provider_type
                )))
            } else {
                Ok(())
            }
        };

        match self.auth_provider_type {
            AuthProviderType::NoAuth | AuthProviderType::Google => Ok(()),
            AuthProviderType::Okta => {
                require(&self.client_id, "client_id")?;
                require(&self.client_secret, "client_secret")?;
                require(&self.org_url, "org_url")
            },
            AuthProviderType::Auth0 => {
                require(&self.client_id, "client_id")?;
                require(&self.client_secret, "client_secret")?;
                require(&self.domain, "domain")
            },
        }
    }

    /// Fixed per-client connection settings
    pub fn client_config(&self) -> Result<ClientConfig> {
        let base_url = Url::parse(&self.api_endpoint)
            .map_err(|e| OmetaError::Config(format!("invalid api_endpoint: {}", e)))?;

        Ok(ClientConfig {
            base_url,
            api_version: self.api_version.clone(),
            auth_header: self.auth_header.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

/// Connection settings fixed for the lifetime of one client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub api_version: String,
    pub auth_header: String,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Absolute URL for a path relative to `{base_url}/{api_version}`
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            self.api_version,
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_yaml() {
        let config: MetadataServerConfig =
            serde_yaml::from_str("api_endpoint: http://catalog:8585/api\n").unwrap();
        assert_eq!(config.api_version, "v1");
        assert_eq!(config.auth_provider_type, AuthProviderType::NoAuth);
        assert_eq!(config.auth_header, DEFAULT_AUTH_HEADER);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_okta_requires_credentials() {
        let config: MetadataServerConfig = serde_yaml::from_str(
            "api_endpoint: https://catalog/api\nauth_provider_type: okta\nclient_id: abc\n",
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("client_secret"));
    }

    #[test]
    fn test_rejects_bad_endpoint() {
        let config = MetadataServerConfig {
            api_endpoint: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(OmetaError::Config(_))));
    }

    #[test]
    fn test_url_for_joins_version() {
        let config = MetadataServerConfig {
            api_endpoint: "http://localhost:8585/api/".to_string(),
            ..Default::default()
        };
        let client = config.client_config().unwrap();
        assert_eq!(
            client.url_for("/tables/name/db.orders"),
            "http://localhost:8585/api/v1/tables/name/db.orders"
        );
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir()
            .join(format!("ometa-{}", uuid::Uuid::new_v4()))
            .join("config.yaml");
        let config = MetadataServerConfig {
            api_endpoint: "https://catalog.internal/api".to_string(),
            auth_provider_type: AuthProviderType::Auth0,
            client_id: Some("ingestion".to_string()),
            client_secret: Some("secret".to_string()),
            domain: Some("tenant.auth0.com".to_string()),
            timeout_secs: 5,
            ..Default::default()
        };

        config.save(&path).unwrap();
        let loaded = MetadataServerConfig::load(&path).unwrap();
        assert_eq!(loaded.domain.as_deref(), Some("tenant.auth0.com"));
        assert_eq!(loaded.timeout_secs, 5);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_provider_names() {
        assert_eq!("auth0".parse::<AuthProviderType>().unwrap(), AuthProviderType::Auth0);
        assert_eq!("no-auth".parse::<AuthProviderType>().unwrap(), AuthProviderType::NoAuth);
        assert!("saml".parse::<AuthProviderType>().is_err());
    }
}
