//! Provider and application configuration
//!
//! `Provider` carries the per-provider constants (ids, authorize endpoints,
//! default scopes, SDK script URLs); `ProviderConfig` is the immutable bundle
//! a flow runs against. The file-backed `Config` holds the backend base URL
//! and per-provider client settings in ~/.loginflow/config.json.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use crate::error::Error;
use crate::Result;

/// Supported sign-in providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    GitHub,
    Google,
}

impl Provider {
    /// Provider id as used in backend endpoint paths
    pub fn id(&self) -> &'static str {
        match self {
            Provider::GitHub => "github",
            Provider::Google => "google",
        }
    }

    /// Human-readable name for messages
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::GitHub => "GitHub",
            Provider::Google => "Google",
        }
    }

    /// The provider's OAuth2 authorization endpoint
    pub fn authorize_endpoint(&self) -> &'static str {
        match self {
            Provider::GitHub => "https://github.com/login/oauth/authorize",
            Provider::Google => "https://accounts.google.com/o/oauth2/v2/auth",
        }
    }

    /// Default OAuth scope requested for this provider
    pub fn default_scope(&self) -> &'static str {
        match self {
            Provider::GitHub => "user:email",
            Provider::Google => "openid email profile",
        }
    }

    /// URL of the provider's client script, if it ships one
    pub fn sdk_script_url(&self) -> Option<&'static str> {
        match self {
            Provider::GitHub => None,
            Provider::Google => Some("https://accounts.google.com/gsi/client"),
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "github" => Ok(Provider::GitHub),
            "google" => Ok(Provider::Google),
            other => Err(Error::Config(format!("Unknown provider: {}", other))),
        }
    }
}

/// Immutable per-provider flow configuration
///
/// Supplied at construction; strategies and the backend client only read it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub provider: Provider,

    /// OAuth client id registered with the provider
    pub client_id: String,

    /// Where the provider sends the user back after authorization
    pub redirect_uri: String,

    /// Space-separated OAuth scopes
    pub scope: String,

    /// Backend path that returns `{"auth_url": ...}`
    pub auth_url_path: String,

    /// Backend path that exchanges a credential for session tokens
    pub login_path: String,
}

impl ProviderConfig {
    /// Create a config with the backend's default endpoint paths and the
    /// provider's default scope
    pub fn new(provider: Provider, client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        let id = provider.id();
        Self {
            provider,
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            scope: provider.default_scope().to_string(),
            auth_url_path: format!("/accounts/api/{}-auth-url/", id),
            login_path: format!("/accounts/api/{}-login/", id),
        }
    }

    /// Override the requested scope
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Build the provider authorization URL locally, without asking the
    /// backend for it
    ///
    /// Google flows also request offline access and a consent prompt so a
    /// refresh token is issued.
    pub fn authorize_url(&self) -> Result<String> {
        if self.client_id.is_empty() {
            return Err(Error::Config(format!(
                "{} OAuth client id is not configured",
                self.provider.display_name()
            )));
        }

        let mut url = Url::parse(self.provider.authorize_endpoint())
            .map_err(|e| Error::OAuth(format!("Invalid authorize endpoint: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("scope", &self.scope)
            .append_pair("response_type", "code");

        if self.provider == Provider::Google {
            url.query_pairs_mut()
                .append_pair("access_type", "offline")
                .append_pair("prompt", "consent");
        }

        Ok(url.to_string())
    }
}

/// Application configuration stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend base URL, e.g. "https://api.example.com"
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub github: ClientSettings,

    #[serde(default)]
    pub google: ClientSettings,
}

/// Per-provider OAuth client settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientSettings {
    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub redirect_uri: String,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            github: ClientSettings::default(),
            google: ClientSettings::default(),
        }
    }
}

impl Config {
    /// Build the flow configuration for one provider
    pub fn provider_config(&self, provider: Provider) -> ProviderConfig {
        let settings = match provider {
            Provider::GitHub => &self.github,
            Provider::Google => &self.google,
        };
        ProviderConfig::new(provider, settings.client_id.clone(), settings.redirect_uri.clone())
    }
}

/// Get the config directory path
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".loginflow")
}

/// Get the config file path
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Load configuration from file
pub fn load() -> Result<Config> {
    let path = config_path();

    if !path.exists() {
        return Err(Error::Config(format!(
            "Config not found at {:?}. Run 'loginflow init' first.",
            path
        )));
    }

    let content = std::fs::read_to_string(&path)?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save(config: &Config) -> Result<()> {
    let path = config_path();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, content)?;
    Ok(())
}
