//! Client configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Environment variable overriding `api.base_url`
pub const ENV_API_URL: &str = "STUDIO_API_URL";

/// Environment variable overriding `api.signup_path`
pub const ENV_SIGNUP_PATH: &str = "STUDIO_SIGNUP_PATH";

/// Client configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Signup API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Authorization policy configuration
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// Where and how to reach the signup endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend, without a trailing slash
    pub base_url: String,

    /// Path of the signup endpoint
    #[serde(default = "default_signup_path")]
    pub signup_path: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_signup_path() -> String {
    "/auth".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            signup_path: default_signup_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    /// Full URL of the signup endpoint
    pub fn signup_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if self.signup_path.starts_with('/') {
            format!("{}{}", base, self.signup_path)
        } else {
            format!("{}/{}", base, self.signup_path)
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// How to resolve a role set where one role grants project creation and
/// another is explicitly refused it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContestedRoles {
    #[default]
    Allow,
    Deny,
}

/// Authorization policy configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub contested_roles: ContestedRoles,
}

impl ClientConfig {
    /// Load configuration from file, falling back to defaults when absent
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_toml()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply `STUDIO_*` environment overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(ENV_API_URL) {
            if !url.trim().is_empty() {
                self.api.base_url = url.trim().to_string();
            }
        }
        if let Ok(path) = std::env::var(ENV_SIGNUP_PATH) {
            if !path.trim().is_empty() {
                self.api.signup_path = path.trim().to_string();
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::InvalidConfig(format!(
                "api.base_url must be an http(s) URL, got {:?}",
                self.api.base_url
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(Error::InvalidConfig("api.timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

/// Default config file location: `$HOME/.studio/config.toml`
pub fn default_config_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".studio")
        .join("config.toml")
}
