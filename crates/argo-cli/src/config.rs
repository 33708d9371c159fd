//! CLI configuration with environment variable priority
//!
//! Settings are resolved in this order (first found wins):
//! 1. Command-line flags
//! 2. Environment variables (ARGO_*)
//! 3. Config file (~/.config/argo-tunnels/config.toml)
//! 4. Default values (where applicable)

use std::env;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use argo_api::{Credentials, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};

/// Environment variable prefix
const ENV_PREFIX: &str = "ARGO";

/// Configuration file contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Account that owns the tunnels
    pub account_id: Option<String>,

    /// API base URL (defaults to the public API)
    pub base_url: Option<String>,

    /// Scoped API token with Argo Tunnel edit permissions
    pub api_token: Option<String>,

    /// Account email, used with `api_key` when no token is set
    pub api_email: Option<String>,

    /// Legacy global API key
    pub api_key: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Fully resolved settings
#[derive(Debug)]
pub struct ResolvedConfig {
    pub account_id: String,
    pub base_url: String,
    pub credentials: Credentials,
    pub timeout_secs: Option<u64>,
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{}_{}", ENV_PREFIX, name))
        .ok()
        .filter(|v| !v.is_empty())
}

impl CliConfig {
    /// Default config file location
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("argo-tunnels")
            .join("config.toml")
    }

    /// Load configuration from a TOML file, falling back to defaults when
    /// it is missing or unreadable
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", path.display(), e);
                }
            }
        }
        Self::default()
    }

    /// Resolve against the process environment
    pub fn resolve(self, account_override: Option<String>) -> anyhow::Result<ResolvedConfig> {
        self.resolve_with(account_override, get_env)
    }

    /// Resolve using `lookup` for `ARGO_*` variables (name without prefix)
    pub fn resolve_with<F>(
        self,
        account_override: Option<String>,
        lookup: F,
    ) -> anyhow::Result<ResolvedConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Account: flag > ENV > config > required
        let account_id = account_override
            .or_else(|| lookup("ACCOUNT_ID"))
            .or(self.account_id)
            .ok_or_else(|| {
                anyhow!("Account ID required. Use --account, set ARGO_ACCOUNT_ID, or account_id in config")
            })?;

        // Base URL: ENV > config > default
        let base_url = lookup("BASE_URL")
            .or(self.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        // Credentials: token wins over email/key, ENV before config for each
        let token = lookup("API_TOKEN").or(self.api_token);
        let email = lookup("API_EMAIL").or(self.api_email);
        let key = lookup("API_KEY").or(self.api_key);

        let credentials = match (token, email, key) {
            (Some(token), _, _) => Credentials::Token(token.trim().to_string()),
            (None, Some(email), Some(key)) => Credentials::Key {
                email,
                key: key.trim().to_string(),
            },
            _ => anyhow::bail!(
                "API credentials required. Set ARGO_API_TOKEN or api_token in config \
                 (or ARGO_API_EMAIL and ARGO_API_KEY)"
            ),
        };

        let timeout_secs = lookup("TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .or(self.timeout_secs);

        Ok(ResolvedConfig {
            account_id,
            base_url,
            credentials,
            timeout_secs,
        })
    }
}
