//! CLI configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tez_sdk::ConfirmationPolicy;

use crate::CliError;

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// RPC endpoint URL
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Faucet A credentials file
    #[serde(default = "default_faucet_a")]
    pub faucet_a: PathBuf,
    /// Faucet B credentials file
    #[serde(default = "default_faucet_b")]
    pub faucet_b: PathBuf,
    /// Deployment record of the token
    #[serde(default = "default_deployment")]
    pub deployment: PathBuf,
    /// Blocks to wait for, counting the including block
    #[serde(default = "default_confirmations")]
    pub confirmations: u32,
    /// Seconds between head polls
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Seconds before giving up on a confirmation
    #[serde(default = "default_confirmation_timeout")]
    pub confirmation_timeout_secs: u64,
}

fn default_rpc_url() -> String {
    "https://api.tez.ie/rpc/babylonnet".to_string()
}

fn default_faucet_a() -> PathBuf {
    PathBuf::from("faucetA.json")
}

fn default_faucet_b() -> PathBuf {
    PathBuf::from("faucetB.json")
}

fn default_deployment() -> PathBuf {
    PathBuf::from("deployed/fa12_latest.json")
}

fn default_confirmations() -> u32 {
    1
}

fn default_poll_interval() -> u64 {
    5
}

fn default_confirmation_timeout() -> u64 {
    180
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            faucet_a: default_faucet_a(),
            faucet_b: default_faucet_b(),
            deployment: default_deployment(),
            confirmations: default_confirmations(),
            poll_interval_secs: default_poll_interval(),
            confirmation_timeout_secs: default_confirmation_timeout(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".tez-fa12"))
    }

    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// Load config from `path` (or the default location)
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::config_path) else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        toml::from_str(&content)
            .map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save config to `path` (or the default location)
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf, CliError> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(Self::config_path)
            .ok_or_else(|| CliError::Config("cannot determine config path".to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| CliError::Config(e.to_string()))?;
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Confirmation policy for submitted operations
    pub fn policy(&self) -> ConfirmationPolicy {
        ConfirmationPolicy {
            confirmations: self.confirmations,
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            timeout: Duration::from_secs(self.confirmation_timeout_secs),
        }
    }
}
