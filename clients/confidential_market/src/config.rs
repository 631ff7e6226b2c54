//! Client configuration
//!
//! Loaded from JSON, with the RPC endpoint overridable from the environment.
//! Every field has a default, so an empty object is a valid config.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";

/// Environment variables consulted for the RPC endpoint, highest priority first
pub const RPC_URL_ENV_VARS: [&str; 3] = ["HELIUS_RPC_URL", "ANCHOR_PROVIDER_URL", "CONFIDENTIAL_MARKET_RPC_URL"];

/// Path to a JSON config file
pub const CONFIG_PATH_ENV_VAR: &str = "CONFIDENTIAL_MARKET_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("decrypt_backoff_secs must contain at least one attempt")]
    EmptyBackoff,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SettlementConfig {
    /// JSON-RPC endpoint of the ledger
    pub rpc_url: String,

    /// Commitment used for reads, simulations and confirmations
    pub commitment: CommitmentLevel,

    /// Confidential market program
    #[serde(with = "pubkey_string")]
    pub program_id: Pubkey,

    /// Confidential compute oracle program that owns the allowance accounts
    #[serde(with = "pubkey_string")]
    pub oracle_program_id: Pubkey,

    /// Wait before each decryption attempt, in seconds
    /// Example: [3, 5, 8, 12] is four attempts over at most 28s of waiting
    pub decrypt_backoff_secs: Vec<u64>,

    /// Ceiling on submit + confirm of a single transaction
    pub confirm_timeout_secs: u64,

    /// Ceiling on a single oracle decrypt call
    pub decrypt_timeout_secs: u64,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            commitment: CommitmentLevel::Confirmed,
            program_id: crate::ID,
            oracle_program_id: crate::inco_lightning_program_id(),
            decrypt_backoff_secs: vec![3, 5, 8, 12],
            confirm_timeout_secs: 60,
            decrypt_timeout_secs: 30,
        }
    }
}

impl SettlementConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` for environment variables
    ///
    /// The config file named by [`CONFIG_PATH_ENV_VAR`] is read first, then
    /// the first non-empty RPC variable in [`RPC_URL_ENV_VARS`] overrides its
    /// endpoint.
    pub fn from_env_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_PATH_ENV_VAR).filter(|p| !p.is_empty()) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(url) = RPC_URL_ENV_VARS
            .iter()
            .filter_map(|key| lookup(key))
            .find(|url| !url.trim().is_empty())
        {
            config.rpc_url = url.trim().to_string();
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.decrypt_backoff_secs.is_empty() {
            return Err(ConfigError::EmptyBackoff);
        }
        Ok(())
    }

    pub fn commitment_config(&self) -> CommitmentConfig {
        CommitmentConfig {
            commitment: self.commitment,
        }
    }

    pub fn decrypt_backoff(&self) -> Vec<Duration> {
        self.decrypt_backoff_secs.iter().copied().map(Duration::from_secs).collect()
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.confirm_timeout_secs)
    }

    pub fn decrypt_timeout(&self) -> Duration {
        Duration::from_secs(self.decrypt_timeout_secs)
    }
}

/// Base58 string form for pubkeys in JSON
mod pubkey_string {
    use std::str::FromStr;

    use serde::{de, Deserialize, Deserializer};
    use solana_sdk::pubkey::Pubkey;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Pubkey, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Pubkey::from_str(raw.trim()).map_err(|e| de::Error::custom(format!("invalid pubkey {raw:?}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = SettlementConfig::from_json_str("{}").unwrap();
        assert_eq!(config, SettlementConfig::default());
        assert_eq!(config.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(config.commitment, CommitmentLevel::Confirmed);
        assert_eq!(config.program_id, crate::ID);
        assert_eq!(
            config.decrypt_backoff(),
            vec![
                Duration::from_secs(3),
                Duration::from_secs(5),
                Duration::from_secs(8),
                Duration::from_secs(12)
            ]
        );
        assert_eq!(config.confirm_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_overrides() {
        let program = Pubkey::new_unique();
        let json = format!(
            r#"{{"rpc_url":"http://localhost:8899","commitment":"finalized","program_id":"{program}","decrypt_backoff_secs":[1]}}"#
        );
        let config = SettlementConfig::from_json_str(&json).unwrap();
        assert_eq!(config.rpc_url, "http://localhost:8899");
        assert_eq!(config.commitment, CommitmentLevel::Finalized);
        assert_eq!(config.program_id, program);
        assert_eq!(config.decrypt_backoff_secs, vec![1]);
        assert_eq!(config.decrypt_timeout_secs, 30);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            SettlementConfig::from_json_str(r#"{"decrypt_backoff_secs":[]}"#),
            Err(ConfigError::EmptyBackoff)
        ));
        assert!(matches!(
            SettlementConfig::from_json_str(r#"{"program_id":"not-a-key"}"#),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            SettlementConfig::from_json_str(r#"{"rpc":"typo"}"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_env_priority() {
        let vars: HashMap<&str, &str> = [
            ("ANCHOR_PROVIDER_URL", "http://anchor"),
            ("CONFIDENTIAL_MARKET_RPC_URL", "http://fallback"),
        ]
        .into_iter()
        .collect();
        let config = SettlementConfig::from_env_with(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.rpc_url, "http://anchor");

        let vars: HashMap<&str, &str> = [("HELIUS_RPC_URL", "  "), ("CONFIDENTIAL_MARKET_RPC_URL", "http://fallback")]
            .into_iter()
            .collect();
        let config = SettlementConfig::from_env_with(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.rpc_url, "http://fallback");

        let config = SettlementConfig::from_env_with(|_| None).unwrap();
        assert_eq!(config.rpc_url, DEFAULT_RPC_URL);
    }

    #[test]
    fn test_missing_config_file() {
        let err = SettlementConfig::from_env_with(|k| {
            (k == CONFIG_PATH_ENV_VAR).then(|| "/nonexistent/confidential-market.json".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
