//! Service configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use pulse_types::{Network, TreasuryParams};
use pulse_utils::LogFormat;

use crate::TreasuryError;

/// Configuration for the treasury service and its ledger connection.
///
/// Can be loaded from a TOML file via [`TreasuryConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TreasuryConfig {
    /// Which network the ledger node serves.
    #[serde(default)]
    pub network: Network,

    /// JSON-RPC endpoint of the ledger node. Derived from `network` when unset.
    #[serde(default)]
    pub rpc_url: Option<String>,

    #[serde(default)]
    pub rpc_user: String,

    #[serde(default)]
    pub rpc_password: String,

    /// PEM certificate to trust for the node's self-signed TLS endpoint.
    #[serde(default)]
    pub rpc_cert: Option<PathBuf>,

    /// Per-request timeout against the ledger node, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Maximum number of finished tallies kept in memory.
    #[serde(default = "default_tally_cache_capacity")]
    pub tally_cache_capacity: usize,

    #[serde(default)]
    pub params: TreasuryParams,
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_tally_cache_capacity() -> usize {
    1024
}

impl TreasuryConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, TreasuryError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| TreasuryError::Config(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, TreasuryError> {
        let config: Self = toml::from_str(s).map_err(|e| TreasuryError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, TreasuryError> {
        toml::to_string_pretty(self).map_err(|e| TreasuryError::Config(e.to_string()))
    }

    /// The configured endpoint, or the local node's default for `network`.
    pub fn resolved_rpc_url(&self) -> String {
        self.rpc_url.clone().unwrap_or_else(|| {
            format!("https://127.0.0.1:{}", self.network.default_rpc_port())
        })
    }

    fn validate(&self) -> Result<(), TreasuryError> {
        if self.tally_cache_capacity == 0 {
            return Err(TreasuryError::Config(
                "tally_cache_capacity must be at least 1".into(),
            ));
        }
        if self.params.progress_interval <= 0 {
            return Err(TreasuryError::Config(
                "params.progress_interval must be positive".into(),
            ));
        }
        if self.params.voting_interval < 0 || self.params.max_scan_span < 0 {
            return Err(TreasuryError::Config(
                "params.voting_interval and params.max_scan_span must not be negative".into(),
            ));
        }
        Ok(())
    }
}

impl Default for TreasuryConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            rpc_url: None,
            rpc_user: String::new(),
            rpc_password: String::new(),
            rpc_cert: None,
            request_timeout_secs: default_request_timeout_secs(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            tally_cache_capacity: default_tally_cache_capacity(),
            params: TreasuryParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = TreasuryConfig::default();
        let toml_str = config.to_toml_string().expect("serializable");
        let parsed = TreasuryConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.request_timeout_secs, config.request_timeout_secs);
        assert_eq!(parsed.tally_cache_capacity, config.tally_cache_capacity);
        assert_eq!(parsed.params, config.params);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = TreasuryConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.network, Network::Mainnet);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.log_format, LogFormat::Human);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.params.activation_height, 552_448);
        assert_eq!(config.resolved_rpc_url(), "https://127.0.0.1:9109");
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            network = "testnet"
            rpc_user = "alice"
            log_format = "json"
            tally_cache_capacity = 16

            [params]
            progress_interval = 10
        "#;
        let config = TreasuryConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.rpc_user, "alice");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.tally_cache_capacity, 16);
        assert_eq!(config.params.progress_interval, 10);
        assert_eq!(config.params.voting_interval, 2880); // default
        assert_eq!(config.resolved_rpc_url(), "https://127.0.0.1:19109");
    }

    #[test]
    fn explicit_rpc_url_wins() {
        let config = TreasuryConfig::from_toml_str(r#"rpc_url = "http://10.0.0.2:9109""#).unwrap();
        assert_eq!(config.resolved_rpc_url(), "http://10.0.0.2:9109");
    }

    #[test]
    fn rejects_zero_cache_capacity() {
        let err = TreasuryConfig::from_toml_str("tally_cache_capacity = 0").unwrap_err();
        assert!(matches!(err, TreasuryError::Config(_)));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pulse.toml");
        std::fs::write(&path, "request_timeout_secs = 5\n").unwrap();
        let config = TreasuryConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = TreasuryConfig::from_toml_file("/nonexistent/pulse.toml");
        assert!(matches!(result, Err(TreasuryError::Config(_))));
    }
}
