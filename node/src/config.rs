//! # Node Configuration
//!
//! TOML configuration file for `rosetta-node`. Every section and field is
//! optional; anything left out takes its default. CLI flags and environment
//! variables are applied on top of the file by [`NodeConfig::apply_overrides`].
//!
//! ```toml
//! [server]
//! listen_addr = "0.0.0.0"
//! port = 8080
//!
//! [metrics]
//! enabled = true
//! port = 9090
//!
//! [chain]
//! lcd_url = "http://127.0.0.1:1317"
//! bech32_prefix = "cosmos"
//! request_timeout_ms = 10000
//! default_gas = 200000
//!
//! [logging]
//! format = "json"
//! level = "rosetta_node=info"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use rosetta_protocol::config::{
    ServiceConfig, DEFAULT_BECH32_PREFIX, DEFAULT_CLIENT_TIMEOUT, DEFAULT_GAS, DEFAULT_LCD_URL,
    DEFAULT_METRICS_PORT, DEFAULT_RPC_PORT,
};
use rosetta_protocol::crypto::address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::RunArgs;
use crate::logging::{LogFormat, DEFAULT_LOG_FILTER};

/// Errors raised while loading or validating the node configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Root of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodeConfig {
    pub server: ServerSection,
    pub metrics: MetricsSection,
    pub chain: ChainSection,
    pub logging: LoggingSection,
}

/// `[server]`: the Rosetta API listener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub listen_addr: String,
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// `[metrics]`: the Prometheus listener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsSection {
    pub enabled: bool,
    pub port: u16,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            enabled: true,
            port: DEFAULT_METRICS_PORT,
        }
    }
}

/// `[chain]`: how to reach the full node and how to shape transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChainSection {
    /// Base URL of the node's LCD (REST) endpoint.
    pub lcd_url: String,
    pub bech32_prefix: String,
    /// Deadline for each chain query, in milliseconds.
    pub request_timeout_ms: u64,
    /// Gas hint used when a client sends no `suggested_fee_multiplier`.
    pub default_gas: u64,
}

impl Default for ChainSection {
    fn default() -> Self {
        Self {
            lcd_url: DEFAULT_LCD_URL.to_string(),
            bech32_prefix: DEFAULT_BECH32_PREFIX.to_string(),
            request_timeout_ms: DEFAULT_CLIENT_TIMEOUT.as_millis() as u64,
            default_gas: DEFAULT_GAS,
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    pub format: LogFormat,
    /// `EnvFilter` directives; `RUST_LOG` wins when set.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl NodeConfig {
    /// Reads and parses a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads the file named by `--config` (if any) and applies the remaining
    /// flags on top, then validates the result.
    pub fn from_args(args: &RunArgs) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_overrides(args);
        config.validate()?;
        Ok(config)
    }

    /// Applies CLI/env values that were actually given.
    pub fn apply_overrides(&mut self, args: &RunArgs) {
        if let Some(addr) = &args.listen_addr {
            self.server.listen_addr = addr.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(port) = args.metrics_port {
            self.metrics.port = port;
        }
        if args.no_metrics {
            self.metrics.enabled = false;
        }
        if let Some(url) = &args.lcd_url {
            self.chain.lcd_url = url.clone();
        }
        if let Some(prefix) = &args.bech32_prefix {
            self.chain.bech32_prefix = prefix.clone();
        }
        if let Some(ms) = args.request_timeout_ms {
            self.chain.request_timeout_ms = ms;
        }
        if let Some(gas) = args.default_gas {
            self.chain.default_gas = gas;
        }
        if let Some(format) = args.log_format {
            self.logging.format = format;
        }
        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Rejects settings the service cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = &self.chain.lcd_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "chain.lcd_url must be an http(s) URL, got {:?}",
                url
            )));
        }
        if self.chain.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "chain.request_timeout_ms must be greater than zero".into(),
            ));
        }
        if self.chain.default_gas == 0 {
            return Err(ConfigError::Invalid(
                "chain.default_gas must be greater than zero".into(),
            ));
        }
        // A prefix bech32 cannot encode would fail every derive call.
        address::encode(&self.chain.bech32_prefix, &[0u8; 20]).map_err(|e| {
            ConfigError::Invalid(format!(
                "chain.bech32_prefix {:?} is not a valid human-readable part: {}",
                self.chain.bech32_prefix, e
            ))
        })?;
        if self.metrics.enabled
            && self.metrics.port == self.server.port
            && self.server.port != 0
        {
            return Err(ConfigError::Invalid(format!(
                "metrics.port and server.port are both {}",
                self.server.port
            )));
        }
        Ok(())
    }

    /// Deadline applied to each chain query.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.chain.request_timeout_ms)
    }

    /// Settings handed to the construction service.
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig::default()
            .with_bech32_prefix(self.chain.bech32_prefix.clone())
            .with_client_timeout(self.request_timeout())
            .with_default_gas(self.chain.default_gas)
    }
}
