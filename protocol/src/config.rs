//! # Adapter Configuration & Constants
//!
//! Defaults, limits and protocol names used by the construction pipeline.
//! The option and metadata field names themselves are fixed by the serde
//! shapes in [`crate::types`].

use std::time::Duration;

// ---------------------------------------------------------------------------
// Wire Values
// ---------------------------------------------------------------------------

/// Operation type name for a balance transfer leg.
pub const OPERATION_TRANSFER: &str = "Transfer";

/// Schema version stamped on options and metadata objects. Objects without a
/// version are read as this version; newer versions are rejected.
pub const METADATA_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// The only curve accepted by `/construction/derive`.
pub const SUPPORTED_CURVE: &str = "secp256k1";

/// Compressed secp256k1 public key length.
pub const COMPRESSED_PUBKEY_LENGTH: usize = 33;

/// Length of the digest handed to the external signer.
pub const SIGNING_HASH_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Chain Parameters
// ---------------------------------------------------------------------------

/// Bech32 human-readable prefix for account addresses on the Cosmos Hub.
pub const DEFAULT_BECH32_PREFIX: &str = "cosmos";

/// Gas hint used when the client does not send a `suggested_fee_multiplier`.
///
/// Whichever value ends up in the `gas` option is read as a gas amount and
/// truncated to the transaction's gas limit; there is no price multiplier.
pub const DEFAULT_GAS: u64 = 200_000;

/// Maximum memo length in characters, matching the SDK's auth module
/// `MaxMemoCharacters` default.
pub const MAX_MEMO_CHARACTERS: usize = 256;

/// Maximum denom length accepted in a coin (SDK `reDnmString`).
pub const MAX_DENOM_LENGTH: usize = 128;

/// Minimum denom length accepted in a coin.
pub const MIN_DENOM_LENGTH: usize = 3;

/// Amino type name for a bank send message.
pub const MSG_SEND_AMINO_TYPE: &str = "cosmos-sdk/MsgSend";

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// Upper bound on a single chain-client call. The pipeline never retries,
/// so this is also the worst-case latency a chain outage adds to a request.
pub const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connect timeout for the LCD HTTP client.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

// ---------------------------------------------------------------------------
// Network Parameters
// ---------------------------------------------------------------------------

/// Default Rosetta API port (the Rosetta reference implementations use 8080).
pub const DEFAULT_RPC_PORT: u16 = 8080;

/// Default metrics (Prometheus) port.
pub const DEFAULT_METRICS_PORT: u16 = 9090;

/// Default LCD endpoint of a local full node.
pub const DEFAULT_LCD_URL: &str = "http://127.0.0.1:1317";

// ---------------------------------------------------------------------------
// ServiceConfig
// ---------------------------------------------------------------------------

/// Runtime settings of the construction service.
///
/// Built by the node from its config file and CLI flags; tests construct it
/// directly or take the [`Default`].
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Bech32 prefix for derived and validated account addresses.
    pub bech32_prefix: String,
    /// Deadline applied to each chain-client call.
    pub client_timeout: Duration,
    /// Gas hint emitted by `Preprocess` when the client supplies none, in
    /// the same gas units as a supplied `suggested_fee_multiplier`.
    pub default_gas: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bech32_prefix: DEFAULT_BECH32_PREFIX.to_string(),
            client_timeout: DEFAULT_CLIENT_TIMEOUT,
            default_gas: DEFAULT_GAS,
        }
    }
}

impl ServiceConfig {
    /// Replaces the Bech32 prefix.
    pub fn with_bech32_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.bech32_prefix = prefix.into();
        self
    }

    /// Replaces the chain-client deadline.
    pub fn with_client_timeout(mut self, timeout: Duration) -> Self {
        self.client_timeout = timeout;
        self
    }

    /// Replaces the default gas hint.
    pub fn with_default_gas(mut self, gas: u64) -> Self {
        self.default_gas = gas;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_service_config() {
        let cfg = ServiceConfig::default();
        assert_eq!(cfg.bech32_prefix, "cosmos");
        assert_eq!(cfg.client_timeout, DEFAULT_CLIENT_TIMEOUT);
        assert_eq!(cfg.default_gas, DEFAULT_GAS);
    }

    #[test]
    fn test_service_config_builders() {
        let cfg = ServiceConfig::default()
            .with_bech32_prefix("osmo")
            .with_client_timeout(Duration::from_millis(250))
            .with_default_gas(1);
        assert_eq!(cfg.bech32_prefix, "osmo");
        assert_eq!(cfg.client_timeout, Duration::from_millis(250));
        assert_eq!(cfg.default_gas, 1);
    }

    #[test]
    fn test_denom_limits_sanity() {
        assert!(MIN_DENOM_LENGTH < MAX_DENOM_LENGTH);
        assert_eq!(SIGNING_HASH_LENGTH, 32);
        assert_eq!(COMPRESSED_PUBKEY_LENGTH, 33);
    }
}
