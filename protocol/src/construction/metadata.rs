//! Metadata resolution: options plus chain state into [`TransactionMetadata`].
//!
//! Resolution checks the options in a fixed order, interleaved with the two
//! chain lookups:
//!
//! ```text
//! options empty?      -> Interpreting
//! address missing?    -> InvalidAddress
//! address malformed?  -> InvalidAddress
//! account_info        -> ChainCommunication on failure
//! gas missing?        -> MissingGasOption
//! memo missing?       -> InvalidMemo
//! status              -> ChainCommunication on failure
//! ```
//!
//! Each chain call runs under the service's client timeout. Nothing is
//! retried; a client may retry the whole request when the error says so.

use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::client::{ChainClient, ClientError};
use crate::config::{DEFAULT_BECH32_PREFIX, METADATA_VERSION};
use crate::crypto::address;
use crate::tx::SignMode;
use crate::types::{ConstructionMetadata, ConstructionOptions};

use super::error::ConstructionError;

/// Everything the assembler needs besides the transfer itself.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionMetadata {
    pub account_number: u64,
    pub sequence: u64,
    pub chain_id: String,
    /// Gas hint from preprocess, passed through unchanged.
    pub gas: f64,
    pub memo: String,
    pub sign_mode: Option<SignMode>,
}

impl TryFrom<ConstructionMetadata> for TransactionMetadata {
    type Error = ConstructionError;

    fn try_from(wire: ConstructionMetadata) -> Result<Self, Self::Error> {
        if wire.version > METADATA_VERSION {
            return Err(ConstructionError::Interpreting(format!(
                "metadata version {} is newer than supported version {}",
                wire.version, METADATA_VERSION
            )));
        }
        let missing =
            |field: &str| ConstructionError::Interpreting(format!("metadata is missing '{}'", field));

        Ok(Self {
            account_number: wire.account_number.ok_or_else(|| missing("account_number"))?,
            sequence: wire.sequence.ok_or_else(|| missing("sequence"))?,
            chain_id: wire.chain_id.ok_or_else(|| missing("chain_id"))?,
            gas: wire.gas.ok_or_else(|| missing("gas"))?,
            memo: wire.memo.ok_or_else(|| missing("memo"))?,
            sign_mode: wire.sign_mode,
        })
    }
}

impl From<TransactionMetadata> for ConstructionMetadata {
    fn from(meta: TransactionMetadata) -> Self {
        Self {
            version: METADATA_VERSION,
            account_number: Some(meta.account_number),
            sequence: Some(meta.sequence),
            chain_id: Some(meta.chain_id),
            gas: Some(meta.gas),
            memo: Some(meta.memo),
            sign_mode: meta.sign_mode,
        }
    }
}

/// Runs a chain call under `timeout`, mapping expiry to [`ClientError::Timeout`].
pub async fn with_deadline<T, F>(timeout: Duration, call: F) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| ClientError::Timeout(timeout))?
}

/// Builds [`TransactionMetadata`] from options and chain state.
pub struct MetadataResolver<'a> {
    client: &'a dyn ChainClient,
    timeout: Duration,
    bech32_prefix: &'a str,
}

impl<'a> MetadataResolver<'a> {
    pub fn new(client: &'a dyn ChainClient, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            bech32_prefix: DEFAULT_BECH32_PREFIX,
        }
    }

    /// Prefix the `address` option must carry.
    pub fn with_bech32_prefix(mut self, prefix: &'a str) -> Self {
        self.bech32_prefix = prefix;
        self
    }

    pub async fn resolve(
        &self,
        options: Option<&ConstructionOptions>,
    ) -> Result<TransactionMetadata, ConstructionError> {
        let options = match options {
            Some(opts) if !opts.is_empty() => opts,
            _ => {
                return Err(ConstructionError::Interpreting(
                    "options are empty".into(),
                ))
            }
        };
        if options.version > METADATA_VERSION {
            return Err(ConstructionError::Interpreting(format!(
                "options version {} is newer than supported version {}",
                options.version, METADATA_VERSION
            )));
        }

        let address = options
            .address
            .as_deref()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| ConstructionError::InvalidAddress("address option is missing".into()))?;
        // The address ends up in the LCD request path.
        address::validate(address, self.bech32_prefix)
            .map_err(|e| ConstructionError::InvalidAddress(e.to_string()))?;

        let account = with_deadline(self.timeout, self.client.account_info(address, None)).await?;
        debug!(
            address,
            account_number = account.account_number,
            sequence = account.sequence,
            "resolved account"
        );

        let gas = options.gas.ok_or(ConstructionError::MissingGasOption)?;
        let memo = options
            .memo
            .clone()
            .ok_or_else(|| ConstructionError::InvalidMemo("memo option is missing".into()))?;

        let status = with_deadline(self.timeout, self.client.status()).await?;

        Ok(TransactionMetadata {
            account_number: account.account_number,
            sequence: account.sequence,
            chain_id: status.network,
            gas,
            memo,
            sign_mode: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{AccountInfo, NodeStatus};
    use crate::tx::{StdTxConfig, TxConfig};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts calls so tests can assert which lookups happened.
    #[derive(Default)]
    struct CountingClient {
        account_calls: AtomicUsize,
        status_calls: AtomicUsize,
        fail_account: bool,
        fail_status: bool,
        stall: bool,
    }

    #[async_trait]
    impl ChainClient for CountingClient {
        async fn account_info(
            &self,
            address: &str,
            _height: Option<u64>,
        ) -> Result<AccountInfo, ClientError> {
            self.account_calls.fetch_add(1, Ordering::SeqCst);
            if self.stall {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            if self.fail_account {
                return Err(ClientError::AccountNotFound(address.into()));
            }
            Ok(AccountInfo {
                address: address.into(),
                account_number: 12,
                sequence: 4,
            })
        }

        async fn status(&self) -> Result<NodeStatus, ClientError> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_status {
                return Err(ClientError::Decode("bad node_info".into()));
            }
            Ok(NodeStatus {
                network: "test-chain".into(),
                moniker: None,
            })
        }

        fn tx_config(&self) -> Arc<dyn TxConfig> {
            Arc::new(StdTxConfig::new())
        }
    }

    fn sender() -> String {
        address::encode("cosmos", &[1u8; 20]).unwrap()
    }

    fn full_options() -> ConstructionOptions {
        ConstructionOptions {
            address: Some(sender()),
            memo: Some("m".into()),
            gas: Some(1.5),
            ..Default::default()
        }
    }

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn resolves_full_metadata() {
        let client = CountingClient::default();
        let meta = MetadataResolver::new(&client, TIMEOUT)
            .resolve(Some(&full_options()))
            .await
            .unwrap();
        assert_eq!(
            meta,
            TransactionMetadata {
                account_number: 12,
                sequence: 4,
                chain_id: "test-chain".into(),
                gas: 1.5,
                memo: "m".into(),
                sign_mode: None,
            }
        );
    }

    #[tokio::test]
    async fn empty_options_fail_before_any_lookup() {
        let client = CountingClient::default();
        let resolver = MetadataResolver::new(&client, TIMEOUT);
        for options in [None, Some(ConstructionOptions::default())] {
            assert!(matches!(
                resolver.resolve(options.as_ref()).await,
                Err(ConstructionError::Interpreting(_))
            ));
        }
        assert_eq!(client.account_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_address_fails_before_lookup() {
        let client = CountingClient::default();
        let options = ConstructionOptions {
            address: None,
            ..full_options()
        };
        let res = MetadataResolver::new(&client, TIMEOUT).resolve(Some(&options)).await;
        assert!(matches!(res, Err(ConstructionError::InvalidAddress(_))));
        assert_eq!(client.account_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_address_fails_before_lookup() {
        let client = CountingClient::default();
        let resolver = MetadataResolver::new(&client, TIMEOUT);
        let wrong_prefix = address::encode("osmo", &[1u8; 20]).unwrap();
        for bad in [
            "x/../../../../base/tendermint/v1beta1/node_info",
            "cosmos1notbech32",
            wrong_prefix.as_str(),
        ] {
            let options = ConstructionOptions {
                address: Some(bad.to_string()),
                ..full_options()
            };
            let res = resolver.resolve(Some(&options)).await;
            assert!(
                matches!(res, Err(ConstructionError::InvalidAddress(_))),
                "{bad}"
            );
        }
        assert_eq!(client.account_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn configured_prefix_is_enforced() {
        let client = CountingClient::default();
        let options = ConstructionOptions {
            address: Some(address::encode("osmo", &[1u8; 20]).unwrap()),
            ..full_options()
        };
        let meta = MetadataResolver::new(&client, TIMEOUT)
            .with_bech32_prefix("osmo")
            .resolve(Some(&options))
            .await
            .unwrap();
        assert_eq!(meta.account_number, 12);

        let res = MetadataResolver::new(&client, TIMEOUT)
            .with_bech32_prefix("osmo")
            .resolve(Some(&full_options()))
            .await;
        assert!(matches!(res, Err(ConstructionError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn account_lookup_precedes_gas_check() {
        let client = CountingClient {
            fail_account: true,
            ..Default::default()
        };
        let options = ConstructionOptions {
            gas: None,
            ..full_options()
        };
        let res = MetadataResolver::new(&client, TIMEOUT).resolve(Some(&options)).await;
        assert!(matches!(res, Err(ConstructionError::ChainCommunication(_))));
    }

    #[tokio::test]
    async fn missing_gas_is_its_own_kind() {
        let client = CountingClient::default();
        let options = ConstructionOptions {
            gas: None,
            memo: None,
            ..full_options()
        };
        let res = MetadataResolver::new(&client, TIMEOUT).resolve(Some(&options)).await;
        assert!(matches!(res, Err(ConstructionError::MissingGasOption)));
        assert_eq!(client.account_calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.status_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_memo_precedes_status() {
        let client = CountingClient {
            fail_status: true,
            ..Default::default()
        };
        let options = ConstructionOptions {
            memo: None,
            ..full_options()
        };
        let res = MetadataResolver::new(&client, TIMEOUT).resolve(Some(&options)).await;
        assert!(matches!(res, Err(ConstructionError::InvalidMemo(_))));
        assert_eq!(client.status_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn status_failure_is_chain_error() {
        let client = CountingClient {
            fail_status: true,
            ..Default::default()
        };
        let res = MetadataResolver::new(&client, TIMEOUT)
            .resolve(Some(&full_options()))
            .await;
        assert!(matches!(res, Err(ConstructionError::ChainCommunication(_))));
    }

    #[tokio::test]
    async fn newer_options_version_rejected() {
        let client = CountingClient::default();
        let options = ConstructionOptions {
            version: METADATA_VERSION + 1,
            ..full_options()
        };
        let res = MetadataResolver::new(&client, TIMEOUT).resolve(Some(&options)).await;
        assert!(matches!(res, Err(ConstructionError::Interpreting(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_chain_times_out() {
        let client = CountingClient {
            stall: true,
            ..Default::default()
        };
        let res = MetadataResolver::new(&client, Duration::from_millis(100))
            .resolve(Some(&full_options()))
            .await;
        assert!(matches!(
            res,
            Err(ConstructionError::ChainCommunication(ClientError::Timeout(_)))
        ));
    }

    #[test]
    fn wire_conversion_requires_every_field() {
        let full: ConstructionMetadata = TransactionMetadata {
            account_number: 1,
            sequence: 2,
            chain_id: "c".into(),
            gas: 3.0,
            memo: "m".into(),
            sign_mode: Some(SignMode::Direct),
        }
        .into();
        assert!(TransactionMetadata::try_from(full.clone()).is_ok());

        let without_chain = ConstructionMetadata {
            chain_id: None,
            ..full.clone()
        };
        assert!(matches!(
            TransactionMetadata::try_from(without_chain),
            Err(ConstructionError::Interpreting(_))
        ));

        let future = ConstructionMetadata {
            version: METADATA_VERSION + 1,
            ..full
        };
        assert!(TransactionMetadata::try_from(future).is_err());
    }
}
