//! # Chain Client
//!
//! The construction pipeline needs exactly three things from the chain:
//! an account's number and sequence, the network's chain id, and the
//! transaction encoding configuration. [`ChainClient`] is that seam. The
//! service only ever sees `Arc<dyn ChainClient>`, so tests substitute a
//! double and production uses [`LcdClient`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::tx::TxConfig;

pub mod lcd;

pub use lcd::LcdClient;

/// On-chain account state relevant to signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub address: String,
    pub account_number: u64,
    pub sequence: u64,
}

/// Status of the node the client talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    /// Network name; on SDK chains this is the chain id.
    pub network: String,
    pub moniker: Option<String>,
}

/// Errors that can occur while talking to the chain.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("node returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode node response: {0}")]
    Decode(String),

    #[error("account {0} not found")]
    AccountNotFound(String),

    #[error("chain call timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid node URL {0:?}")]
    InvalidUrl(String),
}

/// Read access to chain state needed for transaction construction.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Account number and sequence of `address`, at `height` or the latest
    /// block when `None`.
    async fn account_info(
        &self,
        address: &str,
        height: Option<u64>,
    ) -> Result<AccountInfo, ClientError>;

    /// Current node status.
    async fn status(&self) -> Result<NodeStatus, ClientError>;

    /// Encoder and sign-mode handler of the connected chain.
    fn tx_config(&self) -> Arc<dyn TxConfig>;
}
