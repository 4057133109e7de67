//! Transaction configuration: which encoder and sign-mode handler a chain
//! uses.
//!
//! The chain client hands out a [`TxConfig`] so the construction service
//! never hard-codes how the connected chain encodes transactions.

use super::encoder::{BincodeTxEncoder, TxEncoder};
use super::sign_mode::{SignModeHandler, StdSignModeHandler};

/// Bundles the encoding concerns of a chain.
pub trait TxConfig: Send + Sync {
    fn sign_mode_handler(&self) -> &dyn SignModeHandler;

    fn tx_encoder(&self) -> &dyn TxEncoder;
}

/// The stock configuration: bincode wire encoding with `DIRECT` and
/// `LEGACY_AMINO_JSON` sign modes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdTxConfig {
    handler: StdSignModeHandler,
    encoder: BincodeTxEncoder,
}

impl StdTxConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TxConfig for StdTxConfig {
    fn sign_mode_handler(&self) -> &dyn SignModeHandler {
        &self.handler
    }

    fn tx_encoder(&self) -> &dyn TxEncoder {
        &self.encoder
    }
}
