//! Error types for chain transaction construction.
//!
//! Every failure while validating messages, building the unsigned
//! transaction, encoding it or producing sign-bytes is a [`TxError`]. The
//! construction service reports all of them as a transaction build error.

use thiserror::Error;

use super::types::SignMode;
use crate::crypto::AddressError;

/// Errors that can occur while building or encoding a transaction.
#[derive(Debug, Error, PartialEq)]
pub enum TxError {
    /// A message address failed Bech32 validation.
    #[error("invalid {field} address: {source}")]
    InvalidAddress {
        /// Which message field held the address.
        field: &'static str,
        /// The underlying decode failure.
        source: AddressError,
    },

    /// A coin amount was zero, negative or otherwise unusable.
    #[error("invalid coin amount: {0}")]
    InvalidAmount(String),

    /// A coin denom does not match the SDK's denom grammar.
    #[error("invalid denom '{0}'")]
    InvalidDenom(String),

    /// The memo exceeds the chain's memo limit.
    #[error("memo too long: {len} characters (max {max})")]
    MemoTooLong {
        /// Memo length in characters.
        len: usize,
        /// Configured maximum.
        max: usize,
    },

    /// A transaction was built without messages.
    #[error("transaction contains no messages")]
    NoMessages,

    /// The gas hint cannot be turned into a gas limit.
    #[error("invalid gas: {0}")]
    InvalidGas(String),

    /// The sign-mode handler does not implement the requested mode.
    #[error("sign mode {0} is not supported")]
    UnsupportedSignMode(SignMode),

    /// Serialisation of the transaction or a sign document failed.
    #[error("encoding failed: {0}")]
    Encoding(String),
}
