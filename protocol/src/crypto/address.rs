//! # Bech32 Account Addresses
//!
//! Account addresses on the target chain are Bech32 strings: a
//! human-readable prefix (`cosmos`, `osmo`, ...), the separator `1`, the
//! 5-bit-regrouped payload and a six-character checksum.
//!
//! ```text
//! compressed_pubkey (33 bytes)
//!     -> Bech32(prefix, compressed_pubkey) -> cosmos1q...
//! ```
//!
//! The payload for derived addresses is the compressed key itself, not a
//! hash of it. That is what this network's Rosetta gateway has always
//! returned from `/construction/derive`, and changing it would silently
//! hand clients different addresses for the same key.

use bech32::{Bech32, Hrp};
use thiserror::Error;

use super::keys::Secp256k1PublicKey;

/// Upper bound on decoded address payloads (SDK `VerifyAddressFormat`).
const MAX_ADDRESS_LENGTH: usize = 255;

/// Errors that can occur while encoding or validating addresses.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,

    #[error("invalid bech32 prefix '{0}'")]
    InvalidPrefix(String),

    #[error("bech32 decode error: {0}")]
    Decode(String),

    #[error("bech32 encode error: {0}")]
    Encode(String),

    #[error("invalid address prefix: expected '{expected}', got '{got}'")]
    PrefixMismatch {
        /// The prefix configured for this network.
        expected: String,
        /// The prefix found in the address.
        got: String,
    },

    #[error("invalid address payload length: {0} bytes")]
    InvalidLength(usize),
}

/// Encode raw bytes as a Bech32 string with the given prefix.
pub fn encode(prefix: &str, data: &[u8]) -> Result<String, AddressError> {
    let hrp = Hrp::parse(prefix).map_err(|_| AddressError::InvalidPrefix(prefix.to_string()))?;
    bech32::encode::<Bech32>(hrp, data).map_err(|e| AddressError::Encode(e.to_string()))
}

/// Decode and validate an account address, returning its payload bytes.
///
/// Checks the checksum, that the prefix equals `expected_prefix`
/// (case-insensitively, as Bech32 is) and that the payload length is within
/// the SDK's bounds.
pub fn decode(address: &str, expected_prefix: &str) -> Result<Vec<u8>, AddressError> {
    if address.trim().is_empty() {
        return Err(AddressError::Empty);
    }

    let (hrp, data) = bech32::decode(address).map_err(|e| AddressError::Decode(e.to_string()))?;

    let got = hrp.to_lowercase();
    if got != expected_prefix.to_lowercase() {
        return Err(AddressError::PrefixMismatch {
            expected: expected_prefix.to_string(),
            got,
        });
    }

    if data.is_empty() || data.len() > MAX_ADDRESS_LENGTH {
        return Err(AddressError::InvalidLength(data.len()));
    }

    Ok(data)
}

/// Returns `Ok(())` if `address` is a well-formed account address for the
/// network with the given prefix.
pub fn validate(address: &str, expected_prefix: &str) -> Result<(), AddressError> {
    decode(address, expected_prefix).map(|_| ())
}

/// Derive the account address of a secp256k1 public key.
pub fn account_address(prefix: &str, key: &Secp256k1PublicKey) -> Result<String, AddressError> {
    encode(prefix, key.as_bytes())
}
