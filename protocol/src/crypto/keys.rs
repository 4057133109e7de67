//! # secp256k1 Public Keys
//!
//! Clients hand `/construction/derive` a public key in either SEC1 form:
//! 33-byte compressed (`02`/`03` prefix) or 65-byte uncompressed (`04`
//! prefix). Account addresses are always derived from the compressed form,
//! so the first thing we do is parse the point and re-serialise it
//! compressed. Two encodings of the same point therefore always yield the
//! same address.
//!
//! Parsing goes through `k256`, which rejects off-curve points and the
//! identity; we never accept key bytes we have not decoded.

use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::PublicKey;
use std::fmt;
use thiserror::Error;

use crate::config::COMPRESSED_PUBKEY_LENGTH;

/// Errors that can occur while parsing public key material.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("public key bytes are empty")]
    Empty,

    #[error("public key is not valid hex: {0}")]
    InvalidHex(String),

    #[error("invalid secp256k1 public key ({len} bytes): not a valid SEC1 point")]
    InvalidPublicKey { len: usize },
}

/// A validated secp256k1 public key, held in compressed SEC1 form.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Secp256k1PublicKey([u8; COMPRESSED_PUBKEY_LENGTH]);

impl Secp256k1PublicKey {
    /// Parse a compressed or uncompressed SEC1 encoding.
    ///
    /// # Example
    ///
    /// ```
    /// use rosetta_protocol::crypto::keys::Secp256k1PublicKey;
    ///
    /// // The secp256k1 generator point, compressed.
    /// let g = hex::decode(
    ///     "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
    /// ).unwrap();
    /// let key = Secp256k1PublicKey::from_sec1_bytes(&g).unwrap();
    /// assert_eq!(key.as_bytes().as_slice(), g.as_slice());
    /// ```
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.is_empty() {
            return Err(KeyError::Empty);
        }

        let invalid = || KeyError::InvalidPublicKey { len: bytes.len() };
        let point = PublicKey::from_sec1_bytes(bytes).map_err(|_| invalid())?;
        let compressed = point.to_encoded_point(true);
        let array: [u8; COMPRESSED_PUBKEY_LENGTH] =
            compressed.as_bytes().try_into().map_err(|_| invalid())?;

        Ok(Self(array))
    }

    /// Parse a hex-encoded SEC1 key, as carried in Rosetta `PublicKey`s.
    pub fn from_hex(hex_bytes: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_bytes).map_err(|e| KeyError::InvalidHex(e.to_string()))?;
        Self::from_sec1_bytes(&bytes)
    }

    /// Returns the compressed SEC1 bytes.
    pub fn as_bytes(&self) -> &[u8; COMPRESSED_PUBKEY_LENGTH] {
        &self.0
    }

    /// Returns the compressed key as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Secp256k1PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secp256k1PublicKey({})", self.to_hex())
    }
}
