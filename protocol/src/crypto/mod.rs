//! # Cryptographic Helpers
//!
//! The adapter never holds private keys, so this module is small: the
//! SHA-256 digest handed to external signers, secp256k1 public-key parsing
//! for `/construction/derive`, and Bech32 address handling.
//!
//! Everything is a thin wrapper around audited crates (`sha2`, `k256`,
//! `bech32`).

pub mod address;
pub mod hash;
pub mod keys;

pub use address::{account_address, AddressError};
pub use hash::{sha256, sha256_array};
pub use keys::{KeyError, Secp256k1PublicKey};
