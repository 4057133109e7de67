// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Rosetta Construction Core Library
//!
//! The transaction-construction half of the Rosetta API for a Cosmos-SDK
//! network. Wallets and exchanges describe a transfer as two abstract
//! operations; this crate turns that into the chain's native unsigned
//! transaction and the SHA-256 digest to sign, without ever touching a
//! private key.
//!
//! ## Architecture
//!
//! - **construction**: The pipeline and the Rosetta endpoint service.
//! - **tx**: Chain-native messages, transactions, encoding and sign modes.
//! - **client**: Chain access: account state and node info over LCD.
//! - **crypto**: SHA-256, secp256k1 public keys, Bech32 addresses.
//! - **types**: Rosetta request, response and error shapes.
//! - **config**: Wire keys, defaults and limits.
//!
//! ## Design Philosophy
//!
//! 1. Stateless per request; the service holds only configuration.
//! 2. Every failure maps to one stable Rosetta error code.
//! 3. Keys never enter the process. Only public keys and digests do.

pub mod client;
pub mod config;
pub mod construction;
pub mod crypto;
pub mod tx;
pub mod types;
