//! # Construction Pipeline
//!
//! Turns an abstract two-leg transfer into a chain-native unsigned
//! transaction plus the digest an external signer must sign.
//!
//! ```text
//! operations ──► operations::extract_transfer ──► TransferIntent
//!                                                      │
//! options ──► metadata::MetadataResolver ──► TransactionMetadata
//!                   (ChainClient)                      │
//!                                                      ▼
//!                                    assembler::build (TxConfig)
//!                                                      │
//!                               tx bytes ◄─────────────┴──► sign-bytes
//!                                                               │
//!                                           signing::hash_for_signing
//! ```
//!
//! [`ConstructionService`] wires these stages to the Rosetta endpoints.

pub mod assembler;
pub mod error;
pub mod metadata;
pub mod operations;
pub mod service;
pub mod signing;

pub use error::{codes, ConstructionError};
pub use metadata::{MetadataResolver, TransactionMetadata};
pub use operations::{extract_transfer, TransferIntent};
pub use service::{ConstructionApi, ConstructionService};
pub use signing::hash_for_signing;
