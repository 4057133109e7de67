//! # Chain Transactions
//!
//! The chain-native side of construction: message and transaction types,
//! the [`TxFactory`] that assembles an [`UnsignedTx`], and the encoding
//! seams ([`TxEncoder`], [`SignModeHandler`], [`TxConfig`]) a chain client
//! supplies.
//!
//! ```text
//! Msg* ──► TxFactory::build_unsigned_tx ──► UnsignedTx
//!                                              │
//!               TxConfig::tx_encoder ◄─────────┤──► SignModeHandler::get_sign_bytes
//!                      │                                 │
//!                 wire bytes                        sign-bytes
//! ```

pub mod config;
pub mod encoder;
pub mod error;
pub mod factory;
pub mod sign_mode;
pub mod types;

pub use config::{StdTxConfig, TxConfig};
pub use encoder::{BincodeTxEncoder, TxEncoder};
pub use error::TxError;
pub use factory::TxFactory;
pub use sign_mode::{SignDoc, SignModeHandler, StdSignModeHandler};
pub use types::{AuthInfo, Coin, Fee, Msg, MsgSend, SignMode, SignerData, TxBody, UnsignedTx};
