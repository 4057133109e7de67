//! Unsigned transaction construction via a factory.
//!
//! The [`TxFactory`] carries everything about a transaction that is not a
//! message: the signer's account number and sequence, the chain id, gas,
//! fees, memo and the sign mode the signer will use. Set the fields, hand
//! it the messages, and get back a validated [`UnsignedTx`].
//!
//! The factory never signs. [`TxFactory::sign_bytes`] resolves its sign
//! mode against a [`SignModeHandler`] and asks the handler for the bytes;
//! an unspecified mode falls back to the handler's default.

use super::error::TxError;
use super::sign_mode::SignModeHandler;
use super::types::{AuthInfo, Coin, Fee, Msg, SignMode, SignerData, TxBody, UnsignedTx};
use crate::config::{DEFAULT_BECH32_PREFIX, MAX_MEMO_CHARACTERS};

/// Fluent builder for [`UnsignedTx`] instances.
///
/// # Usage
///
/// ```rust,no_run
/// use rosetta_protocol::tx::{Coin, MsgSend, SignMode, TxFactory};
///
/// let factory = TxFactory::new()
///     .with_chain_id("cosmoshub-4")
///     .with_account_number(7)
///     .with_sequence(3)
///     .with_gas(200_000)
///     .with_memo("invoice 42")
///     .with_sign_mode(SignMode::LegacyAminoJson);
///
/// let msg = MsgSend::new("cosmos1...", "cosmos1...", Coin::new("uatom", 100));
/// let tx = factory.build_unsigned_tx(vec![msg.into()]).unwrap();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TxFactory {
    account_number: u64,
    sequence: u64,
    chain_id: String,
    gas: u64,
    fees: Vec<Coin>,
    memo: String,
    timeout_height: u64,
    sign_mode: SignMode,
    bech32_prefix: String,
}

impl Default for TxFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl TxFactory {
    /// Creates a factory with zeroed account data, no fees, an empty memo
    /// and an unspecified sign mode.
    pub fn new() -> Self {
        Self {
            account_number: 0,
            sequence: 0,
            chain_id: String::new(),
            gas: 0,
            fees: Vec::new(),
            memo: String::new(),
            timeout_height: 0,
            sign_mode: SignMode::Unspecified,
            bech32_prefix: DEFAULT_BECH32_PREFIX.to_string(),
        }
    }

    pub fn with_account_number(mut self, account_number: u64) -> Self {
        self.account_number = account_number;
        self
    }

    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn with_chain_id(mut self, chain_id: impl Into<String>) -> Self {
        self.chain_id = chain_id.into();
        self
    }

    /// Sets the gas limit.
    pub fn with_gas(mut self, gas: u64) -> Self {
        self.gas = gas;
        self
    }

    /// Sets the fee coins. The adapter itself never sets fees; callers that
    /// pay a fee attach it here.
    pub fn with_fees(mut self, fees: Vec<Coin>) -> Self {
        self.fees = fees;
        self
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    /// Sets the block height after which the transaction is invalid.
    pub fn with_timeout_height(mut self, height: u64) -> Self {
        self.timeout_height = height;
        self
    }

    pub fn with_sign_mode(mut self, mode: SignMode) -> Self {
        self.sign_mode = mode;
        self
    }

    /// Sets the prefix message addresses are validated against.
    pub fn with_bech32_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.bech32_prefix = prefix.into();
        self
    }

    /// The signer data the sign-bytes are bound to.
    pub fn signer_data(&self) -> SignerData {
        SignerData {
            chain_id: self.chain_id.clone(),
            account_number: self.account_number,
            sequence: self.sequence,
        }
    }

    /// Validates the messages and memo and assembles an [`UnsignedTx`].
    ///
    /// Each message passes its stateless `validate_basic` against the
    /// factory's Bech32 prefix. The resulting transaction has an empty
    /// signature list.
    pub fn build_unsigned_tx(&self, msgs: Vec<Msg>) -> Result<UnsignedTx, TxError> {
        if msgs.is_empty() {
            return Err(TxError::NoMessages);
        }
        for msg in &msgs {
            msg.validate_basic(&self.bech32_prefix)?;
        }

        let memo_len = self.memo.chars().count();
        if memo_len > MAX_MEMO_CHARACTERS {
            return Err(TxError::MemoTooLong {
                len: memo_len,
                max: MAX_MEMO_CHARACTERS,
            });
        }

        Ok(UnsignedTx {
            body: TxBody {
                messages: msgs,
                memo: self.memo.clone(),
                timeout_height: self.timeout_height,
            },
            auth_info: AuthInfo {
                fee: Fee {
                    amount: self.fees.clone(),
                    gas_limit: self.gas,
                },
            },
            signatures: Vec::new(),
        })
    }

    /// The mode `handler` will be asked for: the factory's own, or the
    /// handler's default when unspecified.
    pub fn resolve_sign_mode(&self, handler: &dyn SignModeHandler) -> Result<SignMode, TxError> {
        let mode = match self.sign_mode {
            SignMode::Unspecified => handler.default_mode(),
            mode => mode,
        };
        if !handler.modes().contains(&mode) {
            return Err(TxError::UnsupportedSignMode(mode));
        }
        Ok(mode)
    }

    /// Sign-bytes of `tx` for this factory's signer, with the mode used.
    pub fn sign_bytes(
        &self,
        handler: &dyn SignModeHandler,
        tx: &UnsignedTx,
    ) -> Result<(SignMode, Vec<u8>), TxError> {
        let mode = self.resolve_sign_mode(handler)?;
        let bytes = handler.get_sign_bytes(mode, &self.signer_data(), tx)?;
        Ok((mode, bytes))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
