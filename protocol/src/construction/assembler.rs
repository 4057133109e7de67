//! Transaction assembly: intent + metadata into wire bytes and sign-bytes.

use tracing::debug;

use crate::tx::{
    Coin, MsgSend, SignMode, SignerData, TxConfig, TxError, TxFactory, UnsignedTx,
};

use super::error::ConstructionError;
use super::metadata::TransactionMetadata;
use super::operations::TransferIntent;

/// Output of [`build`].
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledTx {
    pub tx: UnsignedTx,
    /// Encoded unsigned transaction.
    pub tx_bytes: Vec<u8>,
    /// Canonical bytes the sender signs.
    pub sign_bytes: Vec<u8>,
    pub signer_data: SignerData,
    pub sign_mode: SignMode,
}

/// Truncates a gas hint to an integral gas limit.
pub fn gas_limit(hint: f64) -> Result<u64, TxError> {
    if !hint.is_finite() || hint < 0.0 {
        return Err(TxError::InvalidGas(format!("{} is not a usable gas hint", hint)));
    }
    // u64::MAX as f64 rounds up to 2^64, which no u64 can hold.
    if hint >= u64::MAX as f64 {
        return Err(TxError::InvalidGas(format!("{} exceeds the gas limit range", hint)));
    }
    Ok(hint.trunc() as u64)
}

/// Builds the unsigned transaction for `intent` and produces its sign-bytes.
pub fn build(
    intent: &TransferIntent,
    metadata: &TransactionMetadata,
    tx_config: &dyn TxConfig,
    bech32_prefix: &str,
) -> Result<AssembledTx, ConstructionError> {
    let factory = TxFactory::new()
        .with_account_number(metadata.account_number)
        .with_sequence(metadata.sequence)
        .with_chain_id(metadata.chain_id.clone())
        .with_gas(gas_limit(metadata.gas)?)
        .with_memo(metadata.memo.clone())
        .with_sign_mode(metadata.sign_mode.unwrap_or_default())
        .with_bech32_prefix(bech32_prefix);

    let msg = MsgSend::new(
        intent.from_address.clone(),
        intent.to_address.clone(),
        Coin::new(intent.denom.clone(), intent.amount),
    );
    let tx = factory.build_unsigned_tx(vec![msg.into()])?;

    let tx_bytes = tx_config.tx_encoder().encode(&tx)?;
    let (sign_mode, sign_bytes) = factory.sign_bytes(tx_config.sign_mode_handler(), &tx)?;
    let signer_data = factory.signer_data();

    debug!(
        chain_id = %signer_data.chain_id,
        account_number = signer_data.account_number,
        sequence = signer_data.sequence,
        %sign_mode,
        tx_len = tx_bytes.len(),
        "assembled unsigned transaction"
    );

    Ok(AssembledTx {
        tx,
        tx_bytes,
        sign_bytes,
        signer_data,
        sign_mode,
    })
}
