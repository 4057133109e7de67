//! Operation interpretation: a two-leg transfer into a [`TransferIntent`].
//!
//! A transfer is expressed as exactly two `Transfer` operations: a debit
//! (negative amount) on the sender and a credit (positive amount) on the
//! receiver, in the same currency, summing to zero. Leg order is free; the
//! sign decides which side is which.
//!
//! Address format is not checked here. Preprocess rejects an empty sender and
//! message validation rejects malformed Bech32 when the transaction is built.

use crate::config::OPERATION_TRANSFER;
use crate::types::{Currency, Operation};

use super::error::ConstructionError;

/// A single-currency transfer extracted from an operation pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferIntent {
    pub from_address: String,
    pub to_address: String,
    /// Magnitude in the smallest unit of `denom`.
    pub amount: u128,
    pub denom: String,
}

/// True if the operation's type names a transfer (ASCII case-insensitive).
pub fn is_transfer(op: &Operation) -> bool {
    op.operation_type.eq_ignore_ascii_case(OPERATION_TRANSFER)
}

/// Rejects lists that are not exactly two transfer operations.
pub fn ensure_transfer_pair(operations: &[Operation]) -> Result<(), ConstructionError> {
    if operations.len() != 2 {
        return Err(ConstructionError::InvalidOperation(format!(
            "expected 2 operations, got {}",
            operations.len()
        )));
    }
    if let Some(op) = operations.iter().find(|op| !is_transfer(op)) {
        return Err(ConstructionError::InvalidOperation(format!(
            "operation {} has type '{}', expected '{}'",
            op.operation_identifier.index, op.operation_type, OPERATION_TRANSFER
        )));
    }
    Ok(())
}

struct Leg<'a> {
    address: &'a str,
    value: i128,
    currency: &'a Currency,
}

fn leg(op: &Operation) -> Result<Leg<'_>, ConstructionError> {
    let index = op.operation_identifier.index;
    let invalid = |reason: &str| {
        ConstructionError::InvalidOperation(format!("operation {}: {}", index, reason))
    };

    let account = op.account.as_ref().ok_or_else(|| invalid("missing account"))?;
    let amount = op.amount.as_ref().ok_or_else(|| invalid("missing amount"))?;
    let value = amount
        .value
        .parse::<i128>()
        .map_err(|_| invalid(&format!("amount '{}' is not an integer", amount.value)))?;
    if value == 0 {
        return Err(invalid("amount is zero"));
    }

    Ok(Leg {
        address: &account.address,
        value,
        currency: &amount.currency,
    })
}

/// Extracts the transfer described by a debit/credit operation pair.
pub fn extract_transfer(operations: &[Operation]) -> Result<TransferIntent, ConstructionError> {
    ensure_transfer_pair(operations)?;

    let a = leg(&operations[0])?;
    let b = leg(&operations[1])?;

    if a.value.checked_neg() != Some(b.value) {
        return Err(ConstructionError::InvalidOperation(format!(
            "amounts {} and {} do not sum to zero",
            a.value, b.value
        )));
    }
    if a.currency.symbol != b.currency.symbol || a.currency.decimals != b.currency.decimals {
        return Err(ConstructionError::InvalidOperation(format!(
            "currency mismatch: {}/{} vs {}/{}",
            a.currency.symbol, a.currency.decimals, b.currency.symbol, b.currency.decimals
        )));
    }
    if a.address == b.address {
        return Err(ConstructionError::InvalidOperation(
            "sender and receiver are the same account".into(),
        ));
    }

    let (debit, credit) = if a.value < 0 { (a, b) } else { (b, a) };

    Ok(TransferIntent {
        from_address: debit.address.to_string(),
        to_address: credit.address.to_string(),
        amount: credit.value.unsigned_abs(),
        denom: credit.currency.symbol.clone(),
    })
}
