//! Chain-native transaction types.
//!
//! These mirror the shape of an SDK transaction closely enough that the
//! sign-bytes and wire bytes carry the same information a full node would
//! check: a body with messages and memo, auth info with the fee, and an
//! (initially empty) signature list.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::TxError;
use crate::config::{MAX_DENOM_LENGTH, MIN_DENOM_LENGTH, MSG_SEND_AMINO_TYPE};
use crate::crypto::address;

// ---------------------------------------------------------------------------
// Coin
// ---------------------------------------------------------------------------

/// An amount of a single denomination.
///
/// `amount` is an integer in the smallest unit. It is serialised as a
/// decimal string, the way the SDK does, so JSON consumers never round it
/// through a float. Fields are declared in sorted order because amino
/// JSON sign-bytes serialise coins as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    /// Amount in the smallest unit of `denom`.
    #[serde(with = "amount_string")]
    pub amount: u128,
    /// Denomination, e.g. `uatom`.
    pub denom: String,
}

impl Coin {
    /// Creates a new coin.
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            amount,
            denom: denom.into(),
        }
    }

    /// Checks the denom grammar `[a-zA-Z][a-zA-Z0-9/:._-]{2,127}`.
    pub fn validate_denom(denom: &str) -> Result<(), TxError> {
        let len = denom.len();
        let mut chars = denom.chars();
        let first_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
        let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || "/:._-".contains(c));

        if !first_ok || !rest_ok || !(MIN_DENOM_LENGTH..=MAX_DENOM_LENGTH).contains(&len) {
            return Err(TxError::InvalidDenom(denom.to_string()));
        }
        Ok(())
    }

    /// Validates a coin that moves value: valid denom and non-zero amount.
    pub fn validate_positive(&self) -> Result<(), TxError> {
        Self::validate_denom(&self.denom)?;
        if self.amount == 0 {
            return Err(TxError::InvalidAmount(format!("0{}", self.denom)));
        }
        Ok(())
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// Serde adapter storing a `u128` as a decimal string.
mod amount_string {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<u128>().map_err(D::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Bank send: move `amount` from `from_address` to `to_address`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSend {
    pub from_address: String,
    pub to_address: String,
    pub amount: Vec<Coin>,
}

impl MsgSend {
    /// Creates a send of a single coin.
    pub fn new(from: impl Into<String>, to: impl Into<String>, coin: Coin) -> Self {
        Self {
            from_address: from.into(),
            to_address: to.into(),
            amount: vec![coin],
        }
    }

    /// Stateless validation, equivalent to the SDK's `ValidateBasic`.
    pub fn validate_basic(&self, bech32_prefix: &str) -> Result<(), TxError> {
        address::validate(&self.from_address, bech32_prefix).map_err(|source| {
            TxError::InvalidAddress {
                field: "from",
                source,
            }
        })?;
        address::validate(&self.to_address, bech32_prefix).map_err(|source| {
            TxError::InvalidAddress {
                field: "to",
                source,
            }
        })?;

        if self.amount.is_empty() {
            return Err(TxError::InvalidAmount("no coins".into()));
        }
        for coin in &self.amount {
            coin.validate_positive()?;
        }
        Ok(())
    }
}

/// A transaction message. Only bank sends are built by this adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Msg {
    Send(MsgSend),
}

impl Msg {
    /// Stateless validation of the wrapped message.
    pub fn validate_basic(&self, bech32_prefix: &str) -> Result<(), TxError> {
        match self {
            Self::Send(msg) => msg.validate_basic(bech32_prefix),
        }
    }

    /// The address that must sign this message.
    pub fn signer(&self) -> &str {
        match self {
            Self::Send(msg) => &msg.from_address,
        }
    }

    /// Registered amino type name of the message.
    pub fn amino_type(&self) -> &'static str {
        match self {
            Self::Send(_) => MSG_SEND_AMINO_TYPE,
        }
    }
}

impl From<MsgSend> for Msg {
    fn from(msg: MsgSend) -> Self {
        Self::Send(msg)
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// Fee paid by the transaction: coins plus the gas limit they buy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    pub amount: Vec<Coin>,
    pub gas_limit: u64,
}

/// The signed-over body of a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxBody {
    pub messages: Vec<Msg>,
    pub memo: String,
    /// Block height after which the transaction is invalid; 0 disables it.
    pub timeout_height: u64,
}

/// Fee and signer metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthInfo {
    pub fee: Fee,
}

/// A transaction that has been built but carries no signatures yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTx {
    pub body: TxBody,
    pub auth_info: AuthInfo,
    /// Always empty until signatures are combined in.
    pub signatures: Vec<Vec<u8>>,
}

impl UnsignedTx {
    /// Distinct signer addresses in message order.
    pub fn signers(&self) -> Vec<&str> {
        let mut signers: Vec<&str> = Vec::new();
        for msg in &self.body.messages {
            let signer = msg.signer();
            if !signers.contains(&signer) {
                signers.push(signer);
            }
        }
        signers
    }
}

// ---------------------------------------------------------------------------
// Signing
// ---------------------------------------------------------------------------

/// How sign-bytes are canonicalised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignMode {
    /// No mode requested; the builder substitutes a default.
    #[default]
    #[serde(rename = "SIGN_MODE_UNSPECIFIED")]
    Unspecified,
    /// Binary sign document over the encoded body and auth info.
    #[serde(rename = "SIGN_MODE_DIRECT")]
    Direct,
    /// Sorted JSON `StdSignDoc`, understood by every legacy signer.
    #[serde(rename = "SIGN_MODE_LEGACY_AMINO_JSON")]
    LegacyAminoJson,
}

impl fmt::Display for SignMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unspecified => write!(f, "SIGN_MODE_UNSPECIFIED"),
            Self::Direct => write!(f, "SIGN_MODE_DIRECT"),
            Self::LegacyAminoJson => write!(f, "SIGN_MODE_LEGACY_AMINO_JSON"),
        }
    }
}

/// Per-signer data bound into the sign-bytes to prevent replay across
/// chains, accounts and sequences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerData {
    pub chain_id: String,
    pub account_number: u64,
    pub sequence: u64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> String {
        address::encode("cosmos", &[byte; 20]).unwrap()
    }

    #[test]
    fn coin_amount_serializes_as_string() {
        let coin = Coin::new("uatom", 340_282_366_920_938_463_463_374_607_431_768_211_455);
        let json = serde_json::to_value(&coin).unwrap();
        assert_eq!(
            json["amount"],
            "340282366920938463463374607431768211455"
        );
        let back: Coin = serde_json::from_value(json).unwrap();
        assert_eq!(back, coin);
    }

    #[test]
    fn coin_rejects_non_numeric_amount() {
        let res: Result<Coin, _> =
            serde_json::from_value(serde_json::json!({"denom": "uatom", "amount": "-5"}));
        assert!(res.is_err());
    }

    #[test]
    fn denom_grammar() {
        assert!(Coin::validate_denom("uatom").is_ok());
        assert!(Coin::validate_denom("ibc/27394FB092D2ECCD56123C74F36E4C1F926001CEADA9CA97EA622B25F41E5EB2").is_ok());
        assert!(Coin::validate_denom("at").is_err());
        assert!(Coin::validate_denom("1atom").is_err());
        assert!(Coin::validate_denom("atom$").is_err());
        assert!(Coin::validate_denom(&"a".repeat(129)).is_err());
    }

    #[test]
    fn zero_coin_is_not_positive() {
        assert!(matches!(
            Coin::new("uatom", 0).validate_positive(),
            Err(TxError::InvalidAmount(_))
        ));
    }

    #[test]
    fn msg_send_validate_basic_ok() {
        let msg = MsgSend::new(addr(1), addr(2), Coin::new("uatom", 100));
        assert!(msg.validate_basic("cosmos").is_ok());
    }

    #[test]
    fn msg_send_rejects_malformed_from() {
        let msg = MsgSend::new("addrA", addr(2), Coin::new("uatom", 100));
        assert!(matches!(
            msg.validate_basic("cosmos"),
            Err(TxError::InvalidAddress { field: "from", .. })
        ));
    }

    #[test]
    fn msg_send_rejects_foreign_prefix() {
        let msg = MsgSend::new(addr(1), addr(2), Coin::new("uatom", 100));
        assert!(matches!(
            msg.validate_basic("osmo"),
            Err(TxError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn signers_are_deduplicated() {
        let send = MsgSend::new(addr(1), addr(2), Coin::new("uatom", 1));
        let tx = UnsignedTx {
            body: TxBody {
                messages: vec![send.clone().into(), send.into()],
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(tx.signers(), vec![addr(1).as_str()]);
    }

    #[test]
    fn sign_mode_wire_names() {
        assert_eq!(
            serde_json::to_value(SignMode::LegacyAminoJson).unwrap(),
            "SIGN_MODE_LEGACY_AMINO_JSON"
        );
        let mode: SignMode = serde_json::from_value(serde_json::json!("SIGN_MODE_DIRECT")).unwrap();
        assert_eq!(mode, SignMode::Direct);
        assert_eq!(SignMode::default(), SignMode::Unspecified);
        assert_eq!(SignMode::Direct.to_string(), "SIGN_MODE_DIRECT");
    }
}
