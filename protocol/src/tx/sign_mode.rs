//! # Sign-Bytes
//!
//! A sign mode decides which bytes a signer commits to. Two are supported:
//!
//! - `SIGN_MODE_DIRECT`: a binary [`SignDoc`] over the encoded body and
//!   auth info plus the signer data.
//! - `SIGN_MODE_LEGACY_AMINO_JSON`: the classic `StdSignDoc`, a JSON object
//!   with alphabetically ordered keys, no whitespace and every integer
//!   rendered as a string.
//!
//! Both bind chain id, account number and sequence so a signature cannot be
//! replayed on another chain, account or nonce.

use serde::Serialize;

use super::error::TxError;
use super::types::{Coin, Msg, SignMode, SignerData, UnsignedTx};

/// Produces the bytes a signer signs for a given mode.
pub trait SignModeHandler: Send + Sync {
    /// Mode used when the caller does not specify one.
    fn default_mode(&self) -> SignMode;

    /// Modes this handler can produce sign-bytes for.
    fn modes(&self) -> &[SignMode];

    fn get_sign_bytes(
        &self,
        mode: SignMode,
        data: &SignerData,
        tx: &UnsignedTx,
    ) -> Result<Vec<u8>, TxError>;
}

/// Handler implementing `DIRECT` and `LEGACY_AMINO_JSON`, defaulting to
/// the latter.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdSignModeHandler;

const STD_MODES: [SignMode; 2] = [SignMode::Direct, SignMode::LegacyAminoJson];

impl SignModeHandler for StdSignModeHandler {
    fn default_mode(&self) -> SignMode {
        SignMode::LegacyAminoJson
    }

    fn modes(&self) -> &[SignMode] {
        &STD_MODES
    }

    fn get_sign_bytes(
        &self,
        mode: SignMode,
        data: &SignerData,
        tx: &UnsignedTx,
    ) -> Result<Vec<u8>, TxError> {
        match mode {
            SignMode::Direct => direct_sign_bytes(data, tx),
            SignMode::LegacyAminoJson => amino_json_sign_bytes(data, tx),
            SignMode::Unspecified => Err(TxError::UnsupportedSignMode(mode)),
        }
    }
}

// ---------------------------------------------------------------------------
// DIRECT
// ---------------------------------------------------------------------------

/// Binary sign document.
#[derive(Debug, Serialize)]
pub struct SignDoc {
    pub body_bytes: Vec<u8>,
    pub auth_info_bytes: Vec<u8>,
    pub chain_id: String,
    pub account_number: u64,
    pub sequence: u64,
}

fn direct_sign_bytes(data: &SignerData, tx: &UnsignedTx) -> Result<Vec<u8>, TxError> {
    let encode = |e: bincode::Error| TxError::Encoding(e.to_string());
    let doc = SignDoc {
        body_bytes: bincode::serialize(&tx.body).map_err(encode)?,
        auth_info_bytes: bincode::serialize(&tx.auth_info).map_err(encode)?,
        chain_id: data.chain_id.clone(),
        account_number: data.account_number,
        sequence: data.sequence,
    };
    bincode::serialize(&doc).map_err(encode)
}

// ---------------------------------------------------------------------------
// LEGACY_AMINO_JSON
// ---------------------------------------------------------------------------

// Field declaration order is the serialisation order, so every struct below
// lists its fields alphabetically.

#[derive(Serialize)]
struct StdSignDoc<'a> {
    account_number: String,
    chain_id: &'a str,
    fee: StdFee<'a>,
    memo: &'a str,
    msgs: Vec<AminoMsg<'a>>,
    sequence: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout_height: Option<String>,
}

#[derive(Serialize)]
struct StdFee<'a> {
    amount: &'a [Coin],
    gas: String,
}

#[derive(Serialize)]
struct AminoMsg<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: AminoMsgValue<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum AminoMsgValue<'a> {
    Send {
        amount: &'a [Coin],
        from_address: &'a str,
        to_address: &'a str,
    },
}

impl<'a> From<&'a Msg> for AminoMsg<'a> {
    fn from(msg: &'a Msg) -> Self {
        let value = match msg {
            Msg::Send(send) => AminoMsgValue::Send {
                amount: &send.amount,
                from_address: &send.from_address,
                to_address: &send.to_address,
            },
        };
        Self {
            kind: msg.amino_type(),
            value,
        }
    }
}

fn amino_json_sign_bytes(data: &SignerData, tx: &UnsignedTx) -> Result<Vec<u8>, TxError> {
    let doc = StdSignDoc {
        account_number: data.account_number.to_string(),
        chain_id: &data.chain_id,
        fee: StdFee {
            amount: &tx.auth_info.fee.amount,
            gas: tx.auth_info.fee.gas_limit.to_string(),
        },
        memo: &tx.body.memo,
        msgs: tx.body.messages.iter().map(AminoMsg::from).collect(),
        sequence: data.sequence.to_string(),
        timeout_height: (tx.body.timeout_height != 0)
            .then(|| tx.body.timeout_height.to_string()),
    };
    serde_json::to_vec(&doc).map_err(|e| TxError::Encoding(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::address;
    use crate::tx::{MsgSend, TxFactory};

    fn from() -> String {
        address::encode("cosmos", &[1u8; 20]).unwrap()
    }

    fn to() -> String {
        address::encode("cosmos", &[2u8; 20]).unwrap()
    }

    fn factory() -> TxFactory {
        TxFactory::new()
            .with_chain_id("test-chain")
            .with_account_number(7)
            .with_sequence(3)
            .with_gas(200_000)
            .with_memo("hi")
    }

    fn tx() -> UnsignedTx {
        factory()
            .build_unsigned_tx(vec![MsgSend::new(from(), to(), Coin::new("uatom", 100)).into()])
            .unwrap()
    }

    #[test]
    fn amino_json_is_canonical() {
        let bytes = StdSignModeHandler
            .get_sign_bytes(SignMode::LegacyAminoJson, &factory().signer_data(), &tx())
            .unwrap();
        let expected = format!(
            concat!(
                r#"{{"account_number":"7","chain_id":"test-chain","#,
                r#""fee":{{"amount":[],"gas":"200000"}},"memo":"hi","#,
                r#""msgs":[{{"type":"cosmos-sdk/MsgSend","value":{{"#,
                r#""amount":[{{"amount":"100","denom":"uatom"}}],"#,
                r#""from_address":"{}","to_address":"{}"}}}}],"sequence":"3"}}"#
            ),
            from(),
            to()
        );
        assert_eq!(String::from_utf8(bytes).unwrap(), expected);
    }

    #[test]
    fn amino_json_includes_timeout_height_when_set() {
        let tx = factory()
            .with_timeout_height(50)
            .build_unsigned_tx(vec![MsgSend::new(from(), to(), Coin::new("uatom", 1)).into()])
            .unwrap();
        let bytes = StdSignModeHandler
            .get_sign_bytes(SignMode::LegacyAminoJson, &factory().signer_data(), &tx)
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["timeout_height"], "50");
    }

    #[test]
    fn direct_binds_signer_data() {
        let handler = StdSignModeHandler;
        let a = handler
            .get_sign_bytes(SignMode::Direct, &factory().signer_data(), &tx())
            .unwrap();
        let b = handler
            .get_sign_bytes(
                SignMode::Direct,
                &factory().with_sequence(4).signer_data(),
                &tx(),
            )
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn modes_differ() {
        let handler = StdSignModeHandler;
        let data = factory().signer_data();
        let direct = handler.get_sign_bytes(SignMode::Direct, &data, &tx()).unwrap();
        let amino = handler
            .get_sign_bytes(SignMode::LegacyAminoJson, &data, &tx())
            .unwrap();
        assert_ne!(direct, amino);
    }

    #[test]
    fn unspecified_mode_rejected() {
        assert_eq!(
            StdSignModeHandler.get_sign_bytes(
                SignMode::Unspecified,
                &factory().signer_data(),
                &tx()
            ),
            Err(TxError::UnsupportedSignMode(SignMode::Unspecified))
        );
    }

    #[test]
    fn advertised_modes() {
        let handler = StdSignModeHandler;
        assert_eq!(handler.default_mode(), SignMode::LegacyAminoJson);
        assert!(handler.modes().contains(&SignMode::LegacyAminoJson));
        assert!(!handler.modes().contains(&SignMode::Unspecified));
    }
}
