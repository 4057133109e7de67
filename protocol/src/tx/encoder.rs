//! Wire encoding of transactions.

use super::error::TxError;
use super::types::UnsignedTx;

/// Serialises a transaction into the bytes a node accepts.
pub trait TxEncoder: Send + Sync {
    fn encode(&self, tx: &UnsignedTx) -> Result<Vec<u8>, TxError>;

    /// Inverse of [`TxEncoder::encode`].
    fn decode(&self, bytes: &[u8]) -> Result<UnsignedTx, TxError>;
}

/// Compact, deterministic binary encoding via `bincode`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeTxEncoder;

impl TxEncoder for BincodeTxEncoder {
    fn encode(&self, tx: &UnsignedTx) -> Result<Vec<u8>, TxError> {
        bincode::serialize(tx).map_err(|e| TxError::Encoding(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<UnsignedTx, TxError> {
        bincode::deserialize(bytes).map_err(|e| TxError::Encoding(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::address;
    use crate::tx::{Coin, MsgSend, TxFactory};

    fn sample() -> UnsignedTx {
        let from = address::encode("cosmos", &[1u8; 20]).unwrap();
        let to = address::encode("cosmos", &[2u8; 20]).unwrap();
        TxFactory::new()
            .with_gas(100_000)
            .with_memo("m")
            .build_unsigned_tx(vec![MsgSend::new(from, to, Coin::new("uatom", 42)).into()])
            .unwrap()
    }

    #[test]
    fn encoding_is_deterministic() {
        let enc = BincodeTxEncoder;
        assert_eq!(enc.encode(&sample()).unwrap(), enc.encode(&sample()).unwrap());
    }

    #[test]
    fn decode_recovers_transaction() {
        let enc = BincodeTxEncoder;
        let bytes = enc.encode(&sample()).unwrap();
        assert_eq!(enc.decode(&bytes).unwrap(), sample());
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            BincodeTxEncoder.decode(&[0xff; 3]),
            Err(TxError::Encoding(_))
        ));
    }
}
