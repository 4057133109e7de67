//! Construction errors and their Rosetta error codes.
//!
//! Every failure in the pipeline is one of ten [`ConstructionError`] kinds.
//! At the service boundary each kind becomes a [`RosettaError`] carrying a
//! stable numeric code from [`codes`], a fixed message and the detailed
//! cause as the description.

use thiserror::Error;

use crate::client::ClientError;
use crate::crypto::KeyError;
use crate::tx::TxError;
use crate::types::RosettaError;

/// Stable Rosetta error codes. Clients match on these; never renumber.
pub mod codes {
    pub const INTERPRETING: u32 = 1;
    pub const INVALID_ADDRESS: u32 = 2;
    pub const INVALID_MEMO: u32 = 3;
    pub const MISSING_GAS_OPTION: u32 = 4;
    pub const INVALID_OPERATION: u32 = 5;
    pub const INVALID_PUBLIC_KEY: u32 = 6;
    pub const UNSUPPORTED_CURVE: u32 = 7;
    pub const TRANSACTION_BUILD: u32 = 8;
    pub const CHAIN_COMMUNICATION: u32 = 9;
    pub const NOT_IMPLEMENTED: u32 = 10;
}

/// Errors produced by the construction pipeline.
#[derive(Debug, Error)]
pub enum ConstructionError {
    #[error("error interpreting request: {0}")]
    Interpreting(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid memo: {0}")]
    InvalidMemo(String),

    #[error("gas option is missing")]
    MissingGasOption,

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(#[from] KeyError),

    #[error("unsupported curve type: {0}")]
    UnsupportedCurve(String),

    #[error("error building transaction: {0}")]
    TransactionBuild(#[from] TxError),

    #[error("error communicating with chain: {0}")]
    ChainCommunication(#[from] ClientError),

    #[error("endpoint not implemented")]
    NotImplemented,
}

impl ConstructionError {
    /// Stable Rosetta code of this kind.
    pub fn code(&self) -> u32 {
        match self {
            Self::Interpreting(_) => codes::INTERPRETING,
            Self::InvalidAddress(_) => codes::INVALID_ADDRESS,
            Self::InvalidMemo(_) => codes::INVALID_MEMO,
            Self::MissingGasOption => codes::MISSING_GAS_OPTION,
            Self::InvalidOperation(_) => codes::INVALID_OPERATION,
            Self::InvalidPublicKey(_) => codes::INVALID_PUBLIC_KEY,
            Self::UnsupportedCurve(_) => codes::UNSUPPORTED_CURVE,
            Self::TransactionBuild(_) => codes::TRANSACTION_BUILD,
            Self::ChainCommunication(_) => codes::CHAIN_COMMUNICATION,
            Self::NotImplemented => codes::NOT_IMPLEMENTED,
        }
    }

    /// Fixed, human-readable message of this kind.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Interpreting(_) => "Error interpreting request",
            Self::InvalidAddress(_) => "Invalid address",
            Self::InvalidMemo(_) => "Invalid memo",
            Self::MissingGasOption => "Missing gas option",
            Self::InvalidOperation(_) => "Invalid operation",
            Self::InvalidPublicKey(_) => "Invalid public key",
            Self::UnsupportedCurve(_) => "Unsupported curve type",
            Self::TransactionBuild(_) => "Error building transaction",
            Self::ChainCommunication(_) => "Error communicating with chain",
            Self::NotImplemented => "Endpoint not implemented",
        }
    }

    /// Only chain outages are worth retrying unchanged.
    pub fn retriable(&self) -> bool {
        matches!(self, Self::ChainCommunication(_))
    }
}

impl From<ConstructionError> for RosettaError {
    fn from(err: ConstructionError) -> Self {
        let description = match err {
            ConstructionError::NotImplemented => None,
            ref other => Some(other.to_string()),
        };
        RosettaError {
            code: err.code(),
            message: err.message().to_string(),
            description,
            retriable: err.retriable(),
            details: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn every_kind() -> Vec<ConstructionError> {
        vec![
            ConstructionError::Interpreting("x".into()),
            ConstructionError::InvalidAddress("x".into()),
            ConstructionError::InvalidMemo("x".into()),
            ConstructionError::MissingGasOption,
            ConstructionError::InvalidOperation("x".into()),
            ConstructionError::InvalidPublicKey(KeyError::Empty),
            ConstructionError::UnsupportedCurve("x".into()),
            ConstructionError::TransactionBuild(TxError::NoMessages),
            ConstructionError::ChainCommunication(ClientError::Timeout(Duration::from_secs(1))),
            ConstructionError::NotImplemented,
        ]
    }

    #[test]
    fn codes_are_unique_and_sequential() {
        let codes: Vec<u32> = every_kind().iter().map(ConstructionError::code).collect();
        assert_eq!(codes, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn only_chain_errors_are_retriable() {
        for err in every_kind() {
            assert_eq!(
                err.retriable(),
                err.code() == codes::CHAIN_COMMUNICATION,
                "{}",
                err
            );
        }
    }

    #[test]
    fn converts_to_rosetta_envelope() {
        let err: RosettaError = ConstructionError::InvalidMemo("memo is missing".into()).into();
        assert_eq!(err.code, codes::INVALID_MEMO);
        assert_eq!(err.message, "Invalid memo");
        assert_eq!(err.description.as_deref(), Some("invalid memo: memo is missing"));
        assert!(!err.retriable);
    }

    #[test]
    fn not_implemented_has_no_description() {
        let err: RosettaError = ConstructionError::NotImplemented.into();
        assert_eq!(err.code, codes::NOT_IMPLEMENTED);
        assert!(err.description.is_none());
    }

    #[test]
    fn lower_layer_errors_convert() {
        let err: ConstructionError = TxError::NoMessages.into();
        assert_eq!(err.code(), codes::TRANSACTION_BUILD);
        let err: ConstructionError = KeyError::Empty.into();
        assert_eq!(err.code(), codes::INVALID_PUBLIC_KEY);
    }
}
