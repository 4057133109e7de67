//! The construction service: Rosetta's eight construction endpoints.
//!
//! | Endpoint     | Mode    | Behaviour                                      |
//! |--------------|---------|------------------------------------------------|
//! | `preprocess` | offline | operations -> options                          |
//! | `metadata`   | online  | options + chain state -> metadata              |
//! | `payloads`   | offline | operations + metadata -> unsigned tx + payload |
//! | `derive`     | offline | public key -> account address                  |
//! | `combine`    | -       | not implemented                                |
//! | `hash`       | -       | not implemented                                |
//! | `parse`      | -       | not implemented                                |
//! | `submit`     | -       | not implemented                                |
//!
//! Every endpoint returns a [`RosettaError`] on failure.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::client::ChainClient;
use crate::config::{ServiceConfig, MAX_MEMO_CHARACTERS, METADATA_VERSION};
use crate::crypto::{account_address, Secp256k1PublicKey};
use crate::types::{
    AccountIdentifier, ConstructionCombineRequest, ConstructionCombineResponse,
    ConstructionDeriveRequest, ConstructionDeriveResponse, ConstructionHashRequest,
    ConstructionMetadataRequest, ConstructionMetadataResponse, ConstructionOptions,
    ConstructionParseRequest, ConstructionParseResponse, ConstructionPayloadsRequest,
    ConstructionPayloadsResponse, ConstructionPreprocessRequest, ConstructionPreprocessResponse,
    ConstructionSubmitRequest, CurveType, RosettaError, TransactionIdentifierResponse,
};

use super::assembler;
use super::error::ConstructionError;
use super::metadata::{MetadataResolver, TransactionMetadata};
use super::operations::extract_transfer;
use super::signing::signing_payload;

/// The Rosetta construction API surface.
#[async_trait]
pub trait ConstructionApi: Send + Sync {
    async fn preprocess(
        &self,
        request: ConstructionPreprocessRequest,
    ) -> Result<ConstructionPreprocessResponse, RosettaError>;

    async fn metadata(
        &self,
        request: ConstructionMetadataRequest,
    ) -> Result<ConstructionMetadataResponse, RosettaError>;

    async fn payloads(
        &self,
        request: ConstructionPayloadsRequest,
    ) -> Result<ConstructionPayloadsResponse, RosettaError>;

    async fn derive(
        &self,
        request: ConstructionDeriveRequest,
    ) -> Result<ConstructionDeriveResponse, RosettaError>;

    async fn combine(
        &self,
        request: ConstructionCombineRequest,
    ) -> Result<ConstructionCombineResponse, RosettaError>;

    async fn hash(
        &self,
        request: ConstructionHashRequest,
    ) -> Result<TransactionIdentifierResponse, RosettaError>;

    async fn parse(
        &self,
        request: ConstructionParseRequest,
    ) -> Result<ConstructionParseResponse, RosettaError>;

    async fn submit(
        &self,
        request: ConstructionSubmitRequest,
    ) -> Result<TransactionIdentifierResponse, RosettaError>;
}

/// [`ConstructionApi`] backed by a [`ChainClient`].
///
/// Holds only immutable state, so one instance is shared by every request.
pub struct ConstructionService {
    client: Arc<dyn ChainClient>,
    config: ServiceConfig,
}

const _: fn() = || {
    fn assert_impl<T: ConstructionApi + Send + Sync + 'static>() {}
    assert_impl::<ConstructionService>();
};

impl ConstructionService {
    pub fn new(client: Arc<dyn ChainClient>, config: ServiceConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn report(endpoint: &str, err: ConstructionError) -> RosettaError {
        warn!(endpoint, code = err.code(), error = %err, "construction request failed");
        err.into()
    }

    fn do_preprocess(
        &self,
        request: ConstructionPreprocessRequest,
    ) -> Result<ConstructionPreprocessResponse, ConstructionError> {
        if request.operations.len() != 2 {
            return Err(ConstructionError::Interpreting(format!(
                "expected 2 operations, got {}",
                request.operations.len()
            )));
        }

        let intent = extract_transfer(&request.operations)?;
        if intent.from_address.is_empty() {
            return Err(ConstructionError::InvalidAddress(
                "sender address is empty".into(),
            ));
        }

        let memo = request
            .metadata
            .and_then(|m| m.memo)
            .ok_or_else(|| ConstructionError::InvalidMemo("memo is missing".into()))?;
        let memo_len = memo.chars().count();
        if memo_len > MAX_MEMO_CHARACTERS {
            return Err(ConstructionError::InvalidMemo(format!(
                "memo is {} characters, limit is {}",
                memo_len, MAX_MEMO_CHARACTERS
            )));
        }

        let gas = request
            .suggested_fee_multiplier
            .unwrap_or(self.config.default_gas as f64);

        Ok(ConstructionPreprocessResponse {
            options: Some(ConstructionOptions {
                version: METADATA_VERSION,
                address: Some(intent.from_address),
                memo: Some(memo),
                gas: Some(gas),
            }),
            required_public_keys: None,
        })
    }

    async fn do_metadata(
        &self,
        request: ConstructionMetadataRequest,
    ) -> Result<ConstructionMetadataResponse, ConstructionError> {
        let resolver = MetadataResolver::new(self.client.as_ref(), self.config.client_timeout)
            .with_bech32_prefix(&self.config.bech32_prefix);
        let metadata = resolver.resolve(request.options.as_ref()).await?;

        Ok(ConstructionMetadataResponse {
            metadata: metadata.into(),
            suggested_fee: None,
        })
    }

    fn do_payloads(
        &self,
        request: ConstructionPayloadsRequest,
    ) -> Result<ConstructionPayloadsResponse, ConstructionError> {
        let intent = extract_transfer(&request.operations)?;

        let wire = request
            .metadata
            .ok_or_else(|| ConstructionError::Interpreting("metadata is missing".into()))?;
        let metadata = TransactionMetadata::try_from(wire)?;

        let tx_config = self.client.tx_config();
        let assembled =
            assembler::build(&intent, &metadata, tx_config.as_ref(), &self.config.bech32_prefix)?;

        Ok(ConstructionPayloadsResponse {
            unsigned_transaction: hex::encode(&assembled.tx_bytes),
            payloads: assembled
                .tx
                .signers()
                .into_iter()
                .map(|signer| signing_payload(signer, &assembled.sign_bytes))
                .collect(),
        })
    }

    fn do_derive(
        &self,
        request: ConstructionDeriveRequest,
    ) -> Result<ConstructionDeriveResponse, ConstructionError> {
        let public_key = request.public_key;
        if public_key.curve_type != CurveType::Secp256k1 {
            return Err(ConstructionError::UnsupportedCurve(
                public_key.curve_type.to_string(),
            ));
        }

        let key = Secp256k1PublicKey::from_hex(&public_key.hex_bytes)?;
        let address = account_address(&self.config.bech32_prefix, &key)
            .map_err(|e| ConstructionError::InvalidAddress(e.to_string()))?;

        Ok(ConstructionDeriveResponse {
            account_identifier: Some(AccountIdentifier::new(address)),
            metadata: None,
        })
    }
}

#[async_trait]
impl ConstructionApi for ConstructionService {
    async fn preprocess(
        &self,
        request: ConstructionPreprocessRequest,
    ) -> Result<ConstructionPreprocessResponse, RosettaError> {
        debug!(operations = request.operations.len(), "/construction/preprocess");
        self.do_preprocess(request)
            .map_err(|e| Self::report("preprocess", e))
    }

    async fn metadata(
        &self,
        request: ConstructionMetadataRequest,
    ) -> Result<ConstructionMetadataResponse, RosettaError> {
        debug!(options = ?request.options, "/construction/metadata");
        self.do_metadata(request)
            .await
            .map_err(|e| Self::report("metadata", e))
    }

    async fn payloads(
        &self,
        request: ConstructionPayloadsRequest,
    ) -> Result<ConstructionPayloadsResponse, RosettaError> {
        debug!(operations = request.operations.len(), "/construction/payloads");
        self.do_payloads(request)
            .map_err(|e| Self::report("payloads", e))
    }

    async fn derive(
        &self,
        request: ConstructionDeriveRequest,
    ) -> Result<ConstructionDeriveResponse, RosettaError> {
        debug!(curve = %request.public_key.curve_type, "/construction/derive");
        self.do_derive(request)
            .map_err(|e| Self::report("derive", e))
    }

    async fn combine(
        &self,
        _request: ConstructionCombineRequest,
    ) -> Result<ConstructionCombineResponse, RosettaError> {
        Err(ConstructionError::NotImplemented.into())
    }

    async fn hash(
        &self,
        _request: ConstructionHashRequest,
    ) -> Result<TransactionIdentifierResponse, RosettaError> {
        Err(ConstructionError::NotImplemented.into())
    }

    async fn parse(
        &self,
        _request: ConstructionParseRequest,
    ) -> Result<ConstructionParseResponse, RosettaError> {
        Err(ConstructionError::NotImplemented.into())
    }

    async fn submit(
        &self,
        _request: ConstructionSubmitRequest,
    ) -> Result<TransactionIdentifierResponse, RosettaError> {
        Err(ConstructionError::NotImplemented.into())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
