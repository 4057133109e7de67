//! Signing payloads handed to external signers.
//!
//! The adapter never sees a private key. It hashes the canonical sign-bytes
//! with SHA-256 and tells the client which account must sign the digest with
//! ECDSA over secp256k1.

use crate::config::SIGNING_HASH_LENGTH;
use crate::crypto::sha256_array;
use crate::types::{AccountIdentifier, SignatureType, SigningPayload};

/// Digest of the sign-bytes that the external signer signs.
pub fn hash_for_signing(sign_bytes: &[u8]) -> [u8; SIGNING_HASH_LENGTH] {
    sha256_array(sign_bytes)
}

/// The payload asking `signer` to sign `sign_bytes`.
pub fn signing_payload(signer: &str, sign_bytes: &[u8]) -> SigningPayload {
    SigningPayload {
        account_identifier: Some(AccountIdentifier::new(signer)),
        hex_bytes: hex::encode(hash_for_signing(sign_bytes)),
        signature_type: Some(SignatureType::Ecdsa),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_sha256() {
        assert_eq!(
            hex::encode(hash_for_signing(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn payload_targets_signer() {
        let payload = signing_payload("cosmos1sender", b"abc");
        assert_eq!(
            payload.account_identifier.unwrap().address,
            "cosmos1sender"
        );
        assert_eq!(payload.signature_type, Some(SignatureType::Ecdsa));
        assert_eq!(payload.hex_bytes.len(), 2 * SIGNING_HASH_LENGTH);
    }
}
