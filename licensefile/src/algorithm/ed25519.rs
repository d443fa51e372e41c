//! Ed25519 over a SHA-512 fingerprint.
//!
//! The 64-byte SHA-512 digest of the canonical document is signed with plain
//! Ed25519 (not the Ed25519ph prehash variant).

use super::{Algorithm, SigningAlgorithm};
use crate::error::{LicenseError, LicenseResult};
use crate::key::{KeyPair, PrivateKey, PublicKey};
use ed25519_dalek::{
    Signature, Signer as _, SigningKey, Verifier as _, VerifyingKey, PUBLIC_KEY_LENGTH,
    SIGNATURE_LENGTH,
};
use pkcs8::spki::SubjectPublicKeyInfoRef;
use pkcs8::{DecodePrivateKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rand::rngs::OsRng;

pub(super) static ED25519: Ed25519 = Ed25519;

/// Ed25519 strategy.
pub(super) struct Ed25519;

impl SigningAlgorithm for Ed25519 {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Ed25519
    }

    fn generate(&self) -> LicenseResult<KeyPair> {
        let signing = SigningKey::generate(&mut OsRng);
        let private_pem = signing
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| LicenseError::KeyGeneration(e.to_string()))?;
        let public_pem = signing
            .verifying_key()
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| LicenseError::KeyGeneration(e.to_string()))?;
        Ok(KeyPair {
            algorithm: Algorithm::Ed25519,
            private_key: PrivateKey::from_pem(private_pem.as_str()),
            public_key: PublicKey::from_pem(public_pem),
        })
    }

    fn sign(&self, key: &PrivateKey, digest: &[u8]) -> LicenseResult<Vec<u8>> {
        key.expect_algorithm(Algorithm::Ed25519)?;
        let signing = SigningKey::from_pkcs8_pem(key.as_pem().trim())
            .map_err(|e| LicenseError::Decode(format!("invalid private key: {e}")))?;
        Ok(signing.sign(digest).to_bytes().to_vec())
    }

    fn verify(&self, key: &PublicKey, digest: &[u8], signature: &[u8]) -> LicenseResult<()> {
        key.expect_algorithm(Algorithm::Ed25519)?;

        let document = key.to_der()?;
        let spki = SubjectPublicKeyInfoRef::try_from(document.as_bytes())
            .map_err(|e| LicenseError::Decode(format!("invalid public key: {e}")))?;
        let raw = spki.subject_public_key.raw_bytes();
        let key_bytes: [u8; PUBLIC_KEY_LENGTH] = raw.try_into().map_err(|_| {
            LicenseError::Decode(format!(
                "ed25519 public key must be {PUBLIC_KEY_LENGTH} bytes, got {}",
                raw.len()
            ))
        })?;
        let verifying_key = VerifyingKey::from_bytes(&key_bytes)
            .map_err(|_| LicenseError::Decode("invalid ed25519 public key".to_string()))?;

        let signature_bytes: [u8; SIGNATURE_LENGTH] =
            signature.try_into().map_err(|_| LicenseError::BadSignature)?;
        verifying_key
            .verify(digest, &Signature::from_bytes(&signature_bytes))
            .map_err(|_| LicenseError::BadSignature)
    }
}
