//! ECDSA over the NIST curves P-256, P-384 and P-521.
//!
//! The fingerprint digest is signed as a prehash with RFC 6979 nonces.
//! Signatures are the fixed-size `r || s` encoding (64, 96 or 132 bytes).

use super::{Algorithm, SigningAlgorithm};
use crate::error::{LicenseError, LicenseResult};
use crate::key::{KeyPair, PrivateKey, PublicKey};

pub(super) static ECDSA_P256: Ecdsa = Ecdsa(Algorithm::EcdsaP256);
pub(super) static ECDSA_P384: Ecdsa = Ecdsa(Algorithm::EcdsaP384);
pub(super) static ECDSA_P521: Ecdsa = Ecdsa(Algorithm::EcdsaP521);

/// ECDSA strategy for one curve.
pub(super) struct Ecdsa(Algorithm);

/// Key generation, signing and verification for a single curve crate.
macro_rules! curve_ops {
    ($module:ident, $curve:ident) => {
        mod $module {
            use crate::error::{LicenseError, LicenseResult};
            use crate::key::{PrivateKey, PublicKey};
            use ::$curve::ecdsa::{Signature, SigningKey, VerifyingKey};
            use ::$curve::elliptic_curve::sec1::ToEncodedPoint;
            use ::$curve::{PublicKey as CurvePublicKey, SecretKey};
            use pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
            use rand::rngs::OsRng;
            use signature::hazmat::{PrehashSigner, PrehashVerifier};

            pub(super) fn generate() -> LicenseResult<(PrivateKey, PublicKey)> {
                let secret = SecretKey::random(&mut OsRng);
                let private_pem = secret
                    .to_pkcs8_pem(LineEnding::LF)
                    .map_err(|e| LicenseError::KeyGeneration(e.to_string()))?;
                let public_pem = secret
                    .public_key()
                    .to_public_key_pem(LineEnding::LF)
                    .map_err(|e| LicenseError::KeyGeneration(e.to_string()))?;
                Ok((
                    PrivateKey::from_pem(private_pem.as_str()),
                    PublicKey::from_pem(public_pem),
                ))
            }

            pub(super) fn sign(key: &PrivateKey, digest: &[u8]) -> LicenseResult<Vec<u8>> {
                let secret = SecretKey::from_pkcs8_pem(key.as_pem().trim())
                    .map_err(|e| LicenseError::Decode(format!("invalid private key: {e}")))?;
                let signing_key = SigningKey::from_bytes(&secret.to_bytes())
                    .map_err(|e| LicenseError::Decode(format!("invalid private key: {e}")))?;
                let signature: Signature = signing_key
                    .sign_prehash(digest)
                    .map_err(|e| LicenseError::Signing(e.to_string()))?;
                Ok(signature.to_bytes().to_vec())
            }

            pub(super) fn verify(
                key: &PublicKey,
                digest: &[u8],
                signature: &[u8],
            ) -> LicenseResult<()> {
                let public = CurvePublicKey::from_public_key_pem(key.as_pem().trim())
                    .map_err(|e| LicenseError::Decode(format!("invalid public key: {e}")))?;
                let verifying_key =
                    VerifyingKey::from_sec1_bytes(public.to_encoded_point(false).as_bytes())
                        .map_err(|e| LicenseError::Decode(format!("invalid public key: {e}")))?;
                let signature =
                    Signature::from_slice(signature).map_err(|_| LicenseError::BadSignature)?;
                verifying_key
                    .verify_prehash(digest, &signature)
                    .map_err(|_| LicenseError::BadSignature)
            }
        }
    };
}

curve_ops!(nist_p256, p256);
curve_ops!(nist_p384, p384);
curve_ops!(nist_p521, p521);

impl SigningAlgorithm for Ecdsa {
    fn algorithm(&self) -> Algorithm {
        self.0
    }

    fn generate(&self) -> LicenseResult<KeyPair> {
        let (private_key, public_key) = match self.0 {
            Algorithm::EcdsaP256 => nist_p256::generate()?,
            Algorithm::EcdsaP384 => nist_p384::generate()?,
            Algorithm::EcdsaP521 => nist_p521::generate()?,
            other => return Err(not_ecdsa(other)),
        };
        Ok(KeyPair {
            algorithm: self.0,
            private_key,
            public_key,
        })
    }

    fn sign(&self, key: &PrivateKey, digest: &[u8]) -> LicenseResult<Vec<u8>> {
        key.expect_algorithm(self.0)?;
        match self.0 {
            Algorithm::EcdsaP256 => nist_p256::sign(key, digest),
            Algorithm::EcdsaP384 => nist_p384::sign(key, digest),
            Algorithm::EcdsaP521 => nist_p521::sign(key, digest),
            other => Err(not_ecdsa(other)),
        }
    }

    fn verify(&self, key: &PublicKey, digest: &[u8], signature: &[u8]) -> LicenseResult<()> {
        key.expect_algorithm(self.0)?;
        match self.0 {
            Algorithm::EcdsaP256 => nist_p256::verify(key, digest, signature),
            Algorithm::EcdsaP384 => nist_p384::verify(key, digest, signature),
            Algorithm::EcdsaP521 => nist_p521::verify(key, digest, signature),
            other => Err(not_ecdsa(other)),
        }
    }
}

fn not_ecdsa(algorithm: Algorithm) -> LicenseError {
    LicenseError::InvalidAlgorithm(format!("{algorithm} is not an ECDSA algorithm"))
}
