//! RSA-PSS over a SHA-1 fingerprint.
//!
//! SHA-1 is a compatibility requirement for licenses already in the field.
//! The PSS salt length equals the digest length (20 bytes).

use super::{Algorithm, RsaBits, SigningAlgorithm};
use crate::error::{LicenseError, LicenseResult};
use crate::key::{KeyPair, PrivateKey, PublicKey};
use pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{Pss, RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;

pub(super) static RSA_2048: Rsa = Rsa(RsaBits::B2048);
pub(super) static RSA_4096: Rsa = Rsa(RsaBits::B4096);

/// RSA-PSS strategy for one modulus size.
pub(super) struct Rsa(RsaBits);

impl Rsa {
    fn check_size(&self, key: &impl PublicKeyParts) -> LicenseResult<()> {
        let bits = key.size() * 8;
        if bits == self.0.bits() {
            Ok(())
        } else {
            Err(LicenseError::InvalidAlgorithm(format!(
                "key is rsa-{bits}, expected {}",
                self.0.algorithm()
            )))
        }
    }
}

impl SigningAlgorithm for Rsa {
    fn algorithm(&self) -> Algorithm {
        self.0.algorithm()
    }

    fn generate(&self) -> LicenseResult<KeyPair> {
        let private = RsaPrivateKey::new(&mut OsRng, self.0.bits())
            .map_err(|e| LicenseError::KeyGeneration(e.to_string()))?;
        let private_pem = private
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| LicenseError::KeyGeneration(e.to_string()))?;
        let public_pem = RsaPublicKey::from(&private)
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| LicenseError::KeyGeneration(e.to_string()))?;
        Ok(KeyPair {
            algorithm: self.algorithm(),
            private_key: PrivateKey::from_pem(private_pem.as_str()),
            public_key: PublicKey::from_pem(public_pem),
        })
    }

    fn sign(&self, key: &PrivateKey, digest: &[u8]) -> LicenseResult<Vec<u8>> {
        key.expect_algorithm(self.algorithm())?;
        let private = RsaPrivateKey::from_pkcs8_pem(key.as_pem().trim())
            .map_err(|e| LicenseError::Decode(format!("invalid private key: {e}")))?;
        self.check_size(&private)?;
        private
            .sign_with_rng(&mut OsRng, Pss::new::<Sha1>(), digest)
            .map_err(|e| LicenseError::Signing(e.to_string()))
    }

    fn verify(&self, key: &PublicKey, digest: &[u8], signature: &[u8]) -> LicenseResult<()> {
        key.expect_algorithm(self.algorithm())?;
        let public = RsaPublicKey::from_public_key_pem(key.as_pem().trim())
            .map_err(|e| LicenseError::Decode(format!("invalid public key: {e}")))?;
        self.check_size(&public)?;
        public
            .verify(Pss::new::<Sha1>(), digest, signature)
            .map_err(|_| LicenseError::BadSignature)
    }
}
