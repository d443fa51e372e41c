//! Signing algorithm strategies.
//!
//! Each family (ECDSA, RSA-PSS, Ed25519) implements [`SigningAlgorithm`].
//! An [`Algorithm`] tag selects the implementation; parsing a tag is the
//! only place an unknown algorithm can enter, so it is rejected before any
//! cryptographic work.

mod ecdsa;
mod ed25519;
mod rsa;

use crate::error::{LicenseError, LicenseResult};
use crate::fingerprint::HashFunction;
use crate::key::{KeyPair, PrivateKey, PublicKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported signing algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Algorithm {
    EcdsaP256,
    EcdsaP384,
    EcdsaP521,
    Rsa2048,
    Rsa4096,
    Ed25519,
}

impl Algorithm {
    /// All supported algorithms.
    pub const ALL: [Algorithm; 6] = [
        Algorithm::EcdsaP256,
        Algorithm::EcdsaP384,
        Algorithm::EcdsaP521,
        Algorithm::Rsa2048,
        Algorithm::Rsa4096,
        Algorithm::Ed25519,
    ];

    /// The tag used in configuration and on the command line.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::EcdsaP256 => "ecdsa-p256",
            Self::EcdsaP384 => "ecdsa-p384",
            Self::EcdsaP521 => "ecdsa-p521",
            Self::Rsa2048 => "rsa-2048",
            Self::Rsa4096 => "rsa-4096",
            Self::Ed25519 => "ed25519",
        }
    }

    /// The hash function fingerprints are computed with.
    #[must_use]
    pub fn hash_function(&self) -> HashFunction {
        match self {
            Self::EcdsaP256 => HashFunction::Sha256,
            Self::EcdsaP384 => HashFunction::Sha384,
            Self::EcdsaP521 => HashFunction::Sha512,
            // Legacy: already-issued RSA licenses are signed over SHA-1.
            Self::Rsa2048 | Self::Rsa4096 => HashFunction::Sha1,
            Self::Ed25519 => HashFunction::Sha512,
        }
    }

    /// The strategy implementing this algorithm.
    #[must_use]
    pub fn strategy(&self) -> &'static dyn SigningAlgorithm {
        match self {
            Self::EcdsaP256 => &ecdsa::ECDSA_P256,
            Self::EcdsaP384 => &ecdsa::ECDSA_P384,
            Self::EcdsaP521 => &ecdsa::ECDSA_P521,
            Self::Rsa2048 => &rsa::RSA_2048,
            Self::Rsa4096 => &rsa::RSA_4096,
            Self::Ed25519 => &ed25519::ED25519,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Algorithm {
    type Err = LicenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|a| a.tag() == tag)
            .ok_or_else(|| LicenseError::InvalidAlgorithm(format!("unknown algorithm tag {s:?}")))
    }
}

impl TryFrom<String> for Algorithm {
    type Error = LicenseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Algorithm> for String {
    fn from(algorithm: Algorithm) -> Self {
        algorithm.tag().to_string()
    }
}

/// Allowed RSA modulus sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RsaBits {
    B2048,
    B4096,
}

impl RsaBits {
    /// Modulus size in bits.
    #[must_use]
    pub fn bits(&self) -> usize {
        match self {
            Self::B2048 => 2048,
            Self::B4096 => 4096,
        }
    }

    /// The algorithm tag for this size.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Self::B2048 => Algorithm::Rsa2048,
            Self::B4096 => Algorithm::Rsa4096,
        }
    }
}

impl TryFrom<u32> for RsaBits {
    type Error = LicenseError;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        match bits {
            2048 => Ok(Self::B2048),
            4096 => Ok(Self::B4096),
            other => Err(LicenseError::InvalidAlgorithm(format!(
                "unsupported RSA key size {other} (allowed: 2048, 4096)"
            ))),
        }
    }
}

/// One signing algorithm family member.
///
/// `sign` and `verify` take the fingerprint digest, never the raw document.
/// Both check the key's embedded algorithm against [`Self::algorithm`]
/// first and fail with [`LicenseError::InvalidAlgorithm`] on a mismatch.
pub trait SigningAlgorithm: Send + Sync {
    /// The tag this strategy implements.
    fn algorithm(&self) -> Algorithm;

    /// Hash function for fingerprints.
    fn hash_function(&self) -> HashFunction {
        self.algorithm().hash_function()
    }

    /// Generates a new key pair from the OS random source.
    fn generate(&self) -> LicenseResult<KeyPair>;

    /// Signs a fingerprint digest, returning raw signature bytes.
    fn sign(&self, key: &PrivateKey, digest: &[u8]) -> LicenseResult<Vec<u8>>;

    /// Verifies raw signature bytes over a fingerprint digest.
    ///
    /// # Errors
    ///
    /// [`LicenseError::BadSignature`] if the signature does not verify.
    fn verify(&self, key: &PublicKey, digest: &[u8], signature: &[u8]) -> LicenseResult<()>;
}

/// Generates a key pair for `algorithm`.
pub fn generate_key_pair(algorithm: Algorithm) -> LicenseResult<KeyPair> {
    tracing::debug!(algorithm = %algorithm, "generating key pair");
    algorithm.strategy().generate()
}
