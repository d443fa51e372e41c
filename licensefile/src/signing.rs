//! Signing and verifying license files.
//!
//! Sign: canonical bytes → fingerprint → strategy → base64 → `signature`.
//! Verify: decode `signature` → canonical bytes of a signature-cleared copy →
//! fingerprint → strategy verify. Both sides use [`fingerprint`], so the
//! bytes hashed at sign time and verify time come from the same procedure.

use crate::algorithm::Algorithm;
use crate::codec::{decode_signature, encode_signature};
use crate::document::LicenseFile;
use crate::error::{LicenseError, LicenseResult};
use crate::fingerprint::fingerprint;
use crate::format::Format;
use crate::key::{PrivateKey, PublicKey};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Context of a successful verification.
///
/// Holds what a later [`Verification::reverify`] needs: the public key, the
/// algorithm, and where the file came from. Only obtainable by verifying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    algorithm: Algorithm,
    public_key: PublicKey,
    format: Format,
    source: Option<PathBuf>,
}

impl Verification {
    pub(crate) fn with_source(mut self, path: &Path) -> Self {
        self.source = Some(path.to_path_buf());
        self
    }

    /// Algorithm the file verified under.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Public key the file verified against.
    #[must_use]
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Format the verified document was encoded in.
    #[must_use]
    pub fn format(&self) -> Format {
        self.format
    }

    /// Path the verified document was read from, if any.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

impl LicenseFile {
    /// Signs the document in place.
    ///
    /// On failure the existing `signature` is left untouched.
    pub fn sign(&mut self, key: &PrivateKey, algorithm: Algorithm) -> LicenseResult<()> {
        let digest = fingerprint(self, algorithm)?;
        debug!(
            algorithm = %algorithm,
            hash = %algorithm.hash_function(),
            format = %self.format(),
            "computed license fingerprint"
        );

        let raw = algorithm.strategy().sign(key, &digest)?;
        self.signature = encode_signature(&raw);

        info!(algorithm = %algorithm, "license file signed");
        Ok(())
    }

    /// Verifies the signature against `key`.
    ///
    /// Does not look at the expiration date; see [`LicenseFile::validate`].
    ///
    /// # Errors
    ///
    /// - [`LicenseError::NotSigned`] if `signature` is empty
    /// - [`LicenseError::Decode`] for malformed signature text or key PEM
    /// - [`LicenseError::InvalidAlgorithm`] if `key` belongs to another algorithm
    /// - [`LicenseError::BadSignature`] if the signature does not match
    pub fn verify(&self, key: &PublicKey, algorithm: Algorithm) -> LicenseResult<Verification> {
        let raw = decode_signature(&self.signature)?;
        let digest = fingerprint(self, algorithm)?;
        debug!(
            algorithm = %algorithm,
            hash = %algorithm.hash_function(),
            format = %self.format(),
            "verifying license signature"
        );

        algorithm.strategy().verify(key, &digest, &raw)?;

        info!(algorithm = %algorithm, "license signature verified");
        Ok(Verification {
            algorithm,
            public_key: key.clone(),
            format: self.format(),
            source: None,
        })
    }

    /// Verifies the signature, then rejects the file if it has expired.
    ///
    /// A forged file always fails with [`LicenseError::BadSignature`] and an
    /// authentic stale one with [`LicenseError::Expired`].
    pub fn validate(&self, key: &PublicKey, algorithm: Algorithm) -> LicenseResult<Verification> {
        let verification = self.verify(key, algorithm)?;
        if self.expired()? {
            return Err(LicenseError::Expired(self.expiration_date.clone()));
        }
        Ok(verification)
    }
}
