//! Document fingerprints.
//!
//! The fingerprint is the digest a signature actually covers: the canonical
//! encoding of the document with its signature cleared, hashed with the
//! function the signing algorithm mandates. The algorithm-to-hash mapping is
//! fixed policy. RSA keeps SHA-1 so previously issued files still verify.

use crate::algorithm::Algorithm;
use crate::document::LicenseFile;
use crate::error::LicenseResult;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fmt;

/// Hash functions used for fingerprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashFunction {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl HashFunction {
    /// Hashes `data`.
    #[must_use]
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha1 => Sha1::digest(data).to_vec(),
            Self::Sha256 => Sha256::digest(data).to_vec(),
            Self::Sha384 => Sha384::digest(data).to_vec(),
            Self::Sha512 => Sha512::digest(data).to_vec(),
        }
    }

    /// Digest length in bytes.
    #[must_use]
    pub fn output_len(&self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }
}

impl fmt::Display for HashFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sha1 => "SHA-1",
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
        })
    }
}

/// Computes the fingerprint `algorithm` signs for `file`.
///
/// The signature field is ignored, so a signed file and its unsigned
/// counterpart have the same fingerprint.
pub fn fingerprint(file: &LicenseFile, algorithm: Algorithm) -> LicenseResult<Vec<u8>> {
    let canonical = file.canonical_bytes()?;
    Ok(algorithm.hash_function().digest(&canonical))
}
