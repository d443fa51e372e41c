//! Error types for license file signing and verification.

use std::path::PathBuf;
use thiserror::Error;

/// License-file errors.
///
/// Callers branch on the variant, never on the message text. The two
/// failures a consumer must tell apart are [`LicenseError::BadSignature`]
/// (reject the file) and [`LicenseError::Expired`] (authentic but stale).
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Requested document format is not one of the supported encodings.
    #[error("invalid file format: {0}")]
    InvalidFormat(String),

    /// Unknown algorithm tag, or key material belonging to another algorithm.
    #[error("invalid algorithm: {0}")]
    InvalidAlgorithm(String),

    /// Malformed key, signature text, or document bytes.
    #[error("decode error: {0}")]
    Decode(String),

    /// Cryptographic verification failed.
    #[error("license signature invalid")]
    BadSignature,

    /// Verification was requested on a document with an empty signature.
    #[error("license file is not signed")]
    NotSigned,

    /// `ExpirationDate` is blank.
    #[error("license file has no expiration date")]
    MissingExpirationDate,

    /// A date field is not a `YYYY-MM-DD` calendar date.
    #[error("invalid date in {field}: {value:?}")]
    InvalidDate {
        /// Wire name of the offending field.
        field: &'static str,
        /// The raw text that failed to parse.
        value: String,
    },

    /// License signature is valid but the expiration date has passed.
    #[error("license expired on {0}")]
    Expired(String),

    /// Metadata key is absent.
    #[error("metadata field not found: {0}")]
    FieldNotFound(String),

    /// Metadata value exists but holds a different type.
    #[error("metadata field {key:?} is {found}, not {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// License file path does not exist.
    #[error("license file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Re-verification needs a document that was read from disk.
    #[error("license file has no source path to re-verify from")]
    NoSource,

    /// Key pair generation failed.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// The signing primitive rejected the key or digest.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Encoding a document failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Filesystem or stream error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for license file operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
