//! Signed license key files.
//!
//! This crate handles:
//! - The license document model and its canonical JSON/YAML encoding
//! - Fingerprinting: hashing the signature-cleared canonical bytes
//! - Signing and verification with ECDSA (P-256/P-384/P-521), RSA-PSS
//!   (2048/4096) and Ed25519
//! - Expiration checks
//! - Reading, writing and periodic re-verification of files on disk
//!
//! # Design Principles
//!
//! - **One canonical encoding**: the bytes hashed when signing and when
//!   verifying come from the same procedure, with `Signature` cleared
//! - **Authenticity before freshness**: expiry is checked only after the
//!   signature verifies, and the two failures are distinct error variants
//! - **Stateless**: no shared state; the engine never stores or logs keys
//!
//! # Wire Contract
//!
//! Documents are compact JSON (or YAML) with fields in declared order and
//! optional fields omitted when empty. Signatures are standard base64.
//! Keys are PEM (PKCS#8 private, SPKI public).

mod algorithm;
mod codec;
mod document;
mod error;
mod expiration;
mod fingerprint;
mod format;
mod io;
mod key;
mod metadata;
mod signing;

pub use algorithm::{generate_key_pair, Algorithm, RsaBits, SigningAlgorithm};
pub use codec::{decode_signature, encode_signature};
pub use document::{LicenseFile, LicenseFileBuilder, LicenseId};
pub use error::{LicenseError, LicenseResult};
pub use fingerprint::{fingerprint, HashFunction};
pub use format::Format;
pub use io::{read, read_with_format, SourcedFile};
pub use key::{KeyPair, PrivateKey, PublicKey};
pub use metadata::{Metadata, MetadataValue};
pub use signing::Verification;
