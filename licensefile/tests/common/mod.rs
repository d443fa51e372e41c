//! Shared test helpers for license file tests.

#![allow(dead_code)]

use chrono::{NaiveDate, TimeZone, Utc};
use ed25519_dalek::SigningKey;
use licensefile::{
    generate_key_pair, Algorithm, KeyPair, LicenseFile, LicenseId, PrivateKey, PublicKey,
};
use pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use std::sync::OnceLock;

/// Returns a deterministic Ed25519 key pair from a fixed seed.
pub fn test_keypair() -> (PrivateKey, PublicKey) {
    let seed: [u8; 32] = [
        1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24,
        25, 26, 27, 28, 29, 30, 31, 32,
    ];
    let signing_key = SigningKey::from_bytes(&seed);
    let private_pem = signing_key.to_pkcs8_pem(LineEnding::LF).unwrap();
    let public_pem = signing_key
        .verifying_key()
        .to_public_key_pem(LineEnding::LF)
        .unwrap();
    (
        PrivateKey::from_pem(private_pem.as_str()),
        PublicKey::from_pem(public_pem),
    )
}

/// Returns a key pair for `algorithm`, generated once per test binary.
///
/// RSA generation is slow, so every test shares the same pairs.
pub fn keys_for(algorithm: Algorithm) -> &'static KeyPair {
    static P256: OnceLock<KeyPair> = OnceLock::new();
    static P384: OnceLock<KeyPair> = OnceLock::new();
    static P521: OnceLock<KeyPair> = OnceLock::new();
    static RSA_2048: OnceLock<KeyPair> = OnceLock::new();
    static RSA_4096: OnceLock<KeyPair> = OnceLock::new();
    static ED25519: OnceLock<KeyPair> = OnceLock::new();

    let cell = match algorithm {
        Algorithm::EcdsaP256 => &P256,
        Algorithm::EcdsaP384 => &P384,
        Algorithm::EcdsaP521 => &P521,
        Algorithm::Rsa2048 => &RSA_2048,
        Algorithm::Rsa4096 => &RSA_4096,
        Algorithm::Ed25519 => &ED25519,
    };
    cell.get_or_init(|| generate_key_pair(algorithm).unwrap())
}

/// An unsigned license issued 2024-01-01 and expiring 2024-01-10.
pub fn sample_file() -> LicenseFile {
    LicenseFile::builder()
        .license_id(42i64)
        .app_name("Acme Analyzer")
        .company_name("Initech")
        .contact_name("Bill Lumbergh")
        .phone_number("+1 555 0100")
        .email("bill@initech.example")
        .issued_at(Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap())
        .expires_on(date(2024, 1, 10))
        .metadata("seats", 5i64)
        .metadata("tier", "pro")
        .metadata("ratio", 0.75)
        .metadata("support", true)
        .metadata("renewal", date(2024, 6, 1))
        .build()
        .unwrap()
}

/// An unsigned license with only the mandatory fields, expiring far in the future.
pub fn minimal_file() -> LicenseFile {
    LicenseFile::builder()
        .company_name("Initech")
        .issued_at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        .without_timestamp()
        .expires_on(date(2999, 12, 31))
        .build()
        .unwrap()
}

/// A signed copy of `file`.
pub fn signed(mut file: LicenseFile, algorithm: Algorithm) -> LicenseFile {
    file.sign(&keys_for(algorithm).private_key, algorithm).unwrap();
    file
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn uuid_id() -> LicenseId {
    LicenseId::new_v4()
}
