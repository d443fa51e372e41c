mod common;

use common::{date, keys_for, minimal_file, sample_file, signed};
use licensefile::{Algorithm, Format, LicenseError, LicenseFile, LicenseId, MetadataValue};

// ── Round trip ───────────────────────────────────────────────────

#[test]
fn sign_write_read_verify_every_algorithm() {
    for algorithm in Algorithm::ALL {
        for format in Format::ALL {
            let mut file = sample_file();
            file.set_format(format);
            let file = signed(file, algorithm);

            let mut buffer = Vec::new();
            file.write_to(&mut buffer).unwrap();
            let decoded = LicenseFile::unmarshal(&buffer, format).unwrap();

            let verification = decoded
                .verify(&keys_for(algorithm).public_key, algorithm)
                .unwrap_or_else(|e| panic!("{algorithm}/{format}: {e}"));
            assert_eq!(verification.algorithm(), algorithm);
            assert_eq!(verification.format(), format);
            assert!(verification.source().is_none());
        }
    }
}

#[test]
fn minimal_file_roundtrip() {
    let file = signed(minimal_file(), Algorithm::EcdsaP256);
    let bytes = file.marshal(Format::Json).unwrap();
    let decoded = LicenseFile::unmarshal(&bytes, Format::Json).unwrap();
    assert!(decoded
        .verify(&keys_for(Algorithm::EcdsaP256).public_key, Algorithm::EcdsaP256)
        .is_ok());
}

#[test]
fn verify_is_idempotent() {
    let algorithm = Algorithm::EcdsaP384;
    let file = signed(sample_file(), algorithm);
    let key = &keys_for(algorithm).public_key;
    let first = file.verify(key, algorithm).unwrap();
    let second = file.verify(key, algorithm).unwrap();
    assert_eq!(first, second);

    let mut tampered = file.clone();
    tampered.email = "mallory@example.com".into();
    assert!(matches!(tampered.verify(key, algorithm), Err(LicenseError::BadSignature)));
    assert!(matches!(tampered.verify(key, algorithm), Err(LicenseError::BadSignature)));
}

#[test]
fn ecdsa_signature_lengths_are_fixed() {
    for (algorithm, len) in [
        (Algorithm::EcdsaP256, 64),
        (Algorithm::EcdsaP384, 96),
        (Algorithm::EcdsaP521, 132),
        (Algorithm::Ed25519, 64),
        (Algorithm::Rsa2048, 256),
    ] {
        let file = signed(sample_file(), algorithm);
        let raw = licensefile::decode_signature(&file.signature).unwrap();
        assert_eq!(raw.len(), len, "{algorithm}");
    }
}

#[test]
fn resigning_replaces_signature() {
    let mut file = signed(sample_file(), Algorithm::Ed25519);
    file.sign(&keys_for(Algorithm::EcdsaP256).private_key, Algorithm::EcdsaP256)
        .unwrap();
    assert!(file
        .verify(&keys_for(Algorithm::EcdsaP256).public_key, Algorithm::EcdsaP256)
        .is_ok());
}

// ── Tamper sensitivity ───────────────────────────────────────────

const TAMPERINGS: [&str; 14] = [
    "license id",
    "license id removed",
    "app name",
    "company",
    "contact",
    "phone",
    "email",
    "issue date",
    "issue timestamp",
    "expiration",
    "metadata changed",
    "metadata retyped",
    "metadata added",
    "metadata removed",
];

fn tamper(name: &str, f: &mut LicenseFile) {
    match name {
        "license id" => f.license_id = Some(LicenseId::Int(43)),
        "license id removed" => f.license_id = None,
        "app name" => f.app_name = "Other App".into(),
        "company" => f.company_name = "Initrode".into(),
        "contact" => f.contact_name = "Milton".into(),
        "phone" => f.phone_number.push('1'),
        "email" => f.email = "milton@initech.example".into(),
        "issue date" => f.issue_date = "2023-12-31".into(),
        "issue timestamp" => f.issue_timestamp = Some(0),
        "expiration" => f.expiration_date = "2099-01-10".into(),
        "metadata changed" => {
            f.metadata.insert("seats".into(), MetadataValue::Int(500));
        }
        "metadata retyped" => {
            f.metadata.insert("seats".into(), MetadataValue::Float(5.0));
        }
        "metadata added" => {
            f.metadata.insert("sso".into(), MetadataValue::Bool(true));
        }
        "metadata removed" => {
            f.metadata.remove("tier");
        }
        other => panic!("unknown tampering {other}"),
    }
}

#[test]
fn any_field_change_breaks_signature() {
    for algorithm in [Algorithm::Ed25519, Algorithm::EcdsaP256, Algorithm::Rsa2048] {
        let original = signed(sample_file(), algorithm);
        let key = &keys_for(algorithm).public_key;
        for name in TAMPERINGS {
            let mut file = original.clone();
            tamper(name, &mut file);
            assert!(
                matches!(file.verify(key, algorithm), Err(LicenseError::BadSignature)),
                "{algorithm}: tampering with {name} went undetected"
            );
        }
    }
}

#[test]
fn switching_format_breaks_signature() {
    let mut file = signed(sample_file(), Algorithm::Ed25519);
    file.set_format(Format::Yaml);
    assert!(matches!(
        file.verify(&keys_for(Algorithm::Ed25519).public_key, Algorithm::Ed25519),
        Err(LicenseError::BadSignature)
    ));
}

#[test]
fn wrong_key_same_algorithm_fails() {
    let file = signed(sample_file(), Algorithm::Ed25519);
    let (_, other_public) = common::test_keypair();
    assert!(matches!(
        file.verify(&other_public, Algorithm::Ed25519),
        Err(LicenseError::BadSignature)
    ));
}

// ── Algorithm cross-rejection ────────────────────────────────────

#[test]
fn verifying_under_another_algorithm_never_succeeds() {
    let signers = [
        Algorithm::EcdsaP256,
        Algorithm::EcdsaP384,
        Algorithm::EcdsaP521,
        Algorithm::Rsa2048,
        Algorithm::Ed25519,
    ];
    for signer in signers {
        let file = signed(sample_file(), signer);
        for verifier in signers.into_iter().filter(|v| *v != signer) {
            // Signer's key, verifier's tag: the key's own algorithm gives it away.
            let result = file.verify(&keys_for(signer).public_key, verifier);
            assert!(
                matches!(result, Err(LicenseError::InvalidAlgorithm(_))),
                "{signer} signature, {verifier} tag: {result:?}"
            );

            // Verifier's key and tag: the math fails.
            let result = file.verify(&keys_for(verifier).public_key, verifier);
            assert!(
                matches!(
                    result,
                    Err(LicenseError::BadSignature | LicenseError::InvalidAlgorithm(_))
                ),
                "{signer} signature, {verifier} key: {result:?}"
            );
        }
    }
}

#[test]
fn signing_with_mismatched_key_leaves_file_untouched() {
    let mut file = sample_file();
    let result = file.sign(&keys_for(Algorithm::Ed25519).private_key, Algorithm::EcdsaP256);
    assert!(matches!(result, Err(LicenseError::InvalidAlgorithm(_))));
    assert!(file.signature.is_empty());

    let mut file = signed(sample_file(), Algorithm::Ed25519);
    let before = file.signature.clone();
    let result = file.sign(&keys_for(Algorithm::Rsa2048).private_key, Algorithm::EcdsaP521);
    assert!(result.is_err());
    assert_eq!(file.signature, before);
}

#[test]
fn rsa_size_mismatch_is_invalid_algorithm() {
    let file = signed(sample_file(), Algorithm::Rsa2048);
    let result = file.verify(&keys_for(Algorithm::Rsa2048).public_key, Algorithm::Rsa4096);
    assert!(matches!(result, Err(LicenseError::InvalidAlgorithm(_))));
}

// ── Signature text ───────────────────────────────────────────────

#[test]
fn unsigned_file_is_not_signed_error() {
    let result = sample_file().verify(&keys_for(Algorithm::Ed25519).public_key, Algorithm::Ed25519);
    assert!(matches!(result, Err(LicenseError::NotSigned)));
}

#[test]
fn malformed_signature_text_is_decode_error() {
    let mut file = signed(sample_file(), Algorithm::Ed25519);
    file.signature = "!!! not base64 !!!".into();
    let result = file.verify(&keys_for(Algorithm::Ed25519).public_key, Algorithm::Ed25519);
    assert!(matches!(result, Err(LicenseError::Decode(_))));
}

#[test]
fn truncated_signature_is_bad_signature() {
    for algorithm in [Algorithm::Ed25519, Algorithm::EcdsaP256, Algorithm::Rsa2048] {
        let mut file = signed(sample_file(), algorithm);
        let mut raw = licensefile::decode_signature(&file.signature).unwrap();
        raw.truncate(raw.len() - 1);
        file.signature = licensefile::encode_signature(&raw);
        let result = file.verify(&keys_for(algorithm).public_key, algorithm);
        assert!(matches!(result, Err(LicenseError::BadSignature)), "{algorithm}");
    }
}

// ── validate ─────────────────────────────────────────────────────

#[test]
fn validate_distinguishes_forged_from_expired() {
    let algorithm = Algorithm::Ed25519;
    let key = &keys_for(algorithm).public_key;

    // sample_file expired on 2024-01-10.
    let stale = signed(sample_file(), algorithm);
    assert!(stale.verify(key, algorithm).is_ok());
    assert!(matches!(
        stale.validate(key, algorithm),
        Err(LicenseError::Expired(d)) if d == "2024-01-10"
    ));

    let mut forged = stale.clone();
    forged.expiration_date = "2999-01-01".into();
    assert!(matches!(forged.validate(key, algorithm), Err(LicenseError::BadSignature)));

    let fresh = signed(minimal_file(), algorithm);
    assert!(fresh.validate(key, algorithm).is_ok());
    assert!(!fresh.expired_on(date(2500, 1, 1)).unwrap());
}

// ── Unencodable documents ────────────────────────────────────────

#[test]
fn non_finite_metadata_cannot_be_signed() {
    for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        for format in Format::ALL {
            let mut file = sample_file();
            file.set_format(format);
            file.insert_metadata("ratio", value);

            let result = file.sign(&keys_for(Algorithm::Ed25519).private_key, Algorithm::Ed25519);
            assert!(
                matches!(result, Err(LicenseError::Serialization(_))),
                "{value} in {format}: {result:?}"
            );
            assert!(!file.is_signed());
            assert!(file.write_to(Vec::new()).is_err());
        }
    }
}
