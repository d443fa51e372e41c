//! Property-based tests for license files.
//!
//! These tests verify properties that must always hold:
//! - A signed file survives encode/decode and still verifies
//! - Any edit to a signed document is detected
//! - Decoding then re-encoding reproduces the exact bytes

mod common;

use common::keys_for;
use licensefile::{Algorithm, Format, LicenseError, LicenseFile, MetadataValue};
use proptest::prelude::*;

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

fn text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z .,@+'-]{0,40}").unwrap()
}

fn metadata_value_strategy() -> impl Strategy<Value = MetadataValue> {
    prop_oneof![
        any::<i64>().prop_map(MetadataValue::Int),
        (prop::num::f64::NORMAL
            | prop::num::f64::SUBNORMAL
            | prop::num::f64::ZERO
            | prop::num::f64::POSITIVE
            | prop::num::f64::NEGATIVE)
            .prop_map(MetadataValue::Float),
        text_strategy().prop_map(MetadataValue::Str),
        any::<bool>().prop_map(MetadataValue::Bool),
        (0u32..3650).prop_map(|offset| {
            let base = chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
            MetadataValue::Date(base + chrono::Days::new(u64::from(offset)))
        }),
    ]
}

fn license_strategy() -> impl Strategy<Value = LicenseFile> {
    (
        text_strategy(),
        text_strategy(),
        text_strategy(),
        prop::option::of(any::<i64>()),
        1u32..5000,
        prop::collection::btree_map("[a-z_]{1,12}", metadata_value_strategy(), 0..6),
        prop::sample::select(Format::ALL.to_vec()),
    )
        .prop_map(|(app, company, email, id, days, metadata, format)| {
            let mut builder = LicenseFile::builder()
                .app_name(app)
                .company_name(company)
                .email(email)
                .valid_for_days(days)
                .format(format);
            if let Some(id) = id {
                builder = builder.license_id(id);
            }
            let mut file = builder.build().unwrap();
            file.metadata = metadata;
            file
        })
}

fn algorithm_strategy() -> impl Strategy<Value = Algorithm> {
    prop::sample::select(vec![Algorithm::Ed25519, Algorithm::EcdsaP256])
}

// =============================================================================
// SIGNING PROPERTIES
// =============================================================================

mod signing_properties {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// A signed file verifies after a trip through its own encoding
        #[test]
        fn signed_file_roundtrips(file in license_strategy(), algorithm in algorithm_strategy()) {
            let mut file = file;
            let pair = keys_for(algorithm);
            file.sign(&pair.private_key, algorithm).unwrap();

            let bytes = file.marshal(file.format()).unwrap();
            let decoded = LicenseFile::unmarshal(&bytes, file.format()).unwrap();

            prop_assert!(decoded.verify(&pair.public_key, algorithm).is_ok());
            prop_assert_eq!(decoded.marshal(file.format()).unwrap(), bytes);
        }

        /// Changing the company name of a signed file is always detected
        #[test]
        fn edited_company_is_detected(
            file in license_strategy(),
            algorithm in algorithm_strategy(),
            replacement in text_strategy(),
        ) {
            let mut file = file;
            prop_assume!(replacement != file.company_name);
            let pair = keys_for(algorithm);
            file.sign(&pair.private_key, algorithm).unwrap();

            file.company_name = replacement;
            prop_assert!(matches!(
                file.verify(&pair.public_key, algorithm),
                Err(LicenseError::BadSignature)
            ));
        }

        /// Adding a metadata entry to a signed file is always detected
        #[test]
        fn added_metadata_is_detected(
            file in license_strategy(),
            value in metadata_value_strategy(),
        ) {
            let mut file = file;
            let algorithm = Algorithm::Ed25519;
            let pair = keys_for(algorithm);
            file.sign(&pair.private_key, algorithm).unwrap();

            file.metadata.insert("__injected".to_string(), value);
            prop_assert!(matches!(
                file.verify(&pair.public_key, algorithm),
                Err(LicenseError::BadSignature)
            ));
        }
    }
}

// =============================================================================
// EXPIRATION PROPERTIES
// =============================================================================

mod expiration_properties {
    use super::*;

    proptest! {
        /// expired_on agrees with the sign of expires_in_days_on
        #[test]
        fn expired_iff_days_negative(file in license_strategy(), offset in -6000i64..6000) {
            let today = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                + chrono::TimeDelta::days(offset);
            let expired = file.expired_on(today).unwrap();
            let days = file.expires_in_days_on(today).unwrap();
            prop_assert_eq!(expired, days < 0);
        }
    }
}
