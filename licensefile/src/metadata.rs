//! Typed entitlement metadata.
//!
//! Every entry carries its type. On the wire integers and floats are
//! numbers, booleans are booleans, and strings and dates are strings. A
//! string is a [`MetadataValue::Date`] exactly when it is the `YYYY-MM-DD`
//! rendering of a valid date. The same rule applies when a value is built
//! from a Rust string and when it is decoded, so an issuer's copy and a
//! decoded copy hold identical values. Floats must be finite.

use chrono::NaiveDate;
use serde::de::{self, Deserializer, Visitor};
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Wire format of date values.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Application-defined entitlement data, emitted in sorted key order.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A single metadata value.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Date(NaiveDate),
}

impl MetadataValue {
    /// Name of the held type, used in mismatch errors.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Bool(_) => "bool",
            Self::Date(_) => "date",
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Date(v) => write!(f, "{}", v.format(DATE_FORMAT)),
        }
    }
}

impl From<i64> for MetadataValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for MetadataValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for MetadataValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for MetadataValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for MetadataValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for MetadataValue {
    fn from(v: &str) -> Self {
        parse_canonical_date(v).map_or_else(|| Self::Str(v.to_string()), Self::Date)
    }
}

impl From<String> for MetadataValue {
    fn from(v: String) -> Self {
        match parse_canonical_date(&v) {
            Some(date) => Self::Date(date),
            None => Self::Str(v),
        }
    }
}

impl From<NaiveDate> for MetadataValue {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl Serialize for MetadataValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::Float(v) if !v.is_finite() => {
                Err(ser::Error::custom(format!("metadata float {v} is not finite")))
            }
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::Str(v) => serializer.serialize_str(v),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Date(v) => serializer.collect_str(&v.format(DATE_FORMAT)),
        }
    }
}

impl<'de> Deserialize<'de> for MetadataValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MetadataValueVisitor)
    }
}

struct MetadataValueVisitor;

impl Visitor<'_> for MetadataValueVisitor {
    type Value = MetadataValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer, float, string, boolean or YYYY-MM-DD date")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(MetadataValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(MetadataValue::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        i64::try_from(v)
            .map(MetadataValue::Int)
            .map_err(|_| E::custom(format!("integer {v} out of range for i64")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(MetadataValue::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(MetadataValue::from(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(MetadataValue::from(v))
    }
}

/// Parses `text` as a date only if formatting it back yields `text` exactly.
pub(crate) fn parse_canonical_date(text: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(text, DATE_FORMAT).ok()?;
    (date.format(DATE_FORMAT).to_string() == text).then_some(date)
}
