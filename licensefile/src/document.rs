//! The license document and its canonical encoding.
//!
//! Field order in [`LicenseFile`] is the order fields appear on the wire,
//! and therefore part of every signature. Do not reorder, rename, or change
//! the omission rules of existing fields.

use crate::error::{LicenseError, LicenseResult};
use crate::format::Format;
use crate::metadata::{DATE_FORMAT, Metadata, MetadataValue, parse_canonical_date};
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of the license record a file was issued from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LicenseId {
    /// Numeric database id.
    Int(i64),
    /// Textual id, usually a UUID.
    Text(String),
}

impl LicenseId {
    /// Generates a random UUID (v4) identifier.
    #[must_use]
    pub fn new_v4() -> Self {
        Self::from(Uuid::new_v4())
    }
}

impl From<Uuid> for LicenseId {
    fn from(id: Uuid) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<i64> for LicenseId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<&str> for LicenseId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl fmt::Display for LicenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

/// A license key file.
///
/// The document is plain data. Signing sets [`LicenseFile::signature`];
/// changing any other field afterwards invalidates it and nothing re-signs
/// implicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct LicenseFile {
    /// License record id, embedded only when the issuing app opts in.
    #[serde(rename = "LicenseID", default, skip_serializing_if = "Option::is_none")]
    pub license_id: Option<LicenseId>,
    /// Issuing app name, embedded only when the issuing app opts in.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_name: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub email: String,
    /// `YYYY-MM-DD`.
    #[serde(default)]
    pub issue_date: String,
    /// Seconds since the unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_timestamp: Option<i64>,
    /// `YYYY-MM-DD`, interpreted as UTC.
    #[serde(default)]
    pub expiration_date: String,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
    /// Base64 signature over the fingerprint; empty until signed.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub signature: String,

    #[serde(skip)]
    format: Format,
}

impl LicenseFile {
    /// Starts building a new license file.
    #[must_use]
    pub fn builder() -> LicenseFileBuilder {
        LicenseFileBuilder::new()
    }

    /// The format this document is encoded in when hashed or written.
    #[must_use]
    pub fn format(&self) -> Format {
        self.format
    }

    /// Changes the output format. The signature is bound to the encoding,
    /// so a signed file must be re-signed after switching formats.
    pub fn set_format(&mut self, format: Format) {
        self.format = format;
    }

    /// Returns true once a signature has been attached.
    #[must_use]
    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }

    /// Encodes the document in `format`.
    pub fn marshal(&self, format: Format) -> LicenseResult<Vec<u8>> {
        format.encode(self)
    }

    /// Decodes a document, remembering `format` for later hashing and writes.
    pub fn unmarshal(bytes: &[u8], format: Format) -> LicenseResult<Self> {
        let mut file: Self = format.decode(bytes)?;
        file.format = format;
        Ok(file)
    }

    /// The canonical bytes a signature covers: this document in its own
    /// format with the signature cleared.
    pub(crate) fn canonical_bytes(&self) -> LicenseResult<Vec<u8>> {
        let mut unsigned = self.clone();
        unsigned.signature.clear();
        unsigned.marshal(self.format)
    }

    /// Inserts or replaces a metadata entry.
    pub fn insert_metadata(&mut self, key: impl Into<String>, value: impl Into<MetadataValue>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Looks up a metadata entry of any type.
    pub fn metadata_value(&self, key: &str) -> LicenseResult<&MetadataValue> {
        self.metadata
            .get(key)
            .ok_or_else(|| LicenseError::FieldNotFound(key.to_string()))
    }

    /// Reads an integer metadata entry.
    pub fn metadata_as_int(&self, key: &str) -> LicenseResult<i64> {
        match self.metadata_value(key)? {
            MetadataValue::Int(v) => Ok(*v),
            other => Err(mismatch(key, "int", other)),
        }
    }

    /// Reads a floating-point metadata entry. Integers are not widened.
    pub fn metadata_as_float(&self, key: &str) -> LicenseResult<f64> {
        match self.metadata_value(key)? {
            MetadataValue::Float(v) => Ok(*v),
            other => Err(mismatch(key, "float", other)),
        }
    }

    /// Reads a string metadata entry. Dates are date-strings on the wire and
    /// are returned in `YYYY-MM-DD` form.
    pub fn metadata_as_string(&self, key: &str) -> LicenseResult<String> {
        match self.metadata_value(key)? {
            MetadataValue::Str(v) => Ok(v.clone()),
            MetadataValue::Date(v) => Ok(v.format(DATE_FORMAT).to_string()),
            other => Err(mismatch(key, "string", other)),
        }
    }

    /// Reads a boolean metadata entry.
    pub fn metadata_as_bool(&self, key: &str) -> LicenseResult<bool> {
        match self.metadata_value(key)? {
            MetadataValue::Bool(v) => Ok(*v),
            other => Err(mismatch(key, "bool", other)),
        }
    }

    /// Reads a date metadata entry.
    ///
    /// A `Str` holding a canonical `YYYY-MM-DD` date also reads as a date,
    /// matching what it decodes to.
    pub fn metadata_as_date(&self, key: &str) -> LicenseResult<NaiveDate> {
        let value = self.metadata_value(key)?;
        match value {
            MetadataValue::Date(v) => Ok(*v),
            MetadataValue::Str(v) => {
                parse_canonical_date(v).ok_or_else(|| mismatch(key, "date", value))
            }
            other => Err(mismatch(key, "date", other)),
        }
    }
}

fn mismatch(key: &str, expected: &'static str, found: &MetadataValue) -> LicenseError {
    LicenseError::TypeMismatch {
        key: key.to_string(),
        expected,
        found: found.type_name(),
    }
}

#[derive(Debug, Clone, Copy)]
enum Expiry {
    On(NaiveDate),
    AfterDays(u32),
}

/// Builds a [`LicenseFile`] from a license record.
///
/// Issue date and timestamp default to now (UTC); the expiration must be set
/// explicitly, either as a date or as a number of days after issue.
#[derive(Debug, Clone)]
pub struct LicenseFileBuilder {
    file: LicenseFile,
    issued_at: DateTime<Utc>,
    with_timestamp: bool,
    expiry: Option<Expiry>,
}

impl LicenseFileBuilder {
    fn new() -> Self {
        Self {
            file: LicenseFile::default(),
            issued_at: Utc::now(),
            with_timestamp: true,
            expiry: None,
        }
    }

    /// Embeds the license record id.
    #[must_use]
    pub fn license_id(mut self, id: impl Into<LicenseId>) -> Self {
        self.file.license_id = Some(id.into());
        self
    }

    /// Embeds the issuing app's name.
    #[must_use]
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.file.app_name = name.into();
        self
    }

    #[must_use]
    pub fn company_name(mut self, name: impl Into<String>) -> Self {
        self.file.company_name = name.into();
        self
    }

    #[must_use]
    pub fn contact_name(mut self, name: impl Into<String>) -> Self {
        self.file.contact_name = name.into();
        self
    }

    #[must_use]
    pub fn phone_number(mut self, phone: impl Into<String>) -> Self {
        self.file.phone_number = phone.into();
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.file.email = email.into();
        self
    }

    /// Overrides the issue instant (defaults to now).
    #[must_use]
    pub fn issued_at(mut self, at: DateTime<Utc>) -> Self {
        self.issued_at = at;
        self
    }

    /// Leaves `IssueTimestamp` out of the document.
    #[must_use]
    pub fn without_timestamp(mut self) -> Self {
        self.with_timestamp = false;
        self
    }

    /// Expires on `date`; the license stays usable through that day.
    #[must_use]
    pub fn expires_on(mut self, date: NaiveDate) -> Self {
        self.expiry = Some(Expiry::On(date));
        self
    }

    /// Expires `days` days after the issue date.
    #[must_use]
    pub fn valid_for_days(mut self, days: u32) -> Self {
        self.expiry = Some(Expiry::AfterDays(days));
        self
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.file.insert_metadata(key, value);
        self
    }

    /// Sets the encoding used for hashing and writing.
    #[must_use]
    pub fn format(mut self, format: Format) -> Self {
        self.file.format = format;
        self
    }

    /// Finishes the unsigned document.
    pub fn build(self) -> LicenseResult<LicenseFile> {
        let mut file = self.file;
        let issue_date = self.issued_at.date_naive();

        let expiration = match self.expiry {
            None => return Err(LicenseError::MissingExpirationDate),
            Some(Expiry::On(date)) => date,
            Some(Expiry::AfterDays(days)) => issue_date
                .checked_add_days(Days::new(u64::from(days)))
                .ok_or_else(|| LicenseError::InvalidDate {
                    field: "ExpirationDate",
                    value: format!("{issue_date} + {days} days"),
                })?,
        };

        file.issue_date = issue_date.format(DATE_FORMAT).to_string();
        file.issue_timestamp = self.with_timestamp.then(|| self.issued_at.timestamp());
        file.expiration_date = expiration.format(DATE_FORMAT).to_string();
        Ok(file)
    }
}
