//! Canonical document encodings.
//!
//! JSON is the reference encoding (compact `serde_json` output in declared
//! field order). YAML is kept for files issued in the historical format.
//! Whatever format a document was decoded from is the format it is hashed
//! and written in.

use crate::error::{LicenseError, LicenseResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Supported license file encodings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Json,
    Yaml,
}

impl Format {
    /// All supported formats.
    pub const ALL: [Format; 2] = [Format::Json, Format::Yaml];

    /// Picks the format implied by a file extension (`.yaml`/`.yml` → YAML,
    /// anything else → JSON).
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }

    /// Conventional file extension.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    /// Encodes `value` in this format.
    pub(crate) fn encode<T: Serialize>(&self, value: &T) -> LicenseResult<Vec<u8>> {
        match self {
            Self::Json => serde_json::to_vec(value)
                .map_err(|e| LicenseError::Serialization(format!("json: {e}"))),
            Self::Yaml => serde_yaml::to_string(value)
                .map(String::into_bytes)
                .map_err(|e| LicenseError::Serialization(format!("yaml: {e}"))),
        }
    }

    /// Decodes `bytes` in this format.
    pub(crate) fn decode<T: for<'de> Deserialize<'de>>(&self, bytes: &[u8]) -> LicenseResult<T> {
        match self {
            Self::Json => serde_json::from_slice(bytes)
                .map_err(|e| LicenseError::Decode(format!("invalid json document: {e}"))),
            Self::Yaml => serde_yaml::from_slice(bytes)
                .map_err(|e| LicenseError::Decode(format!("invalid yaml document: {e}"))),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        })
    }
}

impl FromStr for Format {
    type Err = LicenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(LicenseError::InvalidFormat(other.to_string())),
        }
    }
}
