//! Reading and writing license files.
//!
//! Reading only decodes: it never verifies or checks expiry. A file read
//! from disk remembers its path so a later verification can be repeated
//! against the bytes currently on disk.

use crate::algorithm::Algorithm;
use crate::document::LicenseFile;
use crate::error::{LicenseError, LicenseResult};
use crate::format::Format;
use crate::key::PublicKey;
use crate::signing::Verification;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A license file together with the path it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcedFile {
    pub file: LicenseFile,
    pub path: PathBuf,
}

impl SourcedFile {
    /// Verifies the file; the returned context can re-verify from `path`.
    pub fn verify(&self, key: &PublicKey, algorithm: Algorithm) -> LicenseResult<Verification> {
        Ok(self.file.verify(key, algorithm)?.with_source(&self.path))
    }

    /// Verifies the file and rejects it if expired.
    pub fn validate(&self, key: &PublicKey, algorithm: Algorithm) -> LicenseResult<Verification> {
        Ok(self.file.validate(key, algorithm)?.with_source(&self.path))
    }

    /// Drops the provenance.
    #[must_use]
    pub fn into_file(self) -> LicenseFile {
        self.file
    }
}

/// Reads a license file, choosing the format from the extension.
pub fn read(path: impl AsRef<Path>) -> LicenseResult<SourcedFile> {
    let path = path.as_ref();
    read_with_format(path, Format::from_path(path))
}

/// Reads a license file in the given format.
///
/// # Errors
///
/// [`LicenseError::NotFound`] if `path` does not exist, [`LicenseError::Io`]
/// for other read failures, [`LicenseError::Decode`] for malformed content.
pub fn read_with_format(path: impl AsRef<Path>, format: Format) -> LicenseResult<SourcedFile> {
    let path = path.as_ref();
    debug!(path = ?path, format = %format, "reading license file");

    let bytes = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => LicenseError::NotFound(path.to_path_buf()),
        _ => LicenseError::Io(e),
    })?;
    let file = LicenseFile::unmarshal(&bytes, format)?;

    Ok(SourcedFile {
        file,
        path: path.to_path_buf(),
    })
}

impl LicenseFile {
    /// Writes the document, in its own format, to `writer`.
    pub fn write_to<W: Write>(&self, mut writer: W) -> LicenseResult<()> {
        let bytes = self.marshal(self.format())?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    /// Writes the document to `path`, replacing any existing file.
    pub fn write_file(&self, path: impl AsRef<Path>) -> LicenseResult<()> {
        let path = path.as_ref();
        debug!(path = ?path, format = %self.format(), "writing license file");
        let file = fs::File::create(path)?;
        self.write_to(std::io::BufWriter::new(file))
    }
}

impl Verification {
    /// Re-reads the file from its source path and verifies it again with
    /// the same public key and algorithm.
    ///
    /// Returns the freshly read document so callers can re-check expiry.
    ///
    /// # Errors
    ///
    /// [`LicenseError::NoSource`] if the verified document was not read from
    /// disk; otherwise the same errors as [`read_with_format`] and
    /// [`LicenseFile::verify`].
    pub fn reverify(&self) -> LicenseResult<LicenseFile> {
        let path = self.source().ok_or(LicenseError::NoSource)?;
        let sourced = read_with_format(path, self.format())?;
        match sourced.file.verify(self.public_key(), self.algorithm()) {
            Ok(_) => Ok(sourced.file),
            Err(e) => {
                warn!(path = ?path, error = %e, "license file failed re-verification");
                Err(e)
            }
        }
    }
}
