//! Command implementations for the `licensefile` binary.
//!
//! Each command is a plain function over paths and parsed arguments so it
//! can be exercised without a process boundary. `main.rs` only parses
//! arguments, installs logging and prints the results.

use anyhow::{Context, Result};
use licensefile::{
    Algorithm, Format, LicenseError, LicenseFile, PrivateKey, PublicKey, SourcedFile,
    Verification, generate_key_pair,
};
use std::fmt::Write as _;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

// ── Keys ─────────────────────────────────────────────────────────

/// Paths written by [`keygen`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFiles {
    pub private_key: PathBuf,
    pub public_key: PathBuf,
}

/// Generates a key pair and writes `NAME.key` and `NAME.pub` into `out_dir`.
///
/// Existing files are never overwritten. The private key is created with
/// mode 0600 on unix.
pub fn keygen(algorithm: Algorithm, out_dir: &Path, name: &str) -> Result<KeyFiles> {
    let pair = generate_key_pair(algorithm).context("Failed to generate key pair")?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let files = KeyFiles {
        private_key: out_dir.join(format!("{name}.key")),
        public_key: out_dir.join(format!("{name}.pub")),
    };

    write_new(&files.private_key, pair.private_key.as_pem().as_bytes(), true)?;
    write_new(&files.public_key, pair.public_key.as_pem().as_bytes(), false)?;

    info!(
        algorithm = %algorithm,
        private_key = ?files.private_key,
        public_key = ?files.public_key,
        "key pair written"
    );
    Ok(files)
}

fn write_new(path: &Path, contents: &[u8], secret: bool) -> Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    if secret {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    #[cfg(not(unix))]
    let _ = secret;

    let mut file = options
        .open(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(contents)
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Loads a PKCS#8 PEM private key.
pub fn load_private_key(path: &Path) -> Result<PrivateKey> {
    let pem = fs::read_to_string(path)
        .with_context(|| format!("Failed to read private key {}", path.display()))?;
    Ok(PrivateKey::from_pem(pem))
}

/// Loads an SPKI PEM public key.
pub fn load_public_key(path: &Path) -> Result<PublicKey> {
    let pem = fs::read_to_string(path)
        .with_context(|| format!("Failed to read public key {}", path.display()))?;
    Ok(PublicKey::from_pem(pem))
}

fn read_license(path: &Path, format: Option<Format>) -> Result<SourcedFile> {
    let sourced = match format {
        Some(format) => licensefile::read_with_format(path, format),
        None => licensefile::read(path),
    };
    sourced.with_context(|| format!("Failed to read license file {}", path.display()))
}

// ── Sign ─────────────────────────────────────────────────────────

/// Arguments for [`sign`].
#[derive(Debug, Clone)]
pub struct SignRequest {
    pub key: PathBuf,
    pub algorithm: Algorithm,
    pub input: PathBuf,
    pub output: PathBuf,
    /// Output encoding; defaults to the input's.
    pub format: Option<Format>,
}

/// Signs the license at `input` and writes the signed file to `output`.
pub fn sign(request: &SignRequest) -> Result<LicenseFile> {
    let key = load_private_key(&request.key)?;
    let mut file = read_license(&request.input, None)?.into_file();
    if let Some(format) = request.format {
        file.set_format(format);
    }

    if file.is_signed() {
        warn!(path = ?request.input, "input is already signed, replacing signature");
    }
    file.sign(&key, request.algorithm)
        .context("Failed to sign license")?;
    file.write_file(&request.output)
        .with_context(|| format!("Failed to write {}", request.output.display()))?;

    info!(output = ?request.output, algorithm = %request.algorithm, "license signed");
    Ok(file)
}

// ── Verify ───────────────────────────────────────────────────────

/// Arguments for [`verify`].
#[derive(Debug, Clone)]
pub struct VerifyRequest {
    pub key: PathBuf,
    pub algorithm: Algorithm,
    pub file: PathBuf,
    pub format: Option<Format>,
    /// Accept an authentic license whose expiration date has passed.
    pub allow_expired: bool,
}

/// Outcome of a successful [`verify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    pub company_name: String,
    pub expiration_date: String,
    pub days_remaining: i64,
    pub expired: bool,
}

/// Verifies a license file, then checks its expiry.
///
/// An expired license is an error unless `allow_expired` is set; a bad
/// signature is always an error.
pub fn verify(request: &VerifyRequest) -> Result<VerifyReport> {
    let key = load_public_key(&request.key)?;
    let sourced = read_license(&request.file, request.format)?;
    sourced
        .verify(&key, request.algorithm)
        .with_context(|| format!("{} failed verification", request.file.display()))?;

    let file = &sourced.file;
    let expired = file.expired()?;
    if expired && !request.allow_expired {
        return Err(LicenseError::Expired(file.expiration_date.clone()).into());
    }

    Ok(VerifyReport {
        company_name: file.company_name.clone(),
        expiration_date: file.expiration_date.clone(),
        days_remaining: file.expires_in_days()?,
        expired,
    })
}

// ── Inspect ──────────────────────────────────────────────────────

/// Renders a license's fields for display without verifying it.
pub fn inspect(path: &Path, format: Option<Format>) -> Result<String> {
    let file = read_license(path, format)?.into_file();
    render(&file, chrono::Utc::now().date_naive())
}

/// Renders `file` as aligned `Field: value` lines, evaluating expiry on `today`.
pub fn render(file: &LicenseFile, today: chrono::NaiveDate) -> Result<String> {
    let mut out = String::new();
    let mut line = |label: &str, value: &dyn std::fmt::Display| {
        let _ = writeln!(out, "{label:<16}{value}");
    };

    if let Some(id) = &file.license_id {
        line("License ID:", id);
    }
    if !file.app_name.is_empty() {
        line("App:", &file.app_name);
    }
    line("Company:", &file.company_name);
    line("Contact:", &file.contact_name);
    line("Phone:", &file.phone_number);
    line("Email:", &file.email);
    line("Issued:", &file.issue_date);
    line("Expires:", &file.expiration_date);
    match file.expires_in_days_on(today) {
        Ok(days) if days < 0 => line("Status:", &format!("expired {} day(s) ago", -days)),
        Ok(days) => line("Status:", &format!("{days} day(s) remaining")),
        Err(e) => line("Status:", &e),
    }
    line("Format:", &file.format());
    line("Signed:", &if file.is_signed() { "yes" } else { "no" });
    for (key, value) in &file.metadata {
        line(&format!("  {key}:"), value);
    }
    Ok(out)
}

// ── Watch ────────────────────────────────────────────────────────

/// Result of one watch tick.
#[derive(Debug)]
pub enum WatchStatus {
    /// Authentic and not expired.
    Valid { days_remaining: i64 },
    /// Authentic but past its expiration date.
    Expired { expiration_date: String },
    /// The file on disk no longer verifies.
    Tampered(LicenseError),
    /// The file could not be read this tick; retried on the next one.
    Unavailable(LicenseError),
    /// Authentic, but its dates cannot be evaluated.
    Invalid(LicenseError),
}

impl WatchStatus {
    /// True for a license that is currently usable.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }
}

/// Periodically re-verifies a license file against the key it was first
/// verified with.
#[derive(Debug)]
pub struct Watcher {
    verification: Verification,
}

impl Watcher {
    /// Verifies the file once; the watch only starts from an authentic file.
    pub fn start(key_path: &Path, algorithm: Algorithm, file: &Path) -> Result<Self> {
        let key = load_public_key(key_path)?;
        let verification = read_license(file, None)?
            .verify(&key, algorithm)
            .with_context(|| format!("{} failed verification", file.display()))?;
        info!(path = ?file, algorithm = %algorithm, "watching license file");
        Ok(Self { verification })
    }

    /// Path being watched.
    pub fn path(&self) -> Option<&Path> {
        self.verification.source()
    }

    /// Re-reads and re-verifies the file.
    pub fn tick(&self) -> WatchStatus {
        let status = match self.verification.reverify() {
            Ok(file) => match (file.expired(), file.expires_in_days()) {
                (Ok(false), Ok(days_remaining)) => WatchStatus::Valid { days_remaining },
                (Ok(true), _) => WatchStatus::Expired {
                    expiration_date: file.expiration_date,
                },
                (Err(e), _) | (_, Err(e)) => WatchStatus::Invalid(e),
            },
            Err(e @ (LicenseError::NotFound(_) | LicenseError::Io(_))) => {
                WatchStatus::Unavailable(e)
            }
            Err(e) => WatchStatus::Tampered(e),
        };

        match &status {
            WatchStatus::Valid { days_remaining } => {
                debug!(path = ?self.path(), days_remaining, "license still valid");
            }
            WatchStatus::Expired { expiration_date } => {
                warn!(path = ?self.path(), expiration_date = %expiration_date, "license expired");
            }
            WatchStatus::Tampered(e) => {
                warn!(path = ?self.path(), error = %e, "license file no longer verifies");
            }
            WatchStatus::Unavailable(e) => {
                warn!(path = ?self.path(), error = %e, "license file unavailable, retrying");
            }
            WatchStatus::Invalid(e) => {
                warn!(path = ?self.path(), error = %e, "license file verifies but its dates are unusable");
            }
        }
        status
    }
}

/// Ticks `watcher` every `period` until `shutdown` resolves, returning the
/// last status seen.
///
/// Each tick reads the file from disk, so it runs on the blocking pool.
pub async fn run_watch<F>(watcher: Watcher, period: Duration, shutdown: F) -> Option<WatchStatus>
where
    F: Future<Output = ()>,
{
    let watcher = Arc::new(watcher);
    let mut ticker = tokio::time::interval(period);
    // The first tick fires immediately and start() has just verified.
    ticker.tick().await;
    tokio::pin!(shutdown);

    let mut last: Option<WatchStatus> = None;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let task = Arc::clone(&watcher);
                let status = match tokio::task::spawn_blocking(move || task.tick()).await {
                    Ok(status) => status,
                    Err(e) => {
                        error!(error = %e, "watch tick failed to complete");
                        break;
                    }
                };
                let was_valid = last.as_ref().is_none_or(WatchStatus::is_valid);
                if status.is_valid() && !was_valid {
                    info!(path = ?watcher.path(), "license file verifies again");
                }
                last = Some(status);
            }
            () = &mut shutdown => {
                info!("Stopping watch");
                break;
            }
        }
    }
    last
}
