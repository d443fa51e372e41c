//! License file tool
//!
//! Generates signing keys and signs, verifies, inspects and watches
//! license files.
//!
//! Usage:
//!   licensefile keygen --algorithm ed25519 --out-dir keys
//!   licensefile sign --key keys/license.key --algorithm ed25519 --input draft.json --output license.json
//!   licensefile verify --key keys/license.pub --algorithm ed25519 license.json
//!   licensefile watch --key keys/license.pub --algorithm ed25519 license.json --interval 60

use std::{path::PathBuf, process::ExitCode, time::Duration};
use anyhow::Result;
use clap::{Parser, Subcommand};
use licensefile::{Algorithm, Format};
use licensefile_cli::{SignRequest, VerifyRequest, Watcher};
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "licensefile")]
#[command(about = "Sign and verify license key files")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a signing key pair
    Keygen {
        /// Signing algorithm (ecdsa-p256, ecdsa-p384, ecdsa-p521, rsa-2048, rsa-4096, ed25519)
        #[arg(short, long)]
        algorithm: Algorithm,

        /// Directory the key files are written to
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Base name for NAME.key and NAME.pub
        #[arg(short, long, default_value = "license")]
        name: String,
    },

    /// Sign a license file
    Sign {
        /// PKCS#8 PEM private key
        #[arg(short, long)]
        key: PathBuf,

        #[arg(short, long)]
        algorithm: Algorithm,

        /// Output encoding (json or yaml); defaults to the input's
        #[arg(short, long)]
        format: Option<Format>,

        /// Unsigned license file
        #[arg(short, long)]
        input: PathBuf,

        /// Where the signed license is written
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Verify a license file's signature and expiry
    Verify {
        /// SPKI PEM public key
        #[arg(short, long)]
        key: PathBuf,

        #[arg(short, long)]
        algorithm: Algorithm,

        /// Encoding of FILE; defaults to its extension
        #[arg(short, long)]
        format: Option<Format>,

        file: PathBuf,

        /// Succeed for an authentic but expired license
        #[arg(long)]
        allow_expired: bool,
    },

    /// Print a license file's fields without verifying it
    Inspect {
        file: PathBuf,

        #[arg(short, long)]
        format: Option<Format>,
    },

    /// Re-verify a license file periodically until interrupted
    Watch {
        #[arg(short, long)]
        key: PathBuf,

        #[arg(short, long)]
        algorithm: Algorithm,

        file: PathBuf,

        /// Seconds between checks
        #[arg(short, long, default_value = "60")]
        interval: u64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    match run(args.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::Keygen { algorithm, out_dir, name } => {
            let files = licensefile_cli::keygen(algorithm, &out_dir, &name)?;
            println!("Private key: {}", files.private_key.display());
            println!("Public key:  {}", files.public_key.display());
        }
        Command::Sign { key, algorithm, format, input, output } => {
            licensefile_cli::sign(&SignRequest { key, algorithm, input, output, format })?;
        }
        Command::Verify { key, algorithm, format, file, allow_expired } => {
            let report = licensefile_cli::verify(&VerifyRequest {
                key,
                algorithm,
                file,
                format,
                allow_expired,
            })?;
            if report.expired {
                println!("VALID SIGNATURE, EXPIRED on {}", report.expiration_date);
            } else {
                println!(
                    "VALID: {} (expires {}, {} day(s) remaining)",
                    report.company_name, report.expiration_date, report.days_remaining
                );
            }
        }
        Command::Inspect { file, format } => {
            print!("{}", licensefile_cli::inspect(&file, format)?);
        }
        Command::Watch { key, algorithm, file, interval } => {
            let watcher = Watcher::start(&key, algorithm, &file)?;
            let period = Duration::from_secs(interval.max(1));
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!(error = %e, "failed to listen for Ctrl-C");
                }
            };
            if let Some(status) = licensefile_cli::run_watch(watcher, period, shutdown).await {
                if !status.is_valid() {
                    println!("Last check: {status:?}");
                }
            }
        }
    }
    Ok(())
}
