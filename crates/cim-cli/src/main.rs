//! # cim CLI entry point
//!
//! Parses command-line arguments, resolves codec options from the global
//! flags, and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cim_cli::canonicalize::{run_canonicalize, CanonicalizeArgs};
use cim_cli::digest::{run_digest, DigestArgs};
use cim_cli::resolve_options;
use cim_cli::schema::{run_schema, SchemaArgs};
use cim_cli::validate::{run_validate, ValidateArgs};
use cim_cli::well_known::{run_well_known, WellKnownArgs};

/// Credential Issuer Metadata toolchain.
///
/// Validates issuer metadata documents, writes their canonical form, and
/// computes content digests for signing and caching.
#[derive(Parser, Debug)]
#[command(name = "cim", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML file with codec options.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Accept http endpoint URLs (development issuers).
    #[arg(long, global = true)]
    allow_http: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a metadata document and report every field error.
    Validate(ValidateArgs),

    /// Write the RFC 8785 canonical form of a metadata document.
    Canonicalize(CanonicalizeArgs),

    /// Print the SHA-256 digest of the canonical form.
    Digest(DigestArgs),

    /// Print the well-known metadata URL for an issuer identifier.
    WellKnown(WellKnownArgs),

    /// Print the schema registry as JSON.
    Schema(SchemaArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = resolve_options(cli.config.as_deref(), cli.allow_http).and_then(|options| {
        match &cli.command {
            Commands::Validate(args) => run_validate(args, &options),
            Commands::Canonicalize(args) => run_canonicalize(args, &options),
            Commands::Digest(args) => run_digest(args, &options),
            Commands::WellKnown(args) => run_well_known(args),
            Commands::Schema(args) => run_schema(args),
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
