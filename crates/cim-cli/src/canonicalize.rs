//! # Canonicalize Subcommand
//!
//! Decodes a document, re-encodes it, and writes the RFC 8785 bytes. The
//! bytes are written exactly, with no trailing newline, so that piping
//! them into an external hash tool reproduces `cim digest`.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use cim_schema::{CodecOptions, Encoder};

use crate::{load_metadata, report_errors};

/// Arguments for the canonicalize subcommand.
#[derive(Args, Debug)]
pub struct CanonicalizeArgs {
    /// Metadata document (`.json`, `.yaml` or `.yml`).
    pub path: PathBuf,

    /// Write the canonical bytes to this file instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Execute the canonicalize subcommand.
pub fn run_canonicalize(args: &CanonicalizeArgs, options: &CodecOptions) -> Result<u8> {
    let metadata = match load_metadata(&args.path, options)? {
        Ok(metadata) => metadata,
        Err(errors) => {
            report_errors(&args.path, &errors);
            return Ok(1);
        }
    };
    let bytes = Encoder::new(*options)
        .encode_canonical(&metadata)
        .context("encoding canonical form")?;

    match &args.output {
        Some(out) => {
            std::fs::write(out, bytes.as_bytes())
                .with_context(|| format!("writing {}", out.display()))?;
            tracing::info!(path = %out.display(), bytes = bytes.len(), "canonical form written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(0)
}
