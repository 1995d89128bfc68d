//! # Validate Subcommand
//!
//! Decodes a metadata document and reports every field error.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use cim_schema::CodecOptions;

use crate::{load_metadata, report_errors};

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Metadata document (`.json`, `.yaml` or `.yml`).
    pub path: PathBuf,
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs, options: &CodecOptions) -> Result<u8> {
    match load_metadata(&args.path, options)? {
        Ok(metadata) => {
            println!(
                "OK: {} ({} credential configuration(s))",
                args.path.display(),
                metadata.credentials_supported.len()
            );
            Ok(0)
        }
        Err(errors) => {
            report_errors(&args.path, &errors);
            Ok(1)
        }
    }
}
