//! # cim-cli — CLI Tool for Credential Issuer Metadata
//!
//! Provides the `cim` command-line interface over `cim-schema`.
//!
//! ## Subcommands
//!
//! - `cim validate` — decode a document and list every field error.
//! - `cim canonicalize` — write the RFC 8785 canonical form.
//! - `cim digest` — print the SHA-256 digest of the canonical form.
//! - `cim well-known` — print the metadata URL for an issuer identifier.
//! - `cim schema` — print the schema registry as JSON.
//!
//! ```bash
//! cim validate metadata.yaml
//! cim --allow-http canonicalize metadata.json --output metadata.canonical.json
//! cim digest metadata.json
//! cim well-known https://issuer.example/tenant
//! ```
//!
//! Every handler returns the process exit code: `0` on success, `1` when
//! the document is invalid. Unreadable input surfaces as an error.

pub mod canonicalize;
pub mod digest;
pub mod schema;
pub mod validate;
pub mod well_known;

use std::path::Path;

use anyhow::{Context, Result};
use cim_core::{DecodeErrors, IssuerMetadata};
use cim_schema::{load_document, CodecOptions, Decoder};

/// Resolve codec options from an optional YAML file and the global
/// `--allow-http` flag. The flag wins over the file.
pub fn resolve_options(config: Option<&Path>, allow_http: bool) -> Result<CodecOptions> {
    let mut options = match config {
        Some(path) => CodecOptions::load(path)
            .with_context(|| format!("loading options from {}", path.display()))?,
        None => CodecOptions::default(),
    };
    if allow_http {
        options.enforce_https = false;
    }
    tracing::debug!(?options, "codec options resolved");
    Ok(options)
}

/// Load a document file and decode it.
///
/// The outer `Result` fails when the file cannot be read or parsed; the
/// inner one carries the field errors of a parsed but invalid document.
pub fn load_metadata(
    path: &Path,
    options: &CodecOptions,
) -> Result<std::result::Result<IssuerMetadata, DecodeErrors>> {
    let raw = load_document(path)?;
    Ok(Decoder::new(*options).decode(&raw))
}

/// Print field errors for `path` to stderr.
pub fn report_errors(path: &Path, errors: &DecodeErrors) {
    eprintln!("INVALID: {} ({} error(s))", path.display(), errors.len());
    for error in errors {
        eprintln!("  - {error}");
    }
}
