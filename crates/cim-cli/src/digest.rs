//! # Digest Subcommand
//!
//! Prints `sha256:<hex>` over the canonical bytes of a document.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use cim_core::ContentDigest;
use cim_schema::{CodecOptions, Encoder};

use crate::{load_metadata, report_errors};

/// Arguments for the digest subcommand.
#[derive(Args, Debug)]
pub struct DigestArgs {
    /// Metadata document (`.json`, `.yaml` or `.yml`).
    pub path: PathBuf,
}

/// Compute the digest of a document file. `Ok(None)` means the document
/// was parsed but is invalid; its errors have been reported.
pub fn document_digest(args: &DigestArgs, options: &CodecOptions) -> Result<Option<ContentDigest>> {
    match load_metadata(&args.path, options)? {
        Ok(metadata) => {
            let digest = Encoder::new(*options)
                .digest(&metadata)
                .context("computing canonical digest")?;
            Ok(Some(digest))
        }
        Err(errors) => {
            report_errors(&args.path, &errors);
            Ok(None)
        }
    }
}

/// Execute the digest subcommand.
pub fn run_digest(args: &DigestArgs, options: &CodecOptions) -> Result<u8> {
    match document_digest(args, options)? {
        Some(digest) => {
            println!("{digest}");
            Ok(0)
        }
        None => Ok(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_and_json_share_digest() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("m.json");
        let yaml_path = dir.path().join("m.yml");
        std::fs::write(
            &json_path,
            r#"{"credential_issuer":"https://i.example","credential_endpoint":"https://i.example/c",
                "credentials_supported":{"D":{"format":"jwt_vc_json","credential_definition":{"type":["VC"]}}}}"#,
        )
        .unwrap();
        std::fs::write(
            &yaml_path,
            "credentials_supported:\n  D:\n    credential_definition:\n      type: [VC]\n    format: jwt_vc_json\n\
             credential_endpoint: https://i.example/c\n\
             credential_issuer: https://i.example\n",
        )
        .unwrap();
        let options = CodecOptions::default();
        let a = document_digest(&DigestArgs { path: json_path }, &options).unwrap().unwrap();
        let b = document_digest(&DigestArgs { path: yaml_path }, &options).unwrap().unwrap();
        assert_eq!(a, b);
        assert!(a.to_string().starts_with("sha256:"));
    }
}
