//! # Schema Subcommand
//!
//! Prints the schema registry as language-neutral JSON: every record type
//! with its fields, shapes and constraints.

use anyhow::Result;
use clap::Args;
use cim_schema::{RecordType, SchemaRegistry};

/// Arguments for the schema subcommand.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Print a single record type (e.g. `CredentialMetadata`).
    #[arg(long)]
    pub record: Option<String>,
}

/// Execute the schema subcommand.
pub fn run_schema(args: &SchemaArgs) -> Result<u8> {
    let registry = SchemaRegistry;
    let description = match &args.record {
        Some(name) => {
            let Some(record) = RecordType::ALL.iter().find(|r| r.name() == name.as_str()) else {
                let known: Vec<&str> = RecordType::ALL.iter().map(|r| r.name()).collect();
                anyhow::bail!("unknown record type '{name}' (known: {})", known.join(", "));
            };
            registry.get(*record).to_json()
        }
        None => registry.describe(),
    };
    println!("{}", serde_json::to_string_pretty(&description)?);
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_record_rejected() {
        let args = SchemaArgs {
            record: Some("Nope".into()),
        };
        let err = run_schema(&args).unwrap_err();
        assert!(err.to_string().contains("IssuerMetadata"));
    }

    #[test]
    fn test_single_record() {
        let args = SchemaArgs {
            record: Some("Logo".into()),
        };
        assert_eq!(run_schema(&args).unwrap(), 0);
    }
}
