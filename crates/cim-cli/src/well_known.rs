//! # Well-Known Subcommand
//!
//! Prints the URL at which an issuer publishes its metadata.

use anyhow::Result;
use clap::Args;
use cim_core::well_known_url;

/// Arguments for the well-known subcommand.
#[derive(Args, Debug)]
pub struct WellKnownArgs {
    /// Credential issuer identifier (an https URL).
    pub issuer: String,
}

/// Execute the well-known subcommand.
pub fn run_well_known(args: &WellKnownArgs) -> Result<u8> {
    let url = well_known_url(&args.issuer)?;
    println!("{url}");
    Ok(0)
}
