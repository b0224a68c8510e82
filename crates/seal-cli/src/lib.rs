//! # seal-cli: Operator CLI for the Seal Registry
//!
//! Provides the `seal` command-line interface over a local JSON state file.
//!
//! ## Subcommands
//!
//! - `seal seals`: Generation, lookup, listing, transitions, close-out.
//! - `seal distribute`: Manual and automatic distribution to sectors.
//! - `seal lots`: Lot overview and whole-lot destruction.
//!
//! ```bash
//! seal --sectors "S1=Receiving,S2=Shipping" seals generate --prefix LACRE --start 1 --end 50 --lot L1
//! seal distribute auto --sector S1 --sector S2
//! seal lots destroy L1 --reason "supplier recall"
//! ```

pub mod distribute;
pub mod lots;
pub mod seals;
pub mod workspace;

use anyhow::Result;
use serde::Serialize;

/// Pretty-print a result document to stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
