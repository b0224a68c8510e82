//! # Lots Subcommand
//!
//! - `list`: Every lot with its counts and destruction eligibility.
//! - `destroy`: Destroy a whole lot; refused if any seal left stock.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;

use seal_core::LotNumber;

use crate::print_json;
use crate::workspace::Workspace;

/// Arguments for the `seal lots` subcommand.
#[derive(Args, Debug)]
pub struct LotArgs {
    #[command(subcommand)]
    pub command: LotCommand,
}

#[derive(Subcommand, Debug)]
pub enum LotCommand {
    /// List lots.
    List,

    /// Destroy every seal of a lot.
    Destroy {
        lot: String,
        #[arg(long)]
        reason: String,
    },
}

/// Execute the lots subcommand.
pub fn run_lots(args: &LotArgs, ws: &Workspace) -> Result<u8> {
    let registry = ws.registry();
    match &args.command {
        LotCommand::List => print_json(&registry.lot_summaries()?)?,

        LotCommand::Destroy { lot, reason } => {
            let lot = LotNumber::new(lot)?;
            let report = registry.destroy_lot(&lot, reason)?;
            ws.save()?;
            print_json(&json!({
                "lot_number": lot,
                "destroyed": report.succeeded,
            }))?;
        }
    }
    Ok(0)
}
