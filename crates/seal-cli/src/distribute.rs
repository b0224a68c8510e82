//! # Distribute Subcommand
//!
//! Hands available stock to sectors. `manual` and `auto` commit seal by
//! seal and save whatever was committed; the exit code is 2 when any seal
//! failed so scripts can reconcile. `plan` only prints the split.

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};

use seal_core::SectorId;
use seal_registry::{AssignmentMode, DistributionOutcome};

use crate::print_json;
use crate::workspace::Workspace;

/// Arguments for the `seal distribute` subcommand.
#[derive(Args, Debug)]
pub struct DistributeArgs {
    #[command(subcommand)]
    pub command: DistributeCommand,
}

#[derive(Subcommand, Debug)]
pub enum DistributeCommand {
    /// Give one sector a fixed number of seals, lowest codes first.
    Manual {
        #[arg(long)]
        sector: String,
        #[arg(long, allow_hyphen_values = true)]
        quantity: i64,
        /// assign or reserve.
        #[arg(long, default_value = "assign")]
        mode: String,
    },

    /// Split available stock evenly across sectors in the order given.
    Auto {
        /// Repeat for each sector.
        #[arg(long = "sector", required = true)]
        sectors: Vec<String>,
        /// Distribute at most this many seals.
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, default_value = "assign")]
        mode: String,
    },

    /// Print the split `auto` would make without committing it.
    Plan {
        #[arg(long = "sector", required = true)]
        sectors: Vec<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
}

/// Execute the distribute subcommand.
pub fn run_distribute(args: &DistributeArgs, ws: &Workspace) -> Result<u8> {
    let registry = ws.registry();
    match &args.command {
        DistributeCommand::Manual {
            sector,
            quantity,
            mode,
        } => {
            let mode = parse_mode(mode)?;
            let outcome = registry.distribute_manual(SectorId::new(sector)?, *quantity, mode)?;
            finish(ws, &outcome)
        }

        DistributeCommand::Auto {
            sectors,
            limit,
            mode,
        } => {
            let mode = parse_mode(mode)?;
            let outcome = registry.distribute_auto(&sector_ids(sectors)?, *limit, mode)?;
            finish(ws, &outcome)
        }

        DistributeCommand::Plan { sectors, limit } => {
            let plan = registry.preview_auto(&sector_ids(sectors)?, *limit)?;
            print_json(&plan)?;
            Ok(0)
        }
    }
}

fn finish(ws: &Workspace, outcome: &DistributionOutcome) -> Result<u8> {
    if !outcome.assigned().is_empty() {
        ws.save()?;
    }
    print_json(outcome)?;
    if outcome.report.is_complete() {
        Ok(0)
    } else {
        tracing::warn!(
            failed = outcome.report.failed.len(),
            "distribution committed partially"
        );
        Ok(2)
    }
}

fn parse_mode(raw: &str) -> Result<AssignmentMode> {
    raw.parse().map_err(|e: String| anyhow!(e))
}

fn sector_ids(raw: &[String]) -> Result<Vec<SectorId>> {
    raw.iter()
        .map(|s| SectorId::new(s).map_err(Into::into))
        .collect()
}
