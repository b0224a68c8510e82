//! # Seals Subcommand
//!
//! - `generate`: Create a contiguous batch for a prefix.
//! - `next-number`: Where the next batch must start.
//! - `show`: One seal with its history.
//! - `list`: Filtered, paginated listing, newest first.
//! - `transition`: Apply one lifecycle edge.
//! - `destroy`: Close out one seal as lost, damaged, or destroyed.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::json;

use seal_core::{LotNumber, Prefix, SealCode, SectorId, ShipmentId};
use seal_registry::SealFilter;
use seal_state::{CloseOutStatus, SealStatus, TransitionContext};

use crate::print_json;
use crate::workspace::Workspace;

/// Arguments for the `seal seals` subcommand.
#[derive(Args, Debug)]
pub struct SealArgs {
    #[command(subcommand)]
    pub command: SealCommand,
}

#[derive(Subcommand, Debug)]
pub enum SealCommand {
    /// Generate seals PREFIX{start..=end}. `start` must be the next number.
    Generate {
        #[arg(long)]
        prefix: String,
        #[arg(long)]
        start: u64,
        #[arg(long)]
        end: u64,
        /// Lot the batch belongs to.
        #[arg(long)]
        lot: Option<String>,
    },

    /// Print the next expected number for a prefix.
    NextNumber {
        #[arg(long)]
        prefix: String,
    },

    /// Show one seal.
    Show { code: String },

    /// List seals, newest first.
    List {
        /// Stored status to match.
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        sector: Option<String>,
        #[arg(long)]
        lot: Option<String>,
        /// Case-insensitive match on code or lot number.
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        page: Option<usize>,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Move a seal to another status.
    Transition {
        code: String,
        /// Target status (available, assigned, reserved, linked, used, lost, damaged, destroyed).
        #[arg(long = "to")]
        target: String,
        #[arg(long)]
        sector: Option<String>,
        #[arg(long)]
        shipment: Option<String>,
        #[arg(long)]
        reason: Option<String>,
    },

    /// Close out one seal.
    Destroy {
        code: String,
        #[arg(long)]
        reason: String,
        /// lost, damaged, or destroyed.
        #[arg(long = "as", default_value = "destroyed")]
        target: String,
    },
}

/// Execute the seals subcommand.
pub fn run_seals(args: &SealArgs, ws: &Workspace) -> Result<u8> {
    let registry = ws.registry();
    match &args.command {
        SealCommand::Generate {
            prefix,
            start,
            end,
            lot,
        } => {
            let prefix = Prefix::new(prefix)?;
            let lot = match lot {
                Some(raw) => LotNumber::optional(raw)?,
                None => None,
            };
            let generated = registry.generate(prefix, *start, *end, lot)?;
            ws.save()?;
            print_json(&generated)?;
        }

        SealCommand::NextNumber { prefix } => {
            let prefix = Prefix::new(prefix)?;
            let next = registry.next_number(&prefix)?;
            let code = SealCode::compose(&prefix, next, registry.config().code_width);
            print_json(&json!({
                "prefix": prefix,
                "next_number": next,
                "next_code": code,
            }))?;
        }

        SealCommand::Show { code } => {
            let view = registry.get(&SealCode::new(code)?)?;
            print_json(&view)?;
        }

        SealCommand::List {
            status,
            sector,
            lot,
            search,
            page,
            limit,
        } => {
            let filter = SealFilter {
                status: status
                    .as_deref()
                    .map(str::parse::<SealStatus>)
                    .transpose()?,
                sector_id: sector.as_deref().map(SectorId::new).transpose()?,
                lot: lot.as_deref().map(LotNumber::new).transpose()?,
                search: search.clone(),
                page: *page,
                limit: *limit,
            };
            print_json(&registry.list(&filter)?)?;
        }

        SealCommand::Transition {
            code,
            target,
            sector,
            shipment,
            reason,
        } => {
            let to: SealStatus = target
                .parse()
                .with_context(|| format!("invalid target status for {code}"))?;
            let ctx = TransitionContext {
                sector_id: sector.as_deref().map(SectorId::new).transpose()?,
                shipment_id: shipment.as_deref().map(ShipmentId::new).transpose()?,
                reason: reason.clone(),
            };
            let seal = registry.transition(&SealCode::new(code)?, to, &ctx)?;
            ws.save()?;
            print_json(&registry.view(seal))?;
        }

        SealCommand::Destroy {
            code,
            reason,
            target,
        } => {
            let target: CloseOutStatus = target.parse()?;
            let seal = registry.destroy_single(&SealCode::new(code)?, reason, target)?;
            ws.save()?;
            print_json(&registry.view(seal))?;
        }
    }
    Ok(0)
}
