//! # seal CLI entry point
//!
//! Parses command-line arguments, opens the state file, and dispatches to
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use seal_cli::distribute::{run_distribute, DistributeArgs};
use seal_cli::lots::{run_lots, LotArgs};
use seal_cli::seals::{run_seals, SealArgs};
use seal_cli::workspace::Workspace;
use seal_registry::{parse_sectors, RegistryConfig, SectorInfo};

/// Seal registry operator CLI.
///
/// Works against a local JSON state file. Registry tunables are read from
/// the same `SEAL_*` environment variables as the HTTP service.
#[derive(Parser, Debug)]
#[command(name = "seal", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the state file.
    #[arg(long, global = true, default_value = "seals.json")]
    state: PathBuf,

    /// Known sectors as `id=Name,...`. Falls back to `SEAL_SECTORS`.
    #[arg(long, global = true)]
    sectors: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Seal generation, lookup, and lifecycle transitions.
    Seals(SealArgs),

    /// Distribute available seals to sectors.
    Distribute(DistributeArgs),

    /// Lot overview and destruction.
    Lots(LotArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    let sectors = sectors(cli.sectors.as_deref())?;
    let ws = Workspace::open(&cli.state, sectors, RegistryConfig::from_env()?)?;
    tracing::debug!(state = %cli.state.display(), "workspace opened");

    match cli.command {
        Commands::Seals(args) => run_seals(&args, &ws),
        Commands::Distribute(args) => run_distribute(&args, &ws),
        Commands::Lots(args) => run_lots(&args, &ws),
    }
}

fn sectors(flag: Option<&str>) -> Result<Vec<SectorInfo>> {
    match flag {
        Some(raw) => Ok(parse_sectors(raw)?),
        None => match std::env::var("SEAL_SECTORS") {
            Ok(raw) => Ok(parse_sectors(&raw)?),
            Err(_) => Ok(Vec::new()),
        },
    }
}
