//! boltyard CLI - browse the fastener catalog and export fastener models

use anyhow::{Context, Result};
use boltyard::Settings;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "boltyard")]
#[command(about = "Parametric screws, nuts and washers", long_about = None)]
struct Cli {
    /// Settings file (default: ./boltyard.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Fastener family on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FamilyArg {
    Screw,
    Nut,
    Washer,
}

impl From<FamilyArg> for boltyard::Family {
    fn from(family: FamilyArg) -> Self {
        match family {
            FamilyArg::Screw => boltyard::Family::Screw,
            FamilyArg::Nut => boltyard::Family::Nut,
            FamilyArg::Washer => boltyard::Family::Washer,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List classes and types, optionally only those listing a size
    List {
        /// Restrict to one family
        #[arg(short, long, value_enum)]
        family: Option<FamilyArg>,
        /// Only types that list this size (e.g. M5-0.8)
        #[arg(short, long)]
        size: Option<String>,
    },
    /// Show dimensions, drill data and joints of one fastener
    Info {
        #[command(flatten)]
        fastener: commands::FastenerArgs,
    },
    /// Check catalog invariants across every row
    Check,
    /// Write the construction document of one fastener as JSON
    Export {
        #[command(flatten)]
        fastener: commands::FastenerArgs,
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = Settings::load_or_default(cli.config.as_deref())
        .context("failed to load settings")?;
    tracing::debug!(?settings, "using settings");

    match cli.command {
        Commands::List { family, size } => commands::list(family, size.as_deref())?,
        Commands::Info { fastener } => commands::info(&fastener, &settings)?,
        Commands::Check => commands::check(&settings)?,
        Commands::Export { fastener, output } => commands::export(&fastener, &settings, &output)?,
    }

    Ok(())
}
