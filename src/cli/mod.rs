mod profile;
mod record;
mod report;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::services::RollupService;
use crate::store::JsonFileStore;
use crate::types::WindowKind;

pub use profile::ProfileCommand;
pub use record::RecordCommand;
pub use report::{render_text, ReportArgs};

/// Liquid-consumption tracker with daily, weekly and monthly rollups
#[derive(Parser)]
#[command(name = "hydrotrack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Data directory (default: $HYDROTRACK_DATA_DIR or ~/.hydrotrack)
    #[arg(long, global = true, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create, inspect, list and delete consumption records
    #[command(subcommand)]
    Record(RecordCommand),

    /// Manage owner profiles
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Show today's consumption
    Daily(ReportArgs),

    /// Show consumption for the trailing 7 days
    Weekly(ReportArgs),

    /// Show consumption for the trailing 30 days
    Monthly(ReportArgs),
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let config = Config::load(self.data_dir)?;
        let store = Arc::new(JsonFileStore::open(&config)?);

        match self.command {
            Commands::Record(cmd) => cmd.run(store.as_ref())?,
            Commands::Profile(cmd) => cmd.run(store.as_ref())?,
            Commands::Daily(args) => args.run(&rollup(store, config), WindowKind::Day)?,
            Commands::Weekly(args) => args.run(&rollup(store, config), WindowKind::Week)?,
            Commands::Monthly(args) => args.run(&rollup(store, config), WindowKind::Month)?,
        }
        Ok(())
    }
}

fn rollup(store: Arc<JsonFileStore>, config: Config) -> RollupService {
    RollupService::new(store.clone(), store, config)
}
