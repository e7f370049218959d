//! Assetsync CLI - assetsync command

use clap::{Parser, Subcommand};
use anyhow::Result;
use std::path::PathBuf;

mod cmd;

/// Assetsync - keep a derived asset tree in sync with a raw asset tree
#[derive(Parser)]
#[command(name = "assetsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a default assetsync.toml and the asset folders
    Init {
        /// Project directory (default: current directory)
        #[arg(default_value = ".")]
        directory: PathBuf,
    },
    /// Reconcile once, then watch for changes until interrupted
    Run {
        /// Path to the configuration file
        #[arg(long, default_value = "assetsync.toml")]
        config: PathBuf,
    },
    /// Run a single full reconciliation pass and exit
    Sync {
        /// Path to the configuration file
        #[arg(long, default_value = "assetsync.toml")]
        config: PathBuf,
    },
    /// Print the derived path a raw path maps to
    Map {
        /// Raw-tree path to map
        path: PathBuf,

        /// Path to the configuration file
        #[arg(long, default_value = "assetsync.toml")]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { directory } => cmd::init::run(&directory),
        Commands::Run { config } => cmd::run::run(&config),
        Commands::Sync { config } => cmd::sync::run(&config),
        Commands::Map { path, config } => cmd::map::run(&config, &path),
    }
}
