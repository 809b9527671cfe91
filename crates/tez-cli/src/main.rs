//! # tez-cli
//!
//! Command-line runner for the FA1.2 end-to-end suite.
//!
//! ## Usage
//!
//! ```bash
//! # Run the suite against the configured node
//! tez test
//! tez --rpc-url http://localhost:8732 test
//!
//! # Inspect the token
//! tez storage
//! tez storage tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb
//!
//! # Restore a faucet identity
//! tez account faucetA.json
//!
//! # Configuration
//! tez config --show
//! tez config --set-rpc http://localhost:8732
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod error;
mod output;

pub use config::Config;
pub use error::CliError;
pub use output::Output;

/// FA1.2 end-to-end test runner
#[derive(Parser, Debug)]
#[command(name = "tez")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// RPC endpoint URL
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Config file (defaults to ~/.tez-fa12/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level, overridden by RUST_LOG
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// CLI commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the FA1.2 suite
    Test,
    /// Show token metadata and ledger entries
    Storage {
        /// Accounts to look up (defaults to both faucets)
        addresses: Vec<String>,
    },
    /// Derive the identity of a faucet file
    Account {
        /// Faucet JSON file
        faucet_file: PathBuf,
    },
    /// Show or edit configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Set RPC URL
        #[arg(long)]
        set_rpc: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let result = run(cli.command, cli.config, cli.rpc_url, cli.json).await;

    if let Err(e) = result {
        if cli.json {
            println!(
                "{}",
                serde_json::json!({
                    "error": e.to_string(),
                    "success": false
                })
            );
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

async fn run(
    command: Commands,
    config_path: Option<PathBuf>,
    rpc_url: Option<String>,
    json: bool,
) -> Result<(), CliError> {
    let mut config = Config::load(config_path.as_deref())?;

    // Config edits persist the file as loaded, without the --rpc-url override
    if let Commands::Config { show, set_rpc } = command {
        return commands::config::execute(&mut config, config_path.as_deref(), show, set_rpc, json);
    }

    if let Some(rpc_url) = rpc_url {
        config.rpc_url = rpc_url;
    }

    match command {
        Commands::Test => commands::test::execute(&config, json).await,
        Commands::Storage { addresses } => commands::storage::execute(&config, &addresses, json).await,
        Commands::Account { faucet_file } => commands::account::execute(&faucet_file, json),
        Commands::Config { .. } => Ok(()),
    }
}
