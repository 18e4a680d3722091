use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use coinstack::cli::setup::setup;
use coinstack::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for coinstack::AppCommand {
    fn from(cmd: Commands) -> coinstack::AppCommand {
        match cmd {
            Commands::Prices { refresh } => coinstack::AppCommand::Prices { refresh },
            Commands::Inventory => coinstack::AppCommand::Inventory,
            Commands::Summary => coinstack::AppCommand::Summary,
            Commands::Arbitrage => coinstack::AppCommand::Arbitrage,
            Commands::Validate { arbitrage } => coinstack::AppCommand::Validate { arbitrage },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display current gold, silver and platinum spot prices
    Prices {
        /// Fetch from the provider even if cached prices are still fresh
        #[arg(short, long)]
        refresh: bool,
    },
    /// Display every coin with its melt value and premiums
    Inventory,
    /// Display the inventory dashboard
    Summary,
    /// Display published arbitrage coins
    Arbitrage,
    /// Check coin records for problems
    Validate {
        /// Check the arbitrage list instead (admins only)
        #[arg(short, long)]
        arbitrage: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => coinstack::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
