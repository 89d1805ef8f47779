use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fundlot::core::log::init_logging;
use fundlot::core::role::Role;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Acting role for this session, e.g. "Admin" or "Partner One"
    #[arg(short, long, global = true, default_value = "Admin")]
    role: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fundlot::AppCommand {
    fn from(cmd: Commands) -> fundlot::AppCommand {
        match cmd {
            Commands::Assets {
                search,
                sort_by,
                ascending,
            } => fundlot::AppCommand::Assets {
                search,
                sort_by,
                ascending,
            },
            Commands::Funds => fundlot::AppCommand::Funds,
            Commands::Assign { asset, fund, price } => {
                fundlot::AppCommand::Assign { asset, fund, price }
            }
            Commands::Import { files } => fundlot::AppCommand::Import { files },
            Commands::InitPrices => fundlot::AppCommand::InitPrices,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List unassigned assets visible to the session role
    Assets {
        /// Filter by VIN, make, model or year
        #[arg(short, long)]
        search: Option<String>,
        /// Sort by "year", "make" or "model"
        #[arg(long, default_value = "year")]
        sort_by: String,
        /// Sort ascending instead of descending
        #[arg(long)]
        ascending: bool,
    },
    /// Display fund statistics
    Funds,
    /// Assign an asset to a fund
    Assign {
        /// Asset id or 17-character VIN
        asset: String,
        /// Target fund id (cha10, tra10, bhph, caps, cos10, disabled)
        fund: String,
        /// Disposition price override
        #[arg(short, long)]
        price: Option<f64>,
    },
    /// Upload T21 documents and import their vehicles
    Import {
        /// Document files to process
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Set disposition prices of assigned assets to their total cost
    InitPrices,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let role = Role::from(cli.role.as_str());
    let result = match cli.command {
        Some(Commands::Setup) => fundlot::cli::setup::run(),
        Some(cmd) => fundlot::run_command(cmd.into(), role, cli.config_path.as_deref()).await,
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
