pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::asset::SortField;
use crate::core::config::AppConfig;
use crate::core::fund::FundCatalog;
use crate::core::role::Role;
use crate::providers::parser::ParserClient;
use crate::store::rest::RestStore;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, info};

pub enum AppCommand {
    Assets {
        search: Option<String>,
        sort_by: String,
        ascending: bool,
    },
    Funds,
    Assign {
        asset: String,
        fund: String,
        price: Option<f64>,
    },
    Import {
        files: Vec<PathBuf>,
    },
    InitPrices,
}

pub async fn run_command(
    command: AppCommand,
    role: Role,
    config_path: Option<&str>,
) -> Result<()> {
    info!("Fund tracker starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    // Built once per session; components borrow it.
    let catalog = FundCatalog::standard();
    let store = RestStore::new(&config.store)?;

    match command {
        AppCommand::Assets {
            search,
            sort_by,
            ascending,
        } => {
            cli::assets::run(
                &store,
                &role,
                search.as_deref(),
                SortField::from(sort_by.as_str()),
                ascending,
            )
            .await
        }
        AppCommand::Funds => cli::funds::run(&store, &catalog, &role).await,
        AppCommand::Assign { asset, fund, price } => {
            cli::assign::run(&store, &asset, &fund, price).await
        }
        AppCommand::Import { files } => {
            let parser_config = config.parser.as_ref().context(
                "The `parser` section is missing from the configuration; `import` needs the T21 parser service",
            )?;
            let parser = ParserClient::new(&parser_config.base_url, &parser_config.api_key)?;
            cli::import::run(&store, &parser, &role, &files).await
        }
        AppCommand::InitPrices => cli::init_prices::run(&store, &role).await,
    }
}
