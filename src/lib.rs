pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::cache::Store;
use crate::core::config::AppConfig;
use crate::core::spot::SNAPSHOT_TTL;
use anyhow::Result;
use chrono::TimeDelta;
use providers::caching::CachingSpotPriceProvider;
use providers::metals_dev::MetalsDevProvider;
use store::KeyValueStore;
use tracing::{debug, info, warn};

pub enum AppCommand {
    Prices { refresh: bool },
    Inventory,
    Summary,
    Arbitrage,
    Validate { arbitrage: bool },
}

fn open_store(config: &AppConfig) -> KeyValueStore {
    if !config.cache.persist {
        return KeyValueStore::in_memory();
    }
    match config.default_data_path() {
        Ok(path) => KeyValueStore::open(&path),
        Err(e) => {
            warn!("No data directory available: {}. Caching in memory", e);
            KeyValueStore::in_memory()
        }
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("coinstack starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(
        user = %config.user.id,
        coins = config.coins.len(),
        arbitrage = config.arbitrage.len(),
        "Loaded config"
    );

    let store = open_store(&config);
    let ttl = TimeDelta::try_hours(config.cache.ttl_hours).unwrap_or(SNAPSHOT_TTL);
    let provider = CachingSpotPriceProvider::new(
        MetalsDevProvider::from_config(&config.providers.metals_dev),
        store.get_collection("spot", config.cache.persist),
    )
    .with_ttl(ttl);

    match command {
        AppCommand::Prices { refresh } => cli::prices::run(&provider, refresh).await,
        AppCommand::Inventory => cli::inventory::run(&config, &config.user, &provider).await,
        AppCommand::Summary => cli::summary::run(&config, &config.user, &provider).await,
        AppCommand::Arbitrage => cli::arbitrage::run(&config, &config.user),
        AppCommand::Validate { arbitrage } => {
            cli::validate::run(&config, &config.user, arbitrage)
        }
    }
}
