pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::cli::favorites::FavoritesAction;
use crate::cli::rates::RatesArgs;
use crate::core::RateSession;
use crate::core::config::AppConfig;
use crate::core::currency::normalize_code;
use crate::core::settings::PreferencesStore;
use crate::providers::{CachingRateSource, FrankfurterSource};
use anyhow::{Result, bail};
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Rates(RatesArgs),
    History {
        target: String,
        base: Option<String>,
        days: Option<u32>,
    },
    Favorites(FavoritesAction),
    Base(String),
    Sync,
}

/// Builds a session over the configured rate source and settings store.
pub async fn build_session(
    config: &AppConfig,
    store: Arc<dyn PreferencesStore>,
) -> Result<RateSession> {
    let source = CachingRateSource::new(FrankfurterSource::new(config.frankfurter_url()));
    RateSession::new(Arc::new(source), store).await
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxmate starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = store::open_settings_store(&config)?;

    if let AppCommand::Sync = command {
        let Some((remote, identity)) = store::open_remote(&config) else {
            bail!("Sync is not configured. Add a `sync` section to the config file.");
        };
        cli::sync::run(store.as_ref(), &remote, &identity).await?;
        return Ok(());
    }

    let session = build_session(&config, store).await?;
    let result = match command {
        AppCommand::Rates(args) => cli::rates::run(&session, args).await,
        AppCommand::History { target, base, days } => {
            let days = days.unwrap_or(config.history_days);
            cli::history::run(&session, base.as_deref(), &target, days).await
        }
        AppCommand::Favorites(action) => cli::favorites::run(&session, action).await,
        AppCommand::Base(code) => {
            if normalize_code(&code).is_none() {
                bail!("Invalid currency code: {code}");
            }
            session.set_base_currency(&code).await;
            println!("Base currency: {}", session.base_currency().await);
            Ok(())
        }
        AppCommand::Sync => unreachable!("Sync is handled before a session is built"),
    };
    session.close().await;
    result
}
