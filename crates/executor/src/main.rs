use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use dotenvy::dotenv;
use tokio::{signal, sync::watch, time};
use tracing::{debug, error, info, warn};

use common::logger;
use common::traits::{AlertSink, SymbolSource};
use market_data::BinanceFuturesClient;
use strategy::SignalEngine;

use crate::config::BotConfig;
use crate::services::{ConsoleService, TelegramService};

mod config;
mod services;

const STARTUP_SETTLE: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logger::setup_logger();
    debug!("System starting up...");

    let config = BotConfig::from_env().context("Invalid configuration")?;
    info!(
        period = config.engine.rsi_period,
        lookback = config.engine.lookback,
        interval = %config.engine.interval,
        short_threshold = %config.engine.thresholds.short_threshold,
        long_threshold = %config.engine.thresholds.long_threshold,
        cooldown_minutes = config.engine.cooldown.num_minutes(),
        stamp_policy = %config.engine.stamp_policy,
        "Engine configured"
    );

    let client = Arc::new(BinanceFuturesClient::from_env()?);
    info!("Using Binance futures API at {}", client.base_url());

    let symbols = match config.symbols {
        Some(symbols) => {
            info!("Using {} symbols from SIGNAL_SYMBOLS", symbols.len());
            symbols
        }
        None => client
            .active_symbols()
            .await
            .context("Failed to fetch active USDⓈ-M perpetual symbols")?,
    };
    if symbols.is_empty() {
        bail!("No tradable symbols to monitor");
    }
    info!("Found {} active USDⓈ-M perpetual symbols.", symbols.len());

    let alerts: Arc<dyn AlertSink> = match config.telegram {
        Some(telegram) => {
            info!("Telegram notifications enabled for chat {}", telegram.chat_id);
            Arc::new(TelegramService::new(telegram))
        }
        None => {
            warn!("TELEGRAM_BOT_TOKEN not set, alerts will only be logged");
            Arc::new(ConsoleService)
        }
    };

    time::sleep(STARTUP_SETTLE).await;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown requested, finishing current symbol...");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                error!("Failed to listen for shutdown signal: {}", e);
                // Keep the sender alive so the engine is not stopped.
                std::future::pending::<()>().await;
            }
        }
    });

    let mut engine = SignalEngine::new(config.engine, client, alerts);
    engine.run(&symbols, shutdown_rx).await;

    info!(
        "Exiting. {} symbols signalled during this run.",
        engine.registry().len()
    );
    Ok(())
}
