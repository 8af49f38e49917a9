use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use common::error::MarketDataError;
use common::models::Signal;
use common::traits::{AlertSink, PriceSource};
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time;
use tracing::{debug, error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::{EngineConfig, StampPolicy};
use crate::cooldown::CooldownRegistry;
use crate::indicators::{RsiError, calculate_rsi};

/// Outcome of evaluating a single symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// Signalled within the cooldown window; nothing was fetched.
    Cooling { remaining: TimeDelta },
    /// RSI stayed inside the bands.
    Neutral { rsi: Decimal },
    /// A signal fired and was handed to the alert sink.
    Fired { signal: Signal, delivered: bool },
}

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("price fetch failed: {0}")]
    Fetch(#[from] MarketDataError),

    #[error(transparent)]
    Indicator(#[from] RsiError),

    #[error("price fetch timed out after {0:?}")]
    Timeout(Duration),
}

/// Per-pass counters, logged after every pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    pub evaluated: usize,
    pub cooling: usize,
    pub signals: usize,
    pub insufficient: usize,
    pub errors: usize,
    pub interrupted: bool,
    /// The price source refused a request and the pass stopped early.
    pub rate_limited: bool,
}

/// Walks the symbol universe one symbol at a time, raising an alert when RSI
/// leaves the configured bands and holding each symbol back for the cooldown
/// window afterwards.
pub struct SignalEngine {
    config: EngineConfig,
    prices: Arc<dyn PriceSource>,
    alerts: Arc<dyn AlertSink>,
    clock: Arc<dyn Clock>,
    registry: CooldownRegistry,
}

impl SignalEngine {
    pub fn new(
        config: EngineConfig,
        prices: Arc<dyn PriceSource>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        let registry = CooldownRegistry::new(config.cooldown);
        Self {
            config,
            prices,
            alerts,
            clock: Arc::new(SystemClock),
            registry,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_registry(mut self, registry: CooldownRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &CooldownRegistry {
        &self.registry
    }

    /// Runs passes over `symbols` until `shutdown` flips to `true` or its
    /// sender is dropped.
    pub async fn run(&mut self, symbols: &[String], mut shutdown: watch::Receiver<bool>) {
        info!("Starting Signal Engine for {} symbols", symbols.len());

        let mut pass: u64 = 0;
        while !shutdown_requested(&shutdown) {
            pass += 1;
            let summary = self.run_pass(symbols, &mut shutdown).await;
            info!(
                pass,
                evaluated = summary.evaluated,
                cooling = summary.cooling,
                signals = summary.signals,
                insufficient = summary.insufficient,
                errors = summary.errors,
                rate_limited = summary.rate_limited,
                "Pass complete"
            );

            if summary.interrupted {
                break;
            }
            if summary.rate_limited {
                warn!("Rate limited, backing off for {:?}", self.config.rate_limit_backoff);
                if pause(self.config.rate_limit_backoff, &mut shutdown).await {
                    break;
                }
            } else if self.config.pass_delay.is_zero() {
                tokio::task::yield_now().await;
            } else if pause(self.config.pass_delay, &mut shutdown).await {
                break;
            }
        }

        info!("Signal Engine stopped.");
    }

    /// Evaluates every symbol once. Failures are logged per symbol and never
    /// abort the pass.
    pub async fn run_pass(
        &mut self,
        symbols: &[String],
        shutdown: &mut watch::Receiver<bool>,
    ) -> PassSummary {
        let mut summary = PassSummary::default();
        let mut touched_upstream = false;

        for symbol in symbols {
            if shutdown_requested(shutdown) {
                summary.interrupted = true;
                break;
            }
            if touched_upstream
                && !self.config.symbol_delay.is_zero()
                && pause(self.config.symbol_delay, shutdown).await
            {
                summary.interrupted = true;
                break;
            }

            touched_upstream = true;
            match self.evaluate_symbol(symbol).await {
                Ok(Evaluation::Cooling { remaining }) => {
                    touched_upstream = false;
                    summary.cooling += 1;
                    debug!(
                        symbol = %symbol,
                        remaining_secs = remaining.num_seconds(),
                        "Signalled within cooldown window. Skipping..."
                    );
                }
                Ok(Evaluation::Neutral { .. }) => summary.evaluated += 1,
                Ok(Evaluation::Fired { .. }) => {
                    summary.evaluated += 1;
                    summary.signals += 1;
                }
                Err(EvaluationError::Indicator(e @ RsiError::InsufficientData { .. })) => {
                    summary.insufficient += 1;
                    warn!(symbol = %symbol, error = %e, "Not enough data. Skipping...");
                }
                Err(EvaluationError::Fetch(e)) if e.is_rate_limit() => {
                    summary.errors += 1;
                    summary.rate_limited = true;
                    warn!(
                        symbol = %symbol,
                        error = %e,
                        "Rate limit detected, stopping further requests"
                    );
                    break;
                }
                Err(e) => {
                    summary.errors += 1;
                    error!(symbol = %symbol, error = %e, "Failed to evaluate symbol");
                }
            }
        }

        summary
    }

    /// One cooldown-check / fetch / compute / alert cycle for `symbol`.
    pub async fn evaluate_symbol(&mut self, symbol: &str) -> Result<Evaluation, EvaluationError> {
        let now = self.clock.now();
        if let Some(remaining) = self.registry.remaining(symbol, now) {
            return Ok(Evaluation::Cooling { remaining });
        }

        let closes = self.fetch_closes(symbol).await?;
        let period = self.config.rsi_period;
        let rsi = calculate_rsi(&closes, period)?;
        debug!(symbol = %symbol, rsi = %rsi.round_dp(2), "RSI({}) computed", period);

        let Some(direction) = self.config.thresholds.classify(rsi) else {
            return Ok(Evaluation::Neutral { rsi });
        };

        // calculate_rsi guarantees more than `period` closes.
        let entry_price = closes.last().copied().unwrap_or_default();
        let signal = self
            .config
            .targets
            .build_signal(symbol, direction, rsi, entry_price);

        info!(
            symbol = %symbol,
            direction = %direction,
            rsi = %rsi.round_dp(2),
            entry = %entry_price.normalize(),
            "{} signal for {}!",
            direction,
            symbol
        );

        let delivered = self.deliver(&signal).await;
        if delivered || self.config.stamp_policy == StampPolicy::OnDetection {
            self.registry.stamp(symbol, now);
        } else {
            warn!(symbol = %symbol, "Alert not delivered; cooldown not started");
        }

        Ok(Evaluation::Fired { signal, delivered })
    }

    async fn fetch_closes(&self, symbol: &str) -> Result<Vec<Decimal>, EvaluationError> {
        let fetch = self
            .prices
            .closing_prices(symbol, self.config.interval, self.config.lookback);

        match time::timeout(self.config.call_timeout, fetch).await {
            Ok(closes) => Ok(closes?),
            Err(_) => Err(EvaluationError::Timeout(self.config.call_timeout)),
        }
    }

    async fn deliver(&self, signal: &Signal) -> bool {
        let message = signal.to_message();
        match time::timeout(self.config.call_timeout, self.alerts.deliver(&message)).await {
            Ok(Ok(())) => {
                debug!(symbol = %signal.symbol, "Alert delivered");
                true
            }
            Ok(Err(e)) => {
                error!(symbol = %signal.symbol, error = %e, "Failed to deliver alert");
                false
            }
            Err(_) => {
                error!(
                    symbol = %signal.symbol,
                    "Alert delivery timed out after {:?}", self.config.call_timeout
                );
                false
            }
        }
    }
}

/// True once shutdown was signalled or nobody is left to signal it.
fn shutdown_requested(shutdown: &watch::Receiver<bool>) -> bool {
    *shutdown.borrow() || shutdown.has_changed().is_err()
}

/// Sleeps for `delay`, returning early with `true` if shutdown is requested.
async fn pause(delay: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = time::sleep(delay) => shutdown_requested(shutdown),
        changed = shutdown.changed() => changed.is_err() || *shutdown.borrow(),
    }
}
