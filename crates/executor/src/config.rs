use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;
use common::models::KlineInterval;
use rust_decimal::Decimal;
use strategy::{ConfigError, EngineConfig, StampPolicy};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID must be set together")]
    IncompleteTelegram,

    #[error(transparent)]
    Engine(#[from] ConfigError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: i64,
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub engine: EngineConfig,
    /// Replaces the exchange universe when set.
    pub symbols: Option<Vec<String>>,
    /// Alerts go to the log only when absent.
    pub telegram: Option<TelegramConfig>,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, EnvError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, EnvError> {
        let mut engine = EngineConfig::default();

        if let Some(period) = parse_var::<usize>(&lookup, "RSI_PERIOD")? {
            engine.rsi_period = period;
        }
        if let Some(lookback) = parse_var::<u16>(&lookup, "RSI_LOOKBACK")? {
            engine.lookback = lookback;
        }
        if let Some(interval) = parse_var::<KlineInterval>(&lookup, "RSI_INTERVAL")? {
            engine.interval = interval;
        }
        if let Some(short) = parse_var::<Decimal>(&lookup, "RSI_SHORT_THRESHOLD")? {
            engine.thresholds.short_threshold = short;
        }
        if let Some(long) = parse_var::<Decimal>(&lookup, "RSI_LONG_THRESHOLD")? {
            engine.thresholds.long_threshold = long;
        }
        if let Some(minutes) = parse_var::<i64>(&lookup, "SIGNAL_COOLDOWN_MINUTES")? {
            engine.cooldown = TimeDelta::try_minutes(minutes).ok_or(EnvError::Invalid {
                name: "SIGNAL_COOLDOWN_MINUTES",
                value: minutes.to_string(),
                reason: "out of range".to_string(),
            })?;
        }
        if let Some(policy) = parse_var::<StampPolicy>(&lookup, "SIGNAL_STAMP_POLICY")? {
            engine.stamp_policy = policy;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "SYMBOL_DELAY_MS")? {
            engine.symbol_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "PASS_DELAY_MS")? {
            engine.pass_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "CALL_TIMEOUT_SECS")? {
            engine.call_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "RATE_LIMIT_BACKOFF_SECS")? {
            engine.rate_limit_backoff = Duration::from_secs(secs);
        }
        engine.validate()?;

        let symbols = lookup("SIGNAL_SYMBOLS")
            .map(|raw| parse_symbols(&raw))
            .filter(|symbols| !symbols.is_empty());

        let telegram = match (lookup("TELEGRAM_BOT_TOKEN"), lookup("TELEGRAM_CHAT_ID")) {
            (Some(token), Some(_)) if token.trim().is_empty() => {
                return Err(EnvError::IncompleteTelegram);
            }
            (Some(token), Some(_)) => Some(TelegramConfig {
                token: token.trim().to_string(),
                chat_id: parse_var::<i64>(&lookup, "TELEGRAM_CHAT_ID")?
                    .ok_or(EnvError::IncompleteTelegram)?,
            }),
            (None, None) => None,
            _ => return Err(EnvError::IncompleteTelegram),
        };

        Ok(Self {
            engine,
            symbols,
            telegram,
        })
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, EnvError>
where
    T: FromStr,
    T::Err: Display,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|e| EnvError::Invalid {
            name,
            value: raw.clone(),
            reason: e.to_string(),
        })
}

/// Comma-separated, case-insensitive, duplicates dropped in order.
fn parse_symbols(raw: &str) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();
    for symbol in raw
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
    {
        if !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }
    symbols
}
