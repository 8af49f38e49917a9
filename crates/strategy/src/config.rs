use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;
use common::models::KlineInterval;
use thiserror::Error;

use crate::policy::{TargetTable, ThresholdPolicy};

/// Upper bound on bars per klines request.
pub const MAX_LOOKBACK: u16 = 1500;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("RSI period must be at least 1")]
    ZeroPeriod,

    #[error("lookback of {lookback} bars must exceed the RSI period {period}")]
    LookbackTooShort { lookback: u16, period: usize },

    #[error("lookback of {0} bars exceeds the exchange maximum of 1500")]
    LookbackTooLong(u16),

    #[error("cooldown must be positive")]
    NonPositiveCooldown,

    #[error("unknown stamp policy {0:?}, expected \"detection\" or \"delivery\"")]
    UnknownStampPolicy(String),
}

/// When the cooldown stamp is written relative to alert delivery.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StampPolicy {
    /// Stamp as soon as a signal fires, even if delivery fails.
    #[default]
    OnDetection,
    /// Stamp only after the alert sink accepted the message.
    OnDelivery,
}

impl FromStr for StampPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "detection" => Ok(Self::OnDetection),
            "delivery" => Ok(Self::OnDelivery),
            other => Err(ConfigError::UnknownStampPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for StampPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnDetection => f.write_str("detection"),
            Self::OnDelivery => f.write_str("delivery"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub rsi_period: usize,
    pub lookback: u16,
    pub interval: KlineInterval,
    pub thresholds: ThresholdPolicy,
    pub targets: TargetTable,
    pub cooldown: TimeDelta,
    pub stamp_policy: StampPolicy,
    /// Pause between two symbols that hit the price source.
    pub symbol_delay: Duration,
    /// Pause between full passes over the universe.
    pub pass_delay: Duration,
    /// Upper bound on each price fetch and alert delivery.
    pub call_timeout: Duration,
    /// Pause before the next pass once the price source rate limits us.
    pub rate_limit_backoff: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rsi_period: 6,
            lookback: 100,
            interval: KlineInterval::FifteenMinutes,
            thresholds: ThresholdPolicy::default(),
            targets: TargetTable::default(),
            cooldown: TimeDelta::hours(1),
            stamp_policy: StampPolicy::OnDetection,
            symbol_delay: Duration::from_millis(100),
            pass_delay: Duration::from_secs(1),
            call_timeout: Duration::from_secs(10),
            rate_limit_backoff: Duration::from_secs(60),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rsi_period == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        if usize::from(self.lookback) <= self.rsi_period {
            return Err(ConfigError::LookbackTooShort {
                lookback: self.lookback,
                period: self.rsi_period,
            });
        }
        if self.lookback > MAX_LOOKBACK {
            return Err(ConfigError::LookbackTooLong(self.lookback));
        }
        if self.cooldown <= TimeDelta::zero() {
            return Err(ConfigError::NonPositiveCooldown);
        }
        Ok(())
    }
}
