use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::{DeliveryError, MarketDataError};
use crate::models::KlineInterval;

/// Supplies the tradable perpetual-contract universe.
#[async_trait]
pub trait SymbolSource: Send + Sync {
    async fn active_symbols(&self) -> Result<Vec<String>, MarketDataError>;
}

/// Supplies closing prices for one symbol, oldest first, at most `limit` bars.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn closing_prices(
        &self,
        symbol: &str,
        interval: KlineInterval,
        limit: u16,
    ) -> Result<Vec<Decimal>, MarketDataError>;
}

/// Delivers a rendered alert message to its destination.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn deliver(&self, message: &str) -> Result<(), DeliveryError>;
}
