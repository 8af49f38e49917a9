use thiserror::Error;

/// Failures raised by symbol-universe and price-series sources.
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("request failed: {0}")]
    Http(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("rate limited by exchange (HTTP {0})")]
    RateLimited(u16),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("invalid price value {0:?}")]
    InvalidPrice(String),
}

impl MarketDataError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}

#[derive(Debug, Error)]
#[error("alert delivery failed: {0}")]
pub struct DeliveryError(pub String);
