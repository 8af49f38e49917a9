use common::error::MarketDataError;

/// Converts a raw exchange payload into the domain value the engine consumes.
pub trait RemoteResponse<T> {
    fn to_domain(&self) -> Result<T, MarketDataError>;
}
