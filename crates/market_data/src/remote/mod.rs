use std::env;

pub mod binance_client;
pub mod exchange_info_response;
pub mod kline_response;

pub use binance_client::BinanceFuturesClient;
pub use exchange_info_response::ExchangeInfoResponse;
pub use kline_response::KlinesResponse;

pub const DEFAULT_FAPI_URL: &str = "https://fapi.binance.com";

pub fn get_fapi_base_url() -> String {
    env::var("BINANCE_FAPI_URL").unwrap_or_else(|_| DEFAULT_FAPI_URL.to_string())
}
