use std::time::Duration;

use async_trait::async_trait;
use common::error::MarketDataError;
use common::models::KlineInterval;
use common::traits::{PriceSource, SymbolSource};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::get_fapi_base_url;
use crate::remote::{ExchangeInfoResponse, KlinesResponse};
use crate::traits::RemoteResponse;

const USER_AGENT: &str = "rsi_signal_bot/0.1.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const WEIGHT_HEADER: &str = "x-mbx-used-weight-1m";
const WEIGHT_WARN_THRESHOLD: u32 = 1000;
const WEIGHT_LIMIT: u32 = 2400;

/// Public (unsigned) USDⓈ-M futures REST endpoints.
#[derive(Clone)]
pub struct BinanceFuturesClient {
    client: Client,
    base_url: String,
}

impl BinanceFuturesClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, MarketDataError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MarketDataError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Uses `BINANCE_FAPI_URL`, falling back to the production endpoint.
    pub fn from_env() -> Result<Self, MarketDataError> {
        Self::new(get_fapi_base_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_exchange_info(&self) -> Result<ExchangeInfoResponse, MarketDataError> {
        let url = format!("{}/fapi/v1/exchangeInfo", self.base_url);
        self.make_request(&url, &[]).await
    }

    pub async fn fetch_klines(
        &self,
        symbol: &str,
        interval: KlineInterval,
        limit: u16,
    ) -> Result<KlinesResponse, MarketDataError> {
        let url = format!("{}/fapi/v1/klines", self.base_url);
        let limit = limit.to_string();
        self.make_request(
            &url,
            &[
                ("symbol", symbol),
                ("interval", interval.as_str()),
                ("limit", limit.as_str()),
            ],
        )
        .await
    }

    async fn make_request<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, MarketDataError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| MarketDataError::Http(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::IM_A_TEAPOT {
            return Err(MarketDataError::RateLimited(status.as_u16()));
        }

        Self::log_weight(response.headers());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketDataError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| MarketDataError::Decode(e.to_string()))
    }

    fn log_weight(headers: &reqwest::header::HeaderMap) {
        let Some(used_weight) = headers
            .get(WEIGHT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u32>().ok())
        else {
            return;
        };

        if used_weight > WEIGHT_WARN_THRESHOLD {
            warn!(used_weight, "High API weight usage: {}/{}", used_weight, WEIGHT_LIMIT);
        } else {
            debug!("Used weights: {}/{}", used_weight, WEIGHT_LIMIT);
        }
    }
}

#[async_trait]
impl SymbolSource for BinanceFuturesClient {
    async fn active_symbols(&self) -> Result<Vec<String>, MarketDataError> {
        self.fetch_exchange_info().await?.to_domain()
    }
}

#[async_trait]
impl PriceSource for BinanceFuturesClient {
    async fn closing_prices(
        &self,
        symbol: &str,
        interval: KlineInterval,
        limit: u16,
    ) -> Result<Vec<Decimal>, MarketDataError> {
        self.fetch_klines(symbol, interval, limit).await?.to_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> BinanceFuturesClient {
        BinanceFuturesClient::new(server.uri()).unwrap()
    }

    #[tokio::test]
    async fn closing_prices_queries_symbol_interval_and_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fapi/v1/klines"))
            .and(query_param("symbol", "BTCUSDT"))
            .and(query_param("interval", "15m"))
            .and(query_param("limit", "100"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header(WEIGHT_HEADER, "12")
                    .set_body_json(json!([
                        [1, "10.0", "11.0", "9.0", "10.5", "100", 2, "0", 1, "0", "0", "0"],
                        [3, "10.5", "12.0", "10.0", "11.25", "100", 4, "0", 1, "0", "0", "0"]
                    ])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let prices = client_for(&server)
            .await
            .closing_prices("BTCUSDT", KlineInterval::FifteenMinutes, 100)
            .await
            .unwrap();

        assert_eq!(prices, vec![dec!(10.5), dec!(11.25)]);
    }

    #[tokio::test]
    async fn active_symbols_filters_exchange_info() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fapi/v1/exchangeInfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "symbols": [
                    {"symbol": "BTCUSDT", "contractType": "PERPETUAL", "status": "TRADING"},
                    {
                        "symbol": "ETHUSDT_251226",
                        "contractType": "CURRENT_QUARTER",
                        "status": "TRADING"
                    },
                    {"symbol": "SOLUSDT", "contractType": "PERPETUAL", "status": "PENDING_TRADING"}
                ]
            })))
            .mount(&server)
            .await;

        let symbols = client_for(&server).await.active_symbols().await.unwrap();
        assert_eq!(symbols, vec!["BTCUSDT".to_string()]);
    }

    #[tokio::test]
    async fn too_many_requests_maps_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fapi/v1/klines"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .closing_prices("BTCUSDT", KlineInterval::OneHour, 10)
            .await
            .unwrap_err();

        assert!(err.is_rate_limit());
    }

    #[tokio::test]
    async fn invalid_symbol_surfaces_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fapi/v1/klines"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"code":-1121,"msg":"Invalid symbol."}"#),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .closing_prices("NOPE", KlineInterval::OneHour, 10)
            .await
            .unwrap_err();

        match err {
            MarketDataError::Status { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("Invalid symbol"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = BinanceFuturesClient::new("http://localhost:8080/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }
}
