use std::str::FromStr;

use common::error::MarketDataError;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::traits::RemoteResponse;

/// Index of the close price inside a kline row:
/// `[openTime, open, high, low, close, volume, closeTime, ...]`.
const CLOSE_INDEX: usize = 4;

/// Raw `/fapi/v1/klines` body, oldest bar first.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct KlinesResponse {
    pub rows: Vec<Vec<Value>>,
}

impl RemoteResponse<Vec<Decimal>> for KlinesResponse {
    fn to_domain(&self) -> Result<Vec<Decimal>, MarketDataError> {
        self.rows.iter().map(|row| close_price(row)).collect()
    }
}

fn close_price(row: &[Value]) -> Result<Decimal, MarketDataError> {
    let raw = row.get(CLOSE_INDEX).ok_or_else(|| {
        MarketDataError::Decode(format!(
            "kline row has {} fields, expected > {}",
            row.len(),
            CLOSE_INDEX
        ))
    })?;

    let price = match raw {
        Value::String(s) => {
            Decimal::from_str(s).map_err(|_| MarketDataError::InvalidPrice(s.clone()))?
        }
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .map_err(|_| MarketDataError::InvalidPrice(n.to_string()))?,
        other => return Err(MarketDataError::InvalidPrice(other.to_string())),
    };

    if price.is_sign_negative() {
        return Err(MarketDataError::InvalidPrice(price.to_string()));
    }
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn extracts_close_prices_in_order() {
        let body = r#"[
            [1499040000000, "0.01634790", "0.80000000", "0.01575800", "0.01577100",
             "148976.11427815", 1499644799999, "2434.19055334", 308, "1756.87402397",
             "28.46694368", "0"],
            [1499040900000, "0.01577100", "0.01600000", "0.01570000", "0.01590000", "1000.0",
             1499041799999, "15.9", 12, "500.0", "7.9", "0"]
        ]"#;
        let response: KlinesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            response.to_domain().unwrap(),
            vec![dec!(0.01577100), dec!(0.01590000)]
        );
    }

    #[test]
    fn empty_body_yields_empty_series() {
        let response: KlinesResponse = serde_json::from_str("[]").unwrap();
        assert!(response.to_domain().unwrap().is_empty());
    }

    #[test]
    fn short_row_is_a_decode_error() {
        let response: KlinesResponse = serde_json::from_str(r#"[[1, "1", "2"]]"#).unwrap();
        assert!(matches!(response.to_domain(), Err(MarketDataError::Decode(_))));
    }

    #[test]
    fn garbage_close_is_an_invalid_price() {
        let response: KlinesResponse =
            serde_json::from_str(r#"[[1, "1", "2", "0.5", "abc", "10"]]"#).unwrap();
        assert!(matches!(
            response.to_domain(),
            Err(MarketDataError::InvalidPrice(p)) if p == "abc"
        ));
    }
}
