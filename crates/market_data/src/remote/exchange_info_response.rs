use std::collections::HashSet;

use common::error::MarketDataError;
use serde::Deserialize;

use crate::traits::RemoteResponse;

const PERPETUAL: &str = "PERPETUAL";
const TRADING: &str = "TRADING";

#[derive(Debug, Deserialize)]
pub struct ExchangeInfoResponse {
    pub symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
pub struct SymbolInfo {
    pub symbol: String,
    #[serde(rename(deserialize = "contractType"), default)]
    pub contract_type: String,
    pub status: String,
}

impl SymbolInfo {
    fn is_active_perpetual(&self) -> bool {
        self.contract_type == PERPETUAL && self.status == TRADING
    }
}

impl RemoteResponse<Vec<String>> for ExchangeInfoResponse {
    /// Active perpetual symbols, first occurrence wins, exchange order kept.
    fn to_domain(&self) -> Result<Vec<String>, MarketDataError> {
        let mut seen = HashSet::new();
        Ok(self
            .symbols
            .iter()
            .filter(|s| s.is_active_perpetual())
            .filter(|s| seen.insert(s.symbol.as_str()))
            .map(|s| s.symbol.clone())
            .collect())
    }
}
