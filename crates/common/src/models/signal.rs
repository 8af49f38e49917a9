use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Short,
    Long,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "SHORT",
            Self::Long => "LONG",
        }
    }

    fn caution(&self) -> &'static str {
        match self {
            Self::Short => "price decline expected!",
            Self::Long => "price increase expected!",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An extreme-RSI alert for one symbol. Lives only until it is rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub symbol: String,
    pub direction: Direction,
    pub rsi: Decimal,
    pub entry_price: Decimal,
    pub targets: [Decimal; 5],
    pub stop_loss: Decimal,
}

impl Signal {
    /// Renders the Telegram-ready alert text.
    pub fn to_message(&self) -> String {
        let targets = self
            .targets
            .iter()
            .enumerate()
            .map(|(i, price)| format!("{}. Target: {}", i + 1, price.normalize()))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "🚨 {symbol} {direction} Signal!\n\n\
             💰 Entry Price: {entry}\n\n\
             🎯 Target Prices:\n{targets}\n\n\
             ⛔ Stop-Loss: {stop}\n\n\
             ⚠️ Caution: {caution}",
            symbol = self.symbol,
            direction = self.direction,
            entry = self.entry_price.normalize(),
            targets = targets,
            stop = self.stop_loss.normalize(),
            caution = self.direction.caution(),
        )
    }
}
