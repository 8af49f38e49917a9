use common::models::{Direction, Signal};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Extreme RSI bands. Deliberately wider than the usual 70/30.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdPolicy {
    pub short_threshold: Decimal,
    pub long_threshold: Decimal,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            short_threshold: dec!(95),
            long_threshold: dec!(5),
        }
    }
}

impl ThresholdPolicy {
    /// SHORT is checked first, so it wins if reconfigured bands overlap.
    pub fn classify(&self, rsi: Decimal) -> Option<Direction> {
        if rsi > self.short_threshold {
            Some(Direction::Short)
        } else if rsi < self.long_threshold {
            Some(Direction::Long)
        } else {
            None
        }
    }
}

/// Multipliers applied to the entry price to derive targets and stop-loss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetTable {
    pub short_targets: [Decimal; 5],
    pub short_stop_loss: Decimal,
    pub long_targets: [Decimal; 5],
    pub long_stop_loss: Decimal,
}

impl Default for TargetTable {
    fn default() -> Self {
        Self {
            short_targets: [dec!(0.99), dec!(0.98), dec!(0.97), dec!(0.96), dec!(0.95)],
            short_stop_loss: dec!(1.10),
            long_targets: [dec!(1.01), dec!(1.02), dec!(1.03), dec!(1.04), dec!(1.05)],
            long_stop_loss: dec!(0.90),
        }
    }
}

impl TargetTable {
    /// Returns `(targets, stop_loss)` for a position opened at `entry`.
    pub fn levels(&self, direction: Direction, entry: Decimal) -> ([Decimal; 5], Decimal) {
        let (targets, stop) = match direction {
            Direction::Short => (self.short_targets, self.short_stop_loss),
            Direction::Long => (self.long_targets, self.long_stop_loss),
        };
        (targets.map(|m| entry * m), entry * stop)
    }

    pub fn build_signal(
        &self,
        symbol: &str,
        direction: Direction,
        rsi: Decimal,
        entry_price: Decimal,
    ) -> Signal {
        let (targets, stop_loss) = self.levels(direction, entry_price);
        Signal {
            symbol: symbol.to_string(),
            direction,
            rsi,
            entry_price,
            targets,
            stop_loss,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bands_fire_only_at_extremes() {
        let policy = ThresholdPolicy::default();
        assert_eq!(policy.classify(dec!(95.01)), Some(Direction::Short));
        assert_eq!(policy.classify(dec!(95)), None);
        assert_eq!(policy.classify(dec!(50)), None);
        assert_eq!(policy.classify(dec!(5)), None);
        assert_eq!(policy.classify(dec!(4.99)), Some(Direction::Long));
        assert_eq!(policy.classify(dec!(100)), Some(Direction::Short));
        assert_eq!(policy.classify(Decimal::ZERO), Some(Direction::Long));
    }

    #[test]
    fn short_wins_when_bands_overlap() {
        let policy = ThresholdPolicy {
            short_threshold: dec!(40),
            long_threshold: dec!(60),
        };
        assert_eq!(policy.classify(dec!(50)), Some(Direction::Short));
        assert_eq!(policy.classify(dec!(30)), Some(Direction::Long));
    }

    #[test]
    fn short_levels_for_entry_hundred() {
        let (targets, stop) = TargetTable::default().levels(Direction::Short, dec!(100));
        assert_eq!(targets, [dec!(99), dec!(98), dec!(97), dec!(96), dec!(95)]);
        assert_eq!(stop, dec!(110));
    }

    #[test]
    fn long_levels_for_entry_hundred() {
        let (targets, stop) = TargetTable::default().levels(Direction::Long, dec!(100));
        assert_eq!(targets, [dec!(101), dec!(102), dec!(103), dec!(104), dec!(105)]);
        assert_eq!(stop, dec!(90));
    }

    #[test]
    fn levels_keep_feed_precision() {
        let (targets, stop) = TargetTable::default().levels(Direction::Long, dec!(0.01577100));
        assert_eq!(targets[0], dec!(0.0159287100));
        assert_eq!(stop, dec!(0.014193900));
    }

    #[test]
    fn build_signal_carries_inputs() {
        let signal =
            TargetTable::default().build_signal("ETHUSDT", Direction::Short, dec!(97), dec!(2000));
        assert_eq!(signal.symbol, "ETHUSDT");
        assert_eq!(signal.direction, Direction::Short);
        assert_eq!(signal.rsi, dec!(97));
        assert_eq!(signal.entry_price, dec!(2000));
        assert_eq!(signal.targets[4], dec!(1900));
        assert_eq!(signal.stop_loss, dec!(2200));
    }
}
