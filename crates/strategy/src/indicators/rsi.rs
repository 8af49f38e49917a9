//! Relative Strength Index with Wilder smoothing, in exact decimal arithmetic.
//!
//! 1. Differences between consecutive closes, oldest to newest.
//! 2. gain = max(d, 0), loss = max(-d, 0).
//! 3. Seed both averages with the simple mean of the first `period` values.
//! 4. Smooth every later value: `avg = (avg * (period - 1) + x) / period`.
//! 5. RSI = 100 - 100 / (1 + avg_gain / avg_loss), or 100 when avg_loss is 0.
//!
//! The recurrence is order-sensitive. Callers must pass closes oldest first.

use rust_decimal::Decimal;
use thiserror::Error;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RsiError {
    #[error("RSI period must be at least 1")]
    InvalidPeriod,

    #[error("insufficient data: need at least {required} closes, got {available}")]
    InsufficientData { required: usize, available: usize },
}

/// Returns the RSI of the newest close in `closes`.
///
/// Needs `period + 1` closes (`period` differences) at minimum. A zero final
/// average loss saturates at 100, which also covers a perfectly flat series.
pub fn calculate_rsi(closes: &[Decimal], period: usize) -> Result<Decimal, RsiError> {
    if period == 0 {
        return Err(RsiError::InvalidPeriod);
    }
    if closes.len() <= period {
        return Err(RsiError::InsufficientData {
            required: period + 1,
            available: closes.len(),
        });
    }

    let (gains, losses): (Vec<Decimal>, Vec<Decimal>) = closes
        .windows(2)
        .map(|w| {
            let change = w[1] - w[0];
            (change.max(Decimal::ZERO), (-change).max(Decimal::ZERO))
        })
        .unzip();

    let period_d = Decimal::from(period);
    let carry = period_d - Decimal::ONE;

    let mut avg_gain = gains[..period].iter().sum::<Decimal>() / period_d;
    let mut avg_loss = losses[..period].iter().sum::<Decimal>() / period_d;

    for (gain, loss) in gains[period..].iter().zip(&losses[period..]) {
        avg_gain = (avg_gain * carry + *gain) / period_d;
        avg_loss = (avg_loss * carry + *loss) / period_d;
    }

    Ok(rsi_from_averages(avg_gain, avg_loss))
}

fn rsi_from_averages(avg_gain: Decimal, avg_loss: Decimal) -> Decimal {
    if avg_loss.is_zero() {
        return HUNDRED;
    }

    // An RS beyond Decimal range is indistinguishable from saturation.
    let Some(denominator) = avg_gain
        .checked_div(avg_loss)
        .and_then(|rs| rs.checked_add(Decimal::ONE))
    else {
        return HUNDRED;
    };

    HUNDRED - HUNDRED / denominator
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn series(values: &[i64]) -> Vec<Decimal> {
        values.iter().map(|&v| Decimal::from(v)).collect()
    }

    #[test]
    fn golden_series_matches_hand_trace() {
        // avg_gain = 307/432, avg_loss = 125/432 => RSI = 30700/432.
        let closes = series(&[10, 11, 12, 11, 10, 9, 10, 11, 12, 13]);
        let rsi = calculate_rsi(&closes, 6).unwrap();
        assert_eq!(rsi.round_dp(10), dec!(71.0648148148));
    }

    #[test]
    fn rising_series_saturates_at_hundred() {
        let closes: Vec<Decimal> = (1..=30).map(Decimal::from).collect();
        assert_eq!(calculate_rsi(&closes, 6).unwrap(), dec!(100));
    }

    #[test]
    fn falling_series_is_zero() {
        let closes: Vec<Decimal> = (1..=30).rev().map(Decimal::from).collect();
        assert_eq!(calculate_rsi(&closes, 6).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn flat_series_is_hundred() {
        let closes = vec![dec!(42.5); 20];
        assert_eq!(calculate_rsi(&closes, 6).unwrap(), dec!(100));
    }

    #[test]
    fn exactly_period_closes_is_insufficient() {
        let closes = series(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(
            calculate_rsi(&closes, 6),
            Err(RsiError::InsufficientData {
                required: 7,
                available: 6
            })
        );
    }

    #[test]
    fn period_plus_one_closes_uses_seed_only() {
        // Three gains of 1, three losses of 1 => RS = 1 => RSI = 50.
        let closes = series(&[10, 11, 12, 13, 12, 11, 10]);
        assert_eq!(calculate_rsi(&closes, 6).unwrap(), dec!(50));
    }

    #[test]
    fn zero_period_is_rejected() {
        assert_eq!(calculate_rsi(&series(&[1, 2, 3]), 0), Err(RsiError::InvalidPeriod));
    }

    #[test]
    fn empty_input_is_insufficient() {
        assert!(matches!(
            calculate_rsi(&[], 6),
            Err(RsiError::InsufficientData { available: 0, .. })
        ));
    }

    #[test]
    fn traversal_order_changes_the_value() {
        let closes = series(&[10, 11, 12, 11, 10, 9, 10, 11, 12, 13]);
        let reversed: Vec<Decimal> = closes.iter().rev().copied().collect();
        assert_ne!(
            calculate_rsi(&closes, 6).unwrap(),
            calculate_rsi(&reversed, 6).unwrap()
        );
    }

    #[test]
    fn value_stays_within_bounds() {
        let closes = vec![
            dec!(44.34), dec!(44.09), dec!(44.15), dec!(43.61), dec!(44.33), dec!(44.83),
            dec!(45.10), dec!(45.42), dec!(45.84), dec!(46.08), dec!(45.89), dec!(46.03),
            dec!(44.18), dec!(44.22), dec!(44.57), dec!(43.42), dec!(42.66), dec!(43.13),
        ];
        for period in 1..closes.len() {
            let rsi = calculate_rsi(&closes, period).unwrap();
            assert!(rsi >= Decimal::ZERO && rsi <= dec!(100), "period {period}: {rsi}");
        }
    }

    #[test]
    fn tiny_losses_do_not_overflow() {
        let mut closes: Vec<Decimal> = (0..99)
            .map(|i| dec!(50000) + Decimal::from(i * 1000))
            .collect();
        closes.insert(1, dec!(49999.99999999));
        let rsi = calculate_rsi(&closes, 6).unwrap();
        assert!(rsi > dec!(99.99));
    }
}
