//! Relative Strength Index (RSI).
//!
//! Uses a trailing simple mean of gains and losses over `window` changes.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: window.
//! Edge case: avg_loss == 0 → RSI = 100 (including a flat window).

use super::{check_fit, rolling_mean, Indicator, Series};
use crate::domain::PriceSeries;
use crate::error::DashboardError;
use serde::{Deserialize, Serialize};

pub const OVERBOUGHT: f64 = 70.0;
pub const OVERSOLD: f64 = 30.0;

pub fn rsi(series: &PriceSeries, window: usize) -> Result<Series, DashboardError> {
    check_fit(series, "rsi", window, 1)?;

    let closes = series.closes();
    let n = closes.len();

    // gains/losses for changes 1..n; index 0 of these vectors is change 1
    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let change = w[1] - w[0];
            (change.max(0.0), (-change).max(0.0))
        })
        .unzip();

    let avg_gain = rolling_mean(&gains, window);
    let avg_loss = rolling_mean(&losses, window);

    let mut result = vec![None; n];
    for (i, (g, l)) in avg_gain.iter().zip(&avg_loss).enumerate() {
        if let (Some(g), Some(l)) = (g, l) {
            result[i + 1] = Some(compute_rsi(*g, *l));
        }
    }
    Ok(result)
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

/// Where an RSI reading sits relative to the 70/30 reference lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

impl RsiZone {
    pub fn classify(value: f64) -> Self {
        if value >= OVERBOUGHT {
            Self::Overbought
        } else if value <= OVERSOLD {
            Self::Oversold
        } else {
            Self::Neutral
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rsi {
    window: usize,
    name: String,
}

impl Rsi {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            name: format!("rsi_{window}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window
    }

    fn compute(&self, series: &PriceSeries) -> Result<Series, DashboardError> {
        rsi(series, self.window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_series};

    #[test]
    fn rsi_all_gains() {
        let s = make_series(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let result = rsi(&s, 3).unwrap();
        for v in result.iter().skip(3) {
            assert_eq!(*v, Some(100.0));
        }
    }

    #[test]
    fn rsi_all_losses() {
        let s = make_series(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        let result = rsi(&s, 3).unwrap();
        for v in result.iter().skip(3) {
            assert_approx(v.unwrap(), 0.0, 1e-9);
        }
    }

    #[test]
    fn rsi_mixed_known_value() {
        // Changes: +0.34, -0.25, -0.48, +0.72
        // window 3 at index 3: gains 0.34, losses 0.73
        // RSI = 100 - 100/(1 + 0.34/0.73)
        let s = make_series(&[44.0, 44.34, 44.09, 43.61, 44.33]);
        let result = rsi(&s, 3).unwrap();

        assert!(result[..3].iter().all(Option::is_none));
        let expected = 100.0 - 100.0 / (1.0 + 0.34 / 0.73);
        assert_approx(result[3].unwrap(), expected, 1e-9);
        // index 4: gains 0.72, losses 0.73
        let expected = 100.0 - 100.0 / (1.0 + 0.72 / 0.73);
        assert_approx(result[4].unwrap(), expected, 1e-9);
    }

    #[test]
    fn rsi_flat_window_is_100() {
        let s = make_series(&[10.0, 10.0, 10.0, 10.0]);
        let result = rsi(&s, 2).unwrap();
        assert_eq!(result[2], Some(100.0));
    }

    #[test]
    fn rsi_bounds() {
        let s = make_series(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        let result = rsi(&s, 3).unwrap();
        for (i, v) in result.iter().enumerate() {
            if let Some(v) = v {
                assert!((0.0..=100.0).contains(v), "RSI out of bounds at bar {i}: {v}");
            }
        }
    }

    #[test]
    fn rsi_huge_window_is_invalid() {
        let s = make_series(&[1.0, 2.0, 3.0]);
        let err = rsi(&s, usize::MAX).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidInput(_)));
    }

    #[test]
    fn rsi_needs_window_plus_one_bars() {
        let s = make_series(&[1.0, 2.0, 3.0]);
        assert!(rsi(&s, 3).is_err());
        assert!(rsi(&s, 2).is_ok());
    }

    #[test]
    fn zone_classification() {
        assert_eq!(RsiZone::classify(75.0), RsiZone::Overbought);
        assert_eq!(RsiZone::classify(70.0), RsiZone::Overbought);
        assert_eq!(RsiZone::classify(25.0), RsiZone::Oversold);
        assert_eq!(RsiZone::classify(50.0), RsiZone::Neutral);
    }

    #[test]
    fn rsi_lookback() {
        assert_eq!(Rsi::new(14).lookback(), 14);
    }
}
