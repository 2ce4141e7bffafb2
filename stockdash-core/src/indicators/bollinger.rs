//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! - Middle: SMA(close, window)
//! - Upper: middle + k * stddev(close, window)
//! - Lower: middle - k * stddev(close, window)
//!
//! Uses population stddev (divide by N).
//! Lookback: window - 1.

use super::{check_fit, rolling_mean, Indicator, Series};
use crate::domain::PriceSeries;
use crate::error::DashboardError;
use serde::{Deserialize, Serialize};

/// All three bands, aligned to the input series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: Series,
    pub middle: Series,
    pub lower: Series,
}

pub fn bollinger_bands(
    series: &PriceSeries,
    window: usize,
    k: f64,
) -> Result<BollingerBands, DashboardError> {
    check_fit(series, "bollinger", window, 0)?;
    if !(k.is_finite() && k >= 0.0) {
        return Err(DashboardError::invalid(format!(
            "bollinger: multiplier must be finite and non-negative, got {k}"
        )));
    }

    let closes = series.closes();
    let middle = rolling_mean(&closes, window);
    let n = closes.len();
    let mut upper = vec![None; n];
    let mut lower = vec![None; n];

    for i in (window - 1)..n {
        let Some(mean) = middle[i] else {
            continue;
        };
        let variance = closes[i + 1 - window..=i]
            .iter()
            .map(|c| {
                let diff = c - mean;
                diff * diff
            })
            .sum::<f64>()
            / window as f64;
        let stddev = variance.sqrt();
        upper[i] = Some(mean + k * stddev);
        lower[i] = Some(mean - k * stddev);
    }

    Ok(BollingerBands {
        upper,
        middle,
        lower,
    })
}

/// Which band of the Bollinger Bands to expose as a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
}

/// One Bollinger band as a named column.
#[derive(Debug, Clone)]
pub struct Bollinger {
    window: usize,
    k: f64,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    pub fn new(band: BollingerBand, window: usize, k: f64) -> Self {
        let label = match band {
            BollingerBand::Upper => "upper",
            BollingerBand::Middle => "middle",
            BollingerBand::Lower => "lower",
        };
        Self {
            window,
            k,
            band,
            name: format!("bb_{label}_{window}_{k}"),
        }
    }

    /// Upper, middle and lower columns for the same parameters.
    pub fn all(window: usize, k: f64) -> [Self; 3] {
        [
            Self::new(BollingerBand::Upper, window, k),
            Self::new(BollingerBand::Middle, window, k),
            Self::new(BollingerBand::Lower, window, k),
        ]
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window.saturating_sub(1)
    }

    fn compute(&self, series: &PriceSeries) -> Result<Series, DashboardError> {
        let bands = bollinger_bands(series, self.window, self.k)?;
        Ok(match self.band {
            BollingerBand::Upper => bands.upper,
            BollingerBand::Middle => bands.middle,
            BollingerBand::Lower => bands.lower,
        })
    }
}
