//! Simple Moving Average (SMA).
//!
//! Rolling mean of close prices over a lookback window.
//! Lookback: window - 1 (first valid value at index window-1).

use super::{check_fit, rolling_mean, Indicator, Series};
use crate::domain::PriceSeries;
use crate::error::DashboardError;

/// SMA of closes over `window` bars.
pub fn simple_moving_average(
    series: &PriceSeries,
    window: usize,
) -> Result<Series, DashboardError> {
    check_fit(series, "sma", window, 0)?;
    Ok(rolling_mean(&series.closes(), window))
}

#[derive(Debug, Clone)]
pub struct Sma {
    window: usize,
    name: String,
}

impl Sma {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            name: format!("sma_{window}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window.saturating_sub(1)
    }

    fn compute(&self, series: &PriceSeries) -> Result<Series, DashboardError> {
        simple_moving_average(series, self.window)
    }
}
