//! Indicator bundles and the frame of computed columns.
//!
//! An `IndicatorSet` is the list of columns a page wants; computing it over a
//! series yields an `IndicatorFrame` holding closes and volumes plus one named
//! column per indicator. Columns whose window does not fit the series are
//! left out and reported in `skipped`, so a short history still renders the
//! columns that do fit.

use super::{Bollinger, Indicator, MacdIndicator, Rsi, Series, Sma};
use crate::config::IndicatorConfig;
use crate::domain::PriceSeries;
use crate::error::DashboardError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered list of indicators to compute.
pub struct IndicatorSet {
    indicators: Vec<Box<dyn Indicator>>,
}

impl IndicatorSet {
    pub fn new() -> Self {
        Self {
            indicators: Vec::new(),
        }
    }

    pub fn with(mut self, indicator: impl Indicator + 'static) -> Self {
        self.indicators.push(Box::new(indicator));
        self
    }

    /// The dashboard bundle: price moving averages, Bollinger bands, RSI and MACD.
    pub fn from_config(cfg: &IndicatorConfig) -> Self {
        let mut set = Self::new();
        for &window in &cfg.moving_averages {
            set = set.with(Sma::new(window));
        }
        for band in Bollinger::all(cfg.bollinger_window, cfg.bollinger_k) {
            set = set.with(band);
        }
        set = set.with(Rsi::new(cfg.rsi_window));
        for part in MacdIndicator::all(cfg.macd_fast, cfg.macd_slow, cfg.macd_signal) {
            set = set.with(part);
        }
        set
    }

    pub fn names(&self) -> Vec<&str> {
        self.indicators.iter().map(|i| i.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    /// Compute every indicator over `series`.
    ///
    /// Fails only when the series itself is empty; a window that does not fit
    /// skips that column.
    pub fn compute(&self, series: &PriceSeries) -> Result<IndicatorFrame, DashboardError> {
        if series.is_empty() {
            return Err(DashboardError::no_data(series.symbol()));
        }

        let mut frame = IndicatorFrame {
            symbol: series.symbol().to_string(),
            dates: series.dates(),
            close: series.closes(),
            volume: series.volumes(),
            columns: BTreeMap::new(),
            skipped: Vec::new(),
        };

        for indicator in &self.indicators {
            match indicator.compute(series) {
                Ok(values) => {
                    frame.columns.insert(indicator.name().to_string(), values);
                }
                Err(e) => {
                    tracing::debug!(
                        symbol = series.symbol(),
                        indicator = indicator.name(),
                        "skipping indicator: {e}"
                    );
                    frame.skipped.push(indicator.name().to_string());
                }
            }
        }

        Ok(frame)
    }
}

impl Default for IndicatorSet {
    fn default() -> Self {
        Self::from_config(&IndicatorConfig::default())
    }
}

/// Close prices, traded volume and derived columns, all aligned by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorFrame {
    pub symbol: String,
    pub dates: Vec<NaiveDate>,
    pub close: Vec<f64>,
    pub volume: Vec<u64>,
    pub columns: BTreeMap<String, Series>,
    pub skipped: Vec<String>,
}

impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(|v| v.as_slice())
    }

    /// Value of a column at a bar index; `None` if missing or still warming up.
    pub fn get(&self, name: &str, index: usize) -> Option<f64> {
        self.columns.get(name)?.get(index).copied().flatten()
    }

    /// Last value of a column.
    pub fn latest(&self, name: &str) -> Option<f64> {
        self.get(name, self.len().checked_sub(1)?)
    }
}
