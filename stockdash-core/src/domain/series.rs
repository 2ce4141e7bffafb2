//! PriceSeries: validated, immutable bar history for one symbol.

use super::bar::PriceBar;
use crate::error::DashboardError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Ordered bar history for a single symbol.
///
/// Dates are strictly increasing and every price is finite and positive.
/// Indicators read from a series and return new aligned vectors; the series
/// itself is never modified after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

/// Headline figures for the most recent bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatestSummary {
    pub date: NaiveDate,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: u64,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, DashboardError> {
        let symbol = symbol.into();

        for (i, bar) in bars.iter().enumerate() {
            if !bar.has_positive_prices() {
                return Err(DashboardError::invalid(format!(
                    "{symbol}: bar {i} ({}) has a non-positive or missing price",
                    bar.date
                )));
            }
        }

        if let Some(pair) = bars.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(DashboardError::invalid(format!(
                "{symbol}: dates not strictly increasing at {} -> {}",
                pair[0].date, pair[1].date
            )));
        }

        Ok(Self { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<u64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn latest(&self) -> Option<LatestSummary> {
        self.bars.last().map(|b| LatestSummary {
            date: b.date,
            close: b.close,
            high: b.high,
            low: b.low,
            volume: b.volume,
        })
    }

    /// The last `n` bars (or all of them if shorter).
    pub fn tail(&self, n: usize) -> &[PriceBar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }

    /// A new series holding only the first `n` bars.
    pub fn truncated(&self, n: usize) -> Self {
        Self {
            symbol: self.symbol.clone(),
            bars: self.bars[..n.min(self.bars.len())].to_vec(),
        }
    }
}

/// Build a series from close prices for tests and benches.
///
/// Generates plausible OHLV: open = prev_close (or close for the first bar),
/// high = max(open, close) + 1.0, low = max(min(open, close) - 1.0, close / 2),
/// volume = 1000.
pub fn series_from_closes(symbol: &str, closes: &[f64]) -> Result<PriceSeries, DashboardError> {
    let base_date = NaiveDate::from_ymd_opt(2024, 1, 2)
        .ok_or_else(|| DashboardError::invalid("bad base date"))?;
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            PriceBar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: (open.min(close) - 1.0).max(close / 2.0),
                close,
                volume: 1000,
            }
        })
        .collect();
    PriceSeries::new(symbol, bars)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 10,
        }
    }

    #[test]
    fn accepts_ordered_positive_bars() {
        let s = PriceSeries::new("AAPL", vec![bar(2, 10.0), bar(3, 11.0)]).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.closes(), vec![10.0, 11.0]);
        assert_eq!(s.latest().unwrap().close, 11.0);
    }

    #[test]
    fn rejects_duplicate_dates() {
        let err = PriceSeries::new("AAPL", vec![bar(2, 10.0), bar(2, 11.0)]).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidInput(_)));
    }

    #[test]
    fn rejects_non_positive_close() {
        let err = PriceSeries::new("AAPL", vec![bar(2, 10.0), bar(3, 0.0)]).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidInput(_)));
    }

    #[test]
    fn empty_series_is_allowed() {
        let s = PriceSeries::new("AAPL", vec![]).unwrap();
        assert!(s.is_empty());
        assert!(s.latest().is_none());
    }

    #[test]
    fn tail_and_truncate() {
        let s = series_from_closes("T", &[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(s.tail(2).len(), 2);
        assert_eq!(s.tail(10).len(), 4);
        assert_eq!(s.truncated(3).closes(), vec![1.0, 2.0, 3.0]);
    }
}
