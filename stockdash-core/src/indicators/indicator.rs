//! Indicator trait.
//!
//! Lets the dashboard build a configurable list of named indicator columns
//! and compute them uniformly.

use super::Series;
use crate::domain::PriceSeries;
use crate::error::DashboardError;

/// A single-output indicator.
///
/// # Look-ahead contamination guard
/// No value at bar t may depend on price data from bar t+1 or later.
/// Every indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Column name (e.g., "sma_20", "rsi_14").
    fn name(&self) -> &str;

    /// Number of leading `None` values in the output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire series.
    ///
    /// Returns a series of the same length as the input, or
    /// `InvalidInput` when the window does not fit.
    fn compute(&self, series: &PriceSeries) -> Result<Series, DashboardError>;
}
