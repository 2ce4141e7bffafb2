//! Technical indicators over a `PriceSeries`.
//!
//! Every indicator is a pure function: series in, new aligned series out.
//! Output has the same length as the input; warmup slots are `None`.
//! No value at index i reads a bar after i.
//!
//! Window/length combinations that cannot produce a single value are
//! rejected with `DashboardError::InvalidInput` instead of returning an
//! all-`None` series. An empty input series is `NoDataAvailable`.

pub mod bollinger;
pub mod ema;
pub mod indicator;
pub mod macd;
pub mod rsi;
pub mod set;
pub mod sma;

pub use bollinger::{bollinger_bands, Bollinger, BollingerBand, BollingerBands};
pub use ema::{ema, Ema};
pub use indicator::Indicator;
pub use macd::{macd, Macd, MacdComponent, MacdIndicator};
pub use rsi::{rsi, Rsi, RsiZone};
pub use set::{IndicatorFrame, IndicatorSet};
pub use sma::{simple_moving_average, Sma};

use crate::domain::PriceSeries;
use crate::error::DashboardError;

/// An indicator output aligned to its input series.
pub type Series = Vec<Option<f64>>;

/// Reject empty series and windows that cannot fit.
///
/// `window + extra` is the number of bars required for the first defined
/// value. A sum that overflows `usize` can never fit either.
pub(crate) fn check_fit(
    series: &PriceSeries,
    what: &str,
    window: usize,
    extra: usize,
) -> Result<(), DashboardError> {
    if series.is_empty() {
        return Err(DashboardError::no_data(format!(
            "{} ({what})",
            series.symbol()
        )));
    }
    if window == 0 {
        return Err(DashboardError::invalid(format!(
            "{what}: window must be a positive integer"
        )));
    }
    let Some(needed) = window.checked_add(extra) else {
        return Err(DashboardError::invalid(format!(
            "{what}: window {window} is larger than any series"
        )));
    };
    if needed > series.len() {
        return Err(DashboardError::invalid(format!(
            "{what}: needs {needed} bars, series has {}",
            series.len()
        )));
    }
    Ok(())
}

/// Trailing mean over `window` values; `None` until the window fills.
pub(crate) fn rolling_mean(values: &[f64], window: usize) -> Series {
    let mut out = vec![None; values.len()];
    if window == 0 || window > values.len() {
        return out;
    }
    for (i, w) in values.windows(window).enumerate() {
        out[i + window - 1] = Some(w.iter().sum::<f64>() / window as f64);
    }
    out
}

#[cfg(test)]
pub fn make_series(closes: &[f64]) -> PriceSeries {
    crate::domain::series_from_closes("TEST", closes).unwrap()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolling_mean_fills_after_window() {
        let out = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(out, vec![None, Some(1.5), Some(2.5), Some(3.5)]);
    }

    #[test]
    fn rolling_mean_window_too_large() {
        assert!(rolling_mean(&[1.0], 2).iter().all(Option::is_none));
    }

    #[test]
    fn oversized_windows_are_invalid_everywhere() {
        let s = make_series(&[1.0, 2.0, 3.0]);
        let results = [
            simple_moving_average(&s, usize::MAX).map(|_| ()),
            ema(&s, usize::MAX).map(|_| ()),
            bollinger_bands(&s, usize::MAX, 2.0).map(|_| ()),
            rsi(&s, usize::MAX).map(|_| ()),
            macd(&s, 1, usize::MAX, 9).map(|_| ()),
        ];
        for r in results {
            assert!(matches!(r, Err(DashboardError::InvalidInput(_))));
        }
        assert!(check_fit(&s, "x", usize::MAX, 1).is_err());
    }

    #[test]
    fn check_fit_empty_is_no_data() {
        let empty = PriceSeries::new("EMPTY", vec![]).unwrap();
        let err = check_fit(&empty, "sma", 3, 0).unwrap_err();
        assert!(matches!(err, DashboardError::NoDataAvailable(_)));
    }
}
