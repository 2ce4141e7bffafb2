//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = EMA[t-1] + alpha * (close[t] - EMA[t-1]), alpha = 2 / (window + 1)
//! Seed: EMA[window-1] = SMA of first `window` close values.
//! Lookback: window - 1.

use super::{check_fit, Indicator, Series};
use crate::domain::PriceSeries;
use crate::error::DashboardError;

/// EMA of closes over `window` bars.
pub fn ema(series: &PriceSeries, window: usize) -> Result<Series, DashboardError> {
    check_fit(series, "ema", window, 0)?;
    let closes: Vec<Option<f64>> = series.closes().into_iter().map(Some).collect();
    Ok(ema_of_series(&closes, window))
}

/// EMA of an arbitrary aligned series.
///
/// Leading `None`s are skipped; the seed is the mean of the first `window`
/// defined values. A `None` after the seed taints every later value.
/// Used by MACD to smooth the MACD line into its signal line.
pub fn ema_of_series(values: &[Option<f64>], window: usize) -> Series {
    let n = values.len();
    let mut result = vec![None; n];

    let Some(start) = values.iter().position(Option::is_some) else {
        return result;
    };
    if window == 0 || start.checked_add(window).map_or(true, |end| end > n) {
        return result;
    }

    let mut sum = 0.0;
    for v in &values[start..start + window] {
        match v {
            Some(x) => sum += x,
            None => return result,
        }
    }
    let seed_index = start + window - 1;
    let alpha = 2.0 / (window as f64 + 1.0);
    let mut prev = sum / window as f64;
    result[seed_index] = Some(prev);

    for i in (seed_index + 1)..n {
        let Some(x) = values[i] else {
            break;
        };
        prev += alpha * (x - prev);
        result[i] = Some(prev);
    }

    result
}

#[derive(Debug, Clone)]
pub struct Ema {
    window: usize,
    name: String,
}

impl Ema {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            name: format!("ema_{window}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window.saturating_sub(1)
    }

    fn compute(&self, series: &PriceSeries) -> Result<Series, DashboardError> {
        ema(series, self.window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_series, DEFAULT_EPSILON};

    #[test]
    fn ema_window_1_equals_close() {
        let s = make_series(&[100.0, 200.0, 300.0]);
        let result = ema(&s, 1).unwrap();
        assert_approx(result[0].unwrap(), 100.0, DEFAULT_EPSILON);
        assert_approx(result[1].unwrap(), 200.0, DEFAULT_EPSILON);
        assert_approx(result[2].unwrap(), 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_3_known_values() {
        // alpha = 2/(3+1) = 0.5
        // Seed at index 2: SMA(10,11,12) = 11.0
        // EMA[3] = 11 + 0.5*(13-11) = 12.0
        // EMA[4] = 12 + 0.5*(14-12) = 13.0
        let s = make_series(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let result = Ema::new(3).compute(&s).unwrap();

        assert!(result[0].is_none());
        assert!(result[1].is_none());
        assert_approx(result[2].unwrap(), 11.0, DEFAULT_EPSILON);
        assert_approx(result[3].unwrap(), 12.0, DEFAULT_EPSILON);
        assert_approx(result[4].unwrap(), 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_of_series_skips_leading_none() {
        let values = vec![None, None, Some(2.0), Some(4.0), Some(6.0)];
        let result = ema_of_series(&values, 2);
        // seed at index 3 = mean(2,4) = 3; alpha = 2/3
        // EMA[4] = 3 + 2/3*(6-3) = 5
        assert_eq!(&result[..3], &[None, None, None]);
        assert_approx(result[3].unwrap(), 3.0, DEFAULT_EPSILON);
        assert_approx(result[4].unwrap(), 5.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_of_series_gap_after_seed_taints_rest() {
        let values = vec![Some(1.0), Some(1.0), None, Some(1.0)];
        let result = ema_of_series(&values, 2);
        assert_eq!(result, vec![None, Some(1.0), None, None]);
    }

    #[test]
    fn ema_too_few_bars_is_invalid() {
        let s = make_series(&[1.0, 2.0]);
        assert!(matches!(
            ema(&s, 3).unwrap_err(),
            DashboardError::InvalidInput(_)
        ));
    }

    #[test]
    fn ema_lookback() {
        assert_eq!(Ema::new(20).lookback(), 19);
        assert_eq!(Ema::new(1).lookback(), 0);
    }
}
