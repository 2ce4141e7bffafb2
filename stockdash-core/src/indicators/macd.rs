//! Moving Average Convergence Divergence (MACD).
//!
//! - MACD line: EMA(fast) - EMA(slow), defined from index slow-1
//! - Signal line: EMA(MACD line, signal), seeded from the first `signal` defined MACD values
//! - Histogram: MACD line - signal line
//!
//! Lookback: slow + signal - 2.

use super::ema::ema_of_series;
use super::{check_fit, Indicator, Series};
use crate::domain::PriceSeries;
use crate::error::DashboardError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Macd {
    pub macd_line: Series,
    pub signal_line: Series,
    pub histogram: Series,
}

pub fn macd(
    series: &PriceSeries,
    fast: usize,
    slow: usize,
    signal: usize,
) -> Result<Macd, DashboardError> {
    if fast == 0 || signal == 0 || fast >= slow {
        return Err(DashboardError::invalid(format!(
            "macd: need 0 < fast < slow and signal > 0, got ({fast}, {slow}, {signal})"
        )));
    }
    check_fit(series, "macd", slow, signal - 1)?;

    let closes: Vec<Option<f64>> = series.closes().into_iter().map(Some).collect();
    let fast_ema = ema_of_series(&closes, fast);
    let slow_ema = ema_of_series(&closes, slow);

    let macd_line: Series = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal_line = ema_of_series(&macd_line, signal);
    let histogram = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| Some((*m)? - (*s)?))
        .collect();

    Ok(Macd {
        macd_line,
        signal_line,
        histogram,
    })
}

/// Which MACD output to expose as a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdComponent {
    Line,
    Signal,
    Histogram,
}

#[derive(Debug, Clone)]
pub struct MacdIndicator {
    fast: usize,
    slow: usize,
    signal: usize,
    component: MacdComponent,
    name: String,
}

impl MacdIndicator {
    pub fn new(component: MacdComponent, fast: usize, slow: usize, signal: usize) -> Self {
        let prefix = match component {
            MacdComponent::Line => "macd",
            MacdComponent::Signal => "macd_signal",
            MacdComponent::Histogram => "macd_hist",
        };
        Self {
            fast,
            slow,
            signal,
            component,
            name: format!("{prefix}_{fast}_{slow}_{signal}"),
        }
    }

    pub fn all(fast: usize, slow: usize, signal: usize) -> [Self; 3] {
        [
            Self::new(MacdComponent::Line, fast, slow, signal),
            Self::new(MacdComponent::Signal, fast, slow, signal),
            Self::new(MacdComponent::Histogram, fast, slow, signal),
        ]
    }
}

impl Indicator for MacdIndicator {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.component {
            MacdComponent::Line => self.slow.saturating_sub(1),
            MacdComponent::Signal | MacdComponent::Histogram => {
                self.slow.saturating_add(self.signal).saturating_sub(2)
            }
        }
    }

    fn compute(&self, series: &PriceSeries) -> Result<Series, DashboardError> {
        let m = macd(series, self.fast, self.slow, self.signal)?;
        Ok(match self.component {
            MacdComponent::Line => m.macd_line,
            MacdComponent::Signal => m.signal_line,
            MacdComponent::Histogram => m.histogram,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, ema, make_series, DEFAULT_EPSILON};

    fn wave(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect()
    }

    #[test]
    fn macd_line_is_fast_minus_slow() {
        let s = make_series(&wave(60));
        let m = macd(&s, 12, 26, 9).unwrap();
        let fast = ema(&s, 12).unwrap();
        let slow = ema(&s, 26).unwrap();
        for i in 25..60 {
            assert_approx(
                m.macd_line[i].unwrap(),
                fast[i].unwrap() - slow[i].unwrap(),
                DEFAULT_EPSILON,
            );
        }
        assert!(m.macd_line[24].is_none());
    }

    #[test]
    fn signal_starts_after_signal_window() {
        let s = make_series(&wave(40));
        let m = macd(&s, 3, 6, 4).unwrap();
        // macd defined from 5, signal seeded at 5 + 4 - 1 = 8
        assert!(m.macd_line[5].is_some());
        assert!(m.signal_line[7].is_none());
        assert!(m.signal_line[8].is_some());
        assert!(m.histogram[7].is_none());
    }

    #[test]
    fn histogram_identity() {
        let s = make_series(&wave(80));
        let m = macd(&s, 12, 26, 9).unwrap();
        for i in 0..80 {
            match (m.macd_line[i], m.signal_line[i], m.histogram[i]) {
                (Some(line), Some(sig), Some(hist)) => assert_eq!(hist, line - sig),
                (_, _, hist) => assert!(hist.is_none()),
            }
        }
    }

    #[test]
    fn constant_series_has_zero_macd() {
        let s = make_series(&[50.0; 40]);
        let m = macd(&s, 12, 26, 9).unwrap();
        assert_approx(m.macd_line[39].unwrap(), 0.0, 1e-9);
        assert_approx(m.histogram[39].unwrap(), 0.0, 1e-9);
    }

    #[test]
    fn rejects_bad_parameters() {
        let s = make_series(&wave(50));
        assert!(macd(&s, 26, 12, 9).is_err());
        assert!(macd(&s, 0, 12, 9).is_err());
        assert!(macd(&s, 12, 26, 0).is_err());
    }

    #[test]
    fn huge_windows_are_invalid() {
        let s = make_series(&wave(50));
        for (fast, slow, signal) in [(1, usize::MAX, 9), (12, 26, usize::MAX)] {
            assert!(matches!(
                macd(&s, fast, slow, signal).unwrap_err(),
                DashboardError::InvalidInput(_)
            ));
        }
        let part = MacdIndicator::new(MacdComponent::Signal, 1, usize::MAX, usize::MAX);
        assert_eq!(part.lookback(), usize::MAX - 2);
    }

    #[test]
    fn rejects_short_series() {
        // 26 + 9 - 1 = 34 bars needed
        let s = make_series(&wave(33));
        assert!(matches!(
            macd(&s, 12, 26, 9).unwrap_err(),
            DashboardError::InvalidInput(_)
        ));
        assert!(macd(&make_series(&wave(34)), 12, 26, 9).is_ok());
    }

    #[test]
    fn macd_columns() {
        let [line, signal, hist] = MacdIndicator::all(12, 26, 9);
        assert_eq!(line.name(), "macd_12_26_9");
        assert_eq!(signal.name(), "macd_signal_12_26_9");
        assert_eq!(hist.name(), "macd_hist_12_26_9");
        assert_eq!(line.lookback(), 25);
        assert_eq!(hist.lookback(), 33);
    }
}
