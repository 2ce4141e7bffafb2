//! Holding: one user-entered portfolio row.

use crate::error::DashboardError;
use serde::{Deserialize, Serialize};

const MAX_TICKER_LEN: usize = 15;

/// Normalize a user-entered ticker: trim and upper-case.
///
/// Accepts ASCII alphanumerics plus `.`, `-`, `^` and `=` so exchange
/// suffixes (`INFY.NS`), share classes (`BRK-B`), indices (`^GSPC`) and FX
/// pairs (`EURUSD=X`) pass through.
pub fn normalize_ticker(raw: &str) -> Result<String, DashboardError> {
    let ticker = raw.trim().to_ascii_uppercase();
    if ticker.is_empty() {
        return Err(DashboardError::invalid("ticker is empty"));
    }
    if ticker.len() > MAX_TICKER_LEN {
        return Err(DashboardError::invalid(format!(
            "ticker '{ticker}' is longer than {MAX_TICKER_LEN} characters"
        )));
    }
    if !ticker
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
    {
        return Err(DashboardError::invalid(format!(
            "ticker '{ticker}' contains invalid characters"
        )));
    }
    Ok(ticker)
}

/// A position the user added to their session portfolio.
///
/// Two holdings with the same ticker are kept as separate rows; cost bases
/// are never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub ticker: String,
    pub shares: f64,
    /// Purchase price per share.
    pub cost_basis: f64,
}

impl Holding {
    pub fn new(ticker: &str, shares: f64, cost_basis: f64) -> Result<Self, DashboardError> {
        let ticker = normalize_ticker(ticker)?;
        if !(shares.is_finite() && shares > 0.0) {
            return Err(DashboardError::invalid(format!(
                "shares must be positive, got {shares}"
            )));
        }
        if !(cost_basis.is_finite() && cost_basis > 0.0) {
            return Err(DashboardError::invalid(format!(
                "cost basis must be positive, got {cost_basis}"
            )));
        }
        Ok(Self {
            ticker,
            shares,
            cost_basis,
        })
    }

    pub fn cost_value(&self) -> f64 {
        self.shares * self.cost_basis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticker_is_upper_cased() {
        let h = Holding::new(" aapl ", 10.0, 100.0).unwrap();
        assert_eq!(h.ticker, "AAPL");
        assert_eq!(h.cost_value(), 1000.0);
    }

    #[test]
    fn accepts_exchange_suffixes() {
        assert_eq!(normalize_ticker("infy.ns").unwrap(), "INFY.NS");
        assert_eq!(normalize_ticker("brk-b").unwrap(), "BRK-B");
        assert_eq!(normalize_ticker("^gspc").unwrap(), "^GSPC");
    }

    #[test]
    fn rejects_malformed_tickers() {
        assert!(normalize_ticker("").is_err());
        assert!(normalize_ticker("   ").is_err());
        assert!(normalize_ticker("AA PL").is_err());
        assert!(normalize_ticker("AAPL;DROP").is_err());
        assert!(normalize_ticker("ABCDEFGHIJKLMNOPQ").is_err());
    }

    #[test]
    fn rejects_non_positive_amounts() {
        assert!(Holding::new("AAPL", 0.0, 100.0).is_err());
        assert!(Holding::new("AAPL", -1.0, 100.0).is_err());
        assert!(Holding::new("AAPL", 1.0, 0.0).is_err());
        assert!(Holding::new("AAPL", f64::NAN, 100.0).is_err());
        assert!(Holding::new("AAPL", 1.0, f64::INFINITY).is_err());
    }
}
