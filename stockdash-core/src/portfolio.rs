//! Portfolio valuation: per-holding marks and the session portfolio.
//!
//! Aggregation is partial-failure tolerant. A holding whose ticker has no
//! usable quote is valued at zero and flagged rather than aborting the whole
//! table, so one bad ticker never hides the rest of the portfolio.

use crate::domain::{Holding, Quote};
use crate::error::DashboardError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValuationStatus {
    Valued,
    QuoteUnavailable,
}

/// One row of the portfolio table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingValuation {
    pub ticker: String,
    pub shares: f64,
    pub cost_basis: f64,
    pub last_price: Option<f64>,
    pub current_value: f64,
    pub cost_value: f64,
    pub gain: f64,
    /// Share of total current value; `None` when the total is not positive.
    pub allocation: Option<f64>,
    pub status: ValuationStatus,
}

/// Mark one holding against its quote.
///
/// Fails with `QuoteUnavailable` when there is no quote or its price is not
/// finite and positive.
pub fn value_holding(
    holding: &Holding,
    quote: Option<&Quote>,
) -> Result<HoldingValuation, DashboardError> {
    let price = quote
        .filter(|q| q.is_usable())
        .map(|q| q.last_price)
        .ok_or_else(|| DashboardError::QuoteUnavailable {
            ticker: holding.ticker.clone(),
        })?;

    let current_value = holding.shares * price;
    let cost_value = holding.cost_value();
    Ok(HoldingValuation {
        ticker: holding.ticker.clone(),
        shares: holding.shares,
        cost_basis: holding.cost_basis,
        last_price: Some(price),
        current_value,
        cost_value,
        gain: current_value - cost_value,
        allocation: None,
        status: ValuationStatus::Valued,
    })
}

fn unvalued(holding: &Holding) -> HoldingValuation {
    let cost_value = holding.cost_value();
    HoldingValuation {
        ticker: holding.ticker.clone(),
        shares: holding.shares,
        cost_basis: holding.cost_basis,
        last_price: None,
        current_value: 0.0,
        cost_value,
        gain: -cost_value,
        allocation: None,
        status: ValuationStatus::QuoteUnavailable,
    }
}

/// The valued portfolio table plus its totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioValuation {
    pub rows: Vec<HoldingValuation>,
    pub total_current: f64,
    pub total_cost: f64,
    pub total_gain: f64,
}

impl PortfolioValuation {
    /// Tickers whose rows could not be marked.
    pub fn unavailable(&self) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .filter(|r| r.status == ValuationStatus::QuoteUnavailable)
            .map(|r| r.ticker.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Value every holding in order; rows are never merged or dropped.
pub fn aggregate_portfolio(
    holdings: &[Holding],
    quotes: &HashMap<String, Quote>,
) -> PortfolioValuation {
    let mut rows: Vec<HoldingValuation> = holdings
        .iter()
        .map(|h| match value_holding(h, quotes.get(&h.ticker)) {
            Ok(row) => row,
            Err(e) => {
                tracing::debug!(ticker = %h.ticker, "valuing at zero: {e}");
                unvalued(h)
            }
        })
        .collect();

    let total_current: f64 = rows.iter().map(|r| r.current_value).sum();
    let total_cost: f64 = rows.iter().map(|r| r.cost_value).sum();

    if total_current > 0.0 {
        for row in &mut rows {
            row.allocation = Some(row.current_value / total_current);
        }
    }

    PortfolioValuation {
        rows,
        total_current,
        total_cost,
        total_gain: total_current - total_cost,
    }
}

/// Holdings entered during one session. Append-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    holdings: Vec<Holding>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append a holding. Existing rows are never touched.
    pub fn add(
        &mut self,
        ticker: &str,
        shares: f64,
        cost_basis: f64,
    ) -> Result<&Holding, DashboardError> {
        let holding = Holding::new(ticker, shares, cost_basis)?;
        tracing::info!(ticker = %holding.ticker, shares, cost_basis, "holding added");
        self.holdings.push(holding);
        Ok(&self.holdings[self.holdings.len() - 1])
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    /// Distinct tickers in first-seen order.
    pub fn tickers(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for h in &self.holdings {
            if !seen.contains(&h.ticker.as_str()) {
                seen.push(h.ticker.as_str());
            }
        }
        seen
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quotes(pairs: &[(&str, f64)]) -> HashMap<String, Quote> {
        pairs
            .iter()
            .map(|(t, p)| (t.to_string(), Quote::new(*t, *p)))
            .collect()
    }

    #[test]
    fn single_holding_gain() {
        let h = Holding::new("AAPL", 10.0, 150.0).unwrap();
        let q = Quote::new("AAPL", 170.0);
        let v = value_holding(&h, Some(&q)).unwrap();
        assert_eq!(v.current_value, 1700.0);
        assert_eq!(v.cost_value, 1500.0);
        assert_eq!(v.gain, 200.0);
    }

    #[test]
    fn ten_shares_at_100_quoted_150() {
        let holdings = vec![Holding::new("AAPL", 10.0, 100.0).unwrap()];
        let v = aggregate_portfolio(&holdings, &quotes(&[("AAPL", 150.0)]));
        assert_eq!(v.rows[0].current_value, 1500.0);
        assert_eq!(v.rows[0].cost_value, 1000.0);
        assert_eq!(v.rows[0].gain, 500.0);
        assert_eq!(
            (v.total_current, v.total_cost, v.total_gain),
            (1500.0, 1000.0, 500.0)
        );
        assert_eq!(v.rows[0].allocation, Some(1.0));
    }

    #[test]
    fn missing_or_bad_quote_is_unavailable() {
        let h = Holding::new("AAPL", 1.0, 1.0).unwrap();
        assert!(matches!(
            value_holding(&h, None),
            Err(DashboardError::QuoteUnavailable { .. })
        ));
        let nan = Quote::new("AAPL", f64::NAN);
        assert!(value_holding(&h, Some(&nan)).is_err());
    }

    #[test]
    fn aggregate_worked_example() {
        let holdings = vec![
            Holding::new("AAPL", 10.0, 150.0).unwrap(),
            Holding::new("MSFT", 5.0, 300.0).unwrap(),
        ];
        let v = aggregate_portfolio(&holdings, &quotes(&[("AAPL", 170.0), ("MSFT", 280.0)]));
        assert_eq!(v.total_current, 3100.0);
        assert_eq!(v.total_cost, 3000.0);
        assert_eq!(v.total_gain, 100.0);
        let alloc = v.rows[0].allocation.unwrap();
        assert!((alloc - 1700.0 / 3100.0).abs() < 1e-12);
    }

    #[test]
    fn missing_quote_row_is_zeroed_and_flagged() {
        let holdings = vec![
            Holding::new("AAPL", 10.0, 150.0).unwrap(),
            Holding::new("ZZZZ", 2.0, 50.0).unwrap(),
        ];
        let v = aggregate_portfolio(&holdings, &quotes(&[("AAPL", 170.0)]));
        assert_eq!(v.rows.len(), 2);
        assert_eq!(v.rows[1].status, ValuationStatus::QuoteUnavailable);
        assert_eq!(v.rows[1].current_value, 0.0);
        assert_eq!(v.rows[1].gain, -100.0);
        assert_eq!(v.total_current, 1700.0);
        assert_eq!(v.total_gain, 1700.0 - 1600.0);
        assert_eq!(v.unavailable().collect::<Vec<_>>(), vec!["ZZZZ"]);
    }

    #[test]
    fn allocation_undefined_when_nothing_valued() {
        let holdings = vec![Holding::new("ZZZZ", 2.0, 50.0).unwrap()];
        let v = aggregate_portfolio(&holdings, &HashMap::new());
        assert_eq!(v.total_current, 0.0);
        assert!(v.rows[0].allocation.is_none());
    }

    #[test]
    fn duplicate_tickers_stay_separate() {
        let mut p = Portfolio::new();
        p.add("aapl", 10.0, 150.0).unwrap();
        p.add("AAPL", 5.0, 120.0).unwrap();
        assert_eq!(p.len(), 2);
        assert_eq!(p.tickers(), vec!["AAPL"]);

        let v = aggregate_portfolio(p.holdings(), &quotes(&[("AAPL", 200.0)]));
        assert_eq!(v.rows.len(), 2);
        assert_eq!(v.rows[0].gain, 500.0);
        assert_eq!(v.rows[1].gain, 400.0);
    }

    #[test]
    fn add_rejects_invalid_rows() {
        let mut p = Portfolio::new();
        assert!(p.add("", 1.0, 1.0).is_err());
        assert!(p.add("AAPL", 0.0, 1.0).is_err());
        assert!(p.add("AAPL", 1.0, -3.0).is_err());
        assert!(p.is_empty());
    }

    #[test]
    fn empty_portfolio_totals_zero() {
        let v = aggregate_portfolio(&[], &HashMap::new());
        assert!(v.is_empty());
        assert_eq!(v.total_gain, 0.0);
    }
}
