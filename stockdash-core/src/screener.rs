//! Trending ranking and the fundamentals screener.

use crate::domain::{CompanyProfile, DaySnapshot};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Most active first. Equal volumes keep their input order.
pub fn rank_trending(mut snapshots: Vec<DaySnapshot>) -> Vec<DaySnapshot> {
    snapshots.sort_by_key(|s| Reverse(s.volume));
    snapshots
}

/// One screener table row. Missing upstream numbers are stored as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenerRow {
    pub ticker: String,
    pub name: String,
    pub sector: String,
    pub industry: String,
    pub market_cap: f64,
    pub trailing_pe: f64,
    /// Percent, not fraction.
    pub dividend_yield_pct: f64,
}

impl From<&CompanyProfile> for ScreenerRow {
    fn from(p: &CompanyProfile) -> Self {
        Self {
            ticker: p.ticker.clone(),
            name: p.display_name().to_string(),
            sector: p.display_sector().to_string(),
            industry: p.industry.clone().unwrap_or_else(|| "N/A".into()),
            market_cap: p.market_cap.unwrap_or(0.0),
            trailing_pe: p.trailing_pe.unwrap_or(0.0),
            dividend_yield_pct: p.dividend_yield_pct(),
        }
    }
}

impl ScreenerRow {
    pub fn market_cap_billions(&self) -> f64 {
        self.market_cap / 1e9
    }
}

/// Inclusive numeric range; an open side is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Bounds {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, v: f64) -> bool {
        self.min.map_or(true, |m| v >= m) && self.max.map_or(true, |m| v <= m)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenerFilter {
    /// Sectors to keep; empty keeps every sector.
    pub sectors: Vec<String>,
    pub market_cap_billions: Bounds,
    pub trailing_pe: Bounds,
    pub dividend_yield_pct: Bounds,
}

impl ScreenerFilter {
    pub fn matches(&self, row: &ScreenerRow) -> bool {
        (self.sectors.is_empty() || self.sectors.iter().any(|s| s == &row.sector))
            && self.market_cap_billions.contains(row.market_cap_billions())
            && self.trailing_pe.contains(row.trailing_pe)
            && self.dividend_yield_pct.contains(row.dividend_yield_pct)
    }

    /// Matching rows in input order.
    pub fn apply<'a>(&self, rows: &'a [ScreenerRow]) -> Vec<&'a ScreenerRow> {
        rows.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Distinct sectors in first-seen order, for building a sector picker.
pub fn sectors(rows: &[ScreenerRow]) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::new();
    for r in rows {
        if !out.contains(&r.sector.as_str()) {
            out.push(&r.sector);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(ticker: &str, volume: u64) -> DaySnapshot {
        DaySnapshot {
            ticker: ticker.into(),
            name: None,
            open: 10.0,
            close: 11.0,
            volume,
        }
    }

    fn row(ticker: &str, sector: &str, cap_bn: f64, pe: f64, div: f64) -> ScreenerRow {
        ScreenerRow {
            ticker: ticker.into(),
            name: ticker.into(),
            sector: sector.into(),
            industry: "N/A".into(),
            market_cap: cap_bn * 1e9,
            trailing_pe: pe,
            dividend_yield_pct: div,
        }
    }

    #[test]
    fn trending_sorted_by_volume_desc() {
        let ranked = rank_trending(vec![snap("A", 10), snap("B", 30), snap("C", 20)]);
        let order: Vec<_> = ranked.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(order, vec!["B", "C", "A"]);
    }

    #[test]
    fn trending_ties_are_stable() {
        let ranked = rank_trending(vec![snap("A", 5), snap("B", 5), snap("C", 9)]);
        let order: Vec<_> = ranked.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
    }

    #[test]
    fn default_filter_keeps_everything() {
        let rows = vec![row("A", "Tech", 100.0, 20.0, 1.0), row("B", "Energy", 5.0, 0.0, 0.0)];
        assert_eq!(ScreenerFilter::default().apply(&rows).len(), 2);
    }

    #[test]
    fn bounds_are_inclusive() {
        let rows = vec![
            row("A", "Tech", 100.0, 20.0, 1.0),
            row("B", "Tech", 200.0, 30.0, 2.0),
            row("C", "Energy", 300.0, 40.0, 3.0),
        ];
        let f = ScreenerFilter {
            market_cap_billions: Bounds::new(Some(100.0), Some(200.0)),
            trailing_pe: Bounds::new(None, Some(30.0)),
            ..Default::default()
        };
        let out: Vec<_> = f.apply(&rows).iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(out, vec!["A", "B"]);
    }

    #[test]
    fn sector_filter() {
        let rows = vec![row("A", "Tech", 1.0, 1.0, 0.0), row("B", "Energy", 1.0, 1.0, 0.0)];
        let f = ScreenerFilter {
            sectors: vec!["Energy".into()],
            ..Default::default()
        };
        let out = f.apply(&rows);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].ticker, "B");
    }

    #[test]
    fn missing_fundamentals_count_as_zero() {
        let p = CompanyProfile {
            ticker: "X".into(),
            ..Default::default()
        };
        let r = ScreenerRow::from(&p);
        assert_eq!(r.market_cap, 0.0);
        assert_eq!(r.trailing_pe, 0.0);
        assert_eq!(r.sector, "N/A");

        let f = ScreenerFilter {
            dividend_yield_pct: Bounds::new(Some(0.0), Some(0.0)),
            ..Default::default()
        };
        assert!(f.matches(&r));
    }

    #[test]
    fn distinct_sectors_in_order() {
        let rows = vec![
            row("A", "Tech", 1.0, 1.0, 0.0),
            row("B", "Energy", 1.0, 1.0, 0.0),
            row("C", "Tech", 1.0, 1.0, 0.0),
        ];
        assert_eq!(sectors(&rows), vec!["Tech", "Energy"]);
    }
}
