//! Display-name → ticker directory backing the symbol picker.
//!
//! Loaded once at startup from a two-column CSV with header `Name,stock`;
//! a built-in list is used when no file is configured.

use crate::domain::normalize_ticker;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read ticker directory {path}: {source}")]
    Read { path: PathBuf, source: csv::Error },

    #[error("malformed ticker directory row: {0}")]
    Row(#[from] csv::Error),

    #[error("invalid ticker '{ticker}' for '{name}'")]
    InvalidTicker { name: String, ticker: String },

    #[error("ticker directory is empty")]
    Empty,
}

const DEFAULT_ENTRIES: [(&str, &str); 20] = [
    ("Apple", "AAPL"),
    ("Tesla", "TSLA"),
    ("Microsoft", "MSFT"),
    ("Mullen", "MULN"),
    ("Bit Brother", "BETSF"),
    ("Paragon", "PRGNF"),
    ("Smart for Life", "SMFL"),
    ("Wearable Devices", "WLDS"),
    ("Kohl's Corporation", "KSS"),
    ("Affymax", "AFFY"),
    ("Wolfspeed", "WOLF"),
    ("Beyond Meat", "BYND"),
    ("American Rebel", "AREB"),
    ("Entegris", "ENTG"),
    ("CAVA Group", "CAVA"),
    ("Amcor", "AMCR"),
    ("Tapestry", "TPR"),
    ("CarMax", "KMX"),
    ("Pool Corporation", "POOL"),
    ("Exelixis", "EXEL"),
];

#[derive(Debug, Deserialize)]
struct Row {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "stock")]
    ticker: String,
}

#[derive(Debug, Clone)]
pub struct TickerDirectory {
    entries: Vec<(String, String)>,
    by_name: HashMap<String, usize>,
    by_folded: HashMap<String, usize>,
}

impl TickerDirectory {
    fn from_entries(entries: Vec<(String, String)>) -> Result<Self, DirectoryError> {
        if entries.is_empty() {
            return Err(DirectoryError::Empty);
        }
        Ok(Self::indexed(entries))
    }

    fn indexed(entries: Vec<(String, String)>) -> Self {
        let mut by_name = HashMap::new();
        let mut by_folded = HashMap::new();
        for (i, (name, _)) in entries.iter().enumerate() {
            // First occurrence wins for repeated names.
            by_name.entry(name.clone()).or_insert(i);
            by_folded.entry(name.to_lowercase()).or_insert(i);
        }
        Self {
            entries,
            by_name,
            by_folded,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, DirectoryError> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|source| DirectoryError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_csv(reader)
    }

    pub fn from_reader(rdr: impl std::io::Read) -> Result<Self, DirectoryError> {
        Self::from_csv(csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr))
    }

    fn from_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self, DirectoryError> {
        let mut entries = Vec::new();
        for row in reader.deserialize::<Row>() {
            let row = row?;
            if row.name.is_empty() && row.ticker.is_empty() {
                continue;
            }
            let ticker = normalize_ticker(&row.ticker).map_err(|_| DirectoryError::InvalidTicker {
                name: row.name.clone(),
                ticker: row.ticker.clone(),
            })?;
            entries.push((row.name, ticker));
        }
        tracing::debug!(entries = entries.len(), "loaded ticker directory");
        Self::from_entries(entries)
    }

    /// Configured file if given, otherwise the built-in list.
    pub fn load(path: Option<&Path>) -> Result<Self, DirectoryError> {
        match path {
            Some(p) => Self::from_path(p),
            None => Ok(Self::default()),
        }
    }

    /// Exact name match first, then case-insensitive.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.by_name
            .get(name)
            .or_else(|| self.by_folded.get(&name.to_lowercase()))
            .map(|&i| self.entries[i].1.as_str())
    }

    /// Display names in file order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TickerDirectory {
    fn default() -> Self {
        Self::indexed(
            DEFAULT_ENTRIES
                .iter()
                .map(|(n, t)| (n.to_string(), t.to_string()))
                .collect(),
        )
    }
}
