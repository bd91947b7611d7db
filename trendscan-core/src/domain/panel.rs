//! Panel: one snapshot of hourly histories for the whole universe.
//!
//! The benchmark instrument lives in the same map as the rest of the universe;
//! the screening configuration names which symbol plays that role.

use std::collections::BTreeMap;

use thiserror::Error;

use super::{Bar, Symbol};

/// Rejections raised while assembling a panel.
#[derive(Debug, Error, PartialEq)]
pub enum PanelError {
    #[error("series for '{symbol}' is empty")]
    EmptySeries { symbol: String },

    #[error("series for '{symbol}' is not strictly increasing at bar {index}")]
    NonMonotonic { symbol: String, index: usize },

    #[error("symbol '{symbol}' inserted twice")]
    DuplicateSymbol { symbol: String },
}

/// Symbol → ordered hourly bars. Iteration order is lexicographic by symbol,
/// which keeps every downstream stage deterministic.
#[derive(Debug, Clone, Default)]
pub struct Panel {
    series: BTreeMap<Symbol, Vec<Bar>>,
}

impl Panel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a series after checking that timestamps are strictly increasing.
    pub fn insert(&mut self, symbol: impl Into<Symbol>, bars: Vec<Bar>) -> Result<(), PanelError> {
        let symbol = symbol.into();
        if bars.is_empty() {
            return Err(PanelError::EmptySeries { symbol });
        }
        if let Some(index) = bars
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(PanelError::NonMonotonic {
                symbol,
                index: index + 1,
            });
        }
        if self.series.contains_key(&symbol) {
            return Err(PanelError::DuplicateSymbol { symbol });
        }
        self.series.insert(symbol, bars);
        Ok(())
    }

    pub fn get(&self, symbol: &str) -> Option<&[Bar]> {
        self.series.get(symbol).map(|v| v.as_slice())
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.series.contains_key(symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Bar])> {
        self.series.iter().map(|(s, b)| (s.as_str(), b.as_slice()))
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
