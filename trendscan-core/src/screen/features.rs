//! Per-symbol feature columns and the universe snapshot.

use std::collections::BTreeMap;

use tracing::debug;

use super::config::ScreenConfig;
use crate::domain::{Bar, Panel};
use crate::indicators::{trailing_median, Atr, Indicator};

/// Derived columns for one symbol, aligned one-to-one with its bars.
#[derive(Debug, Clone)]
pub struct SymbolFeatures<'p> {
    pub symbol: &'p str,
    pub bars: &'p [Bar],
    pub close: Vec<f64>,
    pub atr: Vec<f64>,
    pub atr_fraction: Vec<f64>,
    pub dollar_volume: Vec<f64>,
    pub log_close: Vec<f64>,
}

impl SymbolFeatures<'_> {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last_close(&self) -> f64 {
        self.close.last().copied().unwrap_or(f64::NAN)
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }
}

/// Current-bar metrics of one symbol, compared cross-sectionally.
#[derive(Debug, Clone, PartialEq)]
pub struct UniverseRow {
    pub symbol: String,
    pub atr_fraction: f64,
    pub median_dollar_volume: f64,
}

/// One row per preprocessed symbol, all taken at the same snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniverseSnapshot {
    pub rows: Vec<UniverseRow>,
}

impl UniverseSnapshot {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Output of preprocessing a panel.
#[derive(Debug, Clone, Default)]
pub struct PreprocessedPanel<'p> {
    pub features: BTreeMap<&'p str, SymbolFeatures<'p>>,
    pub snapshot: UniverseSnapshot,
    /// Screenable symbols offered (benchmark and exclusions removed).
    pub candidates_offered: usize,
    pub skipped_short: usize,
}

pub struct PanelPreprocessor<'c> {
    config: &'c ScreenConfig,
    atr: Atr,
}

impl<'c> PanelPreprocessor<'c> {
    pub fn new(config: &'c ScreenConfig) -> Self {
        Self {
            config,
            atr: Atr::new(config.noise.atr_period.max(1)),
        }
    }

    /// Compute the feature columns of a single series.
    pub fn features<'p>(&self, symbol: &'p str, bars: &'p [Bar]) -> SymbolFeatures<'p> {
        let close: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let atr = self.atr.compute(bars);
        let atr_fraction = atr.iter().zip(&close).map(|(a, c)| a / c).collect();
        let dollar_volume = bars.iter().map(|b| b.volume * b.close).collect();
        let log_close = close.iter().map(|c| c.ln()).collect();

        SymbolFeatures {
            symbol,
            bars,
            close,
            atr,
            atr_fraction,
            dollar_volume,
            log_close,
        }
    }

    /// Snapshot row from a symbol's last bar.
    pub fn snapshot_row(&self, features: &SymbolFeatures<'_>) -> UniverseRow {
        UniverseRow {
            symbol: features.symbol.to_string(),
            atr_fraction: features.atr_fraction.last().copied().unwrap_or(f64::NAN),
            median_dollar_volume: trailing_median(
                &features.dollar_volume,
                self.config.noise.volume_median_bars,
            ),
        }
    }

    /// Preprocess every screenable symbol of `panel`.
    ///
    /// The benchmark and excluded symbols are not screened. Series shorter
    /// than `ScreenConfig::required_bars` are skipped.
    pub fn run<'p>(&self, panel: &'p Panel) -> PreprocessedPanel<'p> {
        let required = self.config.required_bars();
        let mut out = PreprocessedPanel::default();

        for (symbol, bars) in panel.iter() {
            if symbol == self.config.benchmark_symbol || self.config.is_excluded(symbol) {
                continue;
            }
            out.candidates_offered += 1;

            if bars.len() < required {
                debug!(symbol, bars = bars.len(), required, "skipping short history");
                out.skipped_short += 1;
                continue;
            }

            let features = self.features(symbol, bars);
            out.snapshot.rows.push(self.snapshot_row(&features));
            out.features.insert(symbol, features);
        }

        out
    }
}
