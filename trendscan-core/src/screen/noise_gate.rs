//! Cross-sectional noise filter.
//!
//! Drops the most volatile tail (ATR fraction above the universe P95) and the
//! least liquid tail (median dollar volume below the universe P10). Thresholds
//! come from the whole snapshot; a row with a missing metric fails.

use super::config::NoiseGateConfig;
use super::features::UniverseSnapshot;
use crate::indicators::quantile;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseThresholds {
    pub max_atr_fraction: f64,
    pub min_dollar_volume: f64,
}

pub struct NoiseGate<'c> {
    config: &'c NoiseGateConfig,
}

impl<'c> NoiseGate<'c> {
    pub fn new(config: &'c NoiseGateConfig) -> Self {
        Self { config }
    }

    /// Quantile thresholds over the finite values of the snapshot.
    pub fn thresholds(&self, snapshot: &UniverseSnapshot) -> NoiseThresholds {
        let atr: Vec<f64> = snapshot
            .rows
            .iter()
            .map(|r| r.atr_fraction)
            .filter(|v| v.is_finite())
            .collect();
        let volume: Vec<f64> = snapshot
            .rows
            .iter()
            .map(|r| r.median_dollar_volume)
            .filter(|v| v.is_finite())
            .collect();

        NoiseThresholds {
            max_atr_fraction: quantile(&atr, self.config.atr_percentile),
            min_dollar_volume: quantile(&volume, self.config.volume_percentile),
        }
    }

    /// Symbols that survive both tails, in snapshot order.
    pub fn apply(&self, snapshot: &UniverseSnapshot) -> Vec<String> {
        if snapshot.is_empty() {
            return Vec::new();
        }
        let t = self.thresholds(snapshot);
        snapshot
            .rows
            .iter()
            .filter(|r| {
                r.atr_fraction <= t.max_atr_fraction
                    && r.median_dollar_volume >= t.min_dollar_volume
            })
            .map(|r| r.symbol.clone())
            .collect()
    }
}
