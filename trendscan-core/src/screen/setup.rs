//! Chart-pattern setups.
//!
//! Contraction base ("VCP"): after an impulse, a tight range near its top.
//! For each scan length the range width (in ATRs) is ranked against the
//! symbol's own trailing distribution of same-length widths; the base passes
//! when the width is in the bottom tail, the close sits in the upper part of
//! the range, and no close in the base fell below the long EMA. Quality is the
//! lowest passing width rank.
//!
//! Breakout flag ("PowerPlay"): a recent close above the prior rolling high,
//! followed by a flag whose width ranks in the bottom tail of its own history,
//! with the close above the short EMA.

use super::config::{BreakoutConfig, ContractionConfig};
use super::features::SymbolFeatures;
use crate::domain::SetupKind;
use crate::indicators::{
    diff, ema_of_series, percentile_rank_at, quantile, rolling_max, rolling_min, shift,
};

/// The tightest qualifying base.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContractionBase {
    pub lookback: usize,
    /// Percentile rank of the base width within its own history, in [0, 1].
    pub width_rank: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetupEvaluation {
    pub contraction: Option<ContractionBase>,
    pub breakout_flag: bool,
}

impl SetupEvaluation {
    pub fn any(&self) -> bool {
        self.contraction.is_some() || self.breakout_flag
    }

    /// Label of the qualifying setup. A breakout flag takes precedence.
    pub fn kind(&self) -> Option<SetupKind> {
        if self.breakout_flag {
            Some(SetupKind::PowerPlay)
        } else if self.contraction.is_some() {
            Some(SetupKind::Vcp)
        } else {
            None
        }
    }
}

pub struct SetupDetector<'c> {
    contraction: &'c ContractionConfig,
    breakout: &'c BreakoutConfig,
    distribution_bars: usize,
}

impl<'c> SetupDetector<'c> {
    pub fn new(
        contraction: &'c ContractionConfig,
        breakout: &'c BreakoutConfig,
        distribution_bars: usize,
    ) -> Self {
        Self {
            contraction,
            breakout,
            distribution_bars,
        }
    }

    pub fn evaluate(&self, features: &SymbolFeatures<'_>) -> SetupEvaluation {
        let highs = features.highs();
        let lows = features.lows();
        SetupEvaluation {
            contraction: self.contraction_base(features, &highs, &lows),
            breakout_flag: self.breakout_flag(features, &highs, &lows),
        }
    }

    /// Whether the latest `impulse_window` log-return beats the configured
    /// quantile of its own trailing distribution.
    pub fn impulse(&self, features: &SymbolFeatures<'_>) -> bool {
        let Some(last) = features.len().checked_sub(1) else {
            return false;
        };
        let returns = diff(&features.log_close, self.contraction.impulse_window);
        let start = (last + 1).saturating_sub(self.distribution_bars);
        let threshold = quantile(&returns[start..], self.contraction.impulse_quantile);
        returns[last] > threshold
    }

    pub fn contraction_base(
        &self,
        features: &SymbolFeatures<'_>,
        highs: &[f64],
        lows: &[f64],
    ) -> Option<ContractionBase> {
        let cfg = self.contraction;
        if !self.impulse(features) {
            return None;
        }

        let last = features.len() - 1;
        let close = &features.close;
        let support = ema_of_series(close, cfg.support_ema_span)[last];
        let mut best: Option<ContractionBase> = None;

        for &lookback in &cfg.lookbacks {
            if lookback == 0 || lookback > features.len() {
                continue;
            }
            let hi = rolling_max(highs, lookback);
            let lo = rolling_min(lows, lookback);
            let (hh, ll) = (hi[last], lo[last]);
            if !hh.is_finite() || !ll.is_finite() || hh <= ll {
                continue;
            }

            let widths = normalized_widths(&hi, &lo, &features.atr);
            let width_rank = percentile_rank_at(&widths, self.distribution_bars, last);
            if width_rank.is_nan() {
                continue;
            }
            let position = (close[last] - ll) / (hh - ll);
            let base_low = close[last + 1 - lookback..]
                .iter()
                .copied()
                .fold(f64::INFINITY, f64::min);

            if width_rank < cfg.max_width_rank
                && position > cfg.min_position
                && base_low > support
            {
                if best.map_or(true, |b| width_rank < b.width_rank) {
                    best = Some(ContractionBase {
                        lookback,
                        width_rank,
                    });
                }
            }
        }

        best
    }

    pub fn breakout_flag(
        &self,
        features: &SymbolFeatures<'_>,
        highs: &[f64],
        lows: &[f64],
    ) -> bool {
        let cfg = self.breakout;
        let n = features.len();
        if n == 0 {
            return false;
        }
        let last = n - 1;
        let close = &features.close;

        let prior_high = shift(&rolling_max(highs, cfg.high_lookback), 1);
        let start = n.saturating_sub(cfg.recent_bars);
        let broke_out = (start..n).any(|i| close[i] > prior_high[i]);
        if !broke_out {
            return false;
        }

        let hi = rolling_max(highs, cfg.flag_lookback);
        let lo = rolling_min(lows, cfg.flag_lookback);
        let widths = normalized_widths(&hi, &lo, &features.atr);
        let flag_rank = percentile_rank_at(&widths, self.distribution_bars, last);
        let support = ema_of_series(close, cfg.support_ema_span)[last];

        flag_rank < cfg.max_flag_width_rank && close[last] > support
    }
}

/// `(hi - lo) / atr`, elementwise.
fn normalized_widths(hi: &[f64], lo: &[f64], atr: &[f64]) -> Vec<f64> {
    hi.iter()
        .zip(lo)
        .zip(atr)
        .map(|((h, l), a)| (h - l) / a)
        .collect()
}
