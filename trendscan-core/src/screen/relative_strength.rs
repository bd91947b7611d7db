//! Relative strength against the benchmark.
//!
//! Two passes. `score` measures each symbol on its own: relative log-returns
//! over three horizons combined into a weighted composite, plus a trend flag
//! from the close / benchmark ratio. `rank_batch` then places every composite
//! inside the distribution of the whole batch.

use serde::{Deserialize, Serialize};

use super::config::RelativeStrengthConfig;
use super::features::SymbolFeatures;
use crate::data::align_benchmark;
use crate::domain::Bar;
use crate::indicators::{ema_of_series, rolling_slope};

/// Unranked relative-strength measurement of one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct RelativeStrengthScore {
    pub symbol: String,
    pub score: f64,
    pub trend_confirmed: bool,
    pub short_return: f64,
    pub mid_return: f64,
    pub long_return: f64,
}

/// Relative strength of one symbol within its batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelativeStrengthRecord {
    pub symbol: String,
    pub score: f64,
    /// Percentile of `score` within the batch, 0–100.
    pub rank: f64,
    pub trend_confirmed: bool,
    pub short_return: f64,
    pub mid_return: f64,
    pub long_return: f64,
}

pub struct RelativeStrengthEngine<'c> {
    config: &'c RelativeStrengthConfig,
}

impl<'c> RelativeStrengthEngine<'c> {
    pub fn new(config: &'c RelativeStrengthConfig) -> Self {
        Self { config }
    }

    pub fn score(&self, features: &SymbolFeatures<'_>, benchmark: &[Bar]) -> RelativeStrengthScore {
        let c = self.config;
        let bench_close = align_benchmark(features.bars, benchmark);
        let bench_log: Vec<f64> = bench_close.iter().map(|v| v.ln()).collect();

        let relative = |horizon: usize| {
            let r = end_return(&features.log_close, horizon) - end_return(&bench_log, horizon);
            if r.is_nan() {
                0.0
            } else {
                r
            }
        };
        let short_return = relative(c.short_horizon);
        let mid_return = relative(c.mid_horizon);
        let long_return = relative(c.long_horizon);
        let score =
            c.long_weight * long_return + c.mid_weight * mid_return + c.short_weight * short_return;

        let ratio: Vec<f64> = features
            .close
            .iter()
            .zip(&bench_close)
            .map(|(s, b)| s / b)
            .collect();
        let ratio_ema = ema_of_series(&ratio, c.ratio_ema_span);
        let slope = rolling_slope(&ratio_ema, c.slope_window);

        let trend_confirmed = match (ratio.last(), ratio_ema.last(), slope.last()) {
            (Some(&r), Some(&e), Some(&s)) => r > e && s > 0.0,
            _ => false,
        };

        RelativeStrengthScore {
            symbol: features.symbol.to_string(),
            score,
            trend_confirmed,
            short_return,
            mid_return,
            long_return,
        }
    }

    /// Rank every score against the whole batch:
    /// `rank = 100 × |{scores ≤ this}| / N`.
    pub fn rank_batch(&self, scores: Vec<RelativeStrengthScore>) -> Vec<RelativeStrengthRecord> {
        let mut sorted: Vec<f64> = scores.iter().map(|s| s.score).collect();
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len() as f64;

        scores
            .into_iter()
            .map(|s| {
                let at_or_below = sorted.partition_point(|v| *v <= s.score);
                RelativeStrengthRecord {
                    rank: 100.0 * at_or_below as f64 / n,
                    symbol: s.symbol,
                    score: s.score,
                    trend_confirmed: s.trend_confirmed,
                    short_return: s.short_return,
                    mid_return: s.mid_return,
                    long_return: s.long_return,
                }
            })
            .collect()
    }

    /// Score then rank a batch of symbols.
    pub fn evaluate<'a, 'p: 'a>(
        &self,
        batch: impl IntoIterator<Item = &'a SymbolFeatures<'p>>,
        benchmark: &[Bar],
    ) -> Vec<RelativeStrengthRecord> {
        let scores = batch.into_iter().map(|f| self.score(f, benchmark)).collect();
        self.rank_batch(scores)
    }
}

/// Log-return over the last `horizon` bars of a log series.
fn end_return(log_series: &[f64], horizon: usize) -> f64 {
    let n = log_series.len();
    if horizon == 0 || n <= horizon {
        return f64::NAN;
    }
    log_series[n - 1] - log_series[n - 1 - horizon]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};
    use crate::screen::config::ScreenConfig;
    use crate::screen::features::PanelPreprocessor;

    fn growth(n: usize, rate: f64) -> Vec<f64> {
        (0..n).map(|i| 100.0 * (rate * i as f64).exp()).collect()
    }

    fn flat_benchmark(n: usize) -> Vec<Bar> {
        make_bars(&vec![100.0; n])
    }

    #[test]
    fn relative_returns_against_flat_benchmark() {
        let config = ScreenConfig::default();
        let bars = make_bars(&growth(400, 0.001));
        let pre = PanelPreprocessor::new(&config);
        let f = pre.features("UP", &bars);
        let engine = RelativeStrengthEngine::new(&config.relative_strength);
        let s = engine.score(&f, &flat_benchmark(400));

        assert_approx(s.short_return, 0.072, 1e-9);
        assert_approx(s.mid_return, 0.168, 1e-9);
        assert_approx(s.long_return, 0.336, 1e-9);
        assert_approx(s.score, 0.5 * 0.336 + 0.3 * 0.168 + 0.2 * 0.072, 1e-9);
        assert!(s.trend_confirmed);
    }

    #[test]
    fn declining_ratio_is_not_trend_confirmed() {
        let config = ScreenConfig::default();
        let bars = make_bars(&growth(400, -0.001));
        let f = PanelPreprocessor::new(&config).features("DOWN", &bars);
        let s = RelativeStrengthEngine::new(&config.relative_strength)
            .score(&f, &flat_benchmark(400));
        assert!(s.score < 0.0);
        assert!(!s.trend_confirmed);
    }

    #[test]
    fn short_history_horizon_defaults_to_zero() {
        let config = ScreenConfig::default();
        let bars = make_bars(&growth(200, 0.001));
        let f = PanelPreprocessor::new(&config).features("NEW", &bars);
        let s = RelativeStrengthEngine::new(&config.relative_strength)
            .score(&f, &flat_benchmark(200));
        assert_approx(s.short_return, 0.072, 1e-9);
        assert_approx(s.mid_return, 0.168, 1e-9);
        assert_eq!(s.long_return, 0.0);
    }

    #[test]
    fn benchmark_outperformance_is_relative() {
        let config = ScreenConfig::default();
        // symbol and benchmark grow at the same rate → zero relative strength
        let bars = make_bars(&growth(400, 0.002));
        let bench = make_bars(&growth(400, 0.002));
        let f = PanelPreprocessor::new(&config).features("SAME", &bars);
        let s = RelativeStrengthEngine::new(&config.relative_strength).score(&f, &bench);
        assert_approx(s.score, 0.0, 1e-9);
        assert!(!s.trend_confirmed);
    }

    fn unranked(symbol: &str, score: f64) -> RelativeStrengthScore {
        RelativeStrengthScore {
            symbol: symbol.into(),
            score,
            trend_confirmed: false,
            short_return: 0.0,
            mid_return: 0.0,
            long_return: 0.0,
        }
    }

    #[test]
    fn rank_counts_scores_at_or_below() {
        let config = ScreenConfig::default();
        let engine = RelativeStrengthEngine::new(&config.relative_strength);
        let ranked = engine.rank_batch(vec![
            unranked("A", 0.3),
            unranked("B", -0.1),
            unranked("C", 0.3),
            unranked("D", 0.1),
        ]);
        let ranks: Vec<f64> = ranked.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![100.0, 25.0, 100.0, 50.0]);
        assert_eq!(ranked[1].symbol, "B");
    }

    #[test]
    fn rank_of_single_symbol_is_100() {
        let config = ScreenConfig::default();
        let engine = RelativeStrengthEngine::new(&config.relative_strength);
        let ranked = engine.rank_batch(vec![unranked("ONLY", -3.0)]);
        assert_eq!(ranked[0].rank, 100.0);
        assert!(engine.rank_batch(Vec::new()).is_empty());
    }
}
