//! Dual-timeframe trend alignment.
//!
//! Hourly: close > EMA(fast) > EMA(slow).
//! Aggregated: close > EMA(htf_fast) > EMA(htf_slow), and EMA(htf_slope) above
//! its value `htf_slope_lag` aggregated bars earlier.

use super::config::TrendGateConfig;
use crate::data::resample_hours;
use crate::domain::Bar;
use crate::indicators::ema_of_series;

/// Outcome of the trend gate for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendVerdict {
    Aligned,
    HourlyMisaligned,
    InsufficientResampled { buckets: usize },
    ResampledMisaligned,
}

impl TrendVerdict {
    pub fn passed(self) -> bool {
        self == Self::Aligned
    }
}

pub struct TrendGate<'c> {
    config: &'c TrendGateConfig,
}

impl<'c> TrendGate<'c> {
    pub fn new(config: &'c TrendGateConfig) -> Self {
        Self { config }
    }

    pub fn evaluate(&self, bars: &[Bar], close: &[f64]) -> TrendVerdict {
        if !self.hourly_aligned(close) {
            return TrendVerdict::HourlyMisaligned;
        }

        let resampled = resample_hours(bars, self.config.resample_hours);
        if resampled.len() < self.config.min_resampled_bars {
            return TrendVerdict::InsufficientResampled {
                buckets: resampled.len(),
            };
        }

        let htf_close: Vec<f64> = resampled.iter().map(|b| b.close).collect();
        if self.resampled_aligned(&htf_close) {
            TrendVerdict::Aligned
        } else {
            TrendVerdict::ResampledMisaligned
        }
    }

    pub fn hourly_aligned(&self, close: &[f64]) -> bool {
        let fast = ema_of_series(close, self.config.fast_span);
        let slow = ema_of_series(close, self.config.slow_span);
        match (close.last(), fast.last(), slow.last()) {
            (Some(&c), Some(&f), Some(&s)) => c > f && f > s,
            _ => false,
        }
    }

    fn resampled_aligned(&self, close: &[f64]) -> bool {
        let n = close.len();
        let lag = self.config.htf_slope_lag;
        if n <= lag {
            return false;
        }
        let fast = ema_of_series(close, self.config.htf_fast_span);
        let slow = ema_of_series(close, self.config.htf_slow_span);
        let slope_ema = ema_of_series(close, self.config.htf_slope_span);

        let last = n - 1;
        let rising = slope_ema[last] > slope_ema[last - lag];
        close[last] > fast[last] && fast[last] > slow[last] && rising
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    fn closes(n: usize, rate: f64) -> Vec<f64> {
        (0..n).map(|i| 100.0 * (rate * i as f64).exp()).collect()
    }

    #[test]
    fn steady_uptrend_is_aligned() {
        let config = TrendGateConfig::default();
        let c = closes(400, 0.001);
        let bars = make_bars(&c);
        assert_eq!(TrendGate::new(&config).evaluate(&bars, &c), TrendVerdict::Aligned);
    }

    #[test]
    fn downtrend_fails_hourly() {
        let config = TrendGateConfig::default();
        let c = closes(400, -0.001);
        let bars = make_bars(&c);
        assert_eq!(
            TrendGate::new(&config).evaluate(&bars, &c),
            TrendVerdict::HourlyMisaligned
        );
    }

    #[test]
    fn too_few_aggregated_bars() {
        let config = TrendGateConfig::default();
        // 200 hourly bars from midnight → 50 four-hour buckets
        let c = closes(200, 0.001);
        let bars = make_bars(&c);
        assert_eq!(
            TrendGate::new(&config).evaluate(&bars, &c),
            TrendVerdict::InsufficientResampled { buckets: 50 }
        );
    }

    #[test]
    fn hourly_pop_after_long_decline_fails_aggregated() {
        let config = TrendGateConfig::default();
        // long decline, then an 8-hour rally the 4h EMAs have not caught up with
        let mut c = closes(600, -0.001);
        let last = *c.last().unwrap();
        c.extend((1..=8).map(|i| last * (0.01 * i as f64).exp()));
        let bars = make_bars(&c);
        // hourly EMA200 still above EMA50 after the decline
        assert!(!TrendGate::new(&config).hourly_aligned(&c));

        let mut cfg = config.clone();
        cfg.fast_span = 2;
        cfg.slow_span = 3;
        let verdict = TrendGate::new(&cfg).evaluate(&bars, &c);
        assert_eq!(verdict, TrendVerdict::ResampledMisaligned);
    }

    #[test]
    fn empty_series_fails() {
        let config = TrendGateConfig::default();
        assert_eq!(
            TrendGate::new(&config).evaluate(&[], &[]),
            TrendVerdict::HourlyMisaligned
        );
    }
}
