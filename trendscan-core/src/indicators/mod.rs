//! Indicator library.
//!
//! Stateless numeric primitives. Every function takes read-only input and
//! returns a new series aligned one-to-one with it; warmup positions and
//! windows touching missing data are `f64::NAN`.
//!
//! Bar-based indicators (ATR) implement the `Indicator` trait.
//! Series-based helpers (`ema_of_series`, `rolling_slope`, percentile ranks,
//! rolling extremes) operate on plain `&[f64]` so they can be applied to
//! derived columns such as the relative-strength ratio or range widths.

pub mod atr;
pub mod ema;
pub mod percentile;
pub mod rolling;
pub mod slope;

pub use atr::{rolling_mean, true_range, Atr};
pub use ema::ema_of_series;
pub use percentile::{percentile_rank_at, quantile, rolling_percentile_rank, trailing_median};
pub use rolling::{diff, rolling_max, rolling_min, shift};
pub use slope::rolling_slope;

use crate::domain::Bar;

/// Trait for bar-based indicators.
///
/// Indicators take a full bar series and produce a numeric output series of
/// the same length. Warmup positions are `f64::NAN`.
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_50", "atr_20").
    fn name(&self) -> &str;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Create synthetic hourly bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: base + chrono::Duration::hours(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
