//! Benchmark alignment.
//!
//! Project the benchmark's closes onto a target symbol's timeline. Each target
//! timestamp receives the close of the latest benchmark bar at or before it
//! (as-of join with forward fill). Target timestamps earlier than the first
//! benchmark bar get NaN.

use crate::domain::Bar;

/// Benchmark closes aligned one-to-one with `target`.
///
/// Both inputs must be sorted by timestamp (the `Panel` guarantees this).
/// A void benchmark bar does not overwrite the last valid close.
pub fn align_benchmark(target: &[Bar], benchmark: &[Bar]) -> Vec<f64> {
    let mut aligned = Vec::with_capacity(target.len());
    let mut cursor = 0usize;
    let mut last_close = f64::NAN;

    for bar in target {
        while cursor < benchmark.len() && benchmark[cursor].timestamp <= bar.timestamp {
            let close = benchmark[cursor].close;
            if !close.is_nan() {
                last_close = close;
            }
            cursor += 1;
        }
        aligned.push(last_close);
    }

    aligned
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn bar(hour: i64, close: f64) -> Bar {
        Bar {
            timestamp: base() + Duration::hours(hour),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn identical_timelines_copy_closes() {
        let target: Vec<Bar> = (0..4).map(|h| bar(h, 10.0)).collect();
        let bench: Vec<Bar> = (0..4).map(|h| bar(h, 100.0 + h as f64)).collect();
        assert_eq!(align_benchmark(&target, &bench), vec![100.0, 101.0, 102.0, 103.0]);
    }

    #[test]
    fn benchmark_gap_is_forward_filled() {
        let target: Vec<Bar> = (0..4).map(|h| bar(h, 10.0)).collect();
        // benchmark missing hour 2
        let bench = vec![bar(0, 100.0), bar(1, 101.0), bar(3, 103.0)];
        assert_eq!(align_benchmark(&target, &bench), vec![100.0, 101.0, 101.0, 103.0]);
    }

    #[test]
    fn target_before_benchmark_start_is_nan() {
        let target: Vec<Bar> = (0..3).map(|h| bar(h, 10.0)).collect();
        let bench = vec![bar(1, 50.0), bar(2, 51.0)];
        let aligned = align_benchmark(&target, &bench);
        assert!(aligned[0].is_nan());
        assert_eq!(&aligned[1..], &[50.0, 51.0]);
    }

    #[test]
    fn extra_benchmark_bars_are_skipped() {
        let target = vec![bar(0, 10.0), bar(5, 10.0)];
        let bench: Vec<Bar> = (0..8).map(|h| bar(h, 100.0 + h as f64)).collect();
        assert_eq!(align_benchmark(&target, &bench), vec![100.0, 105.0]);
    }

    #[test]
    fn void_benchmark_bar_keeps_previous_close() {
        let target: Vec<Bar> = (0..3).map(|h| bar(h, 10.0)).collect();
        let mut bench: Vec<Bar> = (0..3).map(|h| bar(h, 100.0 + h as f64)).collect();
        bench[1].close = f64::NAN;
        assert_eq!(align_benchmark(&target, &bench), vec![100.0, 100.0, 102.0]);
    }
}
