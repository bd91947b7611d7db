//! Timeframe aggregation.
//!
//! Hourly bars are grouped into clock-aligned buckets of `hours` length
//! (bucket boundaries at multiples of `hours` since the Unix epoch, so 4h
//! buckets start at 00:00, 04:00, 08:00, ... UTC). Within a bucket:
//! open = first, high = max, low = min, close = last, volume = sum.
//! Void bars are ignored; a bucket with no valid bar is dropped.

use chrono::{DateTime, Utc};

use crate::domain::Bar;

/// Aggregate `bars` into `hours`-long clock-aligned bars.
///
/// The output bar's timestamp is the bucket start. `hours == 0` yields an
/// empty vector.
pub fn resample_hours(bars: &[Bar], hours: u32) -> Vec<Bar> {
    if hours == 0 {
        return Vec::new();
    }
    let span = i64::from(hours) * 3600;

    let mut out: Vec<Bar> = Vec::with_capacity(bars.len() / hours as usize + 1);
    let mut current: Option<(i64, Bar)> = None;

    for bar in bars.iter().filter(|b| !b.is_void()) {
        let key = bar.timestamp.timestamp().div_euclid(span);
        match current.as_mut() {
            Some((k, agg)) if *k == key => {
                agg.high = agg.high.max(bar.high);
                agg.low = agg.low.min(bar.low);
                agg.close = bar.close;
                agg.volume += bar.volume;
            }
            _ => {
                if let Some((_, done)) = current.take() {
                    out.push(done);
                }
                let start = DateTime::<Utc>::from_timestamp(key * span, 0).unwrap_or(bar.timestamp);
                current = Some((
                    key,
                    Bar {
                        timestamp: start,
                        ..bar.clone()
                    },
                ));
            }
        }
    }

    if let Some((_, done)) = current {
        out.push(done);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn hourly(start_hour: i64, data: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        data.iter()
            .enumerate()
            .map(|(i, &(open, high, low, close))| Bar {
                timestamp: base + Duration::hours(start_hour + i as i64),
                open,
                high,
                low,
                close,
                volume: 10.0,
            })
            .collect()
    }

    #[test]
    fn four_hour_aggregation() {
        let bars = hourly(
            0,
            &[
                (10.0, 12.0, 9.0, 11.0),
                (11.0, 15.0, 10.0, 14.0),
                (14.0, 14.5, 8.0, 9.0),
                (9.0, 10.0, 8.5, 9.5),
                (9.5, 11.0, 9.0, 10.5),
            ],
        );
        let out = resample_hours(&bars, 4);
        assert_eq!(out.len(), 2);

        let first = &out[0];
        assert_eq!(first.timestamp, bars[0].timestamp);
        assert_eq!(first.open, 10.0);
        assert_eq!(first.high, 15.0);
        assert_eq!(first.low, 8.0);
        assert_eq!(first.close, 9.5);
        assert_eq!(first.volume, 40.0);

        assert_eq!(out[1].timestamp, bars[4].timestamp);
        assert_eq!(out[1].close, 10.5);
        assert_eq!(out[1].volume, 10.0);
    }

    #[test]
    fn buckets_are_clock_aligned() {
        // starts at 02:00 → first bucket [00:00, 04:00) holds only two bars
        let bars = hourly(2, &[(1.0, 1.0, 1.0, 1.0); 6]);
        let out = resample_hours(&bars, 4);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].volume, 20.0);
        assert_eq!(out[1].volume, 40.0);
        assert_eq!(out[0].timestamp, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(out[1].timestamp, Utc.with_ymd_and_hms(2024, 1, 1, 4, 0, 0).unwrap());
    }

    #[test]
    fn empty_buckets_are_dropped() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut bars = hourly(0, &[(1.0, 2.0, 0.5, 1.5); 2]);
        // gap of a whole day
        bars.push(Bar {
            timestamp: base + Duration::hours(30),
            open: 2.0,
            high: 3.0,
            low: 1.0,
            close: 2.5,
            volume: 5.0,
        });
        let out = resample_hours(&bars, 4);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].timestamp, base + Duration::hours(28));
    }

    #[test]
    fn void_bars_are_skipped() {
        let mut bars = hourly(0, &[(1.0, 2.0, 0.5, 1.5); 8]);
        for b in &mut bars[4..] {
            b.close = f64::NAN;
        }
        bars[1].high = f64::NAN;
        let out = resample_hours(&bars, 4);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].volume, 30.0);
    }

    #[test]
    fn zero_hours_is_empty() {
        let bars = hourly(0, &[(1.0, 1.0, 1.0, 1.0)]);
        assert!(resample_hours(&bars, 0).is_empty());
    }
}
