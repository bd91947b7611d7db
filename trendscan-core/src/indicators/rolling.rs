//! Rolling extremes and lagged arithmetic.
//!
//! `rolling_max` / `rolling_min` give the Donchian-style highest high and
//! lowest low over a trailing window, computed in O(n) with a monotonic deque.
//! Lookback: window - 1. Any NaN inside the window yields NaN.

use std::collections::VecDeque;

/// Highest value over the trailing `window` (inclusive of the current bar).
pub fn rolling_max(values: &[f64], window: usize) -> Vec<f64> {
    rolling_extreme(values, window, |kept, incoming| kept > incoming)
}

/// Lowest value over the trailing `window` (inclusive of the current bar).
pub fn rolling_min(values: &[f64], window: usize) -> Vec<f64> {
    rolling_extreme(values, window, |kept, incoming| kept < incoming)
}

/// `dominates(kept, incoming)` is true when `kept` must stay ahead of
/// `incoming` in the deque.
fn rolling_extreme(
    values: &[f64],
    window: usize,
    dominates: impl Fn(f64, f64) -> bool,
) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 {
        return result;
    }

    let mut deque: VecDeque<usize> = VecDeque::with_capacity(window);
    let mut last_nan: Option<usize> = None;

    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            last_nan = Some(i);
        } else {
            while let Some(&back) = deque.back() {
                if dominates(values[back], v) {
                    break;
                }
                deque.pop_back();
            }
            deque.push_back(i);
        }

        while let Some(&front) = deque.front() {
            if front + window <= i {
                deque.pop_front();
            } else {
                break;
            }
        }

        if i + 1 < window || last_nan.is_some_and(|j| j + window > i) {
            continue;
        }
        if let Some(&front) = deque.front() {
            result[i] = values[front];
        }
    }

    result
}

/// `values[t] - values[t - lag]`; NaN for the first `lag` positions.
///
/// Applied to log prices this is the `lag`-bar log-return.
pub fn diff(values: &[f64], lag: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    for i in lag..n {
        result[i] = values[i] - values[i - lag];
    }
    result
}

/// Series delayed by `lag` bars: `result[t] = values[t - lag]`.
pub fn shift(values: &[f64], lag: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    for i in lag..n {
        result[i] = values[i - lag];
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_max(values: &[f64], window: usize, i: usize) -> f64 {
        let w = &values[(i + 1 - window)..=i];
        if w.iter().any(|v| v.is_nan()) {
            return f64::NAN;
        }
        w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    #[test]
    fn rolling_max_matches_naive() {
        let values: Vec<f64> = (0..60).map(|i| ((i * 37) % 17) as f64 - (i as f64) * 0.1).collect();
        let fast = rolling_max(&values, 7);
        for i in 0..values.len() {
            if i < 6 {
                assert!(fast[i].is_nan());
            } else {
                assert_eq!(fast[i], naive_max(&values, 7, i));
            }
        }
    }

    #[test]
    fn rolling_min_basic() {
        let values = [5.0, 3.0, 4.0, 1.0, 2.0, 6.0];
        let result = rolling_min(&values, 3);
        assert!(result[1].is_nan());
        assert_eq!(&result[2..], &[3.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn rolling_extremes_propagate_nan_within_window() {
        let values = [1.0, 2.0, f64::NAN, 4.0, 5.0, 6.0];
        let result = rolling_max(&values, 2);
        assert_eq!(result[1], 2.0);
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert_eq!(result[4], 5.0);
        assert_eq!(result[5], 6.0);
    }

    #[test]
    fn rolling_max_window_one_is_identity() {
        let values = [3.0, 1.0, 2.0];
        assert_eq!(rolling_max(&values, 1), values.to_vec());
    }

    #[test]
    fn diff_and_shift() {
        let values = [1.0, 2.0, 4.0, 7.0];
        let d = diff(&values, 2);
        assert!(d[0].is_nan() && d[1].is_nan());
        assert_eq!(&d[2..], &[3.0, 5.0]);

        let s = shift(&values, 1);
        assert!(s[0].is_nan());
        assert_eq!(&s[1..], &[1.0, 2.0, 4.0]);
    }
}
