//! Percentile ranks, quantiles and medians.
//!
//! Percentile rank follows the "at or below" convention: the fraction of the
//! reference values that are less than or equal to the current value, so a
//! value always counts itself and ranks lie in (0, 1].

/// Percentile rank of `values[index]` within the trailing `window` values
/// ending at `index` (inclusive).
///
/// When fewer than `window` values precede `index`, the available prefix is
/// used. NaN values in the window are ignored. Returns NaN when the current
/// value is not finite or `index` is out of range.
pub fn percentile_rank_at(values: &[f64], window: usize, index: usize) -> f64 {
    if window == 0 || index >= values.len() {
        return f64::NAN;
    }
    let current = values[index];
    if !current.is_finite() {
        return f64::NAN;
    }

    let start = (index + 1).saturating_sub(window);
    let mut at_or_below = 0usize;
    let mut count = 0usize;
    for &v in &values[start..=index] {
        if v.is_nan() {
            continue;
        }
        count += 1;
        if v <= current {
            at_or_below += 1;
        }
    }

    at_or_below as f64 / count as f64
}

/// Rolling percentile rank over a full trailing window.
///
/// Positions before the first complete window are NaN.
pub fn rolling_percentile_rank(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || n < window {
        return result;
    }
    for (i, out) in result.iter_mut().enumerate().skip(window - 1) {
        *out = percentile_rank_at(values, window, i);
    }
    result
}

/// Linear-interpolated quantile over the non-NaN values (`q` in [0, 1]).
///
/// Returns NaN for an empty input.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return f64::NAN;
    }
    sorted.sort_by(f64::total_cmp);

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Median of the last `window` values.
///
/// NaN when fewer than `window` values exist or any of them is NaN.
pub fn trailing_median(values: &[f64], window: usize) -> f64 {
    if window == 0 || values.len() < window {
        return f64::NAN;
    }
    let tail = &values[values.len() - window..];
    if tail.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    quantile(tail, 0.5)
}
