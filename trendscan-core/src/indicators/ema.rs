//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (span + 1).
//! Seed: EMA at the first valid value equals that value (no SMA warmup).

/// EMA of an arbitrary series.
///
/// Leading NaN values stay NaN until the first valid value seeds the average.
/// A NaN after the seed holds the previous average and does not update it.
pub fn ema_of_series(values: &[f64], span: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    if span == 0 {
        return result;
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut prev: Option<f64> = None;

    for (out, &v) in result.iter_mut().zip(values) {
        prev = match (prev, v.is_nan()) {
            (None, true) => None,
            (None, false) => Some(v),
            (Some(p), true) => Some(p),
            (Some(p), false) => Some(alpha * v + (1.0 - alpha) * p),
        };
        if let Some(p) = prev {
            *out = p;
        }
    }

    result
}
