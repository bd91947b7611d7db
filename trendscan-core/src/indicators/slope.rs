//! Rolling linear-regression slope.
//!
//! For each trailing window, fit value = a + b * x by ordinary least squares
//! with x = 0..window-1 and report b. A window with any NaN yields NaN.
//! Lookback: window - 1.

pub fn rolling_slope(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if window < 2 || n < window {
        return result;
    }

    let w = window as f64;
    let x_mean = (w - 1.0) / 2.0;
    let sxx: f64 = (0..window).map(|x| (x as f64 - x_mean).powi(2)).sum();

    for i in (window - 1)..n {
        let ys = &values[(i + 1 - window)..=i];
        if ys.iter().any(|y| y.is_nan()) {
            continue;
        }
        let y_mean = ys.iter().sum::<f64>() / w;
        let sxy: f64 = ys
            .iter()
            .enumerate()
            .map(|(x, y)| (x as f64 - x_mean) * (y - y_mean))
            .sum();
        result[i] = sxy / sxx;
    }

    result
}
