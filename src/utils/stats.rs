//! Small statistics helpers used by the averager.
//!
//! All functions accept empty and single-element input without panicking.

/// Arithmetic mean. Returns `0.0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation around a precomputed mean.
///
/// Uses the `n - 1` denominator; fewer than two values yield `0.0`.
pub fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let variance: f64 = values
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / (values.len() - 1) as f64;

    variance.sqrt()
}

/// Remove every value further than `2 * std_dev` from the mean.
///
/// The mean and threshold are computed once from the untouched input and the
/// removal is a single pass; surviving values keep their relative order.
/// Returns the number of removed values.
pub fn trim_outliers(values: &mut Vec<f64>) -> usize {
    let before = values.len();
    let mean = mean(values);
    let threshold = 2.0 * std_dev(values, mean);

    values.retain(|v| (v - mean).abs() <= threshold);
    before - values.len()
}

/// Mean of the values left after [`trim_outliers`], or `None` if nothing
/// survives (including the empty input).
pub fn trimmed_mean(mut values: Vec<f64>) -> Option<f64> {
    trim_outliers(&mut values);
    if values.is_empty() {
        None
    } else {
        Some(mean(&values))
    }
}

/// Get a seed from current time for randomization
pub fn time_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x12345678)
}
