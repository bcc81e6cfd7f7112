use chrono::{DateTime, Utc};

/// Arithmetic mean of day-count samples. Returns None for empty input:
/// "no data" must stay distinguishable from an average of zero.
pub fn mean(samples: &[i64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<i64>() as f64 / samples.len() as f64)
}

/// Whole days elapsed from `from` to `to`, truncating partial days.
pub fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_days()
}
