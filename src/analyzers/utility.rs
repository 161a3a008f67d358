/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Rounds to one decimal place, the precision of all published averages.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Coerces a raw measurement value. Missing or non-numeric values yield `None`.
pub fn parse_value(valore: Option<&str>) -> Option<f64> {
    valore?.trim().parse().ok()
}

/// Extracts the date-granular key (first ten characters) of a raw timestamp.
pub fn date_key(timestamp: &str) -> Option<&str> {
    if timestamp.is_empty() {
        return None;
    }
    Some(timestamp.get(..10).unwrap_or(timestamp))
}
