use argminmax::ArgMinMax;
use statrs::statistics::Statistics;

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Arithmetic mean, 0.0 for an empty slice.
pub fn mean_or_zero(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().mean()
}

/// Largest value. Caller guarantees a non-empty slice.
pub fn get_max(vec: &[f64]) -> f64 {
    let max_index: usize = vec.argmax();
    vec[max_index]
}

/// Smallest value. Caller guarantees a non-empty slice.
pub fn get_min(vec: &[f64]) -> f64 {
    let min_index: usize = vec.argmin();
    vec[min_index]
}

/// Ratio guarded against a zero (or non-finite) denominator.
pub fn safe_ratio(numerator: f64, denominator: f64, fallback: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        fallback
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_matches_two_and_one_decimal_reporting() {
        assert_eq!(round_to(0.5625, 2), 0.56);
        assert_eq!(round_to(0.625, 2), 0.63);
        assert_eq!(round_to(14.25, 1), 14.3);
    }

    #[test]
    fn min_max_and_mean() {
        let values = [3.0, 9.5, -1.0, 4.0];
        assert_eq!(get_max(&values), 9.5);
        assert_eq!(get_min(&values), -1.0);
        assert!((mean_or_zero(&values) - 3.875).abs() < 1e-12);
        assert_eq!(mean_or_zero(&[]), 0.0);
    }

    #[test]
    fn ratio_guard() {
        assert_eq!(safe_ratio(5.0, 0.0, 1.0), 1.0);
        assert_eq!(safe_ratio(5.0, 2.0, 1.0), 2.5);
    }
}
