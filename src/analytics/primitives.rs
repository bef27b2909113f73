//! Stateless numeric primitives used by the statistics engine.
//!
//! Pure functions over slices. Empty input yields `f64::NAN` rather than a
//! panic; callers decide whether an empty series is an error.

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance (divide by N, not N-1).
pub fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }

    let n = values.len() as f64;
    let mean = mean(values);
    values
        .iter()
        .map(|&value| (value - mean).powi(2))
        .sum::<f64>()
        / n
}

/// Population standard deviation.
pub fn population_std_dev(values: &[f64]) -> f64 {
    population_variance(values).sqrt()
}

/// Median; the mean of the two middle values for even-length input.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NAN, f64::min)
}

pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NAN, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_returns_nan() {
        assert!(mean(&[]).is_nan());
        assert!(population_variance(&[]).is_nan());
        assert!(population_std_dev(&[]).is_nan());
        assert!(median(&[]).is_nan());
        assert!(min(&[]).is_nan());
        assert!(max(&[]).is_nan());
    }

    #[test]
    fn population_std_dev_divides_by_n() {
        let values = [0.0, 0.1, -0.1, 0.2];
        assert!((mean(&values) - 0.05).abs() < 1e-12);
        assert!((population_variance(&values) - 0.0125).abs() < 1e-12);
        assert!((population_std_dev(&values) - 0.111_803_398_874_989_5).abs() < 1e-12);
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[-1.0]), -1.0);
    }

    #[test]
    fn min_max_ignore_order() {
        let values = [0.3, -0.2, 0.1];
        assert_eq!(min(&values), -0.2);
        assert_eq!(max(&values), 0.3);
    }
}
