use crate::params::{DEFAULT_ACTIVATION, DEFAULT_AGGREGATION};

pub type ActivationFunction = fn(f64) -> f64;
pub type AggregationFunction = fn(&[f64]) -> f64;

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn tanh(x: f64) -> f64 {
    x.tanh()
}

fn identity(x: f64) -> f64 {
    x
}

fn relu(x: f64) -> f64 {
    x.max(0.0)
}

fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

fn product(values: &[f64]) -> f64 {
    values.iter().product()
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    sum(values) / values.len() as f64
}

/// Unknown names log a warning and fall back to sigmoid.
pub fn get_activation(name: &str) -> ActivationFunction {
    match name {
        "sigmoid" => sigmoid,
        "tanh" => tanh,
        "relu" => relu,
        "identity" => identity,
        _ => {
            log::warn!(
                "no activation function named {:?}, using {}",
                name,
                DEFAULT_ACTIVATION
            );
            sigmoid
        }
    }
}

/// Unknown names fall back to sum. `max` and `min` of an empty slice are -inf
/// and +inf.
pub fn get_aggregation(name: &str) -> AggregationFunction {
    match name {
        "sum" => sum,
        "product" => product,
        "max" => max,
        "min" => min,
        "mean" => mean,
        _ => {
            log::warn!(
                "no aggregation function named {:?}, using {}",
                name,
                DEFAULT_AGGREGATION
            );
            sum
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(10.0) > 0.9999);
        assert!(sigmoid(-10.0) < 0.0001);
    }

    #[test]
    fn test_lookup() {
        assert_eq!(get_activation("relu")(-2.0), 0.0);
        assert_eq!(get_activation("tanh")(0.0), 0.0);
        assert_eq!(get_aggregation("product")(&[2.0, 3.0]), 6.0);
        assert_eq!(get_aggregation("mean")(&[2.0, 4.0]), 3.0);
        assert_eq!(get_aggregation("max")(&[2.0, 4.0, -1.0]), 4.0);
    }

    #[test]
    fn test_unknown_names_fall_back() {
        assert_eq!(get_activation("softsign")(0.0), 0.5);
        assert_eq!(get_aggregation("median")(&[1.0, 2.0]), 3.0);
        assert_eq!(get_aggregation("sum")(&[]), 0.0);
    }
}
