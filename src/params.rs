use serde::{Deserialize, Serialize};

pub const MUTATE_GENOME_ADD_NODE: f64 = 0.05;
pub const MUTATE_GENOME_ADD_CONNECTION: f64 = 0.15;
pub const MUTATE_GENOME_WEIGHT_CHANGE: f64 = 0.8;

pub const COMPAT_EXCESS_GENES_FACTOR: f64 = 1.0;
pub const COMPAT_DISJOINT_GENES_FACTOR: f64 = 1.0;
pub const COMPAT_WEIGHT_FACTOR: f64 = 0.4;
pub const COMPAT_THRESHOLD: f64 = 2.0;

pub const CROSSOVER_DOMINANT_BIAS: f64 = 0.75;
pub const CROSSOVER_EQUAL_BIAS: f64 = 0.5;

pub const DEFAULT_ACTIVATION: &str = "sigmoid";
pub const DEFAULT_AGGREGATION: &str = "sum";

/// Tunable knobs of the evolutionary operators.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    pub add_node_rate: f64,
    pub add_connection_rate: f64,
    pub weight_mutation_rate: f64,
    /// C1, scales excess genes in the genomic distance.
    pub compat_excess_factor: f64,
    /// C2, scales disjoint genes in the genomic distance.
    pub compat_disjoint_factor: f64,
    /// C3, scales the mean weight difference of matching genes.
    pub compat_weight_factor: f64,
    pub compatibility_threshold: f64,
    /// Chance that a matching gene comes from the fitter parent.
    pub crossover_dominant_bias: f64,
    /// Same as above when both parents are equally fit.
    pub crossover_equal_bias: f64,
    pub activation: String,
    pub aggregation: String,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            add_node_rate: MUTATE_GENOME_ADD_NODE,
            add_connection_rate: MUTATE_GENOME_ADD_CONNECTION,
            weight_mutation_rate: MUTATE_GENOME_WEIGHT_CHANGE,
            compat_excess_factor: COMPAT_EXCESS_GENES_FACTOR,
            compat_disjoint_factor: COMPAT_DISJOINT_GENES_FACTOR,
            compat_weight_factor: COMPAT_WEIGHT_FACTOR,
            compatibility_threshold: COMPAT_THRESHOLD,
            crossover_dominant_bias: CROSSOVER_DOMINANT_BIAS,
            crossover_equal_bias: CROSSOVER_EQUAL_BIAS,
            activation: DEFAULT_ACTIVATION.to_string(),
            aggregation: DEFAULT_AGGREGATION.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub num_inputs: usize,
    pub num_outputs: usize,
    pub population_size: usize,
    /// Seed for the run's generator; `None` draws one from entropy.
    pub seed: Option<u64>,
    pub parameters: Parameters,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            num_inputs: 2,
            num_outputs: 1,
            population_size: 150,
            seed: None,
            parameters: Parameters::default(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_inputs == 0 || self.num_outputs == 0 {
            return Err(ConfigError::InvalidShape);
        }
        if self.population_size < 2 {
            return Err(ConfigError::PopulationTooSmall);
        }

        let p = &self.parameters;
        let rates = [
            ("add_node_rate", p.add_node_rate),
            ("add_connection_rate", p.add_connection_rate),
            ("weight_mutation_rate", p.weight_mutation_rate),
            ("crossover_dominant_bias", p.crossover_dominant_bias),
            ("crossover_equal_bias", p.crossover_equal_bias),
        ];
        for (name, value) in rates {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RateOutOfRange { name, value });
            }
        }

        if !(p.compatibility_threshold > 0.0) {
            return Err(ConfigError::InvalidThreshold(p.compatibility_threshold));
        }
        Ok(())
    }
}

/// Settings validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Input and output counts must be non-zero")]
    InvalidShape,
    #[error("Population size must be at least 2")]
    PopulationTooSmall,
    #[error("Rate {name} must lie in [0, 1], got {value}")]
    RateOutOfRange { name: &'static str, value: f64 },
    #[error("Compatibility threshold must be positive, got {0}")]
    InvalidThreshold(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"num_inputs": 3, "parameters": {"add_node_rate": 0.2}}"#)
                .unwrap();
        assert_eq!(settings.num_inputs, 3);
        assert_eq!(settings.num_outputs, 1);
        assert_eq!(settings.parameters.add_node_rate, 0.2);
        assert_eq!(settings.parameters.compatibility_threshold, COMPAT_THRESHOLD);
        assert_eq!(settings.parameters.activation, "sigmoid");
    }

    #[test]
    fn test_rejects_bad_rate() {
        let mut settings = Settings::default();
        settings.parameters.weight_mutation_rate = 1.5;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::RateOutOfRange {
                name: "weight_mutation_rate",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_tiny_population() {
        let settings = Settings {
            population_size: 1,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::PopulationTooSmall)
        ));
    }
}
