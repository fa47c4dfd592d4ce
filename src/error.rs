use crate::params::ConfigError;

/// Broken caller contracts. Rejected structural mutations are not errors,
/// they are reported as `false` by the mutation operators.
#[derive(Debug, thiserror::Error)]
pub enum NeatError {
    #[error("An add-node innovation between nodes {from}, {to} already exists")]
    DuplicateAddNodeInnovation { from: u32, to: u32 },
    #[error("An add-connection innovation between nodes {from}, {to} already exists")]
    DuplicateAddConnectionInnovation { from: u32, to: u32 },
    #[error("Total population fitness is zero")]
    ZeroTotalFitness,
    #[error("Species {species} has zero summed fitness")]
    ZeroSpeciesFitness { species: u32 },
    #[error("Expected {expected} inputs, got {actual}")]
    InputArity { expected: usize, actual: usize },
    #[error("Probabilities sum to {total}, not 1")]
    UnnormalizedProbabilities { total: f64 },
    #[error("Cannot build a roulette without items")]
    EmptyRoulette,
    #[error("Genome {genome} is already a member of species {species}")]
    DuplicateMember { species: u32, genome: u32 },
    #[error("{pending} nodes could not be evaluated")]
    StalledEvaluation { pending: usize },
    #[error("Invalid settings: {0}")]
    Config(#[from] ConfigError),
}
