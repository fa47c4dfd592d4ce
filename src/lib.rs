//! NEAT - NeuroEvolution of Augmenting Topologies.
//!
//! Genomes grow from a minimal fully connected input/output topology by adding
//! nodes and connections. A run-wide [`InnovationRegistry`] gives identical
//! structural mutations identical keys, so genomes of different shapes can be
//! aligned gene by gene for crossover and compatibility distance.
//!
//! # Example
//!
//! ```rust,no_run
//! use neatflow::{Population, Settings};
//!
//! let settings = Settings { seed: Some(7), ..Default::default() };
//! let mut population = Population::new(&settings)?;
//!
//! for _ in 0..100 {
//!     let networks: Vec<_> = population
//!         .members
//!         .iter()
//!         .map(|genome| population.get_phenotype(genome))
//!         .collect();
//!     for (genome, network) in population.members.iter_mut().zip(networks) {
//!         let output = network.activate(&[1.0, 0.0])?;
//!         genome.fitness = output[0];
//!     }
//!     population.evolve()?;
//! }
//! # Ok::<(), neatflow::NeatError>(())
//! ```

pub mod activation;
pub mod counter;
pub mod error;
pub mod gene;
pub mod genome;
pub mod graph;
pub mod innovation;
pub mod network;
pub mod params;
pub mod population;
pub mod reproduction;
pub mod roulette;
pub mod specie;

pub use error::NeatError;
pub use genome::Genome;
pub use innovation::InnovationRegistry;
pub use network::FeedForwardNetwork;
pub use params::{Parameters, Settings};
pub use population::Population;
