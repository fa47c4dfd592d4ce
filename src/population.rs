use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::counter::Counter;
use crate::error::NeatError;
use crate::genome::Genome;
use crate::innovation::InnovationRegistry;
use crate::network::FeedForwardNetwork;
use crate::params::Settings;
use crate::reproduction::reproduction;
use crate::specie::SpeciesSet;

/// Drives generations: speciation, reproduction, mutation and replacement.
///
/// Fitness is assigned from outside by writing `Genome::fitness` on each of
/// `members` before calling [`Population::evolve`].
pub struct Population {
    settings: Settings,
    pub members: Vec<Genome>,
    species: SpeciesSet,
    registry: InnovationRegistry,
    genome_keys: Counter,
    rng: StdRng,
    generation: usize,
}

impl Population {
    pub fn new(settings: &Settings) -> Result<Population, NeatError> {
        settings.validate()?;

        let mut rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut genome_keys = Counter::default();
        let members = (0..settings.population_size)
            .map(|_| {
                Genome::new(
                    genome_keys.next_key(),
                    settings.num_inputs,
                    settings.num_outputs,
                    &mut rng,
                )
            })
            .collect();

        Ok(Population {
            settings: settings.clone(),
            members,
            species: SpeciesSet::new(),
            registry: InnovationRegistry::for_shape(settings.num_inputs, settings.num_outputs),
            genome_keys,
            rng,
            generation: 0,
        })
    }

    /// Replaces the members with the next generation.
    ///
    /// Fails with `ZeroTotalFitness` if no member was given any fitness.
    pub fn evolve(&mut self) -> Result<(), NeatError> {
        let params = &self.settings.parameters;

        self.species.clear();
        self.species.speciate(&self.members, params)?;

        let total_fitness: f64 = self.members.iter().map(|m| m.fitness).sum();
        let best_fitness = self
            .members
            .iter()
            .map(|m| m.fitness)
            .fold(f64::NEG_INFINITY, f64::max);

        let mut offspring = reproduction(
            &self.species,
            total_fitness,
            self.settings.population_size,
            &mut self.genome_keys,
            params,
            &mut self.rng,
        )?;

        for child in offspring.iter_mut() {
            child.mutate(&mut self.registry, params, &mut self.rng)?;
        }

        log::info!(
            "generation = {}, nr_species = {}, pop_size = {}, best_fitness = {}",
            self.generation,
            self.species.len(),
            offspring.len(),
            best_fitness
        );

        self.members = offspring;
        self.generation += 1;
        Ok(())
    }

    pub fn get_phenotype(&self, genome: &Genome) -> FeedForwardNetwork {
        FeedForwardNetwork::create(genome)
            .with_activation(&self.settings.parameters.activation)
            .with_aggregation(&self.settings.parameters.aggregation)
    }

    pub fn get_winner(&self) -> Option<&Genome> {
        self.members
            .iter()
            .max_by(|lhs, rhs| lhs.fitness.total_cmp(&rhs.fitness))
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn species(&self) -> &SpeciesSet {
        &self.species
    }

    pub fn registry(&self) -> &InnovationRegistry {
        &self.registry
    }
}
