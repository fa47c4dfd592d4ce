use std::collections::BTreeMap;

use crate::counter::Counter;
use crate::error::NeatError;
use crate::gene::Identifiable;
use crate::genome::Genome;
use crate::params::Parameters;

#[derive(Debug, Clone)]
pub struct Specie {
    pub key: u32,
    /// Founding member; new genomes are compared against it.
    pub rep: Genome,
    // genome key -> genome, the rep included
    pub members: BTreeMap<u32, Genome>,
}

impl Specie {
    pub fn from_rep(key: u32, rep: Genome) -> Self {
        let mut members = BTreeMap::new();
        members.insert(rep.key, rep.clone());
        Specie { key, rep, members }
    }

    pub fn include_genome(&mut self, genome: Genome) -> Result<(), NeatError> {
        if self.members.contains_key(&genome.key) {
            return Err(NeatError::DuplicateMember {
                species: self.key,
                genome: genome.key,
            });
        }
        self.members.insert(genome.key, genome);
        Ok(())
    }

    pub fn fitness_sum(&self) -> f64 {
        self.members.values().map(|m| m.fitness).sum()
    }

    /// Share of the next generation this specie earns, as a real number.
    ///
    /// Fails if either the population or this specie has zero summed fitness.
    pub fn compute_next_generation_total_members(
        &self,
        total_fitness: f64,
        population_size: usize,
    ) -> Result<f64, NeatError> {
        if total_fitness == 0.0 {
            return Err(NeatError::ZeroTotalFitness);
        }
        let fitness_sum = self.fitness_sum();
        if fitness_sum == 0.0 {
            return Err(NeatError::ZeroSpeciesFitness { species: self.key });
        }
        Ok(fitness_sum / total_fitness * population_size as f64)
    }

    /// genome key -> fitness / specie fitness, ready for a roulette wheel
    pub fn calculate_probabilities(&self) -> Result<BTreeMap<u32, f64>, NeatError> {
        let sum = self.fitness_sum();
        if sum == 0.0 {
            return Err(NeatError::ZeroSpeciesFitness { species: self.key });
        }
        Ok(self
            .members
            .iter()
            .map(|(key, member)| (*key, member.fitness / sum))
            .collect())
    }
}

impl Identifiable for Specie {
    fn key(&self) -> u32 {
        self.key
    }
}

/// All species of the current generation, kept in creation order.
#[derive(Debug, Default)]
pub struct SpeciesSet {
    species: Vec<Specie>,
    next_key: Counter,
}

impl SpeciesSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places every genome in the first specie whose rep is closer than the
    /// compatibility threshold, founding a new specie when none is.
    pub fn speciate(&mut self, population: &[Genome], params: &Parameters) -> Result<(), NeatError> {
        'genome_loop: for genome in population {
            for specie in self.species.iter_mut() {
                if genome.distance(&specie.rep, params) < params.compatibility_threshold {
                    specie.include_genome(genome.clone())?;
                    continue 'genome_loop;
                }
            }

            // no matching specie was found, this genome founds a new one
            let key = self.next_key.next_key();
            self.species.push(Specie::from_rep(key, genome.clone()));
        }

        log::debug!(
            "speciated {} genomes into {} species",
            population.len(),
            self.species.len()
        );
        Ok(())
    }

    /// Drops every specie. Keys keep counting up.
    pub fn clear(&mut self) {
        self.species.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Specie> {
        self.species.iter()
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn get(&self, key: u32) -> Option<&Specie> {
        self.species.iter().find(|s| s.key == key)
    }
}
