use rand::Rng;

use crate::counter::Counter;
use crate::error::NeatError;
use crate::gene::ConnectionGene;
use crate::genome::Genome;
use crate::params::Parameters;
use crate::roulette::Roulette;
use crate::specie::SpeciesSet;

/// Combines two parents into an offspring keyed `key`.
///
/// The fitter parent dominates (ties go to `genome_a`). With unequal fitness
/// the offspring takes the dominant parent's disjoint genes, its excess genes
/// only if it is also the more advanced parent, and each matching gene from it
/// with `crossover_dominant_bias`. With equal fitness it takes the disjoint
/// genes of both, the excess genes of the more advanced parent, and matching
/// genes from either side with `crossover_equal_bias`.
pub fn crossover<R: Rng>(
    genome_a: &Genome,
    genome_b: &Genome,
    key: u32,
    params: &Parameters,
    rng: &mut R,
) -> Genome {
    let (dominant, submissive) = if genome_a.fitness >= genome_b.fitness {
        (genome_a, genome_b)
    } else {
        (genome_b, genome_a)
    };
    let equal_fitnesses = genome_a.fitness == genome_b.fitness;
    let dominant_bias = if equal_fitnesses {
        params.crossover_equal_bias
    } else {
        params.crossover_dominant_bias
    };

    let mut genes: Vec<(&Genome, &ConnectionGene)> = Vec::new();

    for gene_key in dominant.find_matching_gene_keys(submissive) {
        let parent = if rng.gen_bool(dominant_bias) {
            dominant
        } else {
            submissive
        };
        genes.push((parent, &parent.connections[&gene_key]));
    }

    genes.extend(
        dominant
            .find_disjoint_genes(submissive)
            .into_iter()
            .map(|gene| (dominant, gene)),
    );

    let dominant_leads = dominant.is_more_advanced_than(submissive);
    if equal_fitnesses {
        genes.extend(
            submissive
                .find_disjoint_genes(dominant)
                .into_iter()
                .map(|gene| (submissive, gene)),
        );
        let (advanced, behind) = if dominant_leads {
            (dominant, submissive)
        } else {
            (submissive, dominant)
        };
        genes.extend(
            advanced
                .find_excess_genes(behind)
                .into_iter()
                .map(|gene| (advanced, gene)),
        );
    } else if dominant_leads {
        genes.extend(
            dominant
                .find_excess_genes(submissive)
                .into_iter()
                .map(|gene| (dominant, gene)),
        );
    }

    Genome::from_connections(key, genes)
}

/// Breeds the next generation, species by species in creation order.
///
/// Each specie's real-valued quota is added to the rounding remainder carried
/// over from the species before it and rounded to the nearest integer. Both
/// parents of every offspring are drawn from the specie's fitness roulette,
/// possibly the same genome twice. Any specie with zero summed fitness fails
/// the whole call with `ZeroSpeciesFitness`.
pub fn reproduction<R: Rng>(
    species_set: &SpeciesSet,
    total_fitness: f64,
    population_size: usize,
    genome_keys: &mut Counter,
    params: &Parameters,
    rng: &mut R,
) -> Result<Vec<Genome>, NeatError> {
    let mut offspring = Vec::with_capacity(population_size);
    let mut balance = 0.0;

    for specie in species_set.iter() {
        let quota =
            specie.compute_next_generation_total_members(total_fitness, population_size)? + balance;
        let rounded = quota.round().max(0.0);
        balance = quota - rounded;

        let count = rounded as usize;
        log::debug!(
            "specie {}: {} members, {} offspring",
            specie.key,
            specie.members.len(),
            count
        );
        if count == 0 {
            continue;
        }

        let roulette = Roulette::new(specie.calculate_probabilities()?)?;
        for _ in 0..count {
            let parent_a = &specie.members[&roulette.select(rng)];
            let parent_b = &specie.members[&roulette.select(rng)];
            offspring.push(crossover(
                parent_a,
                parent_b,
                genome_keys.next_key(),
                params,
                rng,
            ));
        }
    }

    Ok(offspring)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gene::{NodeGene, NodeRole};
    use rand::{rngs::StdRng, SeedableRng};

    fn link(key: u32, source: u32, target: u32, weight: f64) -> ConnectionGene {
        ConnectionGene::with_weight(key, source, target, weight)
    }

    fn parents() -> (Genome, Genome) {
        use NodeRole::*;
        let mut a = Genome::empty(1);
        for (key, role) in [(1, Input), (2, Hidden), (3, Hidden), (4, Hidden)] {
            a.include_node(NodeGene::with_bias(key, role, 0.1));
        }
        a.include_connection(link(1, 1, 2, 0.5));
        let mut disabled = link(2, 1, 3, 0.8);
        disabled.enabled = false;
        a.include_connection(disabled);
        a.include_connection(link(3, 2, 3, 0.6));
        a.include_connection(link(4, 3, 4, 0.9));

        let mut b = Genome::empty(2);
        for (key, role) in [(1, Input), (2, Hidden), (3, Hidden), (4, Hidden), (5, Output)] {
            b.include_node(NodeGene::with_bias(key, role, 0.2));
        }
        b.include_connection(link(1, 1, 2, 0.7));
        b.include_connection(link(2, 1, 3, 0.9));
        b.include_connection(link(4, 3, 4, 1.2));
        b.include_connection(link(5, 2, 4, 1.0));
        b.include_connection(link(6, 4, 5, 1.3));
        (a, b)
    }

    fn keys(genome: &Genome) -> Vec<u32> {
        genome.connections.keys().copied().collect()
    }

    #[test]
    fn test_crossover_fitter_parent_dominates() {
        let (mut a, mut b) = parents();
        a.fitness = 1.0;
        b.fitness = 0.6;
        let mut rng = StdRng::seed_from_u64(2);

        let child = crossover(&a, &b, 3, &Parameters::default(), &mut rng);
        assert_eq!(child.key, 3);
        assert_eq!(child.nodes.len(), 4);
        assert_eq!(keys(&child), vec![1, 2, 3, 4]);
        // gene 3 is disjoint, so it can only come from `a`
        assert_eq!(child.get_connection(3).unwrap().weight, 0.6);
        assert!(child.contains_connection_gene(&b.connections[&2]));
        assert!(child.contains_connection_gene(&b.connections[&4]));
        assert!(!child.contains_connection_gene(&b.connections[&5]));
        assert!(!child.contains_connection_gene(&b.connections[&6]));
    }

    #[test]
    fn test_crossover_equal_fitness_takes_everything() {
        let (mut a, mut b) = parents();
        a.fitness = 1.0;
        b.fitness = 1.0;
        let mut rng = StdRng::seed_from_u64(2);

        let child = crossover(&a, &b, 4, &Parameters::default(), &mut rng);
        assert_eq!(child.nodes.len(), 5);
        assert_eq!(keys(&child), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(child.get_connection(3).unwrap().weight, 0.6);
        assert_eq!(child.get_connection(5).unwrap().weight, 1.0);
        assert_eq!(child.get_connection(6).unwrap().weight, 1.3);
        assert_eq!(child.output_keys().iter().copied().collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn test_crossover_fitter_and_more_advanced() {
        let (mut a, mut b) = parents();
        a.fitness = 0.6;
        b.fitness = 1.0;
        let mut rng = StdRng::seed_from_u64(2);

        let child = crossover(&a, &b, 5, &Parameters::default(), &mut rng);
        assert_eq!(child.nodes.len(), 5);
        assert_eq!(keys(&child), vec![1, 2, 4, 5, 6]);
        assert_eq!(child.get_connection(5).unwrap().weight, 1.0);
        assert_eq!(child.get_connection(6).unwrap().weight, 1.3);
    }

    #[test]
    fn test_matching_genes_follow_bias() {
        let (mut a, mut b) = parents();
        a.fitness = 1.0;
        b.fitness = 0.5;
        let params = Parameters {
            crossover_dominant_bias: 1.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(8);
        let child = crossover(&a, &b, 9, &params, &mut rng);
        for key in [1, 2, 4] {
            assert_eq!(child.connections[&key], a.connections[&key]);
        }
        // the disabled flag is inherited as is
        assert!(!child.connections[&2].enabled);
    }

    #[test]
    fn test_reproduction_fills_population() {
        let params = Parameters::default();
        let mut rng = StdRng::seed_from_u64(13);
        let population: Vec<Genome> = (1..=10)
            .map(|key| {
                let mut genome = Genome::new(key, 2, 1, &mut rng);
                genome.fitness = key as f64;
                genome
            })
            .collect();
        let total_fitness: f64 = population.iter().map(|g| g.fitness).sum();

        let mut species = SpeciesSet::new();
        species.speciate(&population, &params).unwrap();

        let mut genome_keys = Counter::new(10);
        let offspring = reproduction(
            &species,
            total_fitness,
            population.len(),
            &mut genome_keys,
            &params,
            &mut rng,
        )
        .unwrap();

        assert_eq!(offspring.len(), 10);
        let offspring_keys: Vec<u32> = offspring.iter().map(|g| g.key).collect();
        assert_eq!(offspring_keys, (11..=20).collect::<Vec<_>>());
        assert!(offspring.iter().all(|g| g.connections.len() == 2));
    }

    // one single-member specie per fitness; distinct connection keys keep them apart
    fn lone_species(fitnesses: &[f64]) -> (SpeciesSet, f64) {
        let population: Vec<Genome> = fitnesses
            .iter()
            .enumerate()
            .map(|(i, fitness)| {
                let key = i as u32 + 1;
                let mut genome = Genome::empty(key);
                genome.include_node(NodeGene::with_bias(1, NodeRole::Input, 0.0));
                genome.include_node(NodeGene::with_bias(2, NodeRole::Output, 0.0));
                genome.include_connection(link(key, 1, 2, 0.5));
                genome.fitness = *fitness;
                genome
            })
            .collect();

        let mut species = SpeciesSet::new();
        species.speciate(&population, &Parameters::default()).unwrap();
        assert_eq!(species.len(), fitnesses.len());
        (species, fitnesses.iter().sum())
    }

    #[test]
    fn test_fractional_quotas_sum_to_population_size() {
        let params = Parameters::default();
        let mut rng = StdRng::seed_from_u64(6);
        for fitnesses in [
            vec![1.4, 1.4, 1.4, 0.8],
            vec![2.5, 2.5],
            vec![0.5, 0.5, 0.5, 0.5, 0.5, 2.5],
            vec![0.3, 3.1, 0.7, 0.9],
        ] {
            let (species, total_fitness) = lone_species(&fitnesses);
            let offspring = reproduction(
                &species,
                total_fitness,
                5,
                &mut Counter::new(10),
                &params,
                &mut rng,
            )
            .unwrap();
            assert_eq!(offspring.len(), 5, "fitnesses {:?}", fitnesses);
        }
    }

    #[test]
    fn test_zero_fitness_specie_fails_in_any_position() {
        let params = Parameters::default();
        let mut rng = StdRng::seed_from_u64(6);
        for (fitnesses, barren) in [
            (vec![0.0, 2.5, 2.5], 1),
            (vec![2.5, 0.0, 2.5], 2),
            (vec![2.5, 0.0, 0.0, 2.5], 2),
            (vec![2.5, 2.5, 0.0], 3),
        ] {
            let (species, total_fitness) = lone_species(&fitnesses);
            let result = reproduction(
                &species,
                total_fitness,
                5,
                &mut Counter::new(10),
                &params,
                &mut rng,
            );
            assert!(
                matches!(result, Err(NeatError::ZeroSpeciesFitness { species }) if species == barren),
                "fitnesses {:?}",
                fitnesses
            );
        }
    }

    #[test]
    fn test_reproduction_requires_fitness() {
        let params = Parameters::default();
        let mut rng = StdRng::seed_from_u64(13);
        let population = vec![Genome::new(1, 2, 1, &mut rng)];
        let mut species = SpeciesSet::new();
        species.speciate(&population, &params).unwrap();

        let result = reproduction(&species, 0.0, 1, &mut Counter::new(1), &params, &mut rng);
        assert!(matches!(result, Err(NeatError::ZeroTotalFitness)));
    }
}
