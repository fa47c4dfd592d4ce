//! Evolves a network for XOR and prints the winning genome as JSON.
//!
//! Usage: neatflow [settings.json] [generations]

use std::fs;
use std::process;

use neatflow::{FeedForwardNetwork, NeatError, Population, Settings};

const XOR_CASES: [([f64; 2], f64); 4] = [
    ([0.0, 0.0], 0.0),
    ([0.0, 1.0], 1.0),
    ([1.0, 0.0], 1.0),
    ([1.0, 1.0], 0.0),
];

fn xor_fitness(network: &FeedForwardNetwork) -> Result<f64, NeatError> {
    let mut fitness = 0.0;
    for (inputs, expected) in XOR_CASES.iter() {
        let output = network.activate(inputs)?[0];
        fitness += 1.0 - (output - expected).powi(2);
    }
    Ok(fitness)
}

fn load_settings(path: Option<&String>) -> Settings {
    let Some(path) = path else {
        return Settings {
            population_size: 200,
            ..Default::default()
        };
    };

    let contents = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading settings file: {}", e);
        process::exit(1);
    });
    serde_json::from_str(&contents).unwrap_or_else(|e| {
        eprintln!("Error parsing settings: {}", e);
        process::exit(1);
    })
}

fn run(settings: &Settings, generations: usize) -> Result<(), NeatError> {
    let mut population = Population::new(settings)?;

    for _ in 0..generations {
        let networks: Vec<FeedForwardNetwork> = population
            .members
            .iter()
            .map(|genome| population.get_phenotype(genome))
            .collect();
        for (genome, network) in population.members.iter_mut().zip(networks.iter()) {
            genome.fitness = xor_fitness(network)?;
        }

        if population
            .get_winner()
            .is_some_and(|winner| winner.fitness > 3.9)
        {
            break;
        }
        population.evolve()?;
    }

    let Some(winner) = population.get_winner() else {
        return Ok(());
    };
    let network = population.get_phenotype(winner);
    println!(
        "generation {}, best fitness {}",
        population.generation(),
        winner.fitness
    );
    for (inputs, _) in XOR_CASES.iter() {
        println!(
            "{} XOR {} = {}",
            inputs[0],
            inputs[1],
            network.activate(inputs)?[0]
        );
    }

    match serde_json::to_string_pretty(winner) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("could not serialize the winner: {}", e),
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let settings = load_settings(args.get(1));
    let generations: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(300);

    if settings.num_inputs != 2 || settings.num_outputs != 1 {
        eprintln!("XOR needs 2 inputs and 1 output");
        process::exit(1);
    }

    if let Err(e) = run(&settings, generations) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
