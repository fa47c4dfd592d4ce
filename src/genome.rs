use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::NeatError;
use crate::gene::{ConnectionGene, Identifiable, NodeGene, NodeRole};
use crate::graph::{creates_cycle, Adjacency};
use crate::innovation::InnovationRegistry;
use crate::params::Parameters;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genome {
    pub key: u32,
    // node key -> node
    pub nodes: BTreeMap<u32, NodeGene>,
    // innovation number -> connection
    pub connections: BTreeMap<u32, ConnectionGene>,
    pub fitness: f64,
    input_keys: BTreeSet<u32>,
    output_keys: BTreeSet<u32>,
}

/// Which mutation kinds fired during one `Genome::mutate` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationOutcome {
    pub added_node: bool,
    pub added_connection: bool,
    pub changed_weight: bool,
}

impl Genome {
    pub fn empty(key: u32) -> Genome {
        Genome {
            key,
            nodes: BTreeMap::new(),
            connections: BTreeMap::new(),
            fitness: 0.0,
            input_keys: BTreeSet::new(),
            output_keys: BTreeSet::new(),
        }
    }

    /// Minimal genome: every input wired to every output.
    ///
    /// Inputs take keys `1..=num_inputs`, outputs the keys after them, and the
    /// connections `1..=num_inputs * num_outputs` in input-major order. An
    /// `InnovationRegistry::for_shape` with the same shape continues from there.
    pub fn new<R: Rng>(key: u32, num_inputs: usize, num_outputs: usize, rng: &mut R) -> Genome {
        let mut genome = Genome::empty(key);
        let first_output = num_inputs as u32 + 1;

        for i in 0..num_inputs as u32 {
            genome.include_node(NodeGene::new(i + 1, NodeRole::Input, rng));
        }
        for i in 0..num_outputs as u32 {
            genome.include_node(NodeGene::new(first_output + i, NodeRole::Output, rng));
        }

        let mut connection_key = 0;
        for source in 1..first_output {
            for target in first_output..first_output + num_outputs as u32 {
                connection_key += 1;
                genome.include_connection(ConnectionGene::new(connection_key, source, target, rng));
            }
        }

        genome
    }

    /// Builds a genome out of copies of the given connections and their endpoint nodes.
    ///
    /// Each connection is paired with the genome it comes from, which supplies the
    /// endpoint nodes. When two connections name the same node the first copy wins.
    /// A connection that would duplicate an existing `(source, target)` pair or
    /// close a cycle in the assembled graph is left out.
    pub fn from_connections<'a, I>(key: u32, genes: I) -> Genome
    where
        I: IntoIterator<Item = (&'a Genome, &'a ConnectionGene)>,
    {
        let mut genome = Genome::empty(key);
        let mut adjacency = Adjacency::new();

        for (parent, connection) in genes {
            let (Some(source), Some(target)) = (
                parent.nodes.get(&connection.source),
                parent.nodes.get(&connection.target),
            ) else {
                log::debug!(
                    "genome {}: connection {} has no endpoint nodes, skipped",
                    parent.key,
                    connection.key
                );
                continue;
            };

            if genome.connections.contains_key(&connection.key)
                || genome.is_connected(connection.source, connection.target)
                || creates_cycle(&adjacency, connection.source, connection.target)
            {
                log::debug!(
                    "genome {}: inherited connection {} ({} -> {}) conflicts, skipped",
                    key,
                    connection.key,
                    connection.source,
                    connection.target
                );
                continue;
            }

            for node in [source, target] {
                if !genome.nodes.contains_key(&node.key) {
                    genome.include_node(node.clone());
                }
            }
            adjacency
                .entry(connection.source)
                .or_default()
                .push(connection.target);
            genome.include_connection(connection.clone());
        }

        genome
    }

    pub fn include_node(&mut self, node: NodeGene) {
        match node.role {
            NodeRole::Input => {
                self.input_keys.insert(node.key);
            }
            NodeRole::Output => {
                self.output_keys.insert(node.key);
            }
            NodeRole::Hidden => {}
        }
        self.nodes.insert(node.key, node);
    }

    pub fn include_connection(&mut self, connection: ConnectionGene) {
        self.connections.insert(connection.key, connection);
    }

    pub fn get_connection(&self, key: u32) -> Option<&ConnectionGene> {
        self.connections.get(&key)
    }

    /// True if a connection with the same key and endpoints is present.
    pub fn contains_connection_gene(&self, gene: &ConnectionGene) -> bool {
        self.connections
            .get(&gene.key)
            .is_some_and(|c| c.source == gene.source && c.target == gene.target)
    }

    pub fn input_keys(&self) -> &BTreeSet<u32> {
        &self.input_keys
    }

    pub fn output_keys(&self) -> &BTreeSet<u32> {
        &self.output_keys
    }

    pub fn is_connected(&self, source: u32, target: u32) -> bool {
        self.connections
            .values()
            .any(|c| c.source == source && c.target == target)
    }

    /// Structural adjacency view; disabled connections count as edges too.
    pub fn extract_connection_keys(&self) -> Adjacency {
        let mut adjacency: Adjacency = self.nodes.keys().map(|k| (*k, Vec::new())).collect();
        for connection in self.connections.values() {
            adjacency
                .entry(connection.source)
                .or_default()
                .push(connection.target);
        }
        adjacency
    }

    pub fn max_connection_key(&self) -> Option<u32> {
        self.connections.keys().next_back().copied()
    }

    /// A genome is more advanced when its newest innovation is at least as recent as the other's.
    pub fn is_more_advanced_than(&self, other: &Genome) -> bool {
        self.max_connection_key() >= other.max_connection_key()
    }

    // keys at or below this are "within range" of both genomes
    fn shared_key_range(&self, other: &Genome) -> Option<u32> {
        self.max_connection_key().min(other.max_connection_key())
    }

    fn unmatched_genes<'a>(&'a self, other: &'a Genome) -> impl Iterator<Item = &'a ConnectionGene> {
        full_sorted_outer_join(
            self.connections.values(),
            other.connections.values(),
            |a, b| a.key.cmp(&b.key),
        )
        .into_iter()
        .filter_map(|pair| match pair {
            (Some(gene), None) => Some(gene),
            _ => None,
        })
    }

    /// Genes of `self` missing from `other` whose keys fall inside both genomes' range.
    pub fn find_disjoint_genes<'a>(&'a self, other: &'a Genome) -> Vec<&'a ConnectionGene> {
        let limit = self.shared_key_range(other);
        self.unmatched_genes(other)
            .filter(|gene| Some(gene.key) <= limit)
            .collect()
    }

    /// Genes of `self` missing from `other` whose keys lie beyond the shared range.
    pub fn find_excess_genes<'a>(&'a self, other: &'a Genome) -> Vec<&'a ConnectionGene> {
        let limit = self.shared_key_range(other);
        self.unmatched_genes(other)
            .filter(|gene| Some(gene.key) > limit)
            .collect()
    }

    pub fn find_matching_gene_keys(&self, other: &Genome) -> Vec<u32> {
        full_sorted_outer_join(
            self.connections.keys(),
            other.connections.keys(),
            |a, b| a.cmp(b),
        )
        .into_iter()
        .filter_map(|pair| match pair {
            (Some(key), Some(_)) => Some(*key),
            _ => None,
        })
        .collect()
    }

    /// Genomic distance `C1*E/N + C2*D/N + C3*W`.
    ///
    /// E counts excess genes of the more advanced genome (ties go to `self`), D
    /// counts disjoint genes of both, N is the larger connection count and W the
    /// mean absolute weight difference of matching genes. Not guaranteed to be
    /// symmetric.
    pub fn distance(&self, other: &Genome, params: &Parameters) -> f64 {
        let disjoint =
            self.find_disjoint_genes(other).len() + other.find_disjoint_genes(self).len();
        let excess = if self.is_more_advanced_than(other) {
            self.find_excess_genes(other).len()
        } else {
            other.find_excess_genes(self).len()
        };

        let matching = self.find_matching_gene_keys(other);
        let weight_diff = if matching.is_empty() {
            0.0
        } else {
            matching
                .iter()
                .map(|key| (self.connections[key].weight - other.connections[key].weight).abs())
                .sum::<f64>()
                / matching.len() as f64
        };

        let n = self.connections.len().max(other.connections.len());
        if n == 0 {
            return params.compat_weight_factor * weight_diff;
        }
        let n = n as f64;
        params.compat_excess_factor * excess as f64 / n
            + params.compat_disjoint_factor * disjoint as f64 / n
            + params.compat_weight_factor * weight_diff
    }

    /// Splits a random enabled connection with a new hidden node.
    ///
    /// The split connection is disabled, `source -> new` gets weight 1 and
    /// `new -> target` inherits the old weight. Returns false, leaving the genome
    /// untouched, when there is nothing to split or the genome already holds the
    /// node the registry assigns to this split.
    pub fn add_node_mutation<R: Rng>(
        &mut self,
        registry: &mut InnovationRegistry,
        rng: &mut R,
    ) -> Result<bool, NeatError> {
        // only enabled connections: a disabled one was already split, and the
        // registry would hand back the node this genome holds for it
        let candidates: Vec<u32> = self
            .connections
            .values()
            .filter(|c| c.enabled)
            .map(|c| c.key)
            .collect();
        if candidates.is_empty() {
            return Ok(false);
        }

        let split_key = candidates[rng.gen_range(0..candidates.len())];
        let (source, target, weight) = {
            let split = &self.connections[&split_key];
            (split.source, split.target, split.weight)
        };

        let innovation = registry.add_node_innovation(source, target)?;
        if self.nodes.contains_key(&innovation.new_node_key)
            || self.connections.contains_key(&innovation.innovation_a)
            || self.connections.contains_key(&innovation.innovation_b)
        {
            log::debug!(
                "genome {}: split of {} -> {} already present",
                self.key,
                source,
                target
            );
            return Ok(false);
        }

        if let Some(split) = self.connections.get_mut(&split_key) {
            split.enabled = false;
        }

        let new_node = innovation.new_node_key;
        self.include_node(NodeGene::new(new_node, NodeRole::Hidden, rng));
        self.include_connection(ConnectionGene::with_weight(
            innovation.innovation_a,
            source,
            new_node,
            1.0,
        ));
        self.include_connection(ConnectionGene::with_weight(
            innovation.innovation_b,
            new_node,
            target,
            weight,
        ));
        Ok(true)
    }

    /// Connects two randomly drawn nodes. Returns false when the pair is rejected.
    pub fn add_connection_mutation<R: Rng>(
        &mut self,
        registry: &mut InnovationRegistry,
        rng: &mut R,
    ) -> Result<bool, NeatError> {
        if self.nodes.is_empty() {
            return Ok(false);
        }

        let keys: Vec<u32> = self.nodes.keys().copied().collect();
        let source = keys[rng.gen_range(0..keys.len())];
        let target = keys[rng.gen_range(0..keys.len())];

        if let Some(reason) = self.reject_connection(source, target) {
            log::debug!(
                "genome {}: connection {} -> {} rejected, {}",
                self.key,
                source,
                target,
                reason
            );
            return Ok(false);
        }

        let innovation = registry.add_connection_innovation(source, target)?;
        self.include_connection(ConnectionGene::new(
            innovation.innovation_number,
            source,
            target,
            rng,
        ));
        Ok(true)
    }

    fn reject_connection(&self, source: u32, target: u32) -> Option<&'static str> {
        if self.is_connected(source, target) {
            return Some("already connected");
        }
        if source == target {
            return Some("self loop");
        }

        let (from, to) = (&self.nodes[&source], &self.nodes[&target]);
        if from.is_input() && to.is_input() {
            return Some("both inputs");
        }
        if from.is_output() && to.is_output() {
            return Some("both outputs");
        }
        if creates_cycle(&self.extract_connection_keys(), source, target) {
            return Some("would create a cycle");
        }
        None
    }

    /// Re-draws the weight of one random connection.
    pub fn weight_mutation<R: Rng>(&mut self, rng: &mut R) {
        if self.connections.is_empty() {
            return;
        }
        let idx = rng.gen_range(0..self.connections.len());
        if let Some(connection) = self.connections.values_mut().nth(idx) {
            connection.randomize_weight(rng);
        }
    }

    /// One mutation round. All three gates test the same uniform draw, so the
    /// rarer mutations only fire together with the more common ones.
    pub fn mutate<R: Rng>(
        &mut self,
        registry: &mut InnovationRegistry,
        params: &Parameters,
        rng: &mut R,
    ) -> Result<MutationOutcome, NeatError> {
        let draw: f64 = rng.gen();
        let mut outcome = MutationOutcome::default();

        if draw <= params.add_node_rate {
            outcome.added_node = self.add_node_mutation(registry, rng)?;
        }
        if draw <= params.add_connection_rate {
            outcome.added_connection = self.add_connection_mutation(registry, rng)?;
        }
        if draw <= params.weight_mutation_rate && !self.connections.is_empty() {
            self.weight_mutation(rng);
            outcome.changed_weight = true;
        }

        Ok(outcome)
    }
}

impl Identifiable for Genome {
    fn key(&self) -> u32 {
        self.key
    }
}

pub fn full_sorted_outer_join<I, J, F>(
    iter1: I,
    iter2: J,
    mut cmp: F,
) -> Vec<(Option<I::Item>, Option<J::Item>)>
where
    I: Iterator,
    J: Iterator,
    F: FnMut(&I::Item, &J::Item) -> Ordering,
{
    let mut result = Vec::new();

    let mut iter1 = iter1.peekable();
    let mut iter2 = iter2.peekable();

    loop {
        let order = match (iter1.peek(), iter2.peek()) {
            (Some(a), Some(b)) => cmp(a, b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => break,
        };
        match order {
            Ordering::Less => result.push((iter1.next(), None)),
            Ordering::Greater => result.push((None, iter2.next())),
            Ordering::Equal => result.push((iter1.next(), iter2.next())),
        }
    }

    result
}
