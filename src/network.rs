use std::collections::{BTreeMap, HashMap, HashSet};

use crate::activation::{get_activation, get_aggregation, ActivationFunction, AggregationFunction};
use crate::error::NeatError;
use crate::genome::Genome;
use crate::graph::feed_forward_layers;
use crate::params::{DEFAULT_ACTIVATION, DEFAULT_AGGREGATION};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncomingEdge {
    pub source: u32,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationData {
    pub bias: f64,
    pub incoming: Vec<IncomingEdge>,
}

/// Phenotype: a genome compiled into layers of per-node evaluation data.
pub struct FeedForwardNetwork {
    layers: Vec<Vec<u32>>,
    node_evaluation_data: BTreeMap<u32, EvaluationData>,
    input_node_keys: Vec<u32>,
    output_node_keys: Vec<u32>,
    activation: ActivationFunction,
    aggregation: AggregationFunction,
}

impl FeedForwardNetwork {
    /// Compiles `genome` with the default sigmoid activation and sum aggregation.
    ///
    /// Layers come from the full connection graph, disabled connections
    /// included, but only enabled connections feed a node's value. Incoming
    /// edges from nodes that no layer reaches are dropped, and output nodes no
    /// layer reaches get a trailing layer of their own.
    pub fn create(genome: &Genome) -> FeedForwardNetwork {
        let node_keys: Vec<u32> = genome.nodes.keys().copied().collect();
        let input_node_keys: Vec<u32> = genome.input_keys().iter().copied().collect();
        let output_node_keys: Vec<u32> = genome.output_keys().iter().copied().collect();

        let mut layers = feed_forward_layers(
            &node_keys,
            &input_node_keys,
            &genome.extract_connection_keys(),
        );

        let mut reached: HashSet<u32> = input_node_keys.iter().copied().collect();
        reached.extend(layers.iter().flatten().copied());
        let stranded_outputs: Vec<u32> = output_node_keys
            .iter()
            .copied()
            .filter(|key| !reached.contains(key))
            .collect();
        if !stranded_outputs.is_empty() {
            log::debug!(
                "genome {}: outputs {:?} are not reachable from the inputs",
                genome.key,
                stranded_outputs
            );
            reached.extend(stranded_outputs.iter().copied());
            layers.push(stranded_outputs);
        }

        let mut node_evaluation_data: BTreeMap<u32, EvaluationData> = layers
            .iter()
            .flatten()
            .map(|key| {
                let data = EvaluationData {
                    bias: genome.nodes[key].bias,
                    incoming: Vec::new(),
                };
                (*key, data)
            })
            .collect();

        for connection in genome.connections.values().filter(|c| c.enabled) {
            let Some(data) = node_evaluation_data.get_mut(&connection.target) else {
                continue;
            };
            if !reached.contains(&connection.source) {
                log::trace!(
                    "genome {}: dropping edge {} -> {} from an unreachable node",
                    genome.key,
                    connection.source,
                    connection.target
                );
                continue;
            }
            data.incoming.push(IncomingEdge {
                source: connection.source,
                weight: connection.weight,
            });
        }

        FeedForwardNetwork {
            layers,
            node_evaluation_data,
            input_node_keys,
            output_node_keys,
            activation: get_activation(DEFAULT_ACTIVATION),
            aggregation: get_aggregation(DEFAULT_AGGREGATION),
        }
    }

    pub fn with_activation(mut self, name: &str) -> Self {
        self.activation = get_activation(name);
        self
    }

    pub fn with_aggregation(mut self, name: &str) -> Self {
        self.aggregation = get_aggregation(name);
        self
    }

    pub fn layers(&self) -> &[Vec<u32>] {
        &self.layers
    }

    pub fn evaluation_data(&self, node: u32) -> Option<&EvaluationData> {
        self.node_evaluation_data.get(&node)
    }

    /// Feeds `inputs` (in ascending input key order) through the network and
    /// returns the output values in ascending output key order.
    ///
    /// Nodes of a layer are evaluated round-robin until none is left whose
    /// sources all have values. Nodes waiting on a later layer move along with
    /// the next layer.
    pub fn activate(&self, inputs: &[f64]) -> Result<Vec<f64>, NeatError> {
        if inputs.len() != self.input_node_keys.len() {
            return Err(NeatError::InputArity {
                expected: self.input_node_keys.len(),
                actual: inputs.len(),
            });
        }

        let mut values: HashMap<u32, f64> = self
            .input_node_keys
            .iter()
            .copied()
            .zip(inputs.iter().copied())
            .collect();

        let mut pending: Vec<u32> = Vec::new();
        for layer in &self.layers {
            pending.extend(layer.iter().copied());
            self.evaluate_pending(&mut pending, &mut values);
        }
        if !pending.is_empty() {
            return Err(NeatError::StalledEvaluation {
                pending: pending.len(),
            });
        }

        self.output_node_keys
            .iter()
            .map(|key| {
                values
                    .get(key)
                    .copied()
                    .ok_or(NeatError::StalledEvaluation { pending: 1 })
            })
            .collect()
    }

    fn evaluate_pending(&self, pending: &mut Vec<u32>, values: &mut HashMap<u32, f64>) {
        loop {
            let before = pending.len();
            pending.retain(|node| !self.try_evaluate(*node, values));
            if pending.is_empty() || pending.len() == before {
                break;
            }
        }
    }

    fn try_evaluate(&self, node: u32, values: &mut HashMap<u32, f64>) -> bool {
        let Some(data) = self.node_evaluation_data.get(&node) else {
            return false;
        };

        let mut weighted = Vec::with_capacity(data.incoming.len());
        for edge in &data.incoming {
            match values.get(&edge.source) {
                Some(value) => weighted.push(edge.weight * value),
                None => return false,
            }
        }

        let value = (self.activation)((self.aggregation)(&weighted) + data.bias);
        values.insert(node, value);
        true
    }
}
