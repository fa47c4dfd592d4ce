use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::counter::Counter;
use crate::error::NeatError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddNodeInnovation {
    pub id: u32,
    pub source: u32,
    pub target: u32,
    pub new_node_key: u32,
    /// innovation number of `source -> new node`
    pub innovation_a: u32,
    /// innovation number of `new node -> target`
    pub innovation_b: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddConnectionInnovation {
    pub id: u32,
    pub source: u32,
    pub target: u32,
    pub innovation_number: u32,
}

/// Run-wide ledger of structural mutations.
///
/// Two genomes that split the same connection, or connect the same pair of
/// nodes, must end up with the same node key and innovation numbers for it.
/// Every such mutation is remembered by its `(source, target)` pair.
#[derive(Clone, Debug, Default)]
pub struct InnovationRegistry {
    add_node_records: Vec<AddNodeInnovation>,
    add_connection_records: Vec<AddConnectionInnovation>,
    // (source, target) -> index into the record lists above
    add_node_index: HashMap<(u32, u32), usize>,
    add_connection_index: HashMap<(u32, u32), usize>,
    add_node_ids: Counter,
    add_connection_ids: Counter,
    innovation_numbers: Counter,
    node_keys: Counter,
}

impl InnovationRegistry {
    /// Counters start after the keys handed out when the initial genomes were built.
    pub fn new(initial_connections: u32, initial_nodes: u32) -> InnovationRegistry {
        InnovationRegistry {
            innovation_numbers: Counter::new(initial_connections),
            node_keys: Counter::new(initial_nodes),
            ..Default::default()
        }
    }

    /// Registry matching genomes built by `Genome::new(_, num_inputs, num_outputs, _)`.
    pub fn for_shape(num_inputs: usize, num_outputs: usize) -> InnovationRegistry {
        InnovationRegistry::new(
            (num_inputs * num_outputs) as u32,
            (num_inputs + num_outputs) as u32,
        )
    }

    pub fn find_add_node(&self, source: u32, target: u32) -> Option<&AddNodeInnovation> {
        self.add_node_index
            .get(&(source, target))
            .map(|idx| &self.add_node_records[*idx])
    }

    pub fn find_add_connection(&self, source: u32, target: u32) -> Option<&AddConnectionInnovation> {
        self.add_connection_index
            .get(&(source, target))
            .map(|idx| &self.add_connection_records[*idx])
    }

    /// Mints one node key and two innovation numbers for splitting `source -> target`.
    pub fn create_add_node(&mut self, source: u32, target: u32) -> Result<AddNodeInnovation, NeatError> {
        if self.add_node_index.contains_key(&(source, target)) {
            return Err(NeatError::DuplicateAddNodeInnovation {
                from: source,
                to: target,
            });
        }

        let record = AddNodeInnovation {
            id: self.add_node_ids.next_key(),
            source,
            target,
            innovation_a: self.innovation_numbers.next_key(),
            innovation_b: self.innovation_numbers.next_key(),
            new_node_key: self.node_keys.next_key(),
        };
        log::trace!(
            "new add-node innovation {} -> {}: node {}, innovations {}/{}",
            source,
            target,
            record.new_node_key,
            record.innovation_a,
            record.innovation_b
        );

        self.add_node_index
            .insert((source, target), self.add_node_records.len());
        self.add_node_records.push(record);
        Ok(record)
    }

    pub fn create_add_connection(
        &mut self,
        source: u32,
        target: u32,
    ) -> Result<AddConnectionInnovation, NeatError> {
        if self.add_connection_index.contains_key(&(source, target)) {
            return Err(NeatError::DuplicateAddConnectionInnovation {
                from: source,
                to: target,
            });
        }

        let record = AddConnectionInnovation {
            id: self.add_connection_ids.next_key(),
            source,
            target,
            innovation_number: self.innovation_numbers.next_key(),
        };
        log::trace!(
            "new add-connection innovation {} -> {}: {}",
            source,
            target,
            record.innovation_number
        );

        self.add_connection_index
            .insert((source, target), self.add_connection_records.len());
        self.add_connection_records.push(record);
        Ok(record)
    }

    /// Existing record for splitting `source -> target`, or a freshly created one.
    pub fn add_node_innovation(&mut self, source: u32, target: u32) -> Result<AddNodeInnovation, NeatError> {
        match self.find_add_node(source, target) {
            Some(record) => Ok(*record),
            None => self.create_add_node(source, target),
        }
    }

    pub fn add_connection_innovation(
        &mut self,
        source: u32,
        target: u32,
    ) -> Result<AddConnectionInnovation, NeatError> {
        match self.find_add_connection(source, target) {
            Some(record) => Ok(*record),
            None => self.create_add_connection(source, target),
        }
    }

    pub fn add_node_records(&self) -> &[AddNodeInnovation] {
        &self.add_node_records
    }

    pub fn add_connection_records(&self) -> &[AddConnectionInnovation] {
        &self.add_connection_records
    }
}
