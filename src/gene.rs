use rand::Rng;
use serde::{Deserialize, Serialize};

/// Anything carrying a stable integer key.
pub trait Identifiable {
    fn key(&self) -> u32;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRole {
    Input,
    Output,
    Hidden,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeGene {
    pub key: u32,
    pub role: NodeRole,
    pub bias: f64,
}

impl NodeGene {
    /// Input nodes carry no bias, every other node draws one from [-0.5, 0.5).
    pub fn new<R: Rng>(key: u32, role: NodeRole, rng: &mut R) -> NodeGene {
        let bias = match role {
            NodeRole::Input => 0.0,
            _ => rng.gen::<f64>() - 0.5,
        };
        NodeGene { key, role, bias }
    }

    pub fn with_bias(key: u32, role: NodeRole, bias: f64) -> NodeGene {
        NodeGene { key, role, bias }
    }

    pub fn is_input(&self) -> bool {
        self.role == NodeRole::Input
    }

    pub fn is_output(&self) -> bool {
        self.role == NodeRole::Output
    }
}

impl Identifiable for NodeGene {
    fn key(&self) -> u32 {
        self.key
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectionGene {
    // doubles as the innovation number
    pub key: u32,
    pub source: u32,
    pub target: u32,
    pub weight: f64,
    pub enabled: bool,
}

impl ConnectionGene {
    pub fn new<R: Rng>(key: u32, source: u32, target: u32, rng: &mut R) -> ConnectionGene {
        ConnectionGene {
            key,
            source,
            target,
            weight: random_weight(rng),
            enabled: true,
        }
    }

    pub fn with_weight(key: u32, source: u32, target: u32, weight: f64) -> ConnectionGene {
        ConnectionGene {
            key,
            source,
            target,
            weight,
            enabled: true,
        }
    }

    pub fn randomize_weight<R: Rng>(&mut self, rng: &mut R) {
        self.weight = random_weight(rng);
    }
}

impl Identifiable for ConnectionGene {
    fn key(&self) -> u32 {
        self.key
    }
}

fn random_weight<R: Rng>(rng: &mut R) -> f64 {
    rng.gen_range(-1.0..1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_input_nodes_have_no_bias() {
        let mut rng = StdRng::seed_from_u64(7);
        for key in 0..50 {
            assert_eq!(NodeGene::new(key, NodeRole::Input, &mut rng).bias, 0.0);
            let hidden = NodeGene::new(key, NodeRole::Hidden, &mut rng);
            assert!((-0.5..0.5).contains(&hidden.bias));
        }
    }

    #[test]
    fn test_new_connection_is_enabled_with_bounded_weight() {
        let mut rng = StdRng::seed_from_u64(7);
        for key in 0..50 {
            let mut gene = ConnectionGene::new(key, 1, 2, &mut rng);
            assert!(gene.enabled);
            assert!((-1.0..1.0).contains(&gene.weight));
            gene.randomize_weight(&mut rng);
            assert!((-1.0..1.0).contains(&gene.weight));
            assert_eq!(gene.key(), key);
        }
    }
}
