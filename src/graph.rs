use std::collections::{BTreeMap, BTreeSet, HashSet};

/// node key -> keys of the nodes it feeds into
pub type Adjacency = BTreeMap<u32, Vec<u32>>;

/// Returns true if adding the edge `source -> target` to `adjacency` closes a cycle.
///
/// Runs a depth-first search from `source` over the graph with the trial edge
/// added, tracking which nodes are on the current path; reaching a node that is
/// on the path is a back edge. The trial edge is only ever looked at, never
/// written into `adjacency`.
pub fn creates_cycle(adjacency: &Adjacency, source: u32, target: u32) -> bool {
    let mut visited = HashSet::new();
    let mut on_stack = HashSet::new();
    is_cyclic(
        adjacency,
        (source, target),
        source,
        &mut visited,
        &mut on_stack,
    )
}

fn is_cyclic(
    adjacency: &Adjacency,
    trial_edge: (u32, u32),
    node: u32,
    visited: &mut HashSet<u32>,
    on_stack: &mut HashSet<u32>,
) -> bool {
    visited.insert(node);
    on_stack.insert(node);

    let existing = adjacency.get(&node).map(|v| v.as_slice()).unwrap_or(&[]);
    let extra = (node == trial_edge.0).then_some(trial_edge.1);

    for neighbor in existing.iter().copied().chain(extra) {
        if on_stack.contains(&neighbor) {
            return true;
        }
        if !visited.contains(&neighbor)
            && is_cyclic(adjacency, trial_edge, neighbor, visited, on_stack)
        {
            return true;
        }
    }

    on_stack.remove(&node);
    false
}

/// Groups `nodes` into feed-forward layers by breadth-first search from `inputs`.
///
/// The inputs form an implicit layer 0 that is not returned. Every other node
/// lands in the layer equal to its shortest edge distance from the input set;
/// nodes unreachable from the inputs are left out. Keys within a layer are
/// returned in ascending order.
pub fn feed_forward_layers(nodes: &[u32], inputs: &[u32], adjacency: &Adjacency) -> Vec<Vec<u32>> {
    let known: HashSet<u32> = nodes.iter().copied().collect();
    let mut discovered: HashSet<u32> = inputs.iter().copied().collect();
    let mut frontier: BTreeSet<u32> = inputs.iter().copied().collect();
    let mut layers = Vec::new();

    loop {
        let mut next = BTreeSet::new();
        for node in &frontier {
            let Some(targets) = adjacency.get(node) else {
                continue;
            };
            for target in targets {
                if known.contains(target) && !discovered.contains(target) {
                    next.insert(*target);
                }
            }
        }

        if next.is_empty() {
            break;
        }

        discovered.extend(next.iter().copied());
        layers.push(next.iter().copied().collect());
        frontier = next;
    }

    layers
}
