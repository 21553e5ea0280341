use rand::Rng;

use crate::{
    error::SimError,
    graph::{Graph, NodeId, NodeWeights},
};

/// Cycle `0 - 1 - ... - (n-1) - 0` with a uniform weight.
pub fn ring(nodes: u32, weight: f64) -> (Graph, NodeWeights) {
    let mut graph = Graph::with_nodes(0..nodes);
    if nodes > 1 {
        for node in 0..nodes {
            graph.add_edge(node, (node + 1) % nodes);
        }
    }
    (graph, NodeWeights::uniform(0..nodes, weight))
}

/// G(n, p) graph: each unordered pair is joined independently with
/// probability `edge_probability`. Weights are drawn uniformly from
/// `[weight_min, weight_max)`.
pub fn erdos_renyi<R: Rng + ?Sized>(
    nodes: u32,
    edge_probability: f64,
    weight_min: f64,
    weight_max: f64,
    rng: &mut R,
) -> Result<(Graph, NodeWeights), SimError> {
    if !(0.0..=1.0).contains(&edge_probability) {
        return Err(SimError::parameter(
            "edge_probability",
            format!("{edge_probability} is outside [0, 1]"),
        ));
    }
    if !weight_min.is_finite() || !weight_max.is_finite() || weight_min <= 0.0 {
        return Err(SimError::parameter(
            "weight_min",
            "weight bounds must be finite and strictly positive",
        ));
    }
    if weight_min > weight_max {
        return Err(SimError::parameter(
            "weight_max",
            format!("{weight_max} is below weight_min {weight_min}"),
        ));
    }

    let mut graph = Graph::with_nodes(0..nodes);
    for a in 0..nodes {
        for b in (a + 1)..nodes {
            if rng.gen_bool(edge_probability) {
                graph.add_edge(a, b);
            }
        }
    }

    let weights = (0..nodes)
        .map(|node: NodeId| {
            let weight = if weight_min < weight_max {
                rng.gen_range(weight_min..weight_max)
            } else {
                weight_min
            };
            (node, weight)
        })
        .collect();

    Ok((graph, weights))
}
