#![allow(dead_code)]

use std::collections::BTreeMap;

use contagion_core::generators::ring;
use contagion_core::{GraphProvider, NetworkView, NodeId, NodeWeights};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Adjacency supplied the way an external graph library would hand it over.
pub struct AdjacencyList {
    pub edges: BTreeMap<NodeId, Vec<NodeId>>,
}

impl AdjacencyList {
    pub fn from_pairs(nodes: impl IntoIterator<Item = NodeId>, pairs: &[(NodeId, NodeId)]) -> Self {
        let mut edges: BTreeMap<NodeId, Vec<NodeId>> =
            nodes.into_iter().map(|node| (node, Vec::new())).collect();
        for &(a, b) in pairs {
            edges.entry(a).or_default().push(b);
            edges.entry(b).or_default().push(a);
        }
        Self { edges }
    }
}

impl GraphProvider for AdjacencyList {
    fn nodes(&self) -> Vec<NodeId> {
        self.edges.keys().copied().collect()
    }

    fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        self.edges.get(&node).cloned().unwrap_or_default()
    }
}

pub fn ring_view(nodes: u32, weight: f64) -> NetworkView {
    let (graph, weights) = ring(nodes, weight);
    NetworkView::build(&graph, &weights).expect("ring is a valid graph")
}

pub fn isolated_view(nodes: u32, weight: f64) -> NetworkView {
    let list = AdjacencyList::from_pairs(0..nodes, &[]);
    NetworkView::build(&list, &NodeWeights::uniform(0..nodes, weight))
        .expect("isolated nodes are a valid graph")
}

pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}
