//! Advisory influence ranking.
//!
//! Scores never feed threshold computation; they exist so callers can see
//! which nodes look most influential, and so a per-node aid policy can later
//! plug in through [`NodeRanker`].

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::graph::{NetworkView, NodeId};

/// Neighbor weight sum multiplied by degree, per node.
pub fn impact_scores(view: &NetworkView) -> BTreeMap<NodeId, f64> {
    (0..view.len())
        .map(|idx| {
            let score = view.neighbor_weight_sum(idx) * view.degree(idx) as f64;
            (view.id(idx), score)
        })
        .collect()
}

/// Highest score first; equal scores by ascending id.
pub fn rank_by_impact(scores: &BTreeMap<NodeId, f64>) -> Vec<NodeId> {
    let mut ranked: Vec<(NodeId, f64)> = scores.iter().map(|(id, score)| (*id, *score)).collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked.into_iter().map(|(id, _)| id).collect()
}

pub trait NodeRanker {
    fn rank(&self, view: &NetworkView) -> Vec<NodeId>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImpactRanker;

impl NodeRanker for ImpactRanker {
    fn rank(&self, view: &NetworkView) -> Vec<NodeId> {
        rank_by_impact(&impact_scores(view))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Graph, NodeWeights};

    fn star() -> NetworkView {
        // 0 is the hub; 3 is isolated.
        let mut graph = Graph::with_nodes([0, 1, 2, 3]);
        graph.add_edge(0, 1);
        graph.add_edge(0, 2);
        let weights: NodeWeights = [(0, 0.4), (1, 0.2), (2, 0.3), (3, 0.1)]
            .into_iter()
            .collect();
        NetworkView::build(&graph, &weights).unwrap()
    }

    #[test]
    fn score_is_neighbor_weight_sum_times_degree() {
        let scores = impact_scores(&star());
        assert!((scores[&0] - 1.0).abs() < 1e-12);
        assert!((scores[&1] - 0.4).abs() < 1e-12);
        assert_eq!(scores[&3], 0.0);
    }

    #[test]
    fn ranking_orders_by_score_then_id() {
        let ranked = ImpactRanker.rank(&star());
        assert_eq!(ranked, vec![0, 1, 2, 3]);

        let tied: BTreeMap<NodeId, f64> = [(5, 1.0), (2, 1.0), (7, 3.0)].into_iter().collect();
        assert_eq!(rank_by_impact(&tied), vec![7, 2, 5]);
    }
}
