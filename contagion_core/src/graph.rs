//! Weighted population graph and its validated, indexed view.
//!
//! Callers supply topology through [`GraphProvider`] and influence weights
//! through [`NodeWeights`]. [`NetworkView::build`] checks both once and turns
//! them into dense index form; every downstream component works on the view.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use contagion_schema::GraphSummary;

use crate::error::GraphError;

pub type NodeId = u32;

/// Source of nodes and adjacency.
pub trait GraphProvider {
    fn nodes(&self) -> Vec<NodeId>;
    fn neighbors(&self, node: NodeId) -> Vec<NodeId>;
}

/// Undirected adjacency set. Self-loops are dropped on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    adjacency: BTreeMap<NodeId, BTreeSet<NodeId>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nodes(nodes: impl IntoIterator<Item = NodeId>) -> Self {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node);
        }
        graph
    }

    pub fn add_node(&mut self, node: NodeId) {
        self.adjacency.entry(node).or_default();
    }

    pub fn add_edge(&mut self, a: NodeId, b: NodeId) {
        self.add_node(a);
        self.add_node(b);
        if a == b {
            return;
        }
        self.adjacency.entry(a).or_default().insert(b);
        self.adjacency.entry(b).or_default().insert(a);
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.adjacency.contains_key(&node)
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeSet::len).sum::<usize>() / 2
    }

    pub fn degree(&self, node: NodeId) -> usize {
        self.adjacency.get(&node).map_or(0, BTreeSet::len)
    }
}

impl GraphProvider for Graph {
    fn nodes(&self) -> Vec<NodeId> {
        self.adjacency.keys().copied().collect()
    }

    fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        self.adjacency
            .get(&node)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }
}

/// Per-node influence weight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeWeights(BTreeMap<NodeId, f64>);

impl NodeWeights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uniform(nodes: impl IntoIterator<Item = NodeId>, weight: f64) -> Self {
        nodes.into_iter().map(|node| (node, weight)).collect()
    }

    pub fn insert(&mut self, node: NodeId, weight: f64) -> Option<f64> {
        self.0.insert(node, weight)
    }

    pub fn get(&self, node: NodeId) -> Option<f64> {
        self.0.get(&node).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.0.iter().map(|(node, weight)| (*node, *weight))
    }
}

impl FromIterator<(NodeId, f64)> for NodeWeights {
    fn from_iter<T: IntoIterator<Item = (NodeId, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Validated graph in dense index form.
///
/// Nodes are ordered by ascending id; that order fixes the sequence of
/// random draws during a run. One-sided adjacency entries are mirrored so the
/// relation is always symmetric.
#[derive(Debug, Clone)]
pub struct NetworkView {
    ids: Vec<NodeId>,
    index: HashMap<NodeId, usize>,
    neighbors: Vec<Vec<usize>>,
    weights: Vec<f64>,
}

impl NetworkView {
    pub fn build<G>(provider: &G, weights: &NodeWeights) -> Result<Self, GraphError>
    where
        G: GraphProvider + ?Sized,
    {
        let mut ids = provider.nodes();
        ids.sort_unstable();
        ids.dedup();

        let index: HashMap<NodeId, usize> = ids
            .iter()
            .enumerate()
            .map(|(idx, node)| (*node, idx))
            .collect();

        let mut node_weights = Vec::with_capacity(ids.len());
        for &node in &ids {
            node_weights.push(checked_weight(weights, node)?);
        }

        let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); ids.len()];
        for (idx, &node) in ids.iter().enumerate() {
            for neighbor in provider.neighbors(node) {
                if neighbor == node {
                    continue;
                }
                checked_weight(weights, neighbor)?;
                let neighbor_idx = *index
                    .get(&neighbor)
                    .ok_or(GraphError::UnknownNeighbor { node, neighbor })?;
                neighbors[idx].push(neighbor_idx);
                neighbors[neighbor_idx].push(idx);
            }
        }
        for list in &mut neighbors {
            list.sort_unstable();
            list.dedup();
        }

        Ok(Self {
            ids,
            index,
            neighbors,
            weights: node_weights,
        })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    pub fn id(&self, idx: usize) -> NodeId {
        self.ids[idx]
    }

    pub fn index_of(&self, node: NodeId) -> Option<usize> {
        self.index.get(&node).copied()
    }

    pub fn neighbors(&self, idx: usize) -> &[usize] {
        &self.neighbors[idx]
    }

    pub fn degree(&self, idx: usize) -> usize {
        self.neighbors[idx].len()
    }

    pub fn weight(&self, idx: usize) -> f64 {
        self.weights[idx]
    }

    pub fn neighbor_weight_sum(&self, idx: usize) -> f64 {
        self.neighbors[idx]
            .iter()
            .map(|&neighbor| self.weights[neighbor])
            .sum()
    }

    pub fn edge_count(&self) -> usize {
        self.neighbors.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn summary(&self) -> GraphSummary {
        let node_count = self.len();
        let degree_total: usize = self.neighbors.iter().map(Vec::len).sum();
        GraphSummary {
            node_count: node_count as u32,
            edge_count: (degree_total / 2) as u32,
            isolated_count: self.neighbors.iter().filter(|list| list.is_empty()).count() as u32,
            mean_degree: if node_count > 0 {
                degree_total as f64 / node_count as f64
            } else {
                0.0
            },
            total_weight: self.weights.iter().sum(),
        }
    }
}

fn checked_weight(weights: &NodeWeights, node: NodeId) -> Result<f64, GraphError> {
    let weight = weights
        .get(node)
        .ok_or(GraphError::MissingWeight { node })?;
    if !weight.is_finite() || weight <= 0.0 {
        return Err(GraphError::BadWeight { node, weight });
    }
    Ok(weight)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OneSided;

    impl GraphProvider for OneSided {
        fn nodes(&self) -> Vec<NodeId> {
            vec![3, 1, 2]
        }

        fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
            match node {
                1 => vec![2, 1],
                _ => Vec::new(),
            }
        }
    }

    #[test]
    fn add_edge_is_symmetric_and_ignores_self_loops() {
        let mut graph = Graph::new();
        graph.add_edge(0, 1);
        graph.add_edge(2, 2);
        assert_eq!(graph.neighbors(0), vec![1]);
        assert_eq!(graph.neighbors(1), vec![0]);
        assert!(graph.neighbors(2).is_empty());
        assert!(graph.contains(2));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn view_sorts_ids_and_mirrors_adjacency() {
        let weights = NodeWeights::uniform([1, 2, 3], 0.5);
        let view = NetworkView::build(&OneSided, &weights).expect("valid graph");
        assert_eq!(view.ids(), &[1, 2, 3]);
        let idx_two = view.index_of(2).unwrap();
        assert_eq!(view.neighbors(idx_two), &[view.index_of(1).unwrap()]);
        assert_eq!(view.degree(view.index_of(3).unwrap()), 0);
        assert_eq!(view.edge_count(), 1);
    }

    #[test]
    fn missing_weight_on_referenced_neighbor_is_rejected() {
        let mut graph = Graph::new();
        graph.add_edge(0, 1);
        let weights: NodeWeights = [(0, 0.3)].into_iter().collect();
        let err = NetworkView::build(&graph, &weights).unwrap_err();
        assert_eq!(err, GraphError::MissingWeight { node: 1 });
    }

    #[test]
    fn nan_and_nonpositive_weights_are_rejected() {
        let graph = Graph::with_nodes([0]);
        let nan: NodeWeights = [(0, f64::NAN)].into_iter().collect();
        assert!(matches!(
            NetworkView::build(&graph, &nan),
            Err(GraphError::BadWeight { node: 0, .. })
        ));
        let zero: NodeWeights = [(0, 0.0)].into_iter().collect();
        assert!(NetworkView::build(&graph, &zero).is_err());
    }

    #[test]
    fn neighbor_outside_node_set_is_rejected() {
        struct Dangling;
        impl GraphProvider for Dangling {
            fn nodes(&self) -> Vec<NodeId> {
                vec![0]
            }
            fn neighbors(&self, _node: NodeId) -> Vec<NodeId> {
                vec![9]
            }
        }
        let weights: NodeWeights = [(0, 0.2), (9, 0.2)].into_iter().collect();
        assert_eq!(
            NetworkView::build(&Dangling, &weights).unwrap_err(),
            GraphError::UnknownNeighbor {
                node: 0,
                neighbor: 9
            }
        );
    }

    #[test]
    fn summary_counts_isolated_nodes() {
        let mut graph = Graph::with_nodes([0, 1, 2, 3]);
        graph.add_edge(0, 1);
        graph.add_edge(1, 2);
        let view = NetworkView::build(&graph, &NodeWeights::uniform(0..4, 0.25)).unwrap();
        let summary = view.summary();
        assert_eq!(summary.node_count, 4);
        assert_eq!(summary.edge_count, 2);
        assert_eq!(summary.isolated_count, 1);
        assert_eq!(summary.mean_degree, 1.0);
        assert_eq!(summary.total_weight, 1.0);
    }
}
