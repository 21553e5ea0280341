use crate::graph::{NetworkView, NodeId};

/// Share of total neighbor weight that must be infected before a node tips.
pub const SUPERMAJORITY_FRACTION: f64 = 2.0 / 3.0;

/// Per-node activation thresholds for one run, indexed like the view.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    aid_level: f64,
    values: Vec<f64>,
    ids: Vec<NodeId>,
}

impl Thresholds {
    pub fn aid_level(&self) -> f64 {
        self.aid_level
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn at(&self, idx: usize) -> f64 {
        self.values[idx]
    }

    pub fn get(&self, node: NodeId) -> Option<f64> {
        self.ids
            .binary_search(&node)
            .ok()
            .map(|idx| self.values[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.ids.iter().copied().zip(self.values.iter().copied())
    }
}

pub fn threshold_for(neighbor_weight_sum: f64, aid_level: f64) -> f64 {
    let base = SUPERMAJORITY_FRACTION * neighbor_weight_sum;
    (base - aid_level).max(0.0)
}

pub fn compute_thresholds(view: &NetworkView, aid_level: f64) -> Thresholds {
    let values = (0..view.len())
        .map(|idx| threshold_for(view.neighbor_weight_sum(idx), aid_level))
        .collect();
    Thresholds {
        aid_level,
        values,
        ids: view.ids().to_vec(),
    }
}
