use thiserror::Error;

use crate::graph::NodeId;

/// Failures surfaced before any simulation round runs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error("invalid graph: {0}")]
    InvalidGraph(#[from] GraphError),
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl SimError {
    pub(crate) fn parameter(name: &'static str, reason: impl Into<String>) -> Self {
        SimError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    #[error("node {node} has no weight entry")]
    MissingWeight { node: NodeId },
    #[error("node {node} has weight {weight}, expected a positive finite value")]
    BadWeight { node: NodeId, weight: f64 },
    #[error("node {node} lists neighbor {neighbor} which is not part of the graph")]
    UnknownNeighbor { node: NodeId, neighbor: NodeId },
    #[error("graph has no nodes")]
    Empty,
}
