//! Core crate for the aid-sweep contagion simulator.
//!
//! Runs threshold contagion with stochastic recovery over a weighted graph
//! and searches a candidate set of aid levels for the cheapest one that
//! reaches a recovery target in the fewest rounds. Start with [`optimize`]
//! for a sweep or [`simulate_with_aid`] for a single run.

pub mod error;
pub mod generators;
pub mod graph;
pub mod hashing;
pub mod impact;
pub mod metrics;
pub mod optimizer;
pub mod simulator;
pub mod sweep_config;
pub mod threshold;

pub use error::{GraphError, SimError};
pub use graph::{Graph, GraphProvider, NetworkView, NodeId, NodeWeights};
pub use impact::{impact_scores, rank_by_impact, ImpactRanker, NodeRanker};
pub use metrics::RunMetrics;
pub use optimizer::{
    aid_range, optimize, BestAid, CandidateOutcome, ExecutionMode, OptimizationRequest,
    OptimizationResult,
};
pub use simulator::{
    run, simulate_with_aid, InitialInfection, NodeState, SimulationParams, SimulationResult,
    StopRule,
};
pub use sweep_config::{load_sweep_config_from_env, SweepConfig, SweepConfigError};
pub use threshold::{compute_thresholds, Thresholds};
