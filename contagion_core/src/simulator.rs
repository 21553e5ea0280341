//! Threshold contagion with stochastic recovery.
//!
//! A round is two explicit passes over the nodes in ascending id order:
//!
//! 1. activation, decided entirely from a snapshot of the round's starting
//!    states;
//! 2. recovery, which reads the post-activation states and draws one uniform
//!    value per infected node.
//!
//! Recovery reverts a node to [`NodeState::Susceptible`], so recovered nodes
//! can be activated again later in the run.

use rand::seq::index;
use rand::Rng;
use tracing::debug;

use contagion_schema::{RunReport, StopRuleKind};

use crate::{
    error::SimError,
    graph::{NetworkView, NodeId},
    metrics::RunMetrics,
    threshold::{compute_thresholds, Thresholds},
};

pub const DEFAULT_INITIAL_INFECTED_FRACTION: f64 = 0.1;
pub const DEFAULT_BASE_RECOVERY_CHANCE: f64 = 0.05;
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Susceptible,
    Infected,
}

/// How the starting infected set is chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum InitialInfection {
    /// `floor(n * fraction)` nodes drawn uniformly without replacement.
    Fraction(f64),
    /// Exactly these nodes; no random draw is consumed.
    Nodes(Vec<NodeId>),
}

impl Default for InitialInfection {
    fn default() -> Self {
        InitialInfection::Fraction(DEFAULT_INITIAL_INFECTED_FRACTION)
    }
}

impl InitialInfection {
    fn validate(&self, view: &NetworkView) -> Result<(), SimError> {
        match self {
            InitialInfection::Fraction(fraction) => {
                if !(0.0..=1.0).contains(fraction) {
                    return Err(SimError::parameter(
                        "initial_infected_fraction",
                        format!("{fraction} is outside [0, 1]"),
                    ));
                }
            }
            InitialInfection::Nodes(nodes) => {
                if let Some(missing) = nodes.iter().find(|node| view.index_of(**node).is_none()) {
                    return Err(SimError::parameter(
                        "initial_infection",
                        format!("seed node {missing} is not part of the graph"),
                    ));
                }
            }
        }
        Ok(())
    }

    fn seed_states<R: Rng + ?Sized>(&self, view: &NetworkView, rng: &mut R) -> Vec<NodeState> {
        let mut states = vec![NodeState::Susceptible; view.len()];
        match self {
            InitialInfection::Fraction(fraction) => {
                let count = ((view.len() as f64 * fraction).floor() as usize).min(view.len());
                for idx in index::sample(rng, view.len(), count).into_iter() {
                    states[idx] = NodeState::Infected;
                }
            }
            InitialInfection::Nodes(nodes) => {
                for idx in nodes.iter().filter_map(|node| view.index_of(*node)) {
                    states[idx] = NodeState::Infected;
                }
            }
        }
        states
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopRule {
    /// Run exactly `max_iterations` rounds.
    #[default]
    FixedBudget,
    /// Also stop after a round that changed nothing and left nothing that
    /// could still change: no infected nodes remain, or recovery is
    /// impossible so activation alone decides the next state.
    UntilStable,
}

impl From<StopRuleKind> for StopRule {
    fn from(value: StopRuleKind) -> Self {
        match value {
            StopRuleKind::FixedBudget => StopRule::FixedBudget,
            StopRuleKind::UntilStable => StopRule::UntilStable,
        }
    }
}

impl From<StopRule> for StopRuleKind {
    fn from(value: StopRule) -> Self {
        match value {
            StopRule::FixedBudget => StopRuleKind::FixedBudget,
            StopRule::UntilStable => StopRuleKind::UntilStable,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParams {
    pub base_recovery_chance: f64,
    pub aid_level: f64,
    pub max_iterations: u32,
    pub initial_infection: InitialInfection,
    pub stop_rule: StopRule,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            base_recovery_chance: DEFAULT_BASE_RECOVERY_CHANCE,
            aid_level: 0.0,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            initial_infection: InitialInfection::default(),
            stop_rule: StopRule::default(),
        }
    }
}

impl SimulationParams {
    pub fn with_aid(&self, aid_level: f64) -> Self {
        Self {
            aid_level,
            ..self.clone()
        }
    }

    /// Per-round recovery probability for every infected node.
    pub fn recovery_chance(&self) -> f64 {
        self.base_recovery_chance + self.aid_level
    }

    pub fn validate(&self, view: &NetworkView) -> Result<(), SimError> {
        if !(0.0..=1.0).contains(&self.base_recovery_chance) {
            return Err(SimError::parameter(
                "base_recovery_chance",
                format!("{} is outside [0, 1]", self.base_recovery_chance),
            ));
        }
        validate_aid_level(self.aid_level)?;
        self.initial_infection.validate(view)
    }
}

pub(crate) fn validate_aid_level(aid_level: f64) -> Result<(), SimError> {
    if !aid_level.is_finite() || aid_level < 0.0 {
        return Err(SimError::parameter(
            "aid_level",
            format!("{aid_level} must be a nonnegative finite value"),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    /// Nodes susceptible after the final round, never-infected included.
    pub recovered_count: usize,
    /// Index of the final round executed; `None` when no round ran.
    pub rounds_taken: Option<u32>,
    pub stabilized: bool,
    pub metrics: RunMetrics,
}

impl SimulationResult {
    pub fn rounds_executed(&self) -> u32 {
        self.metrics.rounds_executed
    }

    pub fn recovery_rate(&self, node_count: usize) -> f64 {
        if node_count == 0 {
            return 0.0;
        }
        self.recovered_count as f64 / node_count as f64
    }

    pub fn to_report(&self, aid_level: f64, node_count: usize) -> RunReport {
        RunReport {
            aid_level,
            node_count: node_count as u32,
            recovered_count: self.recovered_count as u32,
            rounds_taken: self.rounds_taken,
            rounds_executed: self.metrics.rounds_executed,
            stabilized: self.stabilized,
            activations: self.metrics.activations,
            recoveries: self.metrics.recoveries,
            peak_infected: self.metrics.peak_infected,
            final_infected: self.metrics.final_infected,
        }
    }
}

/// Compute the thresholds for `params.aid_level` and run once.
pub fn simulate_with_aid<R: Rng + ?Sized>(
    view: &NetworkView,
    params: &SimulationParams,
    rng: &mut R,
) -> Result<SimulationResult, SimError> {
    let thresholds = compute_thresholds(view, params.aid_level);
    run(view, &thresholds, params, rng)
}

pub fn run<R: Rng + ?Sized>(
    view: &NetworkView,
    thresholds: &Thresholds,
    params: &SimulationParams,
    rng: &mut R,
) -> Result<SimulationResult, SimError> {
    params.validate(view)?;
    if thresholds.len() != view.len() {
        return Err(SimError::parameter(
            "thresholds",
            format!(
                "computed for {} nodes but the graph has {}",
                thresholds.len(),
                view.len()
            ),
        ));
    }

    let mut states = params.initial_infection.seed_states(view, rng);
    let mut metrics = RunMetrics::seeded(count_infected(&states));
    let recovery_chance = params.recovery_chance();
    let mut rounds_taken = None;
    let mut stabilized = false;

    for round in 0..params.max_iterations {
        let snapshot = states.clone();

        let mut activations = 0;
        for idx in 0..view.len() {
            if snapshot[idx] != NodeState::Susceptible {
                continue;
            }
            let pressure: f64 = view
                .neighbors(idx)
                .iter()
                .filter(|&&neighbor| snapshot[neighbor] == NodeState::Infected)
                .map(|&neighbor| view.weight(neighbor))
                .sum();
            if view.degree(idx) > 0 && pressure >= thresholds.at(idx) {
                states[idx] = NodeState::Infected;
                activations += 1;
            }
        }
        let infected_after_activation = count_infected(&states);

        let mut recoveries = 0;
        for state in states.iter_mut() {
            if *state != NodeState::Infected {
                continue;
            }
            let draw: f64 = rng.gen();
            if draw <= recovery_chance {
                *state = NodeState::Susceptible;
                recoveries += 1;
            }
        }

        let infected_at_end = count_infected(&states);
        metrics.record_round(
            activations,
            infected_after_activation,
            recoveries,
            infected_at_end,
        );
        rounds_taken = Some(round);

        if params.stop_rule == StopRule::UntilStable
            && states == snapshot
            && (infected_at_end == 0 || recovery_chance <= 0.0)
        {
            stabilized = true;
            break;
        }
    }

    let recovered_count = states.len() - count_infected(&states);
    debug!(
        target: "contagion::simulator",
        aid_level = params.aid_level,
        recovered_count,
        rounds_executed = metrics.rounds_executed,
        activations = metrics.activations,
        recoveries = metrics.recoveries,
        peak_infected = metrics.peak_infected,
        stabilized,
        "simulation.run_complete"
    );

    Ok(SimulationResult {
        recovered_count,
        rounds_taken,
        stabilized,
        metrics,
    })
}

fn count_infected(states: &[NodeState]) -> usize {
    states
        .iter()
        .filter(|state| **state == NodeState::Infected)
        .count()
}
