//! Exhaustive sweep over candidate aid levels.
//!
//! Every candidate gets one simulator run with its own ChaCha stream seeded
//! from `(seed, candidate_index)`. The winner is the candidate that meets the
//! recovery target with the lowest final round index; ties go to the earlier
//! candidate. Sequential and parallel execution select the same winner.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info};

use contagion_schema::{BestAidReport, CandidateReport, GraphSummary, SweepReport, SweepSettings};

use crate::{
    error::{GraphError, SimError},
    graph::NetworkView,
    hashing::derive_run_seed,
    simulator::{
        simulate_with_aid, validate_aid_level, InitialInfection, SimulationParams,
        SimulationResult, StopRule, DEFAULT_BASE_RECOVERY_CHANCE, DEFAULT_MAX_ITERATIONS,
    },
};

pub const DEFAULT_TARGET_RECOVERY_RATE: f64 = 0.8;
pub const DEFAULT_SWEEP_SEED: u64 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    #[default]
    Sequential,
    Parallel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationRequest {
    pub candidate_aid_levels: Vec<f64>,
    pub target_recovery_rate: f64,
    pub base_recovery_chance: f64,
    pub max_iterations: u32,
    pub initial_infection: InitialInfection,
    pub stop_rule: StopRule,
    pub seed: u64,
    pub execution: ExecutionMode,
}

impl Default for OptimizationRequest {
    fn default() -> Self {
        Self {
            candidate_aid_levels: default_aid_levels(),
            target_recovery_rate: DEFAULT_TARGET_RECOVERY_RATE,
            base_recovery_chance: DEFAULT_BASE_RECOVERY_CHANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            initial_infection: InitialInfection::default(),
            stop_rule: StopRule::UntilStable,
            seed: DEFAULT_SWEEP_SEED,
            execution: ExecutionMode::Sequential,
        }
    }
}

impl OptimizationRequest {
    fn base_params(&self) -> SimulationParams {
        SimulationParams {
            base_recovery_chance: self.base_recovery_chance,
            aid_level: 0.0,
            max_iterations: self.max_iterations,
            initial_infection: self.initial_infection.clone(),
            stop_rule: self.stop_rule,
        }
    }

    pub fn validate(&self, view: &NetworkView) -> Result<(), SimError> {
        if view.is_empty() {
            return Err(GraphError::Empty.into());
        }
        if !(0.0..=1.0).contains(&self.target_recovery_rate) {
            return Err(SimError::parameter(
                "target_recovery_rate",
                format!("{} is outside [0, 1]", self.target_recovery_rate),
            ));
        }
        if self.candidate_aid_levels.is_empty() {
            return Err(SimError::parameter(
                "candidate_aid_levels",
                "at least one candidate is required",
            ));
        }
        if self.max_iterations == 0 {
            return Err(SimError::parameter(
                "max_iterations",
                "a sweep needs at least one round per run",
            ));
        }
        for &aid_level in &self.candidate_aid_levels {
            validate_aid_level(aid_level)?;
        }
        self.base_params().validate(view)
    }

    pub fn settings(&self) -> SweepSettings {
        let (initial_infected_fraction, seeded_nodes) = match &self.initial_infection {
            InitialInfection::Fraction(fraction) => (Some(*fraction), Vec::new()),
            InitialInfection::Nodes(nodes) => (None, nodes.clone()),
        };
        SweepSettings {
            initial_infected_fraction,
            seeded_nodes,
            base_recovery_chance: self.base_recovery_chance,
            max_iterations: self.max_iterations,
            target_recovery_rate: self.target_recovery_rate,
            stop_rule: self.stop_rule.into(),
            parallel: self.execution == ExecutionMode::Parallel,
            seed: self.seed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateOutcome {
    pub index: usize,
    pub aid_level: f64,
    pub recovery_rate: f64,
    pub meets_target: bool,
    pub result: SimulationResult,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestAid {
    pub candidate_index: usize,
    pub aid_level: f64,
    pub rounds_taken: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    /// `None` when no candidate met the target.
    pub best: Option<BestAid>,
    /// One entry per candidate, in candidate order.
    pub evaluations: Vec<CandidateOutcome>,
}

impl OptimizationResult {
    pub fn best_aid_level(&self) -> Option<f64> {
        self.best.map(|best| best.aid_level)
    }

    pub fn best_rounds(&self) -> Option<u32> {
        self.best.map(|best| best.rounds_taken)
    }

    pub fn to_report(&self, graph: GraphSummary, request: &OptimizationRequest) -> SweepReport {
        let node_count = graph.node_count as usize;
        let candidates = self
            .evaluations
            .iter()
            .map(|outcome| CandidateReport {
                index: outcome.index as u32,
                meets_target: outcome.meets_target,
                run: outcome.result.to_report(outcome.aid_level, node_count),
            })
            .collect();
        let best = self.best.map(|best| BestAidReport {
            candidate_index: best.candidate_index as u32,
            aid_level: best.aid_level,
            rounds_taken: best.rounds_taken,
        });
        SweepReport::new(graph, request.settings(), candidates, best).finalize()
    }
}

pub fn optimize(
    view: &NetworkView,
    request: &OptimizationRequest,
) -> Result<OptimizationResult, SimError> {
    request.validate(view)?;

    info!(
        target: "contagion::optimizer",
        nodes = view.len(),
        candidates = request.candidate_aid_levels.len(),
        target = request.target_recovery_rate,
        max_iterations = request.max_iterations,
        mode = ?request.execution,
        "optimizer.sweep_started"
    );

    let base = request.base_params();
    let result = match request.execution {
        ExecutionMode::Sequential => sweep_sequential(view, request, &base)?,
        ExecutionMode::Parallel => sweep_parallel(view, request, &base)?,
    };

    match result.best {
        Some(best) => info!(
            target: "contagion::optimizer",
            aid_level = best.aid_level,
            rounds_taken = best.rounds_taken,
            candidate = best.candidate_index,
            "optimizer.best_found"
        ),
        None => info!(target: "contagion::optimizer", "optimizer.best_found=none"),
    }
    Ok(result)
}

fn evaluate_candidate(
    view: &NetworkView,
    request: &OptimizationRequest,
    base: &SimulationParams,
    index: usize,
) -> Result<CandidateOutcome, SimError> {
    let aid_level = request.candidate_aid_levels[index];
    let mut rng = ChaCha8Rng::seed_from_u64(derive_run_seed(request.seed, index));
    let result = simulate_with_aid(view, &base.with_aid(aid_level), &mut rng)?;
    let recovery_rate = result.recovery_rate(view.len());
    let meets_target = recovery_rate >= request.target_recovery_rate;
    debug!(
        target: "contagion::optimizer",
        index,
        aid_level,
        recovery_rate,
        rounds_taken = ?result.rounds_taken,
        meets_target,
        "optimizer.candidate_evaluated"
    );
    Ok(CandidateOutcome {
        index,
        aid_level,
        recovery_rate,
        meets_target,
        result,
    })
}

fn sweep_sequential(
    view: &NetworkView,
    request: &OptimizationRequest,
    base: &SimulationParams,
) -> Result<OptimizationResult, SimError> {
    let mut best_rounds = request.max_iterations;
    let mut best = None;
    let mut evaluations = Vec::with_capacity(request.candidate_aid_levels.len());

    for index in 0..request.candidate_aid_levels.len() {
        let outcome = evaluate_candidate(view, request, base, index)?;
        if let (true, Some(rounds)) = (outcome.meets_target, outcome.result.rounds_taken) {
            if rounds < best_rounds {
                best_rounds = rounds;
                best = Some(BestAid {
                    candidate_index: index,
                    aid_level: outcome.aid_level,
                    rounds_taken: rounds,
                });
            }
        }
        evaluations.push(outcome);
    }

    Ok(OptimizationResult { best, evaluations })
}

fn sweep_parallel(
    view: &NetworkView,
    request: &OptimizationRequest,
    base: &SimulationParams,
) -> Result<OptimizationResult, SimError> {
    let evaluations: Vec<CandidateOutcome> = (0..request.candidate_aid_levels.len())
        .into_par_iter()
        .map(|index| evaluate_candidate(view, request, base, index))
        .collect::<Result<_, _>>()?;

    let best = evaluations
        .par_iter()
        .filter(|outcome| outcome.meets_target)
        .filter_map(|outcome| {
            let rounds = outcome.result.rounds_taken?;
            (rounds < request.max_iterations).then_some(BestAid {
                candidate_index: outcome.index,
                aid_level: outcome.aid_level,
                rounds_taken: rounds,
            })
        })
        .reduce_with(|a, b| {
            if (a.rounds_taken, a.candidate_index) <= (b.rounds_taken, b.candidate_index) {
                a
            } else {
                b
            }
        });

    Ok(OptimizationResult { best, evaluations })
}

pub const MAX_AID_RANGE_STEPS: usize = 1_000_000;

/// Inclusive stepped aid levels, `start, start + step, ..., end`.
pub fn aid_range(start: f64, end: f64, step: f64) -> Result<Vec<f64>, SimError> {
    validate_aid_level(start)?;
    if !end.is_finite() || end < start {
        return Err(SimError::parameter(
            "aid_range",
            format!("end {end} must be finite and not below start {start}"),
        ));
    }
    if !step.is_finite() || step <= 0.0 {
        return Err(SimError::parameter(
            "aid_range",
            format!("step {step} must be positive"),
        ));
    }
    // Nudge so that an end that is an exact multiple of step survives rounding.
    let steps = ((end - start) / step + 1e-9).floor();
    if !steps.is_finite() || steps > MAX_AID_RANGE_STEPS as f64 {
        return Err(SimError::parameter(
            "aid_range",
            format!("step {step} yields more than {MAX_AID_RANGE_STEPS} candidates"),
        ));
    }
    let steps = steps as usize;
    Ok((0..=steps).map(|i| start + i as f64 * step).collect())
}

/// `0.00, 0.01, ..., 0.20`.
pub fn default_aid_levels() -> Vec<f64> {
    (0..=20).map(|i| i as f64 * 0.01).collect()
}
