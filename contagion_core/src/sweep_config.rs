//! Configuration for an aid sweep.
//!
//! Loaded from `sweep_config.json` with support for an environment variable
//! override.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use contagion_schema::StopRuleKind;

use crate::{
    error::SimError,
    generators::{erdos_renyi, ring},
    graph::{Graph, NodeId, NodeWeights},
    optimizer::{
        aid_range, ExecutionMode, OptimizationRequest, DEFAULT_SWEEP_SEED,
        DEFAULT_TARGET_RECOVERY_RATE,
    },
    simulator::{
        InitialInfection, DEFAULT_BASE_RECOVERY_CHANCE, DEFAULT_INITIAL_INFECTED_FRACTION,
        DEFAULT_MAX_ITERATIONS,
    },
};

pub const BUILTIN_SWEEP_CONFIG: &str = include_str!("data/sweep_config.json");
pub const SWEEP_CONFIG_ENV: &str = "AID_SWEEP_CONFIG_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub initial_infected_fraction: f64,
    /// Explicit starting infections; overrides the fraction when present.
    pub initial_infected_nodes: Option<Vec<NodeId>>,
    pub base_recovery_chance: f64,
    pub max_iterations: u32,
    pub candidate_aid_levels: AidLevels,
    pub target_recovery_rate: f64,
    pub stop_rule: StopRuleKind,
    pub parallel: bool,
    pub seed: u64,
    pub graph: GraphConfig,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            initial_infected_fraction: DEFAULT_INITIAL_INFECTED_FRACTION,
            initial_infected_nodes: None,
            base_recovery_chance: DEFAULT_BASE_RECOVERY_CHANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            candidate_aid_levels: AidLevels::default(),
            target_recovery_rate: DEFAULT_TARGET_RECOVERY_RATE,
            stop_rule: StopRuleKind::UntilStable,
            parallel: false,
            seed: DEFAULT_SWEEP_SEED,
            graph: GraphConfig::default(),
        }
    }
}

impl SweepConfig {
    pub fn builtin() -> Arc<Self> {
        Arc::new(
            serde_json::from_str(BUILTIN_SWEEP_CONFIG)
                .expect("builtin sweep config should parse"),
        )
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, SweepConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| SweepConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = SweepConfig::from_json_str(&contents)?;
        Ok(config)
    }

    pub fn initial_infection(&self) -> InitialInfection {
        match &self.initial_infected_nodes {
            Some(nodes) => InitialInfection::Nodes(nodes.clone()),
            None => InitialInfection::Fraction(self.initial_infected_fraction),
        }
    }

    pub fn to_request(&self) -> Result<OptimizationRequest, SimError> {
        Ok(OptimizationRequest {
            candidate_aid_levels: self.candidate_aid_levels.resolve()?,
            target_recovery_rate: self.target_recovery_rate,
            base_recovery_chance: self.base_recovery_chance,
            max_iterations: self.max_iterations,
            initial_infection: self.initial_infection(),
            stop_rule: self.stop_rule.into(),
            seed: self.seed,
            execution: if self.parallel {
                ExecutionMode::Parallel
            } else {
                ExecutionMode::Sequential
            },
        })
    }

    /// Graph and weights for this sweep; random graphs draw from `seed`.
    pub fn build_graph(&self) -> Result<(Graph, NodeWeights), SimError> {
        match self.graph {
            GraphConfig::ErdosRenyi {
                nodes,
                edge_probability,
                weight_min,
                weight_max,
            } => {
                let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
                erdos_renyi(nodes, edge_probability, weight_min, weight_max, &mut rng)
            }
            GraphConfig::Ring { nodes, weight } => Ok(ring(nodes, weight)),
        }
    }
}

/// Either an explicit ordered list or an inclusive stepped range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AidLevels {
    List(Vec<f64>),
    Range { start: f64, end: f64, step: f64 },
}

impl Default for AidLevels {
    fn default() -> Self {
        AidLevels::Range {
            start: 0.0,
            end: 0.2,
            step: 0.01,
        }
    }
}

impl AidLevels {
    pub fn resolve(&self) -> Result<Vec<f64>, SimError> {
        match self {
            AidLevels::List(levels) => Ok(levels.clone()),
            AidLevels::Range { start, end, step } => aid_range(*start, *end, *step),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GraphConfig {
    ErdosRenyi {
        nodes: u32,
        edge_probability: f64,
        weight_min: f64,
        weight_max: f64,
    },
    Ring {
        nodes: u32,
        weight: f64,
    },
}

impl Default for GraphConfig {
    fn default() -> Self {
        GraphConfig::ErdosRenyi {
            nodes: 100,
            edge_probability: 0.05,
            weight_min: 0.1,
            weight_max: 0.5,
        }
    }
}

#[derive(Debug, Error)]
pub enum SweepConfigError {
    #[error("failed to parse sweep config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read sweep config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where the active sweep configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfigMetadata {
    path: Option<PathBuf>,
}

impl SweepConfigMetadata {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }
}

/// Load the sweep configuration from `AID_SWEEP_CONFIG_PATH` or the default
/// path, falling back to the builtin copy.
pub fn load_sweep_config_from_env() -> (Arc<SweepConfig>, SweepConfigMetadata) {
    let override_path = env::var(SWEEP_CONFIG_ENV).ok().map(PathBuf::from);
    let default_path =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src/data/sweep_config.json");

    let path = override_path.unwrap_or(default_path);
    match SweepConfig::from_file(&path) {
        Ok(config) => {
            tracing::info!(
                target: "contagion::config",
                path = %path.display(),
                "sweep_config.loaded=file"
            );
            return (Arc::new(config), SweepConfigMetadata::new(Some(path)));
        }
        Err(err) => {
            tracing::warn!(
                target: "contagion::config",
                path = %path.display(),
                error = %err,
                "sweep_config.load_failed"
            );
        }
    }

    let config = SweepConfig::builtin();
    tracing::info!(target: "contagion::config", "sweep_config.loaded=builtin");
    (config, SweepConfigMetadata::new(None))
}
