use ahash::RandomState;
use serde::{Deserialize, Serialize};
use std::hash::{BuildHasher, Hasher};

pub const REPORT_VERSION: u16 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportHeader {
    pub version: u16,
    pub hash: u64,
}

impl Default for ReportHeader {
    fn default() -> Self {
        Self {
            version: REPORT_VERSION,
            hash: 0,
        }
    }
}

/// Wire form of the simulator's termination rule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StopRuleKind {
    #[default]
    FixedBudget,
    UntilStable,
}

impl StopRuleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StopRuleKind::FixedBudget => "fixed_budget",
            StopRuleKind::UntilStable => "until_stable",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GraphSummary {
    pub node_count: u32,
    pub edge_count: u32,
    pub isolated_count: u32,
    pub mean_degree: f64,
    pub total_weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepSettings {
    pub initial_infected_fraction: Option<f64>,
    pub seeded_nodes: Vec<u32>,
    pub base_recovery_chance: f64,
    pub max_iterations: u32,
    pub target_recovery_rate: f64,
    pub stop_rule: StopRuleKind,
    pub parallel: bool,
    pub seed: u64,
}

/// Outcome of a single simulator run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    pub aid_level: f64,
    pub node_count: u32,
    pub recovered_count: u32,
    /// Index of the final round executed; absent when no round ran.
    pub rounds_taken: Option<u32>,
    pub rounds_executed: u32,
    pub stabilized: bool,
    pub activations: u64,
    pub recoveries: u64,
    pub peak_infected: u32,
    /// Infected nodes left after the final round.
    pub final_infected: u32,
}

impl RunReport {
    pub fn recovery_rate(&self) -> f64 {
        if self.node_count == 0 {
            return 0.0;
        }
        self.recovered_count as f64 / self.node_count as f64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateReport {
    pub index: u32,
    pub meets_target: bool,
    pub run: RunReport,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BestAidReport {
    pub candidate_index: u32,
    pub aid_level: f64,
    pub rounds_taken: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepReport {
    pub header: ReportHeader,
    pub graph: GraphSummary,
    pub settings: SweepSettings,
    pub candidates: Vec<CandidateReport>,
    pub best: Option<BestAidReport>,
}

impl SweepReport {
    pub fn new(
        graph: GraphSummary,
        settings: SweepSettings,
        candidates: Vec<CandidateReport>,
        best: Option<BestAidReport>,
    ) -> Self {
        Self {
            header: ReportHeader::default(),
            graph,
            settings,
            candidates,
            best,
        }
    }

    /// Stamp the header with the content hash.
    pub fn finalize(mut self) -> Self {
        self.header.hash = hash_report(&self);
        self
    }

    pub fn qualifying_count(&self) -> usize {
        self.candidates
            .iter()
            .filter(|candidate| candidate.meets_target)
            .count()
    }
}

pub fn hash_report(report: &SweepReport) -> u64 {
    let mut clone = report.clone();
    clone.header.hash = 0;
    let encoded = bincode::serialize(&clone).expect("report serialization for hashing");
    let mut hasher = RandomState::with_seeds(0, 0, 0, 0).build_hasher();
    hasher.write(&encoded);
    hasher.finish()
}

pub fn encode_report(report: &SweepReport) -> bincode::Result<Vec<u8>> {
    bincode::serialize(report)
}

pub fn decode_report(data: &[u8]) -> bincode::Result<SweepReport> {
    bincode::deserialize(data)
}

pub fn encode_report_json(report: &SweepReport) -> serde_json::Result<String> {
    serde_json::to_string(report)
}

pub fn encode_report_json_pretty(report: &SweepReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

pub fn decode_report_json(data: &str) -> serde_json::Result<SweepReport> {
    serde_json::from_str(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_run(aid_level: f64, recovered_count: u32) -> RunReport {
        RunReport {
            aid_level,
            node_count: 10,
            recovered_count,
            rounds_taken: Some(4),
            rounds_executed: 5,
            stabilized: true,
            activations: 3,
            recoveries: 4,
            peak_infected: 2,
            final_infected: 10 - recovered_count,
        }
    }

    fn sample_report() -> SweepReport {
        SweepReport::new(
            GraphSummary {
                node_count: 10,
                edge_count: 12,
                isolated_count: 1,
                mean_degree: 2.4,
                total_weight: 3.0,
            },
            SweepSettings {
                initial_infected_fraction: Some(0.1),
                seeded_nodes: Vec::new(),
                base_recovery_chance: 0.05,
                max_iterations: 100,
                target_recovery_rate: 0.8,
                stop_rule: StopRuleKind::UntilStable,
                parallel: false,
                seed: 7,
            },
            vec![
                CandidateReport {
                    index: 0,
                    meets_target: false,
                    run: sample_run(0.0, 6),
                },
                CandidateReport {
                    index: 1,
                    meets_target: true,
                    run: sample_run(0.1, 9),
                },
            ],
            Some(BestAidReport {
                candidate_index: 1,
                aid_level: 0.1,
                rounds_taken: 4,
            }),
        )
    }

    #[test]
    fn finalize_hash_ignores_previous_header_hash() {
        let report = sample_report().finalize();
        assert_ne!(report.header.hash, 0);
        assert_eq!(report.header.hash, hash_report(&report));
    }

    #[test]
    fn hash_changes_with_content() {
        let base = sample_report().finalize();
        let mut altered = sample_report();
        altered.candidates[0].run.recovered_count = 7;
        let altered = altered.finalize();
        assert_ne!(base.header.hash, altered.header.hash);
    }

    #[test]
    fn bincode_and_json_preserve_report() {
        let report = sample_report().finalize();
        let bytes = encode_report(&report).expect("encode bincode");
        assert_eq!(decode_report(&bytes).expect("decode bincode"), report);

        let json = encode_report_json(&report).expect("encode json");
        assert!(json.contains("\"stop_rule\":\"until_stable\""));
        let decoded = decode_report_json(&json).expect("decode json");
        assert_eq!(decoded.header, report.header);
        assert_eq!(decoded.candidates.len(), 2);
        assert_eq!(decoded.best.map(|best| best.candidate_index), Some(1));
    }

    #[test]
    fn recovery_rate_handles_empty_population() {
        let mut run = sample_run(0.0, 0);
        run.node_count = 0;
        assert_eq!(run.recovery_rate(), 0.0);
        assert_eq!(sample_run(0.0, 8).recovery_rate(), 0.8);
        assert_eq!(sample_report().qualifying_count(), 1);
    }
}
