use anyhow::Result;
use contagion_core::{
    optimize, ImpactRanker, NetworkView, NodeRanker, SimError, StopRule, SweepConfig,
};
use contagion_schema::{decode_report, encode_report, encode_report_json, StopRuleKind};

#[test]
fn builtin_sweep_runs_end_to_end() -> Result<()> {
    let config = SweepConfig::builtin();
    let (graph, weights) = config.build_graph()?;
    let view = NetworkView::build(&graph, &weights)?;
    assert_eq!(view.len(), 100);

    let ranking = ImpactRanker.rank(&view);
    assert_eq!(ranking.len(), 100);

    let request = config.to_request()?;
    assert_eq!(request.stop_rule, StopRule::UntilStable);
    let result = optimize(&view, &request)?;
    assert_eq!(result.evaluations.len(), 21);
    for outcome in &result.evaluations {
        let rounds = outcome.result.rounds_taken.expect("every run executes a round");
        assert!(rounds < request.max_iterations);
        assert!((0.0..=1.0).contains(&outcome.recovery_rate));
    }

    let report = result.to_report(view.summary(), &request);
    assert_eq!(report.settings.stop_rule, StopRuleKind::UntilStable);
    let bytes = encode_report(&report)?;
    assert_eq!(decode_report(&bytes)?, report);
    let json = encode_report_json(&report)?;
    assert!(json.contains("\"candidates\""));
    Ok(())
}

#[test]
fn invalid_config_aborts_before_any_run() -> Result<()> {
    let config = SweepConfig::from_json_str(r#"{ "target_recovery_rate": 1.5 }"#)?;
    let (graph, weights) = config.build_graph()?;
    let view = NetworkView::build(&graph, &weights)?;
    let err = optimize(&view, &config.to_request()?).unwrap_err();
    assert!(matches!(
        err,
        SimError::InvalidParameter {
            name: "target_recovery_rate",
            ..
        }
    ));
    Ok(())
}
