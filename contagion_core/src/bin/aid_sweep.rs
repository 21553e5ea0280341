use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use contagion_core::{
    impact_scores, load_sweep_config_from_env, optimize, rank_by_impact, NetworkView, SweepConfig,
};
use contagion_schema::{encode_report_json_pretty, StopRuleKind, SweepReport};

const RANKING_PREVIEW: usize = 5;

#[derive(Parser, Debug)]
#[command(author, version, about = "Sweep aid levels over a contagion network", long_about = None)]
struct Args {
    /// Path to a sweep config JSON file (defaults to AID_SWEEP_CONFIG_PATH or the builtin)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the base seed for graph generation and per-run streams
    #[arg(long)]
    seed: Option<u64>,

    /// Evaluate candidates on the thread pool
    #[arg(long)]
    parallel: bool,

    /// Run every candidate for the full iteration budget
    #[arg(long)]
    fixed_budget: bool,

    /// Override the target recovery rate
    #[arg(long)]
    target: Option<f64>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Summary,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = resolve_config(&args)?;

    let (graph, weights) = config
        .build_graph()
        .context("Failed to build the population graph")?;
    let view = NetworkView::build(&graph, &weights).context("Population graph is invalid")?;

    let scores = impact_scores(&view);
    for (rank, node) in rank_by_impact(&scores)
        .into_iter()
        .take(RANKING_PREVIEW)
        .enumerate()
    {
        info!(
            target: "contagion::aid_sweep",
            rank,
            node,
            score = scores[&node],
            "impact.ranked"
        );
    }

    let request = config
        .to_request()
        .context("Sweep configuration is invalid")?;
    let result = optimize(&view, &request).context("Aid sweep failed")?;
    let report = result.to_report(view.summary(), &request);

    match args.format {
        OutputFormat::Json => {
            let json = encode_report_json_pretty(&report).context("Failed to encode report")?;
            println!("{json}");
        }
        OutputFormat::Summary => print_summary(&report),
    }
    Ok(())
}

fn resolve_config(args: &Args) -> Result<SweepConfig> {
    let mut config = match &args.config {
        Some(path) => SweepConfig::from_file(path)
            .with_context(|| format!("Failed to load sweep config at {}", path.display()))?,
        None => {
            let (config, metadata) = load_sweep_config_from_env();
            info!(
                target: "contagion::aid_sweep",
                source = ?metadata.path(),
                "sweep_config.resolved"
            );
            (*config).clone()
        }
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.parallel {
        config.parallel = true;
    }
    if args.fixed_budget {
        config.stop_rule = StopRuleKind::FixedBudget;
    }
    if let Some(target) = args.target {
        config.target_recovery_rate = target;
    }
    Ok(config)
}

fn print_summary(report: &SweepReport) {
    println!(
        "Graph: {} nodes, {} edges, mean degree {:.2}",
        report.graph.node_count, report.graph.edge_count, report.graph.mean_degree
    );
    println!(
        "Target recovery rate {:.2}, stop rule {}, budget {} rounds",
        report.settings.target_recovery_rate,
        report.settings.stop_rule.as_str(),
        report.settings.max_iterations
    );
    for candidate in &report.candidates {
        let rounds = candidate
            .run
            .rounds_taken
            .map_or_else(|| "-".to_string(), |round| round.to_string());
        println!(
            "  aid {:>6.3}  recovered {:>5.1}%  final round {:>4}  {}",
            candidate.run.aid_level,
            candidate.run.recovery_rate() * 100.0,
            rounds,
            if candidate.meets_target { "meets target" } else { "" }
        );
    }
    match &report.best {
        Some(best) => println!(
            "Optimal aid level: {:.3}, final round index {}",
            best.aid_level, best.rounds_taken
        ),
        None => println!("Optimal aid level: none found"),
    }
}
