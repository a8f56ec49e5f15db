//! `verdict run`: simulate, aggregate, score

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use verdict_config::{Validatable, VerdictConfig};
use verdict_execution::{RunPlan, SessionOrchestrator, SyntheticExecutor};
use verdict_scoring::{summarize, summarize_resources, MetricSource, RunMetrics, Scorecard};

use crate::cli::{OutputFormat, RunArgs};
use crate::report::{findings_by_category, render_summary, Observations, RunReport};

/// Apply command line overrides on top of the loaded configuration
pub fn apply_overrides(config: &mut VerdictConfig, args: &RunArgs) -> Result<()> {
    if let Some(sessions) = args.sessions {
        config.load.session_count = sessions;
    }
    if let Some(concurrency) = args.concurrency {
        config.load.concurrency_limit = concurrency;
    }
    if let Some(seed) = args.seed {
        config.load.seed = Some(seed);
    }

    config
        .load
        .validate()
        .context("Invalid run options")?;
    Ok(())
}

/// Run the configured workload against the synthetic executor and build the report
pub async fn build_report(config: &VerdictConfig, args: &RunArgs) -> Result<RunReport> {
    let observations = match &args.observations {
        Some(path) => Observations::from_file(path)?,
        None => Observations::default(),
    };

    let executor = Arc::new(SyntheticExecutor::from_config(
        &config.synthetic,
        config.load.seed,
    ));
    let orchestrator = SessionOrchestrator::new(executor);
    let output = orchestrator
        .execute(&config.catalog.scenarios, &RunPlan::from(&config.load))
        .await
        .context("Load run refused to start")?;

    let load = if output.sessions.is_empty() {
        None
    } else {
        Some(summarize(&output.sessions, output.wall_clock_secs())?)
    };
    let resources = summarize_resources(&output.samples);

    let registry = observations.registry();
    let metrics = load.as_ref().map(|load| RunMetrics {
        load,
        resources: resources.as_ref(),
    });

    let scorecard = Scorecard::evaluate(
        &config.scoring,
        &registry,
        metrics.as_ref().map(|m| m as &dyn MetricSource),
        &observations.measurements,
    )
    .context("Scoring configuration does not match the scored categories")?;

    info!(
        run_id = %output.run_id,
        overall = scorecard.composite.overall,
        readiness = %scorecard.composite.readiness,
        "Run scored"
    );

    Ok(RunReport {
        run_id: output.run_id,
        started_at: output.started_at,
        seed: output.seed,
        wall_clock_secs: output.wall_clock_secs(),
        load,
        resources,
        findings: findings_by_category(&registry),
        scorecard,
        sessions: args.include_sessions.then_some(output.sessions),
    })
}

/// Render a report in the requested format
pub fn render(report: &RunReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(report).context("Failed to serialize report to YAML")
        }
        OutputFormat::Summary => Ok(render_summary(report)),
    }
}

pub async fn handle_run(mut config: VerdictConfig, args: &RunArgs) -> Result<()> {
    apply_overrides(&mut config, args)?;
    let report = build_report(&config, args).await?;
    println!("{}", render(&report, args.output)?);
    Ok(())
}
