use anyhow::{Context, Result};
use open_energy_planner::{config, domain, optimizer, report, sweep, telemetry};
use config::Config;
use domain::Scenario;
use optimizer::DispatchOptimizer;
use report::CostBucket;
use serde_json::json;
use strum::IntoEnumIterator;
use telemetry::init_tracing;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cfg = Config::load()?;
    let scenario = Scenario::from_config(&cfg).context("invalid scenario")?;
    let optimizer = DispatchOptimizer::default();

    info!(
        formulation = %scenario.formulation,
        steps = scenario.timeline.len(),
        step_hours = scenario.timeline.step_hours(),
        "starting Open Energy Planner"
    );

    if let Some(sweep_cfg) = &cfg.sweep {
        let outcomes =
            sweep::run_sweep(&optimizer, &scenario, sweep_cfg.parameter, &sweep_cfg.values).await;
        let rows: Vec<_> = outcomes
            .iter()
            .map(|outcome| match &outcome.result {
                Ok(report) => json!({
                    "parameter": outcome.parameter.to_string(),
                    "value": outcome.value,
                    "report": report,
                }),
                Err(err) => {
                    warn!(value = outcome.value, error = %err, "sweep scenario failed");
                    json!({
                        "parameter": outcome.parameter.to_string(),
                        "value": outcome.value,
                        "error": err.to_string(),
                    })
                }
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let report = tokio::task::spawn_blocking(move || optimizer.optimize(&scenario))
        .await
        .context("solve task panicked")??;

    for bucket in CostBucket::iter() {
        info!(%bucket, value = report.costs.get(bucket), "cost");
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
