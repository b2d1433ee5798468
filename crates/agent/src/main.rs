//! LinkPulse agent - per-host network-interface health daemon
//!
//! Runs the decision pipeline against a deterministic sample feed and
//! exposes status, ranking and Prometheus metrics over HTTP.

use anyhow::Result;
use linkpulse_lib::{AgentMetrics, LinkAgent, ScenarioGenerator, StructuredLogger, SCENARIO_IFACES};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;
mod sim;

const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // JSON logs with env-driven filtering.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting linkpulse-agent");

    let daemon_config = config::DaemonConfig::load()?;
    info!(
        host = %daemon_config.host_name,
        scenario = %daemon_config.scenario,
        use_ewma = daemon_config.use_ewma,
        "Agent configured"
    );

    let core_config = daemon_config.core_config();
    core_config.validate()?;

    let mut agent = LinkAgent::new(core_config)?;
    for iface in SCENARIO_IFACES {
        agent.ensure_interface(iface);
    }

    let scenario = daemon_config.scenario.parse()?;
    let generator = ScenarioGenerator::new(scenario);

    let metrics = AgentMetrics::new();
    let logger = StructuredLogger::new(&daemon_config.host_name);
    logger.log_startup(AGENT_VERSION, scenario.as_str());

    let state = Arc::new(api::AppState::new(agent, metrics));

    let (shutdown_tx, _) = tokio::sync::broadcast::channel(1);

    let tick_loop = sim::TickLoop::new(
        state.clone(),
        generator,
        Duration::from_secs(daemon_config.tick_interval_secs.max(1)),
        logger.clone(),
    );
    let tick_handle = tokio::spawn(tick_loop.run(shutdown_tx.subscribe()));

    let api_handle = tokio::spawn(api::serve(daemon_config.api_port, state));

    tokio::signal::ctrl_c().await?;
    logger.log_shutdown("SIGINT received");
    let _ = shutdown_tx.send(());
    let _ = tick_handle.await;
    api_handle.abort();

    Ok(())
}
