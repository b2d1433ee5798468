//! Simulated sample source and tick loop
//!
//! Advances the shared agent once per tick interval: clock first, then
//! the tick's samples, then the per-tick accounting, exactly the order
//! the core contracts on.

use crate::api::AppState;
use linkpulse_lib::{ScenarioGenerator, StructuredLogger, SCENARIO_IFACES};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, Instant};
use tracing::info;

/// Drives the agent from a deterministic scenario feed.
pub struct TickLoop {
    state: Arc<AppState>,
    generator: ScenarioGenerator,
    tick_interval: Duration,
    logger: StructuredLogger,
}

impl TickLoop {
    pub fn new(
        state: Arc<AppState>,
        generator: ScenarioGenerator,
        tick_interval: Duration,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            state,
            generator,
            tick_interval,
            logger,
        }
    }

    /// Run until the shutdown signal arrives.
    pub async fn run(self, mut shutdown: tokio::sync::broadcast::Receiver<()>) {
        info!(
            interval_secs = self.tick_interval.as_secs(),
            scenario = %self.generator.id(),
            "Starting tick loop"
        );

        let mut ticker = interval(self.tick_interval);
        let mut t: i64 = 0;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.step(t).await;
                    t += 1;
                }
                _ = shutdown.recv() => {
                    info!("Shutting down tick loop");
                    break;
                }
            }
        }
    }

    async fn step(&self, t: i64) {
        let start = Instant::now();
        let metrics = &self.state.metrics;

        let mut agent = self.state.agent.write().await;
        agent.note_time(t);

        for iface in SCENARIO_IFACES {
            let Some(sample) = self.generator.sample(iface, t) else {
                continue;
            };
            if agent.ingest(iface, sample.ts, sample.metrics) {
                metrics.inc_samples_ingested();
            } else {
                metrics.inc_samples_rejected();
            }
        }

        let transitions = agent.drain_transitions();
        agent.record_tick();

        metrics.inc_ticks();
        metrics.inc_transitions(transitions.len() as u64);
        metrics.set_interfaces_monitored(agent.interface_count() as i64);
        for snap in agent.snapshots() {
            metrics.set_score(&snap.iface, snap.score_used);
        }
        drop(agent);

        for ev in &transitions {
            self.logger.log_transition(ev);
        }

        if t == 0 {
            *self.state.ready.write().await = true;
        }

        metrics.observe_tick_latency(start.elapsed().as_secs_f64());
    }
}
