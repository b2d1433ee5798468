//! Observability infrastructure
//!
//! Provides:
//! - Prometheus metrics for the tick loop (ingest/reject counters,
//!   transition counter, per-interface score gauges, tick latency)
//! - Structured event logging with tracing

use crate::models::{RankedInterface, TransitionEvent};
use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, register_int_gauge, GaugeVec,
    Histogram, IntCounter, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for tick latency (seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.000001, 0.000005, 0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<AgentMetricsInner> = OnceLock::new();

struct AgentMetricsInner {
    ticks_total: IntCounter,
    samples_ingested_total: IntCounter,
    samples_rejected_total: IntCounter,
    transitions_total: IntCounter,
    interfaces_monitored: IntGauge,
    score_used: GaugeVec,
    tick_latency_seconds: Histogram,
}

impl AgentMetricsInner {
    fn new() -> Self {
        Self {
            ticks_total: register_int_counter!(
                "linkpulse_ticks_total",
                "Total simulated seconds processed"
            )
            .expect("Failed to register ticks_total"),

            samples_ingested_total: register_int_counter!(
                "linkpulse_samples_ingested_total",
                "Samples accepted into a rolling window"
            )
            .expect("Failed to register samples_ingested_total"),

            samples_rejected_total: register_int_counter!(
                "linkpulse_samples_rejected_total",
                "Samples dropped for being older than the window"
            )
            .expect("Failed to register samples_rejected_total"),

            transitions_total: register_int_counter!(
                "linkpulse_transitions_total",
                "Interface status transitions emitted"
            )
            .expect("Failed to register transitions_total"),

            interfaces_monitored: register_int_gauge!(
                "linkpulse_interfaces_monitored",
                "Number of interfaces currently tracked"
            )
            .expect("Failed to register interfaces_monitored"),

            score_used: register_gauge_vec!(
                "linkpulse_score_used",
                "Latest decision score per interface",
                &["iface"]
            )
            .expect("Failed to register score_used"),

            tick_latency_seconds: register_histogram!(
                "linkpulse_tick_latency_seconds",
                "Wall time spent processing one tick",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register tick_latency_seconds"),
        }
    }
}

/// Lightweight handle to the global Prometheus metrics.
///
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct AgentMetrics {
    _private: (),
}

impl Default for AgentMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(AgentMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &AgentMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn inc_ticks(&self) {
        self.inner().ticks_total.inc();
    }

    pub fn inc_samples_ingested(&self) {
        self.inner().samples_ingested_total.inc();
    }

    pub fn inc_samples_rejected(&self) {
        self.inner().samples_rejected_total.inc();
    }

    pub fn inc_transitions(&self, n: u64) {
        self.inner().transitions_total.inc_by(n);
    }

    pub fn set_interfaces_monitored(&self, count: i64) {
        self.inner().interfaces_monitored.set(count);
    }

    pub fn set_score(&self, iface: &str, score: f64) {
        self.inner().score_used.with_label_values(&[iface]).set(score);
    }

    pub fn observe_tick_latency(&self, duration_secs: f64) {
        self.inner().tick_latency_seconds.observe(duration_secs);
    }
}

/// Structured logger for agent events
///
/// Consistent field-structured logging for transitions and lifecycle
/// events, keyed by host name.
#[derive(Clone)]
pub struct StructuredLogger {
    host: String,
}

impl StructuredLogger {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }

    pub fn log_startup(&self, version: &str, scenario: &str) {
        info!(
            event = "agent_started",
            host = %self.host,
            agent_version = %version,
            scenario = %scenario,
            "Interface health agent started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "agent_shutdown",
            host = %self.host,
            reason = %reason,
            "Interface health agent shutting down"
        );
    }

    /// Transitions into Down are warnings; everything else is informational.
    pub fn log_transition(&self, ev: &TransitionEvent) {
        use crate::models::LinkStatus;
        if ev.to == LinkStatus::Down {
            warn!(
                event = "link_transition",
                host = %self.host,
                iface = %ev.iface,
                ts = ev.ts,
                from = %ev.from,
                to = %ev.to,
                reason = %ev.reason,
                "Interface went down"
            );
        } else {
            info!(
                event = "link_transition",
                host = %self.host,
                iface = %ev.iface,
                ts = ev.ts,
                from = %ev.from,
                to = %ev.to,
                reason = %ev.reason,
                "Interface changed status"
            );
        }
    }

    pub fn log_run_summary(&self, ranked: &[RankedInterface]) {
        for (position, item) in ranked.iter().enumerate() {
            info!(
                event = "run_summary",
                host = %self.host,
                rank = position + 1,
                iface = %item.iface,
                avg_score = item.avg_score,
                last_status = %item.last_status,
                "Run summary entry"
            );
        }
    }
}
