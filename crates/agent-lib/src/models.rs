//! Core data models for the interface health agent

use serde::{Deserialize, Serialize};
use std::fmt;

/// Quality metrics for one probe of one interface.
///
/// All channels are non-negative; `loss_pct` is a percentage (0-100),
/// not a ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub rtt_ms: f64,
    pub throughput_mbps: f64,
    pub loss_pct: f64,
    pub jitter_ms: f64,
}

/// A metrics reading attributed to an interface at an integer-second timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    pub iface: String,
    pub ts: i64,
    pub metrics: Metrics,
}

/// Operational state of an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    /// Link quality is good and has been confirmed over consecutive ticks
    Healthy,
    /// Quality is reduced, or the link has not yet proven itself
    Degraded,
    /// Sustained bad quality; traffic should avoid this link
    Down,
}

impl LinkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkStatus::Healthy => "healthy",
            LinkStatus::Degraded => "degraded",
            LinkStatus::Down => "down",
        }
    }

    /// Returns true if the link can still carry traffic
    pub fn is_operational(&self) -> bool {
        matches!(self, LinkStatus::Healthy | LinkStatus::Degraded)
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of one interface, overwritten on every recompute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceSnapshot {
    pub iface: String,
    /// Timestamp of the evaluation that produced this snapshot
    pub ts: i64,
    pub status: LinkStatus,
    /// Instantaneous weighted score over the window averages
    pub score_raw: f64,
    /// Exponentially-smoothed score
    pub score_smoothed: f64,
    /// The score the state machine actually saw (after strategy selection
    /// and the low-confidence cap)
    pub score_used: f64,
    /// Fraction of window seconds backed by a valid sample
    pub confidence: f64,
    pub missing_rate: f64,
    pub avg_rtt_ms: f64,
    pub avg_tp_mbps: f64,
    pub avg_loss_pct: f64,
    pub avg_jitter_ms: f64,
}

impl InterfaceSnapshot {
    /// Snapshot for a tracker that has not evaluated anything yet.
    pub(crate) fn initial(iface: impl Into<String>) -> Self {
        Self {
            iface: iface.into(),
            ts: 0,
            status: LinkStatus::Degraded,
            score_raw: 0.0,
            score_smoothed: 0.0,
            score_used: 0.0,
            confidence: 0.0,
            missing_rate: 1.0,
            avg_rtt_ms: 0.0,
            avg_tp_mbps: 0.0,
            avg_loss_pct: 0.0,
            avg_jitter_ms: 0.0,
        }
    }
}

/// Emitted whenever the state machine changes state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub iface: String,
    pub ts: i64,
    pub from: LinkStatus,
    pub to: LinkStatus,
    /// Human-readable diagnostic naming the guard and counter that fired
    pub reason: String,
}

/// One row of the end-of-run ranking, best interface first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedInterface {
    pub iface: String,
    pub avg_score: f64,
    pub last_status: LinkStatus,
}
