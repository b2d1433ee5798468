//! Interface registry and tick fan-out
//!
//! The agent owns one tracker per interface name and is the single entry
//! point the host loop drives. Within one tick the host must call
//! `note_time`, then any `ingest`s, then `record_tick`; the agent's
//! methods assume that order. Iteration is over a BTreeMap so fan-out
//! order, and therefore output, is identical across runs.

use crate::config::AgentConfig;
use crate::models::{InterfaceSnapshot, Metrics, RankedInterface, TransitionEvent};
use crate::tracker::InterfaceTracker;
use anyhow::Result;
use std::cmp::Ordering;
use std::collections::BTreeMap;

struct IfaceEntry {
    tracker: InterfaceTracker,
    score_sum: f64,
    score_count: u64,
}

/// Registry of per-interface trackers, advanced by caller-controlled
/// ticks. Single-threaded and synchronous; it never blocks and never
/// spawns anything.
pub struct LinkAgent {
    cfg: AgentConfig,
    entries: BTreeMap<String, IfaceEntry>,
    pending: Vec<TransitionEvent>,
}

impl LinkAgent {
    /// Validates the configuration and builds an empty registry.
    pub fn new(cfg: AgentConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            entries: BTreeMap::new(),
            pending: Vec::new(),
        })
    }

    pub fn config(&self) -> &AgentConfig {
        &self.cfg
    }

    /// Register an interface. Idempotent; re-registering an existing name
    /// does nothing.
    pub fn ensure_interface(&mut self, iface: &str) {
        if self.entries.contains_key(iface) {
            return;
        }
        tracing::debug!(iface, "registering interface");
        self.entries.insert(
            iface.to_string(),
            IfaceEntry {
                tracker: InterfaceTracker::new(iface, &self.cfg),
                score_sum: 0.0,
                score_count: 0,
            },
        );
    }

    /// Feed one sample, registering the interface if it is unknown.
    /// Returns whether the window accepted the sample.
    pub fn ingest(&mut self, iface: &str, ts: i64, metrics: Metrics) -> bool {
        self.ensure_interface(iface);
        let entry = match self.entries.get_mut(iface) {
            Some(e) => e,
            None => return false,
        };
        let accepted = entry.tracker.ingest(ts, metrics);
        if let Some(ev) = entry.tracker.drain_transition() {
            self.pending.push(ev);
        }
        accepted
    }

    /// Advance every tracker's clock to `ts_now`.
    pub fn note_time(&mut self, ts_now: i64) {
        for entry in self.entries.values_mut() {
            entry.tracker.note_time(ts_now);
            if let Some(ev) = entry.tracker.drain_transition() {
                self.pending.push(ev);
            }
        }
    }

    /// Fold each interface's current `score_used` into its running
    /// average. Call exactly once per tick, after `note_time` and any
    /// `ingest`s.
    pub fn record_tick(&mut self) {
        for entry in self.entries.values_mut() {
            entry.score_sum += entry.tracker.snapshot().score_used;
            entry.score_count += 1;
        }
    }

    pub fn snapshots(&self) -> Vec<InterfaceSnapshot> {
        self.entries.values().map(|e| e.tracker.snapshot()).collect()
    }

    /// Return and clear every transition collected since the last drain.
    pub fn drain_transitions(&mut self) -> Vec<TransitionEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Per-interface average of `score_used`, best first. Ties break on
    /// interface name so the ranking is stable.
    pub fn summary_ranked(&self) -> Vec<RankedInterface> {
        let mut out: Vec<RankedInterface> = self
            .entries
            .iter()
            .map(|(iface, entry)| RankedInterface {
                iface: iface.clone(),
                avg_score: if entry.score_count > 0 {
                    entry.score_sum / entry.score_count as f64
                } else {
                    0.0
                },
                last_status: entry.tracker.snapshot().status,
            })
            .collect();
        out.sort_by(|a, b| {
            b.avg_score
                .partial_cmp(&a.avg_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.iface.cmp(&b.iface))
        });
        out
    }

    pub fn interface_count(&self) -> usize {
        self.entries.len()
    }

    /// Total samples dropped as too old, across all interfaces.
    pub fn rejected_samples(&self) -> u64 {
        self.entries
            .values()
            .map(|e| e.tracker.rejected_samples())
            .sum()
    }
}
