//! Per-interface glue
//!
//! One tracker owns one rolling window, one state machine and the EWMA
//! state, and re-derives everything from the window on every event. There
//! is no cached intermediate that can go stale: scoring and state always
//! agree with the samples actually stored.

use crate::config::AgentConfig;
use crate::fsm::HysteresisFsm;
use crate::models::{InterfaceSnapshot, Metrics, TransitionEvent};
use crate::score::{EwmaState, Scorer};
use crate::window::RollingWindow;

/// Tracks a single named interface.
pub struct InterfaceTracker {
    iface: String,
    window: RollingWindow,
    scorer: Scorer,
    fsm: HysteresisFsm,
    ewma: EwmaState,
    /// Timestamp of the last EWMA advance; same-tick recomputes refresh
    /// the raw score but must not re-smooth
    last_smooth_ts: Option<i64>,
    snapshot: InterfaceSnapshot,
    /// At-most-one mailbox; a newer transition replaces an undrained one
    pending: Option<TransitionEvent>,
    rejected_samples: u64,
}

impl InterfaceTracker {
    /// Build a tracker. `cfg` is expected to be validated already (see
    /// [`AgentConfig::validate`]); [`crate::LinkAgent::new`] does so.
    pub fn new(iface: impl Into<String>, cfg: &AgentConfig) -> Self {
        let iface = iface.into();
        Self {
            snapshot: InterfaceSnapshot::initial(iface.clone()),
            window: RollingWindow::new(),
            scorer: Scorer::new(cfg.score.clone()),
            fsm: HysteresisFsm::new(cfg.fsm.clone()),
            ewma: EwmaState::default(),
            last_smooth_ts: None,
            pending: None,
            rejected_samples: 0,
            iface,
        }
    }

    pub fn iface(&self) -> &str {
        &self.iface
    }

    /// Feed one sample. Returns false (with no other side effects) if the
    /// sample is too old for the window.
    pub fn ingest(&mut self, ts: i64, metrics: Metrics) -> bool {
        if !self.window.ingest(ts, metrics) {
            self.rejected_samples += 1;
            tracing::debug!(iface = %self.iface, ts, "dropped sample older than window");
            return false;
        }
        let now = self.window.newest_ts().unwrap_or(ts);
        self.recompute(now);
        true
    }

    /// Advance time without a sample, so the window slides, confidence
    /// decays and the state machine still sees the tick.
    pub fn note_time(&mut self, ts_now: i64) {
        self.window.note_time(ts_now);
        // The window clock never regresses, so a stale ts_now cannot
        // rewind the evaluation either.
        let now = self.window.newest_ts().unwrap_or(ts_now);
        self.recompute(now);
    }

    fn recompute(&mut self, ts_now: i64) {
        let summary = self.window.summary();
        let raw = self.scorer.instantaneous(&summary);

        // The smoothed score advances once per tick; a late sample that
        // re-triggers recompute within the tick updates raw and the
        // snapshot but not the EWMA.
        if self.last_smooth_ts != Some(ts_now) {
            self.scorer.smooth(&mut self.ewma, raw);
            self.last_smooth_ts = Some(ts_now);
        }
        let smoothed = self.ewma.value();

        // Cap both candidates before selection so low confidence
        // constrains whichever strategy is active.
        let raw_capped = self.scorer.cap(raw, summary.confidence);
        let smoothed_capped = self.scorer.cap(smoothed, summary.confidence);
        let score_used = self.scorer.select(raw_capped, smoothed_capped);

        let before = self.fsm.status();
        let update = self.fsm.update(ts_now, score_used, summary.confidence);
        if update.transitioned {
            self.pending = Some(TransitionEvent {
                iface: self.iface.clone(),
                ts: ts_now,
                from: before,
                to: update.status,
                reason: update.reason.unwrap_or_default(),
            });
        }

        self.snapshot = InterfaceSnapshot {
            iface: self.iface.clone(),
            ts: ts_now,
            status: update.status,
            score_raw: raw,
            score_smoothed: smoothed,
            score_used,
            confidence: summary.confidence,
            missing_rate: summary.missing_rate,
            avg_rtt_ms: summary.avg_rtt_ms,
            avg_tp_mbps: summary.avg_tp_mbps,
            avg_loss_pct: summary.avg_loss_pct,
            avg_jitter_ms: summary.avg_jitter_ms,
        };
    }

    /// Return and clear the pending transition, if any.
    pub fn drain_transition(&mut self) -> Option<TransitionEvent> {
        self.pending.take()
    }

    pub fn snapshot(&self) -> InterfaceSnapshot {
        self.snapshot.clone()
    }

    /// Samples dropped for being older than the window.
    pub fn rejected_samples(&self) -> u64 {
        self.rejected_samples
    }
}
