//! Fixed-duration rolling sample window
//!
//! A ring of one slot per second, indexed by `timestamp mod WINDOW_SECS`.
//! Late samples inside the window are accepted without any sorted
//! structure; a slot collision always evicts a timestamp that is outside
//! the current window, so overwriting unconditionally is correct.

use crate::models::Metrics;

/// Window length in seconds. One ring slot per second.
pub const WINDOW_SECS: usize = 45;

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    valid: bool,
    ts: i64,
    metrics: Metrics,
}

/// Summary statistics over the samples currently inside the window.
///
/// Averages are sum-then-divide over the included slots, in slot-index
/// order, so any two ingest orderings of the same sample set produce
/// bit-identical results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSummary {
    pub newest_ts: i64,
    pub oldest_ts: i64,
    pub count: usize,
    pub expected: usize,
    /// `count / expected`, in [0, 1]
    pub confidence: f64,
    pub missing_rate: f64,
    pub avg_rtt_ms: f64,
    pub avg_tp_mbps: f64,
    pub avg_loss_pct: f64,
    pub avg_jitter_ms: f64,
}

impl WindowSummary {
    /// Summary of a window that has never observed time or samples.
    fn empty() -> Self {
        Self {
            newest_ts: 0,
            oldest_ts: 0,
            count: 0,
            expected: WINDOW_SECS,
            confidence: 0.0,
            missing_rate: 1.0,
            avg_rtt_ms: 0.0,
            avg_tp_mbps: 0.0,
            avg_loss_pct: 0.0,
            avg_jitter_ms: 0.0,
        }
    }
}

/// Rolling store of the most recent `WINDOW_SECS` seconds of samples.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    slots: [Slot; WINDOW_SECS],
    /// Greatest timestamp ever observed or declared via `note_time`
    newest_ts: Option<i64>,
}

impl RollingWindow {
    pub fn new() -> Self {
        Self {
            slots: [Slot::default(); WINDOW_SECS],
            newest_ts: None,
        }
    }

    // rem_euclid keeps negative timestamps in [0, WINDOW_SECS).
    fn idx(ts: i64) -> usize {
        ts.rem_euclid(WINDOW_SECS as i64) as usize
    }

    pub fn newest_ts(&self) -> Option<i64> {
        self.newest_ts
    }

    fn oldest_allowed(newest: i64) -> i64 {
        newest - (WINDOW_SECS as i64 - 1)
    }

    /// Store a sample.
    ///
    /// Advances the window's notion of time to `ts` if it is newer, then
    /// returns false if the sample is older than the window admits. A
    /// resubmission at an already-stored timestamp replaces the stored
    /// metrics (a correction); a ring-index collision overwrites whatever
    /// was there.
    pub fn ingest(&mut self, ts: i64, metrics: Metrics) -> bool {
        let newest = match self.newest_ts {
            Some(n) if ts <= n => n,
            _ => {
                self.newest_ts = Some(ts);
                ts
            }
        };

        if ts < Self::oldest_allowed(newest) {
            tracing::debug!(ts, newest, "sample too old for window, rejected");
            return false;
        }

        self.slots[Self::idx(ts)] = Slot {
            valid: true,
            ts,
            metrics,
        };
        true
    }

    /// Raise the window's notion of time without storing a sample.
    ///
    /// Keeps the window sliding (and confidence decaying) across ticks
    /// that deliver no sample. Never moves time backwards.
    pub fn note_time(&mut self, ts_now: i64) {
        match self.newest_ts {
            Some(n) if ts_now <= n => {}
            _ => self.newest_ts = Some(ts_now),
        }
    }

    /// Scan the ring and summarize the samples inside the current window.
    pub fn summary(&self) -> WindowSummary {
        let Some(newest) = self.newest_ts else {
            return WindowSummary::empty();
        };
        let oldest = Self::oldest_allowed(newest);

        let mut sum_rtt = 0.0;
        let mut sum_tp = 0.0;
        let mut sum_loss = 0.0;
        let mut sum_jit = 0.0;
        let mut count = 0usize;

        for slot in &self.slots {
            // A stale flag with an out-of-range ts is logically absent; it
            // will be overwritten by the next occupant of its index.
            if !slot.valid || slot.ts < oldest || slot.ts > newest {
                continue;
            }
            sum_rtt += slot.metrics.rtt_ms;
            sum_tp += slot.metrics.throughput_mbps;
            sum_loss += slot.metrics.loss_pct;
            sum_jit += slot.metrics.jitter_ms;
            count += 1;
        }

        let confidence = count as f64 / WINDOW_SECS as f64;
        let mut out = WindowSummary {
            newest_ts: newest,
            oldest_ts: oldest,
            count,
            expected: WINDOW_SECS,
            confidence,
            missing_rate: 1.0 - confidence,
            ..WindowSummary::empty()
        };
        if count > 0 {
            out.avg_rtt_ms = sum_rtt / count as f64;
            out.avg_tp_mbps = sum_tp / count as f64;
            out.avg_loss_pct = sum_loss / count as f64;
            out.avg_jitter_ms = sum_jit / count as f64;
        }
        out
    }

    /// Whether a valid in-window sample is stored for exactly `ts`.
    pub fn has_sample(&self, ts: i64) -> bool {
        let Some(newest) = self.newest_ts else {
            return false;
        };
        if ts < Self::oldest_allowed(newest) || ts > newest {
            return false;
        }
        let slot = &self.slots[Self::idx(ts)];
        slot.valid && slot.ts == ts
    }

    pub fn get(&self, ts: i64) -> Option<Metrics> {
        if self.has_sample(ts) {
            Some(self.slots[Self::idx(ts)].metrics)
        } else {
            None
        }
    }
}

impl Default for RollingWindow {
    fn default() -> Self {
        Self::new()
    }
}
