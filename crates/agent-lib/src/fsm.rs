//! Hysteresis state machine
//!
//! Dual enter/exit thresholds, consecutive-tick confirmation counters and
//! a minimum dwell time keep a noisy score from flapping the status. Two
//! safety fast-paths skip the dwell gate: the Degraded -> Down drop, and
//! the forced Down when window confidence falls below a hard floor.
//! Operators prefer a false alarm to a missed outage.

use crate::config::FsmConfig;
use crate::models::LinkStatus;
use crate::score::clamp01;

/// Result of one state-machine evaluation.
#[derive(Debug, Clone)]
pub struct FsmUpdate {
    pub status: LinkStatus,
    pub transitioned: bool,
    /// Diagnostic naming the guard and counter that fired; present only
    /// when `transitioned` is true
    pub reason: Option<String>,
}

/// Per-interface hysteresis state machine.
///
/// Starts in Degraded: a cold interface has no history and must prove
/// itself healthy. Evidence is counted once per distinct evaluation
/// timestamp; re-evaluations within the same tick (a late sample arriving
/// after the tick's clock advance) return the current status without
/// accumulating.
#[derive(Debug, Clone)]
pub struct HysteresisFsm {
    cfg: FsmConfig,
    status: LinkStatus,
    cnt_below_healthy_exit: u32,
    cnt_above_healthy_enter: u32,
    cnt_below_down_enter: u32,
    cnt_above_down_exit: u32,
    last_transition_ts: Option<i64>,
    last_eval_ts: Option<i64>,
}

impl HysteresisFsm {
    pub fn new(cfg: FsmConfig) -> Self {
        Self {
            cfg,
            status: LinkStatus::Degraded,
            cnt_below_healthy_exit: 0,
            cnt_above_healthy_enter: 0,
            cnt_below_down_enter: 0,
            cnt_above_down_exit: 0,
            last_transition_ts: None,
            last_eval_ts: None,
        }
    }

    pub fn status(&self) -> LinkStatus {
        self.status
    }

    fn dwell_ok(&self, ts_now: i64) -> bool {
        if self.cfg.min_dwell_sec <= 0 {
            return true;
        }
        match self.last_transition_ts {
            None => true,
            Some(t) => ts_now - t >= self.cfg.min_dwell_sec,
        }
    }

    fn hold(&self) -> FsmUpdate {
        FsmUpdate {
            status: self.status,
            transitioned: false,
            reason: None,
        }
    }

    fn transition(&mut self, ts_now: i64, next: LinkStatus, reason: String) -> FsmUpdate {
        self.status = next;
        self.last_transition_ts = Some(ts_now);
        // Any state change invalidates all accumulated evidence.
        self.cnt_below_healthy_exit = 0;
        self.cnt_above_healthy_enter = 0;
        self.cnt_below_down_enter = 0;
        self.cnt_above_down_exit = 0;
        FsmUpdate {
            status: next,
            transitioned: true,
            reason: Some(reason),
        }
    }

    /// Evaluate one tick of evidence.
    ///
    /// `score` and `confidence` are clamped to [0, 1] on entry. A call
    /// with the same `ts_now` as the previous call is an evidence no-op.
    pub fn update(&mut self, ts_now: i64, score: f64, confidence: f64) -> FsmUpdate {
        if self.last_eval_ts == Some(ts_now) {
            return self.hold();
        }
        self.last_eval_ts = Some(ts_now);

        let score = clamp01(score);
        let confidence = clamp01(confidence);

        // Hard floor on data quality wins over everything, including a
        // contradictory promotion config. Bypasses counters and dwell.
        if self.cfg.force_down_if_confidence_below >= 0.0
            && confidence < self.cfg.force_down_if_confidence_below
            && self.status != LinkStatus::Down
        {
            let reason = format!(
                "{} -> down: confidence {:.2} below force-down threshold {:.2}",
                self.status, confidence, self.cfg.force_down_if_confidence_below
            );
            return self.transition(ts_now, LinkStatus::Down, reason);
        }

        match self.status {
            LinkStatus::Healthy => {
                if score <= self.cfg.healthy_exit {
                    self.cnt_below_healthy_exit += 1;
                } else {
                    self.cnt_below_healthy_exit = 0;
                }

                if self.cnt_below_healthy_exit >= self.cfg.healthy_exit_n && self.dwell_ok(ts_now) {
                    let reason = format!(
                        "healthy -> degraded: score {:.3} <= healthy_exit {:.2} for {} consecutive ticks",
                        score, self.cfg.healthy_exit, self.cnt_below_healthy_exit
                    );
                    return self.transition(ts_now, LinkStatus::Degraded, reason);
                }
            }
            LinkStatus::Degraded => {
                if score <= self.cfg.down_enter {
                    self.cnt_below_down_enter += 1;
                } else {
                    self.cnt_below_down_enter = 0;
                }

                if score >= self.cfg.healthy_enter
                    && confidence >= self.cfg.min_confidence_for_promotion
                {
                    self.cnt_above_healthy_enter += 1;
                } else {
                    self.cnt_above_healthy_enter = 0;
                }

                // Dropping to Down is exempt from dwell and outranks a
                // simultaneous promotion: fail fast on real outages.
                if self.cnt_below_down_enter >= self.cfg.down_enter_n {
                    let reason = format!(
                        "degraded -> down: score {:.3} <= down_enter {:.2} for {} consecutive ticks",
                        score, self.cfg.down_enter, self.cnt_below_down_enter
                    );
                    return self.transition(ts_now, LinkStatus::Down, reason);
                }
                if self.cnt_above_healthy_enter >= self.cfg.healthy_enter_n
                    && self.dwell_ok(ts_now)
                {
                    let reason = format!(
                        "degraded -> healthy: score {:.3} >= healthy_enter {:.2} for {} consecutive ticks",
                        score, self.cfg.healthy_enter, self.cnt_above_healthy_enter
                    );
                    return self.transition(ts_now, LinkStatus::Healthy, reason);
                }
            }
            LinkStatus::Down => {
                if score >= self.cfg.down_exit {
                    self.cnt_above_down_exit += 1;
                } else {
                    self.cnt_above_down_exit = 0;
                }

                if self.cnt_above_down_exit >= self.cfg.down_exit_n && self.dwell_ok(ts_now) {
                    let reason = format!(
                        "down -> degraded: score {:.3} >= down_exit {:.2} for {} consecutive ticks",
                        score, self.cfg.down_exit, self.cnt_above_down_exit
                    );
                    return self.transition(ts_now, LinkStatus::Degraded, reason);
                }
            }
        }

        self.hold()
    }

    #[cfg(test)]
    fn counters(&self) -> (u32, u32, u32, u32) {
        (
            self.cnt_below_healthy_exit,
            self.cnt_above_healthy_enter,
            self.cnt_below_down_enter,
            self.cnt_above_down_exit,
        )
    }
}
