//! Agent configuration
//!
//! Scoring and state-machine parameters with serde defaults and
//! construction-time validation. Invalid threshold ordering, counts or
//! weight sums are programmer errors and are rejected with a descriptive
//! diagnostic before any tracker is built.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// Scoring parameters: channel weights, normalization reference points and
/// the smoothing / confidence-cap knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreConfig {
    /// EWMA smoothing factor in [0, 1]
    #[serde(default = "default_ewma_alpha")]
    pub ewma_alpha: f64,

    /// Feed the smoothed score (strategy 2) to the state machine instead
    /// of the instantaneous one
    #[serde(default)]
    pub use_ewma: bool,

    /// Subtract a fixed penalty from the EWMA while the raw score is falling
    #[serde(default)]
    pub enable_downtrend_penalty: bool,

    #[serde(default = "default_downtrend_penalty")]
    pub downtrend_penalty: f64,

    /// Channel weights; must sum to 1
    #[serde(default = "default_w_tp")]
    pub w_tp: f64,
    #[serde(default = "default_w_rtt")]
    pub w_rtt: f64,
    #[serde(default = "default_w_loss")]
    pub w_loss: f64,
    #[serde(default = "default_w_jit")]
    pub w_jit: f64,

    /// Throughput at or above this maps to a perfect channel score
    #[serde(default = "default_tp_max")]
    pub tp_max_mbps: f64,
    /// RTT at or below this maps to a perfect channel score
    #[serde(default = "default_rtt_min")]
    pub rtt_min_ms: f64,
    /// RTT at or above this maps to a zero channel score
    #[serde(default = "default_rtt_max")]
    pub rtt_max_ms: f64,
    #[serde(default = "default_loss_max")]
    pub loss_max_pct: f64,
    #[serde(default = "default_jit_max")]
    pub jit_max_ms: f64,

    /// Cap the score while the window is too empty to be trusted
    #[serde(default)]
    pub enable_confidence_cap: bool,
    #[serde(default = "default_cap_confidence_threshold")]
    pub cap_confidence_threshold: f64,
    #[serde(default = "default_cap_max_score")]
    pub cap_max_score_when_low_conf: f64,
}

fn default_ewma_alpha() -> f64 {
    0.25
}

fn default_downtrend_penalty() -> f64 {
    0.05
}

fn default_w_tp() -> f64 {
    0.3
}

fn default_w_rtt() -> f64 {
    0.3
}

fn default_w_loss() -> f64 {
    0.2
}

fn default_w_jit() -> f64 {
    0.2
}

fn default_tp_max() -> f64 {
    200.0
}

fn default_rtt_min() -> f64 {
    10.0
}

fn default_rtt_max() -> f64 {
    800.0
}

fn default_loss_max() -> f64 {
    30.0
}

fn default_jit_max() -> f64 {
    200.0
}

fn default_cap_confidence_threshold() -> f64 {
    0.5
}

fn default_cap_max_score() -> f64 {
    0.6
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            ewma_alpha: default_ewma_alpha(),
            use_ewma: false,
            enable_downtrend_penalty: false,
            downtrend_penalty: default_downtrend_penalty(),
            w_tp: default_w_tp(),
            w_rtt: default_w_rtt(),
            w_loss: default_w_loss(),
            w_jit: default_w_jit(),
            tp_max_mbps: default_tp_max(),
            rtt_min_ms: default_rtt_min(),
            rtt_max_ms: default_rtt_max(),
            loss_max_pct: default_loss_max(),
            jit_max_ms: default_jit_max(),
            enable_confidence_cap: false,
            cap_confidence_threshold: default_cap_confidence_threshold(),
            cap_max_score_when_low_conf: default_cap_max_score(),
        }
    }
}

impl ScoreConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            (0.0..=1.0).contains(&self.ewma_alpha),
            "ewma_alpha must be in [0, 1], got {}",
            self.ewma_alpha
        );
        ensure!(
            self.downtrend_penalty >= 0.0,
            "downtrend_penalty must be non-negative, got {}",
            self.downtrend_penalty
        );

        for (name, w) in [
            ("w_tp", self.w_tp),
            ("w_rtt", self.w_rtt),
            ("w_loss", self.w_loss),
            ("w_jit", self.w_jit),
        ] {
            ensure!(w >= 0.0, "{} must be non-negative, got {}", name, w);
        }
        let weight_sum = self.w_tp + self.w_rtt + self.w_loss + self.w_jit;
        ensure!(
            (weight_sum - 1.0).abs() <= 1e-6,
            "channel weights must sum to 1, got {}",
            weight_sum
        );

        ensure!(
            self.tp_max_mbps > 0.0,
            "tp_max_mbps must be positive, got {}",
            self.tp_max_mbps
        );
        ensure!(
            self.rtt_max_ms > self.rtt_min_ms,
            "rtt_max_ms ({}) must exceed rtt_min_ms ({})",
            self.rtt_max_ms,
            self.rtt_min_ms
        );
        ensure!(
            self.loss_max_pct > 0.0,
            "loss_max_pct must be positive, got {}",
            self.loss_max_pct
        );
        ensure!(
            self.jit_max_ms > 0.0,
            "jit_max_ms must be positive, got {}",
            self.jit_max_ms
        );

        ensure!(
            (0.0..=1.0).contains(&self.cap_confidence_threshold),
            "cap_confidence_threshold must be in [0, 1], got {}",
            self.cap_confidence_threshold
        );
        ensure!(
            (0.0..=1.0).contains(&self.cap_max_score_when_low_conf),
            "cap_max_score_when_low_conf must be in [0, 1], got {}",
            self.cap_max_score_when_low_conf
        );
        Ok(())
    }
}

/// Hysteresis state-machine parameters.
///
/// `healthy_exit < healthy_enter` and `down_enter < down_exit` are required;
/// the gaps between the paired thresholds are what prevents flapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FsmConfig {
    #[serde(default = "default_healthy_enter")]
    pub healthy_enter: f64,
    #[serde(default = "default_healthy_exit")]
    pub healthy_exit: f64,
    #[serde(default = "default_down_enter")]
    pub down_enter: f64,
    #[serde(default = "default_down_exit")]
    pub down_exit: f64,

    /// Consecutive ticks of evidence required before each transition
    #[serde(default = "default_healthy_enter_n")]
    pub healthy_enter_n: u32,
    #[serde(default = "default_healthy_exit_n")]
    pub healthy_exit_n: u32,
    #[serde(default = "default_down_enter_n")]
    pub down_enter_n: u32,
    #[serde(default = "default_down_exit_n")]
    pub down_exit_n: u32,

    /// Minimum seconds a state must be held before non-safety transitions
    #[serde(default = "default_min_dwell_sec")]
    pub min_dwell_sec: i64,

    /// Promotion into Healthy additionally requires at least this much
    /// window confidence
    #[serde(default)]
    pub min_confidence_for_promotion: f64,

    /// Hard floor: confidence below this forces the interface Down,
    /// bypassing counters and dwell. Negative disables.
    #[serde(default = "default_force_down_floor")]
    pub force_down_if_confidence_below: f64,
}

fn default_healthy_enter() -> f64 {
    0.72
}

fn default_healthy_exit() -> f64 {
    0.66
}

fn default_down_enter() -> f64 {
    0.35
}

fn default_down_exit() -> f64 {
    0.45
}

fn default_healthy_enter_n() -> u32 {
    6
}

fn default_healthy_exit_n() -> u32 {
    6
}

fn default_down_enter_n() -> u32 {
    3
}

fn default_down_exit_n() -> u32 {
    5
}

fn default_min_dwell_sec() -> i64 {
    5
}

fn default_force_down_floor() -> f64 {
    -1.0
}

impl Default for FsmConfig {
    fn default() -> Self {
        Self {
            healthy_enter: default_healthy_enter(),
            healthy_exit: default_healthy_exit(),
            down_enter: default_down_enter(),
            down_exit: default_down_exit(),
            healthy_enter_n: default_healthy_enter_n(),
            healthy_exit_n: default_healthy_exit_n(),
            down_enter_n: default_down_enter_n(),
            down_exit_n: default_down_exit_n(),
            min_dwell_sec: default_min_dwell_sec(),
            min_confidence_for_promotion: 0.0,
            force_down_if_confidence_below: default_force_down_floor(),
        }
    }
}

impl FsmConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, t) in [
            ("healthy_enter", self.healthy_enter),
            ("healthy_exit", self.healthy_exit),
            ("down_enter", self.down_enter),
            ("down_exit", self.down_exit),
        ] {
            ensure!(
                (0.0..=1.0).contains(&t),
                "{} must be in [0, 1], got {}",
                name,
                t
            );
        }
        ensure!(
            self.healthy_exit < self.healthy_enter,
            "healthy_exit ({}) must be below healthy_enter ({})",
            self.healthy_exit,
            self.healthy_enter
        );
        ensure!(
            self.down_enter < self.down_exit,
            "down_enter ({}) must be below down_exit ({})",
            self.down_enter,
            self.down_exit
        );

        for (name, n) in [
            ("healthy_enter_n", self.healthy_enter_n),
            ("healthy_exit_n", self.healthy_exit_n),
            ("down_enter_n", self.down_enter_n),
            ("down_exit_n", self.down_exit_n),
        ] {
            ensure!(n >= 1, "{} must be at least 1, got {}", name, n);
        }

        ensure!(
            self.min_dwell_sec >= 0,
            "min_dwell_sec must be non-negative, got {}",
            self.min_dwell_sec
        );
        ensure!(
            (0.0..=1.0).contains(&self.min_confidence_for_promotion),
            "min_confidence_for_promotion must be in [0, 1], got {}",
            self.min_confidence_for_promotion
        );
        ensure!(
            self.force_down_if_confidence_below <= 1.0,
            "force_down_if_confidence_below must be at most 1, got {}",
            self.force_down_if_confidence_below
        );
        Ok(())
    }
}

/// Full core configuration, one copy shared by every tracker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub score: ScoreConfig,
    #[serde(default)]
    pub fsm: FsmConfig,
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        self.score.validate()?;
        self.fsm.validate()
    }
}
