//! Link quality scoring
//!
//! Pure transformations from a window summary to a score in [0, 1]
//! (1 = best). Two strategies: an instantaneous weighted sum over the
//! window averages, and an EWMA-smoothed variant that trades latency for
//! stability. A confidence cap keeps a sparsely-populated window from
//! reporting a misleadingly high score.

use crate::config::ScoreConfig;
use crate::window::WindowSummary;

pub(crate) fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Smoothed-score state carried between evaluations.
#[derive(Debug, Clone, Copy, Default)]
pub struct EwmaState {
    value: f64,
    primed: bool,
}

impl EwmaState {
    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Stateless scorer; all state lives in the caller's [`EwmaState`].
#[derive(Debug, Clone)]
pub struct Scorer {
    cfg: ScoreConfig,
}

impl Scorer {
    pub fn new(cfg: ScoreConfig) -> Self {
        Self { cfg }
    }

    fn norm_throughput(&self, mbps: f64) -> f64 {
        clamp01(mbps / self.cfg.tp_max_mbps)
    }

    fn norm_rtt(&self, ms: f64) -> f64 {
        1.0 - clamp01((ms - self.cfg.rtt_min_ms) / (self.cfg.rtt_max_ms - self.cfg.rtt_min_ms))
    }

    fn norm_loss(&self, pct: f64) -> f64 {
        1.0 - clamp01(pct / self.cfg.loss_max_pct)
    }

    fn norm_jitter(&self, ms: f64) -> f64 {
        1.0 - clamp01(ms / self.cfg.jit_max_ms)
    }

    /// Instantaneous weighted score over the summary's channel averages.
    ///
    /// An empty window scores 0: with no evidence the link is assumed bad,
    /// never good.
    pub fn instantaneous(&self, summary: &WindowSummary) -> f64 {
        if summary.count == 0 {
            return 0.0;
        }
        let t = self.norm_throughput(summary.avg_tp_mbps);
        let r = self.norm_rtt(summary.avg_rtt_ms);
        let l = self.norm_loss(summary.avg_loss_pct);
        let j = self.norm_jitter(summary.avg_jitter_ms);

        clamp01(self.cfg.w_tp * t + self.cfg.w_rtt * r + self.cfg.w_loss * l + self.cfg.w_jit * j)
    }

    /// Advance the EWMA with a new raw observation and return the smoothed
    /// score. The first evaluation seeds the EWMA with the raw score.
    pub fn smooth(&self, state: &mut EwmaState, score_raw: f64) -> f64 {
        if !state.primed {
            state.value = score_raw;
            state.primed = true;
            return state.value;
        }

        let a = self.cfg.ewma_alpha;
        let mut ewma = a * score_raw + (1.0 - a) * state.value;
        if self.cfg.enable_downtrend_penalty && score_raw < state.value {
            ewma -= self.cfg.downtrend_penalty;
        }
        state.value = clamp01(ewma);
        state.value
    }

    /// Cap a candidate score while window confidence is below the
    /// configured threshold. Applied to both strategies before selection.
    pub fn cap(&self, score: f64, confidence: f64) -> f64 {
        if self.cfg.enable_confidence_cap && confidence < self.cfg.cap_confidence_threshold {
            score.min(self.cfg.cap_max_score_when_low_conf)
        } else {
            score
        }
    }

    /// Pick the strategy the state machine will see.
    pub fn select(&self, raw: f64, smoothed: f64) -> f64 {
        if self.cfg.use_ewma {
            smoothed
        } else {
            raw
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::{RollingWindow, WINDOW_SECS};
    use crate::Metrics;

    fn summary_for(metrics: Metrics, n: usize) -> WindowSummary {
        let mut w = RollingWindow::new();
        for t in 0..n as i64 {
            assert!(w.ingest(t, metrics));
        }
        w.summary()
    }

    #[test]
    fn empty_window_scores_zero() {
        let scorer = Scorer::new(ScoreConfig::default());
        let w = RollingWindow::new();
        assert_eq!(scorer.instantaneous(&w.summary()), 0.0);
    }

    #[test]
    fn perfect_channels_score_near_one() {
        let scorer = Scorer::new(ScoreConfig::default());
        let s = summary_for(
            Metrics {
                rtt_ms: 10.0,
                throughput_mbps: 200.0,
                loss_pct: 0.0,
                jitter_ms: 0.0,
            },
            WINDOW_SECS,
        );
        assert!((scorer.instantaneous(&s) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn worst_channels_score_zero() {
        let scorer = Scorer::new(ScoreConfig::default());
        let s = summary_for(
            Metrics {
                rtt_ms: 800.0,
                throughput_mbps: 0.0,
                loss_pct: 30.0,
                jitter_ms: 200.0,
            },
            WINDOW_SECS,
        );
        assert_eq!(scorer.instantaneous(&s), 0.0);
    }

    #[test]
    fn channels_clamp_outside_reference_range() {
        let scorer = Scorer::new(ScoreConfig::default());
        // Better than the reference "best" on every channel must not
        // push the score above 1.
        let s = summary_for(
            Metrics {
                rtt_ms: 1.0,
                throughput_mbps: 10_000.0,
                loss_pct: 0.0,
                jitter_ms: 0.0,
            },
            WINDOW_SECS,
        );
        assert!(scorer.instantaneous(&s) <= 1.0);

        let s = summary_for(
            Metrics {
                rtt_ms: 5_000.0,
                throughput_mbps: 0.0,
                loss_pct: 90.0,
                jitter_ms: 900.0,
            },
            WINDOW_SECS,
        );
        assert!(scorer.instantaneous(&s) >= 0.0);
    }

    #[test]
    fn reference_steady_good_score() {
        // eth0 baseline: {rtt 20, tp 180, loss 0.1, jit 3}
        let scorer = Scorer::new(ScoreConfig::default());
        let s = summary_for(
            Metrics {
                rtt_ms: 20.0,
                throughput_mbps: 180.0,
                loss_pct: 0.1,
                jitter_ms: 3.0,
            },
            WINDOW_SECS,
        );
        let score = scorer.instantaneous(&s);
        assert!(score > 0.95 && score < 0.97, "got {score}");
    }

    #[test]
    fn ewma_seeds_with_first_raw() {
        let scorer = Scorer::new(ScoreConfig::default());
        let mut state = EwmaState::default();
        assert_eq!(scorer.smooth(&mut state, 0.8), 0.8);
    }

    #[test]
    fn ewma_converges_towards_raw() {
        let scorer = Scorer::new(ScoreConfig::default());
        let mut state = EwmaState::default();
        scorer.smooth(&mut state, 0.0);
        let mut prev = 0.0;
        for _ in 0..30 {
            let v = scorer.smooth(&mut state, 1.0);
            assert!(v >= prev);
            prev = v;
        }
        assert!(prev > 0.99);
    }

    #[test]
    fn ewma_single_step_matches_alpha() {
        let scorer = Scorer::new(ScoreConfig {
            ewma_alpha: 0.25,
            ..Default::default()
        });
        let mut state = EwmaState::default();
        scorer.smooth(&mut state, 0.4);
        let v = scorer.smooth(&mut state, 0.8);
        assert!((v - (0.25 * 0.8 + 0.75 * 0.4)).abs() < 1e-12);
    }

    #[test]
    fn downtrend_penalty_applies_only_on_decline() {
        let cfg = ScoreConfig {
            ewma_alpha: 0.25,
            enable_downtrend_penalty: true,
            downtrend_penalty: 0.1,
            ..Default::default()
        };
        let scorer = Scorer::new(cfg);
        let mut state = EwmaState::default();
        scorer.smooth(&mut state, 0.8);

        let declined = scorer.smooth(&mut state, 0.4);
        assert!((declined - (0.25 * 0.4 + 0.75 * 0.8 - 0.1)).abs() < 1e-12);

        let before = state.value();
        let rose = scorer.smooth(&mut state, 0.9);
        assert!((rose - (0.25 * 0.9 + 0.75 * before)).abs() < 1e-12);
    }

    #[test]
    fn ewma_stays_clamped_under_penalty() {
        let cfg = ScoreConfig {
            ewma_alpha: 1.0,
            enable_downtrend_penalty: true,
            downtrend_penalty: 0.5,
            ..Default::default()
        };
        let scorer = Scorer::new(cfg);
        let mut state = EwmaState::default();
        scorer.smooth(&mut state, 0.2);
        let v = scorer.smooth(&mut state, 0.1);
        assert_eq!(v, 0.0);
    }

    #[test]
    fn cap_limits_low_confidence_scores() {
        let cfg = ScoreConfig {
            enable_confidence_cap: true,
            cap_confidence_threshold: 0.5,
            cap_max_score_when_low_conf: 0.6,
            ..Default::default()
        };
        let scorer = Scorer::new(cfg);
        assert_eq!(scorer.cap(0.95, 0.2), 0.6);
        assert_eq!(scorer.cap(0.4, 0.2), 0.4);
        assert_eq!(scorer.cap(0.95, 0.8), 0.95);
    }

    #[test]
    fn cap_disabled_passes_through() {
        let scorer = Scorer::new(ScoreConfig::default());
        assert_eq!(scorer.cap(0.95, 0.0), 0.95);
    }

    #[test]
    fn select_honors_strategy_flag() {
        let raw_mode = Scorer::new(ScoreConfig::default());
        assert_eq!(raw_mode.select(0.3, 0.7), 0.3);

        let ewma_mode = Scorer::new(ScoreConfig {
            use_ewma: true,
            ..Default::default()
        });
        assert_eq!(ewma_mode.select(0.3, 0.7), 0.7);
    }
}
