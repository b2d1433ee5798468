//! Deterministic traffic scenarios
//!
//! Synthetic per-interface metric feeds used by the simulator CLI, the
//! daemon's demo source and the integration tests. Everything here is a
//! pure function of (scenario, interface, tick) so runs are exactly
//! reproducible; imperfections (missing and late samples) are salted per
//! interface to avoid synchronized drops.

use crate::models::Metrics;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed interface set every scenario drives.
pub const SCENARIO_IFACES: [&str; 4] = ["eth0", "wifi0", "lte0", "sat0"];

/// Default scenario length in ticks (one tick per simulated second).
pub const SCENARIO_TICKS: i64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioId {
    /// wifi0 degrades gradually, then recovers
    A,
    /// wifi0 takes a short spike every 15 s (flap trap)
    B,
    /// lte0 has high throughput but sustained loss and jitter
    C,
    /// baseline traffic with missing and late samples
    D,
}

impl ScenarioId {
    pub const ALL: [ScenarioId; 4] = [ScenarioId::A, ScenarioId::B, ScenarioId::C, ScenarioId::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioId::A => "A",
            ScenarioId::B => "B",
            ScenarioId::C => "C",
            ScenarioId::D => "D",
        }
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" | "a" => Ok(ScenarioId::A),
            "B" | "b" => Ok(ScenarioId::B),
            "C" | "c" => Ok(ScenarioId::C),
            "D" | "d" => Ok(ScenarioId::D),
            other => anyhow::bail!("unknown scenario {other:?} (use A|B|C|D)"),
        }
    }
}

/// Deterministic data-imperfection knobs.
#[derive(Debug, Clone, Copy)]
pub struct ImperfectionConfig {
    pub enable_missing: bool,
    /// Drop roughly every n-th sample (salted per interface)
    pub drop_every_n: i64,
    pub enable_late: bool,
    /// Shift roughly every n-th sample into the past (salted per interface)
    pub late_every_n: i64,
    pub late_by_sec: i64,
}

impl Default for ImperfectionConfig {
    fn default() -> Self {
        Self {
            enable_missing: false,
            drop_every_n: 10,
            enable_late: false,
            late_every_n: 12,
            late_by_sec: 2,
        }
    }
}

impl ImperfectionConfig {
    /// Both imperfections on, at the default rates.
    pub fn lossy() -> Self {
        Self {
            enable_missing: true,
            enable_late: true,
            ..Self::default()
        }
    }
}

/// A sample as emitted by the generator; `ts` may lag the tick when the
/// sample is late.
#[derive(Debug, Clone, Copy)]
pub struct GeneratedSample {
    pub ts: i64,
    pub metrics: Metrics,
}

/// Deterministic per-scenario sample source.
#[derive(Debug, Clone)]
pub struct ScenarioGenerator {
    id: ScenarioId,
    imperfect: ImperfectionConfig,
}

impl ScenarioGenerator {
    /// Scenario D carries its imperfections by definition; A-C run clean.
    pub fn new(id: ScenarioId) -> Self {
        let imperfect = if id == ScenarioId::D {
            ImperfectionConfig::lossy()
        } else {
            ImperfectionConfig::default()
        };
        Self { id, imperfect }
    }

    pub fn with_imperfections(mut self, imperfect: ImperfectionConfig) -> Self {
        self.imperfect = imperfect;
        self
    }

    pub fn id(&self) -> ScenarioId {
        self.id
    }

    /// Produce the sample for `iface` at tick `t`, or None when the
    /// sample is dropped or the interface is unknown.
    pub fn sample(&self, iface: &str, t: i64) -> Option<GeneratedSample> {
        if self.imperfect.enable_missing && self.imperfect.drop_every_n > 0 {
            let salt = iface.len() as i64;
            if (t + salt).rem_euclid(self.imperfect.drop_every_n) == 0 {
                return None;
            }
        }

        let mut ts = t;
        if self.imperfect.enable_late && self.imperfect.late_every_n > 0 {
            let salt = iface.as_bytes().first().copied().unwrap_or(0) as i64;
            if (t + salt).rem_euclid(self.imperfect.late_every_n) == 0 {
                ts = t - self.imperfect.late_by_sec;
            }
        }

        let metrics = match iface {
            "eth0" => self.eth0(),
            "wifi0" => self.wifi0(t),
            "lte0" => self.lte0(t),
            "sat0" => self.sat0(),
            _ => return None,
        };
        Some(GeneratedSample { ts, metrics })
    }

    fn lerp(a: f64, b: f64, u: f64) -> f64 {
        let u = u.clamp(0.0, 1.0);
        a + (b - a) * u
    }

    fn lerp_metrics(a: Metrics, b: Metrics, u: f64) -> Metrics {
        Metrics {
            rtt_ms: Self::lerp(a.rtt_ms, b.rtt_ms, u),
            throughput_mbps: Self::lerp(a.throughput_mbps, b.throughput_mbps, u),
            loss_pct: Self::lerp(a.loss_pct, b.loss_pct, u),
            jitter_ms: Self::lerp(a.jitter_ms, b.jitter_ms, u),
        }
    }

    // Wired baseline: stable and good.
    fn eth0(&self) -> Metrics {
        Metrics {
            rtt_ms: 20.0,
            throughput_mbps: 180.0,
            loss_pct: 0.1,
            jitter_ms: 3.0,
        }
    }

    // Geostationary link: huge but steady latency.
    fn sat0(&self) -> Metrics {
        Metrics {
            rtt_ms: 550.0,
            throughput_mbps: 60.0,
            loss_pct: 0.5,
            jitter_ms: 25.0,
        }
    }

    fn lte0(&self, t: i64) -> Metrics {
        if self.id == ScenarioId::C {
            // Misleading throughput: a fat pipe that is congested, lossy
            // and jittery.
            return Metrics {
                rtt_ms: 300.0,
                throughput_mbps: 160.0,
                loss_pct: 8.0 + (t.rem_euclid(5)) as f64,
                jitter_ms: 60.0 + (t.rem_euclid(7) * 3) as f64,
            };
        }
        // Moderate and stable with mild deterministic wiggle.
        let wig = (t.rem_euclid(10)) as f64 * 0.3;
        Metrics {
            rtt_ms: 90.0 + wig,
            throughput_mbps: 90.0,
            loss_pct: 1.0,
            jitter_ms: 10.0 + 0.5 * wig,
        }
    }

    fn wifi0(&self, t: i64) -> Metrics {
        let good = Metrics {
            rtt_ms: 35.0,
            throughput_mbps: 110.0,
            loss_pct: 0.5,
            jitter_ms: 6.0,
        };

        match self.id {
            // Degrade linearly over 35 s, recover over 20 s, then hold.
            ScenarioId::A => {
                let bad = Metrics {
                    rtt_ms: 300.0,
                    throughput_mbps: 30.0,
                    loss_pct: 12.0,
                    jitter_ms: 80.0,
                };
                if t < 35 {
                    Self::lerp_metrics(good, bad, t as f64 / 35.0)
                } else if t < 55 {
                    Self::lerp_metrics(bad, good, (t - 35) as f64 / 20.0)
                } else {
                    good
                }
            }
            // 4-second spike at the start of every 15-second period.
            ScenarioId::B => {
                if t.rem_euclid(15) < 4 {
                    Metrics {
                        rtt_ms: 350.0,
                        throughput_mbps: 90.0,
                        loss_pct: 10.0,
                        jitter_ms: 70.0,
                    }
                } else {
                    good
                }
            }
            // Clean but slow.
            ScenarioId::C => Metrics {
                throughput_mbps: 70.0,
                loss_pct: 0.3,
                jitter_ms: 5.0,
                ..good
            },
            ScenarioId::D => good,
        }
    }
}
