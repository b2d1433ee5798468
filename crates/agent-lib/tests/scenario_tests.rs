//! End-to-end scenario tests for the full decision pipeline
//!
//! Each test drives a [`LinkAgent`] through a deterministic scenario at
//! 1 Hz, the way the simulator CLI does: per tick `note_time`, then the
//! tick's samples, then `record_tick`.

use linkpulse_lib::{
    AgentConfig, LinkAgent, LinkStatus, Metrics, ScenarioGenerator, ScenarioId, TransitionEvent,
    SCENARIO_IFACES,
};

struct RunResult {
    transitions: Vec<TransitionEvent>,
    agent: LinkAgent,
}

fn run_scenario(id: ScenarioId, cfg: AgentConfig, ticks: i64) -> RunResult {
    let mut agent = LinkAgent::new(cfg).expect("valid config");
    for iface in SCENARIO_IFACES {
        agent.ensure_interface(iface);
    }
    let gen = ScenarioGenerator::new(id);

    let mut transitions = Vec::new();
    for t in 0..ticks {
        agent.note_time(t);
        for iface in SCENARIO_IFACES {
            if let Some(s) = gen.sample(iface, t) {
                agent.ingest(iface, s.ts, s.metrics);
            }
        }
        for ev in agent.drain_transitions() {
            // Every snapshot field must stay sane at the moment an event
            // fires, not only at the end of the run.
            assert!(ev.ts <= t);
            transitions.push(ev);
        }
        for snap in agent.snapshots() {
            assert_snapshot_sane(&snap);
        }
        agent.record_tick();
    }
    RunResult { transitions, agent }
}

fn assert_snapshot_sane(snap: &linkpulse_lib::InterfaceSnapshot) {
    for (name, v) in [
        ("score_raw", snap.score_raw),
        ("score_smoothed", snap.score_smoothed),
        ("score_used", snap.score_used),
        ("confidence", snap.confidence),
        ("missing_rate", snap.missing_rate),
    ] {
        assert!(v.is_finite(), "{name} not finite for {}", snap.iface);
        assert!((0.0..=1.0).contains(&v), "{name}={v} for {}", snap.iface);
    }
    for (name, v) in [
        ("avg_rtt_ms", snap.avg_rtt_ms),
        ("avg_tp_mbps", snap.avg_tp_mbps),
        ("avg_loss_pct", snap.avg_loss_pct),
        ("avg_jitter_ms", snap.avg_jitter_ms),
    ] {
        assert!(v.is_finite() && v >= 0.0, "{name}={v} for {}", snap.iface);
    }
    assert!(
        (snap.confidence + snap.missing_rate - 1.0).abs() < 1e-9,
        "confidence and missing_rate must be complementary"
    );
}

fn ewma_cfg() -> AgentConfig {
    let mut cfg = AgentConfig::default();
    cfg.score.use_ewma = true;
    cfg
}

fn for_iface<'a>(events: &'a [TransitionEvent], iface: &str) -> Vec<&'a TransitionEvent> {
    events.iter().filter(|e| e.iface == iface).collect()
}

#[test]
fn steady_good_interface_promotes_once_and_stays_healthy() {
    let mut agent = LinkAgent::new(AgentConfig::default()).unwrap();
    agent.ensure_interface("eth0");
    let good = Metrics {
        rtt_ms: 20.0,
        throughput_mbps: 180.0,
        loss_pct: 0.1,
        jitter_ms: 3.0,
    };

    let mut transitions = Vec::new();
    for t in 0..90 {
        agent.note_time(t);
        agent.ingest("eth0", t, good);
        transitions.extend(agent.drain_transitions());
        agent.record_tick();
    }

    assert_eq!(transitions.len(), 1, "expected exactly one transition");
    assert_eq!(transitions[0].from, LinkStatus::Degraded);
    assert_eq!(transitions[0].to, LinkStatus::Healthy);
    assert!(
        transitions[0].ts <= 8,
        "promotion should land after roughly six ticks, got t={}",
        transitions[0].ts
    );

    let snap = &agent.snapshots()[0];
    assert_eq!(snap.status, LinkStatus::Healthy);
    assert!(snap.score_used > 0.72);
}

#[test]
fn scenario_a_wifi_degrades_and_recovers_with_ewma() {
    let result = run_scenario(ScenarioId::A, ewma_cfg(), 90);
    let wifi = for_iface(&result.transitions, "wifi0");

    assert!(
        wifi.iter()
            .any(|e| e.from == LinkStatus::Healthy && e.to == LinkStatus::Degraded),
        "wifi0 must enter Degraded during the slump"
    );
    assert!(wifi.len() <= 6, "too many wifi0 transitions: {}", wifi.len());

    let snaps = result.agent.snapshots();
    let wifi_snap = snaps.iter().find(|s| s.iface == "wifi0").unwrap();
    assert_eq!(
        wifi_snap.status,
        LinkStatus::Healthy,
        "wifi0 must be Healthy again by t=90"
    );
}

#[test]
fn scenario_a_raw_mode_stays_bounded() {
    let result = run_scenario(ScenarioId::A, AgentConfig::default(), 90);
    let wifi = for_iface(&result.transitions, "wifi0");
    assert!(wifi.len() <= 8, "too many wifi0 transitions: {}", wifi.len());
}

#[test]
fn scenario_b_flap_trap_does_not_flap() {
    let ewma = run_scenario(ScenarioId::B, ewma_cfg(), 180);
    let raw = run_scenario(ScenarioId::B, AgentConfig::default(), 180);

    let ewma_count = for_iface(&ewma.transitions, "wifi0").len();
    let raw_count = for_iface(&raw.transitions, "wifi0").len();

    assert!(ewma_count <= 6, "EWMA wifi0 transitions: {ewma_count}");
    assert!(
        raw_count >= ewma_count,
        "smoothing must not flap more than raw (raw {raw_count} vs ewma {ewma_count})"
    );
}

#[test]
fn scenario_c_misleading_throughput_never_promotes_lte() {
    for cfg in [AgentConfig::default(), ewma_cfg()] {
        let result = run_scenario(ScenarioId::C, cfg, 90);
        let snaps = result.agent.snapshots();
        let lte = snaps.iter().find(|s| s.iface == "lte0").unwrap();
        assert_ne!(
            lte.status,
            LinkStatus::Healthy,
            "high throughput must not mask sustained loss and jitter"
        );
        assert!(for_iface(&result.transitions, "lte0")
            .iter()
            .all(|e| e.to != LinkStatus::Healthy));
    }
}

#[test]
fn scenario_d_missing_and_late_keeps_invariants() {
    // Snapshot sanity is asserted every tick inside run_scenario.
    for cfg in [AgentConfig::default(), ewma_cfg()] {
        run_scenario(ScenarioId::D, cfg, 120);
    }
}

#[test]
fn scenario_d_promotions_respect_confidence_gate() {
    let mut cfg = ewma_cfg();
    cfg.fsm.min_confidence_for_promotion = 0.5;

    let mut agent = LinkAgent::new(cfg).unwrap();
    for iface in SCENARIO_IFACES {
        agent.ensure_interface(iface);
    }
    let gen = ScenarioGenerator::new(ScenarioId::D);

    for t in 0..120 {
        agent.note_time(t);
        for iface in SCENARIO_IFACES {
            if let Some(s) = gen.sample(iface, t) {
                agent.ingest(iface, s.ts, s.metrics);
            }
        }
        for ev in agent.drain_transitions() {
            if ev.to == LinkStatus::Healthy {
                let snaps = agent.snapshots();
                let snap = snaps.iter().find(|s| s.iface == ev.iface).unwrap();
                assert!(
                    snap.confidence >= 0.5,
                    "{} promoted with confidence {}",
                    ev.iface,
                    snap.confidence
                );
            }
        }
        agent.record_tick();
    }
}

#[test]
fn dwell_separates_all_non_safety_transitions() {
    for id in ScenarioId::ALL {
        for cfg in [AgentConfig::default(), ewma_cfg()] {
            let min_dwell = cfg.fsm.min_dwell_sec;
            let result = run_scenario(id, cfg, 180);
            for iface in SCENARIO_IFACES {
                let events = for_iface(&result.transitions, iface);
                for pair in events.windows(2) {
                    let gap = pair[1].ts - pair[0].ts;
                    assert!(
                        gap >= min_dwell || pair[1].to == LinkStatus::Down,
                        "{iface} transitioned twice within dwell in scenario {id}: \
                         {} -> {} at t={} then {} -> {} at t={}",
                        pair[0].from,
                        pair[0].to,
                        pair[0].ts,
                        pair[1].from,
                        pair[1].to,
                        pair[1].ts
                    );
                }
            }
        }
    }
}

#[test]
fn transition_volume_is_bounded_everywhere() {
    for id in ScenarioId::ALL {
        for cfg in [AgentConfig::default(), ewma_cfg()] {
            let result = run_scenario(id, cfg, 180);
            for iface in SCENARIO_IFACES {
                let n = for_iface(&result.transitions, iface).len();
                assert!(n <= 10, "{iface} transitioned {n} times in scenario {id}");
            }
        }
    }
}

#[test]
fn ranked_summary_orders_baseline_scenario() {
    let result = run_scenario(ScenarioId::D, AgentConfig::default(), 120);
    let ranked = result.agent.summary_ranked();
    assert_eq!(ranked.len(), 4);
    // eth0 is the clean fast link; sat0 pays for its latency.
    assert_eq!(ranked[0].iface, "eth0");
    assert_eq!(ranked[3].iface, "sat0");
    for pair in ranked.windows(2) {
        assert!(pair[0].avg_score >= pair[1].avg_score);
    }
}

#[test]
fn late_samples_cannot_change_decisions_already_made() {
    // Two identical runs except one delivers an extra stale sample far
    // older than the window every few ticks; the rejected samples must
    // leave every snapshot untouched.
    let drive = |with_stale: bool| -> Vec<String> {
        let mut agent = LinkAgent::new(AgentConfig::default()).unwrap();
        agent.ensure_interface("eth0");
        let good = Metrics {
            rtt_ms: 20.0,
            throughput_mbps: 180.0,
            loss_pct: 0.1,
            jitter_ms: 3.0,
        };
        let mut states = Vec::new();
        for t in 0..120 {
            agent.note_time(t);
            agent.ingest("eth0", t, good);
            if with_stale && t % 7 == 0 && t > 50 {
                assert!(!agent.ingest("eth0", t - 60, good));
            }
            agent.record_tick();
            let snap = &agent.snapshots()[0];
            states.push(format!("{}:{:.6}", snap.status, snap.score_used));
        }
        states
    };

    assert_eq!(drive(false), drive(true));
}
