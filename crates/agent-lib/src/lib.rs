//! Core library for the LinkPulse interface health agent
//!
//! This crate provides the per-interface decision pipeline:
//! - Rolling sample window tolerant of missing and late arrivals
//! - Quality scoring (instantaneous and EWMA-smoothed) with a
//!   low-confidence cap
//! - Hysteresis state machine with dual thresholds and dwell time
//! - Interface registry with tick fan-out and ranking
//! - Deterministic test/demo scenarios and observability helpers

pub mod agent;
pub mod config;
pub mod fsm;
pub mod models;
pub mod observability;
pub mod scenario;
pub mod score;
pub mod tracker;
pub mod window;

pub use agent::LinkAgent;
pub use config::{AgentConfig, FsmConfig, ScoreConfig};
pub use fsm::{FsmUpdate, HysteresisFsm};
pub use models::{
    InterfaceSnapshot, LinkStatus, Metrics, RankedInterface, Sample, TransitionEvent,
};
pub use observability::{AgentMetrics, StructuredLogger};
pub use scenario::{
    GeneratedSample, ImperfectionConfig, ScenarioGenerator, ScenarioId, SCENARIO_IFACES,
    SCENARIO_TICKS,
};
pub use score::{EwmaState, Scorer};
pub use tracker::InterfaceTracker;
pub use window::{RollingWindow, WindowSummary, WINDOW_SECS};
