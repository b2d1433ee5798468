//! Scenario run command

use crate::output::{
    print_run_header, print_snapshot_table, print_summary_table, print_transition, OutputFormat,
};
use anyhow::Result;
use linkpulse_lib::{
    AgentConfig, LinkAgent, ScenarioGenerator, ScenarioId, TransitionEvent, SCENARIO_IFACES,
};
use serde::Serialize;

/// Which scoring strategies to run a scenario under.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum Strategy {
    /// Instantaneous weighted score
    Raw,
    /// EWMA-smoothed score
    Ewma,
    /// Run each scenario under both strategies, raw first
    #[default]
    Both,
}

impl Strategy {
    fn modes(self) -> &'static [bool] {
        match self {
            Strategy::Raw => &[false],
            Strategy::Ewma => &[true],
            Strategy::Both => &[false, true],
        }
    }
}

/// Machine-readable result of one scenario run.
#[derive(Debug, Serialize)]
struct RunReport {
    scenario: String,
    use_ewma: bool,
    ticks: i64,
    transitions: Vec<TransitionEvent>,
    summary: Vec<linkpulse_lib::RankedInterface>,
}

pub fn run(
    scenario: &str,
    strategy: Strategy,
    ticks: i64,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let ids: Vec<ScenarioId> = if scenario.eq_ignore_ascii_case("all") {
        ScenarioId::ALL.to_vec()
    } else {
        vec![scenario.parse()?]
    };

    for id in ids {
        for &use_ewma in strategy.modes() {
            run_one(id, use_ewma, ticks, format, quiet)?;
        }
    }
    Ok(())
}

fn run_one(id: ScenarioId, use_ewma: bool, ticks: i64, format: OutputFormat, quiet: bool) -> Result<()> {
    let mut cfg = AgentConfig::default();
    cfg.score.use_ewma = use_ewma;

    let mut agent = LinkAgent::new(cfg)?;
    for iface in SCENARIO_IFACES {
        agent.ensure_interface(iface);
    }
    let generator = ScenarioGenerator::new(id);

    let table_mode = matches!(format, OutputFormat::Table);
    if table_mode {
        print_run_header(id.as_str(), use_ewma);
    }

    let mut all_transitions = Vec::new();
    for t in 0..ticks {
        agent.note_time(t);
        for iface in SCENARIO_IFACES {
            if let Some(sample) = generator.sample(iface, t) {
                agent.ingest(iface, sample.ts, sample.metrics);
            }
        }

        if table_mode && !quiet {
            print_snapshot_table(t, &agent.snapshots());
        }
        for ev in agent.drain_transitions() {
            if table_mode {
                print_transition(&ev);
            }
            all_transitions.push(ev);
        }
        agent.record_tick();
    }

    let summary = agent.summary_ranked();
    match format {
        OutputFormat::Table => print_summary_table(&summary),
        OutputFormat::Json => {
            let report = RunReport {
                scenario: id.as_str().to_string(),
                use_ewma,
                ticks,
                transitions: all_transitions,
                summary,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
