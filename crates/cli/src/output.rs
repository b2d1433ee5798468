//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use linkpulse_lib::{InterfaceSnapshot, LinkStatus, RankedInterface, TransitionEvent};
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Row for the per-tick state table
#[derive(Tabled)]
struct SnapshotRow {
    #[tabled(rename = "iface")]
    iface: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "score")]
    score: String,
    #[tabled(rename = "conf")]
    confidence: String,
    #[tabled(rename = "tp(Mb)")]
    throughput: String,
    #[tabled(rename = "rtt(ms)")]
    rtt: String,
    #[tabled(rename = "loss(%)")]
    loss: String,
    #[tabled(rename = "jit(ms)")]
    jitter: String,
}

/// Row for the end-of-run ranking table
#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "rank")]
    rank: usize,
    #[tabled(rename = "iface")]
    iface: String,
    #[tabled(rename = "avg score")]
    avg_score: String,
    #[tabled(rename = "last status")]
    last_status: String,
}

/// Color a status by severity
pub fn color_status(status: LinkStatus) -> String {
    match status {
        LinkStatus::Healthy => status.as_str().green().to_string(),
        LinkStatus::Degraded => status.as_str().yellow().to_string(),
        LinkStatus::Down => status.as_str().red().bold().to_string(),
    }
}

/// Print the per-tick interface state table
pub fn print_snapshot_table(t: i64, snaps: &[InterfaceSnapshot]) {
    println!("\n[t={t}s] Interface states");
    let rows: Vec<SnapshotRow> = snaps
        .iter()
        .map(|s| SnapshotRow {
            iface: s.iface.clone(),
            status: color_status(s.status),
            score: format!("{:.3}", s.score_used),
            confidence: format!("{:.2}", s.confidence),
            throughput: format!("{:.1}", s.avg_tp_mbps),
            rtt: format!("{:.1}", s.avg_rtt_ms),
            loss: format!("{:.2}", s.avg_loss_pct),
            jitter: format!("{:.1}", s.avg_jitter_ms),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()));
}

/// Print one transition line
pub fn print_transition(ev: &TransitionEvent) {
    println!(
        "  {} [{}s] {} {} -> {} | {}",
        "TRANSITION".bold(),
        ev.ts,
        ev.iface.bold(),
        color_status(ev.from),
        color_status(ev.to),
        ev.reason
    );
}

/// Print the end-of-run ranking
pub fn print_summary_table(ranked: &[RankedInterface]) {
    println!("\n{}", "End-of-run summary (ranked by avg score)".bold());
    let rows: Vec<SummaryRow> = ranked
        .iter()
        .enumerate()
        .map(|(i, r)| SummaryRow {
            rank: i + 1,
            iface: r.iface.clone(),
            avg_score: format!("{:.3}", r.avg_score),
            last_status: color_status(r.last_status),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()));
}

/// Print a heading for one scenario run
pub fn print_run_header(scenario: &str, use_ewma: bool) {
    let strategy = if use_ewma { "ewma" } else { "raw" };
    println!(
        "\n{}",
        format!("=== Scenario {scenario} (strategy: {strategy}) ===").bold()
    );
}
