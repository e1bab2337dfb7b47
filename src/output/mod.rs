//! Output formatting module
//!
//! Handles:
//! - Human-readable snapshot lines
//! - JSON lines, one object per snapshot
//! - End-of-run summary (human mode only)

use anyhow::Result;
use pidtree::models::{MonitorSummary, SnapshotEvent};
use std::io::Write;

/// Render one snapshot in human-readable form
pub fn format_human(event: &SnapshotEvent) -> String {
    let pids = event
        .pids
        .iter()
        .map(|pid| pid.to_string())
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "[{}] PID {} ({}): {} processes: {}",
        event.timestamp,
        event.mother_pid,
        event.strategy,
        event.pids.len(),
        pids
    )
}

/// Write one snapshot to stdout and flush so pipes see it immediately
pub fn print_event(event: &SnapshotEvent, json: bool) -> Result<()> {
    let line = if json {
        serde_json::to_string(event)?
    } else {
        format_human(event)
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", line)?;
    stdout.flush()?;
    Ok(())
}

pub fn print_summary(summary: &MonitorSummary) {
    println!();
    println!("Monitoring Summary:");
    println!("  Snapshots: {}", summary.ticks);
    if summary.last_exit_code != 0 {
        println!("  Last child exit code: {}", summary.last_exit_code);
    }
    if summary.interrupted {
        println!("  Status: Stopped by signal");
    }
}
