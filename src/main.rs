#![forbid(unsafe_code)]

mod cli;
mod output;

use anyhow::{Context, Result};
use log::{info, warn};
use signal_hook::consts::{SIGINT, SIGTERM, SIGUSR1};

use pidtree::monitor::{init_logger, start_monitoring};
use pidtree::signals::{install_signal_handler, latch_flag};

fn main() -> Result<()> {
    let config = cli::parse_args()?;

    if let Err(err) = init_logger(config.quiet_mode) {
        eprintln!("Warning: {}", err);
    }

    // Set up interrupt handling
    for signal in [SIGUSR1, SIGINT, SIGTERM] {
        install_signal_handler(signal)
            .with_context(|| format!("Failed to install handler for signal {}", signal))?;
    }
    let latch = latch_flag();

    let summary = start_monitoring(&config, &latch, |event| {
        output::print_event(event, config.output_json)
    })?;

    if summary.ticks == 0 {
        warn!("No snapshot was taken");
    }
    info!(
        "Took {} snapshots of PID {}",
        summary.ticks, config.mother_pid
    );

    if !config.output_json && !config.quiet_mode {
        output::print_summary(&summary);
    }

    Ok(())
}
