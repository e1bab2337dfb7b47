use anyhow::Result;
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant, SystemTime};
use time::OffsetDateTime;

use crate::constants::LATCH_POLL_SLICE_MS;
use crate::models::{MonitorSummary, PollingConfiguration, SnapshotEvent};
use crate::monitor::session::{MonitorSession, Tick};
use crate::reaper::reap_children;

/// Run the monitoring loop until the latch is set, the mother goes away,
/// or a single tick has been taken in `once` mode.
///
/// `emit` receives every snapshot; an error from it aborts the loop.
pub fn start_monitoring<F>(
    config: &PollingConfiguration,
    latch: &AtomicBool,
    mut emit: F,
) -> Result<MonitorSummary>
where
    F: FnMut(&SnapshotEvent) -> Result<()>,
{
    let session = MonitorSession::new(config.mother_pid, config.strategy);
    let mut summary = MonitorSummary::default();

    while !latch.load(Ordering::SeqCst) {
        let cycle_start = Instant::now();

        let tick = session.tick();
        record_exit_code(&mut summary, tick.last_exit_code);
        summary.ticks += 1;

        let event = snapshot_event(&session, tick)?;
        emit(&event)?;

        if config.once {
            break;
        }
        if !session.mother_alive() {
            info!("Mother process {} has exited", session.mother());
            break;
        }

        // Calculate sleep time to maintain interval
        if let Some(remaining) = config.interval.checked_sub(cycle_start.elapsed()) {
            sleep_unless_latched(remaining, latch);
        }
    }

    summary.interrupted = latch.load(Ordering::SeqCst);
    if summary.interrupted {
        info!("Monitoring stopped by signal");
    }

    // Final drain so nothing that exited during the last interval is left behind
    record_exit_code(&mut summary, reap_children());

    Ok(summary)
}

fn record_exit_code(summary: &mut MonitorSummary, code: i32) {
    if code != 0 {
        summary.last_exit_code = code;
    }
}

fn snapshot_event(session: &MonitorSession, tick: Tick) -> Result<SnapshotEvent> {
    let timestamp = OffsetDateTime::from(SystemTime::now())
        .format(&time::format_description::well_known::Iso8601::DEFAULT)?;

    Ok(SnapshotEvent {
        timestamp,
        mother_pid: session.mother(),
        strategy: session.strategy(),
        pids: tick.pids,
        last_exit_code: tick.last_exit_code,
    })
}

/// Sleep for `duration`, waking early if the latch gets set
fn sleep_unless_latched(duration: Duration, latch: &AtomicBool) {
    let slice = Duration::from_millis(LATCH_POLL_SLICE_MS);
    let deadline = Instant::now() + duration;

    loop {
        if latch.load(Ordering::SeqCst) {
            debug!("Latch set during sleep");
            return;
        }
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        std::thread::sleep(slice.min(deadline - now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DiscoveryStrategy, Pid};

    fn config_for(pid: Pid) -> PollingConfiguration {
        let mut config = PollingConfiguration::new(pid, 0.1).unwrap();
        config.strategy = Some(DiscoveryStrategy::Kernel);
        config
    }

    // ==================== start_monitoring tests ====================

    #[test]
    fn test_once_mode_emits_single_snapshot() {
        let own = std::process::id() as Pid;
        let mut config = config_for(own);
        config.once = true;
        let latch = AtomicBool::new(false);

        let mut events = Vec::new();
        let summary = start_monitoring(&config, &latch, |event| {
            events.push(event.clone());
            Ok(())
        })
        .unwrap();

        assert_eq!(summary.ticks, 1);
        assert!(!summary.interrupted);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].mother_pid, own);
        assert_eq!(events[0].pids.first(), Some(&own), "Mother should come first");
        assert_eq!(events[0].strategy, DiscoveryStrategy::Kernel);
    }

    #[test]
    fn test_preset_latch_takes_no_snapshot() {
        let config = config_for(std::process::id() as Pid);
        let latch = AtomicBool::new(true);

        let summary = start_monitoring(&config, &latch, |_| panic!("no snapshot expected")).unwrap();

        assert_eq!(summary.ticks, 0);
        assert!(summary.interrupted);
    }

    #[test]
    fn test_loop_ends_when_mother_missing() {
        let config = config_for(i32::MAX);
        let latch = AtomicBool::new(false);

        let mut seen = Vec::new();
        let summary = start_monitoring(&config, &latch, |event| {
            seen.push(event.pids.clone());
            Ok(())
        })
        .unwrap();

        assert_eq!(summary.ticks, 1, "One tick is taken before the mother check");
        assert_eq!(seen, vec![vec![i32::MAX]]);
        assert!(!summary.interrupted);
    }

    #[test]
    fn test_emit_error_aborts_loop() {
        let config = config_for(std::process::id() as Pid);
        let latch = AtomicBool::new(false);

        let result = start_monitoring(&config, &latch, |_| Err(anyhow::anyhow!("stdout closed")));
        assert!(result.is_err());
    }

    #[test]
    fn test_latch_set_from_emitter_stops_after_tick() {
        let config = config_for(std::process::id() as Pid);
        let latch = AtomicBool::new(false);

        let summary = start_monitoring(&config, &latch, |_| {
            latch.store(true, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();

        assert_eq!(summary.ticks, 1);
        assert!(summary.interrupted);
    }

    // ==================== helper tests ====================

    #[test]
    fn test_sleep_returns_immediately_when_latched() {
        let latch = AtomicBool::new(true);
        let start = Instant::now();
        sleep_unless_latched(Duration::from_secs(5), &latch);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_record_exit_code_keeps_last_non_zero() {
        let mut summary = MonitorSummary::default();
        record_exit_code(&mut summary, 3);
        record_exit_code(&mut summary, 0);
        assert_eq!(summary.last_exit_code, 3);
        record_exit_code(&mut summary, 7);
        assert_eq!(summary.last_exit_code, 7);
    }
}
