//! Data models module
//!
//! Defines core data structures:
//! - Pid: kernel process identifier
//! - ReapOutcome: classification of a collected child termination
//! - DiscoveryStrategy: which tree walker produces snapshots
//! - PollingConfiguration: validated settings for the monitor loop
//! - SnapshotEvent: one emitted monitoring tick
//! - MonitorSummary: aggregate of a monitoring run

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{POLLING_INTERVAL_MAX, POLLING_INTERVAL_MIN};

/// Kernel process identifier (`pid_t`)
pub type Pid = i32;

/// How a terminated (or stopped/continued) direct child was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReapOutcome {
    /// Normal exit with the given exit code
    Exited(i32),
    /// Killed by the given signal number
    Signaled(i32),
    /// Stopped by the given signal number
    Stopped(i32),
    Continued,
}

impl fmt::Display for ReapOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReapOutcome::Exited(code) => write!(f, "had non-zero return value: {}", code),
            ReapOutcome::Signaled(sig) => write!(f, "exited from signal {}", sig),
            ReapOutcome::Stopped(sig) => write!(f, "was stopped by signal {}", sig),
            ReapOutcome::Continued => write!(f, "was continued"),
        }
    }
}

/// Process tree discovery strategy, chosen once per monitoring session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryStrategy {
    /// Breadth-first walk over `/proc/<pid>/task/<pid>/children`
    Kernel,
    /// Scrape PIDs from `pstree` output on kernels without child listings
    Pstree,
}

impl fmt::Display for DiscoveryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryStrategy::Kernel => f.write_str("kernel"),
            DiscoveryStrategy::Pstree => f.write_str("pstree"),
        }
    }
}

/// Configuration for polling behavior in monitor mode
#[derive(Debug, Clone)]
pub struct PollingConfiguration {
    /// Mother process whose descendants are discovered
    pub mother_pid: Pid,
    /// Polling interval
    pub interval: Duration,
    /// Forced strategy; `None` probes the kernel once at startup
    pub strategy: Option<DiscoveryStrategy>,
    /// Whether to output JSON format
    pub output_json: bool,
    /// Stop after a single tick
    pub once: bool,
    /// Whether to run in quiet mode
    pub quiet_mode: bool,
}

impl PollingConfiguration {
    /// Build a configuration, validating the interval and mother PID
    pub fn new(mother_pid: Pid, interval_secs: f64) -> Result<Self, MonitorError> {
        if !(POLLING_INTERVAL_MIN..=POLLING_INTERVAL_MAX).contains(&interval_secs) {
            return Err(MonitorError::InvalidInterval(interval_secs));
        }
        if mother_pid <= 0 {
            return Err(MonitorError::InvalidPid(mother_pid));
        }

        Ok(Self {
            mother_pid,
            interval: Duration::from_secs_f64(interval_secs),
            strategy: None,
            output_json: false,
            once: false,
            quiet_mode: false,
        })
    }
}

/// One monitoring tick, as emitted to stdout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEvent {
    /// ISO 8601 timestamp of the snapshot
    pub timestamp: String,
    pub mother_pid: Pid,
    pub strategy: DiscoveryStrategy,
    /// Mother first, then descendants in discovery order
    pub pids: Vec<Pid>,
    /// Last normal-exit code seen by the reaper during this tick
    pub last_exit_code: i32,
}

/// Outcome of a whole monitoring run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorSummary {
    /// Number of snapshots taken
    pub ticks: usize,
    /// Last non-zero normal-exit code collected by the reaper, or 0
    pub last_exit_code: i32,
    /// Whether the run ended because the signal latch was set
    pub interrupted: bool,
}

/// Failures inside the tree walkers. None of these escape the public
/// discovery functions; they are logged and turned into empty or partial
/// snapshots.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("child listing for PID {pid} unavailable at {}: {source}", .path.display())]
    KernelInterfaceUnavailable {
        pid: Pid,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to launch {program}: {source}")]
    ExternalCommandLaunchFailure {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed tree printer output: {line:?}")]
    MalformedExternalOutput { line: String },
}

/// End of a reaping drain
#[derive(Debug, thiserror::Error)]
pub enum ReapError {
    #[error("no terminated child currently available")]
    NoTerminatedChild,
}

/// Signal latch installation failures
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("signal {0} cannot be caught")]
    Forbidden(i32),

    #[error("cannot install latch handler for signal {signal}: {source}")]
    Install {
        signal: i32,
        #[source]
        source: std::io::Error,
    },
}

/// Custom error types for monitoring operations
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// Note: bounds must match POLLING_INTERVAL_MIN/MAX in constants.rs
    #[error("Invalid polling interval: {0}. Must be between 0.1 and 300.0 seconds")]
    InvalidInterval(f64),

    #[error("Invalid mother PID: {0}. Must be a positive process identifier")]
    InvalidPid(Pid),
}
