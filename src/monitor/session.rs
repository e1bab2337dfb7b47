//! One monitoring session over a fixed mother process
//!
//! The discovery strategy is chosen once when the session starts; every
//! tick then takes a fresh snapshot and drains terminated children.

use log::info;
use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid as NixPid;
use std::path::Path;

use crate::constants::PROC_ROOT;
use crate::models::{DiscoveryStrategy, Pid};
use crate::reaper::reap_children;

/// Result of a single tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    pub pids: Vec<Pid>,
    pub last_exit_code: i32,
}

pub struct MonitorSession {
    mother: Pid,
    strategy: DiscoveryStrategy,
}

impl MonitorSession {
    /// Start a session, probing the kernel unless a strategy is forced
    pub fn new(mother: Pid, forced: Option<DiscoveryStrategy>) -> Self {
        let strategy = forced.unwrap_or_else(|| DiscoveryStrategy::detect(mother));
        info!("Monitoring PID {} using {} discovery", mother, strategy);
        Self { mother, strategy }
    }

    pub fn mother(&self) -> Pid {
        self.mother
    }

    pub fn strategy(&self) -> DiscoveryStrategy {
        self.strategy
    }

    /// Fresh snapshot of the mother's process tree
    pub fn snapshot(&self) -> Vec<Pid> {
        self.strategy.discover(self.mother)
    }

    /// Snapshot, then reap whatever terminated since the last tick
    pub fn tick(&self) -> Tick {
        let pids = self.snapshot();
        let last_exit_code = reap_children();
        Tick { pids, last_exit_code }
    }

    /// Whether the mother still exists and has not become a zombie
    pub fn mother_alive(&self) -> bool {
        match kill(NixPid::from_raw(self.mother), None) {
            Ok(()) => !is_zombie(Path::new(PROC_ROOT), self.mother),
            Err(Errno::EPERM) => true,
            Err(_) => false,
        }
    }
}

/// Read the state letter from `<root>/<pid>/stat`. The command name may
/// itself contain `)`, so split on the last one.
fn is_zombie(root: &Path, pid: Pid) -> bool {
    let Ok(stat) = std::fs::read_to_string(root.join(pid.to_string()).join("stat")) else {
        return false;
    };

    stat.rsplit_once(')')
        .and_then(|(_, rest)| rest.split_whitespace().next())
        .map(|state| state == "Z" || state == "X")
        .unwrap_or(false)
}
