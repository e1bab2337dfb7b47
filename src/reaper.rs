//! Non-blocking collection of terminated direct children
//!
//! Call `reap_children` once per monitoring tick and once more at
//! shutdown so children exiting between ticks never linger as zombies.

use log::{debug, info};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid as NixPid;

use crate::models::{Pid, ReapError, ReapOutcome};

/// Map a wait status onto a reap outcome. `StillAlive` and ptrace events
/// carry nothing worth reporting.
pub fn classify(status: WaitStatus) -> Option<(Pid, ReapOutcome)> {
    match status {
        WaitStatus::Exited(pid, code) => Some((pid.as_raw(), ReapOutcome::Exited(code))),
        WaitStatus::Signaled(pid, signal, _) => {
            Some((pid.as_raw(), ReapOutcome::Signaled(signal as i32)))
        }
        WaitStatus::Stopped(pid, signal) => Some((pid.as_raw(), ReapOutcome::Stopped(signal as i32))),
        WaitStatus::Continued(pid) => Some((pid.as_raw(), ReapOutcome::Continued)),
        _ => None,
    }
}

/// Poll once for any direct child with a pending status change.
fn next_terminated() -> Result<WaitStatus, ReapError> {
    match waitpid(NixPid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
        Ok(WaitStatus::StillAlive) | Err(_) => Err(ReapError::NoTerminatedChild),
        Ok(status) => Ok(status),
    }
}

/// Drain every terminated direct child without blocking.
///
/// Returns the exit code of the last child seen exiting normally with a
/// non-zero code, or 0. Children that exit with code 0 are collected but
/// neither change the return value nor get logged above debug level.
pub fn reap_children() -> i32 {
    let mut return_code = 0;

    loop {
        let status = match next_terminated() {
            Ok(status) => status,
            Err(ReapError::NoTerminatedChild) => break,
        };

        match classify(status) {
            Some((pid, ReapOutcome::Exited(0))) => {
                debug!("Child process {} exited cleanly", pid);
            }
            Some((pid, outcome)) => {
                if let ReapOutcome::Exited(code) = outcome {
                    return_code = code;
                }
                info!("Child process {} {}", pid, outcome);
            }
            None => debug!("Ignoring wait status {:?}", status),
        }
    }

    return_code
}
