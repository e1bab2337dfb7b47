//! Global constants for pidtree
//!
//! Centralized location for kernel paths, external tool invocation and
//! polling bounds

/// Mount point of the kernel process filesystem
pub const PROC_ROOT: &str = "/proc";

/// External tree printer used by the legacy discovery path
pub const PSTREE_PROGRAM: &str = "pstree";

/// ASCII art output (`-A`), no truncation at 132 columns when piped (`-l`),
/// PID annotations (`-p`)
pub const PSTREE_ARGS: &[&str] = &["-A", "-l", "-p"];

/// Size of the fixed read buffer for `pstree` output, one byte reserved
/// for the terminator as with `fgets`
pub const PSTREE_LINE_BUFFER: usize = 256;

/// Note: bounds must match the message in `MonitorError::InvalidInterval`
pub const POLLING_INTERVAL_MIN: f64 = 0.1;
pub const POLLING_INTERVAL_MAX: f64 = 300.0;

/// Granularity at which a sleeping monitor loop re-checks the signal latch
pub const LATCH_POLL_SLICE_MS: u64 = 100;
