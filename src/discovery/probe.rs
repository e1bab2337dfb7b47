use std::path::{Path, PathBuf};

use crate::constants::PROC_ROOT;
use crate::models::Pid;

/// Location of the main thread's child listing for `pid` under `root`
pub fn children_path(root: &Path, pid: Pid) -> PathBuf {
    let pid = pid.to_string();
    root.join(&pid).join("task").join(&pid).join("children")
}

/// Return true if the kernel exposes child PIDs for `pid` via `/proc`.
///
/// Only stats the listing, never reads it. Any failure (missing process,
/// kernel built without the interface, permission trouble) reports false.
pub fn capability_probe(pid: Pid) -> bool {
    probe_at(Path::new(PROC_ROOT), pid)
}

pub(crate) fn probe_at(root: &Path, pid: Pid) -> bool {
    std::fs::metadata(children_path(root, pid)).is_ok()
}
