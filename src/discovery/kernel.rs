//! Breadth-first process tree walk over the kernel's per-task child
//! listings (`/proc/<pid>/task/<pid>/children`).

use log::debug;
use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;

use crate::constants::PROC_ROOT;
use crate::discovery::probe::children_path;
use crate::models::{DiscoveryError, Pid};

/// Walks a process tree rooted at a mother PID using procfs child listings
#[derive(Debug, Clone)]
pub struct KernelWalker {
    root: PathBuf,
}

impl KernelWalker {
    pub fn new() -> Self {
        Self::with_root(PROC_ROOT)
    }

    /// Walk an alternate procfs-shaped directory tree
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Direct children of `pid`, in the order the kernel lists them.
    ///
    /// Tokens are read until the first one that is not an integer.
    pub fn children(&self, pid: Pid) -> Result<Vec<Pid>, DiscoveryError> {
        let path = children_path(&self.root, pid);
        let contents = std::fs::read_to_string(&path)
            .map_err(|source| DiscoveryError::KernelInterfaceUnavailable { pid, path, source })?;

        Ok(contents
            .split_whitespace()
            .map_while(|token| token.parse::<Pid>().ok())
            .collect())
    }

    /// Snapshot of `mother` and all transitive descendants, breadth first.
    ///
    /// A PID whose listing cannot be read (typically because it exited
    /// mid-walk) contributes itself but no children.
    pub fn walk(&self, mother: Pid) -> Vec<Pid> {
        let mut snapshot = Vec::new();
        let mut seen = HashSet::from([mother]);
        let mut unprocessed = VecDeque::from([mother]);

        while let Some(&front) = unprocessed.front() {
            match self.children(front) {
                Ok(children) => {
                    for child in children {
                        // PID reuse mid-walk could otherwise revisit a node
                        if seen.insert(child) {
                            unprocessed.push_back(child);
                        } else {
                            debug!("PID {} listed twice under mother {}, skipping", child, mother);
                        }
                    }
                }
                Err(err) => debug!("{}; treating PID {} as childless", err, front),
            }
            snapshot.push(front);
            unprocessed.pop_front();
        }

        snapshot
    }
}

impl Default for KernelWalker {
    fn default() -> Self {
        Self::new()
    }
}

/// Discover the process tree of `mother` through `/proc` child listings
pub fn discover_primary(mother: Pid) -> Vec<Pid> {
    KernelWalker::new().walk(mother)
}
