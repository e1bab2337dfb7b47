//! Process tree discovery
//!
//! Two interchangeable walkers produce a snapshot (mother first, then
//! descendants in discovery order):
//! - kernel: breadth-first over `/proc/<pid>/task/<pid>/children`
//! - pstree: scraping `pstree -A -l -p` output on kernels lacking that file

pub mod kernel;
pub mod probe;
pub mod pstree;

pub use kernel::{discover_primary, KernelWalker};
pub use probe::capability_probe;
pub use pstree::{discover_legacy, PstreeWalker};

use log::debug;

use crate::models::{DiscoveryStrategy, Pid};

impl DiscoveryStrategy {
    /// Pick the walker for a session by probing the mother once
    pub fn detect(mother: Pid) -> Self {
        let strategy = if capability_probe(mother) {
            DiscoveryStrategy::Kernel
        } else {
            DiscoveryStrategy::Pstree
        };
        debug!("Discovery strategy for PID {}: {}", mother, strategy);
        strategy
    }

    /// Take a fresh snapshot of `mother`'s process tree
    pub fn discover(self, mother: Pid) -> Vec<Pid> {
        match self {
            DiscoveryStrategy::Kernel => discover_primary(mother),
            DiscoveryStrategy::Pstree => discover_legacy(mother),
        }
    }
}
