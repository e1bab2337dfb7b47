//! pidtree - process tree discovery and child reaping
//!
//! This library discovers the descendants of a mother process (through
//! `/proc` child listings, or by scraping `pstree` where those are
//! missing), latches termination signals for cooperative shutdown, and
//! drains terminated children without blocking.

pub mod constants;
pub mod discovery;
pub mod models;
pub mod monitor;
pub mod reaper;
pub mod signals;

pub use discovery::{capability_probe, discover_legacy, discover_primary};
pub use models::{DiscoveryStrategy, Pid, ReapOutcome};
pub use reaper::reap_children;
pub use signals::{install_signal_handler, signal_latch_read};
