//! Process-wide signal latch
//!
//! A registered handler only stores `true` into a shared atomic flag.
//! Monitoring code polls the flag between iterations; nothing else runs in
//! signal context.

use log::debug;
use signal_hook::SigId;
use std::os::raw::c_int;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use crate::models::SignalError;

static SIGNAL_LATCH: OnceLock<Arc<AtomicBool>> = OnceLock::new();

fn latch() -> &'static Arc<AtomicBool> {
    SIGNAL_LATCH.get_or_init(|| Arc::new(AtomicBool::new(false)))
}

/// Install the latch handler for `signal`.
///
/// Can be called for several signals; they all set the same latch. The
/// returned id may be passed to `signal_hook::low_level::unregister`.
pub fn install_signal_handler(signal: c_int) -> Result<SigId, SignalError> {
    if signal_hook::consts::FORBIDDEN.contains(&signal) {
        return Err(SignalError::Forbidden(signal));
    }

    let id = signal_hook::flag::register(signal, Arc::clone(latch()))
        .map_err(|source| SignalError::Install { signal, source })?;
    debug!("Signal latch installed for signal {}", signal);
    Ok(id)
}

/// Whether a latched signal has been received. Never blocks; once true it
/// stays true.
pub fn signal_latch_read() -> bool {
    latch().load(Ordering::SeqCst)
}

/// Shared handle on the latch, for loops that take an `AtomicBool`
pub fn latch_flag() -> Arc<AtomicBool> {
    Arc::clone(latch())
}
