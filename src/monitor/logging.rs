use anyhow::Result;
use env_logger::Env;

/// Initialize stderr logging. `RUST_LOG` overrides the default level,
/// which is `info` (or `warn` in quiet mode).
pub fn init_logger(quiet: bool) -> Result<()> {
    let default_level = if quiet { "warn" } else { "info" };

    env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set logger: {}", e))
}
