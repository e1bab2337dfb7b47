pub mod logging;
pub mod polling;
pub mod session;

pub use logging::init_logger;
pub use polling::start_monitoring;
pub use session::MonitorSession;
