// Common utilities shared across the binaries

pub mod logging;
pub mod panic;
pub mod shutdown;

pub use logging::init_tracing;
pub use panic::panic_message;
pub use shutdown::shutdown_signal;
