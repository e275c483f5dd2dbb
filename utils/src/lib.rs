//! Shared utilities for the explorer services.

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingError};
