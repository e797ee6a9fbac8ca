//! CloudPlugs Core - Foundation types, error handling, configuration, and logging.
//!
//! This crate provides the shared foundation used by the other CloudPlugs crates:
//! - Client configuration (endpoint, timeout, credentials, TLS bundle)
//! - The error taxonomy and its numeric codes
//! - Structured logging with tracing
//! - Header names, resource paths, field names and defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod platform;

// Re-export commonly used items at the crate root
pub use config::{AppConfig, ClientConfig};
pub use error::{CpError, CpResult, ErrorKind};
pub use logging::init_logging;
pub use platform::Platform;
