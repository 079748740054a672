//! Utility modules for imgclass
//!
//! Currently only the structured logging setup lives here.

pub mod logging;

// Re-export commonly used items
pub use logging::{init_default, init_from_env, init_logging, LoggingConfig};
