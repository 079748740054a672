//! Structured logging setup for imgclass
//!
//! Initialization and configuration for structured logging using the
//! `tracing` ecosystem. Logs go to stderr so they never mix with the CSV
//! output on stdout-adjacent workflows.
//!
//! # Example
//!
//! ```no_run
//! use imgclass::util::logging;
//!
//! // Initialize with default configuration
//! logging::init_default();
//!
//! // Or initialize from environment variables
//! logging::init_from_env();
//!
//! use tracing::{info, warn};
//!
//! info!("Batch started");
//! warn!(file = "cat.jpg", "Classification failed");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Ensures logging is only initialized once
static INIT: Once = Once::new();

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to display
    pub level: Level,

    /// Use JSON output format (for structured logging in CI)
    pub use_json: bool,

    /// Include the module target (e.g., imgclass::batch) in logs
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
        }
    }
}

impl LoggingConfig {
    /// Creates a logging configuration with the specified level
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }
}

/// Parses a log level from a string
///
/// Falls back to `Level::INFO` for unrecognized input.
///
/// # Example
///
/// ```
/// use imgclass::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("INFO"), Level::INFO);
/// assert_eq!(parse_level("invalid"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

/// Initializes the logging system with the provided configuration
///
/// Can only be called once; subsequent calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();

        // If RUST_LOG is not set, apply our default filter
        if env::var("RUST_LOG").is_err() {
            filter = filter
                .add_directive(
                    format!("imgclass={}", config.level)
                        .parse()
                        .expect("valid directive"),
                )
                .add_directive("hyper=warn".parse().expect("valid directive"))
                .add_directive("reqwest=warn".parse().expect("valid directive"));
        }

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(config.include_target)
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(config.include_target)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    });
}

/// Initializes logging with default configuration (INFO, pretty console)
pub fn init_default() {
    init_logging(LoggingConfig::default());
}

/// Initializes logging from environment variables
///
/// Reads `IMGCLASS_LOG_LEVEL` (trace/debug/info/warn/error) and
/// `IMGCLASS_LOG_JSON` (true/false); `RUST_LOG` still takes precedence for
/// filtering.
pub fn init_from_env() {
    let level_str = env::var("IMGCLASS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let level = parse_level(&level_str);

    let use_json = env::var("IMGCLASS_LOG_JSON")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);

    let config = LoggingConfig {
        level,
        use_json,
        ..Default::default()
    };

    init_logging(config);
}
