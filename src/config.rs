//! Configuration for a classification batch run
//!
//! All settings live in an explicit [`BatchConfig`] struct built from the
//! parsed CLI arguments and handed to every collaborator. Ambient settings
//! fall back to environment variables when not given on the command line.
//!
//! # Environment Variables
//!
//! - `IMGCLASS_LOG_LEVEL`: Logging level - default: "info"
//! - `IMGCLASS_REQUEST_TIMEOUT`: Per-request timeout in seconds - default: "30"
//!
//! # Example
//!
//! ```no_run
//! use imgclass::cli::CliArgs;
//! use imgclass::config::BatchConfig;
//! use clap::Parser;
//!
//! let args = CliArgs::parse();
//! let config = BatchConfig::from_args(&args);
//! config.validate().expect("Invalid configuration");
//! ```

use crate::cli::CliArgs;
use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Endpoint URL is not usable
    #[error("Invalid endpoint URL: {0}. Expected an http:// or https:// URL")]
    InvalidEndpoint(String),

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Basic-auth credential pair for the classifier endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

/// Main configuration for a batch run
///
/// Built from CLI arguments via [`BatchConfig::from_args`], with environment
/// fallbacks for the ambient settings (timeout, log level).
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Classifier endpoint URL
    pub endpoint: String,

    /// Directory containing the images to classify
    pub input_dir: PathBuf,

    /// Base name for the output CSV files
    pub output_base: String,

    /// Optional basic-auth credentials
    pub credentials: Option<Credentials>,

    /// Relabel "negative" classifications as "unclassified" with zero confidence
    pub normalize: bool,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl BatchConfig {
    /// Builds a configuration from parsed CLI arguments
    ///
    /// `--timeout` and `--log-level` fall back to `IMGCLASS_REQUEST_TIMEOUT`
    /// and `IMGCLASS_LOG_LEVEL` when omitted, then to the built-in defaults.
    pub fn from_args(args: &CliArgs) -> Self {
        let credentials = match (&args.user, &args.passwd) {
            (Some(user), Some(password)) => Some(Credentials {
                user: user.clone(),
                password: password.clone(),
            }),
            _ => None,
        };

        let request_timeout_secs = args
            .timeout
            .or_else(|| {
                env::var("IMGCLASS_REQUEST_TIMEOUT")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
            })
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let log_level = args
            .log_level
            .clone()
            .or_else(|| env::var("IMGCLASS_LOG_LEVEL").ok())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            endpoint: args.url.clone(),
            input_dir: args.dir.clone(),
            output_base: args.file.clone(),
            credentials,
            normalize: args.normalize,
            request_timeout_secs,
            log_level,
        }
    }

    /// Validates the configuration
    ///
    /// Checks that the endpoint looks like an HTTP(S) URL, the timeout is in
    /// a sane range, and the log level is recognized. Reachability of the
    /// endpoint is not checked here; unreachable endpoints surface as
    /// per-file failures during the batch.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any validation fails
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(ConfigError::InvalidEndpoint(self.endpoint.clone()));
        }

        if self.output_base.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Output base name must not be empty".to_string(),
            ));
        }

        // Timeout must be at least 1 second, max 10 minutes
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs > 600 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 10 minutes".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }
}

impl fmt::Display for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Imgclass Configuration:")?;
        writeln!(f, "  Endpoint: {}", self.endpoint)?;
        writeln!(f, "  Input Dir: {}", self.input_dir.display())?;
        writeln!(f, "  Output Base: {}", self.output_base)?;
        writeln!(
            f,
            "  Basic Auth: {}",
            match &self.credentials {
                Some(c) => c.user.as_str(),
                None => "disabled",
            }
        )?;
        writeln!(f, "  Normalize: {}", self.normalize)?;
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serial_test::serial;

    /// Helper to temporarily set environment variables for testing
    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn unset(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    fn parse(argv: &[&str]) -> CliArgs {
        CliArgs::parse_from(argv.iter().copied())
    }

    fn base_args() -> CliArgs {
        parse(&[
            "imgclass",
            "--file",
            "results",
            "--dir",
            "/tmp/images",
            "--url",
            "https://classifier.local/classify",
        ])
    }

    #[test]
    #[serial]
    fn test_defaults() {
        let _guards = vec![
            EnvGuard::unset("IMGCLASS_REQUEST_TIMEOUT"),
            EnvGuard::unset("IMGCLASS_LOG_LEVEL"),
        ];

        let config = BatchConfig::from_args(&base_args());

        assert_eq!(config.endpoint, "https://classifier.local/classify");
        assert_eq!(config.input_dir, PathBuf::from("/tmp/images"));
        assert_eq!(config.output_base, "results");
        assert!(config.credentials.is_none());
        assert!(!config.normalize);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    #[serial]
    fn test_environment_fallbacks() {
        let _guards = vec![
            EnvGuard::set("IMGCLASS_REQUEST_TIMEOUT", "90"),
            EnvGuard::set("IMGCLASS_LOG_LEVEL", "DEBUG"),
        ];

        let config = BatchConfig::from_args(&base_args());

        assert_eq!(config.request_timeout_secs, 90);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    #[serial]
    fn test_flags_override_environment() {
        let _guards = vec![
            EnvGuard::set("IMGCLASS_REQUEST_TIMEOUT", "90"),
            EnvGuard::set("IMGCLASS_LOG_LEVEL", "warn"),
        ];

        let args = parse(&[
            "imgclass",
            "--file",
            "results",
            "--dir",
            "/tmp/images",
            "--url",
            "http://localhost:9000/classify",
            "--timeout",
            "15",
            "--log-level",
            "trace",
        ]);
        let config = BatchConfig::from_args(&args);

        assert_eq!(config.request_timeout_secs, 15);
        assert_eq!(config.log_level, "trace");
    }

    #[test]
    fn test_credentials_parsed() {
        let args = parse(&[
            "imgclass",
            "--file",
            "results",
            "--dir",
            "/tmp/images",
            "--url",
            "https://classifier.local/classify",
            "--user",
            "alice",
            "--passwd",
            "secret",
        ]);
        let config = BatchConfig::from_args(&args);

        assert_eq!(
            config.credentials,
            Some(Credentials {
                user: "alice".to_string(),
                password: "secret".to_string(),
            })
        );
    }

    #[test]
    #[serial]
    fn test_validation_valid() {
        let _guards = vec![
            EnvGuard::unset("IMGCLASS_REQUEST_TIMEOUT"),
            EnvGuard::unset("IMGCLASS_LOG_LEVEL"),
        ];

        let config = BatchConfig::from_args(&base_args());
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_validation_rejects_bad_endpoint() {
        let _guards = vec![
            EnvGuard::unset("IMGCLASS_REQUEST_TIMEOUT"),
            EnvGuard::unset("IMGCLASS_LOG_LEVEL"),
        ];

        let mut config = BatchConfig::from_args(&base_args());
        config.endpoint = "ftp://classifier.local/classify".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidEndpoint(_))
        ));
    }

    #[test]
    #[serial]
    fn test_validation_rejects_zero_timeout() {
        let _guards = vec![
            EnvGuard::unset("IMGCLASS_REQUEST_TIMEOUT"),
            EnvGuard::unset("IMGCLASS_LOG_LEVEL"),
        ];

        let mut config = BatchConfig::from_args(&base_args());
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_validation_rejects_bad_log_level() {
        let _guards = vec![
            EnvGuard::unset("IMGCLASS_REQUEST_TIMEOUT"),
            EnvGuard::unset("IMGCLASS_LOG_LEVEL"),
        ];

        let mut config = BatchConfig::from_args(&base_args());
        config.log_level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_config_display() {
        let _guards = vec![
            EnvGuard::unset("IMGCLASS_REQUEST_TIMEOUT"),
            EnvGuard::unset("IMGCLASS_LOG_LEVEL"),
        ];

        let config = BatchConfig::from_args(&base_args());
        let display = format!("{}", config);
        assert!(display.contains("Imgclass Configuration:"));
        assert!(display.contains("Endpoint:"));
        assert!(display.contains("Basic Auth: disabled"));
    }
}
