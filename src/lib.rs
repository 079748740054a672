//! imgclass - batch image classification client with CSV reporting
//!
//! This library submits every image in a directory to a remote HTTP
//! classification endpoint and collects the results into per-file
//! classification records, which are written out as a set of CSV reports.
//!
//! # Core Concepts
//!
//! - **Scan**: Enumerate the image files (jpg/jpeg/png) directly inside the
//!   input directory
//! - **Classify**: One multipart POST per file against the configured
//!   endpoint, with optional basic authentication
//! - **Record**: Per-file result tuple of file name, classification label,
//!   confidence, and call duration; failed calls become placeholder records
//! - **Report**: Three CSV files with increasing field sets, rows sorted by
//!   file name
//!
//! # Example Usage
//!
//! ```ignore
//! use imgclass::batch::run_batch;
//! use imgclass::config::BatchConfig;
//!
//! async fn classify_directory(config: BatchConfig) -> anyhow::Result<()> {
//!     let records = run_batch(&config).await?;
//!     println!("{} records written", records);
//!     Ok(())
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`scan`]: Image file enumeration
//! - [`client`]: HTTP classifier client and response interpretation
//! - [`batch`]: Sequential batch loop and classification records
//! - [`report`]: CSV report writing

// Public modules
pub mod batch;
pub mod cli;
pub mod client;
pub mod config;
pub mod report;
pub mod scan;
pub mod util;

// Re-export key types for convenient access
pub use batch::{run_batch, BatchRunner, ClassificationRecord};
pub use client::{ClassifierClient, ClassifyOutcome, ClientError};
pub use config::{BatchConfig, ConfigError, Credentials};
pub use report::{write_reports, ReportError};
pub use scan::{ImageFile, ImageScanner, ScanError};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
