//! Image file enumeration
//!
//! Lists the image files directly inside the input directory. Only regular
//! files with a `jpg`, `jpeg`, or `png` extension (case-insensitive) are
//! picked up; subdirectories and other files are skipped. The resulting list
//! is sorted by file name so the batch processes files in a stable order.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Extensions treated as images, compared case-insensitively
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Errors raised while enumerating the input directory
///
/// All of these are fatal for the run; per-file problems during
/// classification are handled downstream and never surface here.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Input directory does not exist: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Input path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An image file queued for classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// Full path to the file
    pub path: PathBuf,

    /// File name used as the record key and multipart file name
    pub file_name: String,
}

/// Enumerates image files in a single directory
#[derive(Debug)]
pub struct ImageScanner {
    input_dir: PathBuf,
}

impl ImageScanner {
    /// Creates a scanner for the given directory
    ///
    /// # Errors
    ///
    /// Returns `ScanError::DirectoryNotFound` / `ScanError::NotADirectory`
    /// when the path is unusable; callers map these to exit code 2.
    pub fn new(input_dir: PathBuf) -> Result<Self, ScanError> {
        if !input_dir.exists() {
            return Err(ScanError::DirectoryNotFound(input_dir));
        }
        if !input_dir.is_dir() {
            return Err(ScanError::NotADirectory(input_dir));
        }

        debug!(input_dir = %input_dir.display(), "ImageScanner initialized");

        Ok(Self { input_dir })
    }

    /// Lists the image files in the input directory, sorted by file name
    pub fn scan(&self) -> Result<Vec<ImageFile>, ScanError> {
        let start = Instant::now();

        let entries = fs::read_dir(&self.input_dir).map_err(|source| ScanError::ReadDir {
            path: self.input_dir.clone(),
            source,
        })?;

        let mut images = Vec::new();
        let mut skipped = 0usize;

        for result in entries {
            let entry = match result {
                Ok(e) => e,
                Err(err) => {
                    warn!(error = %err, "Failed to read directory entry");
                    continue;
                }
            };
            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                warn!(path = %path.display(), "Skipping file with non-UTF-8 name");
                continue;
            };

            if !has_image_extension(&path) {
                debug!(file = file_name, "Skipping non-image file");
                skipped += 1;
                continue;
            }

            images.push(ImageFile {
                file_name: file_name.to_string(),
                path,
            });
        }

        images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

        info!(
            images_found = images.len(),
            skipped,
            scan_time_ms = start.elapsed().as_millis() as u64,
            "Image scan completed"
        );

        Ok(images)
    }
}

/// Checks for a jpg/jpeg/png extension, case-insensitive
fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
