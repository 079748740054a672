//! CSV report writing
//!
//! Flushes the accumulated batch results to three CSV files with increasing
//! field sets:
//!
//! - `<base>minimal.csv` - file name and classification
//! - `<base>confidence.csv` - plus confidence
//! - `<base>.csv` - plus call duration in milliseconds
//!
//! Rows come out sorted by file name because [`BatchResults`] is an ordered
//! map. Each file starts with a header row derived from the record fields.

use crate::batch::{BatchResults, ClassificationRecord};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

/// Errors raised while writing a report file
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Row of the minimal report
#[derive(Debug, Serialize)]
struct MinimalRow<'a> {
    file_name: &'a str,
    classification: &'a str,
}

/// Row of the confidence report
#[derive(Debug, Serialize)]
struct ConfidenceRow<'a> {
    file_name: &'a str,
    classification: &'a str,
    confidence: Option<f64>,
}

/// Writes the three CSV reports for a finished batch
///
/// `base` is used verbatim as the file-name prefix, so it may carry a
/// directory component.
pub fn write_reports(base: &str, results: &BatchResults) -> Result<(), ReportError> {
    write_report(
        PathBuf::from(format!("{base}minimal.csv")),
        &["file_name", "classification"],
        results,
        |r| MinimalRow {
            file_name: &r.file_name,
            classification: &r.classification,
        },
    )?;

    write_report(
        PathBuf::from(format!("{base}confidence.csv")),
        &["file_name", "classification", "confidence"],
        results,
        |r| ConfidenceRow {
            file_name: &r.file_name,
            classification: &r.classification,
            confidence: r.confidence,
        },
    )?;

    write_report(
        PathBuf::from(format!("{base}.csv")),
        &["file_name", "classification", "confidence", "duration_ms"],
        results,
        |r| r.clone(),
    )?;

    info!(rows = results.len(), base, "Reports written");

    Ok(())
}

/// Writes one report, mapping each record through `to_row`
///
/// The header row is written explicitly so an empty batch still produces a
/// header-only file.
fn write_report<'a, R, F>(
    path: PathBuf,
    header: &[&str],
    results: &'a BatchResults,
    to_row: F,
) -> Result<(), ReportError>
where
    R: Serialize,
    F: Fn(&'a ClassificationRecord) -> R,
{
    let map_err = |source: csv::Error| ReportError::Write {
        path: path.clone(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)
        .map_err(|e| map_err(e))?;
    writer.write_record(header).map_err(|e| map_err(e))?;
    for record in results.values() {
        writer.serialize(to_row(record)).map_err(|e| map_err(e))?;
    }
    writer.flush().map_err(|e| map_err(csv::Error::from(e)))?;

    Ok(())
}
