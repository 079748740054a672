//! Sequential batch loop and classification records
//!
//! Walks the scanned image list one file at a time, calls the classifier,
//! and accumulates [`ClassificationRecord`]s in a map keyed by file name.
//! A response carrying several labels writes one record per label under the
//! same key, so the last label wins - an artifact of the endpoint's response
//! shape, kept as-is. Failed calls are recorded as placeholder rows and never
//! abort the batch.

use crate::client::{ClassifierClient, ClassifyOutcome};
use crate::config::BatchConfig;
use crate::report::write_reports;
use crate::scan::{ImageFile, ImageScanner};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Label the endpoint uses for "nothing recognized"
pub const NEGATIVE_LABEL: &str = "negative";

/// Replacement label applied when normalization is enabled
pub const UNCLASSIFIED_LABEL: &str = "unclassified";

/// Per-file classification result
///
/// Field order matters: it is the CSV column order of the full report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationRecord {
    /// File name, unique key within a batch
    pub file_name: String,

    /// Classification label, empty for placeholder records
    pub classification: String,

    /// Confidence reported by the endpoint, if any
    pub confidence: Option<f64>,

    /// Wall-clock duration of the classification call in milliseconds
    pub duration_ms: u64,
}

impl ClassificationRecord {
    /// Placeholder record for a failed or empty classification
    pub fn placeholder(file_name: &str, duration_ms: u64) -> Self {
        Self {
            file_name: file_name.to_string(),
            classification: String::new(),
            confidence: None,
            duration_ms,
        }
    }
}

/// Results of a batch, keyed (and therefore sorted) by file name
pub type BatchResults = BTreeMap<String, ClassificationRecord>;

/// Drives the sequential classification of a scanned image list
pub struct BatchRunner {
    client: ClassifierClient,
    normalize: bool,
}

impl BatchRunner {
    pub fn new(client: ClassifierClient, normalize: bool) -> Self {
        Self { client, normalize }
    }

    /// Classifies every image in order and returns the accumulated records
    ///
    /// One record per file is guaranteed: failures and empty responses
    /// produce placeholder records.
    pub async fn run(&self, images: &[ImageFile]) -> BatchResults {
        let batch_start = Instant::now();
        let mut results = BatchResults::new();
        let mut failed = 0usize;

        info!(images = images.len(), "Starting classification batch");

        for image in images {
            let start = Instant::now();
            let outcome = match self.client.classify(image).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(file = %image.file_name, error = %e, "Classification call errored");
                    ClassifyOutcome::Failure {
                        reason: e.to_string(),
                    }
                }
            };
            let duration_ms = start.elapsed().as_millis() as u64;

            if matches!(outcome, ClassifyOutcome::Failure { .. }) {
                failed += 1;
            }

            record_outcome(
                &mut results,
                &image.file_name,
                outcome,
                duration_ms,
                self.normalize,
            );
        }

        info!(
            processed = images.len(),
            failed,
            batch_time_ms = batch_start.elapsed().as_millis() as u64,
            "Classification batch completed"
        );

        results
    }
}

/// Runs a complete batch from configuration: scan, classify, report
///
/// Returns the number of records written. Scan errors pass through
/// unchanged so callers can map them to their own exit codes.
pub async fn run_batch(config: &BatchConfig) -> Result<usize> {
    let scanner = ImageScanner::new(config.input_dir.clone())?;
    let images = scanner.scan()?;

    let client = ClassifierClient::new(config)
        .context("Failed to initialize classifier client")?;
    let runner = BatchRunner::new(client, config.normalize);
    let results = runner.run(&images).await;

    write_reports(&config.output_base, &results).context("Failed to write reports")?;

    Ok(results.len())
}

/// Folds one classification outcome into the result map
///
/// Classified outcomes write one record per label under the file-name key
/// (last label wins). Unclassified and failed outcomes write a placeholder.
pub fn record_outcome(
    results: &mut BatchResults,
    file_name: &str,
    outcome: ClassifyOutcome,
    duration_ms: u64,
    normalize: bool,
) {
    match outcome {
        ClassifyOutcome::Classified(labels) => {
            for (label, confidence) in labels {
                let (classification, confidence) = apply_normalization(label, confidence, normalize);
                debug!(
                    file = file_name,
                    classification = %classification,
                    confidence = ?confidence,
                    duration_ms,
                    "Recording classification"
                );
                results.insert(
                    file_name.to_string(),
                    ClassificationRecord {
                        file_name: file_name.to_string(),
                        classification,
                        confidence,
                        duration_ms,
                    },
                );
            }
        }
        ClassifyOutcome::Unclassified => {
            debug!(file = file_name, "No classification data, recording placeholder");
            results.insert(
                file_name.to_string(),
                ClassificationRecord::placeholder(file_name, duration_ms),
            );
        }
        ClassifyOutcome::Failure { reason } => {
            warn!(file = file_name, reason = %reason, "Recording placeholder for failed classification");
            results.insert(
                file_name.to_string(),
                ClassificationRecord::placeholder(file_name, duration_ms),
            );
        }
    }
}

/// Applies the optional negative-label normalization
fn apply_normalization(
    label: String,
    confidence: Option<f64>,
    normalize: bool,
) -> (String, Option<f64>) {
    if normalize && label == NEGATIVE_LABEL {
        (UNCLASSIFIED_LABEL.to_string(), Some(0.0))
    } else {
        (label, confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    fn classified(labels: &[(&str, Option<f64>)]) -> ClassifyOutcome {
        ClassifyOutcome::Classified(
            labels
                .iter()
                .map(|(l, c)| (l.to_string(), *c))
                .collect(),
        )
    }

    #[parameterized(
        negative_normalized = { "negative", true, "unclassified", Some(0.0) },
        negative_kept = { "negative", false, "negative", Some(0.87) },
        other_label_normalized = { "cat", true, "cat", Some(0.87) },
        other_label_kept = { "cat", false, "cat", Some(0.87) },
    )]
    fn test_apply_normalization(
        label: &str,
        normalize: bool,
        expected_label: &str,
        expected_confidence: Option<f64>,
    ) {
        let (classification, confidence) =
            apply_normalization(label.to_string(), Some(0.87), normalize);
        assert_eq!(classification, expected_label);
        assert_eq!(confidence, expected_confidence);
    }

    #[test]
    fn test_record_classified_outcome() {
        let mut results = BatchResults::new();
        record_outcome(
            &mut results,
            "cat.jpg",
            classified(&[("cat", Some(0.92))]),
            40,
            false,
        );

        assert_eq!(
            results.get("cat.jpg"),
            Some(&ClassificationRecord {
                file_name: "cat.jpg".to_string(),
                classification: "cat".to_string(),
                confidence: Some(0.92),
                duration_ms: 40,
            })
        );
    }

    #[test]
    fn test_record_failure_yields_placeholder() {
        let mut results = BatchResults::new();
        record_outcome(
            &mut results,
            "cat.jpg",
            ClassifyOutcome::Failure {
                reason: "HTTP 500".to_string(),
            },
            12,
            false,
        );

        let record = results.get("cat.jpg").unwrap();
        assert_eq!(record.classification, "");
        assert_eq!(record.confidence, None);
        assert_eq!(record.duration_ms, 12);
    }

    #[test]
    fn test_record_unclassified_yields_placeholder() {
        let mut results = BatchResults::new();
        record_outcome(&mut results, "cat.jpg", ClassifyOutcome::Unclassified, 7, true);

        assert_eq!(
            results.get("cat.jpg"),
            Some(&ClassificationRecord::placeholder("cat.jpg", 7))
        );
    }

    #[test]
    fn test_last_label_wins() {
        let mut results = BatchResults::new();
        record_outcome(
            &mut results,
            "cat.jpg",
            classified(&[("animal", Some(0.99)), ("cat", Some(0.92))]),
            40,
            false,
        );

        assert_eq!(results.len(), 1);
        assert_eq!(results.get("cat.jpg").unwrap().classification, "cat");
    }

    #[test]
    fn test_one_record_per_file() {
        let mut results = BatchResults::new();
        record_outcome(&mut results, "a.jpg", classified(&[("cat", Some(0.9))]), 10, false);
        record_outcome(&mut results, "b.jpg", ClassifyOutcome::Unclassified, 11, false);
        record_outcome(
            &mut results,
            "c.jpg",
            ClassifyOutcome::Failure {
                reason: "timeout".to_string(),
            },
            12,
            false,
        );

        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_results_sorted_by_file_name() {
        let mut results = BatchResults::new();
        for name in ["zebra.jpg", "ant.png", "mole.jpeg"] {
            record_outcome(&mut results, name, ClassifyOutcome::Unclassified, 1, false);
        }

        let keys: Vec<&String> = results.keys().collect();
        assert_eq!(keys, vec!["ant.png", "mole.jpeg", "zebra.jpg"]);
    }

    #[test]
    fn test_normalization_in_record_outcome() {
        let mut results = BatchResults::new();
        record_outcome(
            &mut results,
            "empty.jpg",
            classified(&[("negative", Some(0.75))]),
            22,
            true,
        );

        let record = results.get("empty.jpg").unwrap();
        assert_eq!(record.classification, UNCLASSIFIED_LABEL);
        assert_eq!(record.confidence, Some(0.0));
    }
}
