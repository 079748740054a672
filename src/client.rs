//! HTTP client for the remote classification endpoint
//!
//! This module wraps a `reqwest` client that submits one image per call as a
//! multipart POST and interprets the response. The endpoint is treated as a
//! black box: an HTTP transport error, a non-success status, or a JSON body
//! carrying `"result": "fail"` all count as an unsuccessful classification,
//! while any other response is a success - even when the body is not JSON.
//!
//! TLS certificate verification is disabled; the tool is pointed at internal
//! endpoints with self-signed certificates.
//!
//! # Example
//!
//! ```no_run
//! use imgclass::client::ClassifierClient;
//! use imgclass::config::BatchConfig;
//! use imgclass::scan::ImageFile;
//! use std::path::PathBuf;
//!
//! # async fn example(config: BatchConfig) -> Result<(), Box<dyn std::error::Error>> {
//! let client = ClassifierClient::new(&config)?;
//!
//! let image = ImageFile {
//!     path: PathBuf::from("/images/cat.jpg"),
//!     file_name: "cat.jpg".to_string(),
//! };
//!
//! let outcome = client.classify(&image).await?;
//! println!("Outcome: {:?}", outcome);
//! # Ok(())
//! # }
//! ```

use crate::config::{BatchConfig, Credentials};
use crate::scan::ImageFile;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Multipart field name the endpoint expects the image under
const IMAGE_FIELD: &str = "file";

/// Errors raised on the client side, before a response is available
///
/// Transport failures and unhappy responses are NOT errors here; they are
/// regular [`ClassifyOutcome::Failure`] values so a single bad file never
/// aborts the batch.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The underlying HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// The image file could not be read from disk
    #[error("Failed to read image {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The multipart request body could not be assembled
    #[error("Failed to build multipart request for {file_name}: {source}")]
    Request {
        file_name: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Result of a single classification call
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifyOutcome {
    /// The endpoint returned usable classification data: label -> confidence
    Classified(Vec<(String, Option<f64>)>),

    /// The call succeeded but carried no usable classification data
    /// (missing or empty `classified` object, or a non-JSON body)
    Unclassified,

    /// Transport error, non-success HTTP status, or a `"result": "fail"` body
    Failure { reason: String },
}

/// Classifier response body, as far as this tool cares about it
///
/// Unknown fields are ignored; both fields are optional because the endpoint
/// is free to answer with anything on success.
#[derive(Debug, Clone, Deserialize)]
struct ClassifyResponse {
    result: Option<String>,
    classified: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Client for the remote classification endpoint
///
/// Thread-safe; the inner `reqwest::Client` pools connections across the
/// sequential calls of a batch.
pub struct ClassifierClient {
    /// Endpoint URL, used verbatim for every POST
    endpoint: String,

    /// Optional basic-auth credentials
    credentials: Option<Credentials>,

    /// Shared HTTP client with connection pooling
    http_client: Client,

    /// Request timeout duration
    timeout: Duration,
}

impl ClassifierClient {
    /// Creates a client from the batch configuration
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Build` if the HTTP client cannot be constructed.
    pub fn new(config: &BatchConfig) -> Result<Self, ClientError> {
        let timeout = Duration::from_secs(config.request_timeout_secs);

        // Internal endpoints routinely carry self-signed certificates
        let http_client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            credentials: config.credentials.clone(),
            http_client,
            timeout,
        })
    }

    /// Submits one image and interprets the response
    ///
    /// A single attempt per file, no retry. Transport failures and unhappy
    /// responses come back as [`ClassifyOutcome::Failure`]; only local
    /// problems (unreadable file, unbuildable request) are `Err`.
    pub async fn classify(&self, image: &ImageFile) -> Result<ClassifyOutcome, ClientError> {
        let bytes = tokio::fs::read(&image.path)
            .await
            .map_err(|source| ClientError::FileRead {
                path: image.path.clone(),
                source,
            })?;

        debug!(
            file = %image.file_name,
            bytes = bytes.len(),
            "Submitting image for classification"
        );

        let part = Part::bytes(bytes)
            .file_name(image.file_name.clone())
            .mime_str(mime_for(&image.file_name))
            .map_err(|source| ClientError::Request {
                file_name: image.file_name.clone(),
                source,
            })?;
        let form = Form::new().part(IMAGE_FIELD, part);

        let mut request = self.http_client.post(&self.endpoint).multipart(form);
        if let Some(creds) = &self.credentials {
            request = request.basic_auth(&creds.user, Some(&creds.password));
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let reason = if e.is_timeout() {
                    format!("request timed out after {}s", self.timeout.as_secs())
                } else if e.is_connect() {
                    format!("cannot connect to {}", self.endpoint)
                } else {
                    format!("request failed: {}", e)
                };
                warn!(file = %image.file_name, reason = %reason, "Classification call failed");
                return Ok(ClassifyOutcome::Failure { reason });
            }
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        Ok(interpret_response(status, &body))
    }
}

impl fmt::Debug for ClassifierClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierClient")
            .field("endpoint", &self.endpoint)
            .field("basic_auth", &self.credentials.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Maps an HTTP status and body to a classification outcome
///
/// Non-success statuses and `"result": "fail"` bodies are failures. Any
/// other success response counts as successful; a body without a usable
/// `classified` object (including non-JSON bodies) yields `Unclassified`.
pub fn interpret_response(status: StatusCode, body: &str) -> ClassifyOutcome {
    if !status.is_success() {
        return ClassifyOutcome::Failure {
            reason: format!("HTTP {}", status),
        };
    }

    let Ok(parsed) = serde_json::from_str::<ClassifyResponse>(body) else {
        debug!("Response body is not classifier JSON, treating as unclassified");
        return ClassifyOutcome::Unclassified;
    };

    if parsed.result.as_deref() == Some("fail") {
        return ClassifyOutcome::Failure {
            reason: "endpoint reported classification failure".to_string(),
        };
    }

    match parsed.classified {
        Some(map) if !map.is_empty() => {
            let labels = map
                .iter()
                .map(|(label, confidence)| (label.clone(), confidence.as_f64()))
                .collect();
            ClassifyOutcome::Classified(labels)
        }
        _ => ClassifyOutcome::Unclassified,
    }
}

/// Content type for the multipart file part, keyed on the file extension
fn mime_for(file_name: &str) -> &'static str {
    let lower = file_name.to_lowercase();
    if lower.ends_with(".png") {
        "image/png"
    } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else {
        "application/octet-stream"
    }
}
