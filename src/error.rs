use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a whole run.
#[derive(Debug, Error)]
pub enum BibDigestError {
    #[error("failed to read bibliography {path:?}: {source}")]
    ReadBibliography {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed bibliography at line {line}: {message}")]
    MalformedBibliography { line: usize, message: String },
    #[error("missing required environment variable {0}")]
    MissingConfig(&'static str),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("failed to write CSV output {path:?}: {source}")]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Errors from summarizing a single record.
///
/// These never leave the summarizer: they are logged and turned into an
/// empty summary for the affected record.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service returned status {status}: {body}")]
    Service { status: u16, body: String },
    #[error("response contained no message content")]
    EmptyResponse,
    #[error("model refused the request: {0}")]
    Refusal(String),
    #[error("response does not match the summary schema: {0}")]
    SchemaConformance(#[source] serde_json::Error),
}
