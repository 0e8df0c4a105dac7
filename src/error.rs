use std::path::PathBuf;
use thiserror::Error;

/// Failure to load a single sample's report. Always recoverable: the
/// sample is skipped and the run continues.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report not found at {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("report at {} is not valid JSON: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read report at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Conditions that abort the whole run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to set up results directory {}: {source}", .path.display())]
    Setup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no data could be processed from any of {samples} samples")]
    NoUsableData { samples: usize },
}
