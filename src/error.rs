// Error types for the strider application.
// Maps analysis-service failures onto the workflow phase that surfaced them.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StriderError {
    /// Bad local input, rejected before any network call.
    #[error("Invalid diagram: {0}")]
    Validation(String),

    #[error("Diagram upload failed: {0}")]
    Upload(String),

    #[error("Component identification failed: {0}")]
    Identification(String),

    /// Per-component analysis failure. Recoverable: the batch continues.
    #[error("Threat analysis failed for '{component}': {message}")]
    AnalysisItem { component: String, message: String },

    #[error("Report export failed: {0}")]
    Export(String),

    #[error("Analysis service error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Analysis service returned HTTP {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Single-flight rejection: the named operation is already running.
    #[error("{0} already in progress")]
    Busy(&'static str),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StriderError>;
