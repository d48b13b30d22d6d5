//! Error types for scholar-harvest.
//!
//! Every client returns `Result<T, HarvestError>`; the binary wraps these in
//! `anyhow` for reporting.

use thiserror::Error;

/// Main error type for scholar-harvest operations.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// XML or HTML parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Rate limited by the remote source
    #[error("Rate limited by {0}")]
    RateLimited(String),

    /// Remote source returned a non-success status
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Error message
        message: String,
    },

    /// Google Scholar served its "unusual traffic" page
    #[error("CAPTCHA detected, Google Scholar is blocking automated requests")]
    Captcha,

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error (bad base URL, client construction)
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid caller input
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias using `HarvestError`
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert Option to Result with a parse error message
    fn ok_or_parse(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_parse(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| HarvestError::Parse(msg.to_string()))
    }
}
