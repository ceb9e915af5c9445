//! Report error types.

use thiserror::Error;

/// Errors from report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// PDF document assembly failed.
    #[error("PDF error: {0}")]
    Pdf(#[from] printpdf::Error),

    /// The configured report target day could not be parsed as a weekday.
    #[error("invalid report target day: {0}")]
    InvalidTargetDay(String),
}
