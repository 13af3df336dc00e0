//! Report error types.

use thiserror::Error;

/// Errors that can occur during report rendering.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The PDF backend failed.
    #[error("failed to render PDF: {0}")]
    Render(String),
}
