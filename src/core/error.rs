use thiserror::Error;

use crate::core::PageResponse;

/// Errors surfaced by the paged table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// The page source failed for any reason
    #[error("failed to fetch page: {message}")]
    FetchFailed { message: String },

    /// The page source returned a window inconsistent with its own totals
    #[error("malformed page response: start {start} + {rows} rows exceeds total {total}")]
    MalformedResponse {
        start: usize,
        rows: usize,
        total: usize,
    },

    #[error("invalid table configuration: {0}")]
    InvalidConfig(String),
}

impl TableError {
    pub fn fetch_failed(report: &color_eyre::Report) -> Self {
        TableError::FetchFailed {
            message: format!("{report:#}"),
        }
    }
}

/// Reject responses where `start + rows.len() > total`
pub fn validate_response(response: &PageResponse) -> Result<(), TableError> {
    if response.end() > response.total {
        return Err(TableError::MalformedResponse {
            start: response.start,
            rows: response.rows.len(),
            total: response.total,
        });
    }
    Ok(())
}
