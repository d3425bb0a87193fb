//! Tracker client error types.

use thiserror::Error;

use itemflow_core::WorkItemId;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("tracker returned {code}: {body}")]
    Status { code: u16, body: String },

    #[error("work item not found: {0}")]
    NotFound(WorkItemId),

    #[error("response decode error: {0}")]
    Decode(String),
}
