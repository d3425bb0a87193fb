//! Engine error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The webhook queue refused a job; surfaced synchronously to the
    /// producer, never silently dropped.
    #[error("webhook queue at capacity ({capacity}); job rejected")]
    QueueFull { capacity: usize },
}
