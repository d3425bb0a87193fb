//! Tracker client trait — the boundary to the remote work-tracking service.

use async_trait::async_trait;

use itemflow_core::{Identity, WorkItem, WorkItemId};

use crate::error::ClientError;

/// Client handle for the remote work-tracking service.
///
/// An instance is scoped to a single project at construction time; the
/// project never changes afterwards. Execution contexts each hold their own
/// handle, so concurrent passes cannot observe each other's scoping.
#[async_trait]
pub trait TrackerClient: Send + Sync {
    /// Fetch the current revision of a work item by id.
    async fn get_work_item(&self, id: WorkItemId) -> Result<WorkItem, ClientError>;

    /// Persist a mutated work item back to the tracker.
    ///
    /// `escalate_errors` controls how a delivery failure is logged by the
    /// caller: error level on a final retry attempt, warning otherwise.
    /// The flag does not change the request itself.
    async fn save_work_item(&self, item: &WorkItem, escalate_errors: bool)
        -> Result<(), ClientError>;

    /// Run a query in the tracker's query language and return matching items.
    async fn query_work_items(&self, query: &str) -> Result<Vec<WorkItem>, ClientError>;

    /// Resolve the identity the configured token authenticates as.
    async fn who_am_i(&self) -> Result<Identity, ClientError>;

    /// The project this handle is scoped to.
    fn project(&self) -> &str;
}
