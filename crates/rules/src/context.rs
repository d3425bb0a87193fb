//! Per-trigger execution context.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use itemflow_client::TrackerClient;
use itemflow_core::{EventKind, RelationChange, TriggerKind, WorkItem};

/// Item type of the synthetic subject used by scheduled passes.
pub const SCHEDULED_SUBJECT_TYPE: &str = "ScheduledTask";

/// Everything a rule invocation gets to see and mutate.
///
/// A context is created per trigger (one webhook delivery, or one scheduler
/// tick), owned by exactly one pass, and discarded afterwards. `project` is
/// set at construction and never mutated; the client handle is scoped to
/// that same project, so sharing the underlying HTTP client across
/// concurrent contexts is safe.
pub struct ExecutionContext {
    pub client: Arc<dyn TrackerClient>,
    /// The work item the trigger is about. Refetched by the webhook
    /// executor before every attempt so later attempts and later rules see
    /// prior mutations. A placeholder for scheduled passes.
    pub work_item: WorkItem,
    pub trigger: TriggerKind,
    /// Field names changed by the triggering event (webhook only).
    pub changed_fields: Vec<String>,
    /// Relations added/removed by the triggering event (webhook only).
    pub relation_changes: Vec<RelationChange>,
    pub project: String,
    pub run_id: Uuid,
    /// Overall pass deadline in seconds; `None` falls back to the engine
    /// default. Consulted by the scheduled path only.
    pub timeout_secs: Option<u64>,
    /// When the previous scheduled pass ran, if known.
    pub last_run: Option<DateTime<Utc>>,
}

impl ExecutionContext {
    /// Context for one inbound change event.
    pub fn for_webhook(
        client: Arc<dyn TrackerClient>,
        work_item: WorkItem,
        event: EventKind,
        changed_fields: Vec<String>,
        relation_changes: Vec<RelationChange>,
    ) -> Self {
        let project = client.project().to_string();
        Self {
            client,
            work_item,
            trigger: TriggerKind::Webhook(event),
            changed_fields,
            relation_changes,
            project,
            run_id: Uuid::new_v4(),
            timeout_secs: None,
            last_run: None,
        }
    }

    /// Synthetic context for one scheduler tick. The subject is a
    /// placeholder with no remote identity.
    pub fn for_scheduled(
        client: Arc<dyn TrackerClient>,
        timeout_secs: Option<u64>,
        last_run: Option<DateTime<Utc>>,
    ) -> Self {
        let project = client.project().to_string();
        let work_item = WorkItem::placeholder(SCHEDULED_SUBJECT_TYPE, project.clone());
        Self {
            client,
            work_item,
            trigger: TriggerKind::Scheduled,
            changed_fields: Vec::new(),
            relation_changes: Vec::new(),
            project,
            run_id: Uuid::new_v4(),
            timeout_secs,
            last_run,
        }
    }
}
