//! Inbound webhook payload model and context construction.

use std::sync::Arc;

use serde::Deserialize;

use itemflow_client::TrackerClient;
use itemflow_core::{EventKind, RelationChange, WorkItem, WorkItemId};
use itemflow_rules::ExecutionContext;

/// Change notification as delivered by the tracker.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEventPayload {
    /// Wire event type, e.g. "workitem.updated".
    pub event_type: String,
    pub resource: EventResource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventResource {
    pub id: WorkItemId,
    #[serde(default)]
    pub rev: u64,
    #[serde(default)]
    pub item_type: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub changed_fields: Vec<String>,
    #[serde(default)]
    pub relation_changes: Vec<RelationChange>,
}

impl WebhookEventPayload {
    /// Build the execution context for this event. The subject is a stub
    /// carrying only what the payload knows; the executor refetches the
    /// full item before every attempt anyway.
    pub fn into_context(
        self,
        client: Arc<dyn TrackerClient>,
    ) -> Result<ExecutionContext, String> {
        let kind = EventKind::parse(&self.event_type)
            .ok_or_else(|| format!("unknown event type '{}'", self.event_type))?;

        let mut item = WorkItem::new(self.resource.id, self.resource.item_type, self.resource.project);
        item.rev = self.resource.rev;

        Ok(ExecutionContext::for_webhook(
            client,
            item,
            kind,
            self.resource.changed_fields,
            self.resource.relation_changes,
        ))
    }
}
