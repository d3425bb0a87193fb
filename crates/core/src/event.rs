use serde::{Deserialize, Serialize};

/// Kind of change event delivered by the tracker's webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Created,
    Updated,
    Deleted,
    Commented,
    Restored,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Created => "created",
            EventKind::Updated => "updated",
            EventKind::Deleted => "deleted",
            EventKind::Commented => "commented",
            EventKind::Restored => "restored",
        }
    }

    /// Parse a wire event type. Accepts both the bare kind ("updated")
    /// and the dotted form the tracker sends ("workitem.updated").
    pub fn parse(s: &str) -> Option<Self> {
        let kind = s.rsplit('.').next().unwrap_or(s);
        match kind {
            "created" => Some(EventKind::Created),
            "updated" => Some(EventKind::Updated),
            "deleted" => Some(EventKind::Deleted),
            "commented" => Some(EventKind::Commented),
            "restored" => Some(EventKind::Restored),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What caused an execution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerKind {
    Webhook(EventKind),
    Scheduled,
}

impl std::fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerKind::Webhook(kind) => write!(f, "webhook:{}", kind),
            TriggerKind::Scheduled => write!(f, "scheduled"),
        }
    }
}

/// The authenticated identity of the service account, as reported by the
/// tracker's `/me` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub display_name: String,
}
