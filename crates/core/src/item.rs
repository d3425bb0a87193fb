use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type WorkItemId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    Parent,
    Child,
    Related,
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationKind::Parent => write!(f, "Parent"),
            RelationKind::Child => write!(f, "Child"),
            RelationKind::Related => write!(f, "Related"),
        }
    }
}

/// A link from one work item to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub kind: RelationKind,
    pub target_id: WorkItemId,
}

/// A relation added to or removed from a work item by a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationChange {
    pub kind: RelationKind,
    pub target_id: WorkItemId,
    pub added: bool,
}

/// A work item as held by the remote tracker.
///
/// Fields are stored as raw JSON values; rules read and mutate them via the
/// typed accessors. Mutations become visible to the tracker only when the
/// executor persists the item back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: WorkItemId,
    pub rev: u64,
    pub item_type: String,
    pub project: String,
    #[serde(default)]
    pub fields: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub relations: Vec<Relation>,
}

impl WorkItem {
    pub fn new(id: WorkItemId, item_type: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            id,
            rev: 0,
            item_type: item_type.into(),
            project: project.into(),
            fields: BTreeMap::new(),
            relations: Vec::new(),
        }
    }

    /// Synthetic subject for scheduled passes. Has no remote identity
    /// (id 0) and must never be fetched from or saved to the tracker.
    pub fn placeholder(item_type: impl Into<String>, project: impl Into<String>) -> Self {
        Self::new(0, item_type, project)
    }

    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_str())
    }

    pub fn field_f64(&self, name: &str) -> Option<f64> {
        self.fields.get(name).and_then(|v| v.as_f64())
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Ids of items linked with the given relation kind.
    pub fn related_ids(&self, kind: RelationKind) -> Vec<WorkItemId> {
        self.relations
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| r.target_id)
            .collect()
    }

    pub fn parent_id(&self) -> Option<WorkItemId> {
        self.related_ids(RelationKind::Parent).first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_accessors_read_and_write() {
        let mut item = WorkItem::new(7, "Task", "alpha");
        item.set_field("title", "fix the build");
        item.set_field("estimate", 3.5);

        assert_eq!(item.field_str("title"), Some("fix the build"));
        assert_eq!(item.field_f64("estimate"), Some(3.5));
        assert_eq!(item.field_str("missing"), None);
    }

    #[test]
    fn placeholder_has_no_remote_identity() {
        let item = WorkItem::placeholder("ScheduledTask", "alpha");
        assert_eq!(item.id, 0);
        assert_eq!(item.item_type, "ScheduledTask");
    }

    #[test]
    fn related_ids_filters_by_kind() {
        let mut item = WorkItem::new(1, "Epic", "alpha");
        item.relations.push(Relation {
            kind: RelationKind::Child,
            target_id: 2,
        });
        item.relations.push(Relation {
            kind: RelationKind::Child,
            target_id: 3,
        });
        item.relations.push(Relation {
            kind: RelationKind::Parent,
            target_id: 9,
        });

        assert_eq!(item.related_ids(RelationKind::Child), vec![2, 3]);
        assert_eq!(item.parent_id(), Some(9));
    }

    #[test]
    fn serde_roundtrip() {
        let mut item = WorkItem::new(42, "Bug", "alpha");
        item.set_field("severity", "high");
        let json = serde_json::to_string(&item).unwrap();
        let back: WorkItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, 42);
        assert_eq!(back.field_str("severity"), Some("high"));
    }
}
