//! In-memory tracker double for built-in rule tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use itemflow_client::{ClientError, TrackerClient};
use itemflow_core::{Identity, WorkItem, WorkItemId};

/// Tracker backed by a map of work items. Saves overwrite the stored item;
/// queries return a canned result set.
pub struct MemoryTracker {
    pub items: Mutex<HashMap<WorkItemId, WorkItem>>,
    pub query_result: Mutex<Vec<WorkItem>>,
    pub saved: Mutex<Vec<WorkItem>>,
}

impl MemoryTracker {
    pub fn new(items: Vec<WorkItem>) -> Self {
        Self {
            items: Mutex::new(items.into_iter().map(|i| (i.id, i)).collect()),
            query_result: Mutex::new(Vec::new()),
            saved: Mutex::new(Vec::new()),
        }
    }

    pub fn with_query_result(self, items: Vec<WorkItem>) -> Self {
        *self.query_result.lock().unwrap() = items;
        self
    }
}

#[async_trait]
impl TrackerClient for MemoryTracker {
    async fn get_work_item(&self, id: WorkItemId) -> Result<WorkItem, ClientError> {
        self.items
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(ClientError::NotFound(id))
    }

    async fn save_work_item(
        &self,
        item: &WorkItem,
        _escalate_errors: bool,
    ) -> Result<(), ClientError> {
        self.items.lock().unwrap().insert(item.id, item.clone());
        self.saved.lock().unwrap().push(item.clone());
        Ok(())
    }

    async fn query_work_items(&self, _query: &str) -> Result<Vec<WorkItem>, ClientError> {
        Ok(self.query_result.lock().unwrap().clone())
    }

    async fn who_am_i(&self) -> Result<Identity, ClientError> {
        Ok(Identity {
            id: "svc-1".to_string(),
            display_name: "automation".to_string(),
        })
    }

    fn project(&self) -> &str {
        "alpha"
    }
}
