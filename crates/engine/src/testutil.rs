//! Test doubles shared across the engine test modules.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use itemflow_client::{ClientError, TrackerClient};
use itemflow_core::{EventKind, Identity, WorkItem, WorkItemId};
use itemflow_rules::{
    ExecutionContext, FireAndForgetRule, IntervalAwareRule, RuleError, RuleHandle, ScheduledOutcome,
};

// ── Tracker double ───────────────────────────────────────────

/// In-memory tracker with call counters and injectable save failures.
pub struct MockTracker {
    items: Mutex<HashMap<WorkItemId, WorkItem>>,
    gets: AtomicUsize,
    fail_saves: AtomicBool,
}

impl MockTracker {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(HashMap::new()),
            gets: AtomicUsize::new(0),
            fail_saves: AtomicBool::new(false),
        }
    }

    pub fn with_item(id: WorkItemId) -> Self {
        let tracker = Self::new();
        tracker.insert(WorkItem::new(id, "Task", "alpha"));
        tracker
    }

    pub fn insert(&self, item: WorkItem) {
        self.items.lock().unwrap().insert(item.id, item);
    }

    pub fn stored_item(&self, id: WorkItemId) -> WorkItem {
        self.items.lock().unwrap().get(&id).cloned().unwrap()
    }

    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn fail_saves(&self, on: bool) {
        self.fail_saves.store(on, Ordering::SeqCst);
    }
}

#[async_trait]
impl TrackerClient for MockTracker {
    async fn get_work_item(&self, id: WorkItemId) -> Result<WorkItem, ClientError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
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
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(ClientError::Status {
                code: 500,
                body: "injected save failure".to_string(),
            });
        }
        self.items.lock().unwrap().insert(item.id, item.clone());
        Ok(())
    }

    async fn query_work_items(&self, _query: &str) -> Result<Vec<WorkItem>, ClientError> {
        Ok(Vec::new())
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

pub fn webhook_ctx(client: Arc<MockTracker>, id: WorkItemId) -> ExecutionContext {
    let item = WorkItem::new(id, "Task", "alpha");
    ExecutionContext::for_webhook(client, item, EventKind::Updated, Vec::new(), Vec::new())
}

pub fn scheduled_ctx(client: Arc<MockTracker>, timeout_secs: Option<u64>) -> ExecutionContext {
    ExecutionContext::for_scheduled(client, timeout_secs, None)
}

// ── Rule doubles ─────────────────────────────────────────────

/// Shared recording of invocation order and observed field values.
#[derive(Default, Clone)]
pub struct Sequence {
    names: Arc<Mutex<Vec<String>>>,
    observed: Arc<Mutex<Vec<Option<String>>>>,
}

impl Sequence {
    pub fn names(&self) -> Vec<String> {
        self.names.lock().unwrap().clone()
    }

    pub fn observed(&self) -> Vec<Option<String>> {
        self.observed.lock().unwrap().clone()
    }
}

/// Fire-and-forget rule that records its invocation, optionally observing
/// a field on the subject item.
pub struct SeqRule {
    name: String,
    seq: Sequence,
    observe_field: Option<String>,
}

impl SeqRule {
    pub fn handle(name: &str, seq: &Sequence) -> RuleHandle {
        RuleHandle::FireAndForget(Arc::new(Self {
            name: name.to_string(),
            seq: seq.clone(),
            observe_field: None,
        }))
    }

    pub fn observing_handle(name: &str, seq: &Sequence, field: &str) -> RuleHandle {
        RuleHandle::FireAndForget(Arc::new(Self {
            name: name.to_string(),
            seq: seq.clone(),
            observe_field: Some(field.to_string()),
        }))
    }
}

#[async_trait]
impl FireAndForgetRule for SeqRule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(
        &self,
        ctx: &mut ExecutionContext,
        _cancel: &CancellationToken,
    ) -> Result<(), RuleError> {
        self.seq.names.lock().unwrap().push(self.name.clone());
        if let Some(field) = &self.observe_field {
            self.seq
                .observed
                .lock()
                .unwrap()
                .push(ctx.work_item.field_str(field).map(String::from));
        }
        Ok(())
    }
}

/// Sets a marker field on the subject item.
pub struct MutatingRule {
    name: String,
    field: String,
}

impl MutatingRule {
    pub fn handle(name: &str, field: &str) -> RuleHandle {
        RuleHandle::FireAndForget(Arc::new(Self {
            name: name.to_string(),
            field: field.to_string(),
        }))
    }
}

#[async_trait]
impl FireAndForgetRule for MutatingRule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(
        &self,
        ctx: &mut ExecutionContext,
        _cancel: &CancellationToken,
    ) -> Result<(), RuleError> {
        ctx.work_item.set_field(self.field.clone(), "yes");
        Ok(())
    }
}

/// Fails on every invocation, counting them.
pub struct AlwaysFailRule {
    name: String,
    pub invocations: Arc<AtomicUsize>,
}

impl AlwaysFailRule {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            invocations: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl FireAndForgetRule for AlwaysFailRule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(
        &self,
        _ctx: &mut ExecutionContext,
        _cancel: &CancellationToken,
    ) -> Result<(), RuleError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        Err(RuleError::Runtime("synthetic failure".to_string()))
    }
}

/// Fails the first `n` invocations, then succeeds.
pub struct FailFirstAttemptsRule {
    name: String,
    remaining: AtomicUsize,
}

impl FailFirstAttemptsRule {
    pub fn new(name: &str, failures: usize) -> Self {
        Self {
            name: name.to_string(),
            remaining: AtomicUsize::new(failures),
        }
    }
}

#[async_trait]
impl FireAndForgetRule for FailFirstAttemptsRule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(
        &self,
        _ctx: &mut ExecutionContext,
        _cancel: &CancellationToken,
    ) -> Result<(), RuleError> {
        if self.remaining.load(Ordering::SeqCst) > 0 {
            self.remaining.fetch_sub(1, Ordering::SeqCst);
            return Err(RuleError::Runtime("transient failure".to_string()));
        }
        Ok(())
    }
}

/// Fails with a definition error, counting invocations.
pub struct DefinitionErrorRule {
    name: String,
    pub invocations: Arc<AtomicUsize>,
}

impl DefinitionErrorRule {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            invocations: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl FireAndForgetRule for DefinitionErrorRule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(
        &self,
        _ctx: &mut ExecutionContext,
        _cancel: &CancellationToken,
    ) -> Result<(), RuleError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        Err(RuleError::Definition("params unparseable".to_string()))
    }
}

/// Fails only for one specific subject item.
pub struct FailForItemRule {
    name: String,
    item_id: WorkItemId,
}

impl FailForItemRule {
    pub fn handle(name: &str, item_id: WorkItemId) -> RuleHandle {
        RuleHandle::FireAndForget(Arc::new(Self {
            name: name.to_string(),
            item_id,
        }))
    }
}

#[async_trait]
impl FireAndForgetRule for FailForItemRule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(
        &self,
        ctx: &mut ExecutionContext,
        _cancel: &CancellationToken,
    ) -> Result<(), RuleError> {
        if ctx.work_item.id == self.item_id {
            return Err(RuleError::Runtime("unlucky item".to_string()));
        }
        Ok(())
    }
}

/// Blocks on a gate until notified, counting invocations.
pub struct BlockingRule {
    name: String,
    gate: Arc<Notify>,
    pub invocations: Arc<AtomicUsize>,
}

impl BlockingRule {
    pub fn new(name: &str, gate: Arc<Notify>) -> Self {
        Self {
            name: name.to_string(),
            gate,
            invocations: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl FireAndForgetRule for BlockingRule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(
        &self,
        _ctx: &mut ExecutionContext,
        _cancel: &CancellationToken,
    ) -> Result<(), RuleError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(())
    }
}

/// Never completes; the rule a pass deadline has to abort.
pub struct PendingRule {
    name: String,
}

impl PendingRule {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl FireAndForgetRule for PendingRule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(
        &self,
        _ctx: &mut ExecutionContext,
        _cancel: &CancellationToken,
    ) -> Result<(), RuleError> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

/// Interval-aware rule returning a canned outcome, recording what it saw.
pub struct IntervalProbe {
    name: String,
    outcome: ScheduledOutcome,
    pub invocations: Arc<AtomicUsize>,
    pub run_ids: Arc<Mutex<Vec<Uuid>>>,
    pub subject_types: Arc<Mutex<Vec<String>>>,
}

impl IntervalProbe {
    pub fn new(name: &str, outcome: ScheduledOutcome) -> Self {
        Self {
            name: name.to_string(),
            outcome,
            invocations: Arc::new(AtomicUsize::new(0)),
            run_ids: Arc::new(Mutex::new(Vec::new())),
            subject_types: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl IntervalAwareRule for IntervalProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(
        &self,
        ctx: &mut ExecutionContext,
        _cancel: &CancellationToken,
    ) -> Result<ScheduledOutcome, RuleError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        self.run_ids.lock().unwrap().push(ctx.run_id);
        self.subject_types
            .lock()
            .unwrap()
            .push(ctx.work_item.item_type.clone());
        Ok(self.outcome.clone())
    }
}
