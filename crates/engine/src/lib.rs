//! Rule execution and scheduling engine.
//!
//! Two trigger sources feed the engine: inbound change events (pushed into
//! a bounded [`WebhookJobQueue`] and drained serially by the
//! [`QueueProcessor`]) and a periodic timer (the [`SchedulerOrchestrator`]).
//! Both end in an ordered pass over the loaded rules — the
//! [`WebhookRuleExecutor`] with refetch/persist semantics per attempt, the
//! [`ScheduledRuleExecutor`] under a whole-pass deadline with per-rule
//! interval gating. A slow or broken rule is retried a bounded number of
//! times, its failure recorded, and the pass moves on; nothing here ever
//! takes the process down.

pub mod error;
pub mod orchestrator;
pub mod processor;
pub mod queue;
pub mod report;
pub mod schedule;
pub mod scheduled;
pub mod webhook;

#[cfg(test)]
pub(crate) mod testutil;

use std::sync::Arc;

pub use error::EngineError;
pub use orchestrator::SchedulerOrchestrator;
pub use processor::QueueProcessor;
pub use queue::{WebhookJob, WebhookJobQueue};
pub use report::{RuleRunReport, RuleRunStatus, ScheduledPassReport, MAX_ATTEMPTS};
pub use schedule::{ScheduleBook, ScheduleEntry};
pub use scheduled::ScheduledRuleExecutor;
pub use webhook::WebhookRuleExecutor;

/// Process-wide lock serializing the actual rule-invocation step.
///
/// Shared by both executors so a webhook pass and a scheduled pass can
/// never drive a rule's execution machinery concurrently. Async on
/// purpose: a waiting caller yields instead of blocking a timer task.
/// Refetch, persist, and logging all stay outside this critical section.
pub type InvocationLock = Arc<tokio::sync::Mutex<()>>;

pub fn new_invocation_lock() -> InvocationLock {
    Arc::new(tokio::sync::Mutex::new(()))
}
