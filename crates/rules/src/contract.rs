//! Rule call contracts and the registration-time handle.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use itemflow_client::ClientError;

use crate::context::ExecutionContext;

/// Errors surfaced by rule construction and invocation.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// The rule could not be constructed from its definition. Retrying an
    /// unchanged definition cannot succeed, so executors fail fast on this
    /// kind instead of burning the retry ceiling.
    #[error("rule definition error: {0}")]
    Definition(String),

    #[error("{0}")]
    Runtime(String),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl RuleError {
    pub fn is_definition(&self) -> bool {
        matches!(self, RuleError::Definition(_))
    }
}

/// Result reported by an interval-aware rule.
///
/// `next_interval_minutes == None` means "use the global default cadence".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledOutcome {
    pub success: bool,
    pub message: Option<String>,
    pub next_interval_minutes: Option<u32>,
}

impl ScheduledOutcome {
    /// Successful outcome with no message and the default cadence.
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
            next_interval_minutes: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            next_interval_minutes: None,
        }
    }
}

/// Run-to-completion contract: the rule either returns Ok or fails with an
/// error; there is no structured result.
#[async_trait]
pub trait FireAndForgetRule: Send + Sync {
    /// Stable name, used for execution ordering and as the error key.
    fn name(&self) -> &str;

    async fn run(
        &self,
        ctx: &mut ExecutionContext,
        cancel: &CancellationToken,
    ) -> Result<(), RuleError>;
}

/// Interval-aware contract: the rule reports success, an optional message,
/// and optionally its own next-execution delay. A failure is signalled via
/// `success == false`, not necessarily an error.
#[async_trait]
pub trait IntervalAwareRule: Send + Sync {
    /// Stable name, used for execution ordering and as the error key.
    fn name(&self) -> &str;

    async fn run(
        &self,
        ctx: &mut ExecutionContext,
        cancel: &CancellationToken,
    ) -> Result<ScheduledOutcome, RuleError>;
}

/// A registered rule. The contract variant is fixed here, at registration
/// time; executors match on it rather than re-probing capabilities on every
/// invocation.
#[derive(Clone)]
pub enum RuleHandle {
    FireAndForget(Arc<dyn FireAndForgetRule>),
    IntervalAware(Arc<dyn IntervalAwareRule>),
}

impl RuleHandle {
    pub fn name(&self) -> &str {
        match self {
            RuleHandle::FireAndForget(rule) => rule.name(),
            RuleHandle::IntervalAware(rule) => rule.name(),
        }
    }
}

impl std::fmt::Debug for RuleHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let variant = match self {
            RuleHandle::FireAndForget(_) => "FireAndForget",
            RuleHandle::IntervalAware(_) => "IntervalAware",
        };
        write!(f, "RuleHandle::{}({})", variant, self.name())
    }
}
