//! Shared pass-result types and error aggregation.

use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use itemflow_rules::ScheduledOutcome;

/// Consecutive attempts a rule gets per trigger before its failure is
/// recorded and execution moves on.
pub const MAX_ATTEMPTS: u32 = 3;

/// Fallback deadline for a scheduled pass when the context carries none.
pub const DEFAULT_RULE_TIMEOUT_SECS: u64 = 600;

/// Per-rule failure messages, keyed by rule name. A `BTreeMap` so the
/// aggregated report lists failures in rule (execution) order.
pub(crate) type ErrorMap = BTreeMap<String, String>;

/// Join the error map into the caller-facing report. `None` when every
/// rule succeeded or degraded without fatal error.
pub(crate) fn aggregate(errors: &ErrorMap) -> Option<String> {
    if errors.is_empty() {
        return None;
    }
    let lines: Vec<String> = errors
        .iter()
        .map(|(rule, message)| format!("location: {}, error: {}", rule, message))
        .collect();
    Some(lines.join("\n"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RuleRunStatus {
    Succeeded,
    Failed,
    /// Interval not yet elapsed; the rule was not invoked this pass.
    Skipped,
}

/// What happened to one rule during a scheduled pass.
#[derive(Debug, Clone, Serialize)]
pub struct RuleRunReport {
    pub rule: String,
    pub status: RuleRunStatus,
    pub attempts: u32,
    pub elapsed_ms: u64,
    /// The interval-aware result, surfaced unchanged. `None` for
    /// fire-and-forget rules and skipped rules.
    pub outcome: Option<ScheduledOutcome>,
}

/// Full result of one scheduled pass.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduledPassReport {
    pub run_id: Uuid,
    pub runs: Vec<RuleRunReport>,
    pub aggregated_error: Option<String>,
    /// True when the pass hit its deadline; remaining rules were skipped
    /// and `aggregated_error` carries the distinguished timeout message.
    pub timed_out: bool,
}
