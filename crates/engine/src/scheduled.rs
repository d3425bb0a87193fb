//! Timer-triggered rule execution under a whole-pass deadline.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use itemflow_rules::{ExecutionContext, RuleError, RuleHandle, RuleSet, ScheduledOutcome};

use crate::report::{
    aggregate, ErrorMap, RuleRunReport, RuleRunStatus, ScheduledPassReport, DEFAULT_RULE_TIMEOUT_SECS,
    MAX_ATTEMPTS,
};
use crate::schedule::ScheduleBook;
use crate::InvocationLock;

/// Runs the ordered rule set against one synthetic scheduled context.
///
/// One cancellation deadline covers the entire rule set: when it fires, the
/// in-flight rule is abandoned, remaining rules are never invoked, and the
/// pass as a whole reports a distinguished timeout error. Below the
/// deadline the per-rule discipline matches the webhook path: bounded
/// retry, error-map recording, failure isolation. Rules whose self-chosen
/// interval has not elapsed are skipped.
pub struct ScheduledRuleExecutor {
    rules: Arc<RuleSet>,
    schedule: Arc<ScheduleBook>,
    invocation_lock: InvocationLock,
}

enum RunOutcome {
    Completed(RuleRunReport),
    TimedOut(RuleRunReport),
}

impl ScheduledRuleExecutor {
    pub fn new(
        rules: Arc<RuleSet>,
        schedule: Arc<ScheduleBook>,
        invocation_lock: InvocationLock,
    ) -> Self {
        Self {
            rules,
            schedule,
            invocation_lock,
        }
    }

    /// Execute the pass and return only the aggregated error, `None` when
    /// clean.
    pub async fn execute(&self, ctx: &mut ExecutionContext) -> Option<String> {
        self.execute_pass(ctx).await.aggregated_error
    }

    /// Execute the pass and return the full per-rule report.
    pub async fn execute_pass(&self, ctx: &mut ExecutionContext) -> ScheduledPassReport {
        let timeout_secs = ctx.timeout_secs.unwrap_or(DEFAULT_RULE_TIMEOUT_SECS);
        let cancel = CancellationToken::new();
        let deadline = {
            let token = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(timeout_secs)).await;
                token.cancel();
            })
        };

        let mut errors = ErrorMap::new();
        let mut runs = Vec::new();
        let mut timeout_error = None;

        for handle in self.rules.iter() {
            let name = handle.name();

            if cancel.is_cancelled() {
                error!(
                    run_id = %ctx.run_id,
                    rule = %name,
                    timeout_secs,
                    "pass deadline hit; aborting remaining rules"
                );
                timeout_error = Some(timeout_message(timeout_secs, name, ctx));
                break;
            }

            if !self.schedule.is_due(name, Utc::now()) {
                debug!(rule = %name, "interval not elapsed; skipping");
                runs.push(RuleRunReport {
                    rule: name.to_string(),
                    status: RuleRunStatus::Skipped,
                    attempts: 0,
                    elapsed_ms: 0,
                    outcome: None,
                });
                continue;
            }

            ctx.last_run = self.schedule.last_executed(name);

            match self.run_rule(handle, ctx, &cancel, &mut errors).await {
                RunOutcome::Completed(report) => runs.push(report),
                RunOutcome::TimedOut(report) => {
                    error!(
                        run_id = %ctx.run_id,
                        rule = %report.rule,
                        timeout_secs,
                        "rule aborted by pass deadline"
                    );
                    timeout_error = Some(timeout_message(timeout_secs, &report.rule, ctx));
                    runs.push(report);
                    break;
                }
            }
        }

        deadline.abort();

        let timed_out = timeout_error.is_some();
        // Timeout fails the pass as one unit, reported distinctly from
        // per-rule failures.
        let aggregated_error = timeout_error.or_else(|| aggregate(&errors));
        ScheduledPassReport {
            run_id: ctx.run_id,
            runs,
            aggregated_error,
            timed_out,
        }
    }

    async fn run_rule(
        &self,
        handle: &RuleHandle,
        ctx: &mut ExecutionContext,
        cancel: &CancellationToken,
        errors: &mut ErrorMap,
    ) -> RunOutcome {
        let name = handle.name().to_string();
        let started = Instant::now();
        let mut attempt = 1u32;
        let mut attempts_made = 0u32;
        let mut last_outcome: Option<ScheduledOutcome> = None;
        let mut succeeded = false;

        while !succeeded && attempt <= MAX_ATTEMPTS {
            let final_attempt = attempt == MAX_ATTEMPTS;

            if cancel.is_cancelled() {
                return RunOutcome::TimedOut(RuleRunReport {
                    rule: name,
                    status: RuleRunStatus::Failed,
                    attempts: attempts_made,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                    outcome: None,
                });
            }

            let invoke_fut = async {
                let _guard = self.invocation_lock.lock().await;
                invoke(handle, ctx, cancel).await
            };
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return RunOutcome::TimedOut(RuleRunReport {
                        rule: name,
                        status: RuleRunStatus::Failed,
                        attempts: attempt,
                        elapsed_ms: started.elapsed().as_millis() as u64,
                        outcome: None,
                    });
                }
                result = invoke_fut => result,
            };
            attempts_made = attempt;

            match result {
                Ok(Some(outcome)) if !outcome.success => {
                    let message = outcome
                        .message
                        .clone()
                        .unwrap_or_else(|| "rule reported failure".to_string());
                    if final_attempt {
                        error!(rule = %name, attempt, message = %message, "rule reported failure");
                    } else {
                        warn!(rule = %name, attempt, message = %message, "rule reported failure; retrying");
                    }
                    errors.insert(name.clone(), message);
                    last_outcome = Some(outcome);
                    attempt += 1;
                }
                Ok(outcome) => {
                    errors.remove(&name);
                    last_outcome = outcome;
                    succeeded = true;
                }
                Err(e) => {
                    if final_attempt || e.is_definition() {
                        error!(rule = %name, attempt, error = %e, "rule failed");
                    } else {
                        warn!(rule = %name, attempt, error = %e, "rule failed; retrying");
                    }
                    errors.insert(name.clone(), e.to_string());
                    // Definition errors cannot succeed on retry.
                    if e.is_definition() {
                        break;
                    }
                    attempt += 1;
                }
            }
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        if succeeded {
            let interval = last_outcome.as_ref().and_then(|o| o.next_interval_minutes);
            self.schedule
                .record_execution(&name, Utc::now(), interval);
            info!(
                rule = %name,
                attempts = attempts_made,
                elapsed_ms,
                interval_minutes = ?interval,
                "scheduled rule succeeded"
            );
            RunOutcome::Completed(RuleRunReport {
                rule: name,
                status: RuleRunStatus::Succeeded,
                attempts: attempts_made,
                elapsed_ms,
                outcome: last_outcome,
            })
        } else {
            info!(rule = %name, attempts = attempts_made, elapsed_ms, "giving up on rule for this pass");
            RunOutcome::Completed(RuleRunReport {
                rule: name,
                status: RuleRunStatus::Failed,
                attempts: attempts_made,
                elapsed_ms,
                outcome: last_outcome,
            })
        }
    }
}

fn timeout_message(timeout_secs: u64, rule: &str, ctx: &ExecutionContext) -> String {
    format!(
        "timeout: scheduled pass exceeded its {}s budget at rule '{}' (run {})",
        timeout_secs, rule, ctx.run_id
    )
}

/// Dispatch on the contract variant fixed at registration. Fire-and-forget
/// completion is success with no interval information.
async fn invoke(
    handle: &RuleHandle,
    ctx: &mut ExecutionContext,
    cancel: &CancellationToken,
) -> Result<Option<ScheduledOutcome>, RuleError> {
    match handle {
        RuleHandle::IntervalAware(rule) => rule.run(ctx, cancel).await.map(Some),
        RuleHandle::FireAndForget(rule) => rule.run(ctx, cancel).await.map(|()| None),
    }
}
