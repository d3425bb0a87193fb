//! Webhook-triggered rule execution.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use itemflow_rules::{ExecutionContext, RuleError, RuleHandle, RuleSet};

use crate::report::{aggregate, ErrorMap, MAX_ATTEMPTS};
use crate::InvocationLock;

/// Runs the ordered rule set against one webhook-triggered context.
///
/// Each rule gets up to [`MAX_ATTEMPTS`] consecutive attempts. Before every
/// attempt the subject item is refetched so the attempt observes mutations
/// made by an earlier, partially-failed attempt or by other rules in the
/// same pass; after a successful invocation the subject is persisted back.
/// One rule's failure never stops later rules.
pub struct WebhookRuleExecutor {
    rules: Arc<RuleSet>,
    invocation_lock: InvocationLock,
}

impl WebhookRuleExecutor {
    pub fn new(rules: Arc<RuleSet>, invocation_lock: InvocationLock) -> Self {
        Self {
            rules,
            invocation_lock,
        }
    }

    /// Execute every rule against `ctx`. Returns the aggregated error
    /// report, or `None` when all rules succeeded.
    pub async fn execute(&self, ctx: &mut ExecutionContext) -> Option<String> {
        let mut errors = ErrorMap::new();
        for handle in self.rules.iter() {
            self.run_rule(handle, ctx, &mut errors).await;
        }
        aggregate(&errors)
    }

    async fn run_rule(&self, handle: &RuleHandle, ctx: &mut ExecutionContext, errors: &mut ErrorMap) {
        let name = handle.name().to_string();
        // The webhook path has no overall deadline; rules still receive a
        // token so the contract is uniform across both paths.
        let cancel = CancellationToken::new();

        let mut attempt = 1u32;
        let mut succeeded = false;
        while !succeeded && attempt <= MAX_ATTEMPTS {
            let final_attempt = attempt == MAX_ATTEMPTS;

            // Refresh the subject so this attempt sees prior mutations.
            match ctx.client.get_work_item(ctx.work_item.id).await {
                Ok(item) => ctx.work_item = item,
                Err(e) => {
                    if final_attempt {
                        error!(rule = %name, attempt, error = %e, "subject refresh failed");
                    } else {
                        warn!(rule = %name, attempt, error = %e, "subject refresh failed");
                    }
                    errors.insert(name.clone(), e.to_string());
                    attempt += 1;
                    continue;
                }
            }

            let result = {
                let _guard = self.invocation_lock.lock().await;
                invoke(handle, ctx, &cancel).await
            };

            match result {
                Ok(()) => {
                    // Persist mutations the rule made to the subject.
                    // Save failures are logged only; they neither fail the
                    // rule nor block later rules.
                    if let Err(e) = ctx.client.save_work_item(&ctx.work_item, final_attempt).await {
                        if final_attempt {
                            error!(rule = %name, attempt, error = %e, "failed to persist work item");
                        } else {
                            warn!(rule = %name, attempt, error = %e, "failed to persist work item");
                        }
                    }
                    debug!(rule = %name, attempt, run_id = %ctx.run_id, "rule succeeded");
                    errors.remove(&name);
                    succeeded = true;
                }
                Err(e) => {
                    if final_attempt || e.is_definition() {
                        error!(rule = %name, attempt, error = %e, "rule failed");
                    } else {
                        warn!(rule = %name, attempt, error = %e, "rule failed; retrying");
                    }
                    errors.insert(name.clone(), e.to_string());
                    // A definition error cannot succeed on retry; stop here
                    // instead of burning the remaining attempts.
                    if e.is_definition() {
                        break;
                    }
                    attempt += 1;
                }
            }
        }

        if !succeeded {
            info!(rule = %name, run_id = %ctx.run_id, "giving up on rule for this pass");
        }
    }
}

/// Dispatch on the contract variant fixed at registration. In the webhook
/// path an interval-aware rule's reported interval is irrelevant; only its
/// success flag matters.
async fn invoke(
    handle: &RuleHandle,
    ctx: &mut ExecutionContext,
    cancel: &CancellationToken,
) -> Result<(), RuleError> {
    match handle {
        RuleHandle::FireAndForget(rule) => rule.run(ctx, cancel).await,
        RuleHandle::IntervalAware(rule) => {
            let outcome = rule.run(ctx, cancel).await?;
            if outcome.success {
                Ok(())
            } else {
                Err(RuleError::Runtime(
                    outcome
                        .message
                        .unwrap_or_else(|| "rule reported failure".to_string()),
                ))
            }
        }
    }
}
