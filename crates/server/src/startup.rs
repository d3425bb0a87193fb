//! State construction and background task spawning.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use itemflow_client::{RestTrackerClient, TrackerClient};
use itemflow_core::Config;
use itemflow_engine::{
    new_invocation_lock, QueueProcessor, ScheduleBook, SchedulerOrchestrator,
    ScheduledRuleExecutor, WebhookJobQueue, WebhookRuleExecutor,
};
use itemflow_rules::{builtin_registry, load_rule_set, DirRuleSource};

use crate::state::AppState;

/// Build `AppState`: tracker client, loaded rule set, queue, executors,
/// and background loop objects.
pub async fn build_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let client: Arc<dyn TrackerClient> = Arc::new(RestTrackerClient::for_project(
        reqwest::Client::new(),
        &config.tracker.base_url,
        &config.tracker.token,
        &config.tracker.project,
    ));

    // Connectivity check; a failure is reported but does not abort startup,
    // so the engine can come up before the tracker does.
    match client.who_am_i().await {
        Ok(identity) => info!(
            "authenticated against tracker as '{}' ({})",
            identity.display_name, identity.id
        ),
        Err(e) => warn!(error = %e, "tracker connectivity check failed"),
    }

    let source = DirRuleSource::new(config.rules.rules_dir.clone());
    let (rule_set, failures) = load_rule_set(&source, &builtin_registry())?;
    if !failures.is_empty() {
        warn!(
            "{} rule definition(s) failed to load and were skipped",
            failures.len()
        );
    }
    info!(
        "loaded {} rule(s): {}",
        rule_set.len(),
        rule_set.names().join(", ")
    );
    let rule_set = Arc::new(rule_set);

    let invocation_lock = new_invocation_lock();
    let schedule_book = Arc::new(ScheduleBook::new(config.engine.scheduler_interval_minutes));

    let queue = Arc::new(WebhookJobQueue::new(config.engine.max_queue_capacity));
    let webhook_executor = Arc::new(WebhookRuleExecutor::new(
        rule_set.clone(),
        invocation_lock.clone(),
    ));
    let scheduled_executor = Arc::new(ScheduledRuleExecutor::new(
        rule_set,
        schedule_book.clone(),
        invocation_lock,
    ));

    let processor = Arc::new(QueueProcessor::new(queue.clone(), webhook_executor.clone()));
    let orchestrator = Arc::new(SchedulerOrchestrator::new(
        scheduled_executor.clone(),
        client.clone(),
        &config.engine,
    ));

    Ok(Arc::new(AppState {
        config,
        client,
        queue,
        webhook_executor,
        scheduled_executor,
        processor,
        orchestrator,
        schedule_book,
        started_at: Utc::now(),
    }))
}

/// Spawn the two background loops: queue drain and scheduler.
pub fn spawn_background_tasks(state: Arc<AppState>) {
    tokio::spawn(state.processor.clone().run());
    tokio::spawn(state.orchestrator.clone().run());
}
