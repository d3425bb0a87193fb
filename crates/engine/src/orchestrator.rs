//! Periodic trigger for scheduled rule passes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use itemflow_client::TrackerClient;
use itemflow_core::config::EngineConfig;
use itemflow_rules::ExecutionContext;

use crate::scheduled::ScheduledRuleExecutor;

/// Ticks are never further apart than this, regardless of the configured
/// cadence, so per-rule intervals shorter than the global one still fire
/// close to on time.
const MAX_TICK: Duration = Duration::from_secs(60);

/// Timer-driven orchestrator with two states, Idle and Running.
///
/// Each tick either starts a fresh scheduled pass (Idle) or is skipped
/// because the previous pass is still going (Running). A pass gets a brand
/// new synthetic context: placeholder subject, configured timeout, fresh
/// run id. The orchestrator returns to Idle whatever the pass outcome.
pub struct SchedulerOrchestrator {
    executor: Arc<ScheduledRuleExecutor>,
    client: Arc<dyn TrackerClient>,
    timeout_secs: u64,
    tick: Duration,
    running: AtomicBool,
    last_pass_at: Mutex<Option<DateTime<Utc>>>,
}

impl SchedulerOrchestrator {
    pub fn new(
        executor: Arc<ScheduledRuleExecutor>,
        client: Arc<dyn TrackerClient>,
        config: &EngineConfig,
    ) -> Self {
        let configured = Duration::from_secs(u64::from(config.scheduler_interval_minutes) * 60);
        Self {
            executor,
            client,
            timeout_secs: config.rule_timeout_secs,
            tick: configured.min(MAX_TICK),
            running: AtomicBool::new(false),
            last_pass_at: Mutex::new(None),
        }
    }

    /// Tick loop. Spawned as a tokio task at startup.
    pub async fn run(self: Arc<Self>) {
        info!(tick_secs = self.tick.as_secs(), "scheduler started");
        let mut ticker = tokio::time::interval(self.tick);
        loop {
            ticker.tick().await;
            self.run_once().await;
        }
    }

    /// One tick: execute a full scheduled pass, unless one is already
    /// running, in which case the tick is a no-op.
    pub async fn run_once(&self) {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("scheduled pass still running; skipping tick");
            return;
        }

        let last_run = *self.last_pass_at.lock().expect("last pass lock");
        let mut ctx =
            ExecutionContext::for_scheduled(self.client.clone(), Some(self.timeout_secs), last_run);
        let run_id = ctx.run_id;
        info!(%run_id, "scheduled pass starting");

        let report = self.executor.execute_pass(&mut ctx).await;
        match &report.aggregated_error {
            Some(error) => warn!(%run_id, %error, "scheduled pass finished with errors"),
            None => info!(%run_id, rules = report.runs.len(), "scheduled pass complete"),
        }

        *self.last_pass_at.lock().expect("last pass lock") = Some(Utc::now());
        self.running.store(false, Ordering::SeqCst);
    }
}
