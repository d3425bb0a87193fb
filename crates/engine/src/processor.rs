//! Background drain loop for the webhook job queue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::queue::WebhookJobQueue;
use crate::webhook::WebhookRuleExecutor;

/// Seconds between drain ticks.
const DRAIN_TICK_SECS: u64 = 1;
/// Minimum spacing between backlog-depth log lines.
const BACKLOG_LOG_SECS: u64 = 60;

/// Drains the webhook queue one job at a time.
///
/// Jobs are strictly serialized: a dequeued job runs to completion
/// (success or exhausted retries) before the next is dequeued. A tick that
/// lands while a drain is in progress is a no-op; the guard is an atomic
/// flag, so nothing ever blocks the timer task. One job's failure is
/// logged and the drain moves on.
pub struct QueueProcessor {
    queue: Arc<WebhookJobQueue>,
    executor: Arc<WebhookRuleExecutor>,
    draining: AtomicBool,
    last_backlog_log: Mutex<Option<Instant>>,
}

impl QueueProcessor {
    pub fn new(queue: Arc<WebhookJobQueue>, executor: Arc<WebhookRuleExecutor>) -> Self {
        Self {
            queue,
            executor,
            draining: AtomicBool::new(false),
            last_backlog_log: Mutex::new(None),
        }
    }

    /// Tick loop. Spawned as a tokio task at startup.
    pub async fn run(self: Arc<Self>) {
        info!(tick_secs = DRAIN_TICK_SECS, "queue processor started");
        let mut interval = tokio::time::interval(Duration::from_secs(DRAIN_TICK_SECS));
        loop {
            interval.tick().await;
            self.maybe_log_backlog();
            self.drain().await;
        }
    }

    /// Drain everything currently queued. No-op when a drain is already in
    /// progress.
    pub async fn drain(&self) {
        if self
            .draining
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        while let Some(job) = self.queue.try_dequeue() {
            let mut ctx = job.ctx;
            let run_id = ctx.run_id;
            let waited_ms = (Utc::now() - job.enqueued_at).num_milliseconds();
            debug!(%run_id, item = ctx.work_item.id, waited_ms, "processing webhook job");

            if let Some(error) = self.executor.execute(&mut ctx).await {
                warn!(%run_id, %error, "webhook pass finished with errors");
            }
            self.maybe_log_backlog();
        }

        self.draining.store(false, Ordering::SeqCst);
    }

    /// Observability only: report backlog depth at most once a minute and
    /// only while jobs are waiting.
    fn maybe_log_backlog(&self) {
        let backlog = self.queue.len();
        if backlog == 0 {
            return;
        }
        let mut last = self.last_backlog_log.lock().expect("backlog log lock");
        let due = last
            .map(|at| at.elapsed() >= Duration::from_secs(BACKLOG_LOG_SECS))
            .unwrap_or(true);
        if due {
            info!(backlog, capacity = self.queue.capacity(), "webhook queue backlog");
            *last = Some(Instant::now());
        }
    }
}
