//! Bounded FIFO queue of pending webhook jobs.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use itemflow_rules::ExecutionContext;

use crate::error::EngineError;

/// An execution context awaiting processing. The queue owns it until
/// dequeued.
pub struct WebhookJob {
    pub ctx: ExecutionContext,
    pub enqueued_at: DateTime<Utc>,
}

impl WebhookJob {
    pub fn new(ctx: ExecutionContext) -> Self {
        Self {
            ctx,
            enqueued_at: Utc::now(),
        }
    }
}

/// Strict-FIFO queue, safe for concurrent producers with a single
/// consumer. Enqueue never blocks: at capacity it fails fast with
/// [`EngineError::QueueFull`], so the queue can never exceed its
/// configured size. No priorities.
pub struct WebhookJobQueue {
    jobs: Mutex<VecDeque<WebhookJob>>,
    capacity: usize,
}

impl WebhookJobQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            jobs: Mutex::new(VecDeque::new()),
            capacity,
        }
    }

    pub fn enqueue(&self, job: WebhookJob) -> Result<(), EngineError> {
        let mut jobs = self.jobs.lock().expect("queue lock poisoned");
        if jobs.len() >= self.capacity {
            return Err(EngineError::QueueFull {
                capacity: self.capacity,
            });
        }
        jobs.push_back(job);
        Ok(())
    }

    pub fn try_dequeue(&self) -> Option<WebhookJob> {
        self.jobs.lock().expect("queue lock poisoned").pop_front()
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().expect("queue lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.jobs.lock().expect("queue lock poisoned").clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
