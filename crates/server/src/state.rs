use std::sync::Arc;

use chrono::{DateTime, Utc};

use itemflow_client::TrackerClient;
use itemflow_core::Config;
use itemflow_engine::{
    QueueProcessor, ScheduleBook, SchedulerOrchestrator, ScheduledRuleExecutor, WebhookJobQueue,
    WebhookRuleExecutor,
};

pub struct AppState {
    pub config: Config,
    pub client: Arc<dyn TrackerClient>,
    pub queue: Arc<WebhookJobQueue>,
    pub webhook_executor: Arc<WebhookRuleExecutor>,
    pub scheduled_executor: Arc<ScheduledRuleExecutor>,
    pub processor: Arc<QueueProcessor>,
    pub orchestrator: Arc<SchedulerOrchestrator>,
    pub schedule_book: Arc<ScheduleBook>,
    pub started_at: DateTime<Utc>,
}
