//! HTTP handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use tracing::{debug, warn};

use itemflow_engine::WebhookJob;

use crate::event::WebhookEventPayload;
use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime_secs = (Utc::now() - state.started_at).num_seconds();
    Json(serde_json::json!({
        "status": "ok",
        "uptime_secs": uptime_secs,
    }))
}

pub async fn queue_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "backlog": state.queue.len(),
        "capacity": state.queue.capacity(),
    }))
}

pub async fn scheduler_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "default_interval_minutes": state.schedule_book.default_interval_minutes(),
        "rules": state.schedule_book.snapshot(),
    }))
}

/// Webhook intake: parse the event, build a context, enqueue it.
///
/// 200 when the job is accepted; 503 when the queue rejects at capacity so
/// the tracker backs off and redelivers.
pub async fn webhook(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<WebhookEventPayload>,
) -> impl IntoResponse {
    let ctx = match payload.into_context(state.client.clone()) {
        Ok(ctx) => ctx,
        Err(error) => {
            warn!(%error, "rejecting webhook delivery");
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "accepted": false, "error": error })),
            );
        }
    };

    let run_id = ctx.run_id;
    match state.queue.enqueue(WebhookJob::new(ctx)) {
        Ok(()) => {
            debug!(%run_id, "webhook job queued");
            (
                StatusCode::OK,
                Json(serde_json::json!({ "accepted": true, "run_id": run_id })),
            )
        }
        Err(e) => {
            warn!(%run_id, error = %e, "webhook job rejected");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "accepted": false, "error": e.to_string() })),
            )
        }
    }
}
