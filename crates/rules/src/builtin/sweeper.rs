//! Stale item sweeper.
//!
//! Interval-aware scheduled rule: queries items untouched for a configured
//! number of days and tags them. Reports its own re-execution interval
//! when configured, otherwise defers to the global cadence.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::context::ExecutionContext;
use crate::contract::{IntervalAwareRule, RuleError, RuleHandle, ScheduledOutcome};
use crate::loader::RuleDefinition;

fn default_stale_days() -> u32 {
    14
}

fn default_tag_field() -> String {
    "stale".to_string()
}

#[derive(Debug, Clone, Deserialize)]
struct Params {
    #[serde(default = "default_stale_days")]
    stale_days: u32,
    #[serde(default = "default_tag_field")]
    tag_field: String,
    #[serde(default)]
    interval_minutes: Option<u32>,
}

pub struct StaleSweeper {
    name: String,
    stale_days: u32,
    tag_field: String,
    interval_minutes: Option<u32>,
}

pub fn factory(def: &RuleDefinition) -> Result<RuleHandle, RuleError> {
    let params: Params = serde_json::from_value(def.params.clone())
        .map_err(|e| RuleError::Definition(format!("stale-sweeper params: {}", e)))?;
    Ok(RuleHandle::IntervalAware(Arc::new(StaleSweeper {
        name: def.name.clone(),
        stale_days: params.stale_days,
        tag_field: params.tag_field,
        interval_minutes: params.interval_minutes,
    })))
}

#[async_trait]
impl IntervalAwareRule for StaleSweeper {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(
        &self,
        ctx: &mut ExecutionContext,
        cancel: &CancellationToken,
    ) -> Result<ScheduledOutcome, RuleError> {
        let stale = ctx
            .client
            .query_work_items(&format!(
                "SELECT * FROM workitems WHERE [ChangedDate] < today-{}",
                self.stale_days
            ))
            .await?;

        let mut tagged = 0usize;
        for mut item in stale {
            // Stop between items if the pass deadline has fired.
            if cancel.is_cancelled() {
                return Ok(ScheduledOutcome::failed(format!(
                    "cancelled after tagging {} items",
                    tagged
                )));
            }
            if item.field_str(&self.tag_field).is_some() {
                continue;
            }
            item.set_field(self.tag_field.clone(), "true");
            ctx.client.save_work_item(&item, false).await?;
            tagged += 1;
        }

        info!(rule = %self.name, tagged, "stale sweep complete");
        Ok(ScheduledOutcome {
            success: true,
            message: Some(format!("tagged {} stale items", tagged)),
            next_interval_minutes: self.interval_minutes,
        })
    }
}
