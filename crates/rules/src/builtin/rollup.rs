//! Hierarchical field rollup.
//!
//! When a work item changes, re-aggregates a numeric field across its
//! parent's children and writes the sum onto the parent. Fire-and-forget:
//! a webhook pass triggers it for the changed item.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::context::ExecutionContext;
use crate::contract::{FireAndForgetRule, RuleError, RuleHandle};
use crate::loader::RuleDefinition;

fn default_source_field() -> String {
    "estimate".to_string()
}

fn default_target_field() -> String {
    "rollup_estimate".to_string()
}

#[derive(Debug, Clone, Deserialize)]
struct Params {
    #[serde(default = "default_source_field")]
    source_field: String,
    #[serde(default = "default_target_field")]
    target_field: String,
}

pub struct Rollup {
    name: String,
    source_field: String,
    target_field: String,
}

pub fn factory(def: &RuleDefinition) -> Result<RuleHandle, RuleError> {
    let params: Params = serde_json::from_value(def.params.clone())
        .map_err(|e| RuleError::Definition(format!("rollup params: {}", e)))?;
    Ok(RuleHandle::FireAndForget(Arc::new(Rollup {
        name: def.name.clone(),
        source_field: params.source_field,
        target_field: params.target_field,
    })))
}

#[async_trait]
impl FireAndForgetRule for Rollup {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(
        &self,
        ctx: &mut ExecutionContext,
        _cancel: &CancellationToken,
    ) -> Result<(), RuleError> {
        let Some(parent_id) = ctx.work_item.parent_id() else {
            debug!(item = ctx.work_item.id, "no parent; nothing to roll up");
            return Ok(());
        };

        let mut parent = ctx.client.get_work_item(parent_id).await?;
        let children = ctx
            .client
            .query_work_items(&format!(
                "SELECT * FROM workitems WHERE [Parent] = {}",
                parent_id
            ))
            .await?;

        let total: f64 = children
            .iter()
            .filter_map(|c| c.field_f64(&self.source_field))
            .sum();

        parent.set_field(self.target_field.clone(), total);
        ctx.client.save_work_item(&parent, false).await?;

        info!(
            parent = parent_id,
            children = children.len(),
            total,
            "rolled up {} into {}",
            self.source_field,
            self.target_field
        );
        Ok(())
    }
}
