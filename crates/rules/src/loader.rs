//! Builds a [`RuleSet`] from a rule source and a factory registry.
//!
//! A definition file binds a rule name to a registered rule kind plus
//! parameters. Files that fail to parse or construct are logged and
//! skipped so one broken definition cannot take down the whole set; their
//! errors are returned alongside the set for the caller to surface.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{info, warn};

use crate::builtin;
use crate::contract::{RuleError, RuleHandle};
use crate::set::RuleSet;
use crate::source::RuleSource;

/// Parsed shape of one definition file.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleDefinition {
    /// Stable rule name; ordering key and error key.
    pub name: String,
    /// Registered rule kind this definition instantiates.
    pub kind: String,
    /// Kind-specific parameters.
    #[serde(default = "empty_params")]
    pub params: serde_json::Value,
}

fn empty_params() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

type Factory = Box<dyn Fn(&RuleDefinition) -> Result<RuleHandle, RuleError> + Send + Sync>;

/// Maps rule kinds to constructors.
#[derive(Default)]
pub struct FactoryRegistry {
    factories: HashMap<String, Factory>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&RuleDefinition) -> Result<RuleHandle, RuleError> + Send + Sync + 'static,
    {
        self.factories.insert(kind.into(), Box::new(factory));
    }

    pub fn create(&self, def: &RuleDefinition) -> Result<RuleHandle, RuleError> {
        let factory = self.factories.get(&def.kind).ok_or_else(|| {
            RuleError::Definition(format!(
                "rule '{}' references unknown kind '{}'",
                def.name, def.kind
            ))
        })?;
        factory(def)
    }

    pub fn kinds(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

/// Registry with all built-in rule kinds registered.
pub fn builtin_registry() -> FactoryRegistry {
    let mut registry = FactoryRegistry::new();
    registry.register("rollup", builtin::rollup::factory);
    registry.register("stale-sweeper", builtin::sweeper::factory);
    registry
}

/// Load every definition the source lists and build the ordered rule set.
///
/// Returns the set plus per-definition failures (unparseable file, unknown
/// kind, bad params). Failures are also logged here; duplicate names are a
/// hard error because the set cannot be built around them.
pub fn load_rule_set(
    source: &dyn RuleSource,
    registry: &FactoryRegistry,
) -> Result<(RuleSet, Vec<(String, RuleError)>), RuleError> {
    let mut handles = Vec::new();
    let mut failures = Vec::new();

    for id in source.list()? {
        let result = source.fetch(&id).and_then(|bytes| {
            let def: RuleDefinition = serde_json::from_slice(&bytes)
                .map_err(|e| RuleError::Definition(format!("invalid definition: {}", e)))?;
            registry.create(&def)
        });
        match result {
            Ok(handle) => {
                info!(rule = handle.name(), definition = %id, "loaded rule");
                handles.push(handle);
            }
            Err(e) => {
                warn!(definition = %id, error = %e, "skipping rule definition");
                failures.push((id, e));
            }
        }
    }

    let set = RuleSet::new(handles)?;
    Ok((set, failures))
}
