//! Rule abstraction for the itemflow engine.
//!
//! A rule is an independently authored unit of automation logic invoked by
//! the engine with a fixed contract. Two contracts exist: fire-and-forget
//! (success is "returned Ok") and interval-aware (reports success, an
//! optional message, and an optional self-chosen re-execution interval).
//! Which contract a rule speaks is fixed when it is registered, so the
//! executors dispatch on a tagged handle instead of probing per invocation.

pub mod builtin;
pub mod context;
pub mod contract;
pub mod loader;
pub mod set;
pub mod source;

pub use context::ExecutionContext;
pub use contract::{
    FireAndForgetRule, IntervalAwareRule, RuleError, RuleHandle, ScheduledOutcome,
};
pub use loader::{builtin_registry, load_rule_set, FactoryRegistry, RuleDefinition};
pub use set::RuleSet;
pub use source::{DirRuleSource, RuleSource};
