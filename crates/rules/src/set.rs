//! Ordered rule set.

use crate::contract::{RuleError, RuleHandle};

/// The ordered set of rules an executor runs.
///
/// Ordering is lexicographic ascending by rule name — the sole execution
/// order guarantee. Ordering is this crate's responsibility, never the
/// rule source's. Duplicate names are rejected because the name is also
/// the error-map key.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<RuleHandle>,
}

impl RuleSet {
    pub fn new(mut rules: Vec<RuleHandle>) -> Result<Self, RuleError> {
        rules.sort_by(|a, b| a.name().cmp(b.name()));
        for pair in rules.windows(2) {
            if pair[0].name() == pair[1].name() {
                return Err(RuleError::Definition(format!(
                    "duplicate rule name '{}'",
                    pair[0].name()
                )));
            }
        }
        Ok(Self { rules })
    }

    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleHandle> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }
}
