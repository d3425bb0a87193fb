//! Built-in rule implementations.
//!
//! These are the rule instances shipped with the engine. Each one is a
//! plain struct behind one of the two rule contracts, constructed from a
//! definition file by its `factory` function.

pub mod rollup;
pub mod sweeper;

#[cfg(test)]
pub(crate) mod testkit;
