//! Heuristic rule evaluation over a parsed diff.
//!
//! A [`engine::Rule`] is an independent check producing zero or more
//! findings from a single file's change. The [`engine::RuleEngine`] runs a
//! registered, ordered set of rules over every file in a diff model and
//! isolates rules that fault so one broken rule never aborts the analysis.

pub mod builtin;
pub mod engine;
