//! Unified diff parsing and pre-analysis noise filtering.
//!
//! Turns raw `git diff` text into a structural [`parser::DiffModel`] of
//! files, hunks, and lines, validating hunk line tallies against their
//! declared counts. The [`filter::DiffFilter`] drops lock files and
//! configured patterns before rule evaluation.

pub mod filter;
pub mod parser;
