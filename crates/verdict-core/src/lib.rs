//! Core types, configuration, and error handling for Verdict.
//!
//! This crate provides the shared foundation used by all other Verdict crates:
//! - [`VerdictError`] — unified error type using `thiserror` + `miette`
//! - [`VerdictConfig`] — configuration loaded from `.verdict.toml`
//! - Shared types: [`Severity`], [`Finding`], [`ScoreResult`], [`FileScore`],
//!   [`QualityBand`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{FilterConfig, PenaltyConfig, RulesConfig, ScoreConfig, VerdictConfig};
pub use error::VerdictError;
pub use types::{FileScore, Finding, OutputFormat, QualityBand, ScoreResult, Severity};

/// A convenience `Result` type for Verdict operations.
pub type Result<T> = std::result::Result<T, VerdictError>;
