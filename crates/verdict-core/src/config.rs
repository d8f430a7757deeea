use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::VerdictError;
use crate::types::Severity;

/// Top-level configuration loaded from `.verdict.toml`.
///
/// Supports layered resolution: CLI flags > local config > defaults. The
/// whole surface is optional; `VerdictConfig::default()` is the no-file
/// configuration.
///
/// # Examples
///
/// ```
/// use verdict_core::VerdictConfig;
///
/// let config = VerdictConfig::default();
/// assert_eq!(config.rules.line_length_threshold, 120);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerdictConfig {
    /// Thresholds consumed by the built-in rules.
    #[serde(default)]
    pub rules: RulesConfig,
    /// Scoring policy.
    #[serde(default)]
    pub score: ScoreConfig,
    /// Pre-rule noise filtering.
    #[serde(default)]
    pub filter: FilterConfig,
}

impl VerdictConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`VerdictError::Io`] if the file cannot be read, or
    /// [`VerdictError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use verdict_core::VerdictConfig;
    /// use std::path::Path;
    ///
    /// let config = VerdictConfig::from_file(Path::new(".verdict.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, VerdictError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`VerdictError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use verdict_core::VerdictConfig;
    ///
    /// let toml = r#"
    /// [rules]
    /// line_length_threshold = 100
    /// "#;
    /// let config = VerdictConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.rules.line_length_threshold, 100);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, VerdictError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Check every threshold and penalty for sanity.
    ///
    /// Called eagerly at engine construction, before any diff is processed,
    /// so a bad configuration can never produce a half-finished report.
    ///
    /// # Errors
    ///
    /// Returns [`VerdictError::Config`] naming the offending value.
    ///
    /// # Examples
    ///
    /// ```
    /// use verdict_core::VerdictConfig;
    ///
    /// let mut config = VerdictConfig::default();
    /// config.rules.deletion_heavy_ratio = 0.5;
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), VerdictError> {
        if self.rules.line_length_threshold == 0 {
            return Err(VerdictError::Config(
                "rules.line_length_threshold must be at least 1".into(),
            ));
        }
        if self.rules.large_file_line_threshold == 0 {
            return Err(VerdictError::Config(
                "rules.large_file_line_threshold must be at least 1".into(),
            ));
        }
        let ratio = self.rules.deletion_heavy_ratio;
        if !ratio.is_finite() || ratio < 1.0 {
            return Err(VerdictError::Config(format!(
                "rules.deletion_heavy_ratio must be a finite number >= 1.0, got {ratio}"
            )));
        }
        for (name, penalty) in [
            ("info", self.score.severity_penalties.info),
            ("warning", self.score.severity_penalties.warning),
            ("error", self.score.severity_penalties.error),
        ] {
            if penalty > 100 {
                return Err(VerdictError::Config(format!(
                    "score.severity_penalties.{name} must be at most 100, got {penalty}"
                )));
            }
        }
        Ok(())
    }
}

/// Thresholds consumed by the built-in rules.
///
/// # Examples
///
/// ```
/// use verdict_core::RulesConfig;
///
/// let config = RulesConfig::default();
/// assert_eq!(config.large_file_line_threshold, 400);
/// assert!(config.secret_keywords.iter().any(|k| k == "API_KEY"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Maximum length of an added line before it is flagged (default: 120).
    #[serde(default = "default_line_length_threshold")]
    pub line_length_threshold: usize,
    /// Added-line count above which a file is flagged as hard to review
    /// (default: 400).
    #[serde(default = "default_large_file_line_threshold")]
    pub large_file_line_threshold: usize,
    /// Removed-to-added ratio above which a file is flagged as a possible
    /// unreviewed large deletion (default: 3.0).
    #[serde(default = "default_deletion_heavy_ratio")]
    pub deletion_heavy_ratio: f64,
    /// Keywords that look like leaked credentials in added lines.
    #[serde(default = "default_secret_keywords")]
    pub secret_keywords: Vec<String>,
}

fn default_line_length_threshold() -> usize {
    120
}

fn default_large_file_line_threshold() -> usize {
    400
}

fn default_deletion_heavy_ratio() -> f64 {
    3.0
}

fn default_secret_keywords() -> Vec<String> {
    ["PRIVATE_KEY", "API_KEY", "SECRET", "TOKEN"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            line_length_threshold: default_line_length_threshold(),
            large_file_line_threshold: default_large_file_line_threshold(),
            deletion_heavy_ratio: default_deletion_heavy_ratio(),
            secret_keywords: default_secret_keywords(),
        }
    }
}

/// Scoring policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreConfig {
    /// Points subtracted from a file's score per finding, keyed by severity.
    #[serde(default)]
    pub severity_penalties: PenaltyConfig,
}

/// Per-severity score penalties.
///
/// # Examples
///
/// ```
/// use verdict_core::{PenaltyConfig, Severity};
///
/// let penalties = PenaltyConfig::default();
/// assert_eq!(penalties.for_severity(Severity::Info), 1);
/// assert_eq!(penalties.for_severity(Severity::Warning), 5);
/// assert_eq!(penalties.for_severity(Severity::Error), 15);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PenaltyConfig {
    /// Penalty per info-level finding (default: 1).
    #[serde(default = "default_info_penalty")]
    pub info: u32,
    /// Penalty per warning-level finding (default: 5).
    #[serde(default = "default_warning_penalty")]
    pub warning: u32,
    /// Penalty per error-level finding (default: 15).
    #[serde(default = "default_error_penalty")]
    pub error: u32,
}

fn default_info_penalty() -> u32 {
    1
}

fn default_warning_penalty() -> u32 {
    5
}

fn default_error_penalty() -> u32 {
    15
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            info: default_info_penalty(),
            warning: default_warning_penalty(),
            error: default_error_penalty(),
        }
    }
}

impl PenaltyConfig {
    /// Penalty for a finding of the given severity.
    pub fn for_severity(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Info => self.info,
            Severity::Warning => self.warning,
            Severity::Error => self.error,
        }
    }
}

/// Pre-rule noise filtering.
///
/// Files matching these patterns are dropped before rule evaluation and
/// reported as skipped, never scored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Glob patterns to skip (e.g. `"vendor/**"`, `"*.min.js"`).
    #[serde(default)]
    pub skip_patterns: Vec<String>,
    /// File extensions to skip (e.g. `"snap"`, `"lock"`).
    #[serde(default)]
    pub skip_extensions: Vec<String>,
}
