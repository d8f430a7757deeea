use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Severity level of a finding.
///
/// # Examples
///
/// ```
/// use verdict_core::Severity;
///
/// let s: Severity = serde_json::from_str("\"warning\"").unwrap();
/// assert_eq!(s, Severity::Warning);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational observation.
    Info,
    /// A potential issue worth investigating.
    Warning,
    /// A serious problem that should block the change.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

impl Severity {
    /// Returns `true` if `self` is at least as severe as `threshold`.
    ///
    /// Severity order: Error > Warning > Info.
    ///
    /// # Examples
    ///
    /// ```
    /// use verdict_core::Severity;
    ///
    /// assert!(Severity::Error.meets_threshold(Severity::Warning));
    /// assert!(Severity::Warning.meets_threshold(Severity::Warning));
    /// assert!(!Severity::Info.meets_threshold(Severity::Warning));
    /// ```
    pub fn meets_threshold(self, threshold: Severity) -> bool {
        self.rank() <= threshold.rank()
    }

    fn rank(self) -> u8 {
        match self {
            Severity::Error => 0,
            Severity::Warning => 1,
            Severity::Info => 2,
        }
    }
}

/// One rule's observation about a specific location (or whole file) in a diff.
///
/// Findings are value objects: they have no identity beyond their fields.
///
/// # Examples
///
/// ```
/// use verdict_core::{Finding, Severity};
/// use std::path::PathBuf;
///
/// let finding = Finding {
///     rule_id: "line-length".into(),
///     severity: Severity::Warning,
///     file_path: PathBuf::from("src/main.rs"),
///     line: Some(42),
///     message: "line exceeds 120 characters".into(),
/// };
/// assert_eq!(finding.severity, Severity::Warning);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// Stable identifier of the rule that produced this finding.
    pub rule_id: String,
    /// Severity of the finding.
    pub severity: Severity,
    /// Path to the file being flagged.
    pub file_path: PathBuf,
    /// Line number in the new version of the file; `None` for file-level findings.
    pub line: Option<u32>,
    /// Human-readable explanation.
    pub message: String,
}

/// Quality score for a single file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileScore {
    /// File path.
    pub path: PathBuf,
    /// Score in `[0, 100]`.
    pub score: f64,
    /// Lines added in this file.
    pub lines_added: u32,
    /// Lines removed in this file.
    pub lines_removed: u32,
}

/// Aggregated scores for an analysis run.
///
/// Per-file scores are kept in diff order. Derived once, never mutated.
///
/// # Examples
///
/// ```
/// use verdict_core::ScoreResult;
///
/// let result = ScoreResult {
///     per_file: vec![],
///     overall: 100.0,
/// };
/// assert_eq!(result.overall, 100.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    /// Per-file scores in diff order.
    pub per_file: Vec<FileScore>,
    /// Overall score in `[0, 100]`, weighted by changed-line count.
    pub overall: f64,
}

/// Categorical quality classification based on score ranges.
///
/// # Examples
///
/// ```
/// use verdict_core::QualityBand;
///
/// let band = QualityBand::from_score(82.0);
/// assert_eq!(band, QualityBand::Good);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityBand {
    /// Score below 50.
    Poor,
    /// Score 50–74.
    Fair,
    /// Score 75–89.
    Good,
    /// Score 90–100.
    Excellent,
}

impl QualityBand {
    /// Map a numeric score to a quality band.
    ///
    /// # Examples
    ///
    /// ```
    /// use verdict_core::QualityBand;
    ///
    /// assert_eq!(QualityBand::from_score(100.0), QualityBand::Excellent);
    /// assert_eq!(QualityBand::from_score(80.0), QualityBand::Good);
    /// assert_eq!(QualityBand::from_score(60.0), QualityBand::Fair);
    /// assert_eq!(QualityBand::from_score(10.0), QualityBand::Poor);
    /// ```
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            QualityBand::Excellent
        } else if score >= 75.0 {
            QualityBand::Good
        } else if score >= 50.0 {
            QualityBand::Fair
        } else {
            QualityBand::Poor
        }
    }
}

impl fmt::Display for QualityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityBand::Poor => write!(f, "Poor"),
            QualityBand::Fair => write!(f, "Fair"),
            QualityBand::Good => write!(f, "Good"),
            QualityBand::Excellent => write!(f, "Excellent"),
        }
    }
}

/// Output format for CLI subcommands.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument parsing.
///
/// # Examples
///
/// ```
/// use verdict_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable tables and summaries.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// Markdown-formatted output.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
