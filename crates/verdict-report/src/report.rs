use std::fmt;

use serde::Serialize;

use verdict_core::{Finding, QualityBand, ScoreResult, VerdictConfig, VerdictError};
use verdict_diff::filter::{DiffFilter, SkippedFile};
use verdict_diff::parser::{parse_unified_diff, DiffModel};
use verdict_rules::engine::RuleEngine;

use crate::score::aggregate;

/// High-level summary statistics for an analysis run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    /// Number of files analyzed (after filtering).
    pub total_files: usize,
    /// Total lines added across analyzed files.
    pub total_additions: u32,
    /// Total lines removed across analyzed files.
    pub total_deletions: u32,
    /// Number of findings across all rules.
    pub total_findings: usize,
    /// Number of files excluded by the noise filter.
    pub skipped_files: usize,
    /// Categorical classification of the overall score.
    pub band: QualityBand,
}

/// The immutable result of one analysis run: parsed diff, findings, scores.
///
/// Created once per run and handed to the rendering layer; it has no
/// further lifecycle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// The structural model the rules ran over.
    pub diff_model: DiffModel,
    /// All findings, ordered by file and rule registration.
    pub findings: Vec<Finding>,
    /// Per-file and overall scores.
    pub score: ScoreResult,
    /// Files excluded by the noise filter, with reasons.
    pub skipped: Vec<SkippedFile>,
    /// Summary statistics.
    pub summary: ReportSummary,
}

/// The analysis pipeline: parse, filter, evaluate rules, aggregate.
///
/// Construction validates the configuration eagerly, so a misconfigured
/// analyzer never exists. `analyze` itself performs no I/O.
///
/// # Examples
///
/// ```
/// use verdict_core::VerdictConfig;
/// use verdict_report::report::Analyzer;
///
/// let analyzer = Analyzer::new(&VerdictConfig::default()).unwrap();
/// let diff = concat!(
///     "diff --git a/f.rs b/f.rs\n",
///     "--- a/f.rs\n",
///     "+++ b/f.rs\n",
///     "@@ -1,2 +1,3 @@\n",
///     " fn main() {\n",
///     "+    let x = 1;\n",
///     " }\n",
/// );
/// let report = analyzer.analyze(diff).unwrap();
/// assert!(report.findings.is_empty());
/// assert_eq!(report.score.overall, 100.0);
/// ```
pub struct Analyzer {
    engine: RuleEngine,
    filter: DiffFilter,
    config: VerdictConfig,
}

impl Analyzer {
    /// Build an analyzer with the built-in rule set.
    ///
    /// # Errors
    ///
    /// Returns [`VerdictError::Config`] for out-of-range thresholds or
    /// penalties, before any diff is processed.
    pub fn new(config: &VerdictConfig) -> Result<Self, VerdictError> {
        let engine = RuleEngine::with_defaults(config)?;
        Ok(Self {
            engine,
            filter: DiffFilter::from_config(&config.filter),
            config: config.clone(),
        })
    }

    /// Build an analyzer around a custom rule engine.
    ///
    /// # Errors
    ///
    /// Returns [`VerdictError::Config`] if the configuration is invalid.
    pub fn with_engine(engine: RuleEngine, config: &VerdictConfig) -> Result<Self, VerdictError> {
        config.validate()?;
        Ok(Self {
            engine,
            filter: DiffFilter::from_config(&config.filter),
            config: config.clone(),
        })
    }

    /// Run the full pipeline over raw unified-diff text.
    ///
    /// # Errors
    ///
    /// Returns [`VerdictError::MalformedDiff`] if the input cannot be
    /// parsed; rule faults never surface here — they become findings.
    pub fn analyze(&self, input: &str) -> Result<AnalysisReport, VerdictError> {
        let model = parse_unified_diff(input)?;
        let outcome = self.filter.filter(model);
        let findings = self.engine.run(&outcome.kept);
        let score = aggregate(
            &outcome.kept,
            &findings,
            &self.config.score.severity_penalties,
        );

        let summary = ReportSummary {
            total_files: outcome.kept.files.len(),
            total_additions: outcome.kept.total_additions(),
            total_deletions: outcome.kept.total_deletions(),
            total_findings: findings.len(),
            skipped_files: outcome.skipped.len(),
            band: QualityBand::from_score(score.overall),
        };

        Ok(AnalysisReport {
            diff_model: outcome.kept,
            findings,
            score,
            skipped: outcome.skipped,
            summary,
        })
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analysis Report")?;
        writeln!(f, "===============")?;
        writeln!(
            f,
            "Overall Score: {:.1}/100 ({})\n",
            self.score.overall, self.summary.band
        )?;

        if !self.score.per_file.is_empty() {
            writeln!(f, "{:<44} {:>11} {:>8}", "File", "+/-", "Score")?;
            writeln!(f, "{}", "-".repeat(66))?;
            for fs in &self.score.per_file {
                writeln!(
                    f,
                    "{:<44} {:>+5}/{:<-5} {:>8.1}",
                    fs.path.display(),
                    fs.lines_added,
                    fs.lines_removed,
                    fs.score,
                )?;
            }
            writeln!(f)?;
        }

        if !self.findings.is_empty() {
            writeln!(f, "Findings:")?;
            for finding in &self.findings {
                match finding.line {
                    Some(line) => writeln!(
                        f,
                        "[{}] {}:{} {} — {}",
                        finding.severity,
                        finding.file_path.display(),
                        line,
                        finding.rule_id,
                        finding.message,
                    )?,
                    None => writeln!(
                        f,
                        "[{}] {} {} — {}",
                        finding.severity,
                        finding.file_path.display(),
                        finding.rule_id,
                        finding.message,
                    )?,
                }
            }
            writeln!(f)?;
        }

        if !self.skipped.is_empty() {
            writeln!(f, "Skipped:")?;
            for s in &self.skipped {
                writeln!(f, "{} ({})", s.path.display(), s.reason)?;
            }
            writeln!(f)?;
        }

        writeln!(
            f,
            "Summary: {} files, +{} additions, -{} deletions, {} findings ({} skipped)",
            self.summary.total_files,
            self.summary.total_additions,
            self.summary.total_deletions,
            self.summary.total_findings,
            self.summary.skipped_files,
        )
    }
}

impl AnalysisReport {
    /// Render the report as a markdown string.
    ///
    /// # Examples
    ///
    /// ```
    /// use verdict_core::VerdictConfig;
    /// use verdict_report::report::Analyzer;
    ///
    /// let analyzer = Analyzer::new(&VerdictConfig::default()).unwrap();
    /// let diff = "--- a/f.rs\n+++ b/f.rs\n@@ -1 +1,2 @@\n x\n+y\n";
    /// let md = analyzer.analyze(diff).unwrap().to_markdown();
    /// assert!(md.contains("# Analysis Report"));
    /// ```
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Analysis Report\n\n");
        out.push_str(&format!(
            "**Overall Score:** {:.1}/100 ({})\n\n",
            self.score.overall, self.summary.band
        ));

        if !self.score.per_file.is_empty() {
            out.push_str("| File | +/- | Score |\n");
            out.push_str("|------|-----|-------|\n");
            for fs in &self.score.per_file {
                out.push_str(&format!(
                    "| {} | +{}/-{} | {:.1} |\n",
                    fs.path.display(),
                    fs.lines_added,
                    fs.lines_removed,
                    fs.score,
                ));
            }
            out.push('\n');
        }

        if !self.findings.is_empty() {
            out.push_str("## Findings\n\n");
            for finding in &self.findings {
                let location = match finding.line {
                    Some(line) => format!("{}:{line}", finding.file_path.display()),
                    None => finding.file_path.display().to_string(),
                };
                out.push_str(&format!(
                    "- **{}** `{}` ({}): {}\n",
                    finding.severity, location, finding.rule_id, finding.message,
                ));
            }
            out.push('\n');
        }

        if !self.skipped.is_empty() {
            out.push_str("## Skipped\n\n");
            for s in &self.skipped {
                out.push_str(&format!("- `{}` ({})\n", s.path.display(), s.reason));
            }
            out.push('\n');
        }

        out.push_str(&format!(
            "**Summary:** {} files, +{} additions, -{} deletions, {} findings\n",
            self.summary.total_files,
            self.summary.total_additions,
            self.summary.total_deletions,
            self.summary.total_findings,
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_core::Severity;

    fn analyzer() -> Analyzer {
        Analyzer::new(&VerdictConfig::default()).unwrap()
    }

    #[test]
    fn malformed_input_produces_no_report() {
        let err = analyzer().analyze("").unwrap_err();
        assert!(matches!(err, VerdictError::MalformedDiff(_)));
    }

    #[test]
    fn clean_diff_scores_100_with_no_findings() {
        let diff = "\
diff --git a/clean.rs b/clean.rs
--- a/clean.rs
+++ b/clean.rs
@@ -0,0 +1,3 @@
+fn add(a: u32, b: u32) -> u32 {
+    a + b
+}
";
        let report = analyzer().analyze(diff).unwrap();
        assert!(report.findings.is_empty());
        assert_eq!(report.score.overall, 100.0);
        assert_eq!(report.summary.band, QualityBand::Excellent);
    }

    #[test]
    fn long_line_costs_one_warning_penalty() {
        let long = "x".repeat(200);
        let diff = format!(
            "diff --git a/f.rs b/f.rs\n--- a/f.rs\n+++ b/f.rs\n@@ -0,0 +1,1 @@\n+{long}\n"
        );
        let report = analyzer().analyze(&diff).unwrap();

        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].rule_id, "line-length");
        assert_eq!(report.findings[0].severity, Severity::Warning);
        // Single file carries full weight: overall equals the file score.
        assert_eq!(report.score.per_file[0].score, 95.0);
        assert_eq!(report.score.overall, 95.0);
    }

    #[test]
    fn deletion_heavy_file_gets_file_level_finding() {
        let mut diff = String::from(
            "diff --git a/gone.rs b/gone.rs\n--- a/gone.rs\n+++ b/gone.rs\n@@ -1,50 +1,2 @@\n",
        );
        for i in 0..50 {
            diff.push_str(&format!("-line {i}\n"));
        }
        diff.push_str("+kept one\n+kept two\n");

        let report = analyzer().analyze(&diff).unwrap();
        let deletion_findings: Vec<&Finding> = report
            .findings
            .iter()
            .filter(|f| f.rule_id == "deletion-heavy")
            .collect();
        assert_eq!(deletion_findings.len(), 1);
        assert_eq!(deletion_findings[0].line, None);
    }

    #[test]
    fn weighting_pulls_overall_toward_large_file() {
        let mut diff = String::from(
            "diff --git a/big.rs b/big.rs\n--- a/big.rs\n+++ b/big.rs\n@@ -0,0 +1,20 @@\n",
        );
        for _ in 0..20 {
            // Every added line carries an unresolved marker.
            diff.push_str("+// TODO: rework\n");
        }
        diff.push_str(
            "diff --git a/tiny.rs b/tiny.rs\n--- a/tiny.rs\n+++ b/tiny.rs\n@@ -0,0 +1,1 @@\n+fn tiny() {}\n",
        );

        let report = analyzer().analyze(&diff).unwrap();
        let big = report.score.per_file[0].score;
        let tiny = report.score.per_file[1].score;
        assert_eq!(big, 0.0); // 20 warnings * 5 points
        assert_eq!(tiny, 100.0);

        let unweighted = (big + tiny) / 2.0;
        assert!(report.score.overall < unweighted);
        assert!((report.score.overall - big).abs() < (report.score.overall - tiny).abs());
    }

    #[test]
    fn skipped_files_are_not_scored() {
        let diff = "\
diff --git a/Cargo.lock b/Cargo.lock
--- a/Cargo.lock
+++ b/Cargo.lock
@@ -0,0 +1,1 @@
+version = 3
diff --git a/src/lib.rs b/src/lib.rs
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -0,0 +1,1 @@
+pub fn f() {}
";
        let report = analyzer().analyze(diff).unwrap();
        assert_eq!(report.summary.skipped_files, 1);
        assert_eq!(report.score.per_file.len(), 1);
        assert_eq!(
            report.score.per_file[0].path.to_string_lossy(),
            "src/lib.rs"
        );
    }

    #[test]
    fn invalid_config_rejected_before_parsing() {
        let mut config = VerdictConfig::default();
        config.score.severity_penalties.error = 500;
        assert!(Analyzer::new(&config).is_err());
    }

    #[test]
    fn report_serializes_to_camel_case_json() {
        let diff = "--- a/f.rs\n+++ b/f.rs\n@@ -1 +1,2 @@\n x\n+// TODO: y\n";
        let report = analyzer().analyze(diff).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("diffModel").is_some());
        assert!(json.get("findings").is_some());
        assert!(json["score"].get("perFile").is_some());
        assert!(json["summary"].get("totalFindings").is_some());
    }

    #[test]
    fn display_and_markdown_output() {
        let long = "z".repeat(150);
        let diff = format!(
            "diff --git a/f.rs b/f.rs\n--- a/f.rs\n+++ b/f.rs\n@@ -0,0 +1,1 @@\n+{long}\n"
        );
        let report = analyzer().analyze(&diff).unwrap();

        let text = format!("{report}");
        assert!(text.contains("Analysis Report"));
        assert!(text.contains("f.rs"));
        assert!(text.contains("line-length"));

        let md = report.to_markdown();
        assert!(md.contains("# Analysis Report"));
        assert!(md.contains("| f.rs |"));
    }
}
