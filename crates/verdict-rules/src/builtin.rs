//! The built-in rule set.
//!
//! Each rule is stateless and reads only its [`FileChange`] argument plus
//! fixed configuration captured at construction, which guarantees
//! reproducible output for identical input.

use std::path::Path;

use verdict_core::{Finding, Severity, VerdictConfig};
use verdict_diff::parser::{DiffLine, FileChange, LineKind};

use crate::engine::Rule;

/// Markers that signal unresolved work in an added line.
const TODO_MARKERS: &[&str] = &["TODO", "FIXME"];

/// Deletion-heavy flagging requires at least this many removed lines, so
/// trivial deletions stay quiet regardless of ratio.
const MIN_REMOVED_LINES: u32 = 10;

/// Instantiate the built-in rules in their fixed registration order.
pub fn default_rules(config: &VerdictConfig) -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(LineLength {
            max_len: config.rules.line_length_threshold,
        }),
        Box::new(TrailingWhitespace),
        Box::new(TodoMarker),
        Box::new(LargeFile {
            max_added: config.rules.large_file_line_threshold,
        }),
        Box::new(DeletionHeavy {
            ratio: config.rules.deletion_heavy_ratio,
        }),
        Box::new(SecretScan {
            keywords: config.rules.secret_keywords.clone(),
        }),
    ]
}

fn added_lines(file: &FileChange) -> impl Iterator<Item = &DiffLine> {
    file.hunks
        .iter()
        .flat_map(|h| h.lines.iter())
        .filter(|l| l.kind == LineKind::Added)
}

fn line_finding(
    rule_id: &str,
    severity: Severity,
    path: &Path,
    line: &DiffLine,
    message: String,
) -> Finding {
    Finding {
        rule_id: rule_id.into(),
        severity,
        file_path: path.to_path_buf(),
        line: line.new_line,
        message,
    }
}

fn file_finding(rule_id: &str, severity: Severity, path: &Path, message: String) -> Finding {
    Finding {
        rule_id: rule_id.into(),
        severity,
        file_path: path.to_path_buf(),
        line: None,
        message,
    }
}

/// Flags added lines longer than the configured threshold.
pub struct LineLength {
    /// Maximum allowed line length in characters.
    pub max_len: usize,
}

impl Rule for LineLength {
    fn id(&self) -> &'static str {
        "line-length"
    }

    fn evaluate(&self, file: &FileChange) -> Vec<Finding> {
        added_lines(file)
            .filter(|l| l.content.chars().count() > self.max_len)
            .map(|l| {
                line_finding(
                    self.id(),
                    Severity::Warning,
                    file.path(),
                    l,
                    format!(
                        "line has {} characters (limit {})",
                        l.content.chars().count(),
                        self.max_len
                    ),
                )
            })
            .collect()
    }
}

/// Flags added lines ending in whitespace.
pub struct TrailingWhitespace;

impl Rule for TrailingWhitespace {
    fn id(&self) -> &'static str {
        "trailing-whitespace"
    }

    fn evaluate(&self, file: &FileChange) -> Vec<Finding> {
        added_lines(file)
            .filter(|l| {
                !l.content.is_empty() && l.content.ends_with(|c: char| c.is_whitespace())
            })
            .map(|l| {
                line_finding(
                    self.id(),
                    Severity::Info,
                    file.path(),
                    l,
                    "trailing whitespace".into(),
                )
            })
            .collect()
    }
}

/// Flags added lines containing TODO/FIXME markers.
pub struct TodoMarker;

impl Rule for TodoMarker {
    fn id(&self) -> &'static str {
        "todo-marker"
    }

    fn evaluate(&self, file: &FileChange) -> Vec<Finding> {
        added_lines(file)
            .filter_map(|l| {
                let marker = TODO_MARKERS.iter().find(|m| l.content.contains(*m))?;
                Some(line_finding(
                    self.id(),
                    Severity::Warning,
                    file.path(),
                    l,
                    format!("unresolved {marker} marker"),
                ))
            })
            .collect()
    }
}

/// Flags a file whose added-line count exceeds the threshold.
///
/// A proxy for "this change is hard to review"; file-level, no line number.
pub struct LargeFile {
    /// Added-line count above which the file is flagged.
    pub max_added: usize,
}

impl Rule for LargeFile {
    fn id(&self) -> &'static str {
        "large-file"
    }

    fn evaluate(&self, file: &FileChange) -> Vec<Finding> {
        let added = file.lines_added() as usize;
        if added > self.max_added {
            vec![file_finding(
                self.id(),
                Severity::Warning,
                file.path(),
                format!(
                    "adds {added} lines (threshold {}); consider splitting the change",
                    self.max_added
                ),
            )]
        } else {
            Vec::new()
        }
    }
}

/// Flags a file whose removed-line count greatly exceeds its added-line
/// count, a possible unreviewed large deletion.
pub struct DeletionHeavy {
    /// Removed-to-added ratio above which the file is flagged.
    pub ratio: f64,
}

impl Rule for DeletionHeavy {
    fn id(&self) -> &'static str {
        "deletion-heavy"
    }

    fn evaluate(&self, file: &FileChange) -> Vec<Finding> {
        let added = file.lines_added();
        let removed = file.lines_removed();
        // Ratio compares against max(added, 1) to stay defined for pure deletions.
        let threshold = self.ratio * f64::from(added.max(1));
        if removed >= MIN_REMOVED_LINES && f64::from(removed) >= threshold {
            vec![file_finding(
                self.id(),
                Severity::Warning,
                file.path(),
                format!("removes {removed} lines while adding {added}; verify the deletion is intended"),
            )]
        } else {
            Vec::new()
        }
    }
}

/// Flags added lines containing configured secret keywords.
pub struct SecretScan {
    /// Keywords that look like leaked credentials.
    pub keywords: Vec<String>,
}

impl Rule for SecretScan {
    fn id(&self) -> &'static str {
        "secret-scan"
    }

    fn evaluate(&self, file: &FileChange) -> Vec<Finding> {
        added_lines(file)
            .filter_map(|l| {
                let keyword = self.keywords.iter().find(|k| l.content.contains(*k))?;
                Some(line_finding(
                    self.id(),
                    Severity::Error,
                    file.path(),
                    l,
                    format!("possible secret: line mentions {keyword}"),
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_diff::parser::parse_unified_diff;

    fn file_from_diff(diff: &str) -> FileChange {
        parse_unified_diff(diff).unwrap().files.remove(0)
    }

    fn file_with_added_lines(lines: &[&str]) -> FileChange {
        let mut diff = String::from(
            "diff --git a/test.rs b/test.rs\n--- a/test.rs\n+++ b/test.rs\n",
        );
        diff.push_str(&format!("@@ -0,0 +1,{} @@\n", lines.len()));
        for line in lines {
            diff.push('+');
            diff.push_str(line);
            diff.push('\n');
        }
        file_from_diff(&diff)
    }

    #[test]
    fn line_length_flags_long_added_line() {
        let long = "x".repeat(200);
        let file = file_with_added_lines(&[&long, "short"]);
        let rule = LineLength { max_len: 120 };
        let findings = rule.evaluate(&file);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert_eq!(findings[0].line, Some(1));
        assert!(findings[0].message.contains("200"));
    }

    #[test]
    fn line_length_ignores_removed_lines() {
        let diff = format!(
            "diff --git a/t.rs b/t.rs\n--- a/t.rs\n+++ b/t.rs\n@@ -1,1 +1,1 @@\n-{}\n+ok\n",
            "y".repeat(300)
        );
        let file = file_from_diff(&diff);
        let rule = LineLength { max_len: 120 };
        assert!(rule.evaluate(&file).is_empty());
    }

    #[test]
    fn line_length_counts_chars_not_bytes() {
        let umlauts = "ü".repeat(100);
        let file = file_with_added_lines(&[&umlauts]);
        let rule = LineLength { max_len: 120 };
        assert!(rule.evaluate(&file).is_empty());
    }

    #[test]
    fn trailing_whitespace_flags_spaces_and_tabs() {
        let file = file_with_added_lines(&["clean", "spaces   ", "tab\t"]);
        let findings = TrailingWhitespace.evaluate(&file);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].line, Some(2));
        assert_eq!(findings[1].line, Some(3));
        assert!(findings.iter().all(|f| f.severity == Severity::Info));
    }

    #[test]
    fn trailing_whitespace_ignores_empty_lines() {
        let file = file_with_added_lines(&[""]);
        assert!(TrailingWhitespace.evaluate(&file).is_empty());
    }

    #[test]
    fn todo_marker_flags_todo_and_fixme() {
        let file = file_with_added_lines(&[
            "// TODO: handle errors",
            "fine line",
            "// FIXME later",
        ]);
        let findings = TodoMarker.evaluate(&file);
        assert_eq!(findings.len(), 2);
        assert!(findings[0].message.contains("TODO"));
        assert!(findings[1].message.contains("FIXME"));
    }

    #[test]
    fn todo_marker_reports_one_finding_per_line() {
        let file = file_with_added_lines(&["// TODO and FIXME on one line"]);
        assert_eq!(TodoMarker.evaluate(&file).len(), 1);
    }

    #[test]
    fn large_file_flags_above_threshold() {
        let lines: Vec<String> = (0..6).map(|i| format!("line {i}")).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let file = file_with_added_lines(&refs);

        let rule = LargeFile { max_added: 5 };
        let findings = rule.evaluate(&file);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, None);

        let relaxed = LargeFile { max_added: 6 };
        assert!(relaxed.evaluate(&file).is_empty());
    }

    #[test]
    fn deletion_heavy_flags_large_deletion() {
        let mut diff = String::from(
            "diff --git a/gone.rs b/gone.rs\n--- a/gone.rs\n+++ b/gone.rs\n@@ -1,50 +1,2 @@\n",
        );
        for i in 0..50 {
            diff.push_str(&format!("-old line {i}\n"));
        }
        diff.push_str("+new one\n+new two\n");
        let file = file_from_diff(&diff);

        let rule = DeletionHeavy { ratio: 3.0 };
        let findings = rule.evaluate(&file);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, None);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert!(findings[0].message.contains("50"));
    }

    #[test]
    fn deletion_heavy_ignores_small_deletions() {
        let diff = "\
diff --git a/t.rs b/t.rs
--- a/t.rs
+++ b/t.rs
@@ -1,3 +0,0 @@
-one
-two
-three
";
        let file = file_from_diff(diff);
        let rule = DeletionHeavy { ratio: 3.0 };
        assert!(rule.evaluate(&file).is_empty());
    }

    #[test]
    fn deletion_heavy_respects_ratio() {
        // 12 removed, 5 added: ratio 2.4 trips at 2.0 but not at 3.0.
        let mut diff = String::from(
            "diff --git a/t.rs b/t.rs\n--- a/t.rs\n+++ b/t.rs\n@@ -1,12 +1,5 @@\n",
        );
        for i in 0..12 {
            diff.push_str(&format!("-r{i}\n"));
        }
        for i in 0..5 {
            diff.push_str(&format!("+a{i}\n"));
        }
        let file = file_from_diff(&diff);

        assert_eq!(DeletionHeavy { ratio: 2.0 }.evaluate(&file).len(), 1);
        assert!(DeletionHeavy { ratio: 3.0 }.evaluate(&file).is_empty());
    }

    #[test]
    fn secret_scan_flags_keywords() {
        let file = file_with_added_lines(&[
            "let key = env(\"API_KEY\");",
            "nothing to see",
        ]);
        let rule = SecretScan {
            keywords: vec!["API_KEY".into(), "SECRET".into()],
        };
        let findings = rule.evaluate(&file);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Error);
        assert!(findings[0].message.contains("API_KEY"));
    }

    #[test]
    fn rules_are_pure() {
        let file = file_with_added_lines(&["// TODO: x", "trailing ", "API_KEY=abc"]);
        let rules = default_rules(&VerdictConfig::default());
        for rule in &rules {
            assert_eq!(rule.evaluate(&file), rule.evaluate(&file));
        }
    }

    #[test]
    fn clean_file_produces_no_findings() {
        let file = file_with_added_lines(&["fn add(a: u32, b: u32) -> u32 {", "    a + b", "}"]);
        for rule in default_rules(&VerdictConfig::default()) {
            assert!(rule.evaluate(&file).is_empty(), "rule {} fired", rule.id());
        }
    }

    #[test]
    fn rename_without_hunks_is_quiet() {
        let diff = "\
diff --git a/a.rs b/b.rs
similarity index 100%
rename from a.rs
rename to b.rs
";
        let file = file_from_diff(diff);
        for rule in default_rules(&VerdictConfig::default()) {
            assert!(rule.evaluate(&file).is_empty());
        }
    }
}
