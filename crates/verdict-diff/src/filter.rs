//! Pre-rule file filtering to eliminate noise at the source.
//!
//! Drops lock files and files matching configured glob patterns or
//! extensions before they reach the rule engine. Skipped files are
//! reported as data, never silently discarded.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use verdict_core::FilterConfig;

use crate::parser::{DiffModel, FileChange};

const LOCK_FILES: &[&str] = &[
    "Cargo.lock",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "poetry.lock",
    "Gemfile.lock",
    "composer.lock",
    "go.sum",
];

/// Files and patterns to skip before rule evaluation.
///
/// # Examples
///
/// ```
/// use verdict_diff::filter::DiffFilter;
///
/// let filter = DiffFilter::default_filter();
/// assert!(filter.should_skip("package-lock.json"));
/// assert!(!filter.should_skip("src/main.rs"));
/// ```
pub struct DiffFilter {
    skip_patterns: Vec<glob::Pattern>,
    skip_extensions: Vec<String>,
}

/// Why a file was excluded from analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    /// Dependency lock file.
    LockFile,
    /// Matched a configured glob pattern.
    PatternMatch(String),
    /// Matched a configured extension.
    Extension(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::LockFile => write!(f, "lock file"),
            SkipReason::PatternMatch(pat) => write!(f, "matches pattern {pat}"),
            SkipReason::Extension(ext) => write!(f, "skipped extension .{ext}"),
        }
    }
}

/// A file excluded from analysis, with the reason.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedFile {
    /// Path of the excluded file.
    pub path: PathBuf,
    /// Why it was excluded.
    pub reason: SkipReason,
}

/// Result of filtering a diff model.
pub struct FilterOutcome {
    /// Files that proceed to rule evaluation, still in diff order.
    pub kept: DiffModel,
    /// Files excluded from analysis.
    pub skipped: Vec<SkippedFile>,
}

impl DiffFilter {
    /// Create a filter with only the built-in lock-file list.
    ///
    /// # Examples
    ///
    /// ```
    /// use verdict_diff::filter::DiffFilter;
    ///
    /// let filter = DiffFilter::default_filter();
    /// assert!(filter.should_skip("yarn.lock"));
    /// ```
    pub fn default_filter() -> Self {
        Self {
            skip_patterns: Vec::new(),
            skip_extensions: Vec::new(),
        }
    }

    /// Create a filter from configuration. Invalid glob patterns are
    /// ignored rather than failing the run.
    ///
    /// # Examples
    ///
    /// ```
    /// use verdict_core::FilterConfig;
    /// use verdict_diff::filter::DiffFilter;
    ///
    /// let config = FilterConfig {
    ///     skip_patterns: vec!["vendor/**".into()],
    ///     skip_extensions: vec!["snap".into()],
    /// };
    /// let filter = DiffFilter::from_config(&config);
    /// assert!(filter.should_skip("vendor/lib.js"));
    /// assert!(filter.should_skip("tests/ui.snap"));
    /// ```
    pub fn from_config(config: &FilterConfig) -> Self {
        let skip_patterns = config
            .skip_patterns
            .iter()
            .filter_map(|pat| glob::Pattern::new(pat).ok())
            .collect();

        Self {
            skip_patterns,
            skip_extensions: config.skip_extensions.clone(),
        }
    }

    /// Check whether a single path would be skipped.
    pub fn should_skip(&self, path: &str) -> bool {
        let probe = FileChange {
            old_path: PathBuf::from(path),
            new_path: PathBuf::from(path),
            kind: crate::parser::ChangeKind::Modified,
            hunks: Vec::new(),
        };
        self.skip_reason(&probe).is_some()
    }

    /// Split a model into reviewable files and skipped files.
    pub fn filter(&self, model: DiffModel) -> FilterOutcome {
        let mut kept = Vec::new();
        let mut skipped = Vec::new();

        for file in model.files {
            match self.skip_reason(&file) {
                Some(reason) => skipped.push(SkippedFile {
                    path: file.path().to_path_buf(),
                    reason,
                }),
                None => kept.push(file),
            }
        }

        FilterOutcome {
            kept: DiffModel { files: kept },
            skipped,
        }
    }

    fn skip_reason(&self, file: &FileChange) -> Option<SkipReason> {
        let path = file.path();
        let file_name = path.file_name().and_then(|f| f.to_str()).unwrap_or("");

        if LOCK_FILES.contains(&file_name) {
            return Some(SkipReason::LockFile);
        }

        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if self.skip_extensions.iter().any(|s| s == ext) {
                return Some(SkipReason::Extension(ext.to_string()));
            }
        }

        let path_str = path.to_string_lossy();
        for pat in &self.skip_patterns {
            if pat.matches(&path_str) {
                return Some(SkipReason::PatternMatch(pat.to_string()));
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_unified_diff;

    #[test]
    fn lock_files_are_skipped() {
        let filter = DiffFilter::default_filter();
        assert!(filter.should_skip("Cargo.lock"));
        assert!(filter.should_skip("deep/nested/package-lock.json"));
        assert!(!filter.should_skip("src/lock.rs"));
    }

    #[test]
    fn configured_extension_is_skipped() {
        let config = FilterConfig {
            skip_patterns: Vec::new(),
            skip_extensions: vec!["snap".into()],
        };
        let filter = DiffFilter::from_config(&config);
        assert!(filter.should_skip("tests/__snapshots__/app.snap"));
        assert!(!filter.should_skip("src/app.rs"));
    }

    #[test]
    fn configured_pattern_is_skipped() {
        let config = FilterConfig {
            skip_patterns: vec!["vendor/**".into(), "*.min.js".into()],
            skip_extensions: Vec::new(),
        };
        let filter = DiffFilter::from_config(&config);
        assert!(filter.should_skip("vendor/jquery/dist.js"));
        assert!(filter.should_skip("bundle.min.js"));
        assert!(!filter.should_skip("src/index.js"));
    }

    #[test]
    fn invalid_pattern_is_ignored() {
        let config = FilterConfig {
            skip_patterns: vec!["[".into()],
            skip_extensions: Vec::new(),
        };
        let filter = DiffFilter::from_config(&config);
        assert!(!filter.should_skip("src/main.rs"));
    }

    #[test]
    fn filter_splits_model_and_keeps_order() {
        let diff = "\
diff --git a/Cargo.lock b/Cargo.lock
--- a/Cargo.lock
+++ b/Cargo.lock
@@ -1 +1,2 @@
 x
+y
diff --git a/src/lib.rs b/src/lib.rs
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -1 +1,2 @@
 a
+b
";
        let model = parse_unified_diff(diff).unwrap();
        let outcome = DiffFilter::default_filter().filter(model);
        assert_eq!(outcome.kept.files.len(), 1);
        assert_eq!(outcome.kept.files[0].path().to_string_lossy(), "src/lib.rs");
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].reason, SkipReason::LockFile);
    }

    #[test]
    fn skip_reason_display() {
        assert_eq!(SkipReason::LockFile.to_string(), "lock file");
        assert_eq!(
            SkipReason::PatternMatch("*.min.js".into()).to_string(),
            "matches pattern *.min.js"
        );
        assert_eq!(
            SkipReason::Extension("snap".into()).to_string(),
            "skipped extension .snap"
        );
    }
}
