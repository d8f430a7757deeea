use verdict_core::{FileScore, Finding, PenaltyConfig, ScoreResult};
use verdict_diff::parser::DiffModel;

/// Reduce a finding set into per-file and overall scores.
///
/// Per file: start from 100, subtract the configured penalty per finding
/// scoped to that file, clamp at 0. The overall score is the mean of
/// per-file scores weighted by each file's changed-line count
/// (added + removed), so large changes influence it proportionally more
/// than trivial ones. Zero files yields an overall of 100 by convention.
///
/// Identical `(model, findings)` always yields an identical result: no
/// randomness, no external state.
///
/// # Examples
///
/// ```
/// use verdict_core::PenaltyConfig;
/// use verdict_diff::parser::parse_unified_diff;
/// use verdict_report::score::aggregate;
///
/// let diff = concat!(
///     "diff --git a/f.rs b/f.rs\n",
///     "--- a/f.rs\n",
///     "+++ b/f.rs\n",
///     "@@ -1,2 +1,3 @@\n",
///     " line\n",
///     "+new\n",
///     " end\n",
/// );
/// let model = parse_unified_diff(diff).unwrap();
/// let result = aggregate(&model, &[], &PenaltyConfig::default());
/// assert_eq!(result.overall, 100.0);
/// ```
pub fn aggregate(model: &DiffModel, findings: &[Finding], penalties: &PenaltyConfig) -> ScoreResult {
    let mut per_file = Vec::with_capacity(model.files.len());

    for file in &model.files {
        let path = file.path();
        let penalty: u32 = findings
            .iter()
            .filter(|f| f.file_path == path)
            .map(|f| penalties.for_severity(f.severity))
            .sum();
        let score = f64::from(100u32.saturating_sub(penalty));

        per_file.push(FileScore {
            path: path.to_path_buf(),
            score,
            lines_added: file.lines_added(),
            lines_removed: file.lines_removed(),
        });
    }

    let overall = overall_score(&per_file).clamp(0.0, 100.0);

    ScoreResult { per_file, overall }
}

fn overall_score(per_file: &[FileScore]) -> f64 {
    if per_file.is_empty() {
        return 100.0;
    }

    let total_weight: u32 = per_file
        .iter()
        .map(|f| f.lines_added + f.lines_removed)
        .sum();

    if total_weight == 0 {
        // Pure renames / binary-only diffs carry no line weight; fall back
        // to the unweighted mean so those files still count.
        let sum: f64 = per_file.iter().map(|f| f.score).sum();
        return sum / per_file.len() as f64;
    }

    let weighted_sum: f64 = per_file
        .iter()
        .map(|f| f.score * f64::from(f.lines_added + f.lines_removed))
        .sum();
    weighted_sum / f64::from(total_weight)
}
