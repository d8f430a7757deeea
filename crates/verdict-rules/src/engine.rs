use std::panic::{catch_unwind, AssertUnwindSafe};

use verdict_core::{Finding, Severity, VerdictConfig, VerdictError};
use verdict_diff::parser::{DiffModel, FileChange};

use crate::builtin;

/// An independent heuristic check over a single file's change.
///
/// Rules are stateless: `evaluate` must be pure given its input, reading
/// only the file change and the rule's own fixed configuration. Rules never
/// see each other's output, so registration order affects only the order
/// findings appear, never their content.
pub trait Rule {
    /// Stable identifier attached to every finding this rule produces.
    fn id(&self) -> &'static str;

    /// Inspect one file change and report zero or more findings.
    fn evaluate(&self, file: &FileChange) -> Vec<Finding>;
}

/// Ordered collection of rules, run over every file of a diff model.
///
/// # Examples
///
/// ```
/// use verdict_core::VerdictConfig;
/// use verdict_diff::parser::parse_unified_diff;
/// use verdict_rules::engine::RuleEngine;
///
/// let engine = RuleEngine::with_defaults(&VerdictConfig::default()).unwrap();
/// let diff = concat!(
///     "diff --git a/f.rs b/f.rs\n",
///     "--- a/f.rs\n",
///     "+++ b/f.rs\n",
///     "@@ -1,2 +1,3 @@\n",
///     " fn main() {\n",
///     "+    todo(); // FIXME fill in\n",
///     " }\n",
/// );
/// let model = parse_unified_diff(diff).unwrap();
/// let findings = engine.run(&model);
/// assert_eq!(findings.len(), 1);
/// assert_eq!(findings[0].rule_id, "todo-marker");
/// ```
pub struct RuleEngine {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleEngine {
    /// Create an engine with the built-in rule set, validating the
    /// configuration before any diff is processed.
    ///
    /// # Errors
    ///
    /// Returns [`VerdictError::Config`] for out-of-range thresholds.
    pub fn with_defaults(config: &VerdictConfig) -> Result<Self, VerdictError> {
        config.validate()?;
        Ok(Self {
            rules: builtin::default_rules(config),
        })
    }

    /// Create an engine from an explicit rule list.
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    /// Append a rule; it runs after all previously registered rules.
    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Identifiers of the registered rules, in registration order.
    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Run every rule over every file.
    ///
    /// Findings are ordered by file (diff order), then by rule registration
    /// order within each file. A rule that panics is contained: the fault
    /// becomes a single error-severity finding attributed to that rule, and
    /// evaluation of the remaining rules and files continues.
    pub fn run(&self, model: &DiffModel) -> Vec<Finding> {
        let mut findings = Vec::new();

        for file in &model.files {
            for rule in &self.rules {
                match catch_unwind(AssertUnwindSafe(|| rule.evaluate(file))) {
                    Ok(mut rule_findings) => findings.append(&mut rule_findings),
                    Err(payload) => findings.push(Finding {
                        rule_id: rule.id().into(),
                        severity: Severity::Error,
                        file_path: file.path().to_path_buf(),
                        line: None,
                        message: format!(
                            "rule evaluation failed: {}",
                            panic_message(payload.as_ref())
                        ),
                    }),
                }
            }
        }

        findings
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
