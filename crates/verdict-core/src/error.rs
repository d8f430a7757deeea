use std::path::PathBuf;

/// Errors that can occur across Verdict.
///
/// Each variant wraps a specific error domain. Library crates use this type
/// directly; the binary crate renders it through `miette` at the boundary.
///
/// # Examples
///
/// ```
/// use verdict_core::VerdictError;
///
/// let err = VerdictError::MalformedDiff("no file header found".into());
/// assert!(err.to_string().contains("no file header"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum VerdictError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(
        code(verdict::config),
        help("check the thresholds and penalties in your .verdict.toml")
    )]
    Config(String),

    /// Input is not a well-formed unified diff.
    ///
    /// Fatal to an analysis run: no report is produced for malformed input.
    #[error("malformed diff: {0}")]
    #[diagnostic(
        code(verdict::malformed_diff),
        help("expected unified diff text, e.g. the output of `git diff`")
    )]
    MalformedDiff(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: VerdictError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn config_error_displays_message() {
        let err = VerdictError::Config("bad value".into());
        assert_eq!(err.to_string(), "configuration error: bad value");
    }

    #[test]
    fn malformed_diff_displays_reason() {
        let err = VerdictError::MalformedDiff("hunk tally mismatch".into());
        assert_eq!(err.to_string(), "malformed diff: hunk tally mismatch");
    }

    #[test]
    fn file_not_found_shows_path() {
        let err = VerdictError::FileNotFound(PathBuf::from("/tmp/missing.patch"));
        assert!(err.to_string().contains("/tmp/missing.patch"));
    }
}
