use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use verdict_core::VerdictError;

/// Classification of a changed file.
///
/// # Examples
///
/// ```
/// use verdict_diff::parser::ChangeKind;
///
/// assert_eq!(format!("{}", ChangeKind::Renamed), "renamed");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// New file.
    Added,
    /// File removed.
    Deleted,
    /// Existing file changed in place.
    Modified,
    /// File moved without content changes.
    Renamed,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Added => write!(f, "added"),
            ChangeKind::Deleted => write!(f, "deleted"),
            ChangeKind::Modified => write!(f, "modified"),
            ChangeKind::Renamed => write!(f, "renamed"),
        }
    }
}

/// Classification of a single diff line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    /// Line present only in the new version.
    Added,
    /// Line present only in the old version.
    Removed,
    /// Line present in both versions.
    Context,
}

/// One line of a hunk, with its position in the old and new file.
///
/// `content` is the line text without the leading marker character and
/// without a trailing newline. Immutable once constructed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffLine {
    /// Added, removed, or context.
    pub kind: LineKind,
    /// Raw line text, marker stripped.
    pub content: String,
    /// Line number in the old version; `None` for added lines.
    pub old_line: Option<u32>,
    /// Line number in the new version; `None` for removed lines.
    pub new_line: Option<u32>,
}

/// A contiguous block of changed lines, bounded by an `@@` range header.
///
/// Invariant (checked at parse time): lines tagged added+context equal
/// `new_count`, removed+context equal `old_count`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hunk {
    /// Starting line in the old version.
    pub old_start: u32,
    /// Number of old-side lines covered by this hunk.
    pub old_count: u32,
    /// Starting line in the new version.
    pub new_start: u32,
    /// Number of new-side lines covered by this hunk.
    pub new_count: u32,
    /// Classified lines in order.
    pub lines: Vec<DiffLine>,
}

/// A complete change to a single file, containing zero or more hunks.
///
/// Renames and binary files carry no hunks.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChange {
    /// Path in the old version (`/dev/null` for new files).
    pub old_path: PathBuf,
    /// Path in the new version (`/dev/null` for deleted files).
    pub new_path: PathBuf,
    /// Classification of the change.
    pub kind: ChangeKind,
    /// Parsed hunks in order.
    pub hunks: Vec<Hunk>,
}

impl FileChange {
    /// The path this change should be reported under: the old path for
    /// deletions, the new path otherwise.
    pub fn path(&self) -> &Path {
        if self.kind == ChangeKind::Deleted {
            &self.old_path
        } else {
            &self.new_path
        }
    }

    /// Count of added lines across all hunks.
    pub fn lines_added(&self) -> u32 {
        self.count_lines(LineKind::Added)
    }

    /// Count of removed lines across all hunks.
    pub fn lines_removed(&self) -> u32 {
        self.count_lines(LineKind::Removed)
    }

    /// Total changed lines (added + removed), the file's weight in the
    /// overall score.
    pub fn changed_lines(&self) -> u32 {
        self.lines_added() + self.lines_removed()
    }

    fn count_lines(&self, kind: LineKind) -> u32 {
        self.hunks
            .iter()
            .flat_map(|h| h.lines.iter())
            .filter(|l| l.kind == kind)
            .count() as u32
    }
}

impl fmt::Display for FileChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} hunks)", self.path().display(), self.hunks.len())
    }
}

/// The structural model of a whole diff: files in diff order.
///
/// A non-empty input diff always yields at least one [`FileChange`];
/// malformed input is a parse failure, never a silently empty model.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffModel {
    /// Changed files in the order they appear in the diff.
    pub files: Vec<FileChange>,
}

impl DiffModel {
    /// Total lines added across all files.
    pub fn total_additions(&self) -> u32 {
        self.files.iter().map(FileChange::lines_added).sum()
    }

    /// Total lines removed across all files.
    pub fn total_deletions(&self) -> u32 {
        self.files.iter().map(FileChange::lines_removed).sum()
    }
}

/// Parse a unified diff string (as produced by `git diff`) into a [`DiffModel`].
///
/// Handles standard unified diff format including new files, deleted files,
/// renamed files, and binary files (kept as hunk-less entries). Parsing is a
/// single left-to-right pass; a failure at any point aborts the whole parse,
/// so no partial model is ever returned.
///
/// # Errors
///
/// Returns [`VerdictError::MalformedDiff`] when the text contains no
/// recognizable file header (including empty input), when a hunk header's
/// range cannot be parsed, or when a hunk's line tally mismatches its
/// declared counts.
///
/// # Examples
///
/// ```
/// use verdict_diff::parser::parse_unified_diff;
///
/// let diff = concat!(
///     "diff --git a/hello.rs b/hello.rs\n",
///     "--- a/hello.rs\n",
///     "+++ b/hello.rs\n",
///     "@@ -1,3 +1,4 @@\n",
///     " fn main() {\n",
///     "+    println!(\"hello\");\n",
///     " fn other() {\n",
///     " }\n",
/// );
/// let model = parse_unified_diff(diff).unwrap();
/// assert_eq!(model.files.len(), 1);
/// assert_eq!(model.files[0].hunks.len(), 1);
/// assert_eq!(model.files[0].lines_added(), 1);
///
/// assert!(parse_unified_diff("").is_err());
/// ```
pub fn parse_unified_diff(input: &str) -> Result<DiffModel, VerdictError> {
    let mut files: Vec<FileChange> = Vec::new();
    let mut current: Option<PendingFile> = None;
    let mut current_hunk: Option<PendingHunk> = None;

    for line in input.lines() {
        // An open hunk consumes lines until its declared counts are met;
        // header detection only resumes after that. This keeps content that
        // happens to look like a header (e.g. a removed line "--- x") from
        // being misread.
        if let Some(hunk) = current_hunk.as_mut() {
            if line == "\\ No newline at end of file" {
                continue;
            }
            hunk.push_line(line)?;
            if hunk.is_complete() {
                let finished = current_hunk.take().expect("open hunk").finish()?;
                current
                    .as_mut()
                    .expect("hunk without file section")
                    .hunks
                    .push(finished);
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("diff --git ") {
            if let Some(file) = current.take() {
                files.push(file.finish());
            }
            let mut pending = PendingFile::default();
            if let Some((old, new)) = parse_git_paths(rest) {
                pending.old_path = old;
                pending.new_path = new;
            }
            current = Some(pending);
            continue;
        }

        // Standard patches may lack the "diff --git" command line; a bare
        // old-path header starts a file section, closing the previous one
        // once it has content.
        if line.starts_with("--- ") {
            let starts_new_section = match current.as_ref() {
                None => true,
                Some(file) => !file.hunks.is_empty() || file.is_binary,
            };
            if starts_new_section {
                if let Some(file) = current.take() {
                    files.push(file.finish());
                }
                current = Some(PendingFile::default());
            }
        }

        let Some(file) = current.as_mut() else {
            continue;
        };

        if (line.starts_with("Binary files ") && line.ends_with(" differ"))
            || line == "GIT binary patch"
        {
            file.is_binary = true;
            continue;
        }

        if line.starts_with("new file mode") {
            file.is_new = true;
            continue;
        }

        if line.starts_with("deleted file mode") {
            file.is_deleted = true;
            continue;
        }

        if let Some(path) = line.strip_prefix("rename from ") {
            file.is_rename = true;
            file.old_path = PathBuf::from(path.trim());
            continue;
        }

        if let Some(path) = line.strip_prefix("rename to ") {
            file.is_rename = true;
            file.new_path = PathBuf::from(path.trim());
            continue;
        }

        if line.starts_with("index ")
            || line.starts_with("similarity index")
            || line.starts_with("dissimilarity index")
            || line.starts_with("old mode")
            || line.starts_with("new mode")
        {
            continue;
        }

        if let Some(path) = line.strip_prefix("--- ") {
            file.old_path = parse_path(path);
            if path == "/dev/null" {
                file.is_new = true;
            }
            continue;
        }

        if let Some(path) = line.strip_prefix("+++ ") {
            file.new_path = parse_path(path);
            if path == "/dev/null" {
                file.is_deleted = true;
            }
            continue;
        }

        if line.starts_with("@@ ") {
            let (old_start, old_count, new_start, new_count) = parse_hunk_header(line)?;
            let hunk = PendingHunk::new(old_start, old_count, new_start, new_count);
            if hunk.is_complete() {
                // Zero-length range on both sides; legal but empty.
                file.hunks.push(hunk.finish()?);
            } else {
                current_hunk = Some(hunk);
            }
            continue;
        }

        // A content-marker line with no open hunk means the previous hunk
        // overran its declared counts.
        if line.starts_with('+') || line.starts_with('-') {
            return Err(VerdictError::MalformedDiff(format!(
                "content line outside any hunk: {line}"
            )));
        }
    }

    if let Some(hunk) = current_hunk {
        return Err(hunk.tally_error());
    }
    if let Some(file) = current.take() {
        files.push(file.finish());
    }

    if files.is_empty() {
        return Err(VerdictError::MalformedDiff(
            "no file header found in input".into(),
        ));
    }

    Ok(DiffModel { files })
}

#[derive(Default)]
struct PendingFile {
    old_path: PathBuf,
    new_path: PathBuf,
    is_new: bool,
    is_deleted: bool,
    is_rename: bool,
    is_binary: bool,
    hunks: Vec<Hunk>,
}

impl PendingFile {
    fn finish(self) -> FileChange {
        let kind = if self.is_binary {
            ChangeKind::Modified
        } else if self.is_new {
            ChangeKind::Added
        } else if self.is_deleted {
            ChangeKind::Deleted
        } else if self.is_rename || (self.hunks.is_empty() && self.is_pure_move()) {
            ChangeKind::Renamed
        } else {
            ChangeKind::Modified
        };

        let hunks = if self.is_binary { Vec::new() } else { self.hunks };

        FileChange {
            old_path: self.old_path,
            new_path: self.new_path,
            kind,
            hunks,
        }
    }

    fn is_pure_move(&self) -> bool {
        !self.old_path.as_os_str().is_empty()
            && !self.new_path.as_os_str().is_empty()
            && self.old_path != self.new_path
    }
}

struct PendingHunk {
    old_start: u32,
    old_count: u32,
    new_start: u32,
    new_count: u32,
    old_cursor: u32,
    new_cursor: u32,
    old_seen: u32,
    new_seen: u32,
    lines: Vec<DiffLine>,
}

impl PendingHunk {
    fn new(old_start: u32, old_count: u32, new_start: u32, new_count: u32) -> Self {
        Self {
            old_start,
            old_count,
            new_start,
            new_count,
            old_cursor: old_start,
            new_cursor: new_start,
            old_seen: 0,
            new_seen: 0,
            // Sized lazily: declared counts are untrusted input.
            lines: Vec::new(),
        }
    }

    fn push_line(&mut self, line: &str) -> Result<(), VerdictError> {
        let (kind, content) = match line.as_bytes().first() {
            Some(b'+') => (LineKind::Added, &line[1..]),
            Some(b'-') => (LineKind::Removed, &line[1..]),
            Some(b' ') => (LineKind::Context, &line[1..]),
            // Some tools strip the single space from blank context lines.
            None => (LineKind::Context, ""),
            Some(_) => return Err(self.tally_error()),
        };

        let (old_line, new_line) = match kind {
            LineKind::Added => {
                self.new_seen += 1;
                let n = self.new_cursor;
                self.new_cursor += 1;
                (None, Some(n))
            }
            LineKind::Removed => {
                self.old_seen += 1;
                let o = self.old_cursor;
                self.old_cursor += 1;
                (Some(o), None)
            }
            LineKind::Context => {
                self.old_seen += 1;
                self.new_seen += 1;
                let (o, n) = (self.old_cursor, self.new_cursor);
                self.old_cursor += 1;
                self.new_cursor += 1;
                (Some(o), Some(n))
            }
        };

        if self.old_seen > self.old_count || self.new_seen > self.new_count {
            return Err(self.tally_error());
        }

        self.lines.push(DiffLine {
            kind,
            content: content.to_string(),
            old_line,
            new_line,
        });
        Ok(())
    }

    fn is_complete(&self) -> bool {
        self.old_seen == self.old_count && self.new_seen == self.new_count
    }

    fn finish(self) -> Result<Hunk, VerdictError> {
        if !self.is_complete() {
            return Err(self.tally_error());
        }
        Ok(Hunk {
            old_start: self.old_start,
            old_count: self.old_count,
            new_start: self.new_start,
            new_count: self.new_count,
            lines: self.lines,
        })
    }

    fn tally_error(&self) -> VerdictError {
        VerdictError::MalformedDiff(format!(
            "hunk line tally mismatch at @@ -{},{} +{},{} @@: saw {} old / {} new lines",
            self.old_start, self.old_count, self.new_start, self.new_count, self.old_seen,
            self.new_seen,
        ))
    }
}

fn parse_path(raw: &str) -> PathBuf {
    let normalized = raw.trim_matches('"');

    if normalized == "/dev/null" {
        return PathBuf::from("/dev/null");
    }

    let stripped = normalized
        .strip_prefix("a/")
        .or_else(|| normalized.strip_prefix("b/"))
        .unwrap_or(normalized);

    PathBuf::from(stripped)
}

/// Best-effort path pair from a `diff --git a/old b/new` command line.
/// Quoted paths with spaces are left for the `---`/`+++` headers.
fn parse_git_paths(rest: &str) -> Option<(PathBuf, PathBuf)> {
    let rest = rest.strip_prefix("a/")?;
    let (old, new) = rest.split_once(" b/")?;
    if old.contains('"') || new.contains('"') {
        return None;
    }
    Some((PathBuf::from(old), PathBuf::from(new)))
}

fn parse_hunk_header(line: &str) -> Result<(u32, u32, u32, u32), VerdictError> {
    let inner = line
        .strip_prefix("@@ ")
        .and_then(|s| {
            let end = s.find(" @@")?;
            Some(&s[..end])
        })
        .ok_or_else(|| VerdictError::MalformedDiff(format!("invalid hunk header: {line}")))?;

    let parts: Vec<&str> = inner.split(' ').collect();
    if parts.len() != 2 {
        return Err(VerdictError::MalformedDiff(format!(
            "invalid hunk header: {line}"
        )));
    }

    let old = parts[0].strip_prefix('-').ok_or_else(|| {
        VerdictError::MalformedDiff(format!("invalid old range in hunk: {line}"))
    })?;
    let new = parts[1].strip_prefix('+').ok_or_else(|| {
        VerdictError::MalformedDiff(format!("invalid new range in hunk: {line}"))
    })?;

    let (old_start, old_count) = parse_range(old, line)?;
    let (new_start, new_count) = parse_range(new, line)?;

    Ok((old_start, old_count, new_start, new_count))
}

fn parse_range(range: &str, context: &str) -> Result<(u32, u32), VerdictError> {
    if let Some((start, count)) = range.split_once(',') {
        let s = start.parse().map_err(|_| {
            VerdictError::MalformedDiff(format!("invalid range number in: {context}"))
        })?;
        let c = count.parse().map_err(|_| {
            VerdictError::MalformedDiff(format!("invalid range count in: {context}"))
        })?;
        Ok((s, c))
    } else {
        let s = range.parse().map_err(|_| {
            VerdictError::MalformedDiff(format!("invalid range number in: {context}"))
        })?;
        Ok((s, 1))
    }
}
