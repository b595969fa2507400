//! Section rewriting.
//!
//! The writer locates sections with the same fence-aware scan the extractor
//! uses, so a heading lookalike inside a code block can neither start nor end
//! the region being replaced. The new document is assembled entirely in memory
//! before anything touches the disk.

use std::path::Path;

use markdown_sync_extract::{
    has_unclosed_fence, is_blank, join_lines, locate_section, split_lines,
};

use crate::diff::section_diff;
use crate::error::{SyncError, SyncResult};
use crate::fs::{read_document, write_atomic};

/// Heading level used for sections appended by `create_if_missing`.
const CREATED_SECTION_LEVEL: usize = 2;

#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Append a new section when the title is absent instead of failing.
    pub create_if_missing: bool,
    /// Compute the rewrite without writing it.
    pub dry_run: bool,
    /// Copy the original to `<file>.bak` before overwriting.
    pub backup: bool,
}

#[derive(Debug, Clone)]
pub struct WriteOutcome {
    /// False when the file or the section was missing and nothing was written.
    pub found: bool,
    /// True when the rewritten text differs from what was on disk.
    pub changed: bool,
    pub original: String,
    pub rewritten: String,
}

impl WriteOutcome {
    fn not_found(original: String) -> Self {
        Self {
            found: false,
            changed: false,
            rewritten: original.clone(),
            original,
        }
    }

    pub fn diff(&self, label: &str) -> Option<String> {
        section_diff(&self.original, &self.rewritten, label)
    }
}

/// Replace the body of the section titled `title` with `body`.
///
/// The lines strictly between the heading and the section end become a blank
/// line, the body, and another blank line. Runs of blank lines anywhere in the
/// document are then collapsed to one and the result ends in exactly one
/// newline, which makes repeated rewrites with the same body stable.
///
/// Returns `None` when the title is absent and `create_if_missing` is false;
/// otherwise a missing title appends a new level-2 section at the end.
pub fn rewrite_section(
    content: &str,
    title: &str,
    body: &str,
    create_if_missing: bool,
) -> Option<String> {
    let lines = split_lines(content);
    let body_lines = split_lines(body);

    let rebuilt: Vec<&str> = match locate_section(content, title) {
        Some(bounds) => {
            let mut rebuilt = Vec::with_capacity(lines.len() + body_lines.len() + 2);
            rebuilt.extend_from_slice(&lines[..=bounds.heading_line()]);
            rebuilt.push("");
            rebuilt.extend_from_slice(&body_lines);
            rebuilt.push("");
            rebuilt.extend_from_slice(&lines[bounds.end_line..]);
            rebuilt
        }
        None if create_if_missing => {
            let heading = format!("{} {title}", "#".repeat(CREATED_SECTION_LEVEL));
            let mut rebuilt: Vec<&str> = lines.clone();
            rebuilt.push("");
            rebuilt.push(&heading);
            rebuilt.push("");
            rebuilt.extend_from_slice(&body_lines);
            rebuilt.push("");
            return Some(finish_document(&rebuilt));
        }
        None => return None,
    };

    Some(finish_document(&rebuilt))
}

/// Collapse blank-line runs and guarantee a single trailing newline.
fn finish_document(lines: &[&str]) -> String {
    let mut cleaned: Vec<&str> = Vec::with_capacity(lines.len());
    let mut previous_blank = false;
    for &line in lines {
        let blank = is_blank(line);
        if blank && previous_blank {
            continue;
        }
        cleaned.push(line);
        previous_blank = blank;
    }

    while cleaned.last().is_some_and(|line| is_blank(line)) {
        cleaned.pop();
    }

    let mut output = join_lines(&cleaned);
    output.push('\n');
    output
}

/// Rewrite the section in the file at `path`.
///
/// A missing file or section yields `found == false` and leaves the disk
/// untouched. An unchanged rewrite is not written either. A body that leaves
/// a code fence open is rejected with [`SyncError::UnclosedFence`] before the
/// file is read.
pub fn update_section(
    path: &Path,
    title: &str,
    body: &str,
    options: &WriteOptions,
) -> SyncResult<WriteOutcome> {
    if has_unclosed_fence(body) {
        return Err(SyncError::UnclosedFence {
            file: path.display().to_string(),
            section: title.to_string(),
        });
    }

    let Some(document) = read_document(path)? else {
        tracing::debug!(path = %path.display(), "write target does not exist");
        return Ok(WriteOutcome::not_found(String::new()));
    };

    let Some(rewritten) = rewrite_section(&document, title, body, options.create_if_missing)
    else {
        tracing::debug!(path = %path.display(), section = title, "section not found");
        return Ok(WriteOutcome::not_found(document));
    };

    let changed = rewritten != document;
    if changed && !options.dry_run {
        write_atomic(path, &rewritten, options.backup)?;
        tracing::debug!(path = %path.display(), section = title, "section rewritten");
    }

    Ok(WriteOutcome {
        found: true,
        changed,
        original: document,
        rewritten,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn replaces_body_between_headings() {
        let doc = "# Doc\n\n## Install\n\nold line\n\n## Usage\n\nuse it\n";
        let result = rewrite_section(doc, "install", "new line", false).unwrap();
        assert_eq!(
            result,
            "# Doc\n\n## Install\n\nnew line\n\n## Usage\n\nuse it\n"
        );
    }

    #[test]
    fn missing_section_without_create_is_none() {
        assert!(rewrite_section("# Doc\n", "Absent", "x", false).is_none());
    }

    #[test]
    fn create_appends_level_two_section() {
        let result = rewrite_section("# Doc\n\nIntro\n", "New Part", "body", true).unwrap();
        assert_eq!(result, "# Doc\n\nIntro\n\n## New Part\n\nbody\n");
    }

    #[test]
    fn collapses_blank_runs_and_trailing_newlines() {
        let doc = "# Doc\n\n\n\nIntro\n\n## A\nx\n\n\n";
        let result = rewrite_section(doc, "A", "y\n\n\n", false).unwrap();
        assert_eq!(result, "# Doc\n\nIntro\n\n## A\n\ny\n");
    }

    #[test]
    fn rewrite_is_idempotent() {
        let doc = "# Doc\n\n## A\n\nold\n\n## B\n\nkeep\n";
        let once = rewrite_section(doc, "A", "first\n\nsecond", false).unwrap();
        let twice = rewrite_section(&once, "A", "first\n\nsecond", false).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn fenced_heading_lookalike_does_not_end_section() {
        let doc = "## A\n\n```\n## B\n```\n\n## C\n\nc body\n";
        let result = rewrite_section(doc, "A", "replaced", false).unwrap();
        assert_eq!(result, "## A\n\nreplaced\n\n## C\n\nc body\n");
    }

    #[test]
    fn fenced_title_is_never_the_write_target() {
        let doc = "# Doc\n\n```\n## Install\n```\n";
        assert!(rewrite_section(doc, "Install", "x", false).is_none());
    }
}
