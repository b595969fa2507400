//! Fence-aware section extraction for markdown documents.
//!
//! A section starts at the first ATX heading whose title matches the request
//! (case-insensitively) and runs until the next heading of the same or a
//! shallower level, or the end of the document. Lines inside fenced code
//! blocks never count as headings, so they neither open nor close a section.

mod fence;
mod heading;
mod line;
mod normalize;

pub use fence::{has_unclosed_fence, is_fence_delimiter, FenceTracker};
pub use heading::{detect_heading, titles_match, Heading};
pub use line::{is_blank, join_lines, split_lines};
pub use normalize::{content_matches, normalize_content};

use std::io;
use std::path::Path;

/// Line coordinates of a located section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionBounds {
    pub heading: Heading,
    /// Exclusive end: index of the closing heading, or the line count.
    pub end_line: usize,
}

impl SectionBounds {
    pub fn heading_line(&self) -> usize {
        self.heading.line_index
    }

    pub fn level(&self) -> usize {
        self.heading.level
    }

    /// Indices of the lines strictly between the heading and the end.
    pub fn body_range(&self) -> std::ops::Range<usize> {
        self.heading.line_index + 1..self.end_line
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub level: usize,
    pub start_line: usize,
    pub end_line: usize,
    /// Interior text with fully blank leading and trailing lines removed.
    pub body: String,
}

/// Every heading outside fenced code, in document order.
pub fn scan_headings(content: &str) -> Vec<Heading> {
    let mut fences = FenceTracker::default();
    let mut headings = Vec::new();

    for (idx, line) in split_lines(content).into_iter().enumerate() {
        if fences.process(line) {
            continue;
        }
        if let Some(heading) = detect_heading(line, idx) {
            headings.push(heading);
        }
    }

    headings
}

/// Alias of [`scan_headings`] kept for callers enumerating a document's outline.
pub fn list_sections(content: &str) -> Vec<Heading> {
    scan_headings(content)
}

pub fn list_sections_from_path(path: &Path) -> io::Result<Vec<Heading>> {
    let content = std::fs::read_to_string(path)?;
    Ok(list_sections(&content))
}

/// Find the first section titled `title`. Later duplicates are ignored.
pub fn locate_section(content: &str, title: &str) -> Option<SectionBounds> {
    let headings = scan_headings(content);
    let position = headings
        .iter()
        .position(|heading| heading.matches_title(title))?;
    let heading = headings[position].clone();

    let duplicates = headings[position + 1..]
        .iter()
        .filter(|other| other.matches_title(title))
        .count();
    if duplicates > 0 {
        tracing::debug!(
            title,
            duplicates,
            line = heading.line_number(),
            "multiple headings share this title; using the first"
        );
    }

    let end_line = headings[position + 1..]
        .iter()
        .find(|next| next.level <= heading.level)
        .map(|next| next.line_index)
        .unwrap_or_else(|| split_lines(content).len());

    Some(SectionBounds { heading, end_line })
}

pub fn extract_section(content: &str, title: &str) -> Option<Section> {
    let bounds = locate_section(content, title)?;
    let lines = split_lines(content);
    let body = trim_blank_edges(&lines[bounds.body_range()]);

    Some(Section {
        title: bounds.heading.title.clone(),
        level: bounds.level(),
        start_line: bounds.heading_line(),
        end_line: bounds.end_line,
        body: join_lines(body),
    })
}

/// Read `path` and extract the section; `Ok(None)` when the title is absent.
pub fn extract_section_from_path(path: &Path, title: &str) -> io::Result<Option<Section>> {
    let content = std::fs::read_to_string(path)?;
    Ok(extract_section(&content, title))
}

fn trim_blank_edges<'a, 'b>(lines: &'a [&'b str]) -> &'a [&'b str] {
    let start = lines
        .iter()
        .position(|line| !is_blank(line))
        .unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|line| !is_blank(line))
        .map(|idx| idx + 1)
        .unwrap_or(start);
    &lines[start..end.max(start)]
}
