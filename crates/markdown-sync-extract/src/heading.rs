use std::sync::OnceLock;

use regex::Regex;

/// ATX heading found outside fenced code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: usize,
    pub title: String,
    /// Zero-based index of the heading line within the document.
    pub line_index: usize,
}

impl Heading {
    /// One-based line number, as editors display it.
    pub fn line_number(&self) -> usize {
        self.line_index + 1
    }

    /// Case-insensitive exact comparison against a requested section title.
    pub fn matches_title(&self, title: &str) -> bool {
        titles_match(&self.title, title)
    }
}

fn heading_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("heading pattern is valid"))
}

/// Parse `line` as an ATX heading. Fence state is the caller's concern.
pub fn detect_heading(line: &str, line_index: usize) -> Option<Heading> {
    let captures = heading_pattern().captures(line)?;
    let level = captures.get(1)?.as_str().len();
    let title = captures.get(2)?.as_str().trim().to_string();

    Some(Heading {
        level,
        title,
        line_index,
    })
}

pub fn titles_match(candidate: &str, wanted: &str) -> bool {
    candidate.to_lowercase() == wanted.to_lowercase()
}
