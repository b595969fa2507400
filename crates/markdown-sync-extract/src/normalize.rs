/// Whitespace-insensitive canonical form of a section body.
///
/// Only for equality checks between sections; never write the result to disk.
pub fn normalize_content(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    for line in text.trim().split('\n').map(str::trim) {
        if line.is_empty() {
            continue;
        }
        if !normalized.is_empty() {
            normalized.push('\n');
        }
        normalized.push_str(line);
    }
    normalized
}

/// True when two bodies differ only in whitespace and blank lines.
pub fn content_matches(left: &str, right: &str) -> bool {
    normalize_content(left) == normalize_content(right)
}
