use similar::TextDiff;

/// Unified diff between the current and rewritten document, labelled with
/// the project-relative path. `None` when nothing would change.
pub fn section_diff(current: &str, rewritten: &str, label: &str) -> Option<String> {
    if current == rewritten {
        return None;
    }

    let diff = TextDiff::from_lines(current, rewritten);
    let rendered = diff
        .unified_diff()
        .context_radius(2)
        .header(&format!("a/{label}"), &format!("b/{label}"))
        .to_string();
    Some(rendered)
}
