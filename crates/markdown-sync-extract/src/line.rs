/// Split a document into lines on `\n`, keeping any `\r` on the line itself.
///
/// A document ending in a newline yields a trailing empty line, so
/// `join_lines(&split_lines(text)) == text` for every input.
pub fn split_lines(content: &str) -> Vec<&str> {
    content.split('\n').collect()
}

pub fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let mut output = String::new();
    for (idx, line) in lines.iter().enumerate() {
        if idx > 0 {
            output.push('\n');
        }
        output.push_str(line.as_ref());
    }
    output
}

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}
