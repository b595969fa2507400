const FENCE_MARKER: &str = "```";

/// Tracks whether the scan is inside a fenced code block.
///
/// Any line whose trimmed text starts with three backticks toggles the state,
/// whatever follows the marker (language tags, attributes, stray text).
#[derive(Debug, Default)]
pub struct FenceTracker {
    inside: bool,
}

impl FenceTracker {
    /// Feed the next line. Returns `true` when the line is a fence delimiter or
    /// lies inside a fenced block, i.e. when it must not be read as a heading.
    pub fn process(&mut self, line: &str) -> bool {
        if is_fence_delimiter(line) {
            self.inside = !self.inside;
            return true;
        }
        self.inside
    }

    pub fn is_inside(&self) -> bool {
        self.inside
    }
}

pub fn is_fence_delimiter(line: &str) -> bool {
    line.trim().starts_with(FENCE_MARKER)
}

/// True when `text` leaves a fenced block open at its end. Such a body would
/// swallow every later heading once spliced into another document.
pub fn has_unclosed_fence(text: &str) -> bool {
    let mut tracker = FenceTracker::default();
    for line in text.split('\n') {
        tracker.process(line);
    }
    tracker.is_inside()
}
