//! Shared test harness utilities for markdown-sync crates.

use std::fs;
use std::path::{Path, PathBuf};

use markdown_sync_config::{SyncRule, SyncTarget};
use tempfile::TempDir;

/// Scratch project root with helpers for laying out documents and rules.
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("tempdir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write `contents` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directory");
        }
        fs::write(&path, contents).expect("write file");
        path
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).expect("read file")
    }

    /// Serialize `rules` into a rule file at `relative`.
    pub fn write_rules(&self, relative: &str, rules: &[SyncRule]) -> PathBuf {
        let document = serde_json::json!({ "rules": rules });
        let rendered = serde_json::to_string_pretty(&document).expect("serialize rules");
        self.write(relative, &rendered)
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a rule from `(file, section)` pairs.
pub fn rule(id: &str, source: (&str, &str), targets: &[(&str, &str)]) -> SyncRule {
    SyncRule {
        id: id.to_string(),
        source_file: source.0.to_string(),
        source_section: source.1.to_string(),
        targets: targets
            .iter()
            .map(|(file, section)| SyncTarget {
                file: file.to_string(),
                section: section.to_string(),
            })
            .collect(),
    }
}
