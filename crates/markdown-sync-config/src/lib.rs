//! Sync rule configuration for the markdown-sync toolkit.
//!
//! Rules are read from a JSON document and deserialised eagerly into typed
//! [`SyncRule`] records. Every rule is validated before the caller touches a
//! single markdown file: a missing or blank required field fails the whole
//! load with a [`ConfigError`] that lists every problem found.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File whose presence marks the project root during discovery.
pub const ROOT_SENTINEL: &str = "CLAUDE.md";

/// Rule file location relative to the project root when none is given.
pub const DEFAULT_RULES_PATH: &str = "config/sync_rules.json";

/// A `{file, section}` pair naming one section of one document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SyncTarget {
    /// Path relative to the project root.
    pub file: String,
    pub section: String,
}

impl SyncTarget {
    /// Absolute location of the document under `root`.
    pub fn path_under(&self, root: &Path) -> PathBuf {
        root.join(&self.file)
    }
}

/// One source section propagated into any number of target sections.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncRule {
    pub id: String,
    pub source_file: String,
    pub source_section: String,
    pub targets: Vec<SyncTarget>,
}

impl SyncRule {
    pub fn source_path(&self, root: &Path) -> PathBuf {
        root.join(&self.source_file)
    }
}

impl Serialize for SyncRule {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        RuleRecord {
            id: &self.id,
            source: SourceRecord {
                file: &self.source_file,
                section: &self.source_section,
            },
            targets: &self.targets,
        }
        .serialize(serializer)
    }
}

#[derive(Serialize)]
struct RuleRecord<'a> {
    id: &'a str,
    source: SourceRecord<'a>,
    targets: &'a [SyncTarget],
}

#[derive(Serialize)]
struct SourceRecord<'a> {
    file: &'a str,
    section: &'a str,
}

/// Ordered, immutable collection of validated rules.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncRuleSet {
    rules: Vec<SyncRule>,
    origin: Option<PathBuf>,
}

impl SyncRuleSet {
    /// Read and validate the rule file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound { path: path.into() });
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.into(),
            source,
        })?;

        let mut set = Self::parse(&contents).map_err(|err| err.with_path(path))?;
        set.origin = Some(path.to_path_buf());
        Ok(set)
    }

    /// Parse rules from an in-memory JSON document.
    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        Self::parse(contents)
    }

    fn parse(contents: &str) -> Result<Self, ConfigError> {
        let raw: RawRuleFile =
            serde_json::from_str(contents).map_err(|source| ConfigError::Parse {
                path: None,
                source,
            })?;
        let rules = raw.finalize().map_err(ConfigError::Validation)?;
        Ok(Self {
            rules,
            origin: None,
        })
    }

    pub fn rules(&self) -> &[SyncRule] {
        &self.rules
    }

    pub fn iter(&self) -> impl Iterator<Item = &SyncRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// File the rules were loaded from, if any.
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    pub fn into_rules(self) -> Vec<SyncRule> {
        self.rules
    }
}

/// Shorthand for [`SyncRuleSet::load`] returning the bare rule list.
pub fn load_rules(path: &Path) -> Result<Vec<SyncRule>, ConfigError> {
    SyncRuleSet::load(path).map(SyncRuleSet::into_rules)
}

/// Walk upward from `start` to the first directory holding [`ROOT_SENTINEL`].
/// Falls back to `start` itself when no ancestor qualifies.
pub fn discover_project_root(start: &Path) -> PathBuf {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(ROOT_SENTINEL).exists() {
            return dir.to_path_buf();
        }
        current = dir.parent();
    }
    start.to_path_buf()
}

pub fn default_rules_path(root: &Path) -> PathBuf {
    root.join(DEFAULT_RULES_PATH)
}

/// Errors surfaced while loading sync rules.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("rule config {path} not found")]
    NotFound { path: PathBuf },
    #[error("failed to read rule config {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse rule config{}: {source}", describe_path(.path))]
    Parse {
        path: Option<PathBuf>,
        source: serde_json::Error,
    },
    #[error("rule config validation failed:\n{0}")]
    Validation(ConfigValidationErrors),
}

impl ConfigError {
    fn with_path(self, path: &Path) -> Self {
        match self {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: Some(path.into()),
                source,
            },
            other => other,
        }
    }
}

fn describe_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!(" {}", path.display()),
        None => String::new(),
    }
}

/// Container for validation failures, formatted as a bullet list.
#[derive(Debug)]
pub struct ConfigValidationErrors(pub Vec<ConfigValidationError>);

impl fmt::Display for ConfigValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "- {err}")?;
        }
        Ok(())
    }
}

impl ConfigValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ConfigValidationError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Single validation failure located by its JSON path.
#[derive(Clone, Debug)]
pub struct ConfigValidationError {
    pub context: String,
    pub message: String,
}

impl ConfigValidationError {
    fn new(context: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigValidationError {
            context: context.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.context, self.message)
    }
}

#[derive(Debug, Deserialize)]
struct RawRuleFile {
    #[serde(default)]
    rules: Vec<RawRule>,
}

#[derive(Debug, Default, Deserialize)]
struct RawRule {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    source: Option<RawSection>,
    #[serde(default)]
    targets: Vec<RawSection>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSection {
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    section: Option<String>,
}

impl RawRuleFile {
    fn finalize(self) -> Result<Vec<SyncRule>, ConfigValidationErrors> {
        let mut errors = Vec::new();
        let mut seen_ids = HashSet::new();
        let mut rules = Vec::with_capacity(self.rules.len());

        for (idx, raw) in self.rules.into_iter().enumerate() {
            let context = format!("rules[{idx}]");
            let Some(rule) = raw.finalize(&context, &mut errors) else {
                continue;
            };

            if !seen_ids.insert(rule.id.clone()) {
                errors.push(ConfigValidationError::new(
                    format!("{context}.id"),
                    format!("duplicate rule id '{}'", rule.id),
                ));
                continue;
            }
            rules.push(rule);
        }

        if errors.is_empty() {
            Ok(rules)
        } else {
            Err(ConfigValidationErrors(errors))
        }
    }
}

impl RawRule {
    fn finalize(
        self,
        context: &str,
        errors: &mut Vec<ConfigValidationError>,
    ) -> Option<SyncRule> {
        let before = errors.len();

        let id = required(self.id, &format!("{context}.id"), errors);

        let (source_file, source_section) = match self.source {
            Some(source) => (
                required(source.file, &format!("{context}.source.file"), errors),
                required(source.section, &format!("{context}.source.section"), errors),
            ),
            None => {
                errors.push(ConfigValidationError::new(
                    format!("{context}.source"),
                    "missing required field",
                ));
                (None, None)
            }
        };

        let mut targets = Vec::with_capacity(self.targets.len());
        for (idx, target) in self.targets.into_iter().enumerate() {
            let target_context = format!("{context}.targets[{idx}]");
            let file = required(target.file, &format!("{target_context}.file"), errors);
            let section = required(target.section, &format!("{target_context}.section"), errors);
            if let (Some(file), Some(section)) = (file, section) {
                targets.push(SyncTarget { file, section });
            }
        }

        if errors.len() > before {
            return None;
        }

        Some(SyncRule {
            id: id?,
            source_file: source_file?,
            source_section: source_section?,
            targets,
        })
    }
}

fn required(
    value: Option<String>,
    context: &str,
    errors: &mut Vec<ConfigValidationError>,
) -> Option<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Some(value),
        Some(_) => {
            errors.push(ConfigValidationError::new(context, "must not be empty"));
            None
        }
        None => {
            errors.push(ConfigValidationError::new(context, "missing required field"));
            None
        }
    }
}
