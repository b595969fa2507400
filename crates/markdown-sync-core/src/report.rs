//! Serializable results of analyze and sync runs.

use serde::Serialize;

use crate::error::{ErrorKind, SyncError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStatus {
    SourceMissing,
    Ok,
    NeedsSync,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    Ok,
    Outdated,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceState {
    pub file: String,
    pub section: String,
    pub exists: bool,
    pub content: Option<String>,
    /// Set when the source file exists but could not be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetAnalysis {
    pub file: String,
    pub section: String,
    pub exists: bool,
    pub content: Option<String>,
    pub needs_update: bool,
    pub status: TargetStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleAnalysis {
    pub id: String,
    pub source: SourceState,
    pub targets: Vec<TargetAnalysis>,
    pub status: RuleStatus,
}

/// Per-rule counts; a rule with several drifted targets counts once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub ok: usize,
    pub outdated: usize,
    pub missing: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    pub rules: Vec<RuleAnalysis>,
    pub summary: Summary,
}

impl AnalysisReport {
    pub(crate) fn record(&mut self, rule: RuleAnalysis) {
        self.summary.total += 1;
        match rule.status {
            RuleStatus::SourceMissing => self.summary.missing += 1,
            RuleStatus::Ok => self.summary.ok += 1,
            RuleStatus::NeedsSync => self.summary.outdated += 1,
        }
        self.rules.push(rule);
    }

    /// True when every rule's source exists and every target matches it.
    pub fn is_in_sync(&self) -> bool {
        self.summary.ok == self.summary.total
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdatedTarget {
    pub rule: String,
    pub target: String,
    pub section: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    AlreadyInSync,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedTarget {
    pub rule: String,
    pub target: String,
    pub section: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncFailure {
    pub rule: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub kind: ErrorKind,
    pub error: String,
}

impl SyncFailure {
    pub(crate) fn new(rule: &str, target: Option<&str>, err: &SyncError) -> Self {
        Self {
            rule: rule.to_string(),
            target: target.map(str::to_string),
            kind: err.kind(),
            error: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub dry_run: bool,
    pub updated: Vec<UpdatedTarget>,
    pub skipped: Vec<SkippedTarget>,
    pub errors: Vec<SyncFailure>,
}

impl SyncReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
