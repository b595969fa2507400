use std::path::{Path, PathBuf};

use markdown_sync_config::{SyncRule, SyncTarget};
use markdown_sync_extract::{content_matches, extract_section, has_unclosed_fence, Section};

use crate::error::{SyncError, SyncResult};
use crate::fs::read_document;
use crate::report::{
    AnalysisReport, RuleAnalysis, RuleStatus, SkipReason, SkippedTarget, SourceState,
    SyncFailure, SyncReport, TargetAnalysis, TargetStatus, UpdatedTarget,
};
use crate::writer::{update_section, WriteOptions};

#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Report what would change without writing any file.
    pub dry_run: bool,
    /// Keep a `.bak` copy of every rewritten target.
    pub backup: bool,
}

/// Runs analyze and sync passes over rules relative to a project root.
///
/// Rules are processed in order and every rule and target is attempted; a
/// failure is recorded in the report and the run moves on.
#[derive(Debug, Clone)]
pub struct SyncEngine {
    root: PathBuf,
}

impl SyncEngine {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn analyze(&self, rules: &[SyncRule]) -> AnalysisReport {
        let mut report = AnalysisReport::default();

        for rule in rules {
            let analysis = self.analyze_rule(rule);
            tracing::info!(rule = %rule.id, status = ?analysis.status, "analyzed rule");
            report.record(analysis);
        }

        report
    }

    fn analyze_rule(&self, rule: &SyncRule) -> RuleAnalysis {
        let source_path = rule.source_path(&self.root);
        let (source, error) = match self.read_section(&source_path, &rule.source_section) {
            Ok(section) => (section, None),
            Err(err) => {
                tracing::warn!(rule = %rule.id, error = %err, "unable to read source");
                (None, Some(err.to_string()))
            }
        };

        let source_state = SourceState {
            file: rule.source_file.clone(),
            section: rule.source_section.clone(),
            exists: source.is_some(),
            content: source.as_ref().map(|section| section.body.clone()),
            error,
        };

        let Some(source) = source else {
            return RuleAnalysis {
                id: rule.id.clone(),
                source: source_state,
                targets: Vec::new(),
                status: RuleStatus::SourceMissing,
            };
        };

        let targets: Vec<TargetAnalysis> = rule
            .targets
            .iter()
            .map(|target| self.analyze_target(rule, target, &source.body))
            .collect();

        let status = if targets.iter().all(|t| t.status == TargetStatus::Ok) {
            RuleStatus::Ok
        } else {
            RuleStatus::NeedsSync
        };

        RuleAnalysis {
            id: rule.id.clone(),
            source: source_state,
            targets,
            status,
        }
    }

    fn analyze_target(&self, rule: &SyncRule, target: &SyncTarget, source: &str) -> TargetAnalysis {
        let path = target.path_under(&self.root);
        let (current, error) = match self.read_section(&path, &target.section) {
            Ok(section) => (section, None),
            Err(err) => {
                tracing::warn!(rule = %rule.id, target = %target.file, error = %err, "unable to read target");
                (None, Some(err.to_string()))
            }
        };

        let status = match &current {
            None => TargetStatus::Missing,
            Some(section) if !content_matches(&section.body, source) => TargetStatus::Outdated,
            Some(_) => TargetStatus::Ok,
        };

        TargetAnalysis {
            file: target.file.clone(),
            section: target.section.clone(),
            exists: current.is_some(),
            content: current.map(|section| section.body),
            needs_update: status != TargetStatus::Ok,
            status,
            error,
        }
    }

    pub fn sync(&self, rules: &[SyncRule], options: &SyncOptions) -> SyncReport {
        let mut report = SyncReport {
            dry_run: options.dry_run,
            ..SyncReport::default()
        };

        for rule in rules {
            let source_path = rule.source_path(&self.root);
            let source = match self.read_section(&source_path, &rule.source_section) {
                Ok(Some(section)) => section,
                Ok(None) => {
                    let err = SyncError::SourceMissing {
                        file: rule.source_file.clone(),
                        section: rule.source_section.clone(),
                    };
                    tracing::warn!(rule = %rule.id, error = %err, "skipping rule");
                    report.errors.push(SyncFailure::new(&rule.id, None, &err));
                    continue;
                }
                Err(err) => {
                    tracing::warn!(rule = %rule.id, error = %err, "skipping rule");
                    report.errors.push(SyncFailure::new(&rule.id, None, &err));
                    continue;
                }
            };

            // An open fence would run past the target section's end once written.
            if has_unclosed_fence(&source.body) {
                let err = SyncError::UnclosedFence {
                    file: rule.source_file.clone(),
                    section: rule.source_section.clone(),
                };
                tracing::warn!(rule = %rule.id, error = %err, "skipping rule");
                report.errors.push(SyncFailure::new(&rule.id, None, &err));
                continue;
            }

            for target in &rule.targets {
                self.sync_target(rule, target, &source.body, options, &mut report);
            }
        }

        report
    }

    fn sync_target(
        &self,
        rule: &SyncRule,
        target: &SyncTarget,
        source: &str,
        options: &SyncOptions,
        report: &mut SyncReport,
    ) {
        let path = target.path_under(&self.root);
        let record_error = |report: &mut SyncReport, err: SyncError| {
            tracing::warn!(rule = %rule.id, target = %target.file, error = %err, "target not synced");
            report
                .errors
                .push(SyncFailure::new(&rule.id, Some(target.file.as_str()), &err));
        };

        let document = match read_document(&path) {
            Ok(Some(document)) => document,
            Ok(None) => {
                let err = SyncError::TargetFileMissing {
                    file: target.file.clone(),
                };
                return record_error(report, err);
            }
            Err(err) => return record_error(report, err),
        };

        if let Some(current) = extract_section(&document, &target.section) {
            if content_matches(&current.body, source) {
                tracing::debug!(rule = %rule.id, target = %target.file, "already in sync");
                report.skipped.push(SkippedTarget {
                    rule: rule.id.clone(),
                    target: target.file.clone(),
                    section: target.section.clone(),
                    reason: SkipReason::AlreadyInSync,
                });
                return;
            }
        }

        let write_options = WriteOptions {
            create_if_missing: false,
            dry_run: options.dry_run,
            backup: options.backup,
        };

        match update_section(&path, &target.section, source, &write_options) {
            Ok(outcome) if outcome.found => {
                tracing::info!(rule = %rule.id, target = %target.file, dry_run = options.dry_run, "target updated");
                report.updated.push(UpdatedTarget {
                    rule: rule.id.clone(),
                    target: target.file.clone(),
                    section: target.section.clone(),
                    diff: options
                        .dry_run
                        .then(|| outcome.diff(&target.file))
                        .flatten(),
                });
            }
            Ok(_) => record_error(
                report,
                SyncError::TargetSectionNotFound {
                    file: target.file.clone(),
                    section: target.section.clone(),
                },
            ),
            Err(err) => record_error(report, err),
        }
    }

    /// Extract `section` from the file at `path`; a missing file reads as a
    /// missing section.
    fn read_section(&self, path: &Path, section: &str) -> SyncResult<Option<Section>> {
        let Some(document) = read_document(path)? else {
            return Ok(None);
        };
        Ok(extract_section(&document, section))
    }
}
