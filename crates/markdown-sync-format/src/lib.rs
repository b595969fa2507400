//! Output formatters for markdown-sync reports.

use markdown_sync_core::{AnalysisReport, RuleStatus, SyncReport, TargetStatus};
use serde::Serialize;

const RULE: &str = "========================================";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

pub fn render_analysis(report: &AnalysisReport, format: ReportFormat) -> serde_json::Result<String> {
    match format {
        ReportFormat::Json => render_json(report),
        ReportFormat::Text => Ok(analysis_text(report)),
    }
}

pub fn render_sync(report: &SyncReport, format: ReportFormat) -> serde_json::Result<String> {
    match format {
        ReportFormat::Json => render_json(report),
        ReportFormat::Text => Ok(sync_text(report)),
    }
}

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

fn analysis_text(report: &AnalysisReport) -> String {
    let summary = &report.summary;
    let mut lines = vec![
        "Documentation analysis".to_string(),
        RULE.to_string(),
        format!("Rules total: {}", summary.total),
        format!("  ✓ In sync:  {}", summary.ok),
        format!("  ⚠ Outdated: {}", summary.outdated),
        format!("  ✗ Missing:  {}", summary.missing),
    ];

    for rule in &report.rules {
        let icon = match rule.status {
            RuleStatus::Ok => "✓",
            RuleStatus::NeedsSync => "⚠",
            RuleStatus::SourceMissing => "✗",
        };
        let missing = if rule.source.exists { "" } else { " (missing)" };
        lines.push(String::new());
        lines.push(format!("{icon} {}", rule.id));
        lines.push(format!(
            "  Source: {} → {}{missing}",
            rule.source.file, rule.source.section
        ));
        if let Some(error) = &rule.source.error {
            lines.push(format!("    error: {error}"));
        }

        for target in &rule.targets {
            let (icon, note) = match target.status {
                TargetStatus::Ok => ("✓", ""),
                TargetStatus::Outdated => ("⚠", " (outdated)"),
                TargetStatus::Missing => ("✗", " (missing)"),
            };
            lines.push(format!(
                "  {icon} Target: {} → {}{note}",
                target.file, target.section
            ));
            if let Some(error) = &target.error {
                lines.push(format!("      error: {error}"));
            }
        }
    }

    finish(lines)
}

fn sync_text(report: &SyncReport) -> String {
    let mut lines = vec!["Documentation sync".to_string(), RULE.to_string()];
    if report.dry_run {
        lines.push("(dry run: no files were written)".to_string());
    }

    if !report.updated.is_empty() {
        let verb = if report.dry_run { "Would update" } else { "Updated" };
        lines.push(String::new());
        lines.push(format!("✓ {verb}:"));
        for item in &report.updated {
            lines.push(format!("  - {}: {}", item.target, item.section));
            if let Some(diff) = &item.diff {
                lines.extend(diff.lines().map(|line| format!("    {line}")));
            }
        }
    }

    if !report.skipped.is_empty() {
        lines.push(String::new());
        lines.push("○ Unchanged:".to_string());
        for item in &report.skipped {
            lines.push(format!("  - {}: {}", item.target, item.section));
        }
    }

    if !report.errors.is_empty() {
        lines.push(String::new());
        lines.push("✗ Errors:".to_string());
        for item in &report.errors {
            let subject = item.target.as_deref().unwrap_or(&item.rule);
            lines.push(format!("  - {subject}: {}", item.error));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Summary: {} updated, {} unchanged, {} errors",
        report.updated.len(),
        report.skipped.len(),
        report.errors.len()
    ));

    finish(lines)
}

fn finish(lines: Vec<String>) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}
