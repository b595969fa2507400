use std::fs;

use markdown_sync_core::{
    ErrorKind, RuleStatus, SkipReason, Summary, SyncEngine, SyncOptions, TargetStatus,
};
use markdown_sync_test_support::{rule, Project};
use pretty_assertions::assert_eq;

fn failure(rule: &str, target: Option<&str>, kind: ErrorKind) -> (String, Option<String>, ErrorKind) {
    (rule.to_string(), target.map(str::to_string), kind)
}

const SOURCE: &str = "# Project\n\n## Install\n\nRun `make install`.\n\nThen restart.\n\n## Usage\n\nRun it.\n";

#[test]
fn analyze_ignores_trailing_whitespace_drift() {
    let project = Project::new();
    project.write("docs/A.md", SOURCE);
    project.write(
        "docs/B.md",
        "# Other\n\n## Install\n\nRun `make install`.   \n\n\nThen restart.\t\n",
    );

    let rules = vec![rule("install", ("docs/A.md", "Install"), &[("docs/B.md", "Install")])];
    let report = SyncEngine::new(project.root()).analyze(&rules);

    assert_eq!(report.rules.len(), 1);
    let analysis = &report.rules[0];
    assert_eq!(analysis.status, RuleStatus::Ok);
    assert_eq!(analysis.targets[0].status, TargetStatus::Ok);
    assert!(!analysis.targets[0].needs_update);
    assert!(report.is_in_sync());
}

#[test]
fn analyze_classifies_missing_and_outdated_targets() {
    let project = Project::new();
    project.write("A.md", SOURCE);
    project.write("outdated.md", "## Install\n\nOld instructions.\n");
    project.write("nosection.md", "## Something Else\n");

    let rules = vec![rule(
        "install",
        ("A.md", "install"),
        &[
            ("outdated.md", "Install"),
            ("nosection.md", "Install"),
            ("absent.md", "Install"),
        ],
    )];
    let report = SyncEngine::new(project.root()).analyze(&rules);

    let statuses: Vec<TargetStatus> = report.rules[0].targets.iter().map(|t| t.status).collect();
    assert_eq!(
        statuses,
        vec![TargetStatus::Outdated, TargetStatus::Missing, TargetStatus::Missing]
    );
    assert_eq!(report.rules[0].status, RuleStatus::NeedsSync);
    assert_eq!(
        report.rules[0].targets[0].content.as_deref(),
        Some("Old instructions.")
    );
    assert!(!report.rules[0].targets[1].exists);
    assert_eq!(
        report.summary,
        Summary {
            total: 1,
            ok: 0,
            outdated: 1,
            missing: 0,
        }
    );
}

#[test]
fn analyze_source_missing_counts_once_and_skips_targets() {
    let project = Project::new();
    project.write("A.md", "# Project\n\n## Usage\n\nRun it.\n");
    project.write("B.md", "## Install\n\nx\n");

    let rules = vec![rule(
        "install",
        ("A.md", "Install"),
        &[("B.md", "Install"), ("C.md", "Install"), ("D.md", "Install")],
    )];
    let report = SyncEngine::new(project.root()).analyze(&rules);

    let analysis = &report.rules[0];
    assert_eq!(analysis.status, RuleStatus::SourceMissing);
    assert!(!analysis.source.exists);
    assert!(analysis.source.content.is_none());
    assert!(analysis.targets.is_empty());
    assert_eq!(report.summary.missing, 1);
    assert_eq!(report.summary.total, 1);
}

#[test]
fn analyze_summary_counts_rules_not_targets() {
    let project = Project::new();
    project.write("A.md", SOURCE);
    project.write("synced.md", "## Install\n\nRun `make install`.\n\nThen restart.\n");
    project.write("stale.md", "## Install\n\nstale\n");

    let rules = vec![
        rule("ok", ("A.md", "Install"), &[("synced.md", "Install")]),
        rule(
            "drift",
            ("A.md", "Install"),
            &[("stale.md", "Install"), ("absent.md", "Install")],
        ),
        rule("nosource", ("A.md", "Missing"), &[("synced.md", "Install")]),
        rule("empty", ("A.md", "Usage"), &[]),
    ];
    let report = SyncEngine::new(project.root()).analyze(&rules);

    let ids: Vec<&str> = report.rules.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["ok", "drift", "nosource", "empty"]);
    assert_eq!(
        report.summary,
        Summary {
            total: 4,
            ok: 2,
            outdated: 1,
            missing: 1,
        }
    );
    assert!(!report.is_in_sync());
}

#[test]
fn sync_leaves_in_sync_target_untouched() {
    let project = Project::new();
    project.write("A.md", SOURCE);
    let target = project.write(
        "B.md",
        "# B\n\n\n## Install\n\n  Run `make install`.\n\nThen restart.\n\n\n",
    );
    let before = fs::read(&target).unwrap();
    let modified_before = fs::metadata(&target).unwrap().modified().unwrap();

    let rules = vec![rule("install", ("A.md", "Install"), &[("B.md", "Install")])];
    let report = SyncEngine::new(project.root()).sync(&rules, &SyncOptions::default());

    assert!(report.updated.is_empty());
    assert!(report.errors.is_empty());
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].reason, SkipReason::AlreadyInSync);
    assert_eq!(report.skipped[0].section, "Install");
    assert_eq!(fs::read(&target).unwrap(), before);
    assert_eq!(
        fs::metadata(&target).unwrap().modified().unwrap(),
        modified_before
    );
}

#[test]
fn sync_rewrites_outdated_target_section_only() {
    let project = Project::new();
    project.write("A.md", SOURCE);
    project.write(
        "docs/B.md",
        "# Guide\n\n## Install\n\nOld text.\n\n```\n## Not a boundary\n```\n\n## Usage\n\nKeep me.\n",
    );

    let rules = vec![rule("install", ("A.md", "Install"), &[("docs/B.md", "install")])];
    let engine = SyncEngine::new(project.root());
    let report = engine.sync(&rules, &SyncOptions::default());

    assert_eq!(report.updated.len(), 1);
    assert_eq!(report.updated[0].target, "docs/B.md");
    assert!(report.updated[0].diff.is_none());
    assert_eq!(
        project.read("docs/B.md"),
        "# Guide\n\n## Install\n\nRun `make install`.\n\nThen restart.\n\n## Usage\n\nKeep me.\n"
    );

    let second = engine.sync(&rules, &SyncOptions::default());
    assert!(second.updated.is_empty());
    assert_eq!(second.skipped.len(), 1);

    let analysis = engine.analyze(&rules);
    assert!(analysis.is_in_sync());
}

#[test]
fn sync_records_errors_and_continues_with_siblings() {
    let project = Project::new();
    project.write("A.md", SOURCE);
    project.write("nosection.md", "# Nothing here\n");
    project.write("good.md", "## Install\n\nstale\n");

    let rules = vec![
        rule("missing-source", ("A.md", "Absent"), &[("good.md", "Install")]),
        rule(
            "install",
            ("A.md", "Install"),
            &[
                ("absent.md", "Install"),
                ("nosection.md", "Install"),
                ("good.md", "Install"),
            ],
        ),
    ];
    let report = SyncEngine::new(project.root()).sync(&rules, &SyncOptions::default());

    let kinds: Vec<(String, Option<String>, ErrorKind)> = report
        .errors
        .iter()
        .map(|e| (e.rule.clone(), e.target.clone(), e.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            failure("missing-source", None, ErrorKind::SourceMissing),
            failure("install", Some("absent.md"), ErrorKind::TargetFileMissing),
            failure("install", Some("nosection.md"), ErrorKind::TargetSectionNotFound),
        ]
    );
    assert!(report.errors[0].error.contains("'Absent'"));
    assert_eq!(report.updated.len(), 1);
    assert_eq!(report.updated[0].target, "good.md");
    assert!(report.has_errors());

    // The writer never creates sections during sync.
    assert_eq!(project.read("nosection.md"), "# Nothing here\n");
    assert!(!project.path("absent.md").exists());
}

#[test]
fn dry_run_reports_diff_without_writing() {
    let project = Project::new();
    project.write("A.md", SOURCE);
    let original = "## Install\n\nstale\n";
    project.write("B.md", original);

    let rules = vec![rule("install", ("A.md", "Install"), &[("B.md", "Install")])];
    let options = SyncOptions {
        dry_run: true,
        backup: false,
    };
    let report = SyncEngine::new(project.root()).sync(&rules, &options);

    assert!(report.dry_run);
    assert_eq!(report.updated.len(), 1);
    let diff = report.updated[0].diff.as_deref().expect("dry run diff");
    assert!(diff.contains("-stale"));
    assert!(diff.contains("+Run `make install`."));
    assert_eq!(project.read("B.md"), original);
}

#[test]
fn backup_keeps_previous_target_content() {
    let project = Project::new();
    project.write("A.md", SOURCE);
    project.write("B.md", "## Install\n\nstale\n");

    let rules = vec![rule("install", ("A.md", "Install"), &[("B.md", "Install")])];
    let options = SyncOptions {
        dry_run: false,
        backup: true,
    };
    SyncEngine::new(project.root()).sync(&rules, &options);

    assert_eq!(project.read("B.md.bak"), "## Install\n\nstale\n");
    assert!(project.read("B.md").contains("Then restart."));
}

#[test]
fn reports_serialize_with_snake_case_statuses() {
    let project = Project::new();
    project.write("A.md", SOURCE);

    let rules = vec![rule("install", ("A.md", "Absent"), &[("B.md", "Install")])];
    let engine = SyncEngine::new(project.root());

    let analysis = serde_json::to_value(engine.analyze(&rules)).unwrap();
    assert_eq!(analysis["rules"][0]["status"], "source_missing");
    assert_eq!(analysis["summary"]["missing"], 1);

    let sync = serde_json::to_value(engine.sync(&rules, &SyncOptions::default())).unwrap();
    assert_eq!(sync["errors"][0]["kind"], "source_missing");
    assert!(sync["errors"][0].get("target").is_none());
    assert_eq!(sync["updated"], serde_json::json!([]));
}

#[test]
fn source_with_unclosed_fence_is_never_written() {
    let project = Project::new();
    project.write("A.md", "# A\n\n## Install\n\n```sh\nrun\n\n## Next\n");
    let original = "# B\n\n## Install\n\nold\n\n## Usage\n\nkeep\n";
    project.write("B.md", original);

    let rules = vec![rule("install", ("A.md", "Install"), &[("B.md", "Install")])];
    let engine = SyncEngine::new(project.root());

    for _ in 0..2 {
        let report = engine.sync(&rules, &SyncOptions::default());
        assert!(report.updated.is_empty());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, ErrorKind::UnclosedFence);
        assert_eq!(report.errors[0].target, None);
    }
    assert_eq!(project.read("B.md"), original);
}

#[test]
fn analyze_records_unreadable_documents() {
    let project = Project::new();
    project.write("A.md", SOURCE);
    fs::write(project.path("bad-source.md"), b"## Install\n\n\xff\n").unwrap();
    fs::write(project.path("bad-target.md"), b"## Install\n\n\xfe\n").unwrap();

    let rules = vec![
        rule("bad-source", ("bad-source.md", "Install"), &[("A.md", "Install")]),
        rule("bad-target", ("A.md", "Install"), &[("bad-target.md", "Install")]),
    ];
    let report = SyncEngine::new(project.root()).analyze(&rules);

    let source = &report.rules[0].source;
    assert_eq!(report.rules[0].status, RuleStatus::SourceMissing);
    assert!(!source.exists);
    assert!(source.error.as_deref().is_some_and(|e| e.contains("bad-source.md")));

    let target = &report.rules[1].targets[0];
    assert_eq!(target.status, TargetStatus::Missing);
    assert!(target.error.as_deref().is_some_and(|e| e.contains("bad-target.md")));

    let value = serde_json::to_value(&report).unwrap();
    assert!(value["rules"][0]["source"]["error"].is_string());
    assert!(value["rules"][1]["targets"][0]["error"].is_string());
    assert!(value["rules"][1]["source"].get("error").is_none());
}

#[cfg(unix)]
#[test]
fn sync_writes_through_symlinked_target() {
    let project = Project::new();
    project.write("A.md", SOURCE);
    project.write("AGENTS.md", "## Install\n\nold\n");
    std::os::unix::fs::symlink("AGENTS.md", project.path("CLAUDE.md")).unwrap();

    let rules = vec![rule("install", ("A.md", "Install"), &[("CLAUDE.md", "Install")])];
    let report = SyncEngine::new(project.root()).sync(&rules, &SyncOptions::default());

    assert_eq!(report.updated.len(), 1);
    let link = fs::symlink_metadata(project.path("CLAUDE.md")).unwrap();
    assert!(link.file_type().is_symlink());
    assert_eq!(
        project.read("AGENTS.md"),
        "## Install\n\nRun `make install`.\n\nThen restart.\n"
    );
}
