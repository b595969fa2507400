use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, ArgGroup, Parser, ValueEnum};
use markdown_sync_config::{default_rules_path, discover_project_root, SyncRuleSet};
use markdown_sync_core::{SyncEngine, SyncOptions};
use markdown_sync_extract::list_sections_from_path;
use markdown_sync_format::{render_analysis, render_json, render_sync, ReportFormat};
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// Exit code for `--strict` runs that found drift or per-target errors.
pub const EXIT_DRIFT: i32 = 2;

/// Entry point for CLI execution. Returns the desired exit code.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let root = match &cli.project_root {
        Some(root) => root.clone(),
        None => {
            let cwd = env::current_dir().context("failed to resolve working directory")?;
            discover_project_root(&cwd)
        }
    };
    tracing::debug!(root = %root.display(), "project root");

    let format: ReportFormat = cli.format.into();

    if let Some(file) = &cli.list_sections {
        return handle_list_sections(file, format);
    }

    // Rules are validated before any markdown file is opened.
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| default_rules_path(&root));
    let rules = SyncRuleSet::load(&config_path)?;
    if let Some(origin) = rules.origin() {
        tracing::debug!(rules = rules.len(), config = %origin.display(), "loaded rules");
    }

    if cli.list_rules {
        return handle_list_rules(&rules, format);
    }

    let engine = SyncEngine::new(root);
    if cli.analyze {
        let report = engine.analyze(rules.rules());
        emit(&render_analysis(&report, format)?)?;
        Ok(exit_code(cli.strict, !report.is_in_sync()))
    } else {
        let options = SyncOptions {
            dry_run: cli.dry_run,
            backup: cli.backup,
        };
        let report = engine.sync(rules.rules(), &options);
        emit(&render_sync(&report, format)?)?;
        Ok(exit_code(cli.strict, report.has_errors()))
    }
}

fn exit_code(strict: bool, problems: bool) -> i32 {
    if strict && problems {
        EXIT_DRIFT
    } else {
        0
    }
}

fn handle_list_sections(file: &Path, format: ReportFormat) -> Result<i32> {
    let headings = list_sections_from_path(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    let rendered = match format {
        ReportFormat::Json => {
            let entries: Vec<_> = headings
                .iter()
                .map(|heading| {
                    json!({
                        "level": heading.level,
                        "title": heading.title,
                        "line_number": heading.line_number(),
                    })
                })
                .collect();
            render_json(&json!({ "file": file.display().to_string(), "sections": entries }))?
        }
        ReportFormat::Text => {
            let mut lines = Vec::with_capacity(headings.len());
            for heading in &headings {
                let indent = "  ".repeat(heading.level.saturating_sub(1));
                lines.push(format!(
                    "{:>5}  {indent}{} {}",
                    heading.line_number(),
                    "#".repeat(heading.level),
                    heading.title
                ));
            }
            lines.join("\n")
        }
    };

    emit(&rendered)?;
    Ok(0)
}

fn handle_list_rules(rules: &SyncRuleSet, format: ReportFormat) -> Result<i32> {
    let rendered = match format {
        ReportFormat::Json => render_json(&json!({ "rules": rules.rules() }))?,
        ReportFormat::Text => {
            let mut lines = Vec::new();
            for rule in rules.iter() {
                lines.push(format!(
                    "{}: {} → {}",
                    rule.id, rule.source_file, rule.source_section
                ));
                for target in &rule.targets {
                    lines.push(format!("  - {} → {}", target.file, target.section));
                }
            }
            lines.join("\n")
        }
    };

    emit(&rendered)?;
    Ok(0)
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Reports go to stdout; diagnostics stay on stderr.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn emit(content: &str) -> Result<()> {
    print!("{}", content);
    if !content.ends_with('\n') {
        println!();
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(
    name = "markdown-sync",
    author,
    version,
    about = "Keep named markdown sections in sync across documents"
)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["analyze", "sync", "list_sections", "list_rules"])
))]
struct Cli {
    /// Report drift between source and target sections without writing
    #[arg(long)]
    analyze: bool,

    /// Rewrite every drifted target section from its source
    #[arg(long)]
    sync: bool,

    /// Print the headings of a markdown file
    #[arg(long = "list-sections", value_name = "FILE")]
    list_sections: Option<PathBuf>,

    /// Print the loaded sync rules
    #[arg(long = "list-rules")]
    list_rules: bool,

    /// Path to the sync rule file (default: <project-root>/config/sync_rules.json)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Project root that rule paths are relative to (default: nearest ancestor holding CLAUDE.md)
    #[arg(long = "project-root", value_name = "PATH")]
    project_root: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = FormatValue::Text)]
    format: FormatValue,

    /// Show what sync would change without writing
    #[arg(long = "dry-run", requires = "sync")]
    dry_run: bool,

    /// Keep a .bak copy of every rewritten target
    #[arg(long, requires = "sync")]
    backup: bool,

    /// Exit with status 2 when analyze finds drift or sync records errors
    #[arg(long)]
    strict: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatValue {
    Text,
    Json,
}

impl From<FormatValue> for ReportFormat {
    fn from(value: FormatValue) -> Self {
        match value {
            FormatValue::Text => ReportFormat::Text,
            FormatValue::Json => ReportFormat::Json,
        }
    }
}
