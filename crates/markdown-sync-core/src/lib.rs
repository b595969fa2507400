pub mod diff;
pub mod engine;
pub mod error;
pub mod fs;
pub mod report;
pub mod writer;

pub use engine::{SyncEngine, SyncOptions};
pub use error::{ErrorKind, SyncError, SyncResult};
pub use markdown_sync_config::{SyncRule, SyncRuleSet, SyncTarget};
pub use markdown_sync_extract::{normalize_content, Heading, Section};
pub use report::{
    AnalysisReport, RuleAnalysis, RuleStatus, SkipReason, SkippedTarget, SourceState, Summary,
    SyncFailure, SyncReport, TargetAnalysis, TargetStatus, UpdatedTarget,
};
pub use writer::{rewrite_section, update_section, WriteOptions, WriteOutcome};
