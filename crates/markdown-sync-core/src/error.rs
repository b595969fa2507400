use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Failure classes recorded against a rule or target during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    SourceMissing,
    TargetFileMissing,
    TargetSectionNotFound,
    UnclosedFence,
    Io,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("source section '{section}' not found in {file}")]
    SourceMissing { file: String, section: String },

    #[error("target file not found: {file}")]
    TargetFileMissing { file: String },

    #[error("section '{section}' not found in {file}")]
    TargetSectionNotFound { file: String, section: String },

    #[error("section '{section}' in {file} has an unclosed code fence")]
    UnclosedFence { file: String, section: String },

    #[error("i/o error on {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl SyncError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SourceMissing { .. } => ErrorKind::SourceMissing,
            Self::TargetFileMissing { .. } => ErrorKind::TargetFileMissing,
            Self::TargetSectionNotFound { .. } => ErrorKind::TargetSectionNotFound,
            Self::UnclosedFence { .. } => ErrorKind::UnclosedFence,
            Self::Io { .. } => ErrorKind::Io,
        }
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
