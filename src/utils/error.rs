use crate::models::operation::ActionKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiverError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported archive format: {}", path.display())]
    ArchiveUnsupportedFormat { path: PathBuf },

    #[error("{operation} is not supported for {}", path.display())]
    ArchiveUnsupportedOperation {
        path: PathBuf,
        operation: &'static str,
    },

    #[error("Failed to list {}: {reason}", path.display())]
    ArchiveListFailed { path: PathBuf, reason: String },

    #[error("Failed to create {}: {reason}", path.display())]
    ArchiveCreateFailed { path: PathBuf, reason: String },

    #[error("Failed to add files to {}: {reason}", path.display())]
    ArchiveAddFailed { path: PathBuf, reason: String },

    #[error("Failed to delete files from {}: {reason}", path.display())]
    ArchiveRemoveFailed { path: PathBuf, reason: String },

    #[error("Failed to extract {}: {reason}", path.display())]
    ArchiveExtractFailed { path: PathBuf, reason: String },

    #[error("Integrity test failed for {}: {reason}", path.display())]
    ArchiveTestFailed { path: PathBuf, reason: String },

    #[error("Password required for {}", path.display())]
    ArchivePasswordRequired { path: PathBuf },

    #[error("Invalid password for {}: {reason}", path.display())]
    ArchiveInvalidPassword { path: PathBuf, reason: String },

    #[error("{action} finished with {failed} failed item(s):\n{details}")]
    PartialFailure {
        action: ActionKind,
        failed: usize,
        details: String,
    },

    #[error("Operation cancelled")]
    Cancelled,

    /// 세션이 알려 준 작업 실패 (메시지 그대로)
    #[error("{message}")]
    OperationFailed { action: ActionKind, message: String },

    #[error("{0}")]
    InvalidArguments(String),

    #[error("{0} is still in progress")]
    OperationInProgress(ActionKind),

    #[error("No archive is loaded")]
    NoArchiveLoaded,

    #[error("Archive content is not available")]
    NoSnapshot,

    #[error("Item no longer exists in the archive")]
    StaleHandle,

    #[error("No such folder in the archive: {0}")]
    PathNotFound(String),

    #[error("Not a folder: {0}")]
    NotADirectory(String),
}

pub type Result<T> = std::result::Result<T, ArchiverError>;
