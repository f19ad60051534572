//! Output formatter trait for CLI results.

use anyhow::Result;
use rbackup_core::ArchiveInfo;
use rbackup_core::BackupOutcome;
use serde::Serialize;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the result of a completed backup run
    fn format_backup_result(&self, outcome: &BackupOutcome) -> Result<()>;

    /// Format the filtered file listing
    fn format_listing(&self, files: &[String]) -> Result<()>;

    /// Format archive size and entry count
    fn format_archive_info(&self, info: &ArchiveInfo) -> Result<()>;

    /// Format error message
    fn format_error(&self, operation: &str, error: &anyhow::Error);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }
}

impl JsonOutput<()> {
    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}
