//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use rbackup_core::ArchiveInfo;
use rbackup_core::BackupOutcome;
use rbackup_core::UploadOutcome;
use serde::Serialize;
use std::io::Write;
use std::io::{self};

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Serialize)]
struct UploadData {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<String>,
}

impl From<&UploadOutcome> for UploadData {
    fn from(upload: &UploadOutcome) -> Self {
        match upload {
            UploadOutcome::Uploaded { target } => Self {
                status: "uploaded",
                target: Some(target.clone()),
            },
            UploadOutcome::Declined => Self {
                status: "declined",
                target: None,
            },
            UploadOutcome::Disabled => Self {
                status: "disabled",
                target: None,
            },
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_backup_result(&self, outcome: &BackupOutcome) -> Result<()> {
        #[derive(Serialize)]
        struct BackupData {
            archive: String,
            size_bytes: u64,
            entry_count: usize,
            files_added: usize,
            directories_added: usize,
            bytes_written: u64,
            compression_percentage: f64,
            duration_ms: u128,
            warnings: Vec<String>,
            upload: UploadData,
        }

        let report = &outcome.creation;
        let data = BackupData {
            archive: outcome.archive.display().to_string(),
            size_bytes: outcome.info.size_bytes,
            entry_count: outcome.info.entry_count,
            files_added: report.files_added,
            directories_added: report.directories_added,
            bytes_written: report.bytes_written,
            compression_percentage: report.compression_percentage(),
            duration_ms: report.duration.as_millis(),
            warnings: report.warnings.clone(),
            upload: UploadData::from(&outcome.upload),
        };

        Self::output(&JsonOutput::success("run", data))
    }

    fn format_listing(&self, files: &[String]) -> Result<()> {
        #[derive(Serialize)]
        struct ListingData<'a> {
            count: usize,
            files: &'a [String],
        }

        Self::output(&JsonOutput::success(
            "list",
            ListingData {
                count: files.len(),
                files,
            },
        ))
    }

    fn format_archive_info(&self, info: &ArchiveInfo) -> Result<()> {
        #[derive(Serialize)]
        struct InfoData {
            archive: String,
            size_bytes: u64,
            entry_count: usize,
        }

        Self::output(&JsonOutput::success(
            "info",
            InfoData {
                archive: info.path.display().to_string(),
                size_bytes: info.size_bytes,
                entry_count: info.entry_count,
            },
        ))
    }

    fn format_error(&self, operation: &str, error: &anyhow::Error) {
        let output = JsonOutput::error(operation, format!("{error:?}"));
        let _ = Self::output(&output);
    }
}
