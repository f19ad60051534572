//! Error conversion utilities for CLI.
//!
//! Wraps rbackup-core's typed errors (thiserror) in user-friendly context
//! (anyhow) with actionable hints. The typed error stays in the chain so
//! the exit code can still be derived from it.

use anyhow::Context;
use rbackup_core::BackupError;
use std::path::Path;

/// Exit code for failures that are not a [`BackupError`].
pub const EXIT_FAILURE: u8 = 2;

/// Wraps a `BackupError` with a hint pointing at what to fix.
pub fn convert_backup_error(err: BackupError, config_path: &Path) -> anyhow::Error {
    let hint = match &err {
        BackupError::Config { .. } => format!(
            "Could not load settings from '{}'\n\
             HINT: Pass --config or set RBACKUP_CONFIG to point at your settings file.",
            config_path.display()
        ),
        BackupError::FilterFileMissing { .. } => format!(
            "Filter file missing\n\
             HINT: Create it, or fix 'filter_file' under [rclone] in '{}'.",
            config_path.display()
        ),
        BackupError::SourceNotFound { .. } => format!(
            "Nothing to back up\n\
             HINT: Check 'src_dir' under [dirs] in '{}'.",
            config_path.display()
        ),
        BackupError::ToolLaunch { .. } => "Could not run rclone\n\
             HINT: Install rclone, or point 'binary' under [rclone] (or --rclone) at it."
            .to_string(),
        BackupError::ListCommandFailed { .. } => "Listing the source directory failed\n\
             HINT: Check the filter rules with 'rclone lsf -R <src> --filter-from <filter>'."
            .to_string(),
        BackupError::UploadFailed { .. } => "Upload failed, the local archive was kept\n\
             HINT: Check that the remote alias appears in 'rclone listremotes'."
            .to_string(),
        BackupError::InvalidEntryPath { .. } => "Refusing to archive a path outside the source \
             directory"
            .to_string(),
        _ => "Backup failed".to_string(),
    };
    anyhow::Error::from(err).context(hint)
}

/// Adds hint context to a core result.
pub fn add_backup_context<T>(
    result: Result<T, BackupError>,
    config_path: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_backup_error(e, config_path))
}

/// Process exit code for an error: the core error's own code if one is in
/// the chain, [`EXIT_FAILURE`] otherwise.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<BackupError>()
        .map_or(EXIT_FAILURE, BackupError::exit_code)
}

/// Adds context to an archive inspection result.
pub fn add_archive_context<T>(
    result: Result<T, BackupError>,
    archive: &Path,
) -> anyhow::Result<T> {
    result.with_context(|| format!("Cannot read archive '{}'", archive.display()))
}
