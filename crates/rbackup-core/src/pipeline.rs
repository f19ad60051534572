//! The backup run: validate, list, archive, inspect, upload.

use crate::ArchiveInfo;
use crate::BackupConfig;
use crate::ProgressCallback;
use crate::Prompt;
use crate::Result;
use crate::SyncTool;
use crate::UploadOutcome;
use crate::creation::CreationReport;
use crate::creation::create_archive;
use crate::inspection::inspect_archive;
use crate::naming::archive_output_path;
use crate::upload::upload_archive;
use chrono::NaiveDateTime;
use std::path::PathBuf;

/// Everything a completed run produced.
#[derive(Debug, Clone)]
pub struct BackupOutcome {
    /// Where the archive was written.
    pub archive: PathBuf,
    /// Statistics from writing the archive.
    pub creation: CreationReport,
    /// Size and entry count read back from the archive.
    pub info: ArchiveInfo,
    /// Whether the archive went to the remote.
    pub upload: UploadOutcome,
}

/// Validates the configuration and returns the filtered file listing.
///
/// # Errors
///
/// Returns the validation error (filter file missing, source missing, ...)
/// or the listing failure.
pub fn list_sources(config: &BackupConfig, tool: &dyn SyncTool) -> Result<Vec<String>> {
    config.validate()?;

    tracing::info!("Getting list of files in '{}'", config.src_dir.display());
    let files = tool.list_files(&config.src_dir, &config.filter_file)?;
    tracing::debug!("Listing returned {} paths", files.len());

    Ok(files)
}

/// Runs one complete backup.
///
/// `now` fixes the archive timestamp so callers control naming.
///
/// # Examples
///
/// ```no_run
/// use chrono::Local;
/// use rbackup_core::BackupConfig;
/// use rbackup_core::LinePrompt;
/// use rbackup_core::NoopProgress;
/// use rbackup_core::Rclone;
/// use rbackup_core::run_backup;
///
/// let config = BackupConfig::from_ini_file("settings.ini")?;
/// let rclone = Rclone::from_config(&config);
/// let mut prompt = LinePrompt::new(std::io::stdin().lock(), std::io::stderr());
///
/// let outcome = run_backup(
///     &config,
///     &rclone,
///     &mut prompt,
///     &mut NoopProgress,
///     &Local::now().naive_local(),
/// )?;
/// println!("wrote {}", outcome.archive.display());
/// # Ok::<(), rbackup_core::BackupError>(())
/// ```
///
/// # Errors
///
/// Any step's failure is returned as-is; a failed archive write leaves no
/// partial file behind.
pub fn run_backup(
    config: &BackupConfig,
    tool: &dyn SyncTool,
    prompt: &mut dyn Prompt,
    progress: &mut dyn ProgressCallback,
    now: &NaiveDateTime,
) -> Result<BackupOutcome> {
    let files = list_sources(config, tool)?;
    let archive = archive_output_path(config, now)?;

    let creation = create_archive(config, &files, &archive, progress)?;
    for warning in &creation.warnings {
        tracing::warn!("{warning}");
    }

    let info = inspect_archive(&archive)?;
    let upload = upload_archive(config, tool, &archive, prompt)?;

    tracing::info!("Backup completed!");

    Ok(BackupOutcome {
        archive,
        creation,
        info,
        upload,
    })
}
