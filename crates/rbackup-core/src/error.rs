//! Error types for backup operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `BackupError`.
pub type Result<T> = std::result::Result<T, BackupError>;

/// Errors that can occur while producing or uploading a backup.
#[derive(Error, Debug)]
pub enum BackupError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {message}")]
    Config {
        /// What was wrong with the configuration.
        message: String,
    },

    /// The rclone filter rule file does not exist.
    #[error("no filter file exists at '{path}'")]
    FilterFileMissing {
        /// Resolved location of the filter file.
        path: PathBuf,
    },

    /// The directory to back up does not exist.
    #[error("source directory not found: {path}")]
    SourceNotFound {
        /// The missing source directory.
        path: PathBuf,
    },

    /// The external sync tool could not be started.
    #[error("failed to launch '{tool}': {source}")]
    ToolLaunch {
        /// Program that was invoked.
        tool: String,
        /// Underlying spawn error.
        source: std::io::Error,
    },

    /// The listing command exited unsuccessfully or produced unusable output.
    #[error("file listing failed{}: {reason}", fmt_status(.status))]
    ListCommandFailed {
        /// Exit code, if the process exited normally.
        status: Option<i32>,
        /// Captured stderr or a description of the bad output.
        reason: String,
    },

    /// A listed path cannot be stored in the archive.
    #[error("invalid archive entry path: {path}")]
    InvalidEntryPath {
        /// The offending relative path as listed.
        path: String,
    },

    /// The zip container could not be written.
    #[error("failed to write archive '{path}': {reason}")]
    ArchiveWriteFailed {
        /// Archive being written.
        path: PathBuf,
        /// Underlying zip error.
        reason: String,
    },

    /// The copy command exited unsuccessfully.
    #[error("upload to '{target}' failed{}: {reason}", fmt_status(.status))]
    UploadFailed {
        /// Remote target (`alias:dir`).
        target: String,
        /// Exit code, if the process exited normally.
        status: Option<i32>,
        /// Captured stderr.
        reason: String,
    },
}

#[allow(clippy::ref_option)]
fn fmt_status(status: &Option<i32>) -> String {
    status.map_or_else(
        || " (terminated by signal)".to_string(),
        |code| format!(" (exit code {code})"),
    )
}

impl BackupError {
    /// Creates a configuration error from any displayable message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns `true` for errors raised before any work is done.
    ///
    /// Startup errors cover configuration loading and filter-file lookup;
    /// everything else happens while listing, archiving or uploading.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbackup_core::BackupError;
    /// use std::path::PathBuf;
    ///
    /// let err = BackupError::FilterFileMissing {
    ///     path: PathBuf::from("filter.txt"),
    /// };
    /// assert!(err.is_startup_error());
    ///
    /// let err = BackupError::InvalidEntryPath {
    ///     path: "../escape".into(),
    /// };
    /// assert!(!err.is_startup_error());
    /// ```
    #[must_use]
    pub const fn is_startup_error(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::FilterFileMissing { .. })
    }

    /// Process exit code for this error.
    ///
    /// Startup errors exit with 1, all other failures with 2.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        if self.is_startup_error() { 1 } else { 2 }
    }
}

impl From<config::ConfigError> for BackupError {
    fn from(err: config::ConfigError) -> Self {
        Self::config(err.to_string())
    }
}
