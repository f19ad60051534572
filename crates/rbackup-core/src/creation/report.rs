//! Archive creation reporting.

use std::time::Duration;

/// Statistics about one archive creation.
///
/// # Examples
///
/// ```
/// use rbackup_core::creation::CreationReport;
///
/// let mut report = CreationReport::default();
/// report.files_added = 10;
/// report.bytes_written = 1024;
/// report.bytes_compressed = 256;
///
/// assert_eq!(report.entries_added(), 10);
/// assert_eq!(report.compression_ratio(), 4.0);
/// assert_eq!(report.compression_percentage(), 75.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CreationReport {
    /// Number of files added to the archive.
    pub files_added: usize,

    /// Number of directory entries added to the archive.
    pub directories_added: usize,

    /// Total bytes read from source files (uncompressed).
    pub bytes_written: u64,

    /// Size of the finished archive on disk.
    pub bytes_compressed: u64,

    /// Duration of the creation operation.
    pub duration: Duration,

    /// Warnings generated during creation.
    pub warnings: Vec<String>,
}

impl CreationReport {
    /// Creates a new empty creation report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total entries written, files and directories.
    #[must_use]
    pub fn entries_added(&self) -> usize {
        self.files_added + self.directories_added
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns the compression ratio (uncompressed / compressed).
    ///
    /// Returns 0.0 if either size is 0.
    #[must_use]
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_compressed == 0 || self.bytes_written == 0 {
            return 0.0;
        }
        self.bytes_written as f64 / self.bytes_compressed as f64
    }

    /// Returns the space saved as a percentage of the uncompressed size.
    ///
    /// Returns 0.0 if nothing was written. Negative when the container
    /// overhead outweighs compression, which happens for tiny inputs.
    #[must_use]
    pub fn compression_percentage(&self) -> f64 {
        if self.bytes_written == 0 {
            return 0.0;
        }
        (1.0 - self.bytes_compressed as f64 / self.bytes_written as f64) * 100.0
    }
}
