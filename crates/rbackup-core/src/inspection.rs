//! Read-only inspection of a finished archive.

use crate::BackupError;
use crate::Result;
use std::fs;
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;

/// Size and entry count of an archive on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveInfo {
    /// Archive location.
    pub path: PathBuf,
    /// Archive size on disk in bytes.
    pub size_bytes: u64,
    /// Number of entries in the central directory.
    pub entry_count: usize,
}

/// Opens a zip archive read-only and reports its size and entry count.
///
/// Both values are also logged at info level.
///
/// # Examples
///
/// ```no_run
/// use rbackup_core::inspect_archive;
///
/// let info = inspect_archive("/backups/proj_25-01-01.zip")?;
/// println!("{} entries, {} bytes", info.entry_count, info.size_bytes);
/// # Ok::<(), rbackup_core::BackupError>(())
/// ```
///
/// # Errors
///
/// Returns [`BackupError::Io`] if the file cannot be opened, or with kind
/// `InvalidData` if it is not a readable zip archive.
pub fn inspect_archive(path: impl AsRef<Path>) -> Result<ArchiveInfo> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    tracing::info!("Getting info for zip file '{name}'");

    let archive = zip::ZipArchive::new(File::open(path)?).map_err(|e| {
        BackupError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("'{}' is not a readable zip archive: {e}", path.display()),
        ))
    })?;
    let info = ArchiveInfo {
        path: path.to_path_buf(),
        size_bytes: fs::metadata(path)?.len(),
        entry_count: archive.len(),
    };

    tracing::info!("File Size: {} bytes", info.size_bytes);
    tracing::info!("# of Files: {}", info.entry_count);

    Ok(info)
}
