//! Listed paths and their archive entry names.

use crate::BackupError;
use crate::Result;
use std::path::Path;
use std::path::PathBuf;

/// A relative path from the file listing, normalized.
///
/// Empty and `.` components are dropped; `..` is rejected so an entry can
/// neither escape the source directory on disk nor the root folder in the
/// archive. A trailing `/` marks a directory.
///
/// # Examples
///
/// ```
/// use rbackup_core::creation::ListedPath;
///
/// let entry = ListedPath::parse("./sub//b.txt")?;
/// assert_eq!(entry.archive_name(Some("proj")), "proj/sub/b.txt");
/// assert_eq!(entry.archive_name(None), "sub/b.txt");
///
/// let dir = ListedPath::parse("sub/")?;
/// assert!(dir.is_dir());
/// assert_eq!(dir.archive_name(Some("proj")), "proj/sub/");
/// # Ok::<(), rbackup_core::BackupError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedPath {
    components: Vec<String>,
    is_dir: bool,
}

impl ListedPath {
    /// Normalizes one line of the listing.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::InvalidEntryPath`] if the path contains `..` or
    /// has no components left after normalization.
    pub fn parse(listed: &str) -> Result<Self> {
        let mut components = Vec::new();
        for part in listed.split('/') {
            match part {
                "" | "." => {}
                ".." => return Err(invalid(listed)),
                name => components.push(name.to_string()),
            }
        }
        if components.is_empty() {
            return Err(invalid(listed));
        }
        Ok(Self {
            components,
            is_dir: listed.ends_with('/'),
        })
    }

    /// Whether the listing marked this path as a directory.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Marks the path as a directory, for listings without trailing `/`.
    #[must_use]
    pub fn into_dir(mut self) -> Self {
        self.is_dir = true;
        self
    }

    /// Location on disk under `src_dir`.
    #[must_use]
    pub fn source_path(&self, src_dir: &Path) -> PathBuf {
        let mut path = src_dir.to_path_buf();
        path.extend(&self.components);
        path
    }

    /// Entry name inside the zip, optionally under a root folder.
    ///
    /// Directory names end with `/`.
    #[must_use]
    pub fn archive_name(&self, root: Option<&str>) -> String {
        let mut name = String::new();
        if let Some(root) = root {
            name.push_str(root);
            name.push('/');
        }
        name.push_str(&self.components.join("/"));
        if self.is_dir {
            name.push('/');
        }
        name
    }
}

fn invalid(listed: &str) -> BackupError {
    BackupError::InvalidEntryPath {
        path: listed.to_string(),
    }
}
