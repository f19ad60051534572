//! External file-sync tool integration.
//!
//! Listing the files to back up and copying the finished archive to remote
//! storage are both delegated to rclone. The [`SyncTool`] trait is the seam
//! between the pipeline and the process boundary so the pipeline can run
//! against a fake in tests.

use crate::BackupConfig;
use crate::BackupError;
use crate::Result;
use std::ffi::OsStr;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

/// Operations the backup pipeline needs from a file-sync tool.
pub trait SyncTool {
    /// Lists every path under `src_dir` selected by the rules in
    /// `filter_file`, relative to `src_dir`, in the tool's order.
    ///
    /// Directory entries end with `/`.
    fn list_files(&self, src_dir: &Path, filter_file: &Path) -> Result<Vec<String>>;

    /// Copies `local_path` to `remote_target` (`alias:dir`).
    fn copy(&self, local_path: &Path, remote_target: &str) -> Result<()>;
}

/// rclone command-line driver.
///
/// # Examples
///
/// ```no_run
/// use rbackup_core::Rclone;
/// use rbackup_core::SyncTool;
/// use std::path::Path;
///
/// let rclone = Rclone::new("rclone");
/// let files = rclone.list_files(Path::new("/data/proj"), Path::new("filter.txt"))?;
/// println!("{} paths selected", files.len());
/// # Ok::<(), rbackup_core::BackupError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rclone {
    binary: PathBuf,
    global_args: Vec<String>,
}

impl Rclone {
    /// Creates a driver for the given executable.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            global_args: Vec::new(),
        }
    }

    /// Creates a driver from the `rclone` settings of a backup config.
    #[must_use]
    pub fn from_config(config: &BackupConfig) -> Self {
        Self::new(&config.rclone_binary).with_global_args(config.rclone_flags.clone())
    }

    /// Sets arguments placed before every subcommand.
    #[must_use]
    pub fn with_global_args(mut self, args: Vec<String>) -> Self {
        self.global_args = args;
        self
    }

    /// Executable this driver invokes.
    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn command<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.binary);
        cmd.args(&self.global_args).args(args);
        cmd
    }

    fn run(&self, mut cmd: Command) -> Result<Output> {
        tracing::debug!("Running {:?}", cmd);
        cmd.output().map_err(|source| BackupError::ToolLaunch {
            tool: self.binary.display().to_string(),
            source,
        })
    }
}

impl SyncTool for Rclone {
    fn list_files(&self, src_dir: &Path, filter_file: &Path) -> Result<Vec<String>> {
        let cmd = self.command([
            OsStr::new("lsf"),
            OsStr::new("-R"),
            src_dir.as_os_str(),
            OsStr::new("--filter-from"),
            filter_file.as_os_str(),
        ]);
        let output = self.run(cmd)?;

        if !output.status.success() {
            return Err(BackupError::ListCommandFailed {
                status: output.status.code(),
                reason: stderr_text(&output),
            });
        }

        let stdout =
            String::from_utf8(output.stdout).map_err(|_| BackupError::ListCommandFailed {
                status: Some(0),
                reason: "listing output is not valid UTF-8".to_string(),
            })?;

        Ok(parse_listing(&stdout))
    }

    fn copy(&self, local_path: &Path, remote_target: &str) -> Result<()> {
        let cmd = self.command([
            OsStr::new("copy"),
            local_path.as_os_str(),
            OsStr::new(remote_target),
        ]);
        let output = self.run(cmd)?;

        if !output.status.success() {
            return Err(BackupError::UploadFailed {
                target: remote_target.to_string(),
                status: output.status.code(),
                reason: stderr_text(&output),
            });
        }

        Ok(())
    }
}

/// Splits `rclone lsf` output into paths, dropping blank lines.
///
/// # Examples
///
/// ```
/// use rbackup_core::sync_tool::parse_listing;
///
/// let files = parse_listing("a.txt\nsub/\nsub/b.txt\n\n");
/// assert_eq!(files, vec!["a.txt", "sub/", "sub/b.txt"]);
/// ```
#[must_use]
pub fn parse_listing(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(String::from)
        .collect()
}

fn stderr_text(output: &Output) -> String {
    let text = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if text.is_empty() {
        "no error output".to_string()
    } else {
        text
    }
}
