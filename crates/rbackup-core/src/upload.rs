//! Remote upload of the finished archive.

use crate::BackupConfig;
use crate::Result;
use crate::SyncTool;
use std::io::BufRead;
use std::io::Write;
use std::path::Path;

/// Source of answers to yes/no questions.
pub trait Prompt {
    /// Shows `question` and returns the answer without its line terminator.
    fn ask(&mut self, question: &str) -> std::io::Result<String>;
}

/// Prompt over any line-oriented reader and writer, e.g. stdin and stderr.
#[derive(Debug)]
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    /// Creates a prompt reading answers from `input` and writing questions
    /// to `output`.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompt for LinePrompt<R, W> {
    fn ask(&mut self, question: &str) -> std::io::Result<String> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(strip_line_ending(&line).to_string())
    }
}

fn strip_line_ending(line: &str) -> &str {
    line.strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .unwrap_or(line)
}

/// Whether an answer approves the upload: exactly `Y`, case-sensitive.
///
/// # Examples
///
/// ```
/// use rbackup_core::upload::is_approval;
///
/// assert!(is_approval("Y"));
/// assert!(!is_approval("y"));
/// assert!(!is_approval("yes"));
/// assert!(!is_approval(" Y"));
/// assert!(!is_approval(""));
/// ```
#[must_use]
pub fn is_approval(answer: &str) -> bool {
    answer == "Y"
}

/// What happened to the archive after it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Copied to the remote target.
    Uploaded {
        /// Remote destination, `alias:dir`.
        target: String,
    },
    /// The user did not confirm the upload.
    Declined,
    /// Uploads are turned off in the configuration.
    Disabled,
}

/// Uploads `archive` if the configuration asks for it.
///
/// With `save_remotely` off nothing happens. With `auto_upload` on the copy
/// runs without asking; otherwise `prompt` is asked once and only an exact
/// `Y` starts the copy.
///
/// # Errors
///
/// Returns an error if reading the answer fails, the sync tool cannot be
/// launched, or the copy exits unsuccessfully
/// ([`crate::BackupError::UploadFailed`]).
pub fn upload_archive(
    config: &BackupConfig,
    tool: &dyn SyncTool,
    archive: &Path,
    prompt: &mut dyn Prompt,
) -> Result<UploadOutcome> {
    if !config.save_remotely {
        return Ok(UploadOutcome::Disabled);
    }

    if !config.auto_upload {
        let question = format!(
            "Would you like to upload archive to '{}'? (Y/n) ",
            config.remote_alias
        );
        let answer = prompt.ask(&question)?;
        if !is_approval(&answer) {
            tracing::info!("Skipping upload to remote server");
            return Ok(UploadOutcome::Declined);
        }
    }

    let target = config.remote_target();
    tracing::info!("Uploading to '{}' remote server...", config.remote_alias);
    tool.copy(archive, &target)?;
    tracing::info!("Uploaded '{}' to '{target}'", archive.display());

    Ok(UploadOutcome::Uploaded { target })
}
