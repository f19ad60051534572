//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use crate::progress::humanize_bytes;
use anyhow::Result;
use console::Term;
use console::style;
use rbackup_core::ArchiveInfo;
use rbackup_core::BackupOutcome;
use rbackup_core::UploadOutcome;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
    err_term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
            err_term: Term::stderr(),
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }

    fn describe_upload(upload: &UploadOutcome) -> String {
        match upload {
            UploadOutcome::Uploaded { target } => format!("uploaded to {target}"),
            UploadOutcome::Declined => "skipped".to_string(),
            UploadOutcome::Disabled => "disabled".to_string(),
        }
    }

    fn headline(&self, text: &str) {
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {text}", style("✓").green().bold()));
        } else {
            let _ = self.term.write_line(text);
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_backup_result(&self, outcome: &BackupOutcome) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let report = &outcome.creation;
        self.headline(&format!("Archive created: {}", outcome.archive.display()));

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&format!(
            "  Files added:      {}",
            Self::format_number(report.files_added)
        ));
        let _ = self.term.write_line(&format!(
            "  Directories:      {}",
            Self::format_number(report.directories_added)
        ));
        let _ = self.term.write_line(&format!(
            "  Entries:          {}",
            Self::format_number(outcome.info.entry_count)
        ));
        let _ = self.term.write_line(&format!(
            "  Total size:       {}",
            humanize_bytes(report.bytes_written)
        ));
        let _ = self.term.write_line(&format!(
            "  Archive size:     {}",
            humanize_bytes(outcome.info.size_bytes)
        ));

        if self.verbose {
            let _ = self.term.write_line(&format!(
                "  Compression:      {:.1}%",
                report.compression_percentage()
            ));
            let _ = self
                .term
                .write_line(&format!("  Duration:         {:?}", report.duration));
        }

        let _ = self.term.write_line(&format!(
            "  Upload:           {}",
            Self::describe_upload(&outcome.upload)
        ));

        Ok(())
    }

    fn format_listing(&self, files: &[String]) -> Result<()> {
        for file in files {
            self.term.write_line(file)?;
        }

        if self.verbose && !self.quiet {
            let _ = self.err_term.write_line(&format!(
                "{} paths selected",
                Self::format_number(files.len())
            ));
        }

        Ok(())
    }

    fn format_archive_info(&self, info: &ArchiveInfo) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let _ = self
            .term
            .write_line(&format!("Archive: {}", info.path.display()));
        let _ = self.term.write_line(&format!(
            "  Size:     {} ({} bytes)",
            humanize_bytes(info.size_bytes),
            info.size_bytes
        ));
        let _ = self.term.write_line(&format!(
            "  Entries:  {}",
            Self::format_number(info.entry_count)
        ));

        Ok(())
    }

    fn format_error(&self, _operation: &str, error: &anyhow::Error) {
        if self.use_colors {
            let _ = self
                .err_term
                .write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = self.err_term.write_line(&format!("ERROR: {error:?}"));
        }
    }
}
