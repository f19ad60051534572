//! Progress bar implementation for CLI operations.

use console::Term;
use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use rbackup_core::ProgressCallback;

/// CLI progress bar wrapper implementing `ProgressCallback`.
///
/// The entry total is only known once the listing is done, so the bar
/// starts empty and picks up its length from the first entry event.
pub struct CliProgress {
    bar: ProgressBar,
    bytes_written: u64,
}

impl CliProgress {
    /// Creates a progress bar showing `message` until the first entry starts.
    #[must_use]
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new(0);

        // Template: "[████████░░░░] 42/100 entries (15.2 MB, 3s) proj/notes/todo.md"
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.cyan/blue}] {pos}/{len} entries ({prefix}, {elapsed}) {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        bar.set_prefix(humanize_bytes(0));
        bar.set_message(message.to_string());

        Self {
            bar,
            bytes_written: 0,
        }
    }

    /// Checks if we should show progress (TTY detection).
    #[must_use]
    pub fn should_show() -> bool {
        Term::stderr().is_term()
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressCallback for CliProgress {
    fn on_entry_start(&mut self, name: &str, total: usize, _current: usize) {
        if self.bar.length() != Some(total as u64) {
            self.bar.set_length(total as u64);
        }
        self.bar.set_message(name.to_string());
    }

    fn on_bytes_written(&mut self, bytes: u64) {
        self.bytes_written += bytes;
        self.bar.set_prefix(humanize_bytes(self.bytes_written));
    }

    fn on_entry_complete(&mut self, _name: &str) {
        self.bar.inc(1);
    }

    fn on_complete(&mut self) {
        self.bar.finish_and_clear();
    }
}

/// Converts bytes to human-readable format (KB, MB, GB, TB).
pub fn humanize_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.1} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
