//! Progress reporting for archive creation.

/// Callback trait for progress reporting while an archive is written.
///
/// # Examples
///
/// ```
/// use rbackup_core::ProgressCallback;
///
/// struct PrintProgress;
///
/// impl ProgressCallback for PrintProgress {
///     fn on_entry_start(&mut self, name: &str, total: usize, current: usize) {
///         println!("[{current}/{total}] {name}");
///     }
///
///     fn on_bytes_written(&mut self, _bytes: u64) {}
///
///     fn on_entry_complete(&mut self, _name: &str) {}
///
///     fn on_complete(&mut self) {
///         println!("done");
///     }
/// }
/// ```
pub trait ProgressCallback {
    /// Called before an entry is written.
    ///
    /// * `name` - Entry name inside the archive
    /// * `total` - Number of entries in the listing
    /// * `current` - Current entry number (1-indexed)
    fn on_entry_start(&mut self, name: &str, total: usize, current: usize);

    /// Called for each chunk of file data read from disk.
    fn on_bytes_written(&mut self, bytes: u64);

    /// Called after an entry has been written.
    fn on_entry_complete(&mut self, name: &str);

    /// Called once after the archive has been finalized.
    fn on_complete(&mut self);
}

/// Progress callback that ignores every event.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_entry_start(&mut self, _name: &str, _total: usize, _current: usize) {}

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, _name: &str) {}

    fn on_complete(&mut self) {}
}
