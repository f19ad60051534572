//! Archive creation module.
//!
//! Turns a file listing into a single compressed zip container.

pub mod entry;
pub mod report;
pub mod zip;

// Re-exports for public API
pub use entry::ListedPath;
pub use report::CreationReport;
pub use self::zip::create_archive;
