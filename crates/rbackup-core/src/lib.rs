//! Filtered directory backups into timestamped zip archives.
//!
//! `rbackup-core` lists a source directory through rclone's filter rules,
//! writes the selected files into `<basename>_<date>.zip`, reports the
//! archive's size and entry count, and optionally copies it to an rclone
//! remote after confirmation.
//!
//! # Examples
//!
//! ```no_run
//! use chrono::Local;
//! use rbackup_core::BackupConfig;
//! use rbackup_core::LinePrompt;
//! use rbackup_core::NoopProgress;
//! use rbackup_core::Rclone;
//! use rbackup_core::run_backup;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BackupConfig::new("/home/me/notes", "/home/me/backups", "filter.txt")
//!     .with_remote("gdrive", "backups")
//!     .with_save_remotely(true);
//! let rclone = Rclone::from_config(&config);
//! let mut prompt = LinePrompt::new(std::io::stdin().lock(), std::io::stderr());
//!
//! let outcome = run_backup(
//!     &config,
//!     &rclone,
//!     &mut prompt,
//!     &mut NoopProgress,
//!     &Local::now().naive_local(),
//! )?;
//! println!("{} entries in {}", outcome.info.entry_count, outcome.archive.display());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod creation;
pub mod error;
pub mod inspection;
pub mod naming;
pub mod pipeline;
pub mod progress;
pub mod sync_tool;
pub mod upload;

// Re-export main API types
pub use config::BackupConfig;
pub use config::CompressionMethod;
pub use creation::CreationReport;
pub use error::BackupError;
pub use error::Result;
pub use inspection::ArchiveInfo;
pub use inspection::inspect_archive;
pub use pipeline::BackupOutcome;
pub use pipeline::list_sources;
pub use pipeline::run_backup;
pub use progress::NoopProgress;
pub use progress::ProgressCallback;
pub use sync_tool::Rclone;
pub use sync_tool::SyncTool;
pub use upload::LinePrompt;
pub use upload::Prompt;
pub use upload::UploadOutcome;
