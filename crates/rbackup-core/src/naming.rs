//! Timestamped archive naming.
//!
//! Archives are named `<basename(src_dir)>_<timestamp>.zip` where the
//! timestamp is `YY-MM-DD`, or `YY-MM-DD_HHMMSS` when the time of day is
//! requested.

use crate::BackupConfig;
use crate::Result;
use chrono::NaiveDateTime;
use std::path::PathBuf;

const DATE_FORMAT: &str = "%y-%m-%d";
const DATE_TIME_FORMAT: &str = "%y-%m-%d_%H%M%S";

/// Formats the archive timestamp.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use rbackup_core::naming::format_timestamp;
///
/// let now = NaiveDate::from_ymd_opt(2024, 3, 9)
///     .and_then(|d| d.and_hms_opt(7, 5, 30))
///     .unwrap();
/// assert_eq!(format_timestamp(&now, false), "24-03-09");
/// assert_eq!(format_timestamp(&now, true), "24-03-09_070530");
/// ```
#[must_use]
pub fn format_timestamp(now: &NaiveDateTime, include_time: bool) -> String {
    let format = if include_time {
        DATE_TIME_FORMAT
    } else {
        DATE_FORMAT
    };
    now.format(format).to_string()
}

/// Archive file name for a source basename and timestamp.
#[must_use]
pub fn archive_file_name(source_basename: &str, timestamp: &str) -> String {
    format!("{source_basename}_{timestamp}.zip")
}

/// Full path of the archive a run started at `now` writes.
///
/// # Errors
///
/// Returns [`crate::BackupError::Config`] if the source directory has no
/// base name.
pub fn archive_output_path(config: &BackupConfig, now: &NaiveDateTime) -> Result<PathBuf> {
    let timestamp = format_timestamp(now, config.use_time_in_fn);
    let file_name = archive_file_name(config.source_basename()?, &timestamp);
    Ok(config.local_save_dir.join(file_name))
}
