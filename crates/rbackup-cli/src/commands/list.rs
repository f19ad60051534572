//! List command implementation

use crate::commands::load_config;
use crate::error::add_backup_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use rbackup_core::Rclone;
use rbackup_core::list_sources;
use std::path::Path;

/// Prints the paths the filter rules select, without writing an archive.
pub fn execute(
    config_path: &Path,
    rclone: Option<&Path>,
    formatter: &dyn OutputFormatter,
) -> Result<()> {
    let config = load_config(config_path, rclone)?;
    let tool = Rclone::from_config(&config);

    let files = add_backup_context(list_sources(&config, &tool), config_path)?;
    formatter.format_listing(&files)
}
