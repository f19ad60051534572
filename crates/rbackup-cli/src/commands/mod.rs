//! Command implementations.

pub mod completion;
pub mod info;
pub mod list;
pub mod run;

use crate::error::add_backup_context;
use anyhow::Result;
use rbackup_core::BackupConfig;
use std::path::Path;

/// Loads the settings file and applies the `--rclone` override.
pub fn load_config(config_path: &Path, rclone: Option<&Path>) -> Result<BackupConfig> {
    let mut config = add_backup_context(BackupConfig::from_ini_file(config_path), config_path)?;
    if let Some(binary) = rclone {
        config = config.with_rclone_binary(binary);
    }
    Ok(config)
}
