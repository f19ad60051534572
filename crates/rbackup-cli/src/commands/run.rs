//! Run command implementation

use crate::cli::RunArgs;
use crate::commands::load_config;
use crate::error::add_backup_context;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Context;
use anyhow::Result;
use chrono::Local;
use rbackup_core::BackupConfig;
use rbackup_core::LinePrompt;
use rbackup_core::NoopProgress;
use rbackup_core::ProgressCallback;
use rbackup_core::Rclone;
use rbackup_core::run_backup;
use std::io;
use std::io::BufRead;
use std::io::IsTerminal;
use std::io::Write;
use std::path::Path;

/// Flags that only affect how the run talks to the terminal.
pub struct Interaction {
    pub json: bool,
    pub quiet: bool,
}

pub fn execute(
    args: &RunArgs,
    config_path: &Path,
    rclone: Option<&Path>,
    interaction: &Interaction,
    formatter: &dyn OutputFormatter,
) -> Result<()> {
    let config = apply_overrides(load_config(config_path, rclone)?, args);
    let tool = Rclone::from_config(&config);
    let mut prompt = LinePrompt::new(io::stdin().lock(), io::stderr());

    let mut progress: Box<dyn ProgressCallback> =
        if !interaction.quiet && !interaction.json && CliProgress::should_show() {
            Box::new(CliProgress::new("Listing files"))
        } else {
            Box::new(NoopProgress)
        };

    let now = Local::now().naive_local();
    let outcome = add_backup_context(
        run_backup(&config, &tool, &mut prompt, progress.as_mut(), &now),
        config_path,
    )?;
    drop(progress);
    // releases the stdin lock before waiting for ENTER
    drop(prompt);

    formatter.format_backup_result(&outcome)?;

    if !args.no_wait && !interaction.json && io::stdin().is_terminal() {
        wait_for_enter()?;
    }

    Ok(())
}

/// Folds `--yes` and `--no-upload` into the loaded settings.
fn apply_overrides(config: BackupConfig, args: &RunArgs) -> BackupConfig {
    if args.no_upload {
        return config.with_save_remotely(false);
    }
    if args.yes {
        if !config.save_remotely {
            tracing::warn!("--yes has no effect: uploads are disabled in the settings file");
        }
        return config.with_auto_upload(true);
    }
    config
}

fn wait_for_enter() -> Result<()> {
    let mut stderr = io::stderr();
    write!(stderr, "Press ENTER to exit...")?;
    stderr.flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(())
}
