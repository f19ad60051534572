//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rbackup")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Settings file
    #[arg(
        short,
        long,
        global = true,
        env = "RBACKUP_CONFIG",
        default_value = "settings.ini",
        value_name = "FILE"
    )]
    pub config: PathBuf,

    /// rclone executable (overrides the settings file)
    #[arg(long, global = true, value_name = "BIN")]
    pub rclone: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Also write logs to a daily-rotating file in this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Archive the source directory and optionally upload it (default)
    Run(RunArgs),
    /// Print the files the filter rules select, without archiving
    List,
    /// Show size and entry count of an existing archive
    Info(InfoArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

#[derive(clap::Args, Default)]
pub struct RunArgs {
    /// Upload without asking for confirmation
    #[arg(short = 'y', long, conflicts_with = "no_upload")]
    pub yes: bool,

    /// Never upload, whatever the settings file says
    #[arg(long)]
    pub no_upload: bool,

    /// Exit immediately instead of waiting for ENTER
    #[arg(long)]
    pub no_wait: bool,
}

#[derive(clap::Args)]
pub struct InfoArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_is_optional() {
        let cli = Cli::try_parse_from(["rbackup"]).unwrap_or_else(|e| panic!("{e}"));
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("settings.ini"));
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from(["rbackup", "run", "--yes", "--no-wait"])
            .unwrap_or_else(|e| panic!("{e}"));
        match cli.command {
            Some(Commands::Run(args)) => {
                assert!(args.yes);
                assert!(args.no_wait);
                assert!(!args.no_upload);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_yes_conflicts_with_no_upload() {
        assert!(Cli::try_parse_from(["rbackup", "run", "--yes", "--no-upload"]).is_err());
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["rbackup", "list", "--config", "/etc/rbackup.ini"])
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(cli.config, PathBuf::from("/etc/rbackup.ini"));
    }
}
