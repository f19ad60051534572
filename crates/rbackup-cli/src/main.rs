//! rbackup CLI - Filtered directory backups into zip archives, with optional
//! upload to an rclone remote.

mod cli;
mod commands;
mod error;
mod logging;
mod output;
mod progress;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use cli::Commands;
use cli::RunArgs;
use output::OutputFormatter;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    let _guard = match logging::init(cli.verbose, cli.quiet, cli.log_dir.as_deref()) {
        Ok(guard) => guard,
        Err(err) => {
            formatter.format_error("startup", &err);
            return ExitCode::from(error::EXIT_FAILURE);
        }
    };

    let operation = operation_name(cli.command.as_ref());
    match dispatch(&cli, &*formatter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!("{operation} failed: {err:#}");
            formatter.format_error(operation, &err);
            ExitCode::from(error::exit_code(&err))
        }
    }
}

fn dispatch(cli: &Cli, formatter: &dyn OutputFormatter) -> Result<()> {
    let rclone = cli.rclone.as_deref();
    let interaction = commands::run::Interaction {
        json: cli.json,
        quiet: cli.quiet,
    };

    match &cli.command {
        None => commands::run::execute(
            &RunArgs::default(),
            &cli.config,
            rclone,
            &interaction,
            formatter,
        ),
        Some(Commands::Run(args)) => {
            commands::run::execute(args, &cli.config, rclone, &interaction, formatter)
        }
        Some(Commands::List) => commands::list::execute(&cli.config, rclone, formatter),
        Some(Commands::Info(args)) => commands::info::execute(args, formatter),
        Some(Commands::Completion(args)) => {
            commands::completion::execute(args.shell);
            Ok(())
        }
    }
}

fn operation_name(command: Option<&Commands>) -> &'static str {
    match command {
        None | Some(Commands::Run(_)) => "run",
        Some(Commands::List) => "list",
        Some(Commands::Info(_)) => "info",
        Some(Commands::Completion(_)) => "completion",
    }
}
