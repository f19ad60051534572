//! Info command implementation

use crate::cli::InfoArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use rbackup_core::inspect_archive;

pub fn execute(args: &InfoArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let info = add_archive_context(inspect_archive(&args.archive), &args.archive)?;
    formatter.format_archive_info(&info)
}
