//! Implementation of the 'run' subcommand: compile, then schedule.
//!
//! Preconditions of both halves, credentials included, are checked before
//! any media work starts. Both halves share one run log file.

use crate::cli::RunArgs;
use crate::commands::{compile, schedule};
use crate::error::CliResult;
use crate::logging;

use log::info;
use std::path::PathBuf;

/// The `run` command.
pub fn run_all(args: RunArgs, log_dir: Option<PathBuf>) -> CliResult<()> {
    let compile_args = &args.compile;
    let prepared_compile = compile::prepare(compile_args)?;
    let prepared_schedule = schedule::prepare(
        &compile_args.output_dir,
        &compile_args.prefix,
        &args.upload,
        compile_args.ntfy.as_deref(),
    )?;

    let log_dir = log_dir.unwrap_or_else(|| compile::default_log_dir(&compile_args.output_dir));
    let log_path = logging::attach_log_file(&log_dir, "run")?;
    info!("Log file: {}", log_path.display());

    compile::execute(&prepared_compile)?;
    schedule::execute(&prepared_schedule)?;
    Ok(())
}
