// ============================================================================
// reelstitch-cli/src/logging.rs
// ============================================================================
//
// LOGGING: Console and Run Log File Dispatch
//
// The CLI logs through the standard `log` facade with `fern` as the backend:
// - Info and below go to stdout as plain lines (terminal.rs styles them)
// - Warnings and errors go to stderr with a level prefix
// - Every record is also written, timestamped and without color codes, to
//   the run log file once one has been attached
//
// The log file is attached only after a command's preconditions pass, so a
// run that aborts early leaves nothing behind on disk.

use crate::error::CliResult;
use crate::terminal::should_use_color;

use log::{Level, LevelFilter, Record};
use owo_colors::OwoColorize;
use reelstitch_core::CoreError;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

static LOG_FILE: Mutex<Option<BufWriter<File>>> = Mutex::new(None);

/// Installs the global logger. `verbose` lowers the console level to debug.
pub fn init(verbose: bool) -> CliResult<()> {
    let console_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let stdout = fern::Dispatch::new()
        .level(console_level)
        .filter(|meta| meta.level() > Level::Warn)
        .format(|out, message, _| out.finish(format_args!("{message}")))
        .chain(std::io::stdout());

    let stderr = fern::Dispatch::new()
        .level(LevelFilter::Warn)
        .format(|out, message, record| {
            let label = match (record.level(), should_use_color()) {
                (Level::Error, true) => "ERROR".red().bold().to_string(),
                (level, true) => level.to_string().yellow().to_string(),
                (level, false) => level.to_string(),
            };
            out.finish(format_args!("{label}: {message}"))
        })
        .chain(std::io::stderr());

    let file = fern::Dispatch::new()
        .level(LevelFilter::Debug)
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                message
            ))
        })
        .chain(fern::Output::call(write_to_log_file));

    fern::Dispatch::new()
        .level(LevelFilter::Debug)
        .level_for("reqwest", LevelFilter::Warn)
        .level_for("hyper", LevelFilter::Warn)
        .level_for("hyper_util", LevelFilter::Warn)
        .level_for("rustls", LevelFilter::Warn)
        .chain(stdout)
        .chain(stderr)
        .chain(file)
        .apply()
        .map_err(|e| CoreError::OperationFailed(format!("Failed to initialize logging: {e}")))
}

fn write_to_log_file(record: &Record) {
    let Ok(mut guard) = LOG_FILE.lock() else {
        return;
    };
    if let Some(writer) = guard.as_mut() {
        let line = strip_ansi_escapes::strip_str(record.args().to_string());
        let _ = writeln!(writer, "{line}");
        let _ = writer.flush();
    }
}

/// Creates `<log_dir>/reelstitch_<command>_<timestamp>.log` and starts
/// copying every log record into it. Returns the file's path.
pub fn attach_log_file(log_dir: &Path, command: &str) -> CliResult<PathBuf> {
    fs::create_dir_all(log_dir).map_err(|e| {
        CoreError::PathError(format!(
            "Failed to create log directory '{}': {}",
            log_dir.display(),
            e
        ))
    })?;
    let path = log_dir.join(log_file_name(command));
    let file = File::create(&path)?;

    let mut guard = LOG_FILE
        .lock()
        .map_err(|_| CoreError::OperationFailed("Log file lock poisoned".to_string()))?;
    *guard = Some(BufWriter::new(file));
    Ok(path)
}

/// Flushes and closes the run log file, if any.
pub fn detach_log_file() {
    if let Ok(mut guard) = LOG_FILE.lock() {
        if let Some(mut writer) = guard.take() {
            let _ = writer.flush();
        }
    }
}

fn log_file_name(command: &str) -> String {
    format!("reelstitch_{}_{}.log", command, get_timestamp())
}

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}
