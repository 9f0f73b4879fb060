// reelstitch-cli/src/lib.rs
//
// Library portion of the reelstitch CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod terminal;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, CompileArgs, RunArgs, ScheduleArgs, UploadArgs};
pub use commands::compile::run_compile;
pub use commands::run::run_all;
pub use commands::schedule::run_schedule;
pub use error::CliResult;
