//! Error plumbing for the commands.
//!
//! Commands return reelstitch-core's error type directly; the extension
//! trait here prefixes the step that failed.

use reelstitch_core::{CoreError, CoreResult};

use std::fmt;

/// Result of a command.
pub type CliResult<T> = CoreResult<T>;

/// Prefixes an error with the step that produced it.
///
/// Context is added only to errors that are not already self-describing
/// preconditions, so messages such as "No source clips found" reach the
/// user unchanged.
pub trait CliErrorContext<T> {
    /// `f` runs only when the result is an error.
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: Into<CoreError>,
{
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| {
            let core_error: CoreError = e.into();
            if core_error.is_precondition() {
                core_error
            } else {
                CoreError::OperationFailed(format!("{}: {}", f(), core_error))
            }
        })
    }
}
