// ============================================================================
// vidmorph-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Error types and utilities for the CLI
//
// The CLI reuses the core error type; this module adds a small extension
// trait for attaching path context to filesystem failures.
//
// KEY COMPONENTS:
// - CliResult: Type alias for CLI operations
// - PathContext: adds "what path" context to io-level errors

use vidmorph_core::{CoreError, CoreResult};

use std::fmt;

/// Type alias for CLI results using CoreError.
pub type CliResult<T> = CoreResult<T>;

/// Adds context to errors raised while touching paths.
pub trait PathContext<T> {
    fn path_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display;
}

impl<T, E> PathContext<T> for Result<T, E>
where
    E: Into<CoreError>,
{
    fn path_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.map_err(|e| {
            let core_error: CoreError = e.into();
            CoreError::PathError(format!("{context}: {core_error}"))
        })
    }
}

impl<T> PathContext<T> for Option<T> {
    fn path_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.ok_or_else(|| CoreError::PathError(context.to_string()))
    }
}
