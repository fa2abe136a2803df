//! CLI error type.

use thiserror::Error;

/// Result alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors surfaced to the terminal.
///
/// Core errors pass through transparently so the user sees the typed
/// message the pricer produced.
#[derive(Debug, Error)]
pub enum CliError {
    /// A command-line argument was malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The pricing call failed.
    #[error(transparent)]
    Pricing(#[from] pricer_mc::PricingError),

    /// The payoff expression was rejected.
    #[error(transparent)]
    Compile(#[from] payoff_lang::CompileError),
}
