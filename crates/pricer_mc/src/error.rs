//! Error types for Monte Carlo pricing.
//!
//! Every failure mode of a pricing call resolves to a typed
//! [`PricingError`]; the core never logs and never panics on malformed
//! input. All variants are terminal for the call that raised them — no
//! retry, no partial result.

use payoff_lang::{CompileError, EvalError};
use thiserror::Error;

/// Pricing errors.
///
/// # Variants
/// - `InvalidParameter`: a request invariant is violated; raised before
///   any simulation work begins, never mid-loop
/// - `Compile`: the payoff expression was rejected (parse or grammar)
/// - `Evaluation`: a draw's payoff evaluation failed; aborts the whole
///   pricing call
/// - `NonFiniteResult`: the discounted mean is not a finite number
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PricingError {
    /// A request field violates its invariant.
    #[error("invalid parameter `{field}`: {message}")]
    InvalidParameter {
        /// The offending field.
        field: &'static str,
        /// Description of the violation.
        message: String,
    },

    /// The payoff expression failed to compile.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// A payoff evaluation failed during a draw.
    #[error("payoff evaluation failed: {0}")]
    Evaluation(#[from] EvalError),

    /// The simulation produced a non-finite price.
    #[error("simulation produced a non-finite price")]
    NonFiniteResult,
}
