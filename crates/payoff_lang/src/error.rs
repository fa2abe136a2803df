//! Error types for the payoff expression language.
//!
//! This module provides:
//! - `CompileError`: errors raised while turning source text into a
//!   validated expression tree
//! - `EvalError`: errors raised while reducing a compiled tree to a number

use thiserror::Error;

/// Errors raised during compilation (lexing, parsing, validation).
///
/// Compilation never evaluates anything, so these errors are always
/// produced before the first draw of a simulation.
///
/// # Variants
/// - `Parse`: the text is not a syntactically valid expression
/// - `UnsupportedElement`: the text parses as a construct outside the
///   closed grammar (attribute access, assignment, lambda, ...)
///
/// # Examples
/// ```
/// use payoff_lang::compile_payoff;
/// use payoff_lang::error::CompileError;
///
/// let err = compile_payoff("max(ST - K,").unwrap_err();
/// assert!(matches!(err, CompileError::Parse { .. }));
///
/// let err = compile_payoff("__import__.os").unwrap_err();
/// assert!(matches!(err, CompileError::UnsupportedElement { .. }));
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CompileError {
    /// The source text is not a syntactically valid expression.
    #[error("parse error: {message} in `{source_text}`")]
    Parse {
        /// What went wrong, with a byte position where useful.
        message: String,
        /// The offending source text.
        source_text: String,
    },

    /// The source uses a syntax construct outside the closed grammar.
    #[error("unsupported expression element: {kind}")]
    UnsupportedElement {
        /// Human-readable name of the rejected construct.
        kind: &'static str,
    },
}

/// Errors raised while evaluating a compiled expression.
///
/// Any of these aborts the pricing call that triggered the evaluation;
/// there is no partial result.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EvalError {
    /// The expression references a name not present in the environment.
    #[error("unknown name `{name}`")]
    UnknownName {
        /// The unresolved identifier.
        name: String,
    },

    /// Division (or floor division, modulo, zero to a negative power)
    /// with a zero divisor.
    #[error("division by zero")]
    DivisionByZero,

    /// An argument outside a function's mathematical domain, or an
    /// operation whose finite inputs produced a non-finite result.
    #[error("domain error in `{function}`: {message}")]
    Domain {
        /// The operator or built-in that failed.
        function: &'static str,
        /// Description of the violation.
        message: String,
    },

    /// A built-in was called with the wrong number of arguments.
    #[error("`{function}` expects {expected} argument(s), got {got}")]
    Arity {
        /// The built-in name.
        function: &'static str,
        /// Description of the accepted argument count.
        expected: &'static str,
        /// The number of arguments supplied.
        got: usize,
    },

    /// A numeric binding was called like a function.
    #[error("`{name}` is not callable")]
    NotCallable {
        /// The name that was called.
        name: String,
    },

    /// A built-in function was used where a number was required.
    #[error("`{name}` is a function, not a value")]
    FunctionAsValue {
        /// The function name.
        name: String,
    },
}
