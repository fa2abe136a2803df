//! # Payoff Expression Language (Layer L: Language)
//!
//! A closed-grammar expression language for user-supplied derivative
//! payoffs, safe to evaluate against untrusted input.
//!
//! ## Pipeline
//!
//! ```text
//! source text
//!   └── lexer      (spanned tokens)
//!        └── parser     (closed tagged-variant tree, nothing evaluated)
//!             └── validate   (complete pre-pass over every node)
//!                  └── CompiledPayoff::eval  (pure tree walk, per draw)
//! ```
//!
//! ## Security model
//!
//! Two independent layers, because either alone is insufficient:
//!
//! 1. **Syntax whitelist** — the [`ast::Expr`] variant set is the
//!    grammar. Attribute access, subscripts, containers, strings,
//!    assignment, lambdas and imports are not representable; the parser
//!    rejects them with a named [`error::CompileError::UnsupportedElement`].
//! 2. **Name whitelist** — at evaluation time, only the built-ins
//!    (`abs, max, min, exp, log, sqrt, sin, cos, tan`, constants
//!    `pi, e`), the request constants and the per-draw variable resolve.
//!    Everything else is [`error::EvalError::UnknownName`]; there is no
//!    fallthrough to any host capability.
//!
//! ## Usage
//!
//! ```
//! use payoff_lang::{compile_payoff, NameEnv};
//!
//! let payoff = compile_payoff("max(ST - K, 0)").unwrap();
//! let mut env = NameEnv::with_constants([("K", 100.0)]);
//! env.bind("ST", 110.0);
//! assert_eq!(payoff.eval(&env).unwrap(), 10.0);
//! ```

pub mod ast;
pub mod env;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod validate;

pub use env::{Binding, Builtin, NameEnv};
pub use error::{CompileError, EvalError};
pub use eval::{compile_payoff, CompiledPayoff};
