//! Pre-evaluation validation of expression trees.
//!
//! The variant set of [`Expr`] is the grammar whitelist: the parser can
//! only construct nodes listed there. `Expr` is a public type though, so
//! trees may also be built programmatically, and the evaluator must
//! never see a tree that violates the structural invariants the type
//! system cannot express. [`validate`] runs as a complete pass over the
//! finished tree before any evaluation is attempted; it is the same
//! gate for parsed and hand-built trees.

use crate::ast::Expr;
use crate::error::CompileError;

/// Maximum nesting depth of an expression tree.
///
/// Bounds recursion in both the parser and the evaluator.
pub const MAX_DEPTH: usize = 200;

/// Maximum number of arguments in a single call.
pub const MAX_CALL_ARGS: usize = 32;

/// Walk every node of the tree and check it against the grammar.
///
/// Returns the first violation as a [`CompileError::UnsupportedElement`]
/// naming the offending shape. Evaluation is never attempted on a tree
/// that has not passed this check.
pub fn validate(expr: &Expr) -> Result<(), CompileError> {
    check(expr, 0)
}

fn check(expr: &Expr, depth: usize) -> Result<(), CompileError> {
    if depth > MAX_DEPTH {
        return Err(CompileError::UnsupportedElement {
            kind: "expression nested beyond depth limit",
        });
    }

    // Exhaustive on purpose: adding a variant to `Expr` must fail to
    // compile until this gate decides how to treat it.
    match expr {
        Expr::Literal(_) | Expr::Name(_) => Ok(()),
        Expr::Unary { operand, .. } => check(operand, depth + 1),
        Expr::Binary { lhs, rhs, .. } => {
            check(lhs, depth + 1)?;
            check(rhs, depth + 1)
        }
        Expr::Compare { first, rest } => {
            if rest.is_empty() {
                return Err(CompileError::UnsupportedElement {
                    kind: "comparison without operands",
                });
            }
            check(first, depth + 1)?;
            for (_, operand) in rest {
                check(operand, depth + 1)?;
            }
            Ok(())
        }
        Expr::Bool { operands, .. } => {
            if operands.len() < 2 {
                return Err(CompileError::UnsupportedElement {
                    kind: "boolean operation with fewer than two operands",
                });
            }
            for operand in operands {
                check(operand, depth + 1)?;
            }
            Ok(())
        }
        Expr::Conditional { body, test, orelse } => {
            check(body, depth + 1)?;
            check(test, depth + 1)?;
            check(orelse, depth + 1)
        }
        Expr::Call { args, .. } => {
            if args.len() > MAX_CALL_ARGS {
                return Err(CompileError::UnsupportedElement {
                    kind: "call with too many arguments",
                });
            }
            for arg in args {
                check(arg, depth + 1)?;
            }
            Ok(())
        }
    }
}
