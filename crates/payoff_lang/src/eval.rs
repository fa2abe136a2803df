//! Tree-walking evaluator for compiled payoff expressions.
//!
//! Evaluation is pure: a compiled payoff can be evaluated any number of
//! times against different bindings without re-validation, and identical
//! bindings produce bit-identical results. All arithmetic is IEEE-754
//! double precision.
//!
//! Numeric edge cases are typed errors, not silent special values:
//! - any zero divisor (`/`, `//`, `%`, `0 ** negative`) is
//!   [`EvalError::DivisionByZero`];
//! - a negative base with a fractional exponent is a `Domain` error;
//! - `**` overflowing to infinity from finite operands is a `Domain`
//!   error (plain `+ - *` stay IEEE and are caught by the pricer's
//!   final finiteness check).
//!
//! Truthiness is non-zero. `and`/`or` short-circuit and yield the
//! deciding operand's value; comparison chains yield 0.0 or 1.0 and
//! stop at the first failing link.

use crate::ast::{BinOp, BoolOp, CmpOp, Expr, UnaryOp};
use crate::env::{Binding, NameEnv};
use crate::error::{CompileError, EvalError};
use crate::parser;
use crate::validate;

/// A parsed and validated payoff expression, ready to evaluate.
///
/// Immutable and `Send + Sync`: one compiled payoff is shared read-only
/// across every draw of a pricing call, and across worker threads.
///
/// # Examples
/// ```
/// use payoff_lang::{compile_payoff, NameEnv};
///
/// let payoff = compile_payoff("max(ST - K, 0)").unwrap();
/// let mut env = NameEnv::with_constants([("K", 100.0)]);
///
/// env.bind("ST", 112.5);
/// assert_eq!(payoff.eval(&env).unwrap(), 12.5);
///
/// env.bind("ST", 95.0);
/// assert_eq!(payoff.eval(&env).unwrap(), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPayoff {
    tree: Expr,
}

/// Compile payoff source text: parse, then validate the whole tree.
///
/// Nothing is evaluated; a rejected expression can never have run.
///
/// # Errors
/// - [`CompileError::Parse`] when the text is not a valid expression
/// - [`CompileError::UnsupportedElement`] when it uses a construct
///   outside the closed grammar
pub fn compile_payoff(source: &str) -> Result<CompiledPayoff, CompileError> {
    let tree = parser::parse(source)?;
    validate::validate(&tree)?;
    Ok(CompiledPayoff { tree })
}

impl CompiledPayoff {
    /// Wrap a programmatically-built tree, running the same validation
    /// gate as [`compile_payoff`].
    pub fn from_tree(tree: Expr) -> Result<Self, CompileError> {
        validate::validate(&tree)?;
        Ok(Self { tree })
    }

    /// Evaluate against the given environment.
    pub fn eval(&self, env: &NameEnv) -> Result<f64, EvalError> {
        eval_expr(&self.tree, env)
    }

    /// The underlying expression tree.
    pub fn tree(&self) -> &Expr {
        &self.tree
    }
}

fn eval_expr(expr: &Expr, env: &NameEnv) -> Result<f64, EvalError> {
    match expr {
        Expr::Literal(value) => Ok(*value),

        Expr::Name(name) => match env.resolve(name) {
            Some(Binding::Value(value)) => Ok(value),
            Some(Binding::Function(_)) => Err(EvalError::FunctionAsValue { name: name.clone() }),
            None => Err(EvalError::UnknownName { name: name.clone() }),
        },

        Expr::Unary { op, operand } => {
            let value = eval_expr(operand, env)?;
            Ok(match op {
                UnaryOp::Plus => value,
                UnaryOp::Neg => -value,
            })
        }

        Expr::Binary { op, lhs, rhs } => {
            let l = eval_expr(lhs, env)?;
            let r = eval_expr(rhs, env)?;
            eval_binop(*op, l, r)
        }

        Expr::Compare { first, rest } => {
            let mut left = eval_expr(first, env)?;
            for (op, operand) in rest {
                let right = eval_expr(operand, env)?;
                if !compare(*op, left, right) {
                    return Ok(0.0);
                }
                left = right;
            }
            Ok(1.0)
        }

        Expr::Bool { op, operands } => {
            // Short-circuit, yielding the deciding operand's value:
            // `and` returns the first falsy operand, `or` the first
            // truthy one, else the last operand either way.
            let (last, rest) = operands.split_last().expect("validated non-empty");
            for operand in rest {
                let value = eval_expr(operand, env)?;
                match op {
                    BoolOp::And if !truthy(value) => return Ok(value),
                    BoolOp::Or if truthy(value) => return Ok(value),
                    _ => {}
                }
            }
            eval_expr(last, env)
        }

        Expr::Conditional { body, test, orelse } => {
            if truthy(eval_expr(test, env)?) {
                eval_expr(body, env)
            } else {
                eval_expr(orelse, env)
            }
        }

        Expr::Call { function, args } => match env.resolve(function) {
            Some(Binding::Function(builtin)) => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(eval_expr(arg, env)?);
                }
                builtin.call(&values)
            }
            Some(Binding::Value(_)) => Err(EvalError::NotCallable {
                name: function.clone(),
            }),
            None => Err(EvalError::UnknownName {
                name: function.clone(),
            }),
        },
    }
}

fn eval_binop(op: BinOp, l: f64, r: f64) -> Result<f64, EvalError> {
    match op {
        BinOp::Add => Ok(l + r),
        BinOp::Sub => Ok(l - r),
        BinOp::Mul => Ok(l * r),
        BinOp::Div => {
            if r == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok(l / r)
        }
        BinOp::FloorDiv => {
            if r == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok((l / r).floor())
        }
        BinOp::Mod => {
            if r == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            // Floor modulo: result takes the sign of the divisor, so
            // l == r * (l // r) + l % r holds.
            Ok(l - r * (l / r).floor())
        }
        BinOp::Pow => {
            if l == 0.0 && r < 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            if l < 0.0 && r.fract() != 0.0 {
                return Err(EvalError::Domain {
                    function: "**",
                    message: format!("negative base {l} with fractional exponent {r}"),
                });
            }
            let value = l.powf(r);
            if !value.is_finite() && l.is_finite() && r.is_finite() {
                return Err(EvalError::Domain {
                    function: "**",
                    message: "result is not a finite number".to_string(),
                });
            }
            Ok(value)
        }
    }
}

fn compare(op: CmpOp, l: f64, r: f64) -> bool {
    match op {
        CmpOp::Gt => l > r,
        CmpOp::Ge => l >= r,
        CmpOp::Lt => l < r,
        CmpOp::Le => l <= r,
        CmpOp::Eq => l == r,
        CmpOp::Ne => l != r,
    }
}

/// Non-zero is truthy; NaN compares unequal to zero and is truthy.
fn truthy(value: f64) -> bool {
    value != 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn eval(source: &str) -> Result<f64, EvalError> {
        eval_with(source, NameEnv::new())
    }

    fn eval_with(source: &str, env: NameEnv) -> Result<f64, EvalError> {
        compile_payoff(source).unwrap().eval(&env)
    }

    fn standard_env(st: f64) -> NameEnv {
        let mut env = NameEnv::with_constants([
            ("K", 100.0),
            ("r", 0.05),
            ("sigma", 0.2),
            ("T", 1.0),
        ]);
        env.bind("ST", st);
        env
    }

    // ==========================================================
    // Arithmetic and precedence
    // ==========================================================

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("1 + 2 * 3").unwrap(), 7.0);
        assert_eq!(eval("(1 + 2) * 3").unwrap(), 9.0);
        assert_eq!(eval("2 ** 10").unwrap(), 1024.0);
        assert_eq!(eval("2 ** -2").unwrap(), 0.25);
        assert_eq!(eval("-2 ** 2").unwrap(), -4.0);
        assert_eq!(eval("7 // 2").unwrap(), 3.0);
        assert_eq!(eval("7.5 % 2").unwrap(), 1.5);
    }

    #[test]
    fn test_floor_division_and_modulo_identity() {
        // l == r * (l // r) + l % r, with the remainder taking the sign
        // of the divisor.
        for (l, r) in [(7.0, 2.0), (-7.0, 2.0), (7.0, -2.0), (-7.0, -2.0), (5.0, -3.0)] {
            let env = NameEnv::with_constants([("a", l), ("b", r)]);
            let q = eval_with("a // b", env.clone()).unwrap();
            let m = eval_with("a % b", env).unwrap();
            assert_relative_eq!(l, r * q + m, epsilon = 1e-12);
            assert!(m == 0.0 || (m > 0.0) == (r > 0.0), "l={l} r={r} m={m}");
        }
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(eval("1 / 0").unwrap_err(), EvalError::DivisionByZero);
        assert_eq!(eval("1 // 0").unwrap_err(), EvalError::DivisionByZero);
        assert_eq!(eval("1 % 0").unwrap_err(), EvalError::DivisionByZero);
        assert_eq!(eval("0 ** -1").unwrap_err(), EvalError::DivisionByZero);
    }

    #[test]
    fn test_pow_negative_base_fractional_exponent() {
        assert!(matches!(
            eval("(-8) ** 0.5").unwrap_err(),
            EvalError::Domain { function: "**", .. }
        ));
        // Integral exponents on a negative base are fine.
        assert_eq!(eval("(-2) ** 3").unwrap(), -8.0);
    }

    #[test]
    fn test_pow_overflow_is_domain_error() {
        assert!(matches!(
            eval("10 ** 400").unwrap_err(),
            EvalError::Domain { function: "**", .. }
        ));
    }

    // ==========================================================
    // Names and containment
    // ==========================================================

    #[test]
    fn test_unknown_name() {
        let err = eval_with("S0 - K", standard_env(100.0)).unwrap_err();
        assert_eq!(err, EvalError::UnknownName { name: "S0".to_string() });
    }

    #[test]
    fn test_unknown_function() {
        let err = eval("floor(1.5)").unwrap_err();
        assert_eq!(err, EvalError::UnknownName { name: "floor".to_string() });
    }

    #[test]
    fn test_constant_is_not_callable() {
        let err = eval_with("K(1)", standard_env(100.0)).unwrap_err();
        assert_eq!(err, EvalError::NotCallable { name: "K".to_string() });
    }

    #[test]
    fn test_function_as_value() {
        let err = eval("max + 1").unwrap_err();
        assert_eq!(err, EvalError::FunctionAsValue { name: "max".to_string() });
    }

    #[test]
    fn test_builtin_constants() {
        assert_relative_eq!(eval("pi").unwrap(), std::f64::consts::PI);
        assert_relative_eq!(eval("exp(1) - e").unwrap(), 0.0, epsilon = 1e-12);
    }

    // ==========================================================
    // Comparisons, boolean ops, conditionals
    // ==========================================================

    #[test]
    fn test_comparisons_yield_zero_or_one() {
        assert_eq!(eval("3 > 2").unwrap(), 1.0);
        assert_eq!(eval("3 < 2").unwrap(), 0.0);
        assert_eq!(eval("(3 > 2) + (2 >= 2)").unwrap(), 2.0);
        assert_eq!(eval("1 != 2").unwrap(), 1.0);
    }

    #[test]
    fn test_chained_comparison() {
        assert_eq!(eval("1 < 2 < 3").unwrap(), 1.0);
        assert_eq!(eval("1 < 3 < 2").unwrap(), 0.0);
        assert_eq!(eval("3 > 2 > 1 > 0").unwrap(), 1.0);
    }

    #[test]
    fn test_chained_comparison_short_circuits() {
        // The failing link stops the chain before the division runs.
        assert_eq!(eval("2 < 1 < 1 / 0").unwrap(), 0.0);
    }

    #[test]
    fn test_bool_ops_return_operand_value() {
        assert_eq!(eval("2 and 3").unwrap(), 3.0);
        assert_eq!(eval("0 and 3").unwrap(), 0.0);
        assert_eq!(eval("2 or 3").unwrap(), 2.0);
        assert_eq!(eval("0 or 3").unwrap(), 3.0);
        assert_eq!(eval("0 or 0").unwrap(), 0.0);
    }

    #[test]
    fn test_bool_ops_short_circuit() {
        assert_eq!(eval("0 and 1 / 0").unwrap(), 0.0);
        assert_eq!(eval("2 or 1 / 0").unwrap(), 2.0);
        assert_eq!(eval("1 and 1 / 0").unwrap_err(), EvalError::DivisionByZero);
    }

    #[test]
    fn test_conditional_is_lazy() {
        assert_eq!(eval("1 if 1 else 1 / 0").unwrap(), 1.0);
        assert_eq!(eval("1 / 0 if 0 else 2").unwrap(), 2.0);
    }

    // ==========================================================
    // Payoff shapes
    // ==========================================================

    #[test]
    fn test_vanilla_call_payoff() {
        let payoff = compile_payoff("max(ST - K, 0)").unwrap();
        assert_eq!(payoff.eval(&standard_env(112.5)).unwrap(), 12.5);
        assert_eq!(payoff.eval(&standard_env(88.0)).unwrap(), 0.0);
    }

    #[test]
    fn test_digital_payoff() {
        let payoff = compile_payoff("1 if ST > K else 0").unwrap();
        assert_eq!(payoff.eval(&standard_env(101.0)).unwrap(), 1.0);
        assert_eq!(payoff.eval(&standard_env(99.0)).unwrap(), 0.0);
    }

    #[test]
    fn test_straddle_payoff() {
        let payoff = compile_payoff("abs(ST - K)").unwrap();
        assert_eq!(payoff.eval(&standard_env(90.0)).unwrap(), 10.0);
        assert_eq!(payoff.eval(&standard_env(110.0)).unwrap(), 10.0);
    }

    #[test]
    fn test_payoff_using_all_constants() {
        let payoff = compile_payoff("max(ST - K, 0) * exp(-r * T) * (sigma > 0)").unwrap();
        let value = payoff.eval(&standard_env(110.0)).unwrap();
        assert_relative_eq!(value, 10.0 * (-0.05_f64).exp(), epsilon = 1e-12);
    }

    // ==========================================================
    // Purity and idempotence
    // ==========================================================

    #[test]
    fn test_idempotent_compilation() {
        let source = "max(ST - K, 0) + sin(ST / K) ** 2";
        let a = compile_payoff(source).unwrap();
        let b = compile_payoff(source).unwrap();
        assert_eq!(a, b);

        for st in [80.0, 100.0, 123.456, 1e-9] {
            let env = standard_env(st);
            let va = a.eval(&env).unwrap();
            let vb = b.eval(&env).unwrap();
            assert_eq!(va.to_bits(), vb.to_bits());
        }
    }

    #[test]
    fn test_eval_is_repeatable_without_revalidation() {
        let payoff = compile_payoff("max(ST - K, 0)").unwrap();
        let env = standard_env(104.0);
        let first = payoff.eval(&env).unwrap();
        for _ in 0..100 {
            assert_eq!(payoff.eval(&env).unwrap().to_bits(), first.to_bits());
        }
    }

    #[test]
    fn test_from_tree_runs_validation() {
        use crate::ast::BoolOp;
        let bad = Expr::Bool {
            op: BoolOp::And,
            operands: vec![],
        };
        assert!(CompiledPayoff::from_tree(bad).is_err());
    }
}
