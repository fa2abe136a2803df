//! Name environment for payoff evaluation.
//!
//! Names resolve through three layers, later layers shadowing earlier
//! ones on collision:
//!
//! 1. built-in functions and constants (`abs`..`tan`, `pi`, `e`) — fixed
//!    for the process lifetime;
//! 2. request constants (`K`, `r`, `sigma`, `T`) — set once per pricing
//!    call;
//! 3. per-draw variables (`ST`) — rebound on every simulation draw.
//!
//! Nothing else is resolvable: there is no fallthrough to any host
//! capability.

use std::collections::HashMap;

use crate::error::EvalError;

/// The closed set of built-in functions.
///
/// Extending this set is a security-sensitive change; every addition
/// must keep [`Builtin::call`] total over its argument space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Abs,
    Max,
    Min,
    Exp,
    Log,
    Sqrt,
    Sin,
    Cos,
    Tan,
}

impl Builtin {
    /// Resolve a built-in by name. Names are case-sensitive.
    pub fn lookup(name: &str) -> Option<Builtin> {
        match name {
            "abs" => Some(Builtin::Abs),
            "max" => Some(Builtin::Max),
            "min" => Some(Builtin::Min),
            "exp" => Some(Builtin::Exp),
            "log" => Some(Builtin::Log),
            "sqrt" => Some(Builtin::Sqrt),
            "sin" => Some(Builtin::Sin),
            "cos" => Some(Builtin::Cos),
            "tan" => Some(Builtin::Tan),
            _ => None,
        }
    }

    /// The built-in's source-level name.
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Abs => "abs",
            Builtin::Max => "max",
            Builtin::Min => "min",
            Builtin::Exp => "exp",
            Builtin::Log => "log",
            Builtin::Sqrt => "sqrt",
            Builtin::Sin => "sin",
            Builtin::Cos => "cos",
            Builtin::Tan => "tan",
        }
    }

    /// Apply the built-in to evaluated arguments.
    ///
    /// Arity and domain violations are typed errors, and a non-finite
    /// result from finite arguments is a `Domain` overflow error rather
    /// than a silent infinity.
    pub fn call(&self, args: &[f64]) -> Result<f64, EvalError> {
        let value = match self {
            Builtin::Abs => self.unary(args)?.abs(),
            Builtin::Exp => self.unary(args)?.exp(),
            Builtin::Sin => self.unary(args)?.sin(),
            Builtin::Cos => self.unary(args)?.cos(),
            Builtin::Tan => self.unary(args)?.tan(),
            Builtin::Sqrt => {
                let x = self.unary(args)?;
                if x < 0.0 {
                    return Err(EvalError::Domain {
                        function: "sqrt",
                        message: format!("argument must be non-negative, got {x}"),
                    });
                }
                x.sqrt()
            }
            Builtin::Log => match args {
                [x] => {
                    let x = self.positive("log", *x)?;
                    x.ln()
                }
                [x, base] => {
                    let x = self.positive("log", *x)?;
                    let base = self.positive("log", *base)?;
                    if base == 1.0 {
                        return Err(EvalError::Domain {
                            function: "log",
                            message: "base must not be 1".to_string(),
                        });
                    }
                    x.ln() / base.ln()
                }
                _ => {
                    return Err(EvalError::Arity {
                        function: "log",
                        expected: "1 or 2",
                        got: args.len(),
                    })
                }
            },
            Builtin::Max => {
                self.at_least_two(args)?;
                args.iter().copied().fold(f64::NEG_INFINITY, f64::max)
            }
            Builtin::Min => {
                self.at_least_two(args)?;
                args.iter().copied().fold(f64::INFINITY, f64::min)
            }
        };

        if !value.is_finite() && args.iter().all(|a| a.is_finite()) {
            return Err(EvalError::Domain {
                function: self.name(),
                message: "result is not a finite number".to_string(),
            });
        }
        Ok(value)
    }

    fn unary(&self, args: &[f64]) -> Result<f64, EvalError> {
        match args {
            [x] => Ok(*x),
            _ => Err(EvalError::Arity {
                function: self.name(),
                expected: "1",
                got: args.len(),
            }),
        }
    }

    fn at_least_two(&self, args: &[f64]) -> Result<(), EvalError> {
        if args.len() < 2 {
            return Err(EvalError::Arity {
                function: self.name(),
                expected: "at least 2",
                got: args.len(),
            });
        }
        Ok(())
    }

    fn positive(&self, function: &'static str, x: f64) -> Result<f64, EvalError> {
        if x <= 0.0 {
            return Err(EvalError::Domain {
                function,
                message: format!("argument must be positive, got {x}"),
            });
        }
        Ok(x)
    }
}

/// What a name resolves to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Binding {
    /// A numeric value (constant or per-draw variable).
    Value(f64),
    /// A built-in function.
    Function(Builtin),
}

/// Layered name environment.
///
/// Built once per pricing call with the request constants; only the
/// per-draw variable layer is touched inside the simulation loop.
#[derive(Debug, Clone, Default)]
pub struct NameEnv {
    constants: HashMap<String, f64>,
    variables: HashMap<String, f64>,
}

impl NameEnv {
    /// An environment with built-ins only.
    pub fn new() -> Self {
        Self::default()
    }

    /// An environment with built-ins and the given constants layer.
    pub fn with_constants<I, S>(constants: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            constants: constants
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
            variables: HashMap::new(),
        }
    }

    /// Define (or overwrite) a constant.
    pub fn define(&mut self, name: impl Into<String>, value: f64) {
        self.constants.insert(name.into(), value);
    }

    /// Bind (or rebind) a per-draw variable.
    pub fn bind(&mut self, name: impl Into<String>, value: f64) {
        self.variables.insert(name.into(), value);
    }

    /// Resolve a name through the layers, innermost first.
    pub fn resolve(&self, name: &str) -> Option<Binding> {
        if let Some(&value) = self.variables.get(name) {
            return Some(Binding::Value(value));
        }
        if let Some(&value) = self.constants.get(name) {
            return Some(Binding::Value(value));
        }
        match name {
            "pi" => Some(Binding::Value(std::f64::consts::PI)),
            "e" => Some(Binding::Value(std::f64::consts::E)),
            _ => Builtin::lookup(name).map(Binding::Function),
        }
    }
}
