//! Expression tree for compiled payoffs.
//!
//! The grammar is a closed set of tagged variants: everything the
//! evaluator can execute is listed here, and nothing else can be
//! represented. Extending the language means adding a variant, which
//! forces every `match` in the validator and evaluator to be revisited.

/// A node in the payoff expression tree.
///
/// Trees are immutable and acyclic; they are built once per pricing
/// request and shared read-only across all simulation draws.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal, e.g. `0.5`, `1_000`, `2e-3`.
    Literal(f64),
    /// Identifier reference, resolved against the name environment.
    Name(String),
    /// Unary plus or minus.
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// Binary arithmetic operation.
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Comparison chain: `a < b <= c` keeps `a` and the list
    /// `[(<, b), (<=, c)]`.
    Compare {
        first: Box<Expr>,
        rest: Vec<(CmpOp, Expr)>,
    },
    /// Boolean combination: `a and b and c` keeps all operands flat.
    Bool {
        op: BoolOp,
        operands: Vec<Expr>,
    },
    /// Conditional expression `body if test else orelse`.
    Conditional {
        body: Box<Expr>,
        test: Box<Expr>,
        orelse: Box<Expr>,
    },
    /// Call of a built-in by name: `max(a, b)`. The callee is always a
    /// plain identifier; indirect calls are not representable.
    Call {
        function: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Human-readable name of the node kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Expr::Literal(_) => "literal",
            Expr::Name(_) => "name",
            Expr::Unary { .. } => "unary operation",
            Expr::Binary { .. } => "binary operation",
            Expr::Compare { .. } => "comparison",
            Expr::Bool { .. } => "boolean operation",
            Expr::Conditional { .. } => "conditional expression",
            Expr::Call { .. } => "function call",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `+x` (identity).
    Plus,
    /// `-x` (negation).
    Neg,
}

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    /// `//`: floor division.
    FloorDiv,
    /// `%`: floor modulo (result takes the sign of the divisor).
    Mod,
    /// `**`: right-associative power.
    Pow,
}

impl BinOp {
    /// The operator's source symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::FloorDiv => "//",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
        }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
}

/// Boolean combinators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(Expr::Literal(1.0).kind(), "literal");
        assert_eq!(Expr::Name("ST".to_string()).kind(), "name");
        let call = Expr::Call {
            function: "max".to_string(),
            args: vec![Expr::Literal(0.0)],
        };
        assert_eq!(call.kind(), "function call");
    }

    #[test]
    fn test_binop_symbols() {
        assert_eq!(BinOp::Pow.symbol(), "**");
        assert_eq!(BinOp::FloorDiv.symbol(), "//");
    }

    #[test]
    fn test_tree_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Expr>();
    }
}
