//! Parser for payoff expressions.
//!
//! Recursive descent with one function per precedence level, loosest to
//! tightest: conditional (`a if c else b`) → `or` → `and` → comparison
//! chains → `+ -` → `* / // %` → unary `+ -` → `**` → primary. Nothing
//! is evaluated while parsing.
//!
//! Constructs the token stream can express but the grammar refuses
//! (attribute access, subscripts, containers, strings, assignment,
//! `lambda`, `not`, indirect calls) fail with a named
//! [`CompileError::UnsupportedElement`], so hostile input is reported as
//! a rejected construct rather than a generic syntax error.

use crate::ast::{BinOp, BoolOp, CmpOp, Expr, UnaryOp};
use crate::error::CompileError;
use crate::lexer::{tokenize, Token, TokenKind};
use crate::validate::MAX_DEPTH;

/// Parser state wrapping a token stream.
struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    source: &'a str,
    depth: usize,
}

/// Parse expression source text into an [`Expr`] tree.
pub fn parse(source: &str) -> Result<Expr, CompileError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser::new(tokens, source);

    if parser.peek().is_none() {
        return Err(parser.error("empty expression"));
    }

    let expr = parser.parse_conditional()?;

    // A complete expression must consume every token; what follows one
    // tells us which statement-level construct the caller attempted.
    match parser.peek_kind() {
        None => Ok(expr),
        Some(TokenKind::Assign) => Err(unsupported("assignment")),
        Some(TokenKind::Semicolon) => Err(unsupported("statement sequence")),
        Some(TokenKind::Comma) => Err(unsupported("tuple")),
        Some(kind) => {
            let kind = kind.clone();
            Err(parser.error(&format!("unexpected trailing {kind:?}")))
        }
    }
}

fn unsupported(kind: &'static str) -> CompileError {
    CompileError::UnsupportedElement { kind }
}

impl<'a> Parser<'a> {
    fn new(tokens: Vec<Token>, source: &'a str) -> Self {
        Self {
            tokens,
            pos: 0,
            source,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn advance(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &TokenKind) -> Result<(), CompileError> {
        match self.peek() {
            Some(tok) if &tok.kind == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(tok) => {
                let message =
                    format!("expected {expected:?}, got {:?} at position {}", tok.kind, tok.span.start);
                Err(self.error(&message))
            }
            None => Err(self.error(&format!("expected {expected:?}, got end of input"))),
        }
    }

    fn error(&self, message: &str) -> CompileError {
        CompileError::Parse {
            message: message.to_string(),
            source_text: self.source.to_string(),
        }
    }

    /// Recursion guard shared by the two self-recursive entry points.
    fn enter(&mut self) -> Result<(), CompileError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error(&format!("expression nests deeper than {MAX_DEPTH} levels")));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    // --- Precedence levels, loosest first ---

    fn parse_conditional(&mut self) -> Result<Expr, CompileError> {
        self.enter()?;
        let body = self.parse_or()?;
        let expr = if matches!(self.peek_kind(), Some(TokenKind::If)) {
            self.advance();
            let test = self.parse_or()?;
            self.expect(&TokenKind::Else)?;
            // Right-associative: `a if p else b if q else c` groups the
            // trailing conditional into the else branch.
            let orelse = self.parse_conditional()?;
            Expr::Conditional {
                body: Box::new(body),
                test: Box::new(test),
                orelse: Box::new(orelse),
            }
        } else {
            body
        };
        self.leave();
        Ok(expr)
    }

    fn parse_or(&mut self) -> Result<Expr, CompileError> {
        let first = self.parse_and()?;
        if !matches!(self.peek_kind(), Some(TokenKind::Or)) {
            return Ok(first);
        }
        let mut operands = vec![first];
        while matches!(self.peek_kind(), Some(TokenKind::Or)) {
            self.advance();
            operands.push(self.parse_and()?);
        }
        Ok(Expr::Bool {
            op: BoolOp::Or,
            operands,
        })
    }

    fn parse_and(&mut self) -> Result<Expr, CompileError> {
        let first = self.parse_not()?;
        if !matches!(self.peek_kind(), Some(TokenKind::And)) {
            return Ok(first);
        }
        let mut operands = vec![first];
        while matches!(self.peek_kind(), Some(TokenKind::And)) {
            self.advance();
            operands.push(self.parse_not()?);
        }
        Ok(Expr::Bool {
            op: BoolOp::And,
            operands,
        })
    }

    fn parse_not(&mut self) -> Result<Expr, CompileError> {
        if matches!(self.peek_kind(), Some(TokenKind::Not)) {
            return Err(unsupported("boolean not"));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, CompileError> {
        let first = self.parse_additive()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Gt) => CmpOp::Gt,
                Some(TokenKind::Ge) => CmpOp::Ge,
                Some(TokenKind::Lt) => CmpOp::Lt,
                Some(TokenKind::Le) => CmpOp::Le,
                Some(TokenKind::EqEq) => CmpOp::Eq,
                Some(TokenKind::Ne) => CmpOp::Ne,
                _ => break,
            };
            self.advance();
            rest.push((op, self.parse_additive()?));
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare {
                first: Box::new(first),
                rest,
            })
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Plus) => BinOp::Add,
                Some(TokenKind::Minus) => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = Expr::Binary {
                op,
                lhs: Box::new(left),
                rhs: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Star) => BinOp::Mul,
                Some(TokenKind::Slash) => BinOp::Div,
                Some(TokenKind::DoubleSlash) => BinOp::FloorDiv,
                Some(TokenKind::Percent) => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                lhs: Box::new(left),
                rhs: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, CompileError> {
        self.enter()?;
        let expr = match self.peek_kind() {
            Some(TokenKind::Plus) => {
                self.advance();
                Expr::Unary {
                    op: UnaryOp::Plus,
                    operand: Box::new(self.parse_unary()?),
                }
            }
            Some(TokenKind::Minus) => {
                self.advance();
                Expr::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(self.parse_unary()?),
                }
            }
            _ => self.parse_power()?,
        };
        self.leave();
        Ok(expr)
    }

    fn parse_power(&mut self) -> Result<Expr, CompileError> {
        let base = self.parse_primary()?;
        if matches!(self.peek_kind(), Some(TokenKind::DoubleStar)) {
            self.advance();
            // `**` is right-associative and its exponent admits a sign:
            // `2 ** -3` parses, and `-x ** 2` is `-(x ** 2)`.
            let exponent = self.parse_unary()?;
            return Ok(Expr::Binary {
                op: BinOp::Pow,
                lhs: Box::new(base),
                rhs: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, CompileError> {
        let expr = match self.peek_kind() {
            Some(TokenKind::Number(n)) => {
                let n = *n;
                self.advance();
                Expr::Literal(n)
            }
            Some(TokenKind::Ident(name)) => {
                let name = name.clone();
                self.advance();
                if matches!(self.peek_kind(), Some(TokenKind::LParen)) {
                    let args = self.parse_call_args()?;
                    Expr::Call {
                        function: name,
                        args,
                    }
                } else {
                    Expr::Name(name)
                }
            }
            Some(TokenKind::LParen) => {
                self.advance();
                let inner = self.parse_conditional()?;
                self.expect(&TokenKind::RParen)?;
                inner
            }
            Some(TokenKind::Str) => return Err(unsupported("string literal")),
            Some(TokenKind::Lambda) => return Err(unsupported("lambda")),
            Some(TokenKind::Import) => return Err(unsupported("import")),
            Some(TokenKind::Not) => return Err(unsupported("boolean not")),
            Some(TokenKind::LBracket) => return Err(unsupported("list literal")),
            Some(TokenKind::LBrace) => return Err(unsupported("dict or set literal")),
            Some(kind) => {
                let message = format!("expected expression, got {kind:?}");
                return Err(self.error(&message));
            }
            None => return Err(self.error("unexpected end of input")),
        };

        // Postfix surface the grammar refuses. A `(` here can only follow
        // a call result or a parenthesized expression, since the
        // name-call form was consumed above.
        match self.peek_kind() {
            Some(TokenKind::Dot) => Err(unsupported("attribute access")),
            Some(TokenKind::LBracket) => Err(unsupported("subscript")),
            Some(TokenKind::LParen) => Err(unsupported("call of a non-name expression")),
            _ => Ok(expr),
        }
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expr>, CompileError> {
        self.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();

        if matches!(self.peek_kind(), Some(TokenKind::RParen)) {
            self.advance();
            return Ok(args);
        }

        loop {
            args.push(self.parse_conditional()?);
            match self.peek_kind() {
                Some(TokenKind::Comma) => {
                    self.advance();
                    // Trailing comma before the closing paren is fine.
                    if matches!(self.peek_kind(), Some(TokenKind::RParen)) {
                        self.advance();
                        return Ok(args);
                    }
                }
                Some(TokenKind::RParen) => {
                    self.advance();
                    return Ok(args);
                }
                Some(kind) => {
                    let message = format!("expected `,` or `)` in call arguments, got {kind:?}");
                    return Err(self.error(&message));
                }
                None => return Err(self.error("unexpected end of input in call arguments")),
            }
        }
    }
}
