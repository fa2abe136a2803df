//! Lexer for payoff expression source text.
//!
//! Scans a single expression into spanned tokens. Characters that the
//! wider grammar family uses but this language rejects (`.` for
//! attribute access, `[`/`{` for containers, `=` for assignment, string
//! quotes, `;`) are still tokenized, so the parser can refuse them with
//! a named `UnsupportedElement` error instead of a generic syntax error.

use crate::error::CompileError;

/// Source span in byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Token types.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Number(f64),
    Str,

    // Identifiers and keywords
    Ident(String),
    If,
    Else,
    And,
    Or,
    Not,
    Lambda,
    Import,

    // Punctuation
    LParen,
    RParen,
    Comma,

    // Operators
    Plus,
    Minus,
    Star,
    DoubleStar, // **
    Slash,
    DoubleSlash, // //
    Percent,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    Ne,

    // Recognised only to be rejected by the parser
    Assign,   // =
    Dot,      // .
    LBracket, // [
    RBracket, // ]
    LBrace,   // {
    RBrace,   // }
    Colon,
    Semicolon,
}

/// Tokenize expression source into a vector of tokens.
pub fn tokenize(source: &str) -> Result<Vec<Token>, CompileError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let ch = bytes[pos];

        // Skip whitespace.
        if ch == b' ' || ch == b'\t' || ch == b'\n' || ch == b'\r' {
            pos += 1;
            continue;
        }

        let start = pos;

        // String literal: scanned whole so the parser can name it.
        if ch == b'"' || ch == b'\'' {
            let end = lex_string(source, pos)?;
            tokens.push(Token {
                kind: TokenKind::Str,
                span: Span::new(start, end),
            });
            pos = end;
            continue;
        }

        // Number literal. A leading `.` is part of a number only when a
        // digit follows; otherwise it lexes as `Dot`.
        if ch.is_ascii_digit()
            || (ch == b'.' && pos + 1 < bytes.len() && bytes[pos + 1].is_ascii_digit())
        {
            let (num, end) = lex_number(source, pos)?;
            tokens.push(Token {
                kind: TokenKind::Number(num),
                span: Span::new(start, end),
            });
            pos = end;
            continue;
        }

        // Identifier or keyword.
        if ch.is_ascii_alphabetic() || ch == b'_' {
            let end = lex_ident_end(source, pos);
            let word = &source[pos..end];
            let kind = match word {
                "if" => TokenKind::If,
                "else" => TokenKind::Else,
                "and" => TokenKind::And,
                "or" => TokenKind::Or,
                "not" => TokenKind::Not,
                "lambda" => TokenKind::Lambda,
                "import" => TokenKind::Import,
                _ => TokenKind::Ident(word.to_string()),
            };
            tokens.push(Token {
                kind,
                span: Span::new(start, end),
            });
            pos = end;
            continue;
        }

        // Two-character operators.
        if pos + 1 < bytes.len() {
            let two = &source[pos..pos + 2];
            let kind = match two {
                "**" => Some(TokenKind::DoubleStar),
                "//" => Some(TokenKind::DoubleSlash),
                "<=" => Some(TokenKind::Le),
                ">=" => Some(TokenKind::Ge),
                "==" => Some(TokenKind::EqEq),
                "!=" => Some(TokenKind::Ne),
                _ => None,
            };
            if let Some(kind) = kind {
                tokens.push(Token {
                    kind,
                    span: Span::new(start, pos + 2),
                });
                pos += 2;
                continue;
            }
        }

        // Single-character tokens.
        let kind = match ch {
            b'(' => Some(TokenKind::LParen),
            b')' => Some(TokenKind::RParen),
            b',' => Some(TokenKind::Comma),
            b'+' => Some(TokenKind::Plus),
            b'-' => Some(TokenKind::Minus),
            b'*' => Some(TokenKind::Star),
            b'/' => Some(TokenKind::Slash),
            b'%' => Some(TokenKind::Percent),
            b'<' => Some(TokenKind::Lt),
            b'>' => Some(TokenKind::Gt),
            b'=' => Some(TokenKind::Assign),
            b'.' => Some(TokenKind::Dot),
            b'[' => Some(TokenKind::LBracket),
            b']' => Some(TokenKind::RBracket),
            b'{' => Some(TokenKind::LBrace),
            b'}' => Some(TokenKind::RBrace),
            b':' => Some(TokenKind::Colon),
            b';' => Some(TokenKind::Semicolon),
            _ => None,
        };

        match kind {
            Some(kind) => {
                tokens.push(Token {
                    kind,
                    span: Span::new(start, pos + 1),
                });
                pos += 1;
            }
            None => {
                let ch = source[pos..].chars().next().unwrap();
                return Err(CompileError::Parse {
                    message: format!("unexpected character '{ch}' at position {pos}"),
                    source_text: source.to_string(),
                });
            }
        }
    }

    Ok(tokens)
}

fn lex_string(source: &str, start: usize) -> Result<usize, CompileError> {
    let bytes = source.as_bytes();
    let quote = bytes[start];
    let mut pos = start + 1;
    while pos < bytes.len() {
        if bytes[pos] == quote {
            return Ok(pos + 1);
        }
        if bytes[pos] == b'\\' {
            pos += 1;
        }
        pos += 1;
    }
    Err(CompileError::Parse {
        message: format!("unterminated string literal at position {start}"),
        source_text: source.to_string(),
    })
}

fn lex_number(source: &str, start: usize) -> Result<(f64, usize), CompileError> {
    let bytes = source.as_bytes();
    let mut pos = start;
    let mut num_str = String::new();

    while pos < bytes.len() && (bytes[pos].is_ascii_digit() || bytes[pos] == b'_') {
        if bytes[pos] != b'_' {
            num_str.push(bytes[pos] as char);
        }
        pos += 1;
    }

    if pos < bytes.len() && bytes[pos] == b'.' {
        num_str.push('.');
        pos += 1;
        while pos < bytes.len() && (bytes[pos].is_ascii_digit() || bytes[pos] == b'_') {
            if bytes[pos] != b'_' {
                num_str.push(bytes[pos] as char);
            }
            pos += 1;
        }
    }

    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        // A malformed exponent (`2e`, `2e+`) is a lex error, not a
        // token split.
        num_str.push('e');
        pos += 1;
        if pos < bytes.len() && (bytes[pos] == b'+' || bytes[pos] == b'-') {
            num_str.push(bytes[pos] as char);
            pos += 1;
        }
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            num_str.push(bytes[pos] as char);
            pos += 1;
        }
    }

    num_str
        .parse::<f64>()
        .map(|n| (n, pos))
        .map_err(|_| CompileError::Parse {
            message: format!("invalid number literal '{num_str}' at position {start}"),
            source_text: source.to_string(),
        })
}

fn lex_ident_end(source: &str, start: usize) -> usize {
    let bytes = source.as_bytes();
    let mut pos = start;
    while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_') {
        pos += 1;
    }
    pos
}
