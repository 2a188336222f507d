// crates/conduit-logic/src/dsl.rs
// ============================================================================
// Module: Requirement DSL
// Description: Text grammar for building Requirement trees without writing Rust.
// Purpose: Let a custom Decision Engine rule's predicate be authored as a short
//          string in configuration instead of compiled code.
// Dependencies: crate::requirement
// ============================================================================

//! ## Overview
//! Grammar, informally:
//!
//! ```text
//! expr       := or_expr
//! or_expr    := and_expr ( "||" and_expr )*
//! and_expr   := unary ( "&&" unary )*
//! unary      := "!" unary | primary
//! primary    := IDENT
//!             | "not" "(" expr ")"
//!             | "and" "(" expr ("," expr)* ")"
//!             | "or"  "(" expr ("," expr)* ")"
//!             | "at_least" "(" NUMBER "," expr ("," expr)* ")"
//!             | "require_group" "(" STRING "," expr ("," expr)* ")"
//!             | "(" expr ")"
//! ```
//!
//! `IDENT` names are resolved against a caller-supplied symbol table; an
//! unrecognized name is a parse error (`UnknownCondition`), not a silent
//! `Unknown` — an author typo in a rule predicate should fail loudly at load
//! time, not degrade quietly at evaluation time.

use crate::requirement::Requirement;

/// Maximum accepted length of a DSL source string, in bytes.
pub const MAX_DSL_INPUT_BYTES: usize = 1024 * 1024;

/// Maximum accepted nesting depth of a DSL expression.
pub const MAX_DSL_NESTING: usize = 32;

/// Errors produced while parsing a DSL string into a [`Requirement`] tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DslError {
    /// The input was empty or whitespace-only.
    #[error("dsl input is empty")]
    EmptyInput,
    /// The input exceeded [`MAX_DSL_INPUT_BYTES`].
    #[error("dsl input too large: {actual_bytes} bytes (max {max_bytes})")]
    InputTooLarge {
        /// Configured maximum.
        max_bytes: usize,
        /// Observed size.
        actual_bytes: usize,
    },
    /// Nesting exceeded [`MAX_DSL_NESTING`].
    #[error("dsl nesting too deep: {actual_depth} (max {max_depth}) at position {position}")]
    NestingTooDeep {
        /// Configured maximum.
        max_depth: usize,
        /// Observed depth.
        actual_depth: usize,
        /// Byte offset where the limit was exceeded.
        position: usize,
    },
    /// A token did not match what the grammar expected at this position.
    #[error("unexpected token at {position}: expected {expected}, found `{found}`")]
    UnexpectedToken {
        /// What the grammar expected.
        expected: String,
        /// What was actually found.
        found: String,
        /// Byte offset of the token.
        position: usize,
    },
    /// An identifier did not resolve against the supplied symbol table.
    #[error("unknown condition `{name}` at position {position}")]
    UnknownCondition {
        /// The unresolved identifier.
        name: String,
        /// Byte offset of the identifier.
        position: usize,
    },
    /// A call used a function name the grammar does not define.
    #[error("unknown function `{name}` at position {position}")]
    UnknownFunction {
        /// The unrecognized function name.
        name: String,
        /// Byte offset of the function name.
        position: usize,
    },
    /// A numeric literal (e.g. `at_least`'s threshold) failed to parse.
    #[error("invalid number `{raw}` at position {position}")]
    InvalidNumber {
        /// The raw text that failed to parse.
        raw: String,
        /// Byte offset of the literal.
        position: usize,
    },
    /// Input remained after a complete expression was parsed.
    #[error("trailing input at position {position}")]
    TrailingInput {
        /// Byte offset of the first unconsumed token.
        position: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Number(String),
    String(String),
    LParen,
    RParen,
    Comma,
    AndAnd,
    OrOr,
    Bang,
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn tokenize(mut self) -> Result<Vec<(Token, usize)>, DslError> {
        let mut tokens = Vec::new();
        let bytes = self.src.as_bytes();
        while self.pos < bytes.len() {
            let ch = bytes[self.pos] as char;
            if ch.is_whitespace() {
                self.pos += 1;
                continue;
            }
            let start = self.pos;
            match ch {
                '(' => {
                    tokens.push((Token::LParen, start));
                    self.pos += 1;
                }
                ')' => {
                    tokens.push((Token::RParen, start));
                    self.pos += 1;
                }
                ',' => {
                    tokens.push((Token::Comma, start));
                    self.pos += 1;
                }
                '!' => {
                    tokens.push((Token::Bang, start));
                    self.pos += 1;
                }
                '&' if bytes.get(self.pos + 1) == Some(&b'&') => {
                    tokens.push((Token::AndAnd, start));
                    self.pos += 2;
                }
                '|' if bytes.get(self.pos + 1) == Some(&b'|') => {
                    tokens.push((Token::OrOr, start));
                    self.pos += 2;
                }
                '"' => {
                    self.pos += 1;
                    let text_start = self.pos;
                    while self.pos < bytes.len() && bytes[self.pos] != b'"' {
                        self.pos += 1;
                    }
                    if self.pos >= bytes.len() {
                        return Err(DslError::UnexpectedToken {
                            expected: "closing `\"`".to_string(),
                            found: "end of input".to_string(),
                            position: start,
                        });
                    }
                    let text = self.src[text_start..self.pos].to_string();
                    self.pos += 1;
                    tokens.push((Token::String(text), start));
                }
                c if c.is_ascii_digit() => {
                    while self.pos < bytes.len() && (bytes[self.pos] as char).is_ascii_digit() {
                        self.pos += 1;
                    }
                    tokens.push((Token::Number(self.src[start..self.pos].to_string()), start));
                }
                c if c.is_alphabetic() || c == '_' => {
                    while self.pos < bytes.len() {
                        let next = bytes[self.pos] as char;
                        if next.is_alphanumeric() || next == '_' || next == '.' {
                            self.pos += 1;
                        } else {
                            break;
                        }
                    }
                    tokens.push((Token::Ident(self.src[start..self.pos].to_string()), start));
                }
                other => {
                    return Err(DslError::UnexpectedToken {
                        expected: "identifier, `(`, `)`, `,`, `!`, `&&`, or `||`".to_string(),
                        found: other.to_string(),
                        position: start,
                    });
                }
            }
        }
        Ok(tokens)
    }
}

struct Parser<'a, P, F: Fn(&str) -> Option<P>> {
    tokens: Vec<(Token, usize)>,
    index: usize,
    resolve_symbol: &'a F,
    depth: usize,
}

impl<'a, P, F: Fn(&str) -> Option<P>> Parser<'a, P, F> {
    fn peek(&self) -> Option<&(Token, usize)> {
        self.tokens.get(self.index)
    }

    fn advance(&mut self) -> Option<(Token, usize)> {
        let item = self.tokens.get(self.index).cloned();
        self.index += 1;
        item
    }

    fn enter(&mut self, position: usize) -> Result<(), DslError> {
        self.depth += 1;
        if self.depth > MAX_DSL_NESTING {
            return Err(DslError::NestingTooDeep {
                max_depth: MAX_DSL_NESTING,
                actual_depth: self.depth,
                position,
            });
        }
        Ok(())
    }

    fn exit(&mut self) {
        self.depth -= 1;
    }

    fn expect(&mut self, expected: &Token, label: &str) -> Result<(), DslError> {
        match self.advance() {
            Some((token, position)) if &token == expected => {
                let _ = position;
                Ok(())
            }
            Some((token, position)) => Err(DslError::UnexpectedToken {
                expected: label.to_string(),
                found: format!("{token:?}"),
                position,
            }),
            None => Err(DslError::UnexpectedToken {
                expected: label.to_string(),
                found: "end of input".to_string(),
                position: self.tokens.last().map_or(0, |(_, p)| *p),
            }),
        }
    }

    fn parse_expr(&mut self) -> Result<Requirement<P>, DslError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Requirement<P>, DslError> {
        let mut left = self.parse_and()?;
        while matches!(self.peek(), Some((Token::OrOr, _))) {
            self.advance();
            let right = self.parse_and()?;
            left = Requirement::or(vec![left, right]);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Requirement<P>, DslError> {
        let mut left = self.parse_unary()?;
        while matches!(self.peek(), Some((Token::AndAnd, _))) {
            self.advance();
            let right = self.parse_unary()?;
            left = Requirement::and(vec![left, right]);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Requirement<P>, DslError> {
        if let Some((Token::Bang, position)) = self.peek().cloned() {
            self.advance();
            self.enter(position)?;
            let inner = self.parse_unary()?;
            self.exit();
            return Ok(Requirement::negate(inner));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Requirement<P>, DslError> {
        let (token, position) = self.advance().ok_or_else(|| DslError::UnexpectedToken {
            expected: "expression".to_string(),
            found: "end of input".to_string(),
            position: 0,
        })?;
        match token {
            Token::LParen => {
                self.enter(position)?;
                let inner = self.parse_expr()?;
                self.exit();
                self.expect(&Token::RParen, "`)`")?;
                Ok(inner)
            }
            Token::Ident(name) if matches!(self.peek(), Some((Token::LParen, _))) => {
                self.parse_call(&name, position)
            }
            Token::Ident(name) => {
                (self.resolve_symbol)(&name)
                    .map(Requirement::condition)
                    .ok_or(DslError::UnknownCondition { name, position })
            }
            other => Err(DslError::UnexpectedToken {
                expected: "expression".to_string(),
                found: format!("{other:?}"),
                position,
            }),
        }
    }

    fn parse_call(&mut self, name: &str, position: usize) -> Result<Requirement<P>, DslError> {
        self.enter(position)?;
        self.advance();
        let result = match name {
            "and" | "all" => {
                let children = self.parse_expr_list()?;
                Ok(Requirement::and(children))
            }
            "or" | "any" => {
                let children = self.parse_expr_list()?;
                Ok(Requirement::or(children))
            }
            "not" => {
                let mut children = self.parse_expr_list()?;
                if children.len() != 1 {
                    return Err(DslError::UnexpectedToken {
                        expected: "exactly one argument to `not`".to_string(),
                        found: format!("{} arguments", children.len()),
                        position,
                    });
                }
                Ok(Requirement::negate(children.remove(0)))
            }
            "at_least" => {
                let (raw, n_position) = self.expect_number()?;
                self.expect(&Token::Comma, "`,`")?;
                let n: usize = raw.parse().map_err(|_err| DslError::InvalidNumber {
                    raw: raw.clone(),
                    position: n_position,
                })?;
                let children = self.parse_expr_list()?;
                Ok(Requirement::at_least(n, children))
            }
            "require_group" => {
                let label = self.expect_string()?;
                self.expect(&Token::Comma, "`,`")?;
                let children = self.parse_expr_list()?;
                Ok(Requirement::require_group(label, children))
            }
            other => Err(DslError::UnknownFunction { name: other.to_string(), position }),
        };
        self.exit();
        result
    }

    fn expect_number(&mut self) -> Result<(String, usize), DslError> {
        match self.advance() {
            Some((Token::Number(raw), position)) => Ok((raw, position)),
            Some((token, position)) => Err(DslError::UnexpectedToken {
                expected: "number".to_string(),
                found: format!("{token:?}"),
                position,
            }),
            None => Err(DslError::UnexpectedToken {
                expected: "number".to_string(),
                found: "end of input".to_string(),
                position: 0,
            }),
        }
    }

    fn expect_string(&mut self) -> Result<String, DslError> {
        match self.advance() {
            Some((Token::String(text), _)) => Ok(text),
            Some((token, position)) => Err(DslError::UnexpectedToken {
                expected: "string literal".to_string(),
                found: format!("{token:?}"),
                position,
            }),
            None => Err(DslError::UnexpectedToken {
                expected: "string literal".to_string(),
                found: "end of input".to_string(),
                position: 0,
            }),
        }
    }

    fn parse_expr_list(&mut self) -> Result<Vec<Requirement<P>>, DslError> {
        self.expect(&Token::LParen, "`(`")?;
        let mut children = vec![self.parse_expr()?];
        while matches!(self.peek(), Some((Token::Comma, _))) {
            self.advance();
            children.push(self.parse_expr()?);
        }
        self.expect(&Token::RParen, "`)`")?;
        Ok(children)
    }
}

/// Parses `source` into a [`Requirement`] tree, resolving leaf identifiers
/// through `resolve_symbol`.
///
/// # Errors
///
/// Returns [`DslError`] when the input is empty, too large, too deeply
/// nested, malformed, or names an unknown condition or function.
pub fn parse<P>(
    source: &str,
    resolve_symbol: impl Fn(&str) -> Option<P>,
) -> Result<Requirement<P>, DslError> {
    if source.trim().is_empty() {
        return Err(DslError::EmptyInput);
    }
    if source.len() > MAX_DSL_INPUT_BYTES {
        return Err(DslError::InputTooLarge {
            max_bytes: MAX_DSL_INPUT_BYTES,
            actual_bytes: source.len(),
        });
    }
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser { tokens, index: 0, resolve_symbol: &resolve_symbol, depth: 0 };
    let requirement = parser.parse_expr()?;
    if let Some((_, position)) = parser.peek() {
        return Err(DslError::TrailingInput { position: *position });
    }
    Ok(requirement)
}
