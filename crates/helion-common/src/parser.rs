//! Recursive-descent parser for type annotations.
//!
//! Grammar:
//!
//! ```text
//! type  := atom ( "->" type )?
//! atom  := IDENT ( "{" type ( "," type )* "}" )?
//!        | "(" ")"
//!        | "(" type ( "," type )* ")"
//!        | "[" type "]"
//! ```
//!
//! Identifiers starting with an upper-case ASCII letter are constructors,
//! anything else is a free parameter. `(T)` is grouping, `(A, B)` is a tuple,
//! `()` is the unit tuple, `[T]` is sugar for `Slice{T}`, and the arrow is
//! right-associative.

use crate::annotation::TypeAnnotation;
use crate::error::{ParseError, ParseErrorKind};
use crate::span::Span;

/// Constructor name produced by the `[T]` sugar.
pub const SLICE: &str = "Slice";

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Ident(String),
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Arrow,
    Eof,
}

impl TokenKind {
    fn text(&self) -> String {
        match self {
            TokenKind::Ident(name) => name.clone(),
            TokenKind::LBrace => "{".into(),
            TokenKind::RBrace => "}".into(),
            TokenKind::LParen => "(".into(),
            TokenKind::RParen => ")".into(),
            TokenKind::LBracket => "[".into(),
            TokenKind::RBracket => "]".into(),
            TokenKind::Comma => ",".into(),
            TokenKind::Arrow => "->".into(),
            TokenKind::Eof => String::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    span: Span,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        let start = start as u32;
        let single = |kind| Token {
            kind,
            span: Span::new(start, start + 1),
        };
        match c {
            c if c.is_whitespace() => {}
            '{' => tokens.push(single(TokenKind::LBrace)),
            '}' => tokens.push(single(TokenKind::RBrace)),
            '(' => tokens.push(single(TokenKind::LParen)),
            ')' => tokens.push(single(TokenKind::RParen)),
            '[' => tokens.push(single(TokenKind::LBracket)),
            ']' => tokens.push(single(TokenKind::RBracket)),
            ',' => tokens.push(single(TokenKind::Comma)),
            '-' => match chars.peek() {
                Some((_, '>')) => {
                    chars.next();
                    tokens.push(Token {
                        kind: TokenKind::Arrow,
                        span: Span::new(start, start + 2),
                    });
                }
                _ => {
                    return Err(ParseError::new(
                        ParseErrorKind::IncompleteArrow,
                        Span::new(start, start + 1),
                    ))
                }
            },
            c if is_ident_start(c) => {
                let mut end = start as usize + c.len_utf8();
                while let Some(&(i, next)) = chars.peek() {
                    if !is_ident_continue(next) {
                        break;
                    }
                    end = i + next.len_utf8();
                    chars.next();
                }
                tokens.push(Token {
                    kind: TokenKind::Ident(source[start as usize..end].to_string()),
                    span: Span::new(start, end as u32),
                });
            }
            other => {
                return Err(ParseError::new(
                    ParseErrorKind::UnexpectedCharacter(other),
                    Span::new(start, start + other.len_utf8() as u32),
                ))
            }
        }
    }

    let end = source.len() as u32;
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(end, end),
    });
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // The token stream always ends with Eof and `bump` never moves past it.
        &self.tokens[self.pos]
    }

    fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        tok
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        let tok = self.peek();
        let kind = match &tok.kind {
            TokenKind::Eof => ParseErrorKind::UnexpectedEof { expected },
            other => ParseErrorKind::UnexpectedToken {
                found: other.text(),
                expected,
            },
        };
        ParseError::new(kind, tok.span)
    }

    /// Consume the closing delimiter of a group opened at `open_span`.
    fn expect_close(&mut self, close: TokenKind, open: char, open_span: Span) -> Result<Span, ParseError> {
        let tok = self.peek().clone();
        if tok.kind == close {
            self.bump();
            return Ok(tok.span);
        }
        if tok.kind == TokenKind::Eof {
            return Err(ParseError::new(
                ParseErrorKind::UnclosedDelimiter(open),
                open_span,
            ));
        }
        Err(self.unexpected(match close {
            TokenKind::RBrace => "`,` or `}`",
            TokenKind::RParen => "`,` or `)`",
            _ => "`]`",
        }))
    }

    fn parse_type(&mut self) -> Result<TypeAnnotation, ParseError> {
        let lhs = self.parse_atom()?;
        if self.peek().kind != TokenKind::Arrow {
            return Ok(lhs);
        }
        self.bump();
        let rhs = self.parse_type()?;
        let span = lhs.span.merge(rhs.span);
        Ok(TypeAnnotation::arrow(lhs, rhs).with_span(span))
    }

    /// Comma-separated types up to (not including) `close`.
    fn parse_list(&mut self, close: &TokenKind) -> Result<Vec<TypeAnnotation>, ParseError> {
        let mut items = vec![self.parse_type()?];
        while self.peek().kind == TokenKind::Comma {
            self.bump();
            items.push(self.parse_type()?);
        }
        if self.peek().kind != *close && self.peek().kind != TokenKind::Eof {
            return Err(self.unexpected(match close {
                TokenKind::RBrace => "`,` or `}`",
                _ => "`,` or `)`",
            }));
        }
        Ok(items)
    }

    fn parse_atom(&mut self) -> Result<TypeAnnotation, ParseError> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::Ident(name) => {
                self.bump();
                let parameter = !name.starts_with(|c: char| c.is_ascii_uppercase());
                let mut node = TypeAnnotation {
                    name,
                    params: Vec::new(),
                    parameter,
                    span: tok.span,
                };
                if self.peek().kind == TokenKind::LBrace {
                    let open = self.bump();
                    node.params = self.parse_list(&TokenKind::RBrace)?;
                    let close = self.expect_close(TokenKind::RBrace, '{', open.span)?;
                    node.span = tok.span.merge(close);
                }
                Ok(node)
            }
            TokenKind::LParen => {
                self.bump();
                if self.peek().kind == TokenKind::RParen {
                    let close = self.bump();
                    return Ok(TypeAnnotation::tuple(Vec::new()).with_span(tok.span.merge(close.span)));
                }
                let mut items = self.parse_list(&TokenKind::RParen)?;
                let close = self.expect_close(TokenKind::RParen, '(', tok.span)?;
                if items.len() == 1 {
                    return Ok(items.remove(0));
                }
                Ok(TypeAnnotation::tuple(items).with_span(tok.span.merge(close)))
            }
            TokenKind::LBracket => {
                self.bump();
                let elem = self.parse_type()?;
                let close = self.expect_close(TokenKind::RBracket, '[', tok.span)?;
                Ok(TypeAnnotation::named(SLICE, vec![elem]).with_span(tok.span.merge(close)))
            }
            _ => Err(self.unexpected("a type")),
        }
    }
}

/// Parse a complete type annotation from `source`.
///
/// Trailing input after the annotation is an error.
pub fn parse_annotation(source: &str) -> Result<TypeAnnotation, ParseError> {
    let mut parser = Parser {
        tokens: tokenize(source)?,
        pos: 0,
    };
    let ty = parser.parse_type()?;
    if parser.peek().kind != TokenKind::Eof {
        return Err(parser.unexpected("end of input"));
    }
    Ok(ty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_arrow_and_idents() {
        let toks = tokenize("a -> Int").unwrap();
        let kinds: Vec<_> = toks.iter().map(|t| t.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Arrow,
                TokenKind::Ident("Int".into()),
                TokenKind::Eof,
            ]
        );
        assert_eq!(toks[1].span, Span::new(2, 4));
    }

    #[test]
    fn lone_dash_is_an_error() {
        let err = tokenize("a - b").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::IncompleteArrow);
        assert_eq!(err.span, Span::new(2, 3));
    }

    #[test]
    fn spans_cover_applications() {
        let ann = parse_annotation("Map{Int, a}").unwrap();
        assert_eq!(ann.span, Span::new(0, 11));
        assert_eq!(ann.params[1].span, Span::new(9, 10));
    }

    #[test]
    fn arrow_span_covers_both_sides() {
        let ann = parse_annotation("a -> Int").unwrap();
        assert_eq!(ann.span, Span::new(0, 8));
    }
}
