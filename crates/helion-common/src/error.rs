use std::fmt;

use crate::span::Span;

/// A syntax error in a type annotation, with the offending span.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The specific kind of annotation syntax error.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// A character that cannot start any annotation token.
    UnexpectedCharacter(char),
    /// A token that does not fit the grammar at this position.
    UnexpectedToken { found: String, expected: &'static str },
    /// Input ended while a type was still expected.
    UnexpectedEof { expected: &'static str },
    /// An opening `{`, `(` or `[` was never closed.
    UnclosedDelimiter(char),
    /// A lone `-` that is not part of `->`.
    IncompleteArrow,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedCharacter(c) => write!(f, "unexpected character: {c:?}"),
            Self::UnexpectedToken { found, expected } => {
                write!(f, "expected {expected}, found `{found}`")
            }
            Self::UnexpectedEof { expected } => {
                write!(f, "expected {expected}, found end of input")
            }
            Self::UnclosedDelimiter(c) => write!(f, "unclosed delimiter `{c}`"),
            Self::IncompleteArrow => write!(f, "expected `->`"),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display() {
        let err = ParseError::new(ParseErrorKind::UnexpectedCharacter('@'), Span::new(0, 1));
        assert_eq!(err.to_string(), "unexpected character: '@'");
    }

    #[test]
    fn parse_error_kind_display_all_variants() {
        assert_eq!(
            ParseErrorKind::UnexpectedToken {
                found: ",".into(),
                expected: "a type"
            }
            .to_string(),
            "expected a type, found `,`"
        );
        assert_eq!(
            ParseErrorKind::UnexpectedEof { expected: "`}`" }.to_string(),
            "expected `}`, found end of input"
        );
        assert_eq!(
            ParseErrorKind::UnclosedDelimiter('(').to_string(),
            "unclosed delimiter `(`"
        );
        assert_eq!(ParseErrorKind::IncompleteArrow.to_string(), "expected `->`");
    }
}
