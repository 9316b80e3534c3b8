//! Shared syntax for the Helion type core.
//!
//! The type checker never sees the full language syntax tree. It consumes
//! only type annotations: a constructor name, an ordered list of child
//! annotations, and a flag marking free type parameters. This crate owns that
//! node shape, the byte spans attached to it, and a small parser for the
//! annotation grammar so that tools and tests can build annotations from text.
//!
//! - [`span`]: byte-offset spans and line/column lookup
//! - [`annotation`]: the `TypeAnnotation` node and its canonical rendering
//! - [`parser`]: tokenizer and recursive-descent parser for annotations
//! - [`error`]: annotation syntax errors

pub mod annotation;
pub mod error;
pub mod parser;
pub mod span;

pub use annotation::TypeAnnotation;
pub use error::{ParseError, ParseErrorKind};
pub use parser::parse_annotation;
pub use span::Span;
