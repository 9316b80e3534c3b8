//! The type-annotation node handed to the type checker.
//!
//! An annotation is a constructor name applied to child annotations, or a
//! free type parameter (lower-case name, no children). Two constructor names
//! are reserved: [`ARROW`] for function types and [`TUPLE`] for tuples.

use std::fmt;

use crate::span::Span;

/// Constructor name of the binary function arrow `domain -> codomain`.
pub const ARROW: &str = "->";

/// Constructor name of the n-ary tuple `(a, b, ...)`.
pub const TUPLE: &str = "()";

/// A parsed (or programmatically built) type annotation.
///
/// `parameter` marks a free type parameter such as `a` in `a -> a`. A
/// well-formed parameter has no children; the conversion boundary rejects
/// parameters that do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAnnotation {
    pub name: String,
    pub params: Vec<TypeAnnotation>,
    pub parameter: bool,
    pub span: Span,
}

impl TypeAnnotation {
    /// A constructor applied to `params`.
    pub fn named(name: impl Into<String>, params: Vec<TypeAnnotation>) -> Self {
        TypeAnnotation {
            name: name.into(),
            params,
            parameter: false,
            span: Span::default(),
        }
    }

    /// A free type parameter.
    pub fn param(name: impl Into<String>) -> Self {
        TypeAnnotation {
            name: name.into(),
            params: Vec::new(),
            parameter: true,
            span: Span::default(),
        }
    }

    pub fn arrow(domain: TypeAnnotation, codomain: TypeAnnotation) -> Self {
        Self::named(ARROW, vec![domain, codomain])
    }

    pub fn tuple(elems: Vec<TypeAnnotation>) -> Self {
        Self::named(TUPLE, elems)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn is_arrow(&self) -> bool {
        !self.parameter && self.name == ARROW && self.params.len() == 2
    }

    pub fn is_tuple(&self) -> bool {
        !self.parameter && self.name == TUPLE
    }
}

impl fmt::Display for TypeAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_arrow() {
            return write!(f, "({} -> {})", self.params[0], self.params[1]);
        }
        if self.is_tuple() {
            write!(f, "(")?;
            write_list(f, &self.params)?;
            return write!(f, ")");
        }
        write!(f, "{}", self.name)?;
        if !self.params.is_empty() {
            write!(f, "{{")?;
            write_list(f, &self.params)?;
            write!(f, "}}")?;
        }
        Ok(())
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[TypeAnnotation]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}
