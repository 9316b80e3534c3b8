//! Error types for both halves of the type core.
//!
//! [`TypeError`] covers the structural side (unification, conversion of
//! annotations, IIR inference). [`DatatypeError`] covers the nominal side
//! (registry, specialization, subtyping, layout lowering). Every error is
//! raised where it is detected and propagated with `?`; nothing here is
//! retried or patched up.

use std::fmt;

use helion_common::Span;

use crate::iir::ValueId;
use crate::ty::{Ty, TyVar};

/// Why two types were required to be equal.
///
/// Carried by unification errors so that a failure can be traced back to
/// the instruction or annotation that demanded it.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstraintOrigin {
    /// A returned value must match the enclosing function's return type.
    Return { func: String },
    /// The stored value must match the destination slot.
    Store { value: ValueId },
    /// Both operands of an arithmetic instruction must agree.
    Binary { value: ValueId },
    /// A callee must accept the supplied arguments.
    Call { value: ValueId },
    /// A branch condition must be `Bool`.
    Branch { value: ValueId },
    /// Checked against a written type annotation.
    Annotation { span: Span },
    /// Synthetic constraint with no source location.
    Builtin,
}

impl ConstraintOrigin {
    pub fn span(&self) -> Option<Span> {
        match self {
            ConstraintOrigin::Annotation { span } => Some(*span),
            _ => None,
        }
    }
}

impl fmt::Display for ConstraintOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintOrigin::Return { func } => write!(f, "return from `{}`", func),
            ConstraintOrigin::Store { value } => write!(f, "store {}", value),
            ConstraintOrigin::Binary { value } => write!(f, "operands of {}", value),
            ConstraintOrigin::Call { value } => write!(f, "call {}", value),
            ConstraintOrigin::Branch { value } => write!(f, "condition of {}", value),
            ConstraintOrigin::Annotation { .. } => write!(f, "type annotation"),
            ConstraintOrigin::Builtin => write!(f, "builtin constraint"),
        }
    }
}

/// A failure on the structural (inference) side.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeError {
    /// Two types could not be unified: different constructor names,
    /// different arities, or otherwise incompatible after resolution.
    ///
    /// Both operands are fully resolved at the point of failure.
    Mismatch {
        expected: Ty,
        found: Ty,
        origin: ConstraintOrigin,
    },
    /// Binding `var` to `ty` would create an infinite type.
    InfiniteType {
        var: TyVar,
        ty: Ty,
        origin: ConstraintOrigin,
    },
    /// A free type parameter in an annotation was given parameters of its own.
    ParameterArity {
        name: String,
        arity: usize,
        span: Span,
    },
    /// An IIR global refers to a name with no known type.
    UnknownGlobal { name: String },
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::Mismatch {
                expected, found, ..
            } => {
                write!(f, "cannot unify `{}` with `{}`", expected, found)
            }
            TypeError::InfiniteType { var, ty, .. } => {
                write!(f, "infinite type: `{}` occurs in `{}`", var, ty)
            }
            TypeError::ParameterArity { name, arity, .. } => {
                write!(
                    f,
                    "type parameter `{}` cannot take parameters (found {})",
                    name, arity
                )
            }
            TypeError::UnknownGlobal { name } => {
                write!(f, "unknown global `{}`", name)
            }
        }
    }
}

impl std::error::Error for TypeError {}

/// A failure on the nominal (datatype) side.
#[derive(Clone, Debug, PartialEq)]
pub enum DatatypeError {
    /// Subtyping was asked about a generic, unspecialized type.
    UnspecializedSubtype { name: String },
    /// Layout lowering was asked for a generic, unspecialized type.
    UnspecializedLowering { name: String },
    /// Concrete fields were requested from a generic type.
    UnspecializedFields { name: String },
    /// A type of this name is already registered.
    DuplicateType { name: String },
    /// No type of this name is registered or in scope.
    UnknownType { name: String, span: Span },
    /// A generic was specialized with the wrong number of parameters.
    SpecializationArity {
        name: String,
        expected: usize,
        found: usize,
    },
    /// Fields can only be declared on object types.
    FieldOnNonObject { name: String, field: String },
    /// Floating-point types lower only at 32 or 64 bits.
    InvalidFloatWidth { name: String, bits: u32 },
    /// A type parameter in an annotation was given parameters of its own.
    ParameterArity { name: String, span: Span },
}

impl fmt::Display for DatatypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatatypeError::UnspecializedSubtype { name } => {
                write!(f, "cannot check subtyping on unspecialized type `{}`", name)
            }
            DatatypeError::UnspecializedLowering { name } => {
                write!(f, "cannot lower unspecialized type `{}`", name)
            }
            DatatypeError::UnspecializedFields { name } => {
                write!(f, "unspecialized type `{}` has no concrete fields", name)
            }
            DatatypeError::DuplicateType { name } => {
                write!(f, "type `{}` is already defined", name)
            }
            DatatypeError::UnknownType { name, .. } => {
                write!(f, "unknown type `{}`", name)
            }
            DatatypeError::SpecializationArity {
                name,
                expected,
                found,
            } => {
                write!(
                    f,
                    "invalid number of parameters to type `{}`: expected {}, found {}",
                    name, expected, found
                )
            }
            DatatypeError::FieldOnNonObject { name, field } => {
                write!(
                    f,
                    "cannot add field `{}` to `{}`: only object types have fields",
                    field, name
                )
            }
            DatatypeError::InvalidFloatWidth { name, bits } => {
                write!(
                    f,
                    "float type `{}` has {} bits; floats must be 32 or 64 bits",
                    name, bits
                )
            }
            DatatypeError::ParameterArity { name, .. } => {
                write!(f, "type parameter `{}` cannot take parameters", name)
            }
        }
    }
}

impl std::error::Error for DatatypeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_display() {
        let err = TypeError::Mismatch {
            expected: Ty::int(),
            found: Ty::named("List", vec![Ty::float()]),
            origin: ConstraintOrigin::Builtin,
        };
        assert_eq!(err.to_string(), "cannot unify `Int` with `List{Float}`");
    }

    #[test]
    fn infinite_type_display() {
        let err = TypeError::InfiniteType {
            var: TyVar(3),
            ty: Ty::named("List", vec![Ty::Var(TyVar(3))]),
            origin: ConstraintOrigin::Builtin,
        };
        assert_eq!(err.to_string(), "infinite type: `t3` occurs in `List{t3}`");
    }

    #[test]
    fn datatype_error_display() {
        assert_eq!(
            DatatypeError::SpecializationArity {
                name: "Pair".into(),
                expected: 2,
                found: 1
            }
            .to_string(),
            "invalid number of parameters to type `Pair`: expected 2, found 1"
        );
        assert_eq!(
            DatatypeError::InvalidFloatWidth {
                name: "Half".into(),
                bits: 16
            }
            .to_string(),
            "float type `Half` has 16 bits; floats must be 32 or 64 bits"
        );
    }

    #[test]
    fn origin_span_only_for_annotations() {
        let span = Span::new(1, 4);
        assert_eq!(ConstraintOrigin::Annotation { span }.span(), Some(span));
        assert_eq!(ConstraintOrigin::Builtin.span(), None);
    }
}
