//! Structural types used during inference.
//!
//! A structural type is either a unification variable (`Var`) or a named
//! constructor applied to parameters (`Named`). Two constructor names are
//! reserved: `"->"` for the binary function arrow and `"()"` for tuples.
//! Variables live in `ena`'s union-find table owned by
//! [`InferCtx`](crate::unify::InferCtx); a `TyVar` is only an index into it.

use std::fmt;

pub use helion_common::annotation::{ARROW, TUPLE};

/// A unification variable, identified by its index in the unification table.
///
/// Variables render as `t<index>`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TyVar(pub u32);

impl fmt::Display for TyVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// A structural type.
///
/// The derived `PartialEq`/`Hash` are syntactic: two `Var`s are equal iff
/// they are the same variable, two `Named` iff same name, same arity and
/// pairwise-equal parameters. Equality *after* resolving bindings is
/// [`InferCtx::equiv`](crate::unify::InferCtx::equiv); resolve first and the
/// derived impls agree with it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ty {
    Var(TyVar),
    Named { name: String, params: Vec<Ty> },
}

impl Ty {
    /// A constructor applied to `params`.
    pub fn named(name: impl Into<String>, params: Vec<Ty>) -> Ty {
        Ty::Named {
            name: name.into(),
            params,
        }
    }

    /// A nullary constructor such as `Int`.
    pub fn con(name: impl Into<String>) -> Ty {
        Ty::named(name, Vec::new())
    }

    pub fn int() -> Ty {
        Ty::con("Int")
    }

    pub fn float() -> Ty {
        Ty::con("Float")
    }

    pub fn bool() -> Ty {
        Ty::con("Bool")
    }

    /// The empty tuple, the type of values that carry no information.
    pub fn unit() -> Ty {
        Ty::named(TUPLE, Vec::new())
    }

    pub fn tuple(elems: Vec<Ty>) -> Ty {
        Ty::named(TUPLE, elems)
    }

    /// `domain -> codomain`.
    pub fn arrow(domain: Ty, codomain: Ty) -> Ty {
        Ty::named(ARROW, vec![domain, codomain])
    }

    /// Curried function type `p0 -> p1 -> ... -> ret`.
    ///
    /// A function of no arguments is `() -> ret`.
    pub fn curried(params: Vec<Ty>, ret: Ty) -> Ty {
        if params.is_empty() {
            return Ty::arrow(Ty::unit(), ret);
        }
        params
            .into_iter()
            .rev()
            .fold(ret, |acc, param| Ty::arrow(param, acc))
    }

    /// Domain and codomain if this is a well-formed arrow.
    pub fn as_arrow(&self) -> Option<(&Ty, &Ty)> {
        match self {
            Ty::Named { name, params } if name == ARROW && params.len() == 2 => {
                Some((&params[0], &params[1]))
            }
            _ => None,
        }
    }

    pub fn as_var(&self) -> Option<TyVar> {
        match self {
            Ty::Var(v) => Some(*v),
            Ty::Named { .. } => None,
        }
    }

    /// Variables occurring syntactically in this type, in first-occurrence
    /// order and without duplicates. Bindings are not followed.
    pub fn vars(&self) -> Vec<TyVar> {
        fn walk(ty: &Ty, out: &mut Vec<TyVar>) {
            match ty {
                Ty::Var(v) => {
                    if !out.contains(v) {
                        out.push(*v);
                    }
                }
                Ty::Named { params, .. } => params.iter().for_each(|p| walk(p, out)),
            }
        }
        let mut out = Vec::new();
        walk(self, &mut out);
        out
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Ty]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some((domain, codomain)) = self.as_arrow() {
            return write!(f, "({} -> {})", domain, codomain);
        }
        match self {
            Ty::Var(v) => write!(f, "{}", v),
            Ty::Named { name, params } if name == TUPLE => {
                write!(f, "(")?;
                write_list(f, params)?;
                write!(f, ")")
            }
            Ty::Named { name, params } => {
                write!(f, "{}", name)?;
                if !params.is_empty() {
                    write!(f, "{{")?;
                    write_list(f, params)?;
                    write!(f, "}}")?;
                }
                Ok(())
            }
        }
    }
}

/// A polymorphic type scheme: a type with universally quantified variables.
///
/// The type of `identity` is `forall t0. (t0 -> t0)`, represented as
/// `Scheme { vars: [t0], ty: arrow(t0, t0) }`.
#[derive(Clone, Debug)]
pub struct Scheme {
    pub vars: Vec<TyVar>,
    pub ty: Ty,
}

impl Scheme {
    /// A scheme with no quantified variables.
    pub fn mono(ty: Ty) -> Self {
        Scheme {
            vars: Vec::new(),
            ty,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.vars.is_empty() {
            write!(f, "forall")?;
            for v in &self.vars {
                write!(f, " {}", v)?;
            }
            write!(f, ". ")?;
        }
        write!(f, "{}", self.ty)
    }
}

// ── ena trait implementations ──────────────────────────────────────────

impl ena::unify::UnifyKey for TyVar {
    type Value = Option<Ty>;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        TyVar(u)
    }

    fn tag() -> &'static str {
        "TyVar"
    }
}

impl ena::unify::EqUnifyValue for Ty {}
