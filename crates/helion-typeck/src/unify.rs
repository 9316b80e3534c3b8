//! Union-find resolution and unification.
//!
//! Variables are keys in `ena`'s in-place unification table: an unbound
//! variable is the root of its equivalence class with no value, a bound one
//! has a class value (`Some(ty)`), and two variables unified together share
//! a root. `ena` chases parent indices and compresses paths on every lookup.
//!
//! One `InferCtx` belongs to one inference pass. Contexts are not shared
//! between threads; passes that need the same generic type instantiate it
//! separately.

use ena::unify::InPlaceUnificationTable;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use crate::error::{ConstraintOrigin, TypeError};
use crate::infer::Context;
use crate::ty::{Scheme, Ty, TyVar, ARROW};

/// The inference context: owns the unification table for one pass.
pub struct InferCtx {
    table: InPlaceUnificationTable<TyVar>,
}

impl InferCtx {
    pub fn new() -> Self {
        InferCtx {
            table: InPlaceUnificationTable::new(),
        }
    }

    // ── Type Variable Creation ──────────────────────────────────────────

    /// Create a fresh, unbound type variable.
    pub fn fresh_var(&mut self) -> Ty {
        Ty::Var(self.table.new_key(None))
    }

    /// Number of variables created so far in this pass.
    pub fn var_count(&self) -> usize {
        self.table.len()
    }

    // ── Resolution ──────────────────────────────────────────────────────

    /// Resolve one level of indirection.
    ///
    /// A bound variable yields its binding, an unbound one yields the root
    /// of its class (so unified-but-unbound variables resolve to the same
    /// representative). Named types come back unchanged; their parameters
    /// are not visited.
    pub fn find(&mut self, ty: Ty) -> Ty {
        match ty {
            Ty::Var(v) => match self.table.probe_value(v) {
                Some(bound) => self.find(bound),
                None => Ty::Var(self.table.find(v)),
            },
            named => named,
        }
    }

    /// Resolve a type completely, replacing every bound variable inside it.
    pub fn resolve(&mut self, ty: Ty) -> Ty {
        match self.find(ty) {
            Ty::Named { name, params } => Ty::Named {
                name,
                params: params.into_iter().map(|p| self.resolve(p)).collect(),
            },
            var => var,
        }
    }

    /// Structural equality after resolving both sides.
    pub fn equiv(&mut self, a: Ty, b: Ty) -> bool {
        self.resolve(a) == self.resolve(b)
    }

    /// Render a type with its current bindings substituted.
    pub fn display(&mut self, ty: Ty) -> String {
        self.resolve(ty).to_string()
    }

    // ── Occurs Check ────────────────────────────────────────────────────

    /// Whether `var` (or any variable in its class) occurs in `ty`.
    ///
    /// Must hold false before every binding, otherwise the binding would
    /// create an infinite type such as `t0 = List{t0}`.
    pub fn occurs(&mut self, var: TyVar, ty: &Ty) -> bool {
        let root = self.table.find(var);
        match self.find(ty.clone()) {
            Ty::Var(v) => v == root,
            Ty::Named { params, .. } => params.iter().any(|p| self.occurs(root, p)),
        }
    }

    // ── Binding ─────────────────────────────────────────────────────────

    /// Bind `var` to `ty`. The only operation that mutates bindings.
    ///
    /// A no-op when both already resolve to the same type. An already bound
    /// `var` is unified with `ty` instead of being rebound.
    pub fn do_union(
        &mut self,
        var: TyVar,
        ty: Ty,
        origin: ConstraintOrigin,
    ) -> Result<(), TypeError> {
        let root = self.table.find(var);
        if let Some(bound) = self.table.probe_value(root) {
            return self.unify(bound, ty, origin);
        }

        let ty = self.find(ty);
        if let Ty::Var(other) = ty {
            if other != root {
                trace!(var = %root, other = %other, "union variables");
                self.table
                    .unify_var_var(root, other)
                    .map_err(|(expected, found)| TypeError::Mismatch {
                        expected,
                        found,
                        origin,
                    })?;
            }
            return Ok(());
        }

        if self.occurs(root, &ty) {
            let ty = self.resolve(ty);
            return Err(TypeError::InfiniteType {
                var: root,
                ty,
                origin,
            });
        }

        trace!(var = %root, ty = %ty, "bind variable");
        self.table
            .unify_var_value(root, Some(ty))
            .map_err(|(expected, found)| TypeError::Mismatch {
                expected,
                found,
                origin,
            })
    }

    // ── Unification ─────────────────────────────────────────────────────

    /// Unify two types, binding variables so that both resolve equally.
    ///
    /// Arrows unify domain with domain, then codomain with codomain. Other
    /// named types must agree on name and arity and unify parameter by
    /// parameter, left to right, stopping at the first failure. Bindings made
    /// before a failure are kept.
    pub fn unify(&mut self, a: Ty, b: Ty, origin: ConstraintOrigin) -> Result<(), TypeError> {
        let a = self.find(a);
        let b = self.find(b);

        match (a, b) {
            (Ty::Var(v1), Ty::Var(v2)) if v1 == v2 => Ok(()),

            (Ty::Var(v), other) | (other, Ty::Var(v)) => self.do_union(v, other, origin),

            (
                Ty::Named {
                    name: n1,
                    params: p1,
                },
                Ty::Named {
                    name: n2,
                    params: p2,
                },
            ) => {
                if n1 == ARROW && n2 == ARROW && p1.len() == 2 && p2.len() == 2 {
                    let mut p1 = p1.into_iter();
                    let mut p2 = p2.into_iter();
                    if let (Some(a1), Some(b1), Some(a2), Some(b2)) =
                        (p1.next(), p1.next(), p2.next(), p2.next())
                    {
                        self.unify(a1, a2, origin.clone())?;
                        return self.unify(b1, b2, origin);
                    }
                    return Ok(());
                }

                if n1 != n2 || p1.len() != p2.len() {
                    let expected = self.resolve(Ty::named(n1, p1));
                    let found = self.resolve(Ty::named(n2, p2));
                    return Err(TypeError::Mismatch {
                        expected,
                        found,
                        origin,
                    });
                }

                for (x, y) in p1.into_iter().zip(p2) {
                    self.unify(x, y, origin.clone())?;
                }
                Ok(())
            }
        }
    }

    // ── Generalization ──────────────────────────────────────────────────

    /// Unbound variable roots occurring free in any type of `ctx`.
    fn context_vars(&mut self, ctx: &Context) -> FxHashSet<TyVar> {
        let types: Vec<Ty> = ctx.types().cloned().collect();
        let mut out = FxHashSet::default();
        for ty in types {
            out.extend(self.resolve(ty).vars());
        }
        out
    }

    /// Quantify every unbound variable of `ty` that is not free in `ctx`.
    pub fn generalize(&mut self, ty: Ty, ctx: &Context) -> Scheme {
        let ty = self.resolve(ty);
        let bound = self.context_vars(ctx);
        let vars = ty.vars().into_iter().filter(|v| !bound.contains(v)).collect();
        Scheme { vars, ty }
    }

    // ── Instantiation ───────────────────────────────────────────────────

    /// Instantiate a scheme, giving each quantified variable a fresh one.
    ///
    /// Every call produces new variables, so two instantiations of the same
    /// scheme never share mutable state.
    pub fn instantiate(&mut self, scheme: &Scheme) -> Ty {
        if scheme.vars.is_empty() {
            return scheme.ty.clone();
        }

        let substitution: FxHashMap<TyVar, Ty> = scheme
            .vars
            .iter()
            .map(|v| (*v, self.fresh_var()))
            .collect();

        self.apply_substitution(&scheme.ty, &substitution)
    }

    /// Copy `ty`, replacing variables not bound by `ctx` with fresh ones.
    ///
    /// Occurrences of the same free variable map to the same fresh variable
    /// within one call; separate calls never share them.
    pub fn inst(&mut self, ty: Ty, ctx: &Context) -> Ty {
        let scheme = self.generalize(ty, ctx);
        self.instantiate(&scheme)
    }

    fn apply_substitution(&mut self, ty: &Ty, subst: &FxHashMap<TyVar, Ty>) -> Ty {
        match ty {
            Ty::Var(v) => {
                if let Some(replacement) = subst.get(v) {
                    return replacement.clone();
                }
                match self.table.probe_value(*v) {
                    Some(inner) => self.apply_substitution(&inner, subst),
                    None => ty.clone(),
                }
            }
            Ty::Named { name, params } => Ty::Named {
                name: name.clone(),
                params: params
                    .iter()
                    .map(|p| self.apply_substitution(p, subst))
                    .collect(),
            },
        }
    }
}

impl Default for InferCtx {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
