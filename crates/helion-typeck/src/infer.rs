//! Type deduction over IIR functions.
//!
//! Each value is deduced at most once per function: the [`Context`] maps
//! already-deduced values to their types and is consulted first. Deduction
//! adds equality constraints through [`InferCtx::unify`] as it goes, so a
//! function's type is fully known once every block has been walked.
//!
//! Functions of a program are inferred in order. Each one is generalized
//! over the variables left unbound and published in the [`Env`] so later
//! functions instantiate it afresh at every use.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{ConstraintOrigin, TypeError};
use crate::iir::{Func, InstKind, ValueId, ValueKind};
use crate::ty::{Scheme, Ty};
use crate::unify::InferCtx;

/// Types of the values deduced so far.
#[derive(Clone, Debug, Default)]
pub struct Context {
    types: FxHashMap<ValueId, Ty>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: ValueId, ty: Ty) {
        self.types.insert(value, ty);
    }

    pub fn get(&self, value: ValueId) -> Option<&Ty> {
        self.types.get(&value)
    }

    pub fn contains(&self, value: ValueId) -> bool {
        self.types.contains_key(&value)
    }

    pub fn types(&self) -> impl Iterator<Item = &Ty> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Type schemes of named functions.
#[derive(Clone, Debug, Default)]
pub struct Env {
    schemes: FxHashMap<String, Scheme>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, scheme: Scheme) {
        self.schemes.insert(name.into(), scheme);
    }

    pub fn lookup(&self, name: &str) -> Option<&Scheme> {
        self.schemes.get(name)
    }
}

/// Deduce the type of `id` in `func`, memoized through `gamma`.
pub fn deduce(
    ctx: &mut InferCtx,
    env: &Env,
    func: &Func,
    gamma: &mut Context,
    id: ValueId,
) -> Result<Ty, TypeError> {
    if let Some(ty) = gamma.get(id) {
        return Ok(ty.clone());
    }

    let value = func.value(id);
    let ty = match &value.kind {
        ValueKind::ConstInt(_) | ValueKind::ConstFloat(_) | ValueKind::Arg(_) => value.ty.clone(),

        ValueKind::Global(name) => {
            let scheme = env
                .lookup(name)
                .ok_or_else(|| TypeError::UnknownGlobal { name: name.clone() })?;
            let ty = ctx.instantiate(scheme);
            ctx.unify(value.ty.clone(), ty, ConstraintOrigin::Builtin)?;
            value.ty.clone()
        }

        ValueKind::Inst(kind) => match kind {
            InstKind::Alloc => value.ty.clone(),

            InstKind::Store { dst, src } => {
                let dst_ty = deduce(ctx, env, func, gamma, *dst)?;
                let src_ty = deduce(ctx, env, func, gamma, *src)?;
                ctx.unify(dst_ty.clone(), src_ty, ConstraintOrigin::Store { value: id })?;
                dst_ty
            }

            InstKind::Load { src } => {
                let src_ty = deduce(ctx, env, func, gamma, *src)?;
                ctx.unify(value.ty.clone(), src_ty.clone(), ConstraintOrigin::Builtin)?;
                src_ty
            }

            InstKind::Ret(ret) => {
                let ret_ty = deduce(ctx, env, func, gamma, *ret)?;
                ctx.unify(
                    func.ret.clone(),
                    ret_ty.clone(),
                    ConstraintOrigin::Return {
                        func: func.name.clone(),
                    },
                )?;
                ret_ty
            }

            InstKind::Binary { lhs, rhs, .. } => {
                let lhs_ty = deduce(ctx, env, func, gamma, *lhs)?;
                let rhs_ty = deduce(ctx, env, func, gamma, *rhs)?;
                let origin = ConstraintOrigin::Binary { value: id };
                ctx.unify(lhs_ty.clone(), rhs_ty, origin.clone())?;
                ctx.unify(value.ty.clone(), lhs_ty, origin)?;
                value.ty.clone()
            }

            InstKind::Call { callee, args } => {
                let callee_ty = deduce(ctx, env, func, gamma, *callee)?;
                let mut arg_tys = Vec::with_capacity(args.len());
                for arg in args {
                    arg_tys.push(deduce(ctx, env, func, gamma, *arg)?);
                }
                let expected = Ty::curried(arg_tys, value.ty.clone());
                ctx.unify(callee_ty, expected, ConstraintOrigin::Call { value: id })?;
                value.ty.clone()
            }

            InstKind::Br { cond, .. } => {
                let cond_ty = deduce(ctx, env, func, gamma, *cond)?;
                ctx.unify(Ty::bool(), cond_ty, ConstraintOrigin::Branch { value: id })?;
                Ty::unit()
            }

            InstKind::Jmp(_) => Ty::unit(),
        },
    };

    gamma.insert(id, ty.clone());
    Ok(ty)
}

/// Deduce every instruction of `func` and return its resolved function type.
pub fn deduce_func(ctx: &mut InferCtx, env: &Env, func: &Func) -> Result<Ty, TypeError> {
    let mut gamma = Context::new();
    for arg in &func.args {
        deduce(ctx, env, func, &mut gamma, *arg)?;
    }
    for block in &func.blocks {
        for inst in &block.insts {
            deduce(ctx, env, func, &mut gamma, *inst)?;
        }
    }
    Ok(ctx.resolve(func.fn_type()))
}

/// Infer a sequence of functions, publishing each generalized type in `env`.
///
/// While a function is being inferred its own name is bound monomorphically,
/// so a recursive call constrains the function's type directly.
pub fn infer_program(
    ctx: &mut InferCtx,
    env: &mut Env,
    funcs: &[Func],
) -> Result<Vec<Scheme>, TypeError> {
    let mut schemes = Vec::with_capacity(funcs.len());
    for func in funcs {
        env.insert(func.name.clone(), Scheme::mono(func.fn_type()));
        let ty = deduce_func(ctx, env, func)?;
        let scheme = ctx.generalize(ty, &Context::new());
        debug!(func = %func.name, scheme = %scheme, "inferred function");
        env.insert(func.name.clone(), scheme.clone());
        schemes.push(scheme);
    }
    Ok(schemes)
}
