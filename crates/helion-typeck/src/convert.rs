//! The boundary between parsed annotations and the two type layers.
//!
//! [`convert`] turns an annotation into a structural type for inference.
//! [`to_datatype`] resolves an annotation against the registry into a
//! nominal type, and [`from_datatype`] gives the structural image of a
//! nominal type.

use helion_common::annotation::TypeAnnotation;
use rustc_hash::FxHashMap;

use crate::datatype::{DatatypeId, Registry, Style};
use crate::error::{DatatypeError, TypeError};
use crate::ty::{Ty, TUPLE};
use crate::unify::InferCtx;

/// Convert an annotation to a structural type.
///
/// Free parameters become fresh variables; every occurrence of the same
/// parameter name maps to the same variable.
pub fn convert(ctx: &mut InferCtx, ann: &TypeAnnotation) -> Result<Ty, TypeError> {
    convert_with_params(ctx, ann).map(|(ty, _)| ty)
}

/// Like [`convert`], also returning the variable chosen for each parameter.
pub fn convert_with_params(
    ctx: &mut InferCtx,
    ann: &TypeAnnotation,
) -> Result<(Ty, FxHashMap<String, Ty>), TypeError> {
    let mut params = FxHashMap::default();
    let ty = convert_in(ctx, ann, &mut params)?;
    Ok((ty, params))
}

fn convert_in(
    ctx: &mut InferCtx,
    ann: &TypeAnnotation,
    params: &mut FxHashMap<String, Ty>,
) -> Result<Ty, TypeError> {
    if ann.parameter {
        if !ann.params.is_empty() {
            return Err(TypeError::ParameterArity {
                name: ann.name.clone(),
                arity: ann.params.len(),
                span: ann.span,
            });
        }
        let var = params
            .entry(ann.name.clone())
            .or_insert_with(|| ctx.fresh_var());
        return Ok(var.clone());
    }

    let children = ann
        .params
        .iter()
        .map(|child| convert_in(ctx, child, params))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Ty::named(ann.name.clone(), children))
}

/// Resolve an annotation to a specialized nominal type.
///
/// `scope` binds type parameter names to concrete types. Arrow chains become
/// a single method type (`A -> B -> C` is `Fn{A, B : C}` and `() -> C` is
/// `Fn{ : C}`), tuples become `Tuple{..}`, and named types with parameters
/// are specialized through the registry.
pub fn to_datatype(
    registry: &Registry,
    ann: &TypeAnnotation,
    scope: &FxHashMap<String, DatatypeId>,
) -> Result<DatatypeId, DatatypeError> {
    if ann.parameter {
        if !ann.params.is_empty() {
            return Err(DatatypeError::ParameterArity {
                name: ann.name.clone(),
                span: ann.span,
            });
        }
        return scope
            .get(&ann.name)
            .copied()
            .ok_or_else(|| DatatypeError::UnknownType {
                name: ann.name.clone(),
                span: ann.span,
            });
    }

    if ann.is_arrow() {
        let mut domains = Vec::new();
        let mut cursor = ann;
        while cursor.is_arrow() {
            domains.push(&cursor.params[0]);
            cursor = &cursor.params[1];
        }
        let thunk = matches!(domains.as_slice(), [only] if only.is_tuple() && only.params.is_empty());
        if thunk {
            domains.clear();
        }
        let ret = to_datatype(registry, cursor, scope)?;
        let args = domains
            .into_iter()
            .map(|d| to_datatype(registry, d, scope))
            .collect::<Result<Vec<_>, _>>()?;
        return registry.method(ret, &args);
    }

    let generic = if ann.name == TUPLE {
        registry.builtins().tuple
    } else {
        registry
            .lookup(&ann.name)
            .ok_or_else(|| DatatypeError::UnknownType {
                name: ann.name.clone(),
                span: ann.span,
            })?
    };
    let params = ann
        .params
        .iter()
        .map(|p| to_datatype(registry, p, scope))
        .collect::<Result<Vec<_>, _>>()?;
    registry.spawn_spec(generic, &params)
}

/// The structural image of a nominal type.
///
/// Methods become curried arrows, tuples become `()` tuples, everything else
/// keeps its name and parameters. Generic templates map to their bare name.
pub fn from_datatype(registry: &Registry, id: DatatypeId) -> Ty {
    let dt = registry.get(id);
    let info = registry.info(dt.info);
    let params: Vec<Ty> = dt
        .params
        .iter()
        .map(|p| from_datatype(registry, *p))
        .collect();

    match info.style {
        Style::Tuple if dt.specialized => Ty::tuple(params),
        Style::Method if dt.specialized => {
            let mut params = params.into_iter();
            match params.next() {
                Some(ret) => Ty::curried(params.collect(), ret),
                None => Ty::con(info.name.clone()),
            }
        }
        _ => Ty::named(info.name.clone(), params),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helion_common::parse_annotation;

    fn ann(src: &str) -> TypeAnnotation {
        parse_annotation(src).unwrap()
    }

    #[test]
    fn constructors_convert_structurally() {
        let mut ctx = InferCtx::new();
        let ty = convert(&mut ctx, &ann("Map{Int, (Float, Bool)}")).unwrap();
        assert_eq!(ty.to_string(), "Map{Int, (Float, Bool)}");
    }

    #[test]
    fn repeated_parameter_shares_a_variable() {
        let mut ctx = InferCtx::new();
        let (ty, params) = convert_with_params(&mut ctx, &ann("a -> b -> a")).unwrap();
        let (d, rest) = ty.as_arrow().unwrap();
        let (_, c) = rest.as_arrow().unwrap();
        assert_eq!(d, c);
        assert_eq!(params.len(), 2);
        assert_eq!(params["a"], *d);
    }

    #[test]
    fn separate_conversions_do_not_share() {
        let mut ctx = InferCtx::new();
        let first = convert(&mut ctx, &ann("a")).unwrap();
        let second = convert(&mut ctx, &ann("a")).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn parameter_with_children_is_rejected() {
        let mut ctx = InferCtx::new();
        let err = convert(&mut ctx, &ann("t{Int}")).unwrap_err();
        assert!(matches!(err, TypeError::ParameterArity { arity: 1, .. }));
    }

    #[test]
    fn to_datatype_specializes() {
        let reg = Registry::new();
        let b = reg.builtins();
        let scope = FxHashMap::default();
        let slice = to_datatype(&reg, &ann("[Int]"), &scope).unwrap();
        assert_eq!(slice, reg.slice(b.int).unwrap());

        let f = to_datatype(&reg, &ann("Int -> Float -> Bool"), &scope).unwrap();
        assert_eq!(reg.display(f), "Fn{Int, Float : Bool}");

        let thunk = to_datatype(&reg, &ann("() -> Int"), &scope).unwrap();
        assert_eq!(reg.display(thunk), "Fn{ : Int}");
    }

    #[test]
    fn to_datatype_resolves_parameters_from_scope() {
        let reg = Registry::new();
        let b = reg.builtins();
        let mut scope = FxHashMap::default();
        scope.insert("t".to_string(), b.double);
        let pair = to_datatype(&reg, &ann("(t, Int)"), &scope).unwrap();
        assert_eq!(reg.params(pair), vec![b.double, b.int]);
        assert!(to_datatype(&reg, &ann("u"), &scope).is_err());
    }

    #[test]
    fn from_datatype_images() {
        let reg = Registry::new();
        let b = reg.builtins();
        let f = reg.method(b.bool, &[b.int, b.float]).unwrap();
        assert_eq!(from_datatype(&reg, f).to_string(), "(Int -> (Float -> Bool))");
        let t = reg.tuple(&[b.int]).unwrap();
        assert_eq!(from_datatype(&reg, t).to_string(), "(Int)");
    }
}
