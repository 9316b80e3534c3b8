//! The nominal subtype relation.
//!
//! `subtype(a, b)` holds when `a <: b`. Integers and floats are ordered by
//! width within their style, tuples are covariant and pointwise, and objects
//! follow the single-inheritance chain up to `Any`, comparing families by
//! [`TypeInfoId`](crate::datatype::TypeInfoId) rather than by name.
//! Methods, slices and unions are only subtypes of themselves.

use crate::datatype::{DatatypeId, Registry, Style};
use crate::error::DatatypeError;

/// Whether `a` is a subtype of (or equal to) `b`.
pub fn subtype(registry: &Registry, a: DatatypeId, b: DatatypeId) -> Result<bool, DatatypeError> {
    let a_dt = registry.get(a);
    let b_dt = registry.get(b);
    for dt in [&a_dt, &b_dt] {
        if !dt.specialized {
            return Err(DatatypeError::UnspecializedSubtype {
                name: registry.name(dt.id),
            });
        }
    }

    let a_info = registry.info(a_dt.info);
    let b_info = registry.info(b_dt.info);
    if a_info.style != b_info.style {
        return Ok(false);
    }

    match a_info.style {
        Style::Integer | Style::Floating => Ok(a_info.bits <= b_info.bits),
        Style::Tuple => pointwise(registry, &a_dt.params, &b_dt.params),
        Style::Object => {
            let any = registry.builtins().any;
            if b == any {
                return Ok(true);
            }
            let mut current = a;
            while current != any {
                let ancestor = registry.get(current);
                if ancestor.info == b_dt.info {
                    return pointwise(registry, &ancestor.params, &b_dt.params);
                }
                current = registry.supertype(current);
            }
            Ok(false)
        }
        Style::Method | Style::Slice | Style::Union => Ok(a == b),
    }
}

/// Same length and every pair in subtype relation.
fn pointwise(
    registry: &Registry,
    a: &[DatatypeId],
    b: &[DatatypeId],
) -> Result<bool, DatatypeError> {
    if a.len() != b.len() {
        return Ok(false);
    }
    for (x, y) in a.iter().zip(b) {
        if !subtype(registry, *x, *y)? {
            return Ok(false);
        }
    }
    Ok(true)
}
