//! Integration tests for the annotation boundary and canonical rendering.

use helion_common::{parse_annotation, Span};
use helion_typeck::{
    convert, convert_with_params, from_datatype, to_datatype, DatatypeError, InferCtx, Registry,
    Ty, TypeError,
};
use rustc_hash::FxHashMap;

// ── Helpers ────────────────────────────────────────────────────────────

fn structural(ctx: &mut InferCtx, src: &str) -> Ty {
    convert(ctx, &parse_annotation(src).unwrap()).unwrap()
}

fn nominal(reg: &Registry, src: &str) -> Result<helion_typeck::DatatypeId, DatatypeError> {
    to_datatype(reg, &parse_annotation(src).unwrap(), &FxHashMap::default())
}

// ── Structural Conversion ──────────────────────────────────────────────

#[test]
fn test_convert_renders_canonically() {
    let mut ctx = InferCtx::new();
    insta::assert_snapshot!(structural(&mut ctx, "Int -> Float -> Bool").to_string(), @"(Int -> (Float -> Bool))");
    insta::assert_snapshot!(structural(&mut ctx, "[Int]").to_string(), @"Slice{Int}");
    insta::assert_snapshot!(structural(&mut ctx, "(Int, Map{Int, Float})").to_string(), @"(Int, Map{Int, Float})");
}

#[test]
fn test_parameters_become_variables() {
    let mut ctx = InferCtx::new();
    let (ty, params) =
        convert_with_params(&mut ctx, &parse_annotation("Map{k, v} -> k").unwrap()).unwrap();
    assert!(params["k"].as_var().is_some());
    assert!(params["v"].as_var().is_some());
    assert_ne!(params["k"], params["v"]);
    let (_, ret) = ty.as_arrow().unwrap();
    assert_eq!(*ret, params["k"]);
}

#[test]
fn test_parameter_arity_error_carries_span() {
    let mut ctx = InferCtx::new();
    let ann = parse_annotation("Int -> t{Int}").unwrap();
    match convert(&mut ctx, &ann).unwrap_err() {
        TypeError::ParameterArity { name, arity, span } => {
            assert_eq!(name, "t");
            assert_eq!(arity, 1);
            assert_eq!(span, Span::new(7, 13));
        }
        other => panic!("expected ParameterArity, got {:?}", other),
    }
}

#[test]
fn test_structural_display_round_trips() {
    let mut ctx = InferCtx::new();
    let types = vec![
        Ty::int(),
        Ty::unit(),
        Ty::arrow(Ty::int(), Ty::arrow(Ty::float(), Ty::bool())),
        Ty::arrow(Ty::arrow(Ty::int(), Ty::int()), Ty::bool()),
        Ty::tuple(vec![Ty::int(), Ty::named("List", vec![Ty::float()])]),
        Ty::named("Map", vec![Ty::con("String"), Ty::tuple(vec![])]),
    ];
    for ty in types {
        let back = structural(&mut ctx, &ty.to_string());
        assert_eq!(back, ty, "round trip of {}", ty);
    }
}

#[test]
fn test_round_trip_with_variables_preserves_shape() {
    let mut ctx = InferCtx::new();
    let original = structural(&mut ctx, "a -> Pair{a, b}");
    let back = structural(&mut ctx, &original.to_string());
    // Variables print as `t<n>` and come back as fresh parameters.
    assert!(ctx.unify(original.clone(), back, helion_typeck::ConstraintOrigin::Builtin).is_ok());
    assert_eq!(original.vars().len(), 2);
}

// ── Nominal Conversion ─────────────────────────────────────────────────

#[test]
fn test_nominal_display_round_trips() {
    let reg = Registry::new();
    let b = reg.builtins();
    let list = reg.create("List", None, vec!["T".into()]).unwrap();
    let list_int = reg.spawn_spec(list, &[b.int]).unwrap();
    let ids = vec![
        b.int,
        b.double,
        list_int,
        reg.tuple(&[b.int, list_int]).unwrap(),
        reg.slice(b.byte).unwrap(),
        reg.union(&[b.int, b.float]).unwrap(),
    ];
    for id in ids {
        let text = reg.display(id);
        assert_eq!(nominal(&reg, &text).unwrap(), id, "round trip of {}", text);
    }
}

#[test]
fn test_structural_image_round_trips_through_registry() {
    let reg = Registry::new();
    let b = reg.builtins();
    let method = reg.method(b.bool, &[b.int, b.double]).unwrap();
    let tuple = reg.tuple(&[b.int, b.short]).unwrap();
    for id in [method, tuple, b.long] {
        let text = from_datatype(&reg, id).to_string();
        assert_eq!(nominal(&reg, &text).unwrap(), id, "round trip of {}", text);
    }
}

#[test]
fn test_unknown_type_reports_span() {
    let reg = Registry::new();
    let err = nominal(&reg, "List{Missing}").unwrap_err();
    assert_eq!(
        err,
        DatatypeError::UnknownType {
            name: "List".into(),
            span: Span::new(0, 13)
        }
    );
}

#[test]
fn test_generic_without_parameters_is_rejected() {
    let reg = Registry::new();
    reg.create("List", None, vec!["T".into()]).unwrap();
    let err = nominal(&reg, "List").unwrap_err();
    assert!(matches!(
        err,
        DatatypeError::SpecializationArity {
            expected: 1,
            found: 0,
            ..
        }
    ));
}

#[test]
fn test_nominal_parameter_needs_scope() {
    let reg = Registry::new();
    let b = reg.builtins();
    let ann = parse_annotation("a -> a").unwrap();
    assert!(to_datatype(&reg, &ann, &FxHashMap::default()).is_err());

    let mut scope = FxHashMap::default();
    scope.insert("a".to_string(), b.int);
    let f = to_datatype(&reg, &ann, &scope).unwrap();
    assert_eq!(reg.display(f), "Fn{Int : Int}");
}
