//! Integration tests for generic specialization, fields and layouts,
//! including concurrent use of one registry from many threads.

use std::sync::{Arc, Barrier};
use std::thread;

use helion_typeck::layout::{Layout, SlotRepr};
use helion_typeck::{DatatypeError, DatatypeId, FieldType, Registry};

// ── Helpers ────────────────────────────────────────────────────────────

const THREADS: usize = 8;

/// `Pair{A, B}` with fields `first: A` and `second: B`.
fn pair(reg: &Registry) -> DatatypeId {
    let pair = reg
        .create("Pair", None, vec!["A".into(), "B".into()])
        .unwrap();
    reg.add_field(pair, "first", FieldType::Param("A".into()))
        .unwrap();
    reg.add_field(pair, "second", FieldType::Param("B".into()))
        .unwrap();
    pair
}

/// Run `f` on `THREADS` threads released together by a barrier.
fn race<T, F>(reg: &Arc<Registry>, f: F) -> Vec<T>
where
    T: Send + 'static,
    F: Fn(&Registry) -> T + Send + Sync + 'static,
{
    let barrier = Arc::new(Barrier::new(THREADS));
    let f = Arc::new(f);
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let reg = Arc::clone(reg);
            let barrier = Arc::clone(&barrier);
            let f = Arc::clone(&f);
            thread::spawn(move || {
                barrier.wait();
                f(&reg)
            })
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

// ── Cache Uniqueness ───────────────────────────────────────────────────

#[test]
fn test_concurrent_spawn_spec_yields_one_specialization() {
    let reg = Arc::new(Registry::new());
    let generic = pair(&reg);
    let b = reg.builtins();

    let ids = race(&reg, move |reg| reg.spawn_spec(generic, &[b.int, b.double]).unwrap());

    assert!(ids.iter().all(|id| *id == ids[0]));
    assert_eq!(reg.specializations(generic), vec![ids[0]]);
    assert_eq!(
        reg.fields(ids[0]).unwrap(),
        vec![("first".to_string(), b.int), ("second".to_string(), b.double)]
    );
}

#[test]
fn test_concurrent_distinct_tuples_each_get_one_entry() {
    let reg = Arc::new(Registry::new());
    let b = reg.builtins();
    let list = reg.create("List", None, vec!["T".into()]).unwrap();
    let elems = [b.int, b.float, b.bool, b.byte];

    let results = race(&reg, move |reg| {
        elems
            .iter()
            .map(|e| reg.spawn_spec(list, &[*e]).unwrap())
            .collect::<Vec<_>>()
    });

    for per_thread in &results {
        assert_eq!(per_thread, &results[0]);
    }
    let mut cached = reg.specializations(list);
    cached.sort();
    let mut expected = results[0].clone();
    expected.sort();
    assert_eq!(cached, expected);
}

#[test]
fn test_concurrent_variadic_tuples() {
    let reg = Arc::new(Registry::new());
    let b = reg.builtins();
    let ids = race(&reg, move |reg| reg.tuple(&[b.int, b.int, b.short]).unwrap());
    assert!(ids.iter().all(|id| *id == ids[0]));
    assert_eq!(reg.specializations(b.tuple).len(), 1);
}

#[test]
fn test_racing_callers_see_complete_fields_and_layout() {
    const FIELDS: usize = 2000;
    const ROUNDS: usize = 10;

    for _ in 0..ROUNDS {
        let reg = Arc::new(Registry::new());
        let b = reg.builtins();
        let big = reg.create("Big", None, vec!["T".into()]).unwrap();
        for i in 0..FIELDS {
            let other = if i % 2 == 0 { b.int } else { b.double };
            reg.add_field(
                big,
                format!("f{}", i),
                FieldType::Apply {
                    generic: b.tuple,
                    args: vec![FieldType::Param("T".into()), FieldType::Concrete(other)],
                },
            )
            .unwrap();
        }

        let seen = race(&reg, move |reg| {
            let id = reg.spawn_spec(big, &[b.short]).unwrap();
            let fields = reg.fields(id).unwrap().len();
            let layout = reg.layout(id).unwrap();
            (id, fields, layout)
        });

        for (id, fields, layout) in &seen {
            assert_eq!(*id, seen[0].0);
            assert_eq!(*fields, FIELDS);
            let Layout::Struct { slots, .. } = &**layout else {
                panic!("expected struct layout, got {:?}", layout);
            };
            assert_eq!(slots.len(), FIELDS + 2);
            assert!(Arc::ptr_eq(layout, &seen[0].2));
        }
    }
}

#[test]
fn test_concurrent_self_referential_specialization() {
    let reg = Arc::new(Registry::new());
    let b = reg.builtins();
    let node = reg.create("Node", None, vec!["T".into()]).unwrap();
    reg.add_field(node, "value", FieldType::Param("T".into()))
        .unwrap();
    reg.add_field(
        node,
        "next",
        FieldType::Apply {
            generic: node,
            args: vec![FieldType::Param("T".into())],
        },
    )
    .unwrap();

    let seen = race(&reg, move |reg| {
        let id = reg.spawn_spec(node, &[b.int]).unwrap();
        (id, reg.fields(id).unwrap())
    });
    for (id, fields) in &seen {
        assert_eq!(
            fields,
            &vec![("value".to_string(), b.int), ("next".to_string(), *id)]
        );
    }
}

#[test]
fn test_concurrent_mutually_recursive_generics() {
    let reg = Arc::new(Registry::new());
    let b = reg.builtins();
    let tree = reg.create("Tree", None, vec!["T".into()]).unwrap();
    let forest = reg.create("Forest", None, vec!["T".into()]).unwrap();
    let param = || FieldType::Param("T".into());
    reg.add_field(tree, "kids", FieldType::Apply { generic: forest, args: vec![param()] })
        .unwrap();
    reg.add_field(forest, "first", FieldType::Apply { generic: tree, args: vec![param()] })
        .unwrap();

    // Half the threads start from each end of the cycle.
    let counter = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let seen = race(&reg, move |reg| {
        let n = counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let start = if n % 2 == 0 { tree } else { forest };
        let id = reg.spawn_spec(start, &[b.int]).unwrap();
        reg.fields(id).unwrap().len()
    });
    assert!(seen.iter().all(|n| *n == 1));
    assert_eq!(reg.specializations(tree).len(), 1);
    assert_eq!(reg.specializations(forest).len(), 1);
}

#[test]
fn test_concurrent_layout_is_computed_once() {
    let reg = Arc::new(Registry::new());
    let b = reg.builtins();
    let point = reg.create("Point", None, vec![]).unwrap();
    reg.add_field(point, "x", b.int).unwrap();

    let layouts = race(&reg, move |reg| reg.layout(point).unwrap());
    for layout in &layouts {
        assert!(Arc::ptr_eq(layout, &layouts[0]));
    }
}

// ── Identity ───────────────────────────────────────────────────────────

#[test]
fn test_parameter_tuples_compare_by_identity() {
    let reg = Registry::new();
    let list = reg.create("List", None, vec!["T".into()]).unwrap();
    // Two distinct integer types of the same width are different parameters.
    let a = reg.create_integer("A32", 32).unwrap();
    let c = reg.create_integer("C32", 32).unwrap();
    let list_a = reg.spawn_spec(list, &[a]).unwrap();
    let list_c = reg.spawn_spec(list, &[c]).unwrap();
    assert_ne!(list_a, list_c);
}

#[test]
fn test_specializations_share_type_info() {
    let reg = Registry::new();
    let b = reg.builtins();
    let generic = pair(&reg);
    let one = reg.spawn_spec(generic, &[b.int, b.int]).unwrap();
    let two = reg.spawn_spec(generic, &[b.float, b.int]).unwrap();
    assert_eq!(reg.get(one).info, reg.get(two).info);
    assert_eq!(reg.get(one).info, reg.get(generic).info);
    assert_eq!(reg.name(one), "Pair");
}

// ── Fields ─────────────────────────────────────────────────────────────

#[test]
fn test_nested_generic_fields_are_specialized() {
    let reg = Registry::new();
    let b = reg.builtins();
    let list = reg.create("List", None, vec!["T".into()]).unwrap();
    let table = reg
        .create("Table", None, vec!["K".into(), "V".into()])
        .unwrap();
    reg.add_field(
        table,
        "keys",
        FieldType::Apply {
            generic: list,
            args: vec![FieldType::Param("K".into())],
        },
    )
    .unwrap();
    reg.add_field(
        table,
        "entries",
        FieldType::Apply {
            generic: b.slice,
            args: vec![FieldType::Apply {
                generic: b.tuple,
                args: vec![
                    FieldType::Param("K".into()),
                    FieldType::Param("V".into()),
                ],
            }],
        },
    )
    .unwrap();

    let spec = reg.spawn_spec(table, &[b.int, b.double]).unwrap();
    let fields = reg.fields(spec).unwrap();
    assert_eq!(reg.display(fields[0].1), "List{Int}");
    assert_eq!(reg.display(fields[1].1), "Slice{Tuple{Int, Double}}");
    assert_eq!(reg.display(spec), "Table{Int, Double}");
}

#[test]
fn test_field_arity_checked_at_declaration() {
    let reg = Registry::new();
    let b = reg.builtins();
    let list = reg.create("List", None, vec!["T".into()]).unwrap();
    let holder = reg.create("Holder", None, vec![]).unwrap();
    let err = reg
        .add_field(
            holder,
            "items",
            FieldType::Apply {
                generic: list,
                args: vec![FieldType::Concrete(b.int), FieldType::Concrete(b.int)],
            },
        )
        .unwrap_err();
    assert!(matches!(err, DatatypeError::SpecializationArity { .. }));
}

#[test]
fn test_upsert_on_generic_carries_into_new_specializations() {
    let reg = Registry::new();
    let b = reg.builtins();
    let boxed = reg.create("Box", None, vec!["T".into()]).unwrap();
    reg.add_field(boxed, "value", b.int).unwrap();
    reg.add_field(boxed, "value", FieldType::Param("T".into()))
        .unwrap();
    let spec = reg.spawn_spec(boxed, &[b.bool]).unwrap();
    assert_eq!(reg.fields(spec).unwrap(), vec![("value".to_string(), b.bool)]);
}

// ── Layout ─────────────────────────────────────────────────────────────

#[test]
fn test_specialized_object_layout() {
    let reg = Registry::new();
    let b = reg.builtins();
    let generic = pair(&reg);
    let point = reg.create("Point", None, vec![]).unwrap();
    let spec = reg.spawn_spec(generic, &[b.short, point]).unwrap();

    let layout = reg.layout(spec).unwrap();
    let Layout::Struct { name, slots } = &*layout else {
        panic!("expected struct layout, got {:?}", layout);
    };
    assert_eq!(name, "Pair{Short, Point}");
    assert_eq!(slots.len(), 4);
    assert_eq!(
        slots[2].repr,
        SlotRepr::Inline {
            layout: Box::new(Layout::Int { bits: 16 })
        }
    );
    assert_eq!(slots[3].repr, SlotRepr::Ref { ty: point });
    assert_eq!(layout.size(), 8 + 8 + 2 + 8);
}

#[test]
fn test_tuple_layout_is_inline() {
    let reg = Registry::new();
    let b = reg.builtins();
    let point = reg.create("Point", None, vec![]).unwrap();
    let tuple = reg.tuple(&[b.int, b.double, point]).unwrap();
    assert_eq!(reg.layout(tuple).unwrap().size(), 4 + 8 + 8);
}

#[test]
fn test_layout_serializes_with_kind_tags() {
    let reg = Registry::new();
    let b = reg.builtins();
    let slice = reg.slice(b.int).unwrap();
    let json = serde_json::to_value(&*reg.layout(slice).unwrap()).unwrap();
    assert_eq!(json["kind"], "struct");
    assert_eq!(json["name"], "Slice{Int}");
    assert_eq!(json["slots"][0]["repr"]["kind"], "length");
    assert_eq!(json["slots"][2]["repr"]["kind"], "elements");
}
