use std::sync::Arc;

use chrono::DateTime;
use reql_coerce::{
    CoerceError, CoerceOptions, Coercer, DepthPolicy, ErrorKind, Lambda, SerdeDocument, Term, Value,
    to_ast, to_expr,
};
use serde::Serialize;
use serde_json::json;

#[derive(Serialize)]
struct Item {
    name: &'static str,
    price: i64,
    tags: Vec<&'static str>,
    #[serde(skip)]
    _cached_embed: Option<String>,
}

fn item(name: &'static str, price: i64) -> Value {
    Value::object(SerdeDocument::new(Item { name, price, tags: vec!["shop"], _cached_embed: None }))
}

#[test]
fn mixed_document_wire_form() {
    let stamp = DateTime::parse_from_rfc3339("2021-06-15T10:30:00+02:00").unwrap();
    let value = Value::map([
        ("items", Value::from(vec![item("pickaxe", 15), item("fishrod", 10)])),
        ("updated", Value::from(stamp)),
        ("limit", Value::from(3i32)),
    ]);
    let wire = to_expr(value).unwrap().build().unwrap();
    assert_eq!(wire, json!([3, [], {
        "items": [2, [
            [3, [], {"name": "pickaxe", "price": 15, "tags": [2, ["shop"]]}],
            [3, [], {"name": "fishrod", "price": 10, "tags": [2, ["shop"]]}],
        ]],
        "updated": [99, ["2021-06-15T10:30:00.000+02:00"]],
        "limit": 3,
    }]));
}

#[test]
fn error_kinds_surface_through_the_api() {
    let bad_key = to_ast(Value::map([(Value::Bool(true), Value::Null)])).unwrap_err();
    assert_eq!(bad_key.kind(), ErrorKind::Compile);

    let bare_func = to_expr(Lambda::unary(|row| row)).unwrap_err();
    assert_eq!(bare_func.kind(), ErrorKind::Driver);

    let not_object = to_ast(Value::object(SerdeDocument::new(vec![1, 2]))).unwrap_err();
    assert!(matches!(not_object, CoerceError::Snapshot { .. }));
}

#[test]
fn prebuilt_terms_are_embedded_as_is() {
    let inner = to_ast(vec![1i64, 2]).unwrap();
    let outer = to_ast(Value::map([("xs", Value::Ast(inner.clone()))])).unwrap();
    let Term::MakeObj(fields) = outer else { panic!("expected an object") };
    assert_eq!(fields["xs"], inner);
}

#[test]
fn coercers_are_shareable_across_threads() {
    let coercer = Arc::new(Coercer::new(
        CoerceOptions::default().with_max_depth(10).with_depth_policy(DepthPolicy::Uniform),
    ));
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4i64)
            .map(|n| {
                let coercer = Arc::clone(&coercer);
                scope.spawn(move || coercer.to_ast(vec![n; 3]).unwrap())
            })
            .collect();
        for (n, handle) in handles.into_iter().enumerate() {
            let term = handle.join().unwrap();
            assert_eq!(term.build().unwrap(), json!([2, [n, n, n]]));
        }
    });
}
