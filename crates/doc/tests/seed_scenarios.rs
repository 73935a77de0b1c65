//! End-to-end coverage of the concrete seed scenarios and the universal
//! round-trip/merge-law properties.
use doc::query::{parse_json, parse_url};
use doc::shape::{Datatype, Property, Shape};
use doc::value::Value;
use doc::{decode, encode, validate, Expression, Options};
use std::rc::Rc;
use url::Url;

fn base() -> Url {
    Url::parse("app:/").unwrap()
}

// Scenario 1: decode `"{'x':1,'y':2}"` with no shape.
#[test]
fn seed_one_decodes_unshaped_object_preserving_order() {
    let v = decode("{'x':1,'y':2}", None, &base(), &Options::new()).unwrap();
    match v {
        Value::Object(o) => {
            let keys: Vec<_> = o.fields.keys().cloned().collect();
            assert_eq!(keys, vec!["x".to_string(), "y".to_string()]);
            assert_eq!(o.fields["x"], Value::Integral(1));
            assert_eq!(o.fields["y"], Value::Integral(2));
        }
        other => panic!("expected object, got {other:?}"),
    }
}

// Scenario 2: decode `"{'id':'path'}"` with Shape.id="id" and a base.
#[test]
fn seed_two_decodes_id_shorthand_against_shape() {
    let shape = Shape::new().with_id_field("id");
    let base = Url::parse("https://example.org/base/").unwrap();
    let v = decode("{'id':'path'}", Some(&shape), &base, &Options::new()).unwrap();
    match v {
        Value::Object(o) => assert_eq!(o.id.as_deref(), Some("https://example.org/base/path")),
        other => panic!("expected object, got {other:?}"),
    }
}

// Scenario 3: parse URL query `x>=lower&x<=upper` against a shape with a
// forward property `x`.
#[test]
fn seed_three_parses_url_range_query() {
    let shape = Shape::new().with_property(Property::new("x", Shape::new()));
    let q = parse_url("x>=lower&x<=upper", &shape).unwrap();
    let crit = q.criteria.get(&Expression::path(["x"])).unwrap();
    assert_eq!(crit.gte, Some(Value::String("lower".into())));
    assert_eq!(crit.lte, Some(Value::String("upper".into())));
}

// Scenario 4: parse the JSON sigil-keyed array form into a Specs-backed
// query projecting `office` and `count()`.
#[test]
fn seed_four_parses_json_specs_query() {
    let shape = Shape::new().with_property(
        Property::new("office", Shape::new().with_property(Property::new("label", Shape::new()))),
    );
    let input = r#"[{"~office.label":"US","^":["count()"],"#":10,"count()":0,"office":{"id":"","label":""}}]"#;
    let tree = json::tree::parse(input).unwrap();
    let query = parse_json(&tree, &shape).unwrap();

    assert_eq!(query.limit, Some(10));
    let like_crit = query.criteria.get(&Expression::path(["office", "label"])).unwrap();
    assert_eq!(like_crit.like.as_deref(), Some("US"));
    let order_crit = query.criteria.get(&Expression::parse("count()")).unwrap();
    assert_eq!(order_crit.order, Some(1));

    match &query.model {
        Value::Specs(specs) => {
            let columns = specs.columns();
            assert!(columns.contains(&"office"));
            assert!(columns.contains(&"count()"));
        }
        other => panic!("expected specs model, got {other:?}"),
    }
}

// Scenario 5: encoding a just-parsed Query array form reproduces the same
// key order and values (spec.md §8 "URI base fidelity" analogue for
// queries).
#[test]
fn seed_five_query_encode_round_trips_json_form() {
    let shape = Shape::new().with_property(Property::new("x", Shape::new()));
    let input = r#"[{"^x":"decreasing","#":10}]"#;
    let tree = json::tree::parse(input).unwrap();
    let query = parse_json(&tree, &shape).unwrap();

    let base = base();
    let text = encode(&Value::Query(Box::new(query)), None, &base, &Options::new());
    assert_eq!(text, input);
}

// Scenario 6: validating an Object missing a required `surname` against an
// Employee-like shape produces a non-empty trace referencing `surname` and
// `minCount`.
#[test]
fn seed_six_missing_required_property_reports_min_count() {
    let shape = Rc::new(
        Shape::new().with_property(
            Property::new("surname", Shape::new().with_min_count(1)),
        ),
    );
    let object = doc::value::Object::with_shape(shape.clone());
    let trace = validate(&Value::Object(object), &shape);
    match trace {
        Value::Object(o) => {
            let nested = o.fields.get("surname").expect("trace mentions surname");
            match nested {
                Value::Object(n) => {
                    let errors = n.fields.get("errors").expect("errors field");
                    match errors {
                        Value::Array(items) => assert!(items.iter().any(|v| match v {
                            Value::String(s) => s.contains("minCount"),
                            _ => false,
                        })),
                        other => panic!("expected array, got {other:?}"),
                    }
                }
                other => panic!("expected nested trace object, got {other:?}"),
            }
        }
        other => panic!("expected non-nil trace, got {other:?}"),
    }
}

// Universal property: value round-trip through canonical lexical encoding.
#[test]
fn value_round_trips_through_lexical_encoding() {
    let base = base();
    let v = Value::Decimal(bigdecimal::BigDecimal::from(0));
    let s = v.encode(&base);
    assert_eq!(s, "0.0");
    assert_eq!(doc::value::decode::decimal(&s), Some(v));
}

// Universal property: JSON-with-shape round-trip (decode(encode(v)) = v).
#[test]
fn json_with_shape_round_trips() {
    let shape = Rc::new(
        Shape::new()
            .with_property(Property::new("name", Shape::new()))
            .with_property(Property::new("age", Shape::new().with_datatype(Datatype::Integral))),
    );
    let mut object = doc::value::Object::with_shape(shape.clone());
    object.fields.insert("name".to_string(), Value::String("Ada".into()));
    object.fields.insert("age".to_string(), Value::Integral(36));
    let original = Value::Object(object);

    let base = base();
    let options = Options::new();
    let text = encode(&original, Some(&shape), &base, &options);
    let decoded = decode(&text, Some(&shape), &base, &options).unwrap();

    assert_eq!(original, decoded);
}

// Universal property: expand is idempotent and populate is idempotent on
// self for shape-conformant values.
#[test]
fn expand_and_populate_are_idempotent() {
    let shape = Rc::new(Shape::new().with_property(Property::new("name", Shape::new())));
    let object = doc::value::Object::with_shape(shape);
    let v = Value::Object(object);

    let expanded_once = doc::populate::expand(&v);
    let expanded_twice = doc::populate::expand(&expanded_once);
    assert_eq!(expanded_once, expanded_twice);

    let populated = doc::populate::populate(&expanded_once, &expanded_once);
    assert_eq!(populated, expanded_once);
}

// Universal property: `merge` is an identity against an empty Shape, and
// `extend` preserves the left explicit class.
#[test]
fn shape_merge_laws_hold() {
    let a = Shape::new().with_min_count(1);
    let merged = doc::shape::merge(&a, &Shape::new()).unwrap();
    assert_eq!(merged, a);

    let left = Shape::new().with_explicit_class(doc::shape::Type::new("Widget"));
    let right = Shape::new().with_explicit_class(doc::shape::Type::new("Gadget"));
    let extended = doc::shape::extend(&left, &right).unwrap();
    assert_eq!(extended.explicit_class().unwrap().name, "Widget");
}
