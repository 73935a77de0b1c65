//! The `Value` sum type (spec.md §3) and its per-variant canonical
//! lexical encode/decode (spec.md §4.1).
//!
//! Per the design notes, this is a tagged sum with exhaustive dispatch:
//! `encode`/`decode` are free functions (or, for `encode`, a single match
//! in `Value::encode`) keyed by the tag, not a class hierarchy.
use crate::query::{Query, Specs};
use crate::shape::Shape;
use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use json::locale::Locale;
use json::temporal::{Temporal, TemporalAmount};
use num_bigint::BigInt;
use std::rc::Rc;
use std::str::FromStr;
use url::Url;

/// An ordered map of field name to Value, with optional `@id`/`@type` and
/// an optional carried Shape. Field insertion order is observable and
/// preserved through encode/decode and merge (spec.md §3 invariants).
#[derive(Clone, Debug)]
pub struct Object {
    /// `None` means no id was present; `Some(String::new())` is the
    /// wire-level "default/empty" id, which round-trips as itself.
    pub id: Option<String>,
    pub type_: Option<String>,
    pub shape: Option<Rc<Shape>>,
    pub fields: IndexMap<String, Value>,
}

impl Object {
    pub fn new() -> Object {
        Object {
            id: None,
            type_: None,
            shape: None,
            fields: IndexMap::new(),
        }
    }

    pub fn with_shape(shape: Rc<Shape>) -> Object {
        Object {
            shape: Some(shape),
            ..Object::new()
        }
    }
}

impl Default for Object {
    fn default() -> Self {
        Object::new()
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        // The carried Shape is wire-layer metadata, not part of value
        // identity: two otherwise-identical objects compare equal
        // regardless of which Shape (if any) they carry.
        self.id == other.id && self.type_ == other.type_ && self.fields.iter().eq(other.fields.iter())
    }
}
impl Eq for Object {}

#[derive(Clone, Debug)]
pub enum Value {
    Nil,
    Bit(bool),
    Integral(i64),
    Floating(f64),
    Integer(BigInt),
    Decimal(BigDecimal),
    String(String),
    /// Always the *absolute* form; relativization against a base happens
    /// only at `encode` time.
    Uri(String),
    Temporal(Temporal),
    TemporalAmount(TemporalAmount),
    Text(Locale, String),
    /// (datatype URI, lexical)
    Data(String, String),
    Object(Object),
    Array(Vec<Value>),
    Query(Box<Query>),
    Specs(Specs),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Nil, Nil) => true,
            (Bit(a), Bit(b)) => a == b,
            (Integral(a), Integral(b)) => a == b,
            // Bit-pattern equality: total, and consistent for NaN (unlike IEEE-754 `==`).
            (Floating(a), Floating(b)) => a.to_bits() == b.to_bits(),
            (Integer(a), Integer(b)) => a == b,
            (Decimal(a), Decimal(b)) => a == b,
            (String(a), String(b)) => a == b,
            (Uri(a), Uri(b)) => a == b,
            (Temporal(a), Temporal(b)) => a == b,
            (TemporalAmount(a), TemporalAmount(b)) => a == b,
            (Text(la, a), Text(lb, b)) => la == lb && a == b,
            (Data(da, a), Data(db, b)) => da == db && a == b,
            (Object(a), Object(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            (Query(a), Query(b)) => a == b,
            (Specs(a), Specs(b)) => a == b,
            _ => false,
        }
    }
}
impl Eq for Value {}

impl Value {
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// True for `Nil`, an empty `Object`, or an empty `Array` — the set of
    /// shapes pruned away by the codec's prune mode (spec.md §4.4 rule 6).
    pub fn is_prunable(&self) -> bool {
        match self {
            Value::Nil => true,
            Value::Object(o) => o.fields.is_empty() && o.id.is_none() && o.type_.is_none(),
            Value::Array(a) => a.is_empty(),
            _ => false,
        }
    }

    /// Canonical lexical encoding of this Value, relativizing any URI
    /// content (directly, or via a carried `Data`/`Object` id) against
    /// `base`.
    pub fn encode(&self, base: &Url) -> String {
        use Value::*;
        match self {
            Nil => String::new(),
            Bit(b) => b.to_string(),
            Integral(n) => n.to_string(),
            Floating(f) => json::number::Number::Floating(*f).encode(),
            Integer(n) => json::number::Number::Integer(n.clone()).encode(),
            Decimal(d) => json::number::Number::Decimal(d.clone()).encode(),
            String(s) => s.clone(),
            Uri(abs) => json::uri::relativize(base, abs),
            Temporal(t) => t.encode(),
            TemporalAmount(t) => t.encode(),
            Text(locale, s) => match locale {
                Locale::Root => s.clone(),
                _ => format!("{s}@{locale}"),
            },
            Data(datatype, lexical) => {
                format!("{lexical}^^{}", json::uri::relativize(base, datatype))
            }
            Object(o) => o
                .id
                .as_ref()
                .map(|id| json::uri::relativize(base, id))
                .unwrap_or_default(),
            Array(_) | Query(_) | Specs(_) => {
                // These encode through the JSON codec, not a scalar lexical.
                String::new()
            }
        }
    }
}

pub mod decode {
    use super::*;

    pub fn bit(s: &str) -> Option<Value> {
        match s {
            "true" => Some(Value::Bit(true)),
            "false" => Some(Value::Bit(false)),
            _ => None,
        }
    }

    pub fn integral(s: &str) -> Option<Value> {
        i64::from_str(s).ok().map(Value::Integral)
    }

    pub fn floating(s: &str) -> Option<Value> {
        // Accepts both the normalized scientific form and the legacy
        // plain-decimal form (spec.md §9 open question).
        s.parse::<f64>().ok().map(Value::Floating)
    }

    pub fn integer(s: &str) -> Option<Value> {
        BigInt::from_str(s).ok().map(Value::Integer)
    }

    pub fn decimal(s: &str) -> Option<Value> {
        BigDecimal::from_str(s).ok().map(Value::Decimal)
    }

    pub fn string(s: &str) -> Option<Value> {
        Some(Value::String(s.to_string()))
    }

    pub fn uri(base: &Url, s: &str) -> Option<Value> {
        json::uri::resolve(base, s).ok().map(Value::Uri)
    }

    pub fn temporal(s: &str) -> Option<Value> {
        Temporal::decode(s).ok().map(Value::Temporal)
    }

    pub fn temporal_amount(s: &str) -> Option<Value> {
        TemporalAmount::decode(s).ok().map(Value::TemporalAmount)
    }

    /// Parses `"value"` (locale `ROOT`) or `"value@tag"`.
    pub fn text(s: &str) -> Option<Value> {
        match s.rsplit_once('@') {
            Some((value, tag)) => {
                let locale = Locale::decode(tag).ok()?;
                Some(Value::Text(locale, value.to_string()))
            }
            None => Some(Value::Text(Locale::Root, s.to_string())),
        }
    }

    /// Parses `"value^^datatype"`.
    pub fn data(base: &Url, s: &str) -> Option<Value> {
        let (value, datatype) = s.rsplit_once("^^")?;
        let datatype = json::uri::resolve(base, datatype).ok()?;
        Some(Value::Data(datatype, value.to_string()))
    }
}

/// Renders a validation trace (the `Value` a `validate` call returns) as a
/// flattened, human-readable list of `path: problem` lines. Convenience
/// only: the `Object`/`Array` structure is what callers actually inspect,
/// this is never consulted by `validate` itself.
impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut lines = Vec::new();
        render_trace(self, "", &mut lines);
        write!(f, "{}", lines.join("\n"))
    }
}

fn render_trace(value: &Value, path: &str, lines: &mut Vec<std::string::String>) {
    let label = || if path.is_empty() { "<root>" } else { path };
    match value {
        Value::Nil => {}
        Value::Object(object) => {
            if let Some(Value::Array(items)) = object.fields.get("errors") {
                for item in items {
                    if let Value::String(msg) = item {
                        lines.push(format!("{}: {msg}", label()));
                    }
                }
            }
            for (name, field) in object.fields.iter() {
                if name == "errors" {
                    continue;
                }
                let nested_path = if path.is_empty() {
                    name.clone()
                } else {
                    format!("{path}.{name}")
                };
                render_trace(field, &nested_path, lines);
            }
        }
        Value::Array(items) => {
            for item in items {
                render_trace(item, path, lines);
            }
        }
        other => lines.push(format!("{}: {other:?}", label())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_base;

    #[test]
    fn bit_round_trips() {
        let base = test_base();
        assert_eq!(Value::Bit(true).encode(&base), "true");
        assert_eq!(decode::bit("true"), Some(Value::Bit(true)));
        assert_eq!(decode::bit("nope"), None);
    }

    #[test]
    fn decimal_round_trips_minimum_scale() {
        let base = test_base();
        let v = decode::decimal("0").unwrap();
        assert_eq!(v.encode(&base), "0.0");
    }

    #[test]
    fn text_round_trips_locale() {
        let base = test_base();
        let v = decode::text("hello@en-GB").unwrap();
        assert_eq!(v, Value::Text(Locale::Tag("en-GB".into()), "hello".into()));
        assert_eq!(v.encode(&base), "hello@en-GB");

        let root = decode::text("hi").unwrap();
        assert_eq!(root, Value::Text(Locale::Root, "hi".into()));
        assert_eq!(root.encode(&base), "hi");
    }

    #[test]
    fn data_round_trips() {
        let base = Url::parse("https://example.org/base/").unwrap();
        let v = decode::data(&base, "5^^https://example.org/base/xsd/int").unwrap();
        assert_eq!(v.encode(&base), "5^^xsd/int");
    }

    #[test]
    fn uri_empty_string_preserved() {
        let base = test_base();
        let v = decode::uri(&base, "").unwrap();
        assert_eq!(v, Value::Uri(String::new()));
        assert_eq!(v.encode(&base), "");
    }

    #[test]
    fn float_nan_equals_itself() {
        assert_eq!(Value::Floating(f64::NAN), Value::Floating(f64::NAN));
    }

    #[test]
    fn object_equality_ignores_shape_but_not_field_order() {
        let mut a = Object::new();
        a.fields.insert("x".into(), Value::Integral(1));
        a.fields.insert("y".into(), Value::Integral(2));

        let mut b = a.clone();
        b.fields = IndexMap::new();
        b.fields.insert("y".into(), Value::Integral(2));
        b.fields.insert("x".into(), Value::Integral(1));

        assert_ne!(Value::Object(a.clone()), Value::Object(b));
    }

    #[test]
    fn display_flattens_a_validation_trace() {
        use crate::shape::{Property, Shape};
        use crate::validate::validate;

        let surname_shape = Shape::new().with_min_count(1);
        let employee_shape =
            Shape::new().with_property(Property::new("surname", surname_shape));

        let trace = validate(&Value::Object(Object::new()), &employee_shape);
        let rendered = trace.to_string();
        assert_eq!(rendered, "surname: count 0 is below minCount 1");
    }

    #[test]
    fn display_of_nil_is_empty() {
        assert_eq!(Value::Nil.to_string(), "");
    }
}
