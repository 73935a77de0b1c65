//! The pure, stateless validator (spec.md §4.2): walks a focus `Value`
//! against a `Shape`, producing a trace `Value` rather than raising. An
//! empty trace (`Nil`) means the focus satisfied the shape.
//!
//! Grounded in the teacher's `Schema::validate`/`Validator` walk
//! (`doc::schema`, `doc::inference`): a recursive descent that aggregates
//! rather than short-circuits, differing from the teacher's approach only
//! in that failures are reified as data instead of an accumulated error
//! list.
use crate::shape::{Datatype, Shape};
use crate::value::{Object, Value};
use std::cmp::Ordering;

/// Validates `value` against `shape`, returning `Value::Nil` on success or
/// a non-empty `Value::Object` trace describing every failure found.
pub fn validate(value: &Value, shape: &Shape) -> Value {
    let mut errors = Vec::new();
    check_datatype(value, shape, &mut errors);
    check_range(value, shape, &mut errors);
    check_text(value, shape, &mut errors);
    check_in(value, shape, &mut errors);
    check_has_value(value, shape, &mut errors);
    check_language(value, shape, &mut errors);
    check_count(value, shape, &mut errors);

    let mut trace = Object::new();
    if !errors.is_empty() {
        trace.fields.insert(
            "errors".to_string(),
            Value::Array(errors.into_iter().map(Value::String).collect()),
        );
    }

    if let Value::Object(object) = value {
        for (name, property) in shape.properties.iter() {
            let field = object.fields.get(name).cloned().unwrap_or(Value::Nil);
            let nested = validate(&field, &property.shape);
            if !nested.is_nil() {
                trace.fields.insert(name.clone(), nested);
            }
        }
    }

    for constraint in &shape.constraints {
        let fragment = (constraint.0)(value);
        if !fragment.is_nil() && !fragment.is_prunable() {
            let key = format!("constraint[{}]", trace.fields.len());
            trace.fields.insert(key, fragment);
        }
    }

    if trace.fields.is_empty() {
        Value::Nil
    } else {
        Value::Object(trace)
    }
}

fn focus_items(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Nil => Vec::new(),
        other => vec![other],
    }
}

fn datatype_of(value: &Value) -> Option<Datatype> {
    use Value::*;
    Some(match value {
        Nil => Datatype::Nil,
        Bit(_) => Datatype::Bit,
        Integral(_) => Datatype::Integral,
        Floating(_) => Datatype::Floating,
        Integer(_) => Datatype::Integer,
        Decimal(_) => Datatype::Decimal,
        String(_) => Datatype::String,
        Uri(_) => Datatype::Uri,
        Temporal(_) => Datatype::Temporal,
        TemporalAmount(_) => Datatype::TemporalAmount,
        Text(_, _) => Datatype::Text,
        Data(_, _) => Datatype::Data,
        Object(_) => Datatype::Object,
        Array(_) => Datatype::Array,
        Query(_) | Specs(_) => return None,
    })
}

fn datatype_matches(expected: Datatype, actual: Datatype) -> bool {
    if expected == actual {
        return true;
    }
    // `Number` is a decode-time dispatch tag, not a materialized variant;
    // any concrete numeric kind satisfies it (spec.md §9 open question).
    expected == Datatype::Number
        && matches!(
            actual,
            Datatype::Integral | Datatype::Floating | Datatype::Integer | Datatype::Decimal
        )
}

fn check_datatype(value: &Value, shape: &Shape, errors: &mut Vec<String>) {
    let Some(expected) = shape.datatype else {
        return;
    };
    if matches!(value, Value::Array(_) | Value::Nil) {
        return;
    }
    // Object identity: matched by Shape identity (id/type fields) when
    // declared, else structurally by the datatype check alone.
    if expected == Datatype::Object {
        if let Value::Object(object) = value {
            if (shape.id.is_some() || shape.type_.is_some())
                && shape.explicit_class().is_some()
                && object.type_.as_deref() != shape.explicit_class().map(|c| c.name.as_str())
            {
                errors.push(format!(
                    "expected class '{}'",
                    shape.explicit_class().unwrap().name
                ));
            }
            return;
        }
    }
    let Some(actual) = datatype_of(value) else {
        return;
    };
    if !datatype_matches(expected, actual) {
        errors.push(format!("datatype mismatch: expected {expected:?}, got {actual:?}"));
    }
}

fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    use Value::*;
    match (a, b) {
        (Integral(a), Integral(b)) => a.partial_cmp(b),
        (Floating(a), Floating(b)) => a.partial_cmp(b),
        (Integer(a), Integer(b)) => a.partial_cmp(b),
        (Decimal(a), Decimal(b)) => a.partial_cmp(b),
        (String(a), String(b)) => a.partial_cmp(b),
        (Temporal(a), Temporal(b)) => a.encode().partial_cmp(&b.encode()),
        _ => None,
    }
}

fn check_range(value: &Value, shape: &Shape, errors: &mut Vec<String>) {
    for item in focus_items(value) {
        if let Some(bound) = &shape.min_exclusive {
            match compare_values(item, bound) {
                Some(Ordering::Greater) => {}
                Some(_) => errors.push("value does not exceed minExclusive".to_string()),
                None => errors.push("minExclusive: incomparable value kinds".to_string()),
            }
        }
        if let Some(bound) = &shape.max_exclusive {
            match compare_values(item, bound) {
                Some(Ordering::Less) => {}
                Some(_) => errors.push("value does not precede maxExclusive".to_string()),
                None => errors.push("maxExclusive: incomparable value kinds".to_string()),
            }
        }
        if let Some(bound) = &shape.min_inclusive {
            match compare_values(item, bound) {
                Some(Ordering::Greater | Ordering::Equal) => {}
                Some(_) => errors.push("value is below minInclusive".to_string()),
                None => errors.push("minInclusive: incomparable value kinds".to_string()),
            }
        }
        if let Some(bound) = &shape.max_inclusive {
            match compare_values(item, bound) {
                Some(Ordering::Less | Ordering::Equal) => {}
                Some(_) => errors.push("value is above maxInclusive".to_string()),
                None => errors.push("maxInclusive: incomparable value kinds".to_string()),
            }
        }
    }
}

fn lexical_of(value: &Value) -> Option<std::string::String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Text(_, s) => Some(s.clone()),
        _ => None,
    }
}

fn check_text(value: &Value, shape: &Shape, errors: &mut Vec<String>) {
    for item in focus_items(value) {
        let Some(text) = lexical_of(item) else { continue };
        if let Some(min) = shape.min_length {
            if text.chars().count() < min {
                errors.push(format!("text shorter than minLength {min}"));
            }
        }
        if let Some(max) = shape.max_length {
            if text.chars().count() > max {
                errors.push(format!("text longer than maxLength {max}"));
            }
        }
        if let Some(pattern) = &shape.pattern {
            match pattern.0.is_match(&text) {
                Ok(true) => {}
                Ok(false) => errors.push(format!("text does not match pattern /{}/", pattern.0.as_str())),
                Err(e) => {
                    tracing::warn!("error testing for regex match during validation: {e}");
                    errors.push(format!("pattern evaluation failed: {e}"));
                }
            }
        }
    }
}

fn check_in(value: &Value, shape: &Shape, errors: &mut Vec<String>) {
    let Some(set) = &shape.in_ else { return };
    for item in focus_items(value) {
        if !set.contains(item) {
            errors.push("value is not a member of 'in'".to_string());
        }
    }
}

fn check_has_value(value: &Value, shape: &Shape, errors: &mut Vec<String>) {
    let Some(required) = &shape.has_value else { return };
    let items = focus_items(value);
    for want in required {
        if !items.iter().any(|v| *v == want) {
            errors.push("required hasValue entry is missing".to_string());
        }
    }
}

fn check_language(value: &Value, shape: &Shape, errors: &mut Vec<String>) {
    let items = focus_items(value);
    let mut seen = Vec::new();
    for item in &items {
        if let Value::Text(locale, _) = item {
            if let Some(allowed) = &shape.language_in {
                if !allowed.contains(locale) {
                    errors.push(format!("locale '{locale}' is not in languageIn"));
                }
            }
            if shape.unique_lang {
                if seen.contains(locale) {
                    errors.push(format!("duplicate locale '{locale}' under uniqueLang"));
                } else {
                    seen.push(locale.clone());
                }
            }
        }
    }
}

fn check_count(value: &Value, shape: &Shape, errors: &mut Vec<String>) {
    let count = match value {
        Value::Array(items) => items.len(),
        Value::Nil => 0,
        _ => 1,
    };
    if let Some(min) = shape.min_count {
        if count < min {
            errors.push(format!("count {count} is below minCount {min}"));
        }
    }
    if let Some(max) = shape.max_count {
        if count > max {
            errors.push(format!("count {count} is above maxCount {max}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Datatype, Property};
    use crate::value::Object;

    #[test]
    fn success_is_nil() {
        let shape = Shape::new().with_datatype(Datatype::Integral);
        assert!(validate(&Value::Integral(5), &shape).is_nil());
    }

    #[test]
    fn datatype_mismatch_is_reported() {
        let shape = Shape::new().with_datatype(Datatype::Integral);
        let trace = validate(&Value::String("x".into()), &shape);
        assert!(!trace.is_nil());
    }

    #[test]
    fn missing_required_property_reports_min_count() {
        let surname_shape = Shape::new().with_min_count(1);
        let employee_shape =
            Shape::new().with_property(Property::new("surname", surname_shape));

        let object = Object::new();
        let trace = validate(&Value::Object(object), &employee_shape);
        match trace {
            Value::Object(o) => {
                let surname_trace = o.fields.get("surname").expect("surname key present");
                match surname_trace {
                    Value::Object(inner) => {
                        let msgs = inner.fields.get("errors").unwrap();
                        if let Value::Array(items) = msgs {
                            assert!(items.iter().any(|v| matches!(v, Value::String(s) if s.contains("minCount"))));
                        } else {
                            panic!("expected errors array");
                        }
                    }
                    _ => panic!("expected object trace for surname"),
                }
            }
            _ => panic!("expected a non-nil trace"),
        }
    }

    #[test]
    fn range_violation_is_reported() {
        let shape = Shape::new().with_min_inclusive(Value::Integral(10));
        let trace = validate(&Value::Integral(1), &shape);
        assert!(!trace.is_nil());
    }

    #[test]
    fn unique_lang_detects_duplicates() {
        let shape = Shape::new().with_unique_lang(true);
        let value = Value::Array(vec![
            Value::Text(json::locale::Locale::Tag("en".into()), "a".into()),
            Value::Text(json::locale::Locale::Tag("en".into()), "b".into()),
        ]);
        let trace = validate(&value, &shape);
        assert!(!trace.is_nil());
    }
}
