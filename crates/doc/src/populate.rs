//! `expand`/`populate`: the two pure transforms surrounding dispatch
//! layers use to materialize a request model and to overlay stored data
//! onto it (spec.md §4.5).
use crate::query::Query;
use crate::shape::Datatype;
use crate::value::{Object, Value};
use json::locale::Locale;

/// Materializes a canonical request model: fills every property the
/// carried shape declares (assigning `Nil`/default-id placeholders for
/// absent ones), drops fields the shape doesn't know about, and recurses
/// into nested Objects and Query models. Idempotent: `expand(expand(v)) =
/// expand(v)`.
pub fn expand(value: &Value) -> Value {
    match value {
        Value::Object(object) => expand_object(object),
        Value::Array(items) => Value::Array(items.iter().map(expand).collect()),
        Value::Query(query) => Value::Query(Box::new(Query {
            model: expand(&query.model),
            criteria: query.criteria.clone(),
            offset: query.offset,
            limit: query.limit,
        })),
        other => other.clone(),
    }
}

fn expand_object(object: &Object) -> Value {
    let mut out = Object::new();
    out.shape = object.shape.clone();
    out.type_ = object.type_.clone();

    let Some(shape) = object.shape.clone() else {
        out.id = object.id.clone();
        for (name, value) in object.fields.iter() {
            out.fields.insert(name.clone(), expand(value));
        }
        return Value::Object(out);
    };

    out.id = Some(object.id.clone().unwrap_or_default());

    for (name, property) in shape.properties.iter() {
        if property.hidden {
            continue;
        }
        let expanded = match object.fields.get(name) {
            Some(value) => expand(value),
            None => Value::Nil,
        };
        let slot = if property.shape.datatype == Some(Datatype::Text) && is_empty_text_slot(&expanded) {
            Value::Array(vec![Value::Text(Locale::Any, std::string::String::new())])
        } else {
            expanded
        };
        out.fields.insert(name.clone(), slot);
    }

    Value::Object(out)
}

fn is_empty_text_slot(value: &Value) -> bool {
    match value {
        Value::Nil => true,
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Overlays `source` onto `target`, treating `target` as a template:
/// scalars pass through from `source`; Objects merge pairwise by field
/// (dropping source fields the target's shape doesn't declare, when the
/// target has a shape); Query targets populate their model but keep their
/// own criteria; Specs targets never absorb external fields; Text/Data
/// only populate when their tag matches (or the target is a wildcard).
pub fn populate(target: &Value, source: &Value) -> Value {
    match (target, source) {
        (Value::Object(t), Value::Object(s)) => populate_object(t, s),
        (Value::Query(tq), _) => Value::Query(Box::new(Query {
            model: populate(&tq.model, source),
            criteria: tq.criteria.clone(),
            offset: tq.offset,
            limit: tq.limit,
        })),
        (Value::Specs(_), _) => target.clone(),
        (Value::Text(tl, _), Value::Text(sl, ss)) => {
            if tl == sl || *tl == Locale::Any {
                Value::Text(sl.clone(), ss.clone())
            } else {
                target.clone()
            }
        }
        (Value::Data(td, _), Value::Data(sd, sv)) => {
            if td == sd || td.is_empty() {
                Value::Data(sd.clone(), sv.clone())
            } else {
                target.clone()
            }
        }
        (Value::Array(t_items), Value::Array(s_items)) => {
            let mut out = Vec::with_capacity(t_items.len().max(s_items.len()));
            for (i, t_item) in t_items.iter().enumerate() {
                match s_items.get(i) {
                    Some(s_item) => out.push(populate(t_item, s_item)),
                    None => out.push(t_item.clone()),
                }
            }
            out.extend(s_items.iter().skip(t_items.len()).cloned());
            Value::Array(out)
        }
        (_, source) => source.clone(),
    }
}

fn populate_object(target: &Object, source: &Object) -> Value {
    let mut out = Object::new();
    out.shape = target.shape.clone();
    out.id = source.id.clone().or_else(|| target.id.clone());
    out.type_ = source.type_.clone().or_else(|| target.type_.clone());

    for (name, t_value) in target.fields.iter() {
        let merged = match source.fields.get(name) {
            Some(s_value) => populate(t_value, s_value),
            None => t_value.clone(),
        };
        out.fields.insert(name.clone(), merged);
    }

    if target.shape.is_none() {
        for (name, s_value) in source.fields.iter() {
            out.fields.entry(name.clone()).or_insert_with(|| s_value.clone());
        }
    }

    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Property, Shape};
    use std::rc::Rc;

    #[test]
    fn expand_fills_declared_properties() {
        let shape = Rc::new(Shape::new().with_property(Property::new("name", Shape::new())));
        let object = Object::with_shape(shape);
        let expanded = expand(&Value::Object(object));
        match expanded {
            Value::Object(o) => {
                assert_eq!(o.fields.get("name"), Some(&Value::Nil));
                assert_eq!(o.id, Some(std::string::String::new()));
            }
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn expand_is_idempotent() {
        let shape = Rc::new(Shape::new().with_property(Property::new("name", Shape::new())));
        let object = Object::with_shape(shape);
        let once = expand(&Value::Object(object));
        let twice = expand(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn populate_retains_only_target_keys_under_shape() {
        let shape = Rc::new(Shape::new().with_property(Property::new("name", Shape::new())));
        let mut target = Object::with_shape(shape);
        target.fields.insert("name".to_string(), Value::Nil);

        let mut source = Object::new();
        source.fields.insert("name".to_string(), Value::String("Ada".into()));
        source.fields.insert("extra".to_string(), Value::Integral(1));

        let populated = populate(&Value::Object(target), &Value::Object(source));
        match populated {
            Value::Object(o) => {
                assert_eq!(o.fields.get("name"), Some(&Value::String("Ada".into())));
                assert!(!o.fields.contains_key("extra"));
            }
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn populate_is_idempotent_on_self() {
        let mut target = Object::new();
        target.fields.insert("x".to_string(), Value::Integral(1));
        let t = Value::Object(target);
        assert_eq!(populate(&t, &t), t);
    }
}
