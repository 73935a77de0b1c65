//! JSON query form (spec.md §4.3): an array holding exactly one object,
//! whose keys are either sigil-prefixed criteria, `@`/`#` paging, the `^`
//! order list, or property/alias names that become projected [`Probe`]s.
use super::{
    resolve_path, set_bound, set_like, set_order, BoundField, Criterion, Expression, Probe, Query,
    Specs,
};
use crate::error::QueryError;
use crate::shape::Shape;
use crate::value::{Object, Value};
use indexmap::IndexMap;
use json::Json;
use std::rc::Rc;

/// `json` must already be the query array (`[{...}]`); use
/// [`crate::codec::looks_like_query`] to decide whether a decoded JSON
/// array should be routed here.
pub fn parse_json(json: &Json, shape: &Shape) -> Result<Query, QueryError> {
    let items = json.as_array().ok_or(QueryError::MultipleQueries)?;
    if items.len() != 1 {
        return Err(QueryError::MultipleQueries);
    }
    let obj = items[0].as_object().ok_or(QueryError::MultipleQueries)?;

    let mut criteria: IndexMap<Expression, Criterion> = IndexMap::new();
    let mut offset = None;
    let mut limit = None;
    // Property-name keys are ambiguous on their own: under a plain Query
    // they're a model filter/nested sub-query, but alongside a genuine
    // `alias=expression` probe the whole object is a projection (spec.md
    // §4.3). Defer them until a full pass has decided which mode applies.
    let mut property_fields: Vec<(std::string::String, &Json)> = Vec::new();
    let mut probes = Vec::new();

    for (key, val) in obj.iter() {
        if key == "@" {
            offset = Some(json_to_i64(val)?);
            continue;
        }
        if key == "#" {
            limit = Some(json_to_i64(val)?);
            continue;
        }
        if key == "^" {
            let entries = val.as_array().ok_or(QueryError::ConflictingOrder(key.clone()))?;
            for (i, entry) in entries.iter().enumerate() {
                let s = entry.as_str().ok_or(QueryError::ConflictingOrder(key.clone()))?;
                let expr = Expression::parse(s);
                resolve_path(shape, &expr.path)?;
                set_order(&mut criteria, expr, (i + 1) as i32)?;
            }
            continue;
        }
        if key.starts_with('@') || key.starts_with('#') {
            return Err(QueryError::ReservedKeyClash(key.clone()));
        }

        if let Some((sigil, rest)) = strip_sigil(key) {
            let expr = Expression::parse(rest);
            resolve_path(shape, &expr.path)?;
            match sigil {
                Sigil::Lt => set_bound(&mut criteria, expr, BoundField::Lt, json_to_value(val))?,
                Sigil::Lte => set_bound(&mut criteria, expr, BoundField::Lte, json_to_value(val))?,
                Sigil::Gt => set_bound(&mut criteria, expr, BoundField::Gt, json_to_value(val))?,
                Sigil::Gte => set_bound(&mut criteria, expr, BoundField::Gte, json_to_value(val))?,
                Sigil::Like => {
                    let s = val.as_str().unwrap_or_default().to_string();
                    set_like(&mut criteria, expr, s)?;
                }
                Sigil::Order => {
                    let n = match val {
                        Json::String(s) if s == "increasing" => 1,
                        Json::String(s) if s == "decreasing" => -1,
                        other => json_to_i64(other)? as i32,
                    };
                    set_order(&mut criteria, expr, n)?;
                }
            }
            continue;
        }

        if shape.property(key).is_some() {
            property_fields.push((key.clone(), val));
            continue;
        }

        // `alias=expression` probe, or the shorthand where alias and
        // expression coincide.
        let (alias, expr_str) = key.split_once('=').unwrap_or((key.as_str(), key.as_str()));
        let expr = Expression::parse(expr_str);
        if !expr.path.is_empty() {
            resolve_path(shape, &expr.path)?;
        }
        probes.push(Probe {
            alias: alias.to_string(),
            expression: expr,
            model: json_to_value(val),
        });
    }

    let model = if probes.is_empty() {
        // No genuine alias=expression probe: property-name keys are model
        // filters on a plain Object, not projected columns.
        let mut object = Object::with_shape(Rc::new(shape.clone()));
        for (key, val) in property_fields {
            object.fields.insert(key, json_to_value(val));
        }
        Value::Object(object)
    } else {
        for (key, val) in property_fields {
            let expr = Expression::path([key.clone()]);
            resolve_path(shape, &expr.path)?;
            probes.push(Probe {
                alias: key,
                expression: expr,
                model: json_to_value(val),
            });
        }
        Value::Specs(Specs {
            shape: Rc::new(shape.clone()),
            probes,
        })
    };

    Ok(Query {
        model,
        criteria,
        offset,
        limit,
    })
}

enum Sigil {
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
    Order,
}

fn strip_sigil(key: &str) -> Option<(Sigil, &str)> {
    if let Some(rest) = key.strip_prefix("<=") {
        Some((Sigil::Lte, rest))
    } else if let Some(rest) = key.strip_prefix(">=") {
        Some((Sigil::Gte, rest))
    } else if let Some(rest) = key.strip_prefix('<') {
        Some((Sigil::Lt, rest))
    } else if let Some(rest) = key.strip_prefix('>') {
        Some((Sigil::Gt, rest))
    } else if let Some(rest) = key.strip_prefix('~') {
        Some((Sigil::Like, rest))
    } else if let Some(rest) = key.strip_prefix('^') {
        Some((Sigil::Order, rest))
    } else {
        None
    }
}

fn json_to_value(json: &Json) -> Value {
    match json {
        Json::Null => Value::Nil,
        Json::Bool(b) => Value::Bit(*b),
        Json::Number(n) => json_number_to_value(n),
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => Value::Array(items.iter().map(json_to_value).collect()),
        Json::Object(fields) => {
            let mut object = Object::new();
            for (k, v) in fields.iter() {
                object.fields.insert(k.clone(), json_to_value(v));
            }
            Value::Object(object)
        }
    }
}

fn json_number_to_value(n: &json::Number) -> Value {
    match n {
        json::Number::Integral(i) => Value::Integral(*i),
        json::Number::Floating(f) => Value::Floating(*f),
        json::Number::Integer(i) => Value::Integer(i.clone()),
        json::Number::Decimal(d) => Value::Decimal(d.clone()),
    }
}

fn json_to_i64(json: &Json) -> Result<i64, QueryError> {
    match json {
        Json::Number(json::Number::Integral(i)) => Ok(*i),
        Json::Number(json::Number::Integer(i)) => i.to_string().parse::<i64>().map_err(|_| malformed()),
        _ => Err(malformed()),
    }
}

fn malformed() -> QueryError {
    QueryError::ConflictingBounds("malformed integer".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Property;

    fn parse(src: &str, shape: &Shape) -> Query {
        let tree = json::tree::parse(src).unwrap();
        parse_json(&tree, shape).unwrap()
    }

    #[test]
    fn property_only_object_stays_a_plain_filter() {
        let office_shape = Shape::new().with_property(Property::new("label", Shape::new()));
        let shape = Shape::new().with_property(Property::new("office", office_shape));

        let q = parse(r#"[{"office":{"label":"HQ"}}]"#, &shape);
        match &q.model {
            Value::Object(object) => {
                assert!(object.fields.contains_key("office"));
            }
            _ => panic!("expected a plain Object model, property keys must not promote to Specs"),
        }
    }

    #[test]
    fn seed_scenario_four() {
        let office_shape = Shape::new()
            .with_property(Property::new("label", Shape::new()));
        let shape = Shape::new().with_property(Property::new("office", office_shape));

        let q = parse(
            r#"[{"~office.label":"US","^":["count()"],"#":10,"count()":0,"office":{"id":"","label":""}}]"#,
            &shape,
        );

        assert_eq!(q.limit, Some(10));
        let like_crit = q
            .criteria
            .get(&Expression::path(["office", "label"]))
            .unwrap();
        assert_eq!(like_crit.like.as_deref(), Some("US"));

        let order_crit = q
            .criteria
            .get(&Expression {
                transforms: vec!["count".to_string()],
                path: vec![],
            })
            .unwrap();
        assert_eq!(order_crit.order, Some(1));

        match &q.model {
            Value::Specs(specs) => {
                let cols = specs.columns();
                assert!(cols.contains(&"office"));
                assert!(cols.contains(&"count()"));
            }
            _ => panic!("expected Specs model"),
        }
    }
}
