//! URL-encoded query form (spec.md §4.3): `pair[&pair]*` over sigil-
//! prefixed paths.
use super::{bind_any, resolve_path, set_bound, set_like, set_order, union_any, BoundField, Expression, Query};
use crate::error::QueryError;
use crate::shape::Shape;
use crate::value::{Object, Value};
use indexmap::IndexMap;
use percent_encoding::percent_decode_str;
use std::rc::Rc;

pub fn parse_url(query: &str, shape: &Shape) -> Result<Query, QueryError> {
    let mut criteria = IndexMap::new();
    let mut offset = None;
    let mut limit = None;

    if !query.is_empty() {
        for pair in query.split('&') {
            parse_pair(pair, shape, &mut criteria, &mut offset, &mut limit)?;
        }
    }

    Ok(Query {
        model: Value::Object(Object::with_shape(Rc::new(shape.clone()))),
        criteria,
        offset,
        limit,
    })
}

fn parse_pair(
    pair: &str,
    shape: &Shape,
    criteria: &mut IndexMap<Expression, super::Criterion>,
    offset: &mut Option<i64>,
    limit: &mut Option<i64>,
) -> Result<(), QueryError> {
    let (key, value) = match pair.split_once('=') {
        Some((k, v)) => (k, Some(decode(v))),
        None => (pair, None),
    };

    if key == "@" {
        *offset = Some(parse_i64(&value.unwrap_or_default())?);
        return Ok(());
    }
    if key == "#" {
        *limit = Some(parse_i64(&value.unwrap_or_default())?);
        return Ok(());
    }

    let (field, rest) = strip_sigil(key);
    let expr = Expression::parse(rest);
    resolve_path(shape, &expr.path)?;

    match field {
        Sigil::Lt => set_bound(criteria, expr, BoundField::Lt, Value::String(value.unwrap_or_default()))?,
        Sigil::Lte => set_bound(criteria, expr, BoundField::Lte, Value::String(value.unwrap_or_default()))?,
        Sigil::Gt => set_bound(criteria, expr, BoundField::Gt, Value::String(value.unwrap_or_default()))?,
        Sigil::Gte => set_bound(criteria, expr, BoundField::Gte, Value::String(value.unwrap_or_default()))?,
        Sigil::Like => set_like(criteria, expr, value.unwrap_or_default())?,
        Sigil::Order => {
            let n = match value.as_deref() {
                Some("increasing") => 1,
                Some("decreasing") => -1,
                Some(other) => other.parse::<i32>().map_err(|_| {
                    QueryError::ConflictingOrder(format!("malformed order '{other}'"))
                })?,
                None => 1,
            };
            set_order(criteria, expr, n)?;
        }
        Sigil::None => match value {
            None => bind_any(criteria, expr, vec![Value::Nil])?,
            Some(v) if v == "*" => bind_any(criteria, expr, Vec::new())?,
            Some(v) if v.is_empty() => bind_any(criteria, expr, vec![Value::Nil])?,
            Some(v) => union_any(criteria, expr, Value::String(v)),
        },
    }
    Ok(())
}

enum Sigil {
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
    Order,
    None,
}

fn strip_sigil(key: &str) -> (Sigil, &str) {
    if let Some(rest) = key.strip_prefix("<=") {
        (Sigil::Lte, rest)
    } else if let Some(rest) = key.strip_prefix(">=") {
        (Sigil::Gte, rest)
    } else if let Some(rest) = key.strip_prefix('<') {
        (Sigil::Lt, rest)
    } else if let Some(rest) = key.strip_prefix('>') {
        (Sigil::Gt, rest)
    } else if let Some(rest) = key.strip_prefix('~') {
        (Sigil::Like, rest)
    } else if let Some(rest) = key.strip_prefix('^') {
        (Sigil::Order, rest)
    } else {
        (Sigil::None, key)
    }
}

fn decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().replace('+', " ")
}

fn parse_i64(s: &str) -> Result<i64, QueryError> {
    s.parse::<i64>()
        .map_err(|_| QueryError::ConflictingBounds(format!("malformed integer '{s}'")))
}
