//! The query sublanguage (spec.md §3, §4.3): `Expression`/`Criterion` make
//! up the filter AST, `Query` binds a model plus criteria and paging, and
//! `Specs`/`Probe` form the tabular projection a query becomes once it
//! carries one or more aliased columns.
mod json;
mod url;

pub use json::parse_json;
pub use url::parse_url;

use crate::error::QueryError;
use crate::shape::Shape;
use crate::value::Value;
use indexmap::IndexMap;
use std::rc::Rc;

/// A `(transforms, path)` pair addressing a value reachable from the
/// query's focus. Transforms are applied outermost-last: the final entry
/// is the outermost wrapper.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Expression {
    pub transforms: Vec<String>,
    pub path: Vec<String>,
}

impl Expression {
    pub fn focus() -> Expression {
        Expression::default()
    }

    pub fn path(labels: impl IntoIterator<Item = impl Into<String>>) -> Expression {
        Expression {
            transforms: Vec::new(),
            path: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses `"t1:t2:...:path.label"`, recognizing a trailing `name()` as
    /// a zero-arg transform over the empty path rather than a path label.
    pub fn parse(s: &str) -> Expression {
        let parts: Vec<&str> = s.split(':').collect();
        let (transforms_str, last) = parts.split_at(parts.len() - 1);
        let mut transforms: Vec<String> = transforms_str.iter().map(|s| s.to_string()).collect();
        let last = last[0];
        let path_str = match last.strip_suffix("()") {
            Some(name) => {
                transforms.push(name.to_string());
                ""
            }
            None => last,
        };
        let path = if path_str.is_empty() {
            Vec::new()
        } else {
            path_str.split('.').map(|s| s.to_string()).collect()
        };
        Expression { transforms, path }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for t in &self.transforms {
            out.push_str(t);
            out.push(':');
        }
        out.push_str(&self.path.join("."));
        out
    }
}

/// The optional conjunction of bounds, likeness, any-of, focus, and order
/// over a single [`Expression`] (spec.md §3).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Criterion {
    pub order: Option<i32>,
    pub focus: Option<Vec<Value>>,
    pub lt: Option<Value>,
    pub gt: Option<Value>,
    pub lte: Option<Value>,
    pub gte: Option<Value>,
    pub like: Option<String>,
    /// `None`: no constraint. `Some(&[])`: existential ("exists", any
    /// value). `Some([Nil])`: non-existential ("missing"). Otherwise: the
    /// bound containment set (spec.md §9 open question).
    pub any: Option<Vec<Value>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    pub model: Value,
    pub criteria: IndexMap<Expression, Criterion>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl Query {
    pub fn is_specs(&self) -> bool {
        matches!(self.model, Value::Specs(_))
    }
}

/// A single projected, aliased column.
#[derive(Clone, Debug, PartialEq)]
pub struct Probe {
    pub alias: String,
    pub expression: Expression,
    pub model: Value,
}

/// An ordered set of [`Probe`] columns, bound to the shape they are
/// projected against.
#[derive(Clone, Debug, PartialEq)]
pub struct Specs {
    pub shape: Rc<Shape>,
    pub probes: Vec<Probe>,
}

impl Specs {
    pub fn columns(&self) -> Vec<&str> {
        self.probes.iter().map(|p| p.alias.as_str()).collect()
    }
}

/// Merges `value` into `criteria[expr]`'s bound `field`, failing if an
/// incompatible bound is already present. Shared by the URL and JSON
/// parsers (spec.md §4.3's conjunction/conflict rules).
pub(crate) fn set_bound(
    criteria: &mut IndexMap<Expression, Criterion>,
    expr: Expression,
    field: BoundField,
    value: Value,
) -> Result<(), QueryError> {
    let rendered = expr.render();
    let criterion = criteria.entry(expr).or_default();
    let (slot, opposite) = match field {
        BoundField::Lt => (&mut criterion.lt, criterion.lte.is_some()),
        BoundField::Lte => (&mut criterion.lte, criterion.lt.is_some()),
        BoundField::Gt => (&mut criterion.gt, criterion.gte.is_some()),
        BoundField::Gte => (&mut criterion.gte, criterion.gt.is_some()),
    };
    if opposite {
        return Err(QueryError::ConflictingBounds(rendered));
    }
    match slot {
        Some(existing) if *existing != value => {
            return Err(QueryError::ConflictingBounds(rendered));
        }
        _ => *slot = Some(value),
    }
    Ok(())
}

#[derive(Clone, Copy)]
pub(crate) enum BoundField {
    Lt,
    Lte,
    Gt,
    Gte,
}

pub(crate) fn set_like(
    criteria: &mut IndexMap<Expression, Criterion>,
    expr: Expression,
    value: String,
) -> Result<(), QueryError> {
    let rendered = expr.render();
    let criterion = criteria.entry(expr).or_default();
    match &criterion.like {
        Some(existing) if *existing != value => Err(QueryError::ConflictingLike(rendered)),
        _ => {
            criterion.like = Some(value);
            Ok(())
        }
    }
}

pub(crate) fn set_order(
    criteria: &mut IndexMap<Expression, Criterion>,
    expr: Expression,
    value: i32,
) -> Result<(), QueryError> {
    let rendered = expr.render();
    let criterion = criteria.entry(expr).or_default();
    match criterion.order {
        Some(existing) if existing != value => Err(QueryError::ConflictingOrder(rendered)),
        _ => {
            criterion.order = Some(value);
            Ok(())
        }
    }
}

/// Unions `value` into `criteria[expr]`'s `any` set (the URL form's
/// repeated-pair rule: `path=v1&path=v2` ⇒ `any(path) ⊇ {v1, v2}`).
pub(crate) fn union_any(criteria: &mut IndexMap<Expression, Criterion>, expr: Expression, value: Value) {
    let criterion = criteria.entry(expr).or_default();
    let set = criterion.any.get_or_insert_with(Vec::new);
    if !set.contains(&value) {
        set.push(value);
    }
}

/// Sets `criteria[expr]`'s `any` to exactly `values`, intersecting with
/// any existing set per the narrower-wins merge law (spec.md §4.3, §8).
pub(crate) fn bind_any(
    criteria: &mut IndexMap<Expression, Criterion>,
    expr: Expression,
    values: Vec<Value>,
) -> Result<(), QueryError> {
    let criterion = criteria.entry(expr.clone()).or_default();
    match &criterion.any {
        None => {
            criterion.any = Some(values);
            Ok(())
        }
        Some(existing) => {
            let narrowed: Vec<Value> = existing.iter().filter(|v| values.contains(v)).cloned().collect();
            if narrowed.is_empty() && !existing.is_empty() && !values.is_empty() {
                return Err(QueryError::DisjointAny(expr));
            }
            criterion.any = Some(narrowed);
            Ok(())
        }
    }
}

/// Validates that `expr.path` resolves through `shape`'s property graph,
/// descending into nested property shapes one label at a time.
pub(crate) fn resolve_path<'a>(shape: &'a Shape, path: &[String]) -> Result<&'a Shape, QueryError> {
    let mut current = shape;
    for label in path {
        match current.property(label) {
            Some(prop) => current = &prop.shape,
            None => return Err(QueryError::UnknownPath(path.join("."))),
        }
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    #[test]
    fn expression_debug_form_is_stable() {
        let e = Expression::parse("sum:amount");
        insta::assert_debug_snapshot!(e, @r###"
        Expression {
            transforms: [
                "sum",
            ],
            path: [
                "amount",
            ],
        }
        "###);
    }

    #[quickcheck]
    fn bind_any_narrows_to_the_intersection(a: Vec<i64>, b: Vec<i64>) -> TestResult {
        if a.is_empty() || b.is_empty() {
            return TestResult::discard();
        }
        use std::collections::BTreeSet;
        let set_a: BTreeSet<i64> = a.into_iter().collect();
        let set_b: BTreeSet<i64> = b.into_iter().collect();
        if set_a.is_disjoint(&set_b) {
            return TestResult::discard();
        }

        let mut criteria = IndexMap::new();
        let expr = Expression::path(["x"]);
        let values_a: Vec<Value> = set_a.iter().map(|n| Value::Integral(*n)).collect();
        let values_b: Vec<Value> = set_b.iter().map(|n| Value::Integral(*n)).collect();
        bind_any(&mut criteria, expr.clone(), values_a).unwrap();
        bind_any(&mut criteria, expr.clone(), values_b).unwrap();

        let expected: BTreeSet<i64> = set_a.intersection(&set_b).copied().collect();
        let actual: BTreeSet<i64> = criteria[&expr]
            .any
            .as_ref()
            .unwrap()
            .iter()
            .map(|v| match v {
                Value::Integral(n) => *n,
                _ => unreachable!(),
            })
            .collect();
        TestResult::from_bool(actual == expected)
    }

    #[test]
    fn expression_parses_transform_pipeline() {
        let e = Expression::parse("count()");
        assert_eq!(e.transforms, vec!["count".to_string()]);
        assert!(e.path.is_empty());
    }

    #[test]
    fn expression_parses_dotted_path() {
        let e = Expression::parse("office.label");
        assert_eq!(e.path, vec!["office".to_string(), "label".to_string()]);
        assert!(e.transforms.is_empty());
    }

    #[test]
    fn expression_parses_transform_then_path() {
        let e = Expression::parse("sum:amount");
        assert_eq!(e.transforms, vec!["sum".to_string()]);
        assert_eq!(e.path, vec!["amount".to_string()]);
    }

    #[test]
    fn set_bound_rejects_lt_and_lte_together() {
        let mut criteria = IndexMap::new();
        let expr = Expression::path(["x"]);
        set_bound(&mut criteria, expr.clone(), BoundField::Lt, Value::Integral(1)).unwrap();
        let err = set_bound(&mut criteria, expr, BoundField::Lte, Value::Integral(2)).unwrap_err();
        assert!(matches!(err, QueryError::ConflictingBounds(_)));
    }
}
