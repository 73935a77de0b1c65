//! `merge`/`extend` shape algebra (spec.md §4.2).
//!
//! Grounded in the teacher's `Shape::union`/`Shape::intersect` pair
//! (`doc::shape::union`, `doc::shape::intersect`): both walk the same
//! field-by-field structure, differing only in which side wins ties.
//! Here `merge` and `extend` differ only in which side's explicit class
//! survives.
use super::{Datatype, Pattern, Property, Shape, Type};
use crate::error::ShapeError;
use crate::value::Value;

type Result<T> = std::result::Result<T, ShapeError>;

/// Unions `clazzes`, `properties`, `in`, `hasValue`, `languageIn`, and
/// `constraints`; scalar constraints take the more restrictive of the two
/// when both are set. Incompatible explicit classes fail the merge.
pub fn merge_shapes(a: &Shape, b: &Shape) -> Result<Shape> {
    merge_with(a, b, ClassPolicy::Union)
}

/// Behaves like `merge` except the inheriting shape `a` retains its own
/// explicit class (the head of `a.clazzes`) rather than unioning class
/// identity with `b`.
pub fn extend_shapes(a: &Shape, b: &Shape) -> Result<Shape> {
    merge_with(a, b, ClassPolicy::KeepLeftExplicit)
}

enum ClassPolicy {
    Union,
    KeepLeftExplicit,
}

fn merge_with(a: &Shape, b: &Shape, policy: ClassPolicy) -> Result<Shape> {
    let datatype = merge_datatype(a.datatype, b.datatype)?;
    let clazzes = merge_clazzes(&a.clazzes, &b.clazzes, &policy)?;

    let mut properties = a.properties.clone();
    for (name, b_prop) in b.properties.iter() {
        match properties.get(name) {
            Some(a_prop) => {
                let merged = merge_property(a_prop, b_prop)?;
                properties.insert(name.clone(), merged);
            }
            None => {
                properties.insert(name.clone(), b_prop.clone());
            }
        }
    }

    let pattern = merge_pattern(&a.pattern, &b.pattern)?;

    Ok(Shape {
        virtual_: a.virtual_ || b.virtual_,
        id: a.id.clone().or_else(|| b.id.clone()),
        type_: a.type_.clone().or_else(|| b.type_.clone()),
        datatype,
        clazzes,
        min_exclusive: merge_scalar(&a.min_exclusive, &b.min_exclusive, Restrictive::Max)?,
        max_exclusive: merge_scalar(&a.max_exclusive, &b.max_exclusive, Restrictive::Min)?,
        min_inclusive: merge_scalar(&a.min_inclusive, &b.min_inclusive, Restrictive::Max)?,
        max_inclusive: merge_scalar(&a.max_inclusive, &b.max_inclusive, Restrictive::Min)?,
        min_length: merge_ord(a.min_length, b.min_length, Restrictive::Max),
        max_length: merge_ord(a.max_length, b.max_length, Restrictive::Min),
        pattern,
        in_: merge_set(&a.in_, &b.in_),
        has_value: merge_set(&a.has_value, &b.has_value),
        language_in: merge_set(&a.language_in, &b.language_in),
        unique_lang: a.unique_lang || b.unique_lang,
        min_count: merge_ord(a.min_count, b.min_count, Restrictive::Max),
        max_count: merge_ord(a.max_count, b.max_count, Restrictive::Min),
        constraints: a
            .constraints
            .iter()
            .cloned()
            .chain(b.constraints.iter().cloned())
            .collect(),
        properties,
    })
}

fn merge_datatype(a: Option<Datatype>, b: Option<Datatype>) -> Result<Option<Datatype>> {
    match (a, b) {
        (Some(a), Some(b)) if a != b => Err(ShapeError::IncompatibleDatatype),
        (Some(d), _) | (None, Some(d)) => Ok(Some(d)),
        (None, None) => Ok(None),
    }
}

fn merge_clazzes(a: &[Type], b: &[Type], policy: &ClassPolicy) -> Result<Vec<Type>> {
    let a_explicit = a.first();
    let b_explicit = b.first();

    if let (Some(a), Some(b)) = (a_explicit, b_explicit) {
        if a.name != b.name && matches!(policy, ClassPolicy::Union) {
            return Err(ShapeError::IncompatibleClass(a.name.clone(), b.name.clone()));
        }
    }

    let mut merged: Vec<Type> = Vec::new();
    match policy {
        ClassPolicy::Union => {
            if let Some(c) = a_explicit.or(b_explicit) {
                merged.push(c.clone());
            }
        }
        ClassPolicy::KeepLeftExplicit => {
            if let Some(c) = a_explicit {
                merged.push(c.clone());
            }
        }
    }
    for clazz in a.iter().chain(b.iter()) {
        if !merged.iter().any(|c| c.name == clazz.name) {
            merged.push(clazz.clone());
        }
    }
    Ok(merged)
}

fn merge_property(a: &Property, b: &Property) -> Result<Property> {
    if (a.embedded && b.foreign) || (a.foreign && b.embedded) {
        return Err(ShapeError::EmbeddedForeignConflict(a.name.clone()));
    }
    Ok(Property {
        name: a.name.clone(),
        forward: a.forward.clone().or_else(|| b.forward.clone()),
        reverse: a.reverse.clone().or_else(|| b.reverse.clone()),
        shape: merge_shapes(&a.shape, &b.shape)?,
        embedded: a.embedded || b.embedded,
        foreign: a.foreign || b.foreign,
        hidden: a.hidden || b.hidden,
    })
}

fn merge_pattern(a: &Option<Pattern>, b: &Option<Pattern>) -> Result<Option<Pattern>> {
    match (a, b) {
        (Some(a), Some(b)) if a != b => Err(ShapeError::ExclusiveBounds("pattern".to_string())),
        (Some(p), _) | (None, Some(p)) => Ok(Some(p.clone())),
        (None, None) => Ok(None),
    }
}

#[derive(Clone, Copy)]
enum Restrictive {
    Min,
    Max,
}

fn merge_ord<T: Ord + Copy>(a: Option<T>, b: Option<T>, which: Restrictive) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(match which {
            Restrictive::Min => a.min(b),
            Restrictive::Max => a.max(b),
        }),
        (Some(v), None) | (None, Some(v)) => Some(v),
        (None, None) => None,
    }
}

fn merge_scalar(
    a: &Option<Value>,
    b: &Option<Value>,
    which: Restrictive,
) -> Result<Option<Value>> {
    match (a, b) {
        (Some(a), Some(b)) => match compare_values(a, b) {
            Some(std::cmp::Ordering::Equal) => Ok(Some(a.clone())),
            Some(ord) => {
                let take_a = match which {
                    Restrictive::Max => ord == std::cmp::Ordering::Greater,
                    Restrictive::Min => ord == std::cmp::Ordering::Less,
                };
                Ok(Some(if take_a { a.clone() } else { b.clone() }))
            }
            None => Err(ShapeError::ExclusiveBounds("incomparable bound".to_string())),
        },
        (Some(v), None) | (None, Some(v)) => Ok(Some(v.clone())),
        (None, None) => Ok(None),
    }
}

fn compare_values(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    use Value::*;
    match (a, b) {
        (Integral(a), Integral(b)) => a.partial_cmp(b),
        (Floating(a), Floating(b)) => a.partial_cmp(b),
        (Integer(a), Integer(b)) => a.partial_cmp(b),
        (Decimal(a), Decimal(b)) => a.partial_cmp(b),
        (String(a), String(b)) => a.partial_cmp(b),
        _ => None,
    }
}

fn merge_set<T: Clone + PartialEq>(a: &Option<Vec<T>>, b: &Option<Vec<T>>) -> Option<Vec<T>> {
    match (a, b) {
        (Some(a), Some(b)) => {
            let mut merged = a.clone();
            for item in b {
                if !merged.contains(item) {
                    merged.push(item.clone());
                }
            }
            Some(merged)
        }
        (Some(v), None) | (None, Some(v)) => Some(v.clone()),
        (None, None) => None,
    }
}
