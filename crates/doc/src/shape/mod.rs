//! The Shape constraint record (spec.md §3), its fluent builder, and the
//! `Type`/`Property` records it is built from.
//!
//! Grounded in the teacher's `Shape`/`StringShape`/`ObjShape`/`ObjProperty`
//! split (`doc::shape::mod`): a flat record of scalar constraints plus
//! nested per-kind constraint groups, with an ordered `properties` map
//! standing in for the teacher's `ObjShape::properties` vector.
mod merge;

pub use merge::extend_shapes as extend;
pub use merge::merge_shapes as merge;

use crate::error::ShapeError;
use crate::value::Value;
use fancy_regex::Regex;
use indexmap::IndexMap;
use json::locale::Locale;
use std::rc::Rc;

/// The variant palette a Shape's `datatype` constraint chooses from. Mirrors
/// `Value`'s tags, plus the `Number` parent tag which never appears on a
/// decoded Value itself (spec.md §9 open question).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Datatype {
    Nil,
    Bit,
    Integral,
    Floating,
    Integer,
    Decimal,
    Number,
    String,
    Uri,
    Temporal,
    TemporalAmount,
    Text,
    Data,
    Object,
    Array,
}

/// A named class a Shape may declare membership in. `uri` and
/// `description` are informational only and never participate in merge
/// compatibility checks (only `name` does, spec.md §4.2).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Type {
    pub name: String,
    pub uri: Option<String>,
    pub description: Option<String>,
}

impl Type {
    pub fn new(name: impl Into<String>) -> Type {
        Type {
            name: name.into(),
            uri: None,
            description: None,
        }
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Type {
        self.uri = Some(uri.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Type {
        self.description = Some(description.into());
        self
    }
}

/// How a Property's edge is labeled in the codec's JSON-LD-ish output.
/// `Auto` derives the label from the property name; `Explicit` pins it to
/// a fixed URI regardless of name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Direction {
    Auto,
    Explicit(String),
}

/// One named member of an Object's field set, and the Shape it must
/// satisfy.
#[derive(Clone, Debug)]
pub struct Property {
    pub name: String,
    pub forward: Option<Direction>,
    pub reverse: Option<Direction>,
    pub shape: Shape,
    /// Forces inline encoding of the nested Object rather than reference
    /// by id. Mutually exclusive with `foreign` (spec.md §4.2 invariant).
    pub embedded: bool,
    /// Marks this property as sourced from another shape's graph; never
    /// both `embedded` and `foreign`.
    pub foreign: bool,
    /// Excluded from the codec's encoded output but still validated.
    pub hidden: bool,
}

impl Property {
    pub fn new(name: impl Into<String>, shape: Shape) -> Property {
        Property {
            name: name.into(),
            forward: None,
            reverse: None,
            shape,
            embedded: false,
            foreign: false,
            hidden: false,
        }
    }

    pub fn with_forward(mut self, direction: Direction) -> Property {
        self.forward = Some(direction);
        self
    }

    pub fn with_reverse(mut self, direction: Direction) -> Property {
        self.reverse = Some(direction);
        self
    }

    pub fn with_embedded(mut self, embedded: bool) -> Property {
        self.embedded = embedded;
        self
    }

    pub fn with_foreign(mut self, foreign: bool) -> Property {
        self.foreign = foreign;
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Property {
        self.hidden = hidden;
        self
    }
}

impl PartialEq for Property {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.forward == other.forward
            && self.reverse == other.reverse
            && self.shape == other.shape
            && self.embedded == other.embedded
            && self.foreign == other.foreign
            && self.hidden == other.hidden
    }
}

/// A user-supplied refinement run during validation. Opaque closures have
/// no meaningful equality, so `Constraint` is excluded from `Shape`'s
/// `PartialEq`.
#[derive(Clone)]
pub struct Constraint(pub Rc<dyn Fn(&Value) -> Value>);

impl std::fmt::Debug for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Constraint(..)")
    }
}

/// A compiled regular expression constraint, compared by source text
/// rather than by any internal representation.
#[derive(Clone, Debug)]
pub struct Pattern(pub Regex);

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_str() == other.0.as_str()
    }
}
impl Eq for Pattern {}

/// A SHACL-like constraint set over a single value position. Built
/// through the fluent `with_*` methods, each of which consumes `self` and
/// returns a new `Shape` rather than mutating in place (spec.md §9 design
/// note).
#[derive(Clone, Debug, Default)]
pub struct Shape {
    /// True if this Shape only constrains but never itself materializes
    /// as a standalone Object (spec.md §3).
    pub virtual_: bool,
    pub id: Option<String>,
    pub type_: Option<String>,
    pub datatype: Option<Datatype>,
    /// Head of this vector is the Shape's own *explicit* class, if any;
    /// the rest are classes inherited or unioned in through merge/extend.
    pub clazzes: Vec<Type>,
    pub min_exclusive: Option<Value>,
    pub max_exclusive: Option<Value>,
    pub min_inclusive: Option<Value>,
    pub max_inclusive: Option<Value>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Pattern>,
    pub in_: Option<Vec<Value>>,
    pub has_value: Option<Vec<Value>>,
    pub language_in: Option<Vec<Locale>>,
    pub unique_lang: bool,
    pub min_count: Option<usize>,
    pub max_count: Option<usize>,
    pub constraints: Vec<Constraint>,
    pub properties: IndexMap<String, Property>,
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.virtual_ == other.virtual_
            && self.id == other.id
            && self.type_ == other.type_
            && self.datatype == other.datatype
            && self.clazzes == other.clazzes
            && self.min_exclusive == other.min_exclusive
            && self.max_exclusive == other.max_exclusive
            && self.min_inclusive == other.min_inclusive
            && self.max_inclusive == other.max_inclusive
            && self.min_length == other.min_length
            && self.max_length == other.max_length
            && self.pattern == other.pattern
            && self.in_ == other.in_
            && self.has_value == other.has_value
            && self.language_in == other.language_in
            && self.unique_lang == other.unique_lang
            && self.min_count == other.min_count
            && self.max_count == other.max_count
            && self.properties == other.properties
    }
}

impl Shape {
    pub fn new() -> Shape {
        Shape::default()
    }

    pub fn with_virtual(mut self, virtual_: bool) -> Shape {
        self.virtual_ = virtual_;
        self
    }

    pub fn with_datatype(mut self, datatype: Datatype) -> Shape {
        self.datatype = Some(datatype);
        self
    }

    /// Installs `clazz` as this Shape's own explicit class, at the head
    /// of `clazzes`. A Shape may declare at most one explicit class; a
    /// second call replaces the first rather than appending.
    pub fn with_explicit_class(mut self, clazz: Type) -> Shape {
        if self.clazzes.is_empty() {
            self.clazzes.push(clazz);
        } else {
            self.clazzes[0] = clazz;
        }
        self
    }

    /// Unions in an additional (non-explicit) class, e.g. one inherited
    /// through `merge`.
    pub fn with_class(mut self, clazz: Type) -> Shape {
        if !self.clazzes.iter().any(|c| c.name == clazz.name) {
            self.clazzes.push(clazz);
        }
        self
    }

    pub fn with_property(mut self, property: Property) -> Shape {
        self.properties.insert(property.name.clone(), property);
        self
    }

    pub fn with_min_exclusive(mut self, v: Value) -> Shape {
        self.min_exclusive = Some(v);
        self
    }

    pub fn with_max_exclusive(mut self, v: Value) -> Shape {
        self.max_exclusive = Some(v);
        self
    }

    pub fn with_min_inclusive(mut self, v: Value) -> Shape {
        self.min_inclusive = Some(v);
        self
    }

    pub fn with_max_inclusive(mut self, v: Value) -> Shape {
        self.max_inclusive = Some(v);
        self
    }

    pub fn with_min_length(mut self, n: usize) -> Shape {
        self.min_length = Some(n);
        self
    }

    pub fn with_max_length(mut self, n: usize) -> Shape {
        self.max_length = Some(n);
        self
    }

    pub fn with_pattern(mut self, pattern: Regex) -> Shape {
        self.pattern = Some(Pattern(pattern));
        self
    }

    pub fn with_in(mut self, values: Vec<Value>) -> Shape {
        self.in_ = Some(values);
        self
    }

    pub fn with_has_value(mut self, values: Vec<Value>) -> Shape {
        self.has_value = Some(values);
        self
    }

    pub fn with_language_in(mut self, locales: Vec<Locale>) -> Shape {
        self.language_in = Some(locales);
        self
    }

    pub fn with_unique_lang(mut self, unique: bool) -> Shape {
        self.unique_lang = unique;
        self
    }

    pub fn with_min_count(mut self, n: usize) -> Shape {
        self.min_count = Some(n);
        self
    }

    pub fn with_max_count(mut self, n: usize) -> Shape {
        self.max_count = Some(n);
        self
    }

    pub fn with_constraint(mut self, f: Rc<dyn Fn(&Value) -> Value>) -> Shape {
        self.constraints.push(Constraint(f));
        self
    }

    pub fn with_id_field(mut self, field: impl Into<String>) -> Shape {
        self.id = Some(field.into());
        self
    }

    pub fn with_type_field(mut self, field: impl Into<String>) -> Shape {
        self.type_ = Some(field.into());
        self
    }

    pub fn explicit_class(&self) -> Option<&Type> {
        self.clazzes.first()
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// Human-readable summary for diagnostics and test failure messages;
    /// never parsed back.
    pub fn describe(&self) -> String {
        let class = self
            .explicit_class()
            .map(|c| c.name.as_str())
            .unwrap_or("<anonymous>");
        format!(
            "Shape({class}, datatype={:?}, {} properties)",
            self.datatype,
            self.properties.len()
        )
    }
}

pub type Result<T> = std::result::Result<T, ShapeError>;
