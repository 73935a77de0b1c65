//! Error kinds for the core (spec.md §7). Validation failures are
//! deliberately absent here: they are reified into a trace `Value`
//! returned from [`crate::validate`], never raised.
use crate::query::Expression;

#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] json::Error),

    #[error("shape construction: {0}")]
    Shape(#[from] ShapeError),

    #[error("query construction: {0}")]
    Query(#[from] QueryError),

    #[error("codec: {0}")]
    Codec(#[from] CodecError),
}

#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum ShapeError {
    #[error("incompatible explicit classes: '{0}' vs '{1}'")]
    IncompatibleClass(String, String),
    #[error("incompatible datatype")]
    IncompatibleDatatype,
    #[error("property '{0}' is both embedded and foreign")]
    EmbeddedForeignConflict(String),
    #[error("mutually exclusive bounds on property '{0}'")]
    ExclusiveBounds(String),
}

#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum QueryError {
    #[error("conflicting bounds on expression '{0}'")]
    ConflictingBounds(String),
    #[error("conflicting order on expression '{0}'")]
    ConflictingOrder(String),
    #[error("conflicting like on expression '{0}'")]
    ConflictingLike(String),
    #[error("unknown path '{0}' against the shape graph")]
    UnknownPath(String),
    #[error("reserved key clash in specs: '{0}'")]
    ReservedKeyClash(String),
    #[error("more than one query object at the top level")]
    MultipleQueries,
    #[error("disjoint any-of merge on expression '{0:?}'")]
    DisjointAny(Expression),
}

#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum CodecError {
    #[error("line {line}, column {column}: unknown property '{property}'")]
    UnknownProperty {
        line: usize,
        column: usize,
        property: String,
    },
    #[error("line {line}, column {column}: unexpected keyword field '{keyword}'")]
    UnexpectedKeyword {
        line: usize,
        column: usize,
        keyword: String,
    },
    #[error("line {line}, column {column}: duplicate '@value'")]
    DuplicateValue { line: usize, column: usize },
    #[error("line {line}, column {column}: wrong type at id/type field")]
    WrongIdOrTypeField { line: usize, column: usize },
    #[error("line {line}, column {column}: nested array in shaped array context")]
    NestedArray { line: usize, column: usize },
    #[error("line {line}, column {column}: null not permitted here")]
    UnexpectedNull { line: usize, column: usize },
    #[error("malformed locale '{0}'")]
    MalformedLocale(String),
}
