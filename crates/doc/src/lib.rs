//! The linked-data value, shape, and query core: a typed value model for
//! RDF-ish data (`value`), a SHACL-like constraint system (`shape`), a
//! query sublanguage embedded in the same JSON surface (`query`), a pure
//! validator (`validate`), a shape-driven JSON-LD-ish codec (`codec`), and
//! the `expand`/`populate` agent-model helpers.
//!
//! Everything here is synchronous, single-document-at-a-time, and
//! immutable after construction. Public entry points that need a
//! resolution context take a `base: &url::Url` explicitly; there is no
//! process-wide base URI outside of tests.

pub mod codec;
pub mod error;
pub mod populate;
pub mod query;
pub mod shape;
pub mod validate;
pub mod value;

pub use codec::{decode, encode, Options};
pub use error::Error;
pub use query::{Criterion, Expression, Probe, Query, Specs};
pub use shape::{Property, Shape, Type};
pub use validate::validate;
pub use value::Value;

/// Test-only default base URI. Never consulted by library entry points,
/// which take `base` explicitly.
#[cfg(test)]
pub const DEFAULT_BASE: &str = "app:/";

#[cfg(test)]
pub(crate) fn test_base() -> url::Url {
    url::Url::parse(DEFAULT_BASE).unwrap()
}
