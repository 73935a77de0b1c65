//! Lexical helpers underpinning the value and codec layers: URI base
//! resolution and relativization, locale parsing, numeric lexical forms,
//! ISO 8601 temporal parsing, and a small RFC 8259 JSON lexer/parser that
//! preserves field order and rejects the inputs `serde_json` is lenient
//! about (leading zeroes, trailing dots, bare surrogates).

pub mod error;
pub mod lexer;
pub mod locale;
pub mod number;
pub mod temporal;
pub mod tree;
pub mod uri;

pub use error::{Error, Location};
pub use lexer::{Lexer, Token};
pub use locale::Locale;
pub use number::Number;
pub use tree::Json;
