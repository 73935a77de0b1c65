use std::fmt;

/// A 1-based line/column pair pointing at the byte offset a lexical or
/// syntactic error was detected at.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub const START: Location = Location { line: 1, column: 1 };

    /// Scans `text` up to `offset` to compute the corresponding Location.
    pub fn at(text: &str, offset: usize) -> Location {
        let mut loc = Location::START;
        for ch in text[..offset.min(text.len())].chars() {
            if ch == '\n' {
                loc.line += 1;
                loc.column = 1;
            } else {
                loc.column += 1;
            }
        }
        loc
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Syntactic errors raised by the lexer, numeric/URI/locale/temporal
/// decoders. These always carry a [`Location`] when the failure is tied to
/// a specific source span; lexical decoders invoked outside of a parse
/// (e.g. `Number::decode`) use `Location::START` as a placeholder.
#[derive(thiserror::Error, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    #[error("{0}: unexpected character '{1}'")]
    UnexpectedChar(Location, char),
    #[error("{0}: unexpected end of input")]
    UnexpectedEof(Location),
    #[error("{0}: invalid escape sequence")]
    InvalidEscape(Location),
    #[error("{0}: invalid unicode escape")]
    InvalidUnicodeEscape(Location),
    #[error("{0}: unpaired UTF-16 surrogate")]
    UnpairedSurrogate(Location),
    #[error("{0}: number has a leading zero")]
    LeadingZero(Location),
    #[error("{0}: number has a trailing decimal point")]
    TrailingDot(Location),
    #[error("{0}: malformed number literal '{1}'")]
    MalformedNumber(Location, String),
    #[error("malformed URI '{0}'")]
    MalformedUri(String),
    #[error("malformed locale tag '{0}'")]
    MalformedLocale(String),
    #[error("malformed temporal literal '{0}'")]
    MalformedTemporal(String),
    #[error("{0}: duplicate object key '{1}'")]
    DuplicateKey(Location, String),
    #[error("{0}: trailing input after value")]
    TrailingInput(Location),
}

impl Error {
    pub fn location(&self) -> Option<Location> {
        use Error::*;
        match self {
            UnexpectedChar(l, _)
            | UnexpectedEof(l)
            | InvalidEscape(l)
            | InvalidUnicodeEscape(l)
            | UnpairedSurrogate(l)
            | LeadingZero(l)
            | TrailingDot(l)
            | MalformedNumber(l, _)
            | DuplicateKey(l, _)
            | TrailingInput(l) => Some(*l),
            MalformedUri(_) | MalformedLocale(_) | MalformedTemporal(_) => None,
        }
    }
}
