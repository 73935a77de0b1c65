//! BCP-47-ish locale tags used by `Value::Text` (spec.md GLOSSARY).
use crate::error::Error;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LOCALE_RE: Regex = Regex::new(r"^[a-z]{2}(-[A-Za-z0-9]+)*$").unwrap();
}

/// `ROOT` is the locale-less tag (`""` on the wire); `ANY` is the wildcard
/// tag (`"*"` on the wire). Named locales validate against
/// `[a-z]{2}(-[A-Za-z0-9]+)*`.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Locale {
    Root,
    Any,
    Tag(String),
}

impl Locale {
    pub fn decode(s: &str) -> Result<Locale, Error> {
        match s {
            "" => Ok(Locale::Root),
            "*" => Ok(Locale::Any),
            tag if LOCALE_RE.is_match(tag) => Ok(Locale::Tag(tag.to_string())),
            other => Err(Error::MalformedLocale(other.to_string())),
        }
    }

    pub fn encode(&self) -> &str {
        match self {
            Locale::Root => "",
            Locale::Any => "*",
            Locale::Tag(t) => t,
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_and_any_are_aliased() {
        assert_eq!(Locale::decode("").unwrap(), Locale::Root);
        assert_eq!(Locale::decode("*").unwrap(), Locale::Any);
        assert_eq!(Locale::Root.encode(), "");
        assert_eq!(Locale::Any.encode(), "*");
    }

    #[test]
    fn tags_validate() {
        assert_eq!(
            Locale::decode("en-GB").unwrap(),
            Locale::Tag("en-GB".to_string())
        );
        assert!(Locale::decode("english").is_err());
        assert!(Locale::decode("E").is_err());
    }
}
