//! Base-relative URI encode/decode (spec.md §4.1, §6 "Base URI contract").
use crate::error::Error;
use url::Url;

/// Resolves `relative` against `base`, mirroring `decode`'s contract: the
/// empty string resolves to itself (preserved, never promoted to the base).
pub fn resolve(base: &Url, relative: &str) -> Result<String, Error> {
    if relative.is_empty() {
        return Ok(String::new());
    }
    if let Ok(absolute) = Url::parse(relative) {
        return Ok(absolute.to_string());
    }
    base.join(relative)
        .map(|u| u.to_string())
        .map_err(|_| Error::MalformedUri(relative.to_string()))
}

/// Root-relativizes `absolute` against `base` when scheme and authority
/// match; otherwise returns `absolute` unchanged. `""` round-trips to `""`.
pub fn relativize(base: &Url, absolute: &str) -> String {
    if absolute.is_empty() {
        return String::new();
    }
    let Ok(parsed) = Url::parse(absolute) else {
        return absolute.to_string();
    };
    if parsed.scheme() != base.scheme() || parsed.authority() != base.authority() {
        return absolute.to_string();
    }

    let mut out = String::from(parsed.path());
    if let Some(query) = parsed.query() {
        out.push('?');
        out.push_str(query);
    }
    if let Some(fragment) = parsed.fragment() {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    #[quickcheck]
    fn resolve_then_relativize_round_trips_for_alphanumeric_segments(segment: String) -> TestResult {
        if segment.is_empty() || !segment.chars().all(|c| c.is_ascii_alphanumeric()) {
            return TestResult::discard();
        }
        let base = base();
        let p = format!("/{segment}");
        let resolved = match resolve(&base, &p) {
            Ok(r) => r,
            Err(_) => return TestResult::discard(),
        };
        TestResult::from_bool(relativize(&base, &resolved) == p)
    }

    fn base() -> Url {
        Url::parse("https://example.org/base/").unwrap()
    }

    #[test]
    fn empty_string_is_preserved() {
        assert_eq!(resolve(&base(), "").unwrap(), "");
        assert_eq!(relativize(&base(), ""), "");
    }

    #[test]
    fn resolve_then_relativize_round_trips() {
        // p is itself root-relative, matching the canonical encode() form.
        let p = "/base/path";
        let resolved = resolve(&base(), p).unwrap();
        assert_eq!(resolved, "https://example.org/base/path");
        assert_eq!(relativize(&base(), &resolved), p);
    }

    #[test]
    fn other_authority_survives_unchanged() {
        let absolute = "https://other.org/x";
        assert_eq!(relativize(&base(), absolute), absolute);
        assert_eq!(resolve(&base(), absolute).unwrap(), absolute);
    }
}
