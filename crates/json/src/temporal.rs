//! Strict ISO 8601 temporal lexicals (spec.md §3 `Temporal`/`TemporalAmount`).
//!
//! Dispatch among the nine `Temporal` kinds and the two `TemporalAmount`
//! kinds is by lexical shape, mirroring `Number`'s dispatch in
//! [`crate::number`]. Each kind validates strictly on decode and
//! round-trips its own lexical form unchanged on encode (this module does
//! not normalize between kinds).
use crate::error::Error;
use lazy_static::lazy_static;
use regex::Regex;
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum Temporal {
    Year(i32),
    YearMonth(i32, u8),
    LocalDate(String),
    LocalTime(String),
    OffsetTime(String),
    LocalDateTime(String),
    OffsetDateTime(String),
    ZonedDateTime(String),
    Instant(String),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TemporalAmount {
    Period(String),
    Duration(String),
}

lazy_static! {
    static ref YEAR_RE: Regex = Regex::new(r"^-?\d{4,}$").unwrap();
    static ref YEAR_MONTH_RE: Regex = Regex::new(r"^-?\d{4,}-\d{2}$").unwrap();
    static ref ZONE_SUFFIX_RE: Regex = Regex::new(r"\[[A-Za-z0-9_+\-/]+\]$").unwrap();
    static ref DURATION_RE: Regex =
        Regex::new(r"^-?P(\d+Y)?(\d+M)?(\d+D)?(T(\d+H)?(\d+M)?(\d+(\.\d+)?S)?)?$").unwrap();
    static ref PERIOD_RE: Regex = Regex::new(r"^-?P(\d+Y)?(\d+M)?(\d+W)?(\d+D)?$").unwrap();
}

impl Temporal {
    /// Classifies and validates `lexical` against the shape the generic
    /// `Temporal` datatype dispatches over. Callers that already know the
    /// concrete kind (via a non-generic Shape datatype) should instead
    /// validate directly with that kind's own rules.
    pub fn decode(lexical: &str) -> Result<Temporal, Error> {
        if YEAR_MONTH_RE.is_match(lexical) {
            let (y, m) = lexical.split_once('-').unwrap();
            let year: i32 = y.parse().map_err(|_| malformed(lexical))?;
            let month: u8 = m.parse().map_err(|_| malformed(lexical))?;
            if !(1..=12).contains(&month) {
                return Err(malformed(lexical));
            }
            return Ok(Temporal::YearMonth(year, month));
        }
        if YEAR_RE.is_match(lexical) {
            let year: i32 = lexical.parse().map_err(|_| malformed(lexical))?;
            return Ok(Temporal::Year(year));
        }
        if !lexical.contains('T') && !lexical.contains(':') {
            Date::parse(lexical, &DATE_FORMAT)
                .map_err(|_| malformed(lexical))?;
            return Ok(Temporal::LocalDate(lexical.to_string()));
        }
        if !lexical.contains('T') {
            // Bare time-of-day, with or without an offset.
            return if has_offset(lexical) {
                Time::parse(strip_offset(lexical), &TIME_FORMAT)
                    .map_err(|_| malformed(lexical))?;
                Ok(Temporal::OffsetTime(lexical.to_string()))
            } else {
                Time::parse(lexical, &TIME_FORMAT).map_err(|_| malformed(lexical))?;
                Ok(Temporal::LocalTime(lexical.to_string()))
            };
        }
        if ZONE_SUFFIX_RE.is_match(lexical) {
            let bare = ZONE_SUFFIX_RE.replace(lexical, "");
            OffsetDateTime::parse(&bare, &Rfc3339).map_err(|_| malformed(lexical))?;
            return Ok(Temporal::ZonedDateTime(lexical.to_string()));
        }
        if lexical.ends_with('Z') {
            OffsetDateTime::parse(lexical, &Rfc3339).map_err(|_| malformed(lexical))?;
            return Ok(Temporal::Instant(lexical.to_string()));
        }
        if has_offset(lexical) {
            OffsetDateTime::parse(lexical, &Rfc3339).map_err(|_| malformed(lexical))?;
            return Ok(Temporal::OffsetDateTime(lexical.to_string()));
        }
        PrimitiveDateTime::parse(lexical, &DATE_TIME_FORMAT).map_err(|_| malformed(lexical))?;
        Ok(Temporal::LocalDateTime(lexical.to_string()))
    }

    pub fn encode(&self) -> String {
        match self {
            Temporal::Year(y) => format!("{y:04}"),
            Temporal::YearMonth(y, m) => format!("{y:04}-{m:02}"),
            Temporal::LocalDate(s)
            | Temporal::LocalTime(s)
            | Temporal::OffsetTime(s)
            | Temporal::LocalDateTime(s)
            | Temporal::OffsetDateTime(s)
            | Temporal::ZonedDateTime(s)
            | Temporal::Instant(s) => s.clone(),
        }
    }
}

impl TemporalAmount {
    pub fn decode(lexical: &str) -> Result<TemporalAmount, Error> {
        if DURATION_RE.is_match(lexical) && lexical.contains('T') {
            Ok(TemporalAmount::Duration(lexical.to_string()))
        } else if PERIOD_RE.is_match(lexical) {
            Ok(TemporalAmount::Period(lexical.to_string()))
        } else if DURATION_RE.is_match(lexical) {
            Ok(TemporalAmount::Duration(lexical.to_string()))
        } else {
            Err(malformed(lexical))
        }
    }

    pub fn encode(&self) -> String {
        match self {
            TemporalAmount::Period(s) | TemporalAmount::Duration(s) => s.clone(),
        }
    }
}

// Bare time-of-day strings never contain '-', so any '+'/'-'/'Z' after the
// first character signals a trailing zone offset.
fn has_offset(lexical: &str) -> bool {
    lexical[1..].contains(['+', '-', 'Z'])
}

fn strip_offset(lexical: &str) -> &str {
    match lexical[1..].find(['+', '-', 'Z']) {
        Some(idx) => &lexical[..idx + 1],
        None => lexical,
    }
}

fn malformed(lexical: &str) -> Error {
    Error::MalformedTemporal(lexical.to_string())
}

use time::format_description::FormatItem;
use time::macros::format_description as fd;
const DATE_FORMAT: &[FormatItem<'static>] = fd!("[year]-[month]-[day]");
const TIME_FORMAT: &[FormatItem<'static>] = fd!("[hour]:[minute]:[second]");
const DATE_TIME_FORMAT: &[FormatItem<'static>] =
    fd!("[year]-[month]-[day]T[hour]:[minute]:[second]");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_by_shape() {
        assert_eq!(Temporal::decode("2024").unwrap(), Temporal::Year(2024));
        assert_eq!(
            Temporal::decode("2024-03").unwrap(),
            Temporal::YearMonth(2024, 3)
        );
        assert!(matches!(
            Temporal::decode("2024-03-05").unwrap(),
            Temporal::LocalDate(_)
        ));
        assert!(matches!(
            Temporal::decode("10:30:00").unwrap(),
            Temporal::LocalTime(_)
        ));
        assert!(matches!(
            Temporal::decode("2024-03-05T10:30:00").unwrap(),
            Temporal::LocalDateTime(_)
        ));
        assert!(matches!(
            Temporal::decode("2024-03-05T10:30:00Z").unwrap(),
            Temporal::Instant(_)
        ));
    }

    #[test]
    fn round_trips_lexical_form() {
        let s = "2024-03-05T10:30:00+02:00";
        assert_eq!(Temporal::decode(s).unwrap().encode(), s);
    }

    #[test]
    fn duration_and_period_dispatch() {
        assert!(matches!(
            TemporalAmount::decode("P3Y6M4D").unwrap(),
            TemporalAmount::Period(_)
        ));
        assert!(matches!(
            TemporalAmount::decode("PT1H30M").unwrap(),
            TemporalAmount::Duration(_)
        ));
    }
}
