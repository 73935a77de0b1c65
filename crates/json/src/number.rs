//! Numeric lexical forms shared by the four numeric `Value` variants
//! (`Integral`, `Floating`, `Integer`, `Decimal`) plus the `Number` parent
//! tag that dispatches to one of them by lexical shape.
use crate::error::{Error, Location};
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use std::cmp::Ordering;
use std::str::FromStr;

/// A decoded numeric literal, already classified into the concrete kind its
/// lexical form implies. `Number::decode` is the dispatcher referenced by
/// spec.md's `Number` variant ("parent tag resolved to one of the four
/// numerics by lexical shape").
#[derive(Clone, Debug)]
pub enum Number {
    Integral(i64),
    Floating(f64),
    Integer(BigInt),
    Decimal(BigDecimal),
}
use Number::*;

impl Number {
    /// Classifies `lexical` into the narrowest numeric kind it fits:
    /// an i64 if it parses as a plain integer and fits, a `BigInt` if it's
    /// a plain integer that overflows i64, a `BigDecimal` if it carries a
    /// decimal point or uses the legacy non-normalized form, and a float
    /// only when the normalized scientific form `m.fracEn` is used (or the
    /// legacy `m.frac` with a bare `e`/`E` exponent marker).
    pub fn decode(lexical: &str) -> Option<Number> {
        if lexical.is_empty() {
            return None;
        }
        if let Ok(n) = i64::from_str(lexical) {
            return Some(Integral(n));
        }
        if is_plain_integer(lexical) {
            return BigInt::from_str(lexical).ok().map(Integer);
        }
        if lexical.contains(['e', 'E']) {
            return lexical.parse::<f64>().ok().map(Floating);
        }
        BigDecimal::from_str(lexical).ok().map(Decimal)
    }

    /// Canonical lexical encoding:
    /// - `Integral`/`Integer` encode exactly, no separators.
    /// - `Floating` normalizes to `d.dddEn` with a single-digit mantissa
    ///   and a lowercase `e`.
    /// - `Decimal` keeps at least one digit after the point.
    pub fn encode(&self) -> String {
        match self {
            Integral(n) => n.to_string(),
            Integer(n) => n.to_string(),
            Floating(f) => encode_float(*f),
            Decimal(d) => encode_decimal(d),
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Floating(_))
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Integral(n) => *n as f64,
            Integer(n) => {
                // Lossy by construction; used only for ordering against floats.
                n.to_string().parse().unwrap_or(f64::NAN)
            }
            Floating(f) => *f,
            Decimal(d) => d.to_string().parse().unwrap_or(f64::NAN),
        }
    }
}

fn is_plain_integer(s: &str) -> bool {
    let s = s.strip_prefix(['+', '-']).unwrap_or(s);
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn encode_float(f: f64) -> String {
    if f == 0.0 {
        return if f.is_sign_negative() {
            "-0.0e0".to_string()
        } else {
            "0.0e0".to_string()
        };
    }
    if !f.is_finite() {
        return f.to_string();
    }
    let sign = if f < 0.0 { "-" } else { "" };
    let mut exp = f.abs().log10().floor() as i32;
    let mut mantissa = f.abs() / 10f64.powi(exp);

    // Guard against log10 rounding landing one digit off.
    if mantissa >= 10.0 {
        mantissa /= 10.0;
        exp += 1;
    } else if mantissa < 1.0 {
        mantissa *= 10.0;
        exp -= 1;
    }

    let digits = format!("{:.15e}", mantissa);
    let first_digit = &digits[..1];
    let frac = digits[2..].split('e').next().unwrap_or("0");
    let frac = frac.trim_end_matches('0');
    let frac = if frac.is_empty() { "0" } else { frac };

    format!("{sign}{first_digit}.{frac}e{exp}")
}

fn encode_decimal(d: &BigDecimal) -> String {
    let s = d.normalized().to_string();
    if s.contains('.') {
        s
    } else {
        format!("{s}.0")
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Integral(a), Integral(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Decimal(a), Decimal(b)) => a.cmp(b),
            (Integral(a), Integer(b)) => BigInt::from(*a).cmp(b),
            (Integer(a), Integral(b)) => a.cmp(&BigInt::from(*b)),
            (Decimal(_), _) | (_, Decimal(_)) => {
                let a = BigDecimal::from_str(&self.encode()).unwrap_or_default();
                let b = BigDecimal::from_str(&other.encode()).unwrap_or_default();
                a.cmp(&b)
            }
            (Floating(a), Floating(b)) => f64_cmp(a, b),
            (Floating(a), _) => f64_cmp(a, &other.to_f64()),
            (_, Floating(b)) => f64_cmp(&self.to_f64(), b),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Number {}

fn f64_cmp(lhs: &f64, rhs: &f64) -> Ordering {
    lhs.partial_cmp(rhs).unwrap_or_else(|| {
        if lhs.is_nan() && rhs.is_nan() {
            Ordering::Equal
        } else if lhs.is_nan() {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    })
}

/// Parses a location-aware numeric token as encountered by the lexer,
/// enforcing the strict-JSON rejections of spec.md §4.4 (leading zero,
/// trailing dot) before handing off to [`Number::decode`].
pub fn parse_strict(lexical: &str, loc: Location) -> Result<Number, Error> {
    let unsigned = lexical.strip_prefix('-').unwrap_or(lexical);
    if unsigned.len() > 1 && unsigned.starts_with('0') && !unsigned.starts_with("0.") {
        return Err(Error::LeadingZero(loc));
    }
    if lexical.ends_with('.') {
        return Err(Error::TrailingDot(loc));
    }
    Number::decode(lexical).ok_or_else(|| Error::MalformedNumber(loc, lexical.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_round_trip() {
        assert_eq!(Number::decode("0").unwrap().encode(), "0");
        assert_eq!(Number::decode("-42").unwrap().encode(), "-42");
    }

    #[test]
    fn decimal_keeps_minimum_scale() {
        let n = Number::decode("0").unwrap();
        assert!(matches!(n, Integral(0)));
        let d = Number::Decimal(BigDecimal::from_str("0").unwrap());
        assert_eq!(d.encode(), "0.0");
    }

    #[test]
    fn float_normalizes_to_scientific() {
        // A plain fractional literal with no exponent marker decodes as a
        // Decimal (xsd:decimal-shaped); only an exponent marker selects Floating.
        assert_eq!(Number::decode("12.3").unwrap().encode(), "12.3");
        assert_eq!(Number::decode("1.23e1").unwrap().encode(), "1.23e1");
        assert_eq!(Number::decode("1.23E1").unwrap().encode(), "1.23e1");
    }

    #[test]
    fn strict_rejects_leading_zero() {
        assert!(parse_strict("007", Location::START).is_err());
        assert!(parse_strict("0.7", Location::START).is_ok());
    }

    #[test]
    fn strict_rejects_trailing_dot() {
        assert!(parse_strict("1.", Location::START).is_err());
    }

    #[test]
    fn ordering_across_kinds() {
        let a = Number::Integral(10);
        let b = Number::Floating(10.5);
        assert!(a < b);
    }
}
