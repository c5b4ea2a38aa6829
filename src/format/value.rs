//! Typed header values
//!
//! Header values carry no declared schema. Their type is inferred from the
//! raw token, always in the same order: boolean, then number, then string.

use std::fmt;

use serde::Serialize;

/// A coerced header value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Short name of the variant, used in CLI output
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Canonical text form, the inverse of [`coerce`]
///
/// Floats always keep a decimal point, also in exponent form (`1.0e16`), so
/// that re-coercing the text yields a float again.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => {
                let text = format!("{:?}", x);
                match text.find('e') {
                    Some(pos) if !text[..pos].contains('.') => {
                        write!(f, "{}.0{}", &text[..pos], &text[pos..])
                    }
                    _ => f.write_str(&text),
                }
            }
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

/// Shape of a token that looks like a number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Numeric {
    Integer,
    /// Digits and an exponent, no decimal point
    Exponent,
    Fractional,
}

/// Coerce a raw token into a typed value
///
/// Never fails: anything that is neither a boolean nor numeric is kept as
/// the literal string. A token without a decimal point is an integer when
/// its value is whole and fits in `i64`, so `1e3` is `Int(1000)` while
/// `1e-3` and `1.0e3` are floats.
pub fn coerce(raw: &str) -> Value {
    if raw.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }

    match classify_numeric(raw) {
        Some(Numeric::Integer) => match raw.parse::<i64>() {
            Ok(i) => Value::Int(i),
            // Out of i64 range
            Err(_) => parse_float(raw),
        },
        Some(Numeric::Exponent) => match raw.parse::<f64>() {
            Ok(x) if x.fract() == 0.0 && (I64_LOW..I64_HIGH).contains(&x) => Value::Int(x as i64),
            _ => parse_float(raw),
        },
        Some(Numeric::Fractional) => parse_float(raw),
        None => Value::Str(raw.to_string()),
    }
}

/// `i64::MIN` and `i64::MAX + 1` as exact floats
const I64_LOW: f64 = -9_223_372_036_854_775_808.0;
const I64_HIGH: f64 = 9_223_372_036_854_775_808.0;

/// Tokens whose magnitude overflows to infinity stay strings
fn parse_float(raw: &str) -> Value {
    match raw.parse::<f64>() {
        Ok(x) if x.is_finite() => Value::Float(x),
        _ => Value::Str(raw.to_string()),
    }
}

/// Recognizes `[+-]?(D+(.D*)?|.D+)([eE][+-]?D+)?`
fn classify_numeric(raw: &str) -> Option<Numeric> {
    let bytes = raw.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = i - int_start;

    let mut shape = Numeric::Integer;
    let mut frac_digits = 0;
    if i < bytes.len() && bytes[i] == b'.' {
        shape = Numeric::Fractional;
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        frac_digits = i - frac_start;
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        if shape == Numeric::Integer {
            shape = Numeric::Exponent;
        }
        i += 1;
        if matches!(bytes.get(i), Some(b'+') | Some(b'-')) {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return None;
        }
    }

    if i == bytes.len() {
        Some(shape)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_booleans_case_insensitive() {
        assert_eq!(coerce("true"), Value::Bool(true));
        assert_eq!(coerce("TRUE"), Value::Bool(true));
        assert_eq!(coerce("False"), Value::Bool(false));
    }

    #[test]
    fn test_integers() {
        assert_eq!(coerce("3"), Value::Int(3));
        assert_eq!(coerce("-42"), Value::Int(-42));
        assert_eq!(coerce("+7"), Value::Int(7));
        assert_eq!(coerce("007"), Value::Int(7));
    }

    #[test]
    fn test_floats() {
        assert_eq!(coerce("3.5"), Value::Float(3.5));
        assert_eq!(coerce(".5"), Value::Float(0.5));
        assert_eq!(coerce("5."), Value::Float(5.0));
        assert_eq!(coerce("1.0e3"), Value::Float(1000.0));
        assert_eq!(coerce("-2.5E-2"), Value::Float(-0.025));
    }

    #[test]
    fn test_exponent_without_point() {
        assert_eq!(coerce("1e3"), Value::Int(1000));
        assert_eq!(coerce("-2E+2"), Value::Int(-200));
        assert_eq!(coerce("25e-1"), Value::Float(2.5));
        assert_eq!(coerce("1e-3"), Value::Float(0.001));
        assert_eq!(coerce("1e19"), Value::Float(1e19));
        assert_eq!(coerce("-9223372036854775808e0"), Value::Int(i64::MIN));
    }

    #[test]
    fn test_integer_overflow_becomes_float() {
        assert_eq!(coerce("99999999999999999999"), Value::Float(1e20));
        assert_eq!(coerce("1e999"), Value::Str("1e999".into()));
    }

    #[test]
    fn test_strings_kept_verbatim() {
        assert_eq!(coerce("AES-256-cbc"), Value::Str("AES-256-cbc".into()));
        assert_eq!(coerce("1.2.3"), Value::Str("1.2.3".into()));
        assert_eq!(coerce("."), Value::Str(".".into()));
        assert_eq!(coerce("1e"), Value::Str("1e".into()));
        assert_eq!(coerce("yes"), Value::Str("yes".into()));
        assert_eq!(coerce(""), Value::Str(String::new()));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::Float(3.0).to_string(), "3.0");
        assert_eq!(Value::Float(0.25).to_string(), "0.25");
        assert_eq!(Value::Float(1e16).to_string(), "1.0e16");
        assert_eq!(Value::Float(1e-7).to_string(), "1.0e-7");
        assert_eq!(Value::Float(-2.5e20).to_string(), "-2.5e20");
        assert_eq!(Value::Str("int".into()).to_string(), "int");
    }

    #[test]
    fn test_float_keeps_variant_through_display() {
        for raw in ["5.", "1.0e3", "1e19", "1.0e16", "99999999999999999999", "0.000000001"] {
            let first = coerce(raw);
            assert_eq!(coerce(&first.to_string()), first, "token {raw}");
        }
    }

    #[test]
    fn test_serialize_untagged() {
        let json = serde_json::to_string(&vec![
            Value::Bool(true),
            Value::Int(3),
            Value::Float(1.5),
            Value::Str("x".into()),
        ])
        .unwrap();
        assert_eq!(json, r#"[true,3,1.5,"x"]"#);
    }

    proptest! {
        #[test]
        fn coercion_is_idempotent_under_display(s in "\\PC*") {
            let first = coerce(&s);
            let second = coerce(&first.to_string());
            prop_assert_eq!(first.kind(), second.kind());
            prop_assert_eq!(first, second);
        }

        #[test]
        fn numeric_tokens_coerce_idempotently(s in "[+-]?[0-9]{0,6}(\\.[0-9]{0,6})?([eE][+-]?[0-9]{1,3})?") {
            let first = coerce(&s);
            prop_assert_eq!(coerce(&first.to_string()), first);
        }
    }
}
