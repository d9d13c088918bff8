//! Zero-allocation byte-to-number parsing (§4.4).
//!
//! Every routine here takes a digit run already extracted by the tokenizer
//! (or handed in by a caller via [`crate::views::StringView::parse_long`]
//! and friends) and never allocates on the success path; only the
//! arbitrary-precision routines at the bottom, which hand off to
//! `bigdecimal`/`num-bigint`, allocate.

use crate::error::UsageError;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use std::str::FromStr;

/// Parse a JSON integer or float digit run as an `i64`.
///
/// Rejects empty input and a bare sign. A digit run containing `.`, `e`, or
/// `E` is parsed as a double and narrowed, failing if the double falls
/// outside the `i64` range -- matching the reference's documented fallback.
pub fn parse_long(bytes: &[u8]) -> Result<i64, UsageError> {
    if bytes.is_empty() {
        return Err(UsageError::TypeMismatch {
            expected: "integer",
            found: "empty",
        });
    }
    let (negative, digits) = match bytes[0] {
        b'-' => (true, &bytes[1..]),
        _ => (false, bytes),
    };
    if digits.is_empty() {
        return Err(UsageError::TypeMismatch {
            expected: "integer",
            found: "bare sign",
        });
    }
    if digits
        .iter()
        .any(|&b| b == b'.' || b == b'e' || b == b'E')
    {
        let d = parse_double(bytes)?;
        if d < i64::MIN as f64 || d > i64::MAX as f64 {
            return Err(UsageError::NumericOverflow);
        }
        return Ok(d as i64);
    }

    let mut value: u64 = 0;
    for &b in digits {
        if !b.is_ascii_digit() {
            return Err(UsageError::TypeMismatch {
                expected: "integer",
                found: "non-digit byte",
            });
        }
        let digit = (b - b'0') as u64;
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(digit))
            .ok_or(UsageError::NumericOverflow)?;
    }

    if negative {
        if value == i64::MAX as u64 + 1 {
            Ok(i64::MIN)
        } else if value > i64::MAX as u64 {
            Err(UsageError::NumericOverflow)
        } else {
            Ok(-(value as i64))
        }
    } else if value > i64::MAX as u64 {
        Err(UsageError::NumericOverflow)
    } else {
        Ok(value as i64)
    }
}

/// Parse a JSON integer or float digit run as an `i32`, via [`parse_long`].
pub fn parse_int(bytes: &[u8]) -> Result<i32, UsageError> {
    let long = parse_long(bytes)?;
    i32::try_from(long).map_err(|_| UsageError::NumericOverflow)
}

/// Parse a JSON number digit run as an `f64`.
///
/// Scientific notation is delegated to the standard library's textual
/// parser for correctness. Otherwise the integer and fractional parts are
/// walked by hand with a running `/10` factor, per §4.4.
pub fn parse_double(bytes: &[u8]) -> Result<f64, UsageError> {
    if bytes.is_empty() {
        return Err(UsageError::TypeMismatch {
            expected: "number",
            found: "empty",
        });
    }
    if bytes.iter().any(|&b| b == b'e' || b == b'E') {
        let s = std::str::from_utf8(bytes).map_err(|_| UsageError::InvalidUtf8)?;
        return f64::from_str(s).map_err(|_| UsageError::TypeMismatch {
            expected: "number",
            found: "malformed scientific notation",
        });
    }

    let (negative, rest) = match bytes[0] {
        b'-' => (true, &bytes[1..]),
        _ => (false, bytes),
    };
    if rest.is_empty() {
        return Err(UsageError::TypeMismatch {
            expected: "number",
            found: "bare sign",
        });
    }

    let mut value: f64 = 0.0;
    let mut i = 0;
    let mut integer_digits = 0;
    while i < rest.len() && rest[i].is_ascii_digit() {
        value = value * 10.0 + (rest[i] - b'0') as f64;
        i += 1;
        integer_digits += 1;
    }
    let mut any_digit = integer_digits > 0;
    if i < rest.len() && rest[i] == b'.' {
        i += 1;
        let mut factor = 0.1;
        while i < rest.len() && rest[i].is_ascii_digit() {
            value += (rest[i] - b'0') as f64 * factor;
            factor *= 0.1;
            i += 1;
            any_digit = true;
        }
    }
    // JSON numbers require at least one integer digit; `.5` is not valid.
    if integer_digits == 0 || !any_digit || i != rest.len() {
        return Err(UsageError::TypeMismatch {
            expected: "number",
            found: "malformed digit run",
        });
    }
    Ok(if negative { -value } else { value })
}

/// Parse a JSON number digit run as an `f32`, via [`parse_double`].
pub fn parse_float(bytes: &[u8]) -> Result<f32, UsageError> {
    let d = parse_double(bytes)?;
    let f = d as f32;
    if f.is_infinite() && !d.is_infinite() {
        return Err(UsageError::NumericOverflow);
    }
    Ok(f)
}

/// Parse via the host's arbitrary-precision decimal type. Not
/// zero-allocation, per §4.4.
pub fn parse_big_decimal(bytes: &[u8]) -> Result<BigDecimal, UsageError> {
    let s = std::str::from_utf8(bytes).map_err(|_| UsageError::InvalidUtf8)?;
    BigDecimal::from_str(s).map_err(|_| UsageError::TypeMismatch {
        expected: "decimal",
        found: "malformed digit run",
    })
}

/// Parse via the host's arbitrary-precision integer type. Not
/// zero-allocation, per §4.4.
pub fn parse_big_integer(bytes: &[u8]) -> Result<BigInt, UsageError> {
    let s = std::str::from_utf8(bytes).map_err(|_| UsageError::InvalidUtf8)?;
    BigInt::from_str(s).map_err(|_| UsageError::TypeMismatch {
        expected: "integer",
        found: "malformed digit run",
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_long_boundaries() {
        assert_eq!(parse_long(b"9223372036854775807").unwrap(), i64::MAX);
        assert_eq!(
            parse_long(b"9223372036854775808").unwrap_err(),
            UsageError::NumericOverflow
        );
        assert_eq!(parse_long(b"-9223372036854775808").unwrap(), i64::MIN);
    }

    #[test]
    fn test_long_rejects_bare_sign_and_empty() {
        assert!(parse_long(b"").is_err());
        assert!(parse_long(b"-").is_err());
    }

    #[test]
    fn test_long_falls_back_through_double() {
        assert_eq!(parse_long(b"42.0").unwrap(), 42);
    }

    #[test]
    fn test_double_basic() {
        assert_eq!(parse_double(b"27000.5").unwrap(), 27000.5);
        assert_eq!(parse_double(b"-0.125").unwrap(), -0.125);
        assert_eq!(parse_double(b"1e3").unwrap(), 1000.0);
        assert_eq!(parse_double(b"1.5E-2").unwrap(), 0.015);
    }

    #[test]
    fn test_double_rejects_malformed() {
        assert!(parse_double(b"").is_err());
        assert!(parse_double(b".5").is_err());
        assert!(parse_double(b"-").is_err());
    }

    #[test]
    fn test_big_decimal() {
        let d = parse_big_decimal(b"27000.500000000000000001").unwrap();
        assert_eq!(d.to_string(), "27000.500000000000000001");
    }
}
