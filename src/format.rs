//! Zero-allocation number-to-byte formatting for [`crate::Writer`] (§4.5).
//!
//! Integers go through `itoa`; doubles through `ryu`, whose shortest
//! round-trip form we adopt as this implementation's canonical double
//! format (resolving the Open Question in §9: no trailing zeros beyond
//! what round-tripping requires, switching to scientific notation outside
//! `ryu`'s fixed exponent window). Both write into a caller-provided
//! stack buffer and return the number of bytes written; neither allocates.

/// Upper bound on the ASCII length of any formatted `i64`, including sign.
pub const MAX_INT_LEN: usize = 20;
/// Upper bound on the ASCII length of any formatted `f64` in `ryu`'s form.
pub const MAX_DOUBLE_LEN: usize = 32;

/// Write `value` as ASCII decimal into `buf`, returning the slice written.
/// `buf` must be at least [`MAX_INT_LEN`] bytes.
#[inline]
pub fn write_i64<'b>(value: i64, buf: &'b mut [u8; MAX_INT_LEN]) -> &'b [u8] {
    let mut printer = itoa::Buffer::new();
    let s = printer.format(value);
    buf[..s.len()].copy_from_slice(s.as_bytes());
    &buf[..s.len()]
}

/// Write `value` in `ryu`'s shortest round-trip form into `buf`. `buf` must
/// be at least [`MAX_DOUBLE_LEN`] bytes. JSON has no representation for
/// NaN/Infinity; callers must reject those before reaching the writer
/// (see [`crate::writer::Writer::write_double`]).
#[inline]
pub fn write_f64<'b>(value: f64, buf: &'b mut [u8; MAX_DOUBLE_LEN]) -> &'b [u8] {
    let mut printer = ryu::Buffer::new();
    let s = printer.format_finite(value);
    buf[..s.len()].copy_from_slice(s.as_bytes());
    &buf[..s.len()]
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_write_i64() {
        let mut buf = [0u8; MAX_INT_LEN];
        assert_eq!(write_i64(0, &mut buf), b"0");
        assert_eq!(write_i64(-1, &mut buf), b"-1");
        assert_eq!(write_i64(i64::MAX, &mut buf), b"9223372036854775807");
        assert_eq!(write_i64(i64::MIN, &mut buf), b"-9223372036854775808");
    }

    #[test]
    fn test_write_f64_round_trips() {
        let mut buf = [0u8; MAX_DOUBLE_LEN];
        let written = write_f64(27000.5, &mut buf);
        let s = std::str::from_utf8(written).unwrap();
        assert_eq!(s.parse::<f64>().unwrap(), 27000.5);
    }
}
