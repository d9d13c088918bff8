//! Lazily materialized JSON string view (§4.3, §4.4).
//!
//! A `StringView` never decodes its escapes eagerly. `byte_length`/
//! `byte_at`/`slice`/`equals` all operate on the raw source bytes, paying
//! nothing for strings that never need escape decoding (the common case for
//! symbol/venue fields on a hot path). `to_string` decodes into an owned
//! `String` only when a caller actually asks for one, and the numeric
//! `parse_*` methods memoize their result in the node's scratch cache so a
//! repeated call (e.g. the same quantity field read twice) does not re-walk
//! the digit run.

use crate::ast::NodeId;
use crate::context::Context;
use crate::error::UsageError;
use crate::number;
use crate::slice::ByteSlice;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;

#[derive(Clone, Copy)]
pub struct StringView<'p, 'src> {
    ctx: &'p Context<'p, 'src>,
    node: NodeId,
}

impl<'p, 'src> StringView<'p, 'src> {
    pub(crate) fn new(ctx: &'p Context<'p, 'src>, node: NodeId) -> Self {
        ctx.views().record_string();
        StringView { ctx, node }
    }

    fn data(&self) -> crate::ast::NodeData {
        self.ctx.ast().node(self.node)
    }

    /// Length of the raw (still-escaped) source bytes -- not the decoded
    /// length, which can differ when escapes are present.
    pub fn byte_length(&self) -> usize {
        let d = self.data();
        (d.end - d.start) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.byte_length() == 0
    }

    /// Raw byte at `i` within the (still-escaped) source run.
    pub fn byte_at(&self, i: usize) -> Result<u8, UsageError> {
        let d = self.data();
        self.ctx
            .cursor()
            .byte_at(d.start as usize + i)
            .map_err(|_| UsageError::IndexOutOfBounds {
                index: i,
                length: self.byte_length(),
            })
    }

    /// Zero-copy slice of the raw (still-escaped) source bytes.
    pub fn slice(&self, start: usize, len: usize) -> Result<ByteSlice<'src>, UsageError> {
        let d = self.data();
        self.ctx.views().record_slice();
        self.ctx
            .cursor()
            .slice(d.start as usize + start, len)
            .map_err(|_| UsageError::IndexOutOfBounds {
                index: start + len,
                length: self.byte_length(),
            })
    }

    fn raw_bytes(&self) -> Option<&'src [u8]> {
        let d = self.data();
        match self.ctx.cursor().underlying_bytes() {
            Some(bytes) => bytes.get(d.start as usize..d.end as usize),
            None => None,
        }
    }

    /// Decode escapes (if any) into an owned `String`. The fast path for an
    /// unescaped run borrows the source bytes; only a string containing at
    /// least one `\` allocates and walks the escape grammar.
    pub fn to_string_decoded(&self) -> Result<String, UsageError> {
        let d = self.data();
        if !d.string_escaped() {
            let raw = self.raw_bytes().ok_or(UsageError::InvalidUtf8)?;
            return std::str::from_utf8(raw)
                .map(str::to_owned)
                .map_err(|_| UsageError::InvalidUtf8);
        }
        decode_escaped(self.ctx.cursor(), d.start, d.end)
    }

    pub fn equals(&self, other: &str) -> Result<bool, UsageError> {
        if !self.data().string_escaped() {
            return Ok(self
                .raw_bytes()
                .map(|raw| raw == other.as_bytes())
                .unwrap_or(false));
        }
        Ok(self.to_string_decoded()? == other)
    }

    /// Append the decoded contents to `out`, without an intermediate
    /// allocation when the string has no escapes to resolve.
    pub fn append_to(&self, out: &mut String) -> Result<(), UsageError> {
        if !self.data().string_escaped() {
            let raw = self.raw_bytes().ok_or(UsageError::InvalidUtf8)?;
            out.push_str(std::str::from_utf8(raw).map_err(|_| UsageError::InvalidUtf8)?);
            return Ok(());
        }
        out.push_str(&self.to_string_decoded()?);
        Ok(())
    }

    fn digits(&self) -> Result<&'src [u8], UsageError> {
        // A quoted numeric string (e.g. `"27000.5"` on a venue that quotes
        // prices) is still a plain unescaped byte run; parse it directly.
        self.raw_bytes().ok_or(UsageError::InvalidUtf8)
    }

    pub fn parse_long(&self) -> Result<i64, UsageError> {
        self.ctx.with_cache(self.node, |c| {
            if let Some(r) = &c.long {
                return r.clone();
            }
            let r = self.digits().and_then(|b| number::parse_long(b));
            c.long = Some(r.clone());
            r
        })
    }

    pub fn parse_int(&self) -> Result<i32, UsageError> {
        self.ctx.with_cache(self.node, |c| {
            if let Some(r) = &c.int {
                return r.clone();
            }
            let r = self.digits().and_then(|b| number::parse_int(b));
            c.int = Some(r.clone());
            r
        })
    }

    pub fn parse_double(&self) -> Result<f64, UsageError> {
        self.ctx.with_cache(self.node, |c| {
            if let Some(r) = &c.double {
                return r.clone();
            }
            let r = self.digits().and_then(|b| number::parse_double(b));
            c.double = Some(r.clone());
            r
        })
    }

    pub fn parse_float(&self) -> Result<f32, UsageError> {
        self.ctx.with_cache(self.node, |c| {
            if let Some(r) = &c.float {
                return r.clone();
            }
            let r = self.digits().and_then(|b| number::parse_float(b));
            c.float = Some(r.clone());
            r
        })
    }

    /// Arbitrary-precision parses are never memoized -- they already
    /// allocate on every call, so caching would only trade one allocation
    /// for another without the zero-allocation payoff memoization exists
    /// for on the other `parse_*` methods.
    pub fn parse_big_decimal(&self) -> Result<BigDecimal, UsageError> {
        self.digits().and_then(|b| number::parse_big_decimal(b))
    }

    pub fn parse_big_integer(&self) -> Result<BigInt, UsageError> {
        self.digits().and_then(|b| number::parse_big_integer(b))
    }
}

/// Decode the escapes within `[start, end)` of `cursor`'s source into an
/// owned `String`, handling the six single-character escapes, `\uXXXX`, and
/// surrogate pairs. An unpaired low/high surrogate decodes to U+FFFD rather
/// than failing the parse -- matching how lenient JSON readers commonly
/// treat the case, since the document already tokenized successfully.
pub(crate) fn decode_escaped(
    cursor: &crate::cursor::Cursor<'_>,
    start: u32,
    end: u32,
) -> Result<String, UsageError> {
    let mut out = String::with_capacity((end - start) as usize);
    let mut i = start as usize;
    let end = end as usize;
    while i < end {
        let b = cursor.byte_at(i).map_err(|_| UsageError::InvalidUtf8)?;
        if b != b'\\' {
            // Copy the run of plain bytes up to the next escape in one UTF-8
            // decode rather than one `char` at a time.
            let run_start = i;
            while i < end && cursor.byte_at(i).map_err(|_| UsageError::InvalidUtf8)? != b'\\' {
                i += 1;
            }
            let bytes = cursor
                .slice(run_start, i - run_start)
                .map_err(|_| UsageError::InvalidUtf8)?;
            out.push_str(std::str::from_utf8(bytes.as_bytes()).map_err(|_| UsageError::InvalidUtf8)?);
            continue;
        }
        i += 1; // consume backslash
        let esc = cursor.byte_at(i).map_err(|_| UsageError::InvalidUtf8)?;
        i += 1;
        match esc {
            b'"' => out.push('"'),
            b'\\' => out.push('\\'),
            b'/' => out.push('/'),
            b'b' => out.push('\u{0008}'),
            b'f' => out.push('\u{000C}'),
            b'n' => out.push('\n'),
            b'r' => out.push('\r'),
            b't' => out.push('\t'),
            b'u' => {
                let high = read_hex4(cursor, i)?;
                i += 4;
                if (0xD800..=0xDBFF).contains(&high) {
                    // Expect a low surrogate immediately following.
                    let is_pair_escape = cursor.byte_at(i).ok() == Some(b'\\')
                        && cursor.byte_at(i + 1).ok() == Some(b'u');
                    if is_pair_escape {
                        let low = read_hex4(cursor, i + 2)?;
                        if (0xDC00..=0xDFFF).contains(&low) {
                            let c = 0x10000
                                + ((high - 0xD800) << 10)
                                + (low - 0xDC00);
                            out.push(char::from_u32(c).unwrap_or('\u{FFFD}'));
                            i += 6;
                            continue;
                        }
                    }
                    out.push('\u{FFFD}');
                } else if (0xDC00..=0xDFFF).contains(&high) {
                    out.push('\u{FFFD}');
                } else {
                    out.push(char::from_u32(high).unwrap_or('\u{FFFD}'));
                }
            }
            _ => return Err(UsageError::InvalidUtf8),
        }
    }
    Ok(out)
}

fn read_hex4(cursor: &crate::cursor::Cursor<'_>, at: usize) -> Result<u32, UsageError> {
    let mut value = 0u32;
    for offset in 0..4 {
        let b = cursor.byte_at(at + offset).map_err(|_| UsageError::InvalidUtf8)?;
        let digit = (b as char).to_digit(16).ok_or(UsageError::InvalidUtf8)?;
        value = (value << 4) | digit;
    }
    Ok(value)
}
