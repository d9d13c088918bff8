//! Input cursor: a uniform byte-addressable view over whatever container the
//! caller handed to [`crate::Parser::parse`] (§4.1).
//!
//! The reference design expresses cursors as a small capability set so the
//! tokenizer's inner loop never pays for a vtable. We follow the same idea
//! with a tagged `enum` over the backings this crate supports, with inherent
//! methods dispatched by `match` rather than a `dyn Trait` -- the compiler
//! inlines and monomorphizes the match arms in the tokenizer's hot loop.

use crate::error::ParseError;
use crate::slice::ByteSlice;

/// The backings a [`Cursor`] can wrap. `Bytes` models an externally owned,
/// possibly off-heap byte container (the Rust analogue of a direct/off-heap
/// buffer-backed cursor in §4.1); `Str` models a character-based input that
/// is, in Rust, already UTF-8 and therefore needs no eager transcoding --
/// unlike a UTF-16-backed host string, where the same cursor kind would copy
/// once on bind. See `DESIGN.md` for why that particular divergence (the
/// `underlying_offset` Open Question) does not apply to a native Rust `str`.
#[derive(Clone, Copy)]
pub enum Cursor<'src> {
    /// A plain borrowed byte array; the identity cursor.
    Slice(&'src [u8]),
    /// An externally owned, reference-counted byte container.
    Bytes(&'src bytes::Bytes),
    /// A UTF-8 string slice.
    Str(&'src str),
}

impl<'src> Cursor<'src> {
    #[inline]
    pub fn length(&self) -> usize {
        match self {
            Cursor::Slice(b) => b.len(),
            Cursor::Bytes(b) => b.len(),
            Cursor::Str(s) => s.len(),
        }
    }

    #[inline]
    fn bytes(&self) -> &'src [u8] {
        match self {
            Cursor::Slice(b) => b,
            Cursor::Bytes(b) => b.as_ref(),
            Cursor::Str(s) => s.as_bytes(),
        }
    }

    #[inline]
    pub fn byte_at(&self, i: usize) -> Result<u8, ParseError> {
        self.bytes()
            .get(i)
            .copied()
            .ok_or(ParseError::IndexOutOfBounds {
                index: i,
                length: self.length(),
            })
    }

    /// The codepoint starting at byte offset `i`, decoded as UTF-8.
    pub fn char_at(&self, i: usize) -> Result<char, ParseError> {
        let bytes = self.bytes();
        if i >= bytes.len() {
            return Err(ParseError::IndexOutOfBounds {
                index: i,
                length: bytes.len(),
            });
        }
        std::str::from_utf8(&bytes[i..])
            .ok()
            .and_then(|s| s.chars().next())
            .ok_or(ParseError::IndexOutOfBounds {
                index: i,
                length: bytes.len(),
            })
    }

    /// Borrow `[start, start+len)`. Bounds are validated against
    /// `[0, length]`, matching the contract in §4.1.
    #[inline]
    pub fn slice(&self, start: usize, len: usize) -> Result<ByteSlice<'src>, ParseError> {
        let bytes = self.bytes();
        let end = start
            .checked_add(len)
            .filter(|&end| end <= bytes.len())
            .ok_or(ParseError::IndexOutOfBounds {
                index: start + len,
                length: bytes.len(),
            })?;
        Ok(ByteSlice::new(&bytes[start..end]))
    }

    /// The escape hatch used by zero-allocation numeric parsing: direct
    /// access to the contiguous backing bytes, when one exists.
    #[inline]
    pub fn underlying_bytes(&self) -> Option<&'src [u8]> {
        Some(self.bytes())
    }

    /// Translate a byte offset into whatever addressing `underlying_bytes`
    /// uses. For every backing this crate supports that's the identity
    /// function, because Rust strings are UTF-8 internally; a UTF-16-backed
    /// cursor (where this would diverge) is not a realistic Rust input type,
    /// so this crate does not fabricate one (see `DESIGN.md`).
    #[inline]
    pub fn underlying_offset(&self, pos: usize) -> usize {
        pos
    }
}
