//! Zero-allocation streaming JSON writer (§5).
//!
//! `Writer` is immediate-mode: every call appends directly to the caller's
//! output buffer, there is no intermediate tree. Structural correctness
//! (commas, matching braces) is tracked with a small depth-kind stack so a
//! caller that forgets to close a container gets a `UsageError` rather than
//! a malformed document.

use crate::error::UsageError;
use crate::format::{self, MAX_DOUBLE_LEN, MAX_INT_LEN};
use crate::slice::ByteSlice;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

#[derive(Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

/// One open container on the writer's structural stack, tracking whether a
/// comma is owed before the next field/element.
struct Frame {
    kind: Container,
    wrote_first: bool,
}

/// Appends JSON text to an internal `String` buffer one token at a time.
/// `reset()` clears the buffer (keeping its allocated capacity) so one
/// `Writer` can be reused across an unbounded number of messages -- the
/// pattern a market-data publisher or RPC responder runs in its hot loop.
pub struct Writer {
    buf: String,
    stack: Vec<Frame>,
    /// Set once a field name has been written and the corresponding value
    /// has not; used to reject a second field name or a top-level value
    /// sneaking in before it.
    awaiting_value: bool,
}

impl Writer {
    pub fn new() -> Self {
        Writer {
            buf: String::new(),
            stack: Vec::new(),
            awaiting_value: false,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Writer {
            buf: String::with_capacity(capacity),
            stack: Vec::new(),
            awaiting_value: false,
        }
    }

    /// Clear the buffer and structural stack, keeping the buffer's
    /// allocated capacity for the writer's next message.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.stack.clear();
        self.awaiting_value = false;
    }

    pub fn size(&self) -> usize {
        self.buf.len()
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn into_string(self) -> String {
        self.buf
    }

    fn before_value(&mut self) -> Result<(), UsageError> {
        if let Some(frame) = self.stack.last_mut() {
            if frame.kind == Container::Array {
                if frame.wrote_first {
                    self.buf.push(',');
                }
                frame.wrote_first = true;
            } else if !self.awaiting_value {
                return Err(UsageError::TypeMismatch {
                    expected: "field_name() before a value in an object",
                    found: "bare value",
                });
            }
        }
        self.awaiting_value = false;
        Ok(())
    }

    pub fn object_start(&mut self) -> Result<(), UsageError> {
        self.before_value()?;
        self.buf.push('{');
        self.stack.push(Frame {
            kind: Container::Object,
            wrote_first: false,
        });
        Ok(())
    }

    pub fn object_end(&mut self) -> Result<(), UsageError> {
        match self.stack.pop() {
            Some(Frame { kind: Container::Object, .. }) => {
                self.buf.push('}');
                Ok(())
            }
            Some(frame) => {
                self.stack.push(frame);
                Err(UsageError::TypeMismatch {
                    expected: "object_end() while inside an object",
                    found: "inside an array",
                })
            }
            None => Err(UsageError::TypeMismatch {
                expected: "object_end() with an open object",
                found: "no open container",
            }),
        }
    }

    pub fn array_start(&mut self) -> Result<(), UsageError> {
        self.before_value()?;
        self.buf.push('[');
        self.stack.push(Frame {
            kind: Container::Array,
            wrote_first: false,
        });
        Ok(())
    }

    pub fn array_end(&mut self) -> Result<(), UsageError> {
        match self.stack.pop() {
            Some(Frame { kind: Container::Array, .. }) => {
                self.buf.push(']');
                Ok(())
            }
            Some(frame) => {
                self.stack.push(frame);
                Err(UsageError::TypeMismatch {
                    expected: "array_end() while inside an array",
                    found: "inside an object",
                })
            }
            None => Err(UsageError::TypeMismatch {
                expected: "array_end() with an open array",
                found: "no open container",
            }),
        }
    }

    pub fn field_name(&mut self, name: &str) -> Result<(), UsageError> {
        let frame = self.stack.last_mut().ok_or(UsageError::TypeMismatch {
            expected: "field_name() inside an open object",
            found: "no open container",
        })?;
        if frame.kind != Container::Object {
            return Err(UsageError::TypeMismatch {
                expected: "field_name() inside an object",
                found: "inside an array",
            });
        }
        if frame.wrote_first {
            self.buf.push(',');
        }
        frame.wrote_first = true;
        self.write_quoted_escaped(name);
        self.buf.push(':');
        self.awaiting_value = true;
        Ok(())
    }

    /// As [`Writer::field_name`], but from a zero-copy [`ByteSlice`]
    /// borrowed directly from a parsed document -- lets a caller forward a
    /// field name it's re-publishing without materializing an owned
    /// `String` first.
    pub fn field_name_slice(&mut self, name: ByteSlice<'_>) -> Result<(), UsageError> {
        let name = std::str::from_utf8(name.as_bytes()).map_err(|_| UsageError::InvalidUtf8)?;
        self.field_name(name)
    }

    /// `field_name(name)` followed by writing `value`'s raw JSON text --
    /// a convenience for the common "write a scalar field" case.
    pub fn field_string(&mut self, name: &str, value: &str) -> Result<(), UsageError> {
        self.field_name(name)?;
        self.write_string(value)
    }

    pub fn field_long(&mut self, name: &str, value: i64) -> Result<(), UsageError> {
        self.field_name(name)?;
        self.write_long(value)
    }

    pub fn field_int(&mut self, name: &str, value: i32) -> Result<(), UsageError> {
        self.field_name(name)?;
        self.write_int(value)
    }

    pub fn field_double(&mut self, name: &str, value: f64) -> Result<(), UsageError> {
        self.field_name(name)?;
        self.write_double(value)
    }

    pub fn field_float(&mut self, name: &str, value: f32) -> Result<(), UsageError> {
        self.field_name(name)?;
        self.write_float(value)
    }

    pub fn field_boolean(&mut self, name: &str, value: bool) -> Result<(), UsageError> {
        self.field_name(name)?;
        self.write_boolean(value)
    }

    pub fn field_null(&mut self, name: &str) -> Result<(), UsageError> {
        self.field_name(name)?;
        self.write_null()
    }

    pub fn write_string(&mut self, value: &str) -> Result<(), UsageError> {
        self.before_value()?;
        self.write_quoted_escaped(value);
        Ok(())
    }

    fn write_quoted_escaped(&mut self, value: &str) {
        self.buf.push('"');
        for c in value.chars() {
            match c {
                '"' => self.buf.push_str("\\\""),
                '\\' => self.buf.push_str("\\\\"),
                '\u{0008}' => self.buf.push_str("\\b"),
                '\u{000C}' => self.buf.push_str("\\f"),
                '\n' => self.buf.push_str("\\n"),
                '\r' => self.buf.push_str("\\r"),
                '\t' => self.buf.push_str("\\t"),
                c if (c as u32) < 0x20 => {
                    // A control character's codepoint always fits a byte, so
                    // the two leading hex digits are always "00".
                    let byte = c as u32 as u8;
                    self.buf.push_str("\\u00");
                    self.buf.push(HEX_DIGITS[(byte >> 4) as usize] as char);
                    self.buf.push(HEX_DIGITS[(byte & 0x0F) as usize] as char);
                }
                c => self.buf.push(c),
            }
        }
        self.buf.push('"');
    }

    pub fn write_long(&mut self, value: i64) -> Result<(), UsageError> {
        self.before_value()?;
        let mut buf = [0u8; MAX_INT_LEN];
        let written = format::write_i64(value, &mut buf);
        self.buf.push_str(std::str::from_utf8(written).unwrap());
        Ok(())
    }

    pub fn write_int(&mut self, value: i32) -> Result<(), UsageError> {
        self.write_long(value as i64)
    }

    pub fn write_double(&mut self, value: f64) -> Result<(), UsageError> {
        if !value.is_finite() {
            return Err(UsageError::TypeMismatch {
                expected: "a finite double (JSON has no NaN/Infinity)",
                found: "non-finite double",
            });
        }
        self.before_value()?;
        let mut buf = [0u8; MAX_DOUBLE_LEN];
        let written = format::write_f64(value, &mut buf);
        self.buf.push_str(std::str::from_utf8(written).unwrap());
        Ok(())
    }

    pub fn write_float(&mut self, value: f32) -> Result<(), UsageError> {
        self.write_double(value as f64)
    }

    pub fn write_boolean(&mut self, value: bool) -> Result<(), UsageError> {
        self.before_value()?;
        self.buf.push_str(if value { "true" } else { "false" });
        Ok(())
    }

    pub fn write_null(&mut self) -> Result<(), UsageError> {
        self.before_value()?;
        self.buf.push_str("null");
        Ok(())
    }

    /// Append pre-formatted JSON text verbatim -- for embedding an
    /// already-serialized fragment (e.g. forwarding an untouched sub-object
    /// from a parsed [`crate::Value`]) without re-encoding it.
    pub fn write_raw(&mut self, raw: &str) -> Result<(), UsageError> {
        self.before_value()?;
        self.buf.push_str(raw);
        Ok(())
    }
}

impl Default for Writer {
    fn default() -> Self {
        Writer::new()
    }
}
