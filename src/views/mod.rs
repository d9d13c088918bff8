//! Lazily materialized views over a parsed document (§4.3).
//!
//! Every view here is a `Copy` handle: a context borrow plus (for the four
//! non-scalar kinds) a [`crate::ast::NodeId`]. None of it decodes anything
//! until a caller actually asks -- constructing a [`Value`] for a deeply
//! nested object costs nothing beyond the handle itself.

mod array;
mod number;
mod object;
mod scalar;
mod string;

pub use array::{ArrayIter, ArrayView};
pub use number::NumberView;
pub use object::{ObjectEntry, ObjectIter, ObjectView};
pub use scalar::{BooleanView, NullView};
pub use string::StringView;

use crate::ast::{NodeId, NodeKind};
use crate::context::Context;
use crate::error::UsageError;
use crate::writer::Writer;

/// A materialized reference to one JSON value within a parsed document.
/// Cheap to copy and cheap to produce -- building one never walks further
/// into the document than the single node it names.
#[derive(Clone, Copy)]
pub enum Value<'p, 'src> {
    Null(NullView),
    Boolean(BooleanView),
    Number(NumberView<'p, 'src>),
    String(StringView<'p, 'src>),
    Array(ArrayView<'p, 'src>),
    Object(ObjectView<'p, 'src>),
}

impl<'p, 'src> Value<'p, 'src> {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null(_) => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn as_object(&self) -> Result<ObjectView<'p, 'src>, UsageError> {
        match self {
            Value::Object(v) => Ok(*v),
            other => Err(UsageError::TypeMismatch {
                expected: "object",
                found: other.kind_name(),
            }),
        }
    }

    pub fn as_array(&self) -> Result<ArrayView<'p, 'src>, UsageError> {
        match self {
            Value::Array(v) => Ok(*v),
            other => Err(UsageError::TypeMismatch {
                expected: "array",
                found: other.kind_name(),
            }),
        }
    }

    pub fn as_string(&self) -> Result<StringView<'p, 'src>, UsageError> {
        match self {
            Value::String(v) => Ok(*v),
            other => Err(UsageError::TypeMismatch {
                expected: "string",
                found: other.kind_name(),
            }),
        }
    }

    pub fn as_number(&self) -> Result<NumberView<'p, 'src>, UsageError> {
        match self {
            Value::Number(v) => Ok(*v),
            other => Err(UsageError::TypeMismatch {
                expected: "number",
                found: other.kind_name(),
            }),
        }
    }

    pub fn as_boolean(&self) -> Result<bool, UsageError> {
        match self {
            Value::Boolean(v) => Ok(v.value()),
            other => Err(UsageError::TypeMismatch {
                expected: "boolean",
                found: other.kind_name(),
            }),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(_))
    }

    /// Serialize this value's full structure into JSON text, recursing into
    /// every child. Unlike the hot-path views this walks the whole subtree
    /// and allocates -- appropriate for logging, diffing, or re-publishing a
    /// transformed document, not for a field read on a critical path.
    pub fn to_string(&self) -> Result<String, UsageError> {
        let mut w = Writer::new();
        self.write_to(&mut w)?;
        Ok(w.into_string())
    }

    /// Write this value's full structure into an already-open [`Writer`],
    /// so a caller forwarding most of a parsed document untouched can still
    /// drop into `Writer` calls for the parts it rewrites.
    pub fn write_to(&self, w: &mut Writer) -> Result<(), UsageError> {
        match self {
            Value::Null(_) => w.write_null(),
            Value::Boolean(b) => w.write_boolean(b.value()),
            Value::Number(n) => {
                if n.is_float() {
                    w.write_double(n.as_double()?)
                } else {
                    w.write_long(n.as_long()?)
                }
            }
            Value::String(s) => {
                let mut decoded = String::new();
                s.append_to(&mut decoded)?;
                w.write_string(&decoded)
            }
            Value::Array(a) => {
                w.array_start()?;
                for element in a.iterate() {
                    element.write_to(w)?;
                }
                w.array_end()
            }
            Value::Object(o) => {
                w.object_start()?;
                for entry in o.iterate() {
                    let mut name = String::new();
                    entry.name.append_to(&mut name)?;
                    w.field_name(&name)?;
                    entry.value.write_to(w)?;
                }
                w.object_end()
            }
        }
    }

    /// Structural equality: same kind, same content, recursively. Numbers
    /// compare by numeric value (`27000.50` equals `27000.5`); object field
    /// order does not matter, array element order does.
    pub fn equals(&self, other: &Value<'_, '_>) -> Result<bool, UsageError> {
        match (self, other) {
            (Value::Null(_), Value::Null(_)) => Ok(true),
            (Value::Boolean(a), Value::Boolean(b)) => Ok(a.value() == b.value()),
            (Value::Number(a), Value::Number(b)) => Ok(a.as_double()? == b.as_double()?),
            (Value::String(a), Value::String(b)) => {
                Ok(a.to_string_decoded()? == b.to_string_decoded()?)
            }
            (Value::Array(a), Value::Array(b)) => {
                if a.size() != b.size() {
                    return Ok(false);
                }
                for i in 0..a.size() {
                    if !a.get(i)?.equals(&b.get(i)?)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (Value::Object(a), Value::Object(b)) => {
                if a.size() != b.size() {
                    return Ok(false);
                }
                for entry in a.iterate() {
                    let mut name = String::new();
                    entry.name.append_to(&mut name)?;
                    match b.get(&name)? {
                        Some(other_value) => {
                            if !entry.value.equals(&other_value)? {
                                return Ok(false);
                            }
                        }
                        None => return Ok(false),
                    }
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Build the cheap `Value` handle for `node`, without recursing into its
/// children.
pub(crate) fn node_to_value<'p, 'src>(ctx: &'p Context<'p, 'src>, node: NodeId) -> Value<'p, 'src> {
    match ctx.ast().node(node).kind {
        NodeKind::Object => Value::Object(ObjectView::new(ctx, node)),
        NodeKind::Array => Value::Array(ArrayView::new(ctx, node)),
        NodeKind::String => Value::String(StringView::new(ctx, node)),
        NodeKind::Number => Value::Number(NumberView::new(ctx, node)),
        NodeKind::True => Value::Boolean(BooleanView(true)),
        NodeKind::False => Value::Boolean(BooleanView(false)),
        NodeKind::Null => Value::Null(NullView),
        NodeKind::Field => unreachable!("a Field node is never itself a value"),
    }
}
