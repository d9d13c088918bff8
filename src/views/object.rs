//! Lazily materialized JSON object view (§4.3).
//!
//! `get`/`has` hash the queried name with [`crate::hash::polynomial_hash`]
//! and probe the node's memoized hash index, built on first lookup by
//! walking the field sibling chain once (§4.7); `iterate` walks the chain
//! directly and never touches the index, matching [`super::ArrayView`].

use crate::ast::{NodeId, NONE};
use crate::context::Context;
use crate::error::UsageError;
use crate::hash::polynomial_hash;
use crate::slice::ByteSlice;
use crate::views::string::decode_escaped;
use super::{node_to_value, Value};

#[derive(Clone, Copy)]
pub struct ObjectView<'p, 'src> {
    ctx: &'p Context<'p, 'src>,
    node: NodeId,
}

impl<'p, 'src> ObjectView<'p, 'src> {
    pub(crate) fn new(ctx: &'p Context<'p, 'src>, node: NodeId) -> Self {
        ctx.views().record_object();
        ObjectView { ctx, node }
    }

    fn ensure_indexed(&self) {
        self.ctx.with_cache(self.node, |cache| {
            if cache.built {
                return;
            }
            let mut field = self.ctx.ast().node(self.node).first_child;
            while field != NONE {
                let field_data = self.ctx.ast().node(field);
                let name = self.ctx.ast().node(field_data.first_child);
                cache.index.push(field);
                cache.by_hash.entry(name.hash).or_default().push(field);
                field = field_data.next_sibling;
            }
            cache.built = true;
        });
    }

    pub fn size(&self) -> usize {
        self.ensure_indexed();
        self.ctx.with_cache(self.node, |c| c.index.len())
    }

    pub fn is_empty(&self) -> bool {
        self.ctx.ast().node(self.node).first_child == NONE
    }

    pub fn get(&self, name: &str) -> Result<Option<Value<'p, 'src>>, UsageError> {
        self.lookup(name.as_bytes())
    }

    pub fn get_slice(&self, name: ByteSlice<'_>) -> Result<Option<Value<'p, 'src>>, UsageError> {
        self.lookup(name.as_bytes())
    }

    pub fn has(&self, name: &str) -> Result<bool, UsageError> {
        Ok(self.get(name)?.is_some())
    }

    fn lookup(&self, name: &[u8]) -> Result<Option<Value<'p, 'src>>, UsageError> {
        self.ensure_indexed();
        let hash = polynomial_hash(name);
        let candidates = self
            .ctx
            .with_cache(self.node, |c| c.by_hash.get(&hash).cloned());
        let Some(candidates) = candidates else {
            return Ok(None);
        };
        for field in candidates {
            let field_data = self.ctx.ast().node(field);
            let name_node = self.ctx.ast().node(field_data.first_child);
            if self.field_name_matches(name_node, name)? {
                let value = name_node.next_sibling;
                return Ok(Some(node_to_value(self.ctx, value)));
            }
        }
        Ok(None)
    }

    fn field_name_matches(
        &self,
        name_node: crate::ast::NodeData,
        query: &[u8],
    ) -> Result<bool, UsageError> {
        if !name_node.string_escaped() {
            let raw = self
                .ctx
                .cursor()
                .underlying_bytes()
                .and_then(|b| b.get(name_node.start as usize..name_node.end as usize))
                .ok_or(UsageError::InvalidUtf8)?;
            return Ok(raw == query);
        }
        let decoded = decode_escaped(self.ctx.cursor(), name_node.start, name_node.end)?;
        Ok(decoded.as_bytes() == query)
    }

    pub fn iterate(&self) -> ObjectIter<'p, 'src> {
        ObjectIter {
            ctx: self.ctx,
            next: self.ctx.ast().node(self.node).first_child,
        }
    }

    /// Serialize this object's full structure (every field, recursively)
    /// into JSON text.
    pub fn to_string(&self) -> Result<String, UsageError> {
        Value::Object(*self).to_string()
    }

    /// Structural equality: same fields (regardless of order), same values.
    pub fn equals(&self, other: &ObjectView<'_, '_>) -> Result<bool, UsageError> {
        Value::Object(*self).equals(&Value::Object(*other))
    }
}

/// A single `(name, value)` pair yielded by [`ObjectIter`]. The name is
/// handed back as a raw [`StringView`](crate::views::StringView) rather
/// than a decoded `&str`, since most field names on a hot path never
/// contain escapes and the caller may not need the name materialized at
/// all (e.g. while searching for one specific key).
pub struct ObjectEntry<'p, 'src> {
    pub name: crate::views::StringView<'p, 'src>,
    pub value: Value<'p, 'src>,
}

pub struct ObjectIter<'p, 'src> {
    ctx: &'p Context<'p, 'src>,
    next: NodeId,
}

impl<'p, 'src> Iterator for ObjectIter<'p, 'src> {
    type Item = ObjectEntry<'p, 'src>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == NONE {
            return None;
        }
        let field = self.ctx.ast().node(self.next);
        self.next = field.next_sibling;
        let name_node = field.first_child;
        let value_node = self.ctx.ast().node(name_node).next_sibling;
        Some(ObjectEntry {
            name: crate::views::StringView::new(self.ctx, name_node),
            value: node_to_value(self.ctx, value_node),
        })
    }
}
