//! Incremental array consumption for RPC/feed hot paths that only ever walk
//! an array forward once (§4.8). Built directly over the sibling chain, so
//! it never touches the element-index cache [`crate::views::ArrayView`]
//! builds for random access -- a pure streaming consumer pays nothing for
//! indexing it will never do.

use crate::ast::{NodeId, NodeKind, NONE};
use crate::context::Context;
use crate::error::UsageError;
use crate::views::{NumberView, StringView, Value};

/// A forward-only cursor over a top-level JSON array. Unlike
/// [`crate::views::ArrayIter`] this exposes `peek`/`skip`/`reset` and typed
/// `next_*` accessors for the common case of an array whose element kind is
/// already known (a feed of identically-shaped ticks, say).
pub struct ArrayCursor<'p, 'src> {
    ctx: &'p Context<'p, 'src>,
    first: NodeId,
    next: NodeId,
    /// Populated lazily on first `len_hint()` call; a streaming consumer
    /// that never asks for it never pays for the walk.
    remaining_hint: Option<usize>,
}

impl<'p, 'src> ArrayCursor<'p, 'src> {
    pub(crate) fn new(ctx: &'p Context<'p, 'src>, array_node: NodeId) -> Self {
        let first = ctx.ast().node(array_node).first_child;
        ArrayCursor {
            ctx,
            first,
            next: first,
            remaining_hint: None,
        }
    }

    pub fn has_next(&self) -> bool {
        self.next != NONE
    }

    /// The next element without consuming it.
    pub fn peek(&self) -> Option<Value<'p, 'src>> {
        if self.next == NONE {
            return None;
        }
        Some(crate::views::node_to_value(self.ctx, self.next))
    }

    pub fn next(&mut self) -> Option<Value<'p, 'src>> {
        if self.next == NONE {
            return None;
        }
        let current = self.next;
        self.next = self.ctx.ast().node(current).next_sibling;
        if let Some(hint) = &mut self.remaining_hint {
            *hint = hint.saturating_sub(1);
        }
        Some(crate::views::node_to_value(self.ctx, current))
    }

    /// Advance past `n` elements without materializing views for them.
    pub fn skip(&mut self, n: usize) {
        for _ in 0..n {
            if self.next == NONE {
                break;
            }
            self.next = self.ctx.ast().node(self.next).next_sibling;
            if let Some(hint) = &mut self.remaining_hint {
                *hint = hint.saturating_sub(1);
            }
        }
    }

    /// Rewind to the array's first element.
    pub fn reset(&mut self) {
        self.next = self.first;
        self.remaining_hint = None;
    }

    /// A best-effort remaining-element count, computed by walking the
    /// sibling chain once and memoized for the cursor's lifetime. Intended
    /// for pre-sizing an output buffer, not for exactness guarantees after
    /// further `next()`/`skip()` calls beyond the cheap decrement above.
    pub fn len_hint(&mut self) -> usize {
        if let Some(hint) = self.remaining_hint {
            return hint;
        }
        let mut count = 0;
        let mut cursor = self.next;
        while cursor != NONE {
            count += 1;
            cursor = self.ctx.ast().node(cursor).next_sibling;
        }
        self.remaining_hint = Some(count);
        count
    }

    pub fn next_string(&mut self) -> Result<StringView<'p, 'src>, UsageError> {
        self.next_typed(NodeKind::String, |v| v.as_string())
    }

    pub fn next_number(&mut self) -> Result<NumberView<'p, 'src>, UsageError> {
        self.next_typed(NodeKind::Number, |v| v.as_number())
    }

    fn next_typed<T>(
        &mut self,
        _expected: NodeKind,
        project: impl FnOnce(&Value<'p, 'src>) -> Result<T, UsageError>,
    ) -> Result<T, UsageError> {
        let value = self.next().ok_or(UsageError::IndexOutOfBounds {
            index: 0,
            length: 0,
        })?;
        project(&value)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ast::AstStore;
    use crate::config::Config;
    use crate::cursor::Cursor;
    use crate::pool::Pool;
    use crate::tokenizer::tokenize;

    fn cursor_over(json: &'static str) -> (AstStore, NodeId) {
        let mut ast = AstStore::new();
        let cursor = Cursor::Str(json);
        let config = Config::default();
        let root = tokenize(&mut ast, &cursor, &config).unwrap();
        (ast, root)
    }

    #[test]
    fn test_forward_consumption() {
        let json = "[1,2,3]";
        let (ast, root) = cursor_over(json);
        let pool = Pool::new(4);
        let ctx = Context::new(Cursor::Str(json), &ast, &pool);
        let mut cur = ArrayCursor::new(&ctx, root);

        assert!(cur.has_next());
        assert_eq!(cur.next_number().unwrap().as_long().unwrap(), 1);
        assert_eq!(cur.next_number().unwrap().as_long().unwrap(), 2);
        assert_eq!(cur.next_number().unwrap().as_long().unwrap(), 3);
        assert!(!cur.has_next());
        assert!(cur.next().is_none());
    }

    #[test]
    fn test_peek_does_not_consume() {
        let json = "[10,20]";
        let (ast, root) = cursor_over(json);
        let pool = Pool::new(4);
        let ctx = Context::new(Cursor::Str(json), &ast, &pool);
        let mut cur = ArrayCursor::new(&ctx, root);

        let peeked = cur.peek().unwrap().as_number().unwrap().as_long().unwrap();
        assert_eq!(peeked, 10);
        let next = cur.next().unwrap().as_number().unwrap().as_long().unwrap();
        assert_eq!(next, 10);
    }

    #[test]
    fn test_skip_and_reset() {
        let json = "[1,2,3,4]";
        let (ast, root) = cursor_over(json);
        let pool = Pool::new(4);
        let ctx = Context::new(Cursor::Str(json), &ast, &pool);
        let mut cur = ArrayCursor::new(&ctx, root);

        cur.skip(2);
        assert_eq!(cur.next().unwrap().as_number().unwrap().as_long().unwrap(), 3);
        cur.reset();
        assert_eq!(cur.next().unwrap().as_number().unwrap().as_long().unwrap(), 1);
    }

    #[test]
    fn test_len_hint() {
        let json = "[1,2,3]";
        let (ast, root) = cursor_over(json);
        let pool = Pool::new(4);
        let ctx = Context::new(Cursor::Str(json), &ast, &pool);
        let mut cur = ArrayCursor::new(&ctx, root);
        assert_eq!(cur.len_hint(), 3);
        cur.next();
        assert_eq!(cur.len_hint(), 2);
    }
}
