//! Lazily materialized JSON array view (§4.3).
//!
//! `size`/`get`/`iterate` all walk the AST's sibling chain through a
//! per-node element index built once, on first random access, and memoized
//! in the node's scratch cache (§4.7) -- purely sequential consumption via
//! `iterate()` never needs the index at all.

use crate::ast::{NodeId, NONE};
use crate::context::Context;
use crate::error::UsageError;
use super::{node_to_value, Value};

#[derive(Clone, Copy)]
pub struct ArrayView<'p, 'src> {
    ctx: &'p Context<'p, 'src>,
    node: NodeId,
}

impl<'p, 'src> ArrayView<'p, 'src> {
    pub(crate) fn new(ctx: &'p Context<'p, 'src>, node: NodeId) -> Self {
        ctx.views().record_array();
        ArrayView { ctx, node }
    }

    fn ensure_indexed(&self) {
        self.ctx.with_cache(self.node, |cache| {
            if cache.built {
                return;
            }
            let mut child = self.ctx.ast().node(self.node).first_child;
            while child != NONE {
                cache.index.push(child);
                child = self.ctx.ast().node(child).next_sibling;
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

    pub fn get(&self, index: usize) -> Result<Value<'p, 'src>, UsageError> {
        self.ensure_indexed();
        let element = self.ctx.with_cache(self.node, |c| c.index.get(index).copied());
        let element = element.ok_or(UsageError::IndexOutOfBounds {
            index,
            length: self.size(),
        })?;
        Ok(node_to_value(self.ctx, element))
    }

    pub fn iterate(&self) -> ArrayIter<'p, 'src> {
        ArrayIter {
            ctx: self.ctx,
            next: self.ctx.ast().node(self.node).first_child,
        }
    }

    /// Serialize this array's full structure (every element, recursively)
    /// into JSON text.
    pub fn to_string(&self) -> Result<String, UsageError> {
        Value::Array(*self).to_string()
    }

    /// Structural equality: same length, same elements in the same order.
    pub fn equals(&self, other: &ArrayView<'_, '_>) -> Result<bool, UsageError> {
        Value::Array(*self).equals(&Value::Array(*other))
    }
}

/// Sequential, index-free iteration -- the cheap path for consuming an
/// array once, without materializing its element index.
pub struct ArrayIter<'p, 'src> {
    ctx: &'p Context<'p, 'src>,
    next: NodeId,
}

impl<'p, 'src> Iterator for ArrayIter<'p, 'src> {
    type Item = Value<'p, 'src>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == NONE {
            return None;
        }
        let current = self.next;
        self.next = self.ctx.ast().node(current).next_sibling;
        Some(node_to_value(self.ctx, current))
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
    use crate::views::Value;

    fn array_node(json: &str) -> (AstStore, NodeId) {
        let mut ast = AstStore::new();
        let cursor = Cursor::Str(json);
        let config = Config::default();
        let root = tokenize(&mut ast, &cursor, &config).unwrap();
        (ast, root)
    }

    #[test]
    fn test_size_and_get() {
        let json = "[10,20,30]";
        let (ast, root) = array_node(json);
        let pool = Pool::new(4);
        let ctx = Context::new(Cursor::Str(json), &ast, &pool);
        let view = ArrayView::new(&ctx, root);
        assert_eq!(view.size(), 3);
        match view.get(1).unwrap() {
            Value::Number(n) => assert_eq!(n.as_long().unwrap(), 20),
            _ => panic!("expected number"),
        }
        assert!(view.get(5).is_err());
    }

    #[test]
    fn test_iterate_without_index() {
        let json = "[1,2,3]";
        let (ast, root) = array_node(json);
        let pool = Pool::new(4);
        let ctx = Context::new(Cursor::Str(json), &ast, &pool);
        let view = ArrayView::new(&ctx, root);
        let sum: i64 = view
            .iterate()
            .map(|v| match v {
                Value::Number(n) => n.as_long().unwrap(),
                _ => 0,
            })
            .sum();
        assert_eq!(sum, 6);
        // iterate() never touched the index cache.
        assert_eq!(pool.borrowed(), 0);
    }

    #[test]
    fn test_empty_array() {
        let (ast, root) = array_node("[]");
        let pool = Pool::new(4);
        let ctx = Context::new(Cursor::Str("[]"), &ast, &pool);
        let view = ArrayView::new(&ctx, root);
        assert!(view.is_empty());
        assert_eq!(view.size(), 0);
    }

    #[test]
    fn test_to_string_round_trips() {
        let json = "[10,20,30]";
        let (ast, root) = array_node(json);
        let pool = Pool::new(4);
        let ctx = Context::new(Cursor::Str(json), &ast, &pool);
        let view = ArrayView::new(&ctx, root);
        assert_eq!(view.to_string().unwrap(), json);
    }

    #[test]
    fn test_equals_respects_element_order() {
        let (ast_a, root_a) = array_node("[1,2,3]");
        let pool_a = Pool::new(4);
        let ctx_a = Context::new(Cursor::Str("[1,2,3]"), &ast_a, &pool_a);
        let a = ArrayView::new(&ctx_a, root_a);

        let (ast_b, root_b) = array_node("[3,2,1]");
        let pool_b = Pool::new(4);
        let ctx_b = Context::new(Cursor::Str("[3,2,1]"), &ast_b, &pool_b);
        let b = ArrayView::new(&ctx_b, root_b);

        assert!(!a.equals(&b).unwrap());
    }
}
