//! Lazily materialized JSON number view (§4.3, §4.4).
//!
//! Holds only the node id; every numeric interpretation is parsed from the
//! raw digit run on first access and memoized in the node's scratch cache,
//! so reading `as_long()` twice costs one digit walk, not two, and reading
//! only `as_double()` on a purely-integral field never touches the `i64`
//! path at all.

use crate::ast::NodeId;
use crate::context::Context;
use crate::error::UsageError;
use crate::number;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;

#[derive(Clone, Copy)]
pub struct NumberView<'p, 'src> {
    ctx: &'p Context<'p, 'src>,
    node: NodeId,
}

impl<'p, 'src> NumberView<'p, 'src> {
    pub(crate) fn new(ctx: &'p Context<'p, 'src>, node: NodeId) -> Self {
        ctx.views().record_number();
        NumberView { ctx, node }
    }

    fn data(&self) -> crate::ast::NodeData {
        self.ctx.ast().node(self.node)
    }

    /// Whether the digit run contains `.`, `e`, or `E` -- decided once by
    /// the tokenizer, free to query.
    pub fn is_float(&self) -> bool {
        self.data().number_is_float()
    }

    pub fn is_negative(&self) -> Result<bool, UsageError> {
        let d = self.data();
        Ok(self
            .ctx
            .cursor()
            .byte_at(d.start as usize)
            .map(|b| b == b'-')
            .unwrap_or(false))
    }

    fn digits(&self) -> Result<&'src [u8], UsageError> {
        let d = self.data();
        self.ctx
            .cursor()
            .underlying_bytes()
            .and_then(|bytes| bytes.get(d.start as usize..d.end as usize))
            .ok_or(UsageError::InvalidUtf8)
    }

    pub fn as_long(&self) -> Result<i64, UsageError> {
        self.ctx.with_cache(self.node, |c| {
            if let Some(r) = &c.long {
                return r.clone();
            }
            let r = self.digits().and_then(number::parse_long);
            c.long = Some(r.clone());
            r
        })
    }

    pub fn as_int(&self) -> Result<i32, UsageError> {
        self.ctx.with_cache(self.node, |c| {
            if let Some(r) = &c.int {
                return r.clone();
            }
            let r = self.digits().and_then(number::parse_int);
            c.int = Some(r.clone());
            r
        })
    }

    pub fn as_double(&self) -> Result<f64, UsageError> {
        self.ctx.with_cache(self.node, |c| {
            if let Some(r) = &c.double {
                return r.clone();
            }
            let r = self.digits().and_then(number::parse_double);
            c.double = Some(r.clone());
            r
        })
    }

    pub fn as_float(&self) -> Result<f32, UsageError> {
        self.ctx.with_cache(self.node, |c| {
            if let Some(r) = &c.float {
                return r.clone();
            }
            let r = self.digits().and_then(number::parse_float);
            c.float = Some(r.clone());
            r
        })
    }

    pub fn as_big_decimal(&self) -> Result<BigDecimal, UsageError> {
        self.digits().and_then(number::parse_big_decimal)
    }

    pub fn as_big_integer(&self) -> Result<BigInt, UsageError> {
        self.digits().and_then(number::parse_big_integer)
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

    fn number_node(json: &str) -> (AstStore, NodeId) {
        let mut ast = AstStore::new();
        let cursor = Cursor::Str(json);
        let config = Config::default();
        let root = tokenize(&mut ast, &cursor, &config).unwrap();
        (ast, root)
    }

    #[test]
    fn test_integer_view() {
        let (ast, root) = number_node("27000");
        let pool = Pool::new(4);
        let ctx = Context::new(Cursor::Str("27000"), &ast, &pool);
        let view = NumberView::new(&ctx, root);
        assert!(!view.is_float());
        assert_eq!(view.as_long().unwrap(), 27000);
        assert_eq!(view.as_double().unwrap(), 27000.0);
    }

    #[test]
    fn test_negative_float_view() {
        let (ast, root) = number_node("-0.125");
        let pool = Pool::new(4);
        let ctx = Context::new(Cursor::Str("-0.125"), &ast, &pool);
        let view = NumberView::new(&ctx, root);
        assert!(view.is_float());
        assert!(view.is_negative().unwrap());
        assert_eq!(view.as_double().unwrap(), -0.125);
    }

    #[test]
    fn test_memoizes_across_repeated_access() {
        let (ast, root) = number_node("42");
        let pool = Pool::new(4);
        let ctx = Context::new(Cursor::Str("42"), &ast, &pool);
        let view = NumberView::new(&ctx, root);
        assert_eq!(view.as_long().unwrap(), 42);
        assert_eq!(view.as_long().unwrap(), 42);
    }
}
