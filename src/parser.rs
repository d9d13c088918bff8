//! The top-level facade: [`Parser`] is the reusable "environment" (§4.1,
//! §4.6) that owns the AST store and scratch-cache pool a sequence of
//! parses on the same thread share, and [`Document`] is the handle to one
//! parsed tree.
//!
//! `parse()` takes `&mut self` rather than `&self`: tokenizing resets and
//! repopulates the owned [`AstStore`] in place, so only one [`Document`] can
//! be outstanding per `Parser` at a time -- the borrow checker enforces the
//! same "one active parse per environment, reused serially" contract the
//! reference design documents informally. Nothing here is ever shared
//! across threads: every field is either owned outright or reached through
//! `RefCell`/`Cell`, so `Parser` is `!Sync` by construction rather than by
//! convention, and a caller cannot accidentally hand the same environment
//! to two worker threads and have it compile.

use crate::ast::{AstStore, NodeId};
use crate::config::Config;
use crate::context::{Context, NodeCache};
use crate::cursor::Cursor;
use crate::error::{ParseError, UsageError};
use crate::pool::Pool;
use crate::stream::ArrayCursor;
use crate::tokenizer;
use crate::views::{node_to_value, Value};

/// A reusable parsing environment for one thread. Construct one per worker
/// and call [`Parser::parse`] (or a `parse_*` variant) once per message;
/// the underlying [`AstStore`] and scratch-cache pool are retained and
/// reused across calls rather than reallocated per parse.
pub struct Parser {
    config: Config,
    ast: AstStore,
    pool: Pool<NodeCache>,
}

impl Parser {
    pub fn new(config: Config) -> Self {
        Parser {
            config,
            ast: AstStore::new(),
            pool: Pool::new(16),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parse a borrowed byte slice.
    pub fn parse<'p, 'src>(&'p mut self, input: &'src [u8]) -> Result<Document<'p, 'src>, ParseError> {
        self.parse_cursor(Cursor::Slice(input))
    }

    /// Parse a borrowed UTF-8 string, skipping the would-be UTF-8
    /// validation a byte-slice parse performs implicitly through its
    /// string-view accessors.
    pub fn parse_str<'p, 'src>(&'p mut self, input: &'src str) -> Result<Document<'p, 'src>, ParseError> {
        self.parse_cursor(Cursor::Str(input))
    }

    /// Parse an externally owned, reference-counted byte container.
    pub fn parse_bytes<'p, 'src>(
        &'p mut self,
        input: &'src bytes::Bytes,
    ) -> Result<Document<'p, 'src>, ParseError> {
        self.parse_cursor(Cursor::Bytes(input))
    }

    fn parse_cursor<'p, 'src>(&'p mut self, cursor: Cursor<'src>) -> Result<Document<'p, 'src>, ParseError> {
        let root = tokenizer::tokenize(&mut self.ast, &cursor, &self.config)?;
        let ctx = Context::new(cursor, &self.ast, &self.pool);
        Ok(Document { ctx, root })
    }
}

/// One parsed document: a [`Context`] borrowed from the [`Parser`] that
/// produced it, plus the root node. Dropping (or explicitly
/// [`Document::close`]ing) it releases every scratch cache it built back to
/// the environment's pool.
pub struct Document<'p, 'src> {
    ctx: Context<'p, 'src>,
    root: NodeId,
}

impl<'p, 'src> Document<'p, 'src> {
    /// The root value. Building it is free -- it does not walk into the
    /// root's children, it only classifies the root node's kind.
    pub fn value(&'p self) -> Value<'p, 'src> {
        node_to_value(&self.ctx, self.root)
    }

    /// A forward-only cursor over the root array, for the streaming
    /// RPC/feed case where the whole message is one top-level array.
    pub fn stream_array(&'p self) -> Result<ArrayCursor<'p, 'src>, UsageError> {
        match self.value() {
            Value::Array(_) => Ok(ArrayCursor::new(&self.ctx, self.root)),
            other => Err(UsageError::TypeMismatch {
                expected: "array",
                found: other.kind_name(),
            }),
        }
    }

    /// Release every scratch cache this document's views built back to the
    /// environment's pool, ahead of this `Document`'s `Drop`. Idempotent.
    pub fn close(&self) {
        self.ctx.close();
    }
}
