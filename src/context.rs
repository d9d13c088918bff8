//! Per-parse context (§4.7): the home for everything a parse borrows for
//! its lifetime -- the cursor, and the lazily built per-node index/hash
//! caches that back random access into objects and arrays.
//!
//! In the reference design a context tracks every view and slice it has
//! handed out so it can release them in bulk on `close()`. In this crate
//! views are `Copy` structs with nothing to release; what genuinely needs
//! releasing is the scratch [`NodeCache`] a lazily-indexed object or array
//! acquires from `crate::pool::Pool` on first random access. [`ViewCounter`]
//! exists purely to keep the testable "acquire count == release count after
//! close" invariant (§8) true for the allocation-free kinds too, so a test
//! written against that invariant doesn't need to know which kinds actually
//! allocate underneath.

use crate::ast::{AstStore, NodeId};
use crate::cursor::Cursor;
use crate::error::UsageError;
use crate::pool::Pool;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use tinyvec::TinyVec;
use tracing::trace;

/// Lazily built, memoized per-node scratch state (§4.7). A single shape
/// covers every kind that needs one: arrays only ever populate `index`;
/// objects populate `index` (field order) and `by_hash` (field-name hash
/// lookup, with external collision handling against the name bytes since
/// hashes are not guaranteed collision-free); strings and numbers only ever
/// populate the `long`/`double`/`int`/`float` memoization slots. One pool
/// type serves all of them rather than one pool per view kind, since at
/// most one of these shapes is ever in use for a given node.
#[derive(Default)]
pub(crate) struct NodeCache {
    pub index: Vec<NodeId>,
    pub by_hash: HashMap<u64, TinyVec<[NodeId; 4]>>,
    pub built: bool,
    pub long: Option<Result<i64, UsageError>>,
    pub double: Option<Result<f64, UsageError>>,
    pub int: Option<Result<i32, UsageError>>,
    pub float: Option<Result<f32, UsageError>>,
}

impl NodeCache {
    fn clear(&mut self) {
        self.index.clear();
        self.by_hash.clear();
        self.built = false;
        self.long = None;
        self.double = None;
        self.int = None;
        self.float = None;
    }
}

/// Counts views/slices produced during a parse, purely for the §8
/// "everything acquired is eventually released" invariant. Allocation-free
/// kinds (object/array/string/number views, byte slices) have nothing to
/// actually recycle, so this is bookkeeping only: every `record_*` call is
/// matched by `close()` zeroing the counters in bulk, the Rust analogue of
/// releasing every outstanding view when a context closes.
#[derive(Default)]
pub(crate) struct ViewCounter {
    object: Cell<usize>,
    array: Cell<usize>,
    string: Cell<usize>,
    number: Cell<usize>,
    slice: Cell<usize>,
}

impl ViewCounter {
    pub fn record_object(&self) {
        self.object.set(self.object.get() + 1);
    }
    pub fn record_array(&self) {
        self.array.set(self.array.get() + 1);
    }
    pub fn record_string(&self) {
        self.string.set(self.string.get() + 1);
    }
    pub fn record_number(&self) {
        self.number.set(self.number.get() + 1);
    }
    pub fn record_slice(&self) {
        self.slice.set(self.slice.get() + 1);
    }

    /// Total views/slices produced since the last `close()`.
    pub fn outstanding(&self) -> usize {
        self.object.get() + self.array.get() + self.string.get() + self.number.get() + self.slice.get()
    }

    fn close(&self) {
        self.object.set(0);
        self.array.set(0);
        self.string.set(0);
        self.number.set(0);
        self.slice.set(0);
    }
}

/// Everything a single parse borrows for its duration. Created by
/// [`crate::Parser::parse`], dropped (or explicitly [`Context::close`]d)
/// once the caller is done with the resulting [`crate::Value`] tree.
///
/// Holds an ordinary shared borrow of the environment's [`AstStore`] and
/// [`NodeCache`] pool rather than a raw pointer: nested views borrow
/// `&'ctx Context` directly, and `Context` never owns a `View` itself --
/// only bookkeeping records -- so there is no reference cycle to break with
/// `unsafe`, unlike the back-reference the reference design flags for GC
/// hosts (see `DESIGN.md`).
pub struct Context<'p, 'src> {
    cursor: Cursor<'src>,
    ast: &'p AstStore,
    pool: &'p Pool<NodeCache>,
    caches: RefCell<HashMap<NodeId, NodeCache>>,
    tracking: RefCell<TinyVec<[NodeId; 16]>>,
    views: ViewCounter,
    closed: Cell<bool>,
}

impl<'p, 'src> Context<'p, 'src> {
    pub(crate) fn new(cursor: Cursor<'src>, ast: &'p AstStore, pool: &'p Pool<NodeCache>) -> Self {
        Context {
            cursor,
            ast,
            pool,
            caches: RefCell::new(HashMap::new()),
            tracking: RefCell::new(TinyVec::new()),
            views: ViewCounter::default(),
            closed: Cell::new(false),
        }
    }

    #[inline]
    pub(crate) fn cursor(&self) -> &Cursor<'src> {
        &self.cursor
    }

    #[inline]
    pub(crate) fn ast(&self) -> &AstStore {
        self.ast
    }

    #[inline]
    pub(crate) fn views(&self) -> &ViewCounter {
        &self.views
    }

    /// Run `f` against the lazily built cache for `node`, acquiring one
    /// from the pool and tracking it on first touch.
    pub(crate) fn with_cache<R>(&self, node: NodeId, f: impl FnOnce(&mut NodeCache) -> R) -> R {
        let mut caches = self.caches.borrow_mut();
        let entry = caches.entry(node).or_insert_with(|| {
            self.tracking.borrow_mut().push(node);
            self.pool.acquire()
        });
        f(entry)
    }

    /// Release every scratch cache back to the pool and zero the view
    /// counters. Idempotent -- closing an already-closed context is a
    /// no-op, matching the reference semantics for repeated `close()`.
    pub fn close(&self) {
        if self.closed.replace(true) {
            return;
        }
        let tracked = self.tracking.borrow_mut().len();
        let mut caches = self.caches.borrow_mut();
        for node in self.tracking.borrow_mut().drain(..) {
            if let Some(mut cache) = caches.remove(&node) {
                cache.clear();
                self.pool.release(cache);
            }
        }
        trace!(tracked, outstanding = self.views.outstanding(), "context closed");
        self.views.close();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }
}

impl<'p, 'src> Drop for Context<'p, 'src> {
    fn drop(&mut self) {
        self.close();
    }
}
