//! Fixed-capacity object pools with auto-grow overflow (§4.6).
//!
//! `acquire()` hands back a reset `T` -- either recycled from the free list
//! or freshly built -- and `release()` returns a prior-acquired `T` to the
//! free list. Exhausting the nominal capacity never blocks; it just builds
//! another instance and counts the overflow for observability.
//!
//! In this Rust port the things worth pooling are the heap-backed scratch
//! `Vec`s that object/array views build lazily (§4.7): a field-index cache,
//! an element-index cache, and a field-name-hash cache. A parsed view
//! *handle* itself is a `Copy` struct with no allocation, so it has nothing
//! to recycle -- see [`crate::context::ViewCounter`] for how this crate
//! still honors the uniform "pool" contract (and its testable invariant in
//! §8) for those allocation-free kinds.

use std::cell::RefCell;
use tracing::trace;

pub(crate) struct Pool<T> {
    free: RefCell<Vec<T>>,
    nominal_capacity: usize,
    borrowed: std::cell::Cell<usize>,
    grown: std::cell::Cell<usize>,
}

impl<T: Default> Pool<T> {
    pub fn new(nominal_capacity: usize) -> Self {
        Pool {
            free: RefCell::new(Vec::with_capacity(nominal_capacity)),
            nominal_capacity,
            borrowed: std::cell::Cell::new(0),
            grown: std::cell::Cell::new(0),
        }
    }

    /// Acquire a reset `T`, recycled from the free list when possible.
    pub fn acquire(&self) -> T {
        self.borrowed.set(self.borrowed.get() + 1);
        match self.free.borrow_mut().pop() {
            Some(item) => item,
            None => {
                let grown = self.grown.get() + 1;
                self.grown.set(grown);
                if self.borrowed.get() > self.nominal_capacity {
                    trace!(
                        nominal_capacity = self.nominal_capacity,
                        grown, "pool exceeded nominal capacity; allocating"
                    );
                }
                T::default()
            }
        }
    }

    /// Return a prior-acquired `T` to the free list.
    pub fn release(&self, item: T) {
        debug_assert!(self.borrowed.get() > 0, "pool release without a matching acquire");
        self.borrowed.set(self.borrowed.get().saturating_sub(1));
        self.free.borrow_mut().push(item);
    }

    /// Number of instances currently held by callers (not yet released).
    pub fn borrowed(&self) -> usize {
        self.borrowed.get()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_acquire_release_round_trip() {
        let pool: Pool<Vec<u32>> = Pool::new(2);
        assert_eq!(pool.borrowed(), 0);

        let mut a = pool.acquire();
        a.push(1);
        assert_eq!(pool.borrowed(), 1);

        pool.release(a);
        assert_eq!(pool.borrowed(), 0);

        // Recycled instance retains its capacity but must be cleared by
        // the caller before reuse -- the pool does not clear on release.
        let b = pool.acquire();
        assert!(b.capacity() >= 1);
        pool.release(b);
    }

    #[test]
    fn test_grows_past_nominal_capacity_without_blocking() {
        let pool: Pool<Vec<u32>> = Pool::new(1);
        let a = pool.acquire();
        let b = pool.acquire(); // exceeds nominal capacity of 1, still succeeds
        assert_eq!(pool.borrowed(), 2);
        pool.release(a);
        pool.release(b);
        assert_eq!(pool.borrowed(), 0);
    }
}
