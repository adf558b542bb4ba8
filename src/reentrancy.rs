//! Debug-only reentrancy guard for table entry points.
//!
//! Each table embeds one `DebugReentrancy` and opens it at the top of every
//! public method with `let _g = self.reentrancy.enter("put");`. A nested
//! entry while a guard is live means table code was re-entered mid-update
//! (for example a rebuild routed back through the public `put`). In debug
//! builds that panics and names both operations; in release builds the guard
//! is a zero-sized no-op.

#[cfg(debug_assertions)]
use core::cell::Cell;
use core::marker::PhantomData;

#[derive(Debug)]
pub struct DebugReentrancy {
    #[cfg(debug_assertions)]
    active: Cell<Option<&'static str>>,
    // Single-threaded only.
    _nosend: PhantomData<*mut ()>,
}

impl DebugReentrancy {
    pub const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(None),
            _nosend: PhantomData,
        }
    }

    /// Mark `op` as in progress until the returned guard drops.
    #[inline]
    pub fn enter(&self, op: &'static str) -> OpGuard<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(outer) = self.active.get() {
                panic!("reentrant call to `{op}` while `{outer}` is in progress");
            }
            self.active.set(Some(op));
            OpGuard { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = op;
            OpGuard { _z: PhantomData }
        }
    }

    /// Name of the operation currently holding the guard, if any.
    #[cfg(all(test, debug_assertions))]
    pub fn current(&self) -> Option<&'static str> {
        self.active.get()
    }
}

impl Default for DebugReentrancy {
    fn default() -> Self {
        Self::new()
    }
}

pub struct OpGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl Drop for OpGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            debug_assert!(self.owner.active.get().is_some());
            self.owner.active.set(None);
        }
    }
}
