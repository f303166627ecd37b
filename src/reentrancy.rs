//! Debug-only guard against re-entering a probe table.
//!
//! Probing calls user code (`K: Hash`, `K: Eq`, `V: PartialEq`) while the
//! slot array may be mid-update. A key whose `Eq` reaches back into the same
//! table through a raw pointer would observe that state. In debug builds the
//! nested entry panics and names both operations; release builds compile the
//! check away.

use core::cell::Cell;
use core::marker::PhantomData;

/// Per-table tracker. Probe entry points start with
/// `let _g = self.reentrancy.enter("op");`.
#[derive(Debug)]
pub(crate) struct ProbeReentrancy {
    #[cfg(debug_assertions)]
    active: Cell<Option<&'static str>>,
    // Same auto traits in debug and release: Send, not Sync.
    _unsync: PhantomData<Cell<()>>,
}

impl ProbeReentrancy {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(None),
            _unsync: PhantomData,
        }
    }

    /// Mark the start of `op`. Panics in debug builds if another operation
    /// on the same table has not finished yet.
    #[inline]
    pub(crate) fn enter(&self, op: &'static str) -> ProbeSection<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(outer) = self.active.get() {
                panic!("probe table re-entered: `{op}` started while `{outer}` was in progress");
            }
            self.active.set(Some(op));
            return ProbeSection { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = op;
            return ProbeSection { _z: PhantomData };
        }
    }
}

impl Clone for ProbeReentrancy {
    // A cloned table starts outside any operation.
    fn clone(&self) -> Self {
        Self::new()
    }
}

/// RAII marker for an in-flight probe operation.
pub(crate) struct ProbeSection<'a> {
    #[cfg(debug_assertions)]
    owner: &'a ProbeReentrancy,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl Drop for ProbeSection<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            debug_assert!(self.owner.active.get().is_some());
            self.owner.active.set(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ProbeReentrancy;

    #[test]
    fn sequential_sections_are_ok() {
        let r = ProbeReentrancy::new();
        {
            let _g = r.enter("find");
        }
        let _g = r.enter("insert");
    }

    #[cfg(debug_assertions)]
    #[test]
    fn nested_section_panics_with_both_names() {
        let r = ProbeReentrancy::new();
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _outer = r.enter("insert");
            let _inner = r.enter("find");
        }));
        let err = res.expect_err("expected nested entry to panic in debug builds");
        let msg = err
            .downcast_ref::<String>()
            .cloned()
            .unwrap_or_default();
        assert!(msg.contains("`find`"), "message was {msg:?}");
        assert!(msg.contains("`insert`"), "message was {msg:?}");
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn nested_section_is_noop_in_release() {
        let r = ProbeReentrancy::new();
        let _g1 = r.enter("insert");
        let _g2 = r.enter("find");
    }

    #[test]
    fn clone_starts_idle() {
        let r = ProbeReentrancy::new();
        let _g = r.enter("grow");
        let c = r.clone();
        let _g2 = c.enter("find");
    }
}
