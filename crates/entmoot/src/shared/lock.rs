//! Owner-keyed recursive lock state machine
//!
//! A backend is either `Unlocked` or `Locked(owner, depth)`. The owner may
//! re-enter without blocking; anyone else blocks on the raw mutex. The raw
//! mutex stays held across calls until the depth returns to zero, so the
//! state machine cannot be expressed with a scoped guard alone.

use std::sync::atomic::Ordering;

use parking_lot::lock_api::RawMutex as _;

use super::SharedSv;
use crate::interpreter::InterpId;

impl SharedSv {
    /// Whether `who` currently holds this backend's lock.
    pub fn is_held_by(&self, who: InterpId) -> bool {
        self.owner.load(Ordering::Acquire) == who.get()
    }

    /// Acquire on behalf of `who`, blocking if another interpreter holds it.
    ///
    /// Returns `true` when this call took the lock from unlocked to depth 1.
    pub(crate) fn lock_as(&self, who: InterpId) -> bool {
        if self.is_held_by(who) {
            self.locks.fetch_add(1, Ordering::AcqRel);
            return false;
        }
        self.mutex.lock();
        let depth = self.locks.fetch_add(1, Ordering::AcqRel) + 1;
        self.owner.store(who.get(), Ordering::Release);
        depth == 1
    }

    /// Drop one level of nesting; returns `true` when the mutex was released.
    pub(crate) fn unlock_as(&self, who: InterpId) -> bool {
        if !self.is_held_by(who) {
            return false;
        }
        if self.locks.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.release(who);
            return true;
        }
        false
    }

    /// Discard every level of nesting held by `who` at once.
    pub(crate) fn unlock_scope_as(&self, who: InterpId) -> bool {
        if !self.is_held_by(who) {
            return false;
        }
        self.locks.store(0, Ordering::Release);
        self.release(who);
        true
    }

    fn release(&self, who: InterpId) {
        debug_assert!(self.is_held_by(who));
        self.owner.store(0, Ordering::Release);
        // SAFETY: only the owner reaches this point, and the owner is only
        // ever recorded after `mutex.lock()` returned for it. An owner id
        // belongs to one `Interpreter`, which is `!Sync`, so no two threads
        // act as the same owner at once.
        unsafe { self.mutex.unlock() };
    }
}

/// Lock held for the duration of one internal operation.
///
/// Re-entrant like any other acquisition, but never registers a
/// scope-bound release: the guard itself drops the level it added,
/// including when the operation unwinds.
pub(crate) struct Held<'a> {
    sv: &'a SharedSv,
    who: InterpId,
}

impl<'a> Held<'a> {
    pub(crate) fn new(sv: &'a SharedSv, who: InterpId) -> Self {
        sv.lock_as(who);
        Self { sv, who }
    }
}

impl Drop for Held<'_> {
    fn drop(&mut self) {
        self.sv.unlock_as(self.who);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_lock_reports_depth_one() {
        let sv = SharedSv::new();
        let me = InterpId::next();
        assert!(sv.lock_as(me));
        assert!(!sv.lock_as(me));
        assert_eq!(sv.lock_depth(), 2);
        assert!(sv.is_held_by(me));
        assert!(!sv.unlock_as(me));
        assert!(sv.unlock_as(me));
        assert!(!sv.is_locked());
    }

    #[test]
    fn test_foreign_unlock_is_ignored() {
        let sv = SharedSv::new();
        let me = InterpId::next();
        let other = InterpId::next();
        sv.lock_as(me);
        assert!(!sv.unlock_as(other));
        assert!(!sv.unlock_scope_as(other));
        assert_eq!(sv.lock_depth(), 1);
        assert_eq!(sv.owner(), Some(me));
        sv.unlock_as(me);
    }

    #[test]
    fn test_unlock_scope_resets_any_depth() {
        let sv = SharedSv::new();
        let me = InterpId::next();
        for _ in 0..5 {
            sv.lock_as(me);
        }
        assert!(sv.unlock_scope_as(me));
        assert_eq!(sv.lock_depth(), 0);
        assert_eq!(sv.owner(), None);
        assert!(!sv.unlock_scope_as(me));
    }

    #[test]
    fn test_held_guard_restores_depth() {
        let sv = SharedSv::new();
        let me = InterpId::next();
        sv.lock_as(me);
        {
            let _held = Held::new(&sv, me);
            assert_eq!(sv.lock_depth(), 2);
        }
        assert_eq!(sv.lock_depth(), 1);
        sv.unlock_as(me);
        assert!(!sv.is_locked());
    }
}
