//! Lifetime manager: logical reference counts and recursive teardown

use tracing::{debug, error};

use super::Interpreter;
use crate::error::Result;
use crate::shared::{Held, SharedSv, SharedValue, Storage};

impl Interpreter {
    /// Take one more logical reference on a backend's payload.
    pub fn increment(&self, sv: &SharedSv) {
        let _held = Held::new(sv, self.id);
        if !sv.retain() {
            error!(interp = %self.id, sv = sv.id(), "increment on a backend without a live payload");
        }
    }

    /// Give back one logical reference.
    ///
    /// Dropping the last reference first gives back the reference held by
    /// every backend nested in the payload (a `Ref` target, each array slot
    /// in index order, each hash value), then frees the payload. The lock
    /// on this backend is held throughout, nested backends are locked one
    /// at a time inside it.
    pub fn decrement(&self, sv: &SharedSv) {
        let _held = Held::new(sv, self.id);
        if sv.release_ref() {
            return;
        }

        let nested = match &*sv.storage() {
            Storage::Live(value) => value.nested_backends(),
            _ => {
                error!(interp = %self.id, sv = sv.id(), "decrement on a backend without a live payload");
                return;
            }
        };

        for inner in &nested {
            self.decrement(inner);
        }

        drop(sv.free());
        debug!(interp = %self.id, sv = sv.id(), nested = nested.len(), "released shared value");
    }

    /// Read the payload under the lock.
    ///
    /// The closure runs while the payload is borrowed: it may inspect this
    /// backend (`refcnt`, `is_live`, `lock_depth`, ...) or `increment` it,
    /// but must not call `with_payload`, `with_payload_mut`, `install` or
    /// `decrement` on it.
    pub fn with_payload<R>(&self, sv: &SharedSv, f: impl FnOnce(&SharedValue) -> R) -> Result<R> {
        let _held = Held::new(sv, self.id);
        let storage = sv.storage();
        match &*storage {
            Storage::Live(value) => Ok(f(value)),
            other => Err(sv.unavailable(other)),
        }
    }

    /// Mutate the payload under the lock.
    ///
    /// Same restrictions on the closure as [`with_payload`](Self::with_payload).
    /// Slots that drop a `Ref` do not give back its logical reference;
    /// call [`decrement`](Self::decrement) on the removed target.
    pub fn with_payload_mut<R>(
        &self,
        sv: &SharedSv,
        f: impl FnOnce(&mut SharedValue) -> R,
    ) -> Result<R> {
        let _held = Held::new(sv, self.id);
        let mut storage = sv.storage();
        match &mut *storage {
            Storage::Live(value) => Ok(f(value)),
            other => Err(sv.unavailable(other)),
        }
    }
}
