//! Shared backends: storage that lives outside any single interpreter

mod lock;
mod payload;

pub(crate) use lock::Held;
pub use payload::{Scalar, SharedValue};

use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::lock_api::RawMutex as RawMutexApi;
use parking_lot::{Condvar, Mutex, MutexGuard, RawMutex};

use crate::error::{Result, SharedError};
use crate::interpreter::InterpId;

static NEXT_SV_ID: AtomicU64 = AtomicU64::new(1);

/// Payload slot of a backend.
pub(crate) enum Storage {
    /// Allocated, no payload installed yet
    Vacant,

    /// Payload installed and referenced
    Live(SharedValue),

    /// Last reference dropped, payload freed
    Released,
}

/// The backend of a shared value.
///
/// Holds the synchronization state (a raw mutex held across calls, a
/// condition variable, the recursive lock depth and the owning
/// interpreter) plus the payload. Interpreters reach it through
/// `Arc<SharedSv>` handles; the logical reference count is managed by
/// [`Interpreter::increment`] and [`Interpreter::decrement`].
///
/// The reference count and release flag sit outside the payload mutex, so
/// the inspection accessors never wait on a payload access in progress.
///
/// [`Interpreter::increment`]: crate::Interpreter::increment
/// [`Interpreter::decrement`]: crate::Interpreter::decrement
pub struct SharedSv {
    id: u64,

    /// Held from the first lock until the depth returns to zero
    mutex: RawMutex,

    /// Hook for external wait/notify protocols; unused here
    condition: Condvar,

    /// Recursive depth, 0 when unlocked
    locks: AtomicUsize,

    /// Raw `InterpId` of the holder, 0 when unlocked
    owner: AtomicU64,

    /// Logical references to the payload, 0 unless live; written only
    /// while `mutex` is held
    refcnt: AtomicUsize,

    /// Set once the payload has been torn down
    released: AtomicBool,

    /// Only touched while `mutex` is held, except by `install`
    storage: Mutex<Storage>,
}

impl SharedSv {
    /// Allocate a new, unlocked backend with no payload.
    ///
    /// The caller builds the payload and installs it with
    /// [`install`](Self::install).
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            id: NEXT_SV_ID.fetch_add(1, Ordering::Relaxed),
            mutex: <RawMutex as RawMutexApi>::INIT,
            condition: Condvar::new(),
            locks: AtomicUsize::new(0),
            owner: AtomicU64::new(0),
            refcnt: AtomicUsize::new(0),
            released: AtomicBool::new(false),
            storage: Mutex::new(Storage::Vacant),
        })
    }

    /// Allocate a backend and install `value` as its payload.
    pub fn with_value(value: SharedValue) -> Arc<Self> {
        let sv = Self::new();
        *sv.storage.lock() = Storage::Live(value);
        sv.refcnt.store(1, Ordering::Release);
        sv
    }

    /// Install the payload of a fresh backend with a reference count of one.
    pub fn install(&self, value: SharedValue) -> Result<()> {
        let mut storage = self.storage.lock();
        match *storage {
            Storage::Vacant => {
                *storage = Storage::Live(value);
                self.refcnt.store(1, Ordering::Release);
                Ok(())
            }
            _ => Err(SharedError::AlreadyInstalled { sv: self.id }),
        }
    }

    /// Process-unique id, used in logs and error messages.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Current recursive lock depth.
    pub fn lock_depth(&self) -> usize {
        self.locks.load(Ordering::Acquire)
    }

    /// Whether any interpreter holds the lock.
    pub fn is_locked(&self) -> bool {
        self.owner().is_some()
    }

    /// The interpreter holding the lock, if any.
    pub fn owner(&self) -> Option<InterpId> {
        NonZeroU64::new(self.owner.load(Ordering::Acquire)).map(InterpId::from_raw)
    }

    /// Condition variable reserved for blocking coordination protocols
    /// built on top of this crate.
    pub fn condition(&self) -> &Condvar {
        &self.condition
    }

    /// Snapshot of the payload reference count (0 unless live).
    pub fn refcnt(&self) -> usize {
        self.refcnt.load(Ordering::Acquire)
    }

    /// Whether a payload is installed and still referenced.
    pub fn is_live(&self) -> bool {
        self.refcnt() > 0
    }

    /// Whether the payload has been torn down.
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// Add a logical reference; `false` when there is no live payload.
    /// Caller holds the lock.
    pub(crate) fn retain(&self) -> bool {
        if self.refcnt() == 0 {
            return false;
        }
        self.refcnt.fetch_add(1, Ordering::AcqRel);
        true
    }

    /// Drop a logical reference that is not the last one; `false` when the
    /// count is at most one. Caller holds the lock.
    pub(crate) fn release_ref(&self) -> bool {
        if self.refcnt() <= 1 {
            return false;
        }
        self.refcnt.fetch_sub(1, Ordering::AcqRel);
        true
    }

    /// Free the payload after its last reference. Caller holds the lock.
    pub(crate) fn free(&self) -> Option<SharedValue> {
        let freed = std::mem::replace(&mut *self.storage.lock(), Storage::Released);
        self.released.store(true, Ordering::Release);
        self.refcnt.store(0, Ordering::Release);
        match freed {
            Storage::Live(value) => Some(value),
            _ => None,
        }
    }

    pub(crate) fn storage(&self) -> MutexGuard<'_, Storage> {
        self.storage.lock()
    }

    /// Map the storage state onto the payload-access error for this backend.
    pub(crate) fn unavailable(&self, storage: &Storage) -> SharedError {
        match storage {
            Storage::Released => SharedError::Released { sv: self.id },
            _ => SharedError::Vacant { sv: self.id },
        }
    }
}

impl fmt::Debug for SharedSv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSv")
            .field("id", &self.id)
            .field("locks", &self.lock_depth())
            .field("owner", &self.owner())
            .field("refcnt", &self.refcnt())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_unlocked_and_vacant() {
        let sv = SharedSv::new();
        assert_eq!(sv.lock_depth(), 0);
        assert!(!sv.is_locked());
        assert_eq!(sv.owner(), None);
        assert!(!sv.is_live());
        assert!(!sv.is_released());
        assert_eq!(sv.refcnt(), 0);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = SharedSv::new();
        let b = SharedSv::new();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_install_sets_refcnt_one() {
        let sv = SharedSv::new();
        sv.install(SharedValue::int(5)).unwrap();
        assert!(sv.is_live());
        assert_eq!(sv.refcnt(), 1);
    }

    #[test]
    fn test_free_marks_released() {
        let sv = SharedSv::with_value(SharedValue::string("x"));
        assert_eq!(sv.free(), Some(SharedValue::string("x")));
        assert!(sv.is_released());
        assert!(!sv.is_live());
        assert_eq!(sv.refcnt(), 0);
        assert!(!sv.retain());
    }

    #[test]
    fn test_install_twice_fails() {
        let sv = SharedSv::with_value(SharedValue::int(1));
        let err = sv.install(SharedValue::int(2)).unwrap_err();
        assert_eq!(err, SharedError::AlreadyInstalled { sv: sv.id() });
    }
}
