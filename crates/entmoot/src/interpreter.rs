//! Execution contexts that own locks on shared backends

mod frame;
mod lifetime;
mod lock;
mod lookup;
mod savestack;

pub use frame::ScopeGuard;
pub use lookup::Attachments;

use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

use crate::config::Config;
use crate::error::SharedError;
use savestack::SaveStack;

static NEXT_INTERP_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of an execution context.
///
/// Ids are process-unique and never reused, so a stale owner can never
/// be mistaken for a live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InterpId(NonZeroU64);

impl InterpId {
    pub(crate) fn next() -> Self {
        Self(NonZeroU64::MIN.saturating_add(NEXT_INTERP_ID.fetch_add(1, Ordering::Relaxed)))
    }

    pub(crate) fn from_raw(raw: NonZeroU64) -> Self {
        Self(raw)
    }

    /// Raw numeric id
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for InterpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "interp#{}", self.0)
    }
}

/// One execution context: the owner identity for locks, its dynamic
/// scopes, and its table of frontend attachments.
///
/// An interpreter belongs to one thread at a time. Locks it takes are
/// released when the scope that took them ends, or at the latest when the
/// interpreter itself is dropped.
///
/// It may move to another thread but cannot be shared between threads:
/// every thread acting through the same interpreter would pass as the
/// lock owner.
///
/// ```compile_fail
/// use entmoot::Interpreter;
///
/// fn shared_across_threads<T: Sync>(_: &T) {}
/// shared_across_threads(&Interpreter::new());
/// ```
///
/// # Example
///
/// ```
/// use entmoot::{Interpreter, SharedSv, SharedValue};
///
/// let mut interp = Interpreter::new();
/// let counter = SharedSv::with_value(SharedValue::int(0));
///
/// {
///     let mut scope = interp.scope_guard().unwrap();
///     scope.lock(Some(&counter));
///     scope.lock(Some(&counter)); // re-entrant
///     assert_eq!(counter.lock_depth(), 2);
/// }
/// // Scope ended: every nested level released at once
/// assert!(!counter.is_locked());
/// ```
pub struct Interpreter {
    id: InterpId,
    config: Config,
    savestack: SaveStack,
    attachments: Attachments,
    _not_sync: PhantomData<Cell<()>>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Create an interpreter with default settings.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create an interpreter with a custom configuration.
    pub fn with_config(config: Config) -> Self {
        let id = InterpId::next();
        debug!(interp = %id, "interpreter created");
        Self {
            id,
            config,
            savestack: SaveStack::new(),
            attachments: Attachments::new(),
            _not_sync: PhantomData,
        }
    }

    /// This interpreter's owner identity.
    pub fn id(&self) -> InterpId {
        self.id
    }

    /// The configuration this interpreter was created with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    // ═══════════════════════════════════════════════════════════════════
    // Dynamic Scopes
    // ═══════════════════════════════════════════════════════════════════

    /// Enter a new dynamic scope.
    ///
    /// Locks first taken inside it are force-released by the matching
    /// [`leave_scope`](Self::leave_scope).
    pub fn enter_scope(&mut self) -> Result<(), SharedError> {
        let depth = self.savestack.depth();
        if depth >= self.config.max_scope_depth {
            return Err(SharedError::ScopeOverflow {
                depth,
                max: self.config.max_scope_depth,
            });
        }
        self.savestack.push_frame();
        Ok(())
    }

    /// Leave the current dynamic scope, running its release obligations
    /// newest first. Does nothing at the outermost scope.
    pub fn leave_scope(&mut self) {
        if let Some(pending) = self.savestack.pop_frame() {
            for sv in pending.iter().rev() {
                self.unlock_scope(sv);
            }
        }
    }

    /// Number of open scopes, including the outermost one.
    pub fn scope_depth(&self) -> usize {
        self.savestack.depth()
    }

    /// Number of release obligations waiting for their scope to end.
    pub fn pending_releases(&self) -> usize {
        self.savestack.len()
    }
}

impl Drop for Interpreter {
    fn drop(&mut self) {
        let pending = self.savestack.drain();
        for sv in pending.iter().rev() {
            self.unlock_scope(sv);
        }
        for backend in self.attachments.drain() {
            self.decrement(&backend);
        }
        trace!(interp = %self.id, "interpreter destroyed");
    }
}

impl fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interpreter")
            .field("id", &self.id)
            .field("scope_depth", &self.savestack.depth())
            .field("pending_releases", &self.savestack.len())
            .field("attachments", &self.attachments.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::shared::{SharedSv, SharedValue};

    #[test]
    fn test_ids_are_distinct() {
        let a = Interpreter::new();
        let b = Interpreter::new();
        assert_ne!(a.id(), b.id());
        assert!(a.id().get() > 0);
    }

    #[test]
    fn test_enter_leave_scope() {
        let mut interp = Interpreter::new();
        assert_eq!(interp.scope_depth(), 1);
        interp.enter_scope().unwrap();
        assert_eq!(interp.scope_depth(), 2);
        interp.leave_scope();
        assert_eq!(interp.scope_depth(), 1);
        // Outermost scope is never popped
        interp.leave_scope();
        assert_eq!(interp.scope_depth(), 1);
    }

    #[test]
    fn test_scope_overflow() {
        let mut interp = Interpreter::with_config(Config::with_max_scope_depth(2));
        interp.enter_scope().unwrap();
        let err = interp.enter_scope().unwrap_err();
        assert_eq!(err, SharedError::ScopeOverflow { depth: 2, max: 2 });
    }

    #[test]
    fn test_drop_releases_outstanding_locks() {
        let sv = SharedSv::with_value(SharedValue::int(1));
        {
            let mut interp = Interpreter::new();
            interp.enter_scope().unwrap();
            interp.lock(Some(&sv));
            interp.lock(Some(&sv));
            assert!(sv.is_locked());
        }
        assert!(!sv.is_locked());
        assert_eq!(sv.lock_depth(), 0);
    }

    #[test]
    fn test_interpreter_moves_between_threads() {
        fn assert_send<T: Send>() {}
        assert_send::<Interpreter>();

        let mut interp = Interpreter::new();
        let sv = SharedSv::with_value(SharedValue::int(1));
        interp.lock(Some(&sv));
        let id = interp.id();

        let remote = Arc::clone(&sv);
        let interp = std::thread::spawn(move || {
            interp.lock(Some(&remote));
            interp.unlock(Some(&remote));
            interp
        })
        .join()
        .unwrap();

        assert!(sv.is_held_by(id));
        drop(interp);
        assert!(!sv.is_locked());
    }

    #[test]
    fn test_display_id() {
        let interp = Interpreter::new();
        assert_eq!(format!("{}", interp.id()), format!("interp#{}", interp.id().get()));
    }
}
