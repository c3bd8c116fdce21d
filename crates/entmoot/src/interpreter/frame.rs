//! RAII scope guard for automatic lock release

use super::Interpreter;
use crate::error::SharedError;

/// RAII guard that enters a dynamic scope now and leaves it on drop.
///
/// Leaving runs the scope's release obligations, so every backend first
/// locked inside the scope is unlocked however control leaves it: normal
/// fall-through, `?`/`return`, or a panic unwinding through the guard.
///
/// # Example
///
/// ```
/// use entmoot::{Interpreter, SharedSv, SharedValue};
///
/// let mut interp = Interpreter::new();
/// let sv = SharedSv::with_value(SharedValue::int(1));
///
/// {
///     let mut guard = interp.scope_guard().unwrap();
///     guard.lock(Some(&sv));
///     assert!(sv.is_held_by(guard.id()));
/// }
/// // guard dropped, scope left, lock gone
/// assert!(!sv.is_locked());
/// ```
pub struct ScopeGuard<'a> {
    interp: &'a mut Interpreter,
}

impl Interpreter {
    /// Create a scope guard that enters a scope now and leaves it on drop.
    pub fn scope_guard(&mut self) -> Result<ScopeGuard<'_>, SharedError> {
        self.enter_scope()?;
        Ok(ScopeGuard { interp: self })
    }
}

impl<'a> Drop for ScopeGuard<'a> {
    fn drop(&mut self) {
        self.interp.leave_scope();
    }
}

impl<'a> std::ops::Deref for ScopeGuard<'a> {
    type Target = Interpreter;

    fn deref(&self) -> &Self::Target {
        self.interp
    }
}

impl<'a> std::ops::DerefMut for ScopeGuard<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interp
    }
}
