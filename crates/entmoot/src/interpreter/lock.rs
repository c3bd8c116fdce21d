//! Lock manager: recursive acquire/release with scope-bound release

use std::sync::Arc;

use tracing::trace;

use super::Interpreter;
use crate::shared::SharedSv;
use crate::value::Value;

impl Interpreter {
    /// Lock a backend for this interpreter.
    ///
    /// - `None` is inert, so "maybe shared" values need no special casing.
    /// - If this interpreter already holds the lock, the depth grows by one
    ///   without blocking.
    /// - Otherwise blocks until the current holder releases it.
    ///
    /// The acquisition that takes the depth from 0 to 1 registers an
    /// `unlock_scope` obligation in the current dynamic scope, unless that
    /// scope already has one for this backend; nested re-entries register
    /// nothing.
    pub fn lock(&mut self, sv: Option<&Arc<SharedSv>>) {
        let Some(sv) = sv else {
            return;
        };
        if sv.lock_as(self.id) && !self.savestack.frame_holds(sv) {
            self.savestack.push(Arc::clone(sv));
        }
        if self.config.trace {
            trace!(interp = %self.id, sv = sv.id(), depth = sv.lock_depth(), "lock");
        }
    }

    /// Release one level of nesting.
    ///
    /// A no-op for `None` and for backends this interpreter does not hold.
    /// When the depth reaches zero the backend becomes available to others.
    pub fn unlock(&self, sv: Option<&Arc<SharedSv>>) {
        let Some(sv) = sv else {
            return;
        };
        let released = sv.unlock_as(self.id);
        if self.config.trace {
            trace!(interp = %self.id, sv = sv.id(), released, "unlock");
        }
    }

    /// Release every level of nesting at once.
    ///
    /// This is what a scope's obligation runs when the scope ends. A no-op
    /// unless this interpreter is the holder, so redundant cleanup paths
    /// (explicit unlock followed by scope exit) never double-release.
    pub fn unlock_scope(&self, sv: &SharedSv) {
        let released = sv.unlock_scope_as(self.id);
        if self.config.trace && released {
            trace!(interp = %self.id, sv = sv.id(), "unlock_scope");
        }
    }

    /// Lock whatever backend `value` is attached to, if any.
    ///
    /// Returns the backend that was locked.
    pub fn lock_value(&mut self, value: &Value) -> Option<Arc<SharedSv>> {
        let sv = self.find(value);
        self.lock(sv.as_ref());
        sv
    }
}
