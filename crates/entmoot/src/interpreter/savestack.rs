//! Flat stack of scope-bound release obligations

use std::sync::Arc;

use crate::shared::SharedSv;

/// Pending `unlock_scope` calls, grouped by dynamic scope.
///
/// Same flat layout as a binding environment: one vector of entries
/// plus frame boundaries, so leaving a scope is a single truncation.
#[derive(Debug)]
pub(crate) struct SaveStack {
    /// Backends to force-release (most recent at end)
    entries: Vec<Arc<SharedSv>>,

    /// Frame boundaries (indices into entries)
    frames: Vec<usize>,
}

impl SaveStack {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            frames: vec![0], // Outermost scope
        }
    }

    pub(crate) fn push_frame(&mut self) {
        self.frames.push(self.entries.len());
    }

    /// Pop the innermost frame and hand back its obligations in
    /// registration order. `None` at the outermost scope.
    pub(crate) fn pop_frame(&mut self) -> Option<Vec<Arc<SharedSv>>> {
        if self.frames.len() > 1 {
            let boundary = self.frames.pop()?;
            return Some(self.entries.split_off(boundary));
        }
        None
    }

    /// Register an obligation in the innermost frame.
    pub(crate) fn push(&mut self, sv: Arc<SharedSv>) {
        self.entries.push(sv);
    }

    /// Whether the innermost frame already has an obligation for `sv`.
    pub(crate) fn frame_holds(&self, sv: &Arc<SharedSv>) -> bool {
        let start = self.frames.last().copied().unwrap_or(0);
        self.entries[start..].iter().any(|entry| Arc::ptr_eq(entry, sv))
    }

    /// Take every obligation in every frame and reset to the outermost scope.
    pub(crate) fn drain(&mut self) -> Vec<Arc<SharedSv>> {
        self.frames.truncate(1);
        std::mem::take(&mut self.entries)
    }

    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::SharedValue;

    #[test]
    fn test_pop_returns_only_innermost_entries() {
        let a = SharedSv::with_value(SharedValue::int(1));
        let b = SharedSv::with_value(SharedValue::int(2));
        let mut stack = SaveStack::new();

        stack.push(Arc::clone(&a));
        stack.push_frame();
        stack.push(Arc::clone(&b));

        let popped = stack.pop_frame().unwrap();
        assert_eq!(popped.len(), 1);
        assert!(Arc::ptr_eq(&popped[0], &b));
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_outermost_frame_is_never_popped() {
        let mut stack = SaveStack::new();
        assert!(stack.pop_frame().is_none());
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_frame_holds_checks_innermost_frame_only() {
        let a = SharedSv::with_value(SharedValue::int(1));
        let b = SharedSv::with_value(SharedValue::int(2));
        let mut stack = SaveStack::new();

        stack.push(Arc::clone(&a));
        assert!(stack.frame_holds(&a));
        assert!(!stack.frame_holds(&b));

        stack.push_frame();
        assert!(!stack.frame_holds(&a));
        stack.push(Arc::clone(&b));
        assert!(stack.frame_holds(&b));
    }

    #[test]
    fn test_drain_resets() {
        let a = SharedSv::with_value(SharedValue::int(1));
        let mut stack = SaveStack::new();
        stack.push_frame();
        stack.push_frame();
        stack.push(a);
        assert_eq!(stack.drain().len(), 1);
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.len(), 0);
    }
}
