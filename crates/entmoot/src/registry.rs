//! Process-wide record of the first interpreter

use std::sync::OnceLock;

use tracing::debug;

use crate::interpreter::{InterpId, Interpreter};

static FIRST_INTERPRETER: OnceLock<InterpId> = OnceLock::new();

/// Record `interp` as the process's first interpreter.
///
/// Only the first call has an effect; returns whether this call recorded.
pub fn init(interp: &Interpreter) -> bool {
    let recorded = FIRST_INTERPRETER.set(interp.id()).is_ok();
    if recorded {
        debug!(interp = %interp.id(), "shared value space initialized");
    }
    recorded
}

/// The interpreter recorded by [`init`], if it has run.
pub fn first_interpreter() -> Option<InterpId> {
    FIRST_INTERPRETER.get().copied()
}
