//! Interpreter configuration

/// Configuration for an [`Interpreter`](crate::Interpreter).
///
/// Controls scope nesting limits and how chatty the lock manager is.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of nested dynamic scopes (save stack frames)
    pub max_scope_depth: usize,

    /// Emit a `trace!` event for every lock transition
    pub trace: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_scope_depth: 1000,
            trace: false,
        }
    }
}

impl Config {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration with a custom scope depth limit.
    pub fn with_max_scope_depth(max_depth: usize) -> Self {
        Self {
            max_scope_depth: max_depth,
            ..Default::default()
        }
    }

    /// Enable or disable lock tracing (builder pattern).
    pub fn traced(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }
}
