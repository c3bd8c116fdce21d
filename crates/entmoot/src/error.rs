//! Error types for shared value operations

use thiserror::Error;

use crate::value::Value;

/// Main error type for Entmoot operations.
///
/// The lock and lifetime state machines never fail; these errors come
/// from payload access, attachment, and scope bookkeeping.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// Payload installed twice
    #[error("Shared value sv#{sv} already has a payload")]
    AlreadyInstalled {
        /// Backend id
        sv: u64,
    },

    /// Payload read before one was installed
    #[error("Shared value sv#{sv} has no payload installed")]
    Vacant {
        /// Backend id
        sv: u64,
    },

    /// Payload read after the last reference was dropped
    #[error("Shared value sv#{sv} has been released")]
    Released {
        /// Backend id
        sv: u64,
    },

    /// Frontend value has no identity to attach a backend to
    #[error("Cannot attach a shared backend to a {kind} value")]
    NotAttachable {
        /// Frontend value kind
        kind: &'static str,
    },

    /// Too many nested dynamic scopes
    #[error("Scope overflow: depth {depth} exceeds maximum {max}")]
    ScopeOverflow {
        /// Current depth
        depth: usize,
        /// Configured maximum
        max: usize,
    },
}

/// Result type alias for Entmoot operations
pub type Result<T> = std::result::Result<T, SharedError>;

/// Human-readable kind of a frontend value, used in error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Undef => "undef",
        Value::Int(_) => "integer",
        Value::Float(_) => "float",
        Value::Str(_) => "string",
        Value::Array(_) => "array",
        Value::Hash(_) => "hash",
        Value::Shared(_) => "shared",
    }
}
