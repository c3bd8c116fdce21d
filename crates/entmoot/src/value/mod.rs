//! Interpreter-local frontend values

mod display;
mod impls;

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::shared::SharedSv;

/// A value living in one interpreter's private heap.
///
/// Containers are reference-counted so that their allocation has a
/// stable identity: the attachment table keys backends by it.
#[derive(Clone)]
pub enum Value {
    // ═══════════════════════════════════════════════════════════════════
    // Scalars (no identity)
    // ═══════════════════════════════════════════════════════════════════
    /// Undefined value
    Undef,

    /// 64-bit signed integer
    Int(i64),

    /// 64-bit floating point
    Float(f64),

    /// Immutable string
    Str(Arc<String>),

    // ═══════════════════════════════════════════════════════════════════
    // Containers (identity = allocation address)
    // ═══════════════════════════════════════════════════════════════════
    /// Growable array
    Array(Arc<RwLock<Vec<Value>>>),

    /// String-keyed hash
    Hash(Arc<RwLock<IndexMap<String, Value>>>),

    // ═══════════════════════════════════════════════════════════════════
    // Proxies
    // ═══════════════════════════════════════════════════════════════════
    /// Tie-like proxy whose storage is a shared backend
    Shared(SharedRef),
}

/// Proxy frontend standing in for a shared backend.
///
/// Cloning the proxy does not take a logical reference; the interpreter
/// that created it through [`Interpreter::proxy`](crate::Interpreter::proxy)
/// gives the reference back with
/// [`Interpreter::release`](crate::Interpreter::release).
#[derive(Debug, Clone)]
pub struct SharedRef {
    backend: Arc<SharedSv>,
}

impl SharedRef {
    pub(crate) fn new(backend: Arc<SharedSv>) -> Self {
        Self { backend }
    }

    /// The backend this proxy forwards to
    pub fn backend(&self) -> &Arc<SharedSv> {
        &self.backend
    }
}

impl Value {
    /// Identity of the underlying container allocation, if any.
    ///
    /// Scalars and proxies have no identity of their own.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::Array(items) => Some(Arc::as_ptr(items) as *const () as usize),
            Value::Hash(entries) => Some(Arc::as_ptr(entries) as *const () as usize),
            _ => None,
        }
    }
}
