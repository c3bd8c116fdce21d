//! # Entmoot
//!
//! Shared values for isolated interpreters.
//!
//! Each worker thread runs its own [`Interpreter`] with a private value
//! heap. A small set of values can be shared between them: the shared
//! storage is a [`SharedSv`] backend living outside every interpreter, and
//! each interpreter reaches it through frontend [`Value`]s.
//!
//! ## Architecture
//!
//! - **Shared backend**: mutex, condition variable, recursive lock depth,
//!   owner identity, and the [`SharedValue`] payload
//! - **Lock manager**: re-entrant locking keyed to the owning interpreter,
//!   with release tied to the dynamic scope that took the lock
//! - **Lifetime manager**: logical reference counts whose last release
//!   walks the payload and releases nested backends first
//! - **Lookup**: resolving a frontend value to its backend
//! - **Registry**: the identity of the first interpreter in the process
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//!
//! use entmoot::{Interpreter, SharedSv, SharedValue};
//!
//! let counter = SharedSv::with_value(SharedValue::int(0));
//!
//! let workers: Vec<_> = (0..4)
//!     .map(|_| {
//!         let counter = Arc::clone(&counter);
//!         thread::spawn(move || {
//!             let mut interp = Interpreter::new();
//!             let mut scope = interp.scope_guard().unwrap();
//!             scope.lock(Some(&counter));
//!             scope
//!                 .with_payload_mut(&counter, |v| {
//!                     if let Some(n) = v.as_int() {
//!                         *v = SharedValue::int(n + 1);
//!                     }
//!                 })
//!                 .unwrap();
//!         })
//!     })
//!     .collect();
//!
//! for worker in workers {
//!     worker.join().unwrap();
//! }
//!
//! let interp = Interpreter::new();
//! assert_eq!(interp.with_payload(&counter, |v| v.as_int()).unwrap(), Some(4));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod interpreter;
pub mod registry;
pub mod shared;
pub mod value;

// Re-export main types
pub use config::Config;
pub use error::{Result, SharedError};
pub use interpreter::{Attachments, InterpId, Interpreter, ScopeGuard};
pub use shared::{Scalar, SharedSv, SharedValue};
pub use value::{SharedRef, Value};

/// Entmoot version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
