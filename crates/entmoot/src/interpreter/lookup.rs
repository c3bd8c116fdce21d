//! Lookup: resolving frontend values to their shared backends

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use super::Interpreter;
use crate::error::{type_name, SharedError};
use crate::shared::{SharedSv, SharedValue};
use crate::value::{SharedRef, Value};

/// Side table attaching backends to frontend containers ("magic").
///
/// Keyed by container identity. Each entry keeps the frontend allocation
/// alive so its address cannot be reused by an unrelated container while
/// the attachment exists.
#[derive(Debug, Default)]
pub struct Attachments {
    entries: DashMap<usize, Attachment>,
}

#[derive(Debug)]
struct Attachment {
    backend: Arc<SharedSv>,
    _anchor: Value,
}

impl Attachments {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, key: usize) -> Option<Arc<SharedSv>> {
        self.entries.get(&key).map(|entry| Arc::clone(&entry.backend))
    }

    /// Number of attached frontends.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn drain(&self) -> Vec<Arc<SharedSv>> {
        let keys: Vec<usize> = self.entries.iter().map(|entry| *entry.key()).collect();
        keys.into_iter()
            .filter_map(|key| self.entries.remove(&key))
            .map(|(_, attachment)| attachment.backend)
            .collect()
    }
}

impl Interpreter {
    /// Find the backend behind a frontend value.
    ///
    /// Proxies resolve to the backend they forward to; containers resolve
    /// through the attachment table. Anything else is not shared.
    pub fn find(&self, value: &Value) -> Option<Arc<SharedSv>> {
        match value {
            Value::Shared(proxy) => Some(Arc::clone(proxy.backend())),
            other => other.identity().and_then(|key| self.attachments.get(key)),
        }
    }

    /// Attach `backend` to a frontend container.
    ///
    /// The attachment owns one logical reference on the backend, given
    /// back by [`release`](Self::release) or when the interpreter is
    /// dropped. Returns the backend previously attached, if any; its
    /// reference is handed back to the caller.
    pub fn attach(
        &self,
        value: &Value,
        backend: Arc<SharedSv>,
    ) -> Result<Option<Arc<SharedSv>>, SharedError> {
        let key = value.identity().ok_or(SharedError::NotAttachable {
            kind: type_name(value),
        })?;
        let previous = self.attachments.entries.insert(
            key,
            Attachment {
                backend,
                _anchor: value.clone(),
            },
        );
        Ok(previous.map(|attachment| attachment.backend))
    }

    /// Remove the attachment of a frontend container, handing its
    /// reference back to the caller.
    pub fn detach(&self, value: &Value) -> Option<Arc<SharedSv>> {
        let key = value.identity()?;
        self.attachments
            .entries
            .remove(&key)
            .map(|(_, attachment)| attachment.backend)
    }

    /// Number of frontend containers with an attached backend.
    pub fn attached(&self) -> usize {
        self.attachments.len()
    }

    /// Make a proxy frontend for `backend`, taking a logical reference.
    pub fn proxy(&self, backend: &Arc<SharedSv>) -> Value {
        self.increment(backend);
        Value::Shared(SharedRef::new(Arc::clone(backend)))
    }

    /// Copy a frontend value into a new backend.
    ///
    /// Scalars are copied. Nested containers become backends of their own,
    /// referenced from their parent's payload. Proxies become references to
    /// their backend (taking a logical reference for the new slot). A
    /// top-level container is attached to its new backend; a value that is
    /// already shared returns its existing backend unchanged.
    pub fn share(&self, value: &Value) -> Result<Arc<SharedSv>, SharedError> {
        if let Some(existing) = self.find(value) {
            return Ok(existing);
        }
        let sv = SharedSv::with_value(self.payload_of(value));
        if value.is_container() {
            if let Some(previous) = self.attach(value, Arc::clone(&sv))? {
                self.decrement(&previous);
            }
        }
        debug!(interp = %self.id, sv = sv.id(), kind = type_name(value), "shared value created");
        Ok(sv)
    }

    /// Destroy a frontend handle, giving back its logical reference.
    ///
    /// Proxies decrement the backend they forward to; containers are
    /// detached first. Values that are not shared are ignored.
    pub fn release(&self, value: &Value) {
        let backend = match value {
            Value::Shared(proxy) => Some(Arc::clone(proxy.backend())),
            other => self.detach(other),
        };
        if let Some(backend) = backend {
            self.decrement(&backend);
        }
    }

    fn payload_of(&self, value: &Value) -> SharedValue {
        match value {
            Value::Undef => SharedValue::undef(),
            Value::Int(n) => SharedValue::int(*n),
            Value::Float(n) => SharedValue::float(*n),
            Value::Str(s) => SharedValue::string(s.as_str()),
            Value::Array(items) => {
                SharedValue::Array(items.read().iter().map(|item| self.slot_of(item)).collect())
            }
            Value::Hash(entries) => SharedValue::Hash(
                entries
                    .read()
                    .iter()
                    .map(|(k, v)| (k.clone(), self.slot_of(v)))
                    .collect(),
            ),
            Value::Shared(proxy) => {
                self.increment(proxy.backend());
                SharedValue::reference(proxy.backend())
            }
        }
    }

    fn slot_of(&self, value: &Value) -> SharedValue {
        if !value.is_container() {
            return self.payload_of(value);
        }
        match self.find(value) {
            Some(existing) => {
                self.increment(&existing);
                SharedValue::Ref(existing)
            }
            None => SharedValue::Ref(SharedSv::with_value(self.payload_of(value))),
        }
    }
}
