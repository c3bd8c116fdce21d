//! Payload stored inside a shared backend

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use super::SharedSv;

/// A plain scalar payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// No value
    Undef,
    /// Integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// String
    Str(String),
}

/// The value held by a backend.
///
/// `Ref` slots point at other backends. An `Array` or `Hash` slot may
/// itself be (or contain) a `Ref`, so releasing a payload has to walk
/// into containers to find every backend it keeps alive.
///
/// Deliberately not `Clone`: copying a `Ref` would duplicate a handle
/// without taking a logical reference.
pub enum SharedValue {
    /// Scalar
    Scalar(Scalar),

    /// Reference to another backend
    Ref(Arc<SharedSv>),

    /// Ordered slots
    Array(Vec<SharedValue>),

    /// Keyed slots (iteration order carries no meaning)
    Hash(IndexMap<String, SharedValue>),
}

impl SharedValue {
    /// Undefined scalar
    pub fn undef() -> Self {
        SharedValue::Scalar(Scalar::Undef)
    }

    /// Integer scalar
    pub fn int(n: i64) -> Self {
        SharedValue::Scalar(Scalar::Int(n))
    }

    /// Float scalar
    pub fn float(n: f64) -> Self {
        SharedValue::Scalar(Scalar::Float(n))
    }

    /// String scalar
    pub fn string(s: impl Into<String>) -> Self {
        SharedValue::Scalar(Scalar::Str(s.into()))
    }

    /// Reference to `target`.
    ///
    /// The new slot takes over one logical reference; the caller must
    /// already own it (a fresh backend, or one it has incremented).
    pub fn reference(target: &Arc<SharedSv>) -> Self {
        SharedValue::Ref(Arc::clone(target))
    }

    /// Array payload
    pub fn array(items: Vec<SharedValue>) -> Self {
        SharedValue::Array(items)
    }

    /// Hash payload from key/value pairs
    pub fn hash<K: Into<String>>(entries: impl IntoIterator<Item = (K, SharedValue)>) -> Self {
        SharedValue::Hash(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Short name of the payload kind
    pub fn kind(&self) -> &'static str {
        match self {
            SharedValue::Scalar(_) => "scalar",
            SharedValue::Ref(_) => "ref",
            SharedValue::Array(_) => "array",
            SharedValue::Hash(_) => "hash",
        }
    }

    /// Extract scalar
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            SharedValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Extract integer scalar
    pub fn as_int(&self) -> Option<i64> {
        match self {
            SharedValue::Scalar(Scalar::Int(n)) => Some(*n),
            _ => None,
        }
    }

    /// Extract reference target
    pub fn as_ref_target(&self) -> Option<&Arc<SharedSv>> {
        match self {
            SharedValue::Ref(target) => Some(target),
            _ => None,
        }
    }

    /// Extract array slots
    pub fn as_array(&self) -> Option<&[SharedValue]> {
        match self {
            SharedValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Extract mutable array slots
    pub fn as_array_mut(&mut self) -> Option<&mut Vec<SharedValue>> {
        match self {
            SharedValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Extract hash slots
    pub fn as_hash(&self) -> Option<&IndexMap<String, SharedValue>> {
        match self {
            SharedValue::Hash(entries) => Some(entries),
            _ => None,
        }
    }

    /// Extract mutable hash slots
    pub fn as_hash_mut(&mut self) -> Option<&mut IndexMap<String, SharedValue>> {
        match self {
            SharedValue::Hash(entries) => Some(entries),
            _ => None,
        }
    }

    /// Visit every backend this payload references directly.
    ///
    /// Inline containers are walked; referenced backends are not (their
    /// own payloads are the business of their own teardown). Array slots
    /// are visited in index order.
    pub fn for_each_backend(&self, visit: &mut dyn FnMut(&Arc<SharedSv>)) {
        match self {
            SharedValue::Scalar(_) => {}
            SharedValue::Ref(target) => visit(target),
            SharedValue::Array(items) => {
                for item in items {
                    item.for_each_backend(visit);
                }
            }
            SharedValue::Hash(entries) => {
                for value in entries.values() {
                    value.for_each_backend(visit);
                }
            }
        }
    }

    /// Collect the backends [`for_each_backend`](Self::for_each_backend) visits.
    pub fn nested_backends(&self) -> Vec<Arc<SharedSv>> {
        let mut found = Vec::new();
        self.for_each_backend(&mut |sv| found.push(Arc::clone(sv)));
        found
    }
}

impl From<Scalar> for SharedValue {
    fn from(s: Scalar) -> Self {
        SharedValue::Scalar(s)
    }
}

impl From<i64> for SharedValue {
    fn from(n: i64) -> Self {
        SharedValue::int(n)
    }
}

impl From<&str> for SharedValue {
    fn from(s: &str) -> Self {
        SharedValue::string(s)
    }
}

impl PartialEq for SharedValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SharedValue::Scalar(a), SharedValue::Scalar(b)) => a == b,
            // References are equal when they share a backend
            (SharedValue::Ref(a), SharedValue::Ref(b)) => Arc::ptr_eq(a, b),
            (SharedValue::Array(a), SharedValue::Array(b)) => a == b,
            (SharedValue::Hash(a), SharedValue::Hash(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for SharedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SharedValue::Scalar(Scalar::Undef) => write!(f, "undef"),
            SharedValue::Scalar(Scalar::Int(n)) => write!(f, "{}", n),
            SharedValue::Scalar(Scalar::Float(n)) => write!(f, "{}", n),
            SharedValue::Scalar(Scalar::Str(s)) => write!(f, "{:?}", s),
            SharedValue::Ref(target) => write!(f, "\\sv#{}", target.id()),
            SharedValue::Array(items) => f.debug_list().entries(items).finish(),
            SharedValue::Hash(entries) => f.debug_map().entries(entries.iter()).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_has_no_backends() {
        assert!(SharedValue::int(5).nested_backends().is_empty());
        assert!(SharedValue::string("x").nested_backends().is_empty());
    }

    #[test]
    fn test_array_backends_in_index_order() {
        let x = SharedSv::with_value(SharedValue::int(1));
        let y = SharedSv::with_value(SharedValue::int(2));
        let payload = SharedValue::array(vec![
            SharedValue::reference(&x),
            SharedValue::int(7),
            SharedValue::reference(&y),
        ]);

        let nested = payload.nested_backends();
        assert_eq!(nested.len(), 2);
        assert!(Arc::ptr_eq(&nested[0], &x));
        assert!(Arc::ptr_eq(&nested[1], &y));
    }

    #[test]
    fn test_hash_and_inline_containers_are_walked() {
        let x = SharedSv::with_value(SharedValue::int(1));
        let y = SharedSv::with_value(SharedValue::int(2));
        let payload = SharedValue::hash([
            ("a", SharedValue::reference(&x)),
            ("b", SharedValue::int(5)),
            ("c", SharedValue::array(vec![SharedValue::reference(&y)])),
        ]);

        let ids: Vec<u64> = payload.nested_backends().iter().map(|sv| sv.id()).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&x.id()));
        assert!(ids.contains(&y.id()));
    }

    #[test]
    fn test_ref_equality_is_identity() {
        let x = SharedSv::with_value(SharedValue::int(1));
        let y = SharedSv::with_value(SharedValue::int(1));
        assert_eq!(SharedValue::reference(&x), SharedValue::reference(&x));
        assert_ne!(SharedValue::reference(&x), SharedValue::reference(&y));
    }

    #[test]
    fn test_debug_format() {
        let payload = SharedValue::array(vec![SharedValue::int(1), SharedValue::string("a")]);
        assert_eq!(format!("{:?}", payload), "[1, \"a\"]");
    }
}
