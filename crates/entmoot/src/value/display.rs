//! Display and Debug implementations for Value

use std::fmt;

use super::*;

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undef => write!(f, "undef"),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{:?}", s.as_ref()),

            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.read().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}", item)?;
                }
                write!(f, "]")
            }

            Value::Hash(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.read().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?} => {:?}", k, v)?;
                }
                write!(f, "}}")
            }

            Value::Shared(proxy) => write!(f, "<shared sv#{}>", proxy.backend().id()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{}", s.as_ref()), // No quotes for Display
            Value::Undef => Ok(()),
            _ => fmt::Debug::fmt(self, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_containers() {
        let v = Value::hash([("a", Value::array(vec![Value::Int(1), Value::string("x")]))]);
        assert_eq!(format!("{:?}", v), "{\"a\" => [1, \"x\"]}");
    }

    #[test]
    fn test_display_string_unquoted() {
        assert_eq!(format!("{}", Value::string("hi")), "hi");
        assert_eq!(format!("{}", Value::Undef), "");
        assert_eq!(format!("{}", Value::Int(3)), "3");
    }
}
