//! Read-only inspection of component state.
//!
//! Debuggers and test harnesses look at registers through string paths
//! instead of reaching into struct fields. Queries never affect emulation
//! state.

use std::fmt;

/// A dynamically-typed value returned by a state query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    U16(u16),
    U64(u64),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "${v:02X}"),
            Value::U16(v) => write!(f, "${v:04X}"),
            Value::U64(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::U8(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::U16(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

/// A component whose state can be inspected by path.
pub trait Observable {
    /// Query a property such as `pc`, `a` or `flags.z`.
    ///
    /// Returns `None` if the path is not recognised.
    fn query(&self, path: &str) -> Option<Value>;

    /// All paths accepted by `query()`.
    fn query_paths(&self) -> &'static [&'static str];
}
