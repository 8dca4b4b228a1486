// src/api.rs
//! The observed API boundary.
//!
//! Everything the diagram watches is reached through [`ObservedApi`]: a set of
//! named entry points that take and return dynamic [`Value`]s. The engine never
//! needs more of the observed object than the ability to enumerate those names
//! and invoke one of them.

use std::fmt;

use crate::error::ApiError;

/// Opaque identity of an object created by the observed API.
///
/// Handles are arena indices handed out in creation order; two handles are the
/// same object exactly when their indices match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u32);

impl Handle {
    pub const fn new(index: u32) -> Self {
        Handle(index)
    }

    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Dynamic value passed to and returned from API entry points.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Object(Handle),
    List(Vec<Value>),
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int(v) => Some(v),
            Value::Float(v) if v.fract() == 0.0 => Some(v as i64),
            Value::Bool(b) => Some(b as i64),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        self.as_i64().and_then(|v| u32::try_from(v).ok())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Int(v) => Some(v as f64),
            Value::Float(v) => Some(v),
            Value::Bool(b) => Some(if b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// JavaScript-style truthiness, used for boolean parameters.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(v) => *v != 0,
            Value::Float(v) => *v != 0.0 && !v.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Object(_) | Value::List(_) => true,
        }
    }

    /// `Some(None)` for `Null`, `Some(Some(h))` for an object, `None` otherwise.
    pub fn as_object(&self) -> Option<Option<Handle>> {
        match *self {
            Value::Null => Some(None),
            Value::Object(h) => Some(Some(h)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn from_object(handle: Option<Handle>) -> Self {
        handle.map_or(Value::Null, Value::Object)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<Handle> for Value {
    fn from(v: Handle) -> Self {
        Value::Object(v)
    }
}

/// A callable surface made of named entry points.
///
/// Implementations are free to keep any internal state; the diagram only
/// observes them through `invoke`.
pub trait ObservedApi {
    /// Names of every entry point that can be invoked (and therefore wrapped).
    fn operations(&self) -> Vec<&'static str>;

    /// Invokes the named entry point.
    fn invoke(&mut self, name: &str, args: &[Value]) -> Result<Value, ApiError>;

    fn has_operation(&self, name: &str) -> bool {
        self.operations().iter().any(|op| *op == name)
    }
}
