// src/format.rs
//! Formatter registry: pure conversions from raw state values to display text.
//!
//! State tables compare rendered strings, not values, so every formatter here
//! must be deterministic and total over [`Value`].

use crate::api::{Handle, Value};
use crate::gl::constants::enum_to_string;

/// Resolves an object handle to the name shown in the diagram.
pub trait NameLookup {
    fn name_of(&self, handle: Handle) -> Option<String>;
}

/// Lookup that knows no names; objects render as their handle.
pub struct NoNames;

impl NameLookup for NoNames {
    fn name_of(&self, _handle: Handle) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formatter {
    /// Numbers with at most three decimals, trailing zeros dropped.
    General,
    /// `0x` followed by the two hex digits of the low byte.
    Hex2,
    /// GL enum names.
    Enum,
    /// Like `Enum`, but 0 and 1 read as `ZERO` and `ONE` (blend factors).
    EnumZero,
    Boolean,
    /// `null` or the registry display name.
    Object,
    /// Scalars and vectors inline, matrices one row per line.
    Uniform,
}

impl Formatter {
    pub fn format(self, value: &Value, names: &dyn NameLookup) -> String {
        match (self, value) {
            (_, Value::Null) => "null".to_string(),
            (Formatter::Uniform, Value::List(items)) => format_uniform(items, names),
            (_, Value::List(items)) => items
                .iter()
                .map(|v| self.format(v, names))
                .collect::<Vec<_>>()
                .join(", "),
            (_, Value::Object(handle)) => names
                .name_of(*handle)
                .unwrap_or_else(|| handle.to_string()),
            (_, Value::Str(s)) => s.clone(),
            (Formatter::Boolean, v) => v.truthy().to_string(),
            (Formatter::Hex2, v) => match v.as_i64() {
                Some(n) => format!("0x{:02x}", n & 0xff),
                None => format_general(v),
            },
            (Formatter::Enum, v) => match v.as_i64() {
                Some(n) => enum_to_string(n),
                None => format_general(v),
            },
            (Formatter::EnumZero, v) => match v.as_i64() {
                Some(0) => "ZERO".to_string(),
                Some(1) => "ONE".to_string(),
                Some(n) => enum_to_string(n),
                None => format_general(v),
            },
            (Formatter::General | Formatter::Object | Formatter::Uniform, v) => {
                format_general(v)
            }
        }
    }
}

fn format_general(value: &Value) -> String {
    match *value {
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(f) => format_number(f),
        _ => String::new(),
    }
}

/// Three decimals, then trailing zeros and a dangling dot removed.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let text = format!("{:.3}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

fn format_uniform(items: &[Value], names: &dyn NameLookup) -> String {
    let cells: Vec<String> = items
        .iter()
        .map(|v| Formatter::Uniform.format(v, names))
        .collect();
    if cells.len() <= 4 {
        return cells.join(", ");
    }
    let row = if cells.len() % 3 == 0 { 3 } else { 4 };
    cells
        .chunks(row)
        .map(|chunk| chunk.join(", "))
        .collect::<Vec<_>>()
        .join(",\n")
}

#[cfg(test)]
mod tests;
