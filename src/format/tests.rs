// src/format/tests.rs

use super::*;
use crate::gl::constants::{BLEND, LESS, SRC_ALPHA};
use std::collections::HashMap;
use test_log::test;

struct Names(HashMap<Handle, String>);

impl NameLookup for Names {
    fn name_of(&self, handle: Handle) -> Option<String> {
        self.0.get(&handle).cloned()
    }
}

fn floats(values: &[f64]) -> Value {
    Value::List(values.iter().copied().map(Value::Float).collect())
}

#[test]
fn general_trims_trailing_zeros() {
    assert_eq!(Formatter::General.format(&Value::Float(1.0), &NoNames), "1");
    assert_eq!(Formatter::General.format(&Value::Float(0.5), &NoNames), "0.5");
    assert_eq!(
        Formatter::General.format(&Value::Float(0.123456), &NoNames),
        "0.123"
    );
    assert_eq!(Formatter::General.format(&Value::Float(-0.0001), &NoNames), "0");
    assert_eq!(Formatter::General.format(&Value::Int(300), &NoNames), "300");
}

#[test]
fn general_joins_lists() {
    assert_eq!(
        Formatter::General.format(&floats(&[0.0, 0.25, 1.0, 1.0]), &NoNames),
        "0, 0.25, 1, 1"
    );
}

#[test]
fn hex2_uses_low_byte() {
    assert_eq!(Formatter::Hex2.format(&Value::Int(0xFF), &NoNames), "0xff");
    assert_eq!(Formatter::Hex2.format(&Value::Int(0x0A), &NoNames), "0x0a");
    assert_eq!(
        Formatter::Hex2.format(&Value::Int(0xFFFF_FFFF), &NoNames),
        "0xff"
    );
}

#[test]
fn enum_names_values() {
    assert_eq!(Formatter::Enum.format(&Value::Int(LESS as i64), &NoNames), "LESS");
    assert_eq!(Formatter::Enum.format(&Value::Int(BLEND as i64), &NoNames), "BLEND");
    assert_eq!(Formatter::Enum.format(&Value::Int(0x9999), &NoNames), "0x9999");
}

#[test]
fn enum_zero_spells_zero_and_one() {
    assert_eq!(Formatter::EnumZero.format(&Value::Int(0), &NoNames), "ZERO");
    assert_eq!(Formatter::EnumZero.format(&Value::Int(1), &NoNames), "ONE");
    assert_eq!(
        Formatter::EnumZero.format(&Value::Int(SRC_ALPHA as i64), &NoNames),
        "SRC_ALPHA"
    );
}

#[test]
fn boolean_lists() {
    let mask = Value::List(vec![Value::Bool(true), Value::Bool(false)]);
    assert_eq!(Formatter::Boolean.format(&mask, &NoNames), "true, false");
}

#[test]
fn object_uses_lookup() {
    let h = Handle::new(4);
    let names = Names(HashMap::from([(h, "tex".to_string())]));
    assert_eq!(Formatter::Object.format(&Value::Object(h), &names), "tex");
    assert_eq!(Formatter::Object.format(&Value::Object(h), &NoNames), "#4");
    assert_eq!(Formatter::Object.format(&Value::Null, &names), "null");
}

#[test]
fn uniform_breaks_matrices_into_rows() {
    let v4 = floats(&[1.0, 2.0, 3.0, 4.0]);
    assert_eq!(Formatter::Uniform.format(&v4, &NoNames), "1, 2, 3, 4");
    let m3 = floats(&[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
    assert_eq!(
        Formatter::Uniform.format(&m3, &NoNames),
        "1, 0, 0,\n0, 1, 0,\n0, 0, 1"
    );
    let m4 = floats(&[0.0; 16]);
    assert_eq!(
        Formatter::Uniform.format(&m4, &NoNames).lines().count(),
        4
    );
}

#[test]
fn same_value_formats_the_same() {
    let v = floats(&[0.1, 0.2, 0.3]);
    assert_eq!(
        Formatter::General.format(&v, &NoNames),
        Formatter::General.format(&v.clone(), &NoNames)
    );
}
