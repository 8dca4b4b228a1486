// src/gl/program.rs
//! The interface a linked program exposes: active attributes and uniforms.
//!
//! `SoftGl` has no GLSL compiler. A compiled shader's interface is read off
//! its top-level `attribute` and `uniform` declarations, one declarator per
//! statement. Linking merges both stages and hands out locations in
//! declaration order.

use std::collections::HashMap;

use regex::Regex;

use super::constants::*;
use crate::api::Value;

/// `attribute|uniform [precision] type name[N];`
const DECLARATION: &str = r"(?m)^\s*(attribute|uniform)\s+(?:(?:lowp|mediump|highp)\s+)?(\w+)\s+(\w+)\s*(?:\[\s*(\d+)\s*\])?\s*;";

/// Longest uniform array a declaration may ask for.
pub const MAX_ARRAY_SIZE: i64 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Attribute,
    Uniform,
}

/// One active variable, as `getActiveAttrib` and `getActiveUniform` report it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveInfo {
    /// Arrays carry a `[0]` suffix.
    pub name: String,
    pub size: i64,
    pub kind: u32,
}

impl ActiveInfo {
    /// Script-visible form: `[name, size, type]`.
    pub fn to_value(&self) -> Value {
        Value::List(vec![
            Value::Str(self.name.clone()),
            Value::Int(self.size),
            Value::from(self.kind),
        ])
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        match value.as_list()? {
            [name, size, kind] => Some(ActiveInfo {
                name: name.as_str()?.to_string(),
                size: size.as_i64()?,
                kind: kind.as_u32()?,
            }),
            _ => None,
        }
    }

    /// `gl_*` and `webgl_*` variables are never listed.
    pub fn is_built_in(&self) -> bool {
        self.name.starts_with("gl_") || self.name.starts_with("webgl_")
    }

    /// Name without the array suffix.
    pub fn base_name(&self) -> &str {
        self.name.strip_suffix("[0]").unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub storage: Storage,
    pub info: ActiveInfo,
}

/// GL type of a GLSL type name.
pub fn type_of(glsl: &str) -> Option<u32> {
    Some(match glsl {
        "float" => FLOAT,
        "vec2" => FLOAT_VEC2,
        "vec3" => FLOAT_VEC3,
        "vec4" => FLOAT_VEC4,
        "int" => INT,
        "ivec2" => INT_VEC2,
        "ivec3" => INT_VEC3,
        "ivec4" => INT_VEC4,
        "bool" => BOOL,
        "bvec2" => BOOL_VEC2,
        "bvec3" => BOOL_VEC3,
        "bvec4" => BOOL_VEC4,
        "mat2" => FLOAT_MAT2,
        "mat3" => FLOAT_MAT3,
        "mat4" => FLOAT_MAT4,
        "sampler2D" => SAMPLER_2D,
        "samplerCube" => SAMPLER_CUBE,
        _ => return None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    Float,
    Int,
    Bool,
}

/// Scalar kind and component count of a variable type.
pub fn shape(kind: u32) -> (Scalar, usize) {
    match kind {
        FLOAT_VEC2 => (Scalar::Float, 2),
        FLOAT_VEC3 => (Scalar::Float, 3),
        FLOAT_VEC4 => (Scalar::Float, 4),
        FLOAT_MAT2 => (Scalar::Float, 4),
        FLOAT_MAT3 => (Scalar::Float, 9),
        FLOAT_MAT4 => (Scalar::Float, 16),
        INT | SAMPLER_2D | SAMPLER_CUBE => (Scalar::Int, 1),
        INT_VEC2 => (Scalar::Int, 2),
        INT_VEC3 => (Scalar::Int, 3),
        INT_VEC4 => (Scalar::Int, 4),
        BOOL => (Scalar::Bool, 1),
        BOOL_VEC2 => (Scalar::Bool, 2),
        BOOL_VEC3 => (Scalar::Bool, 3),
        BOOL_VEC4 => (Scalar::Bool, 4),
        _ => (Scalar::Float, 1),
    }
}

/// Reads the attribute and uniform declarations of a shader source. Types
/// outside WebGL 1's basic set (structs, for one) are skipped.
pub fn scan(source: &str) -> Result<Vec<Declaration>, regex::Error> {
    let pattern = Regex::new(DECLARATION)?;
    let declarations = pattern
        .captures_iter(source)
        .filter_map(|caps| {
            let storage = if &caps[1] == "attribute" {
                Storage::Attribute
            } else {
                Storage::Uniform
            };
            let kind = type_of(&caps[2])?;
            let (name, size) = match caps.get(4) {
                Some(len) => {
                    let size = len
                        .as_str()
                        .parse::<i64>()
                        .ok()
                        .filter(|n| (1..=MAX_ARRAY_SIZE).contains(n))?;
                    (format!("{}[0]", &caps[3]), size)
                }
                None => (caps[3].to_string(), 1),
            };
            Some(Declaration {
                storage,
                info: ActiveInfo { name, size, kind },
            })
        })
        .collect();
    Ok(declarations)
}

// --- Linked interface ---

/// A linked uniform and its current value.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformSlot {
    pub info: ActiveInfo,
    /// Every element's components, flattened.
    values: Vec<f64>,
}

impl UniformSlot {
    fn new(info: ActiveInfo) -> Self {
        let (_, components) = shape(info.kind);
        let len = components * info.size.max(1) as usize;
        UniformSlot {
            info,
            values: vec![0.0; len],
        }
    }

    /// Writes consecutive elements from element 0. Data past the end of
    /// the array is dropped.
    pub fn write(&mut self, data: &[f64]) {
        let n = data.len().min(self.values.len());
        self.values[..n].copy_from_slice(&data[..n]);
    }

    /// Element 0, the way `getUniform` reports it: a scalar, or a list of
    /// components.
    pub fn value(&self) -> Value {
        let (scalar, components) = shape(self.info.kind);
        let convert = |v: f64| match scalar {
            Scalar::Float => Value::Float(v),
            Scalar::Int => Value::Int(v as i64),
            Scalar::Bool => Value::Bool(v != 0.0),
        };
        let mut first: Vec<Value> = self
            .values
            .iter()
            .take(components)
            .copied()
            .map(convert)
            .collect();
        if components == 1 {
            first.pop().unwrap_or_default()
        } else {
            Value::List(first)
        }
    }
}

/// What a successful link exposes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramInterface {
    /// Active attributes with their locations.
    pub attributes: Vec<(ActiveInfo, i64)>,
    /// Indexed by uniform location.
    pub uniforms: Vec<UniformSlot>,
}

impl ProgramInterface {
    /// Merges the two stages. An attribute named by `bindAttribLocation`
    /// gets that location; the rest take the lowest free ones. A uniform
    /// declared in both stages is listed once.
    pub fn link(
        vertex: &[Declaration],
        fragment: &[Declaration],
        bindings: &HashMap<String, i64>,
    ) -> Self {
        let declared: Vec<&ActiveInfo> = vertex
            .iter()
            .filter(|d| d.storage == Storage::Attribute)
            .map(|d| &d.info)
            .collect();
        let mut taken: Vec<i64> = declared
            .iter()
            .filter_map(|info| bindings.get(&info.name).copied())
            .collect();
        let mut attributes = Vec::with_capacity(declared.len());
        for info in declared {
            let location = match bindings.get(&info.name) {
                Some(&bound) => bound,
                None => {
                    let free = (0..).find(|l| !taken.contains(l)).unwrap_or(0);
                    taken.push(free);
                    free
                }
            };
            attributes.push((info.clone(), location));
        }

        let mut uniforms: Vec<UniformSlot> = Vec::new();
        for declaration in vertex.iter().chain(fragment) {
            if declaration.storage == Storage::Uniform
                && !uniforms.iter().any(|u| u.info.name == declaration.info.name)
            {
                uniforms.push(UniformSlot::new(declaration.info.clone()));
            }
        }
        ProgramInterface {
            attributes,
            uniforms,
        }
    }

    /// Location of an active attribute, or -1.
    pub fn attrib_location(&self, name: &str) -> i64 {
        self.attributes
            .iter()
            .find(|(info, _)| info.name == name)
            .map_or(-1, |&(_, location)| location)
    }

    /// Location of a uniform by its name, with or without the `[0]` suffix.
    pub fn uniform_location(&self, name: &str) -> Option<usize> {
        self.uniforms
            .iter()
            .position(|u| u.info.name == name || u.info.base_name() == name)
    }
}
