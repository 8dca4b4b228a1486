// src/gl/context.rs
//! `SoftGl`: a software model of the WebGL 1 state machine.
//!
//! Nothing is rasterized. The context only tracks the state a lesson can
//! observe (capabilities, fixed-function parameters, bindings and objects) so
//! the diagram has a real API to intercept and query.

use std::collections::{HashMap, HashSet};

use log::trace;

use super::constants::*;
use super::program::{self, Declaration, ProgramInterface, Scalar};
use crate::api::{Handle, ObservedApi, Value};
use crate::error::ApiError;

pub const MAX_TEXTURE_UNITS: usize = 8;
pub const MAX_VERTEX_ATTRIBS: usize = 8;

const DEFAULT_CANVAS_WIDTH: i64 = 300;
const DEFAULT_CANVAS_HEIGHT: i64 = 150;

static OPERATIONS: &[&str] = &[
    "activeTexture",
    "attachShader",
    "bindAttribLocation",
    "bindBuffer",
    "bindTexture",
    "blendColor",
    "blendEquation",
    "blendEquationSeparate",
    "blendFunc",
    "blendFuncSeparate",
    "bufferData",
    "clear",
    "clearColor",
    "clearDepth",
    "clearStencil",
    "colorMask",
    "compileShader",
    "createBuffer",
    "createProgram",
    "createShader",
    "createTexture",
    "cullFace",
    "deleteBuffer",
    "deleteProgram",
    "deleteShader",
    "deleteTexture",
    "depthFunc",
    "depthMask",
    "depthRange",
    "disable",
    "disableVertexAttribArray",
    "drawArrays",
    "enable",
    "enableVertexAttribArray",
    "frontFace",
    "getActiveAttrib",
    "getActiveUniform",
    "getAttachedShaders",
    "getAttribLocation",
    "getParameter",
    "getProgramParameter",
    "getShaderParameter",
    "getShaderSource",
    "getTexParameter",
    "getUniform",
    "getUniformLocation",
    "getVertexAttrib",
    "getVertexAttribOffset",
    "lineWidth",
    "linkProgram",
    "pixelStorei",
    "polygonOffset",
    "sampleCoverage",
    "scissor",
    "shaderSource",
    "stencilFunc",
    "stencilFuncSeparate",
    "stencilMask",
    "stencilMaskSeparate",
    "stencilOp",
    "stencilOpSeparate",
    "texParameteri",
    "uniform1f",
    "uniform1fv",
    "uniform1i",
    "uniform1iv",
    "uniform2f",
    "uniform2fv",
    "uniform2i",
    "uniform2iv",
    "uniform3f",
    "uniform3fv",
    "uniform3i",
    "uniform3iv",
    "uniform4f",
    "uniform4fv",
    "uniform4i",
    "uniform4iv",
    "uniformMatrix2fv",
    "uniformMatrix3fv",
    "uniformMatrix4fv",
    "useProgram",
    "vertexAttrib4f",
    "vertexAttribPointer",
    "viewport",
];

const CAPABILITIES: &[u32] = &[
    BLEND,
    CULL_FACE,
    DEPTH_TEST,
    DITHER,
    POLYGON_OFFSET_FILL,
    SAMPLE_ALPHA_TO_COVERAGE,
    SAMPLE_COVERAGE,
    SCISSOR_TEST,
    STENCIL_TEST,
];

const COMPARE_FUNCS: &[u32] = &[NEVER, LESS, EQUAL, LEQUAL, GREATER, NOTEQUAL, GEQUAL, ALWAYS];

const BLEND_FUNCS: &[u32] = &[
    ZERO,
    ONE,
    SRC_COLOR,
    ONE_MINUS_SRC_COLOR,
    DST_COLOR,
    ONE_MINUS_DST_COLOR,
    SRC_ALPHA,
    ONE_MINUS_SRC_ALPHA,
    DST_ALPHA,
    ONE_MINUS_DST_ALPHA,
    CONSTANT_COLOR,
    ONE_MINUS_CONSTANT_COLOR,
    CONSTANT_ALPHA,
    ONE_MINUS_CONSTANT_ALPHA,
    SRC_ALPHA_SATURATE,
];

const BLEND_EQUATIONS: &[u32] = &[FUNC_ADD, FUNC_SUBTRACT, FUNC_REVERSE_SUBTRACT];

const STENCIL_OPS: &[u32] = &[KEEP, ZERO, REPLACE, INCR, INCR_WRAP, DECR, DECR_WRAP, INVERT];

const TEXTURE_PARAMS: &[u32] = &[
    TEXTURE_WRAP_S,
    TEXTURE_WRAP_T,
    TEXTURE_MIN_FILTER,
    TEXTURE_MAG_FILTER,
];

const DATA_TYPES: &[u32] = &[BYTE, UNSIGNED_BYTE, SHORT, UNSIGNED_SHORT, INT, UNSIGNED_INT, FLOAT];

#[derive(Debug, Clone)]
enum GlObject {
    Texture {
        target: Option<u32>,
        params: HashMap<u32, i64>,
    },
    Buffer {
        data: Vec<f64>,
        usage: u32,
    },
    Shader {
        kind: u32,
        source: String,
        compiled: bool,
        /// Attribute and uniform declarations of the last successful compile.
        declarations: Vec<Declaration>,
    },
    Program {
        shaders: Vec<Handle>,
        linked: bool,
        /// Locations requested with `bindAttribLocation`, applied at link.
        bindings: HashMap<String, i64>,
        interface: ProgramInterface,
    },
}

impl GlObject {
    fn kind_name(&self) -> &'static str {
        match self {
            GlObject::Texture { .. } => "texture",
            GlObject::Buffer { .. } => "buffer",
            GlObject::Shader { .. } => "shader",
            GlObject::Program { .. } => "program",
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    object: GlObject,
    deleted: bool,
}

#[derive(Debug, Clone)]
struct VertexAttrib {
    enabled: bool,
    value: [f64; 4],
    size: i64,
    data_type: u32,
    normalized: bool,
    stride: i64,
    offset: i64,
    buffer: Option<Handle>,
}

impl Default for VertexAttrib {
    fn default() -> Self {
        VertexAttrib {
            enabled: false,
            value: [0.0, 0.0, 0.0, 1.0],
            size: 4,
            data_type: FLOAT,
            normalized: false,
            stride: 0,
            offset: 0,
            buffer: None,
        }
    }
}

/// Positional argument reader for one entry-point call.
struct Args<'a> {
    op: &'a str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    fn expect(&self, count: usize) -> Result<(), ApiError> {
        if self.values.len() != count {
            return Err(ApiError::Arity {
                op: self.op.to_string(),
                expected: count,
                got: self.values.len(),
            });
        }
        Ok(())
    }

    fn invalid(&self, index: usize, expected: &'static str) -> ApiError {
        ApiError::InvalidArgument {
            op: self.op.to_string(),
            index,
            expected,
        }
    }

    fn get(&self, index: usize) -> &'a Value {
        static NULL: Value = Value::Null;
        self.values.get(index).unwrap_or(&NULL)
    }

    fn int(&self, index: usize) -> Result<i64, ApiError> {
        self.get(index)
            .as_i64()
            .ok_or_else(|| self.invalid(index, "an integer"))
    }

    fn float(&self, index: usize) -> Result<f64, ApiError> {
        self.get(index)
            .as_f64()
            .ok_or_else(|| self.invalid(index, "a number"))
    }

    fn boolean(&self, index: usize) -> bool {
        self.get(index).truthy()
    }

    fn object(&self, index: usize) -> Result<Option<Handle>, ApiError> {
        self.get(index)
            .as_object()
            .ok_or_else(|| self.invalid(index, "an object or null"))
    }

    fn required_object(&self, index: usize) -> Result<Handle, ApiError> {
        self.object(index)?
            .ok_or_else(|| self.invalid(index, "a non-null object"))
    }

    fn string(&self, index: usize) -> Result<&'a str, ApiError> {
        self.get(index)
            .as_str()
            .ok_or_else(|| self.invalid(index, "a string"))
    }

    /// Reads an enum argument and checks it against the allowed set.
    fn enum_of(&self, index: usize, allowed: &[u32]) -> Result<u32, ApiError> {
        let value = self.int(index)?;
        match u32::try_from(value) {
            Ok(v) if allowed.contains(&v) => Ok(v),
            _ => Err(ApiError::InvalidEnum {
                op: self.op.to_string(),
                value,
            }),
        }
    }

    fn floats(&self, range: std::ops::Range<usize>) -> Result<Value, ApiError> {
        let items = range
            .map(|i| self.float(i).map(Value::Float))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::List(items))
    }

    fn ints(&self, range: std::ops::Range<usize>) -> Result<Value, ApiError> {
        let items = range
            .map(|i| self.int(i).map(Value::Int))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::List(items))
    }
}

/// Software WebGL 1 context.
#[derive(Debug, Clone)]
pub struct SoftGl {
    objects: Vec<Slot>,
    enabled: HashSet<u32>,
    params: HashMap<u32, Value>,
    active_unit: usize,
    units: Vec<[Option<Handle>; 2]>,
    array_buffer: Option<Handle>,
    element_array_buffer: Option<Handle>,
    current_program: Option<Handle>,
    attribs: Vec<VertexAttrib>,
}

impl Default for SoftGl {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftGl {
    /// Creates a context with WebGL 1 default state for a 300x150 canvas.
    pub fn new() -> Self {
        let floats = |v: &[f64]| Value::List(v.iter().copied().map(Value::Float).collect());
        let ints = |v: &[i64]| Value::List(v.iter().copied().map(Value::Int).collect());
        let all_bits = Value::Int(0xFFFF_FFFF);

        let mut params = HashMap::new();
        params.insert(DEPTH_FUNC, Value::Int(LESS as i64));
        params.insert(DEPTH_RANGE, floats(&[0.0, 1.0]));
        params.insert(DEPTH_WRITEMASK, Value::Bool(true));
        params.insert(DEPTH_CLEAR_VALUE, Value::Float(1.0));
        params.insert(BLEND_SRC_RGB, Value::Int(ONE as i64));
        params.insert(BLEND_SRC_ALPHA, Value::Int(ONE as i64));
        params.insert(BLEND_DST_RGB, Value::Int(ZERO as i64));
        params.insert(BLEND_DST_ALPHA, Value::Int(ZERO as i64));
        params.insert(BLEND_EQUATION_RGB, Value::Int(FUNC_ADD as i64));
        params.insert(BLEND_EQUATION_ALPHA, Value::Int(FUNC_ADD as i64));
        params.insert(BLEND_COLOR, floats(&[0.0, 0.0, 0.0, 0.0]));
        params.insert(COLOR_CLEAR_VALUE, floats(&[0.0, 0.0, 0.0, 0.0]));
        params.insert(STENCIL_CLEAR_VALUE, Value::Int(0));
        params.insert(
            VIEWPORT,
            ints(&[0, 0, DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT]),
        );
        params.insert(
            SCISSOR_BOX,
            ints(&[0, 0, DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT]),
        );
        params.insert(
            COLOR_WRITEMASK,
            Value::List(vec![Value::Bool(true); 4]),
        );
        params.insert(CULL_FACE_MODE, Value::Int(BACK as i64));
        params.insert(FRONT_FACE, Value::Int(CCW as i64));
        params.insert(LINE_WIDTH, Value::Float(1.0));
        params.insert(POLYGON_OFFSET_FACTOR, Value::Float(0.0));
        params.insert(POLYGON_OFFSET_UNITS, Value::Float(0.0));
        params.insert(SAMPLE_COVERAGE_VALUE, Value::Float(1.0));
        params.insert(SAMPLE_COVERAGE_INVERT, Value::Bool(false));
        params.insert(UNPACK_ALIGNMENT, Value::Int(4));
        params.insert(PACK_ALIGNMENT, Value::Int(4));
        for (func, reference, mask) in [
            (STENCIL_FUNC, STENCIL_REF, STENCIL_VALUE_MASK),
            (STENCIL_BACK_FUNC, STENCIL_BACK_REF, STENCIL_BACK_VALUE_MASK),
        ] {
            params.insert(func, Value::Int(ALWAYS as i64));
            params.insert(reference, Value::Int(0));
            params.insert(mask, all_bits.clone());
        }
        for pname in [
            STENCIL_FAIL,
            STENCIL_PASS_DEPTH_FAIL,
            STENCIL_PASS_DEPTH_PASS,
            STENCIL_BACK_FAIL,
            STENCIL_BACK_PASS_DEPTH_FAIL,
            STENCIL_BACK_PASS_DEPTH_PASS,
        ] {
            params.insert(pname, Value::Int(KEEP as i64));
        }
        params.insert(STENCIL_WRITEMASK, all_bits.clone());
        params.insert(STENCIL_BACK_WRITEMASK, all_bits);

        let mut enabled = HashSet::new();
        enabled.insert(DITHER);

        SoftGl {
            objects: Vec::new(),
            enabled,
            params,
            active_unit: 0,
            units: vec![[None, None]; MAX_TEXTURE_UNITS],
            array_buffer: None,
            element_array_buffer: None,
            current_program: None,
            attribs: vec![VertexAttrib::default(); MAX_VERTEX_ATTRIBS],
        }
    }

    /// Number of objects ever created, deleted ones included.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    // --- Object arena ---

    fn create(&mut self, object: GlObject) -> Value {
        let handle = Handle::new(self.objects.len() as u32);
        trace!("SoftGl: created {} {}", object.kind_name(), handle);
        self.objects.push(Slot {
            object,
            deleted: false,
        });
        Value::Object(handle)
    }

    fn live(&self, op: &str, handle: Handle) -> Result<&GlObject, ApiError> {
        match self.objects.get(handle.index() as usize) {
            Some(slot) if !slot.deleted => Ok(&slot.object),
            Some(_) => Err(invalid_op(op, format!("object {} was deleted", handle))),
            None => Err(invalid_op(op, format!("object {} does not exist", handle))),
        }
    }

    /// An object whether or not it was deleted. A deleted shader stays
    /// usable by the programs it is still attached to.
    fn any(&self, handle: Handle) -> Option<&GlObject> {
        self.objects
            .get(handle.index() as usize)
            .map(|slot| &slot.object)
    }

    fn live_mut(&mut self, op: &str, handle: Handle) -> Result<&mut GlObject, ApiError> {
        match self.objects.get_mut(handle.index() as usize) {
            Some(slot) if !slot.deleted => Ok(&mut slot.object),
            Some(_) => Err(invalid_op(op, format!("object {} was deleted", handle))),
            None => Err(invalid_op(op, format!("object {} does not exist", handle))),
        }
    }

    fn expect_kind(
        &self,
        op: &str,
        handle: Handle,
        kind: &'static str,
    ) -> Result<&GlObject, ApiError> {
        let object = self.live(op, handle)?;
        if object.kind_name() != kind {
            return Err(invalid_op(
                op,
                format!("{} is a {}, not a {}", handle, object.kind_name(), kind),
            ));
        }
        Ok(object)
    }

    fn delete(&mut self, a: &Args, kind: &'static str) -> Result<Value, ApiError> {
        a.expect(1)?;
        let Some(handle) = a.object(0)? else {
            return Ok(Value::Null);
        };
        match self.objects.get(handle.index() as usize) {
            // Deleting twice is silently ignored, as in GL.
            Some(slot) if slot.deleted => return Ok(Value::Null),
            Some(_) => {
                self.expect_kind(a.op, handle, kind)?;
            }
            None => return Err(invalid_op(a.op, format!("object {} does not exist", handle))),
        }
        self.objects[handle.index() as usize].deleted = true;
        self.unbind_everywhere(handle);
        trace!("SoftGl: deleted {} {}", kind, handle);
        Ok(Value::Null)
    }

    fn unbind_everywhere(&mut self, handle: Handle) {
        let clear = |slot: &mut Option<Handle>| {
            if *slot == Some(handle) {
                *slot = None;
            }
        };
        for unit in &mut self.units {
            unit.iter_mut().for_each(clear);
        }
        clear(&mut self.array_buffer);
        clear(&mut self.element_array_buffer);
        clear(&mut self.current_program);
        for attrib in &mut self.attribs {
            clear(&mut attrib.buffer);
        }
    }

    // --- Textures ---

    fn target_slot(target: u32) -> usize {
        if target == TEXTURE_CUBE_MAP {
            1
        } else {
            0
        }
    }

    fn bound_texture(&self, target: u32) -> Option<Handle> {
        self.units[self.active_unit][Self::target_slot(target)]
    }

    fn bind_texture(&mut self, a: &Args) -> Result<Value, ApiError> {
        a.expect(2)?;
        let target = a.enum_of(0, &[TEXTURE_2D, TEXTURE_CUBE_MAP])?;
        let texture = a.object(1)?;
        if let Some(handle) = texture {
            self.expect_kind(a.op, handle, "texture")?;
            if let GlObject::Texture { target: bound, .. } = self.live_mut(a.op, handle)? {
                match *bound {
                    Some(existing) if existing != target => {
                        return Err(invalid_op(
                            a.op,
                            format!("{} was already bound to a different target", handle),
                        ));
                    }
                    _ => *bound = Some(target),
                }
            }
        }
        self.units[self.active_unit][Self::target_slot(target)] = texture;
        Ok(Value::Null)
    }

    fn tex_parameter(&mut self, a: &Args) -> Result<Value, ApiError> {
        a.expect(3)?;
        let target = a.enum_of(0, &[TEXTURE_2D, TEXTURE_CUBE_MAP])?;
        let pname = a.enum_of(1, TEXTURE_PARAMS)?;
        let param = a.int(2)?;
        let allowed: &[u32] = match pname {
            TEXTURE_WRAP_S | TEXTURE_WRAP_T => &[REPEAT, CLAMP_TO_EDGE, MIRRORED_REPEAT],
            TEXTURE_MAG_FILTER => &[NEAREST, LINEAR],
            _ => &[
                NEAREST,
                LINEAR,
                NEAREST_MIPMAP_NEAREST,
                LINEAR_MIPMAP_NEAREST,
                NEAREST_MIPMAP_LINEAR,
                LINEAR_MIPMAP_LINEAR,
            ],
        };
        a.enum_of(2, allowed)?;
        let handle = self
            .bound_texture(target)
            .ok_or_else(|| invalid_op(a.op, "no texture bound to target".to_string()))?;
        if let GlObject::Texture { params, .. } = self.live_mut(a.op, handle)? {
            params.insert(pname, param);
        }
        Ok(Value::Null)
    }

    fn get_tex_parameter(&self, a: &Args) -> Result<Value, ApiError> {
        a.expect(2)?;
        let target = a.enum_of(0, &[TEXTURE_2D, TEXTURE_CUBE_MAP])?;
        let pname = a.enum_of(1, TEXTURE_PARAMS)?;
        let Some(handle) = self.bound_texture(target) else {
            return Ok(Value::Null);
        };
        let GlObject::Texture { params, .. } = self.live(a.op, handle)? else {
            return Ok(Value::Null);
        };
        let default = match pname {
            TEXTURE_WRAP_S | TEXTURE_WRAP_T => REPEAT,
            TEXTURE_MIN_FILTER => NEAREST_MIPMAP_LINEAR,
            _ => LINEAR,
        };
        Ok(Value::Int(
            params.get(&pname).copied().unwrap_or(default as i64),
        ))
    }

    // --- Buffers ---

    fn bind_buffer(&mut self, a: &Args) -> Result<Value, ApiError> {
        a.expect(2)?;
        let target = a.enum_of(0, &[ARRAY_BUFFER, ELEMENT_ARRAY_BUFFER])?;
        let buffer = a.object(1)?;
        if let Some(handle) = buffer {
            self.expect_kind(a.op, handle, "buffer")?;
        }
        if target == ARRAY_BUFFER {
            self.array_buffer = buffer;
        } else {
            self.element_array_buffer = buffer;
        }
        Ok(Value::Null)
    }

    fn buffer_data(&mut self, a: &Args) -> Result<Value, ApiError> {
        a.expect(3)?;
        let target = a.enum_of(0, &[ARRAY_BUFFER, ELEMENT_ARRAY_BUFFER])?;
        let usage = a.enum_of(2, &[STREAM_DRAW, STATIC_DRAW, DYNAMIC_DRAW])?;
        let contents = match a.get(1) {
            Value::List(items) => items
                .iter()
                .map(|v| v.as_f64().ok_or_else(|| a.invalid(1, "a list of numbers")))
                .collect::<Result<Vec<_>, _>>()?,
            other => {
                let size = other
                    .as_i64()
                    .filter(|s| *s >= 0)
                    .ok_or_else(|| a.invalid(1, "a size or a list of numbers"))?;
                vec![0.0; size as usize]
            }
        };
        let bound = if target == ARRAY_BUFFER {
            self.array_buffer
        } else {
            self.element_array_buffer
        };
        let handle = bound.ok_or_else(|| invalid_op(a.op, "no buffer bound to target".to_string()))?;
        if let GlObject::Buffer { data, usage: u } = self.live_mut(a.op, handle)? {
            *data = contents;
            *u = usage;
        }
        Ok(Value::Null)
    }

    // --- Shaders and programs ---

    fn shader_source(&mut self, a: &Args) -> Result<Value, ApiError> {
        a.expect(2)?;
        let handle = a.required_object(0)?;
        let text = a.string(1)?.to_string();
        self.expect_kind(a.op, handle, "shader")?;
        if let GlObject::Shader { source, .. } = self.live_mut(a.op, handle)? {
            *source = text;
        }
        Ok(Value::Null)
    }

    fn compile_shader(&mut self, a: &Args) -> Result<Value, ApiError> {
        a.expect(1)?;
        let handle = a.required_object(0)?;
        self.expect_kind(a.op, handle, "shader")?;
        if let GlObject::Shader {
            source,
            compiled,
            declarations,
            ..
        } = self.live_mut(a.op, handle)?
        {
            *compiled = source.contains("void main");
            *declarations = if *compiled {
                program::scan(source).map_err(|e| invalid_op(a.op, e.to_string()))?
            } else {
                Vec::new()
            };
        }
        Ok(Value::Null)
    }

    fn shader_type(&self, op: &str, handle: Handle) -> Result<u32, ApiError> {
        match self.expect_kind(op, handle, "shader")? {
            GlObject::Shader { kind, .. } => Ok(*kind),
            _ => unreachable!("expect_kind checked the kind"),
        }
    }

    fn attach_shader(&mut self, a: &Args) -> Result<Value, ApiError> {
        a.expect(2)?;
        let program = a.required_object(0)?;
        let shader = a.required_object(1)?;
        let kind = self.shader_type(a.op, shader)?;
        self.expect_kind(a.op, program, "program")?;
        let attached: Vec<Handle> = match self.live(a.op, program)? {
            GlObject::Program { shaders, .. } => shaders.clone(),
            _ => Vec::new(),
        };
        if attached.contains(&shader) {
            return Err(invalid_op(a.op, format!("{} is already attached", shader)));
        }
        for existing in &attached {
            let existing_kind = match self.any(*existing) {
                Some(GlObject::Shader { kind, .. }) => Some(*kind),
                _ => None,
            };
            if existing_kind == Some(kind) {
                return Err(invalid_op(
                    a.op,
                    "a shader of that type is already attached".to_string(),
                ));
            }
        }
        if let GlObject::Program { shaders, .. } = self.live_mut(a.op, program)? {
            shaders.push(shader);
        }
        Ok(Value::Null)
    }

    fn link_program(&mut self, a: &Args) -> Result<Value, ApiError> {
        a.expect(1)?;
        let program = a.required_object(0)?;
        self.expect_kind(a.op, program, "program")?;
        let shaders = match self.live(a.op, program)? {
            GlObject::Program { shaders, .. } => shaders.clone(),
            _ => Vec::new(),
        };
        // Attached shaders link even after deleteShader; GL only flags them.
        let mut vertex: Option<&[Declaration]> = None;
        let mut fragment: Option<&[Declaration]> = None;
        for shader in &shaders {
            if let Some(GlObject::Shader {
                kind,
                compiled: true,
                declarations,
                ..
            }) = self.any(*shader)
            {
                match *kind {
                    VERTEX_SHADER => vertex = Some(declarations.as_slice()),
                    _ => fragment = Some(declarations.as_slice()),
                }
            }
        }
        let linked_interface = match (vertex, fragment) {
            (Some(vertex), Some(fragment)) => {
                let bindings = match self.live(a.op, program)? {
                    GlObject::Program { bindings, .. } => bindings.clone(),
                    _ => HashMap::new(),
                };
                Some(ProgramInterface::link(vertex, fragment, &bindings))
            }
            _ => None,
        };
        if let GlObject::Program {
            linked, interface, ..
        } = self.live_mut(a.op, program)?
        {
            *linked = linked_interface.is_some();
            *interface = linked_interface.unwrap_or_default();
        }
        Ok(Value::Null)
    }

    fn use_program(&mut self, a: &Args) -> Result<Value, ApiError> {
        a.expect(1)?;
        let program = a.object(0)?;
        if let Some(handle) = program {
            match self.expect_kind(a.op, handle, "program")? {
                GlObject::Program { linked: true, .. } => {}
                _ => return Err(invalid_op(a.op, format!("{} is not linked", handle))),
            }
        }
        self.current_program = program;
        Ok(Value::Null)
    }

    fn get_shader_parameter(&self, a: &Args) -> Result<Value, ApiError> {
        a.expect(2)?;
        let handle = a.required_object(0)?;
        let pname = a.enum_of(1, &[SHADER_TYPE, COMPILE_STATUS, DELETE_STATUS])?;
        let GlObject::Shader { kind, compiled, .. } = self.expect_kind(a.op, handle, "shader")?
        else {
            unreachable!("expect_kind checked the kind");
        };
        Ok(match pname {
            SHADER_TYPE => Value::Int(*kind as i64),
            COMPILE_STATUS => Value::Bool(*compiled),
            _ => Value::Bool(false),
        })
    }

    fn get_program_parameter(&self, a: &Args) -> Result<Value, ApiError> {
        a.expect(2)?;
        let handle = a.required_object(0)?;
        let pname = a.enum_of(
            1,
            &[
                LINK_STATUS,
                ATTACHED_SHADERS,
                DELETE_STATUS,
                ACTIVE_ATTRIBUTES,
                ACTIVE_UNIFORMS,
            ],
        )?;
        let (shaders, linked, interface) = self.program(a.op, handle)?;
        Ok(match pname {
            LINK_STATUS => Value::Bool(linked),
            ATTACHED_SHADERS => Value::Int(shaders.len() as i64),
            ACTIVE_ATTRIBUTES => Value::Int(interface.attributes.len() as i64),
            ACTIVE_UNIFORMS => Value::Int(interface.uniforms.len() as i64),
            _ => Value::Bool(false),
        })
    }

    fn program(
        &self,
        op: &str,
        handle: Handle,
    ) -> Result<(&[Handle], bool, &ProgramInterface), ApiError> {
        match self.expect_kind(op, handle, "program")? {
            GlObject::Program {
                shaders,
                linked,
                interface,
                ..
            } => Ok((shaders.as_slice(), *linked, interface)),
            _ => Err(invalid_op(op, format!("{} is not a program", handle))),
        }
    }

    /// Interface of a linked program; querying an unlinked one is an error.
    fn linked_interface(&self, a: &Args) -> Result<&ProgramInterface, ApiError> {
        let handle = a.required_object(0)?;
        match self.program(a.op, handle)? {
            (_, true, interface) => Ok(interface),
            _ => Err(invalid_op(a.op, format!("{} is not linked", handle))),
        }
    }

    // --- Program interface ---

    fn bind_attrib_location(&mut self, a: &Args) -> Result<Value, ApiError> {
        a.expect(3)?;
        let program = a.required_object(0)?;
        let index = a.int(1)?;
        if !(0..MAX_VERTEX_ATTRIBS as i64).contains(&index) {
            return Err(a.invalid(1, "a vertex attribute index below MAX_VERTEX_ATTRIBS"));
        }
        let name = a.string(2)?.to_string();
        if name.starts_with("gl_") || name.starts_with("webgl_") {
            return Err(invalid_op(a.op, format!("'{}' is reserved", name)));
        }
        self.expect_kind(a.op, program, "program")?;
        if let GlObject::Program { bindings, .. } = self.live_mut(a.op, program)? {
            bindings.insert(name, index);
        }
        Ok(Value::Null)
    }

    fn get_active(&self, a: &Args) -> Result<Value, ApiError> {
        a.expect(2)?;
        let interface = self.linked_interface(a)?;
        let index = a.int(1)?;
        let info = match a.op {
            "getActiveAttrib" => usize::try_from(index)
                .ok()
                .and_then(|i| interface.attributes.get(i))
                .map(|(info, _)| info),
            _ => usize::try_from(index)
                .ok()
                .and_then(|i| interface.uniforms.get(i))
                .map(|slot| &slot.info),
        };
        info.map(|info| info.to_value())
            .ok_or_else(|| a.invalid(1, "an index below the active count"))
    }

    fn uniform_slot_index(&self, a: &Args, interface: &ProgramInterface) -> Result<usize, ApiError> {
        usize::try_from(a.int(1)?)
            .ok()
            .filter(|&l| l < interface.uniforms.len())
            .ok_or_else(|| invalid_op(a.op, "location does not belong to this program".to_string()))
    }

    /// `uniform{1-4}{f,i}[v]` and `uniformMatrix{2-4}fv` on the current
    /// program. A null location is ignored.
    fn uniform(&mut self, a: &Args) -> Result<Value, ApiError> {
        let setter = UniformSetter::parse(a.op)
            .ok_or_else(|| ApiError::UnknownOperation(a.op.to_string()))?;
        a.expect(setter.arity())?;
        if matches!(a.get(0), Value::Null) {
            return Ok(Value::Null);
        }
        let location = a.int(0)?;
        let data = setter.data(a)?;
        let current = self
            .current_program
            .ok_or_else(|| invalid_op(a.op, "no program in use".to_string()))?;
        let GlObject::Program { interface, .. } = self.live_mut(a.op, current)? else {
            return Err(invalid_op(a.op, "current program is not a program".to_string()));
        };
        let slot = usize::try_from(location)
            .ok()
            .and_then(|l| interface.uniforms.get_mut(l))
            .ok_or_else(|| {
                invalid_op(a.op, "location does not belong to the current program".to_string())
            })?;
        let (scalar, components) = program::shape(slot.info.kind);
        let type_matches = components == setter.components
            && match scalar {
                Scalar::Float => setter.float,
                Scalar::Int => !setter.float,
                Scalar::Bool => true,
            };
        if !type_matches {
            return Err(invalid_op(
                a.op,
                format!("'{}' is {}", slot.info.name, enum_to_string(slot.info.kind as i64)),
            ));
        }
        if data.is_empty() || data.len() % components != 0 {
            return Err(a.invalid(setter.data_index(), "a multiple of the uniform's size"));
        }
        slot.write(&data);
        trace!("SoftGl: uniform {} = {:?}", slot.info.name, data);
        Ok(Value::Null)
    }

    // --- Vertex attributes ---

    fn attrib_index(&self, a: &Args) -> Result<usize, ApiError> {
        let index = a.int(0)?;
        usize::try_from(index)
            .ok()
            .filter(|i| *i < self.attribs.len())
            .ok_or_else(|| a.invalid(0, "a vertex attribute index below MAX_VERTEX_ATTRIBS"))
    }

    fn vertex_attrib_pointer(&mut self, a: &Args) -> Result<Value, ApiError> {
        a.expect(6)?;
        let index = self.attrib_index(a)?;
        let size = a.int(1)?;
        if !(1..=4).contains(&size) {
            return Err(a.invalid(1, "a size between 1 and 4"));
        }
        let data_type = a.enum_of(2, DATA_TYPES)?;
        let normalized = a.boolean(3);
        let stride = a.int(4)?;
        let offset = a.int(5)?;
        let buffer = self.array_buffer.ok_or_else(|| {
            invalid_op(a.op, "no buffer bound to ARRAY_BUFFER".to_string())
        })?;
        let attrib = &mut self.attribs[index];
        attrib.size = size;
        attrib.data_type = data_type;
        attrib.normalized = normalized;
        attrib.stride = stride;
        attrib.offset = offset;
        attrib.buffer = Some(buffer);
        Ok(Value::Null)
    }

    fn get_vertex_attrib(&self, a: &Args) -> Result<Value, ApiError> {
        a.expect(2)?;
        let index = self.attrib_index(a)?;
        let pname = a.enum_of(
            1,
            &[
                VERTEX_ATTRIB_ARRAY_ENABLED,
                VERTEX_ATTRIB_ARRAY_SIZE,
                VERTEX_ATTRIB_ARRAY_STRIDE,
                VERTEX_ATTRIB_ARRAY_TYPE,
                VERTEX_ATTRIB_ARRAY_NORMALIZED,
                VERTEX_ATTRIB_ARRAY_BUFFER_BINDING,
                CURRENT_VERTEX_ATTRIB,
            ],
        )?;
        let attrib = &self.attribs[index];
        Ok(match pname {
            VERTEX_ATTRIB_ARRAY_ENABLED => Value::Bool(attrib.enabled),
            VERTEX_ATTRIB_ARRAY_SIZE => Value::Int(attrib.size),
            VERTEX_ATTRIB_ARRAY_STRIDE => Value::Int(attrib.stride),
            VERTEX_ATTRIB_ARRAY_TYPE => Value::Int(attrib.data_type as i64),
            VERTEX_ATTRIB_ARRAY_NORMALIZED => Value::Bool(attrib.normalized),
            VERTEX_ATTRIB_ARRAY_BUFFER_BINDING => Value::from_object(attrib.buffer),
            _ => Value::List(attrib.value.iter().copied().map(Value::Float).collect()),
        })
    }

    // --- Parameters ---

    fn get_parameter(&self, a: &Args) -> Result<Value, ApiError> {
        a.expect(1)?;
        let pname = a.int(0)?;
        let Ok(pname) = u32::try_from(pname) else {
            return Err(ApiError::InvalidEnum {
                op: a.op.to_string(),
                value: pname,
            });
        };
        if CAPABILITIES.contains(&pname) {
            return Ok(Value::Bool(self.enabled.contains(&pname)));
        }
        let value = match pname {
            ARRAY_BUFFER_BINDING => Value::from_object(self.array_buffer),
            ELEMENT_ARRAY_BUFFER_BINDING => Value::from_object(self.element_array_buffer),
            CURRENT_PROGRAM => Value::from_object(self.current_program),
            TEXTURE_BINDING_2D => Value::from_object(self.bound_texture(TEXTURE_2D)),
            TEXTURE_BINDING_CUBE_MAP => Value::from_object(self.bound_texture(TEXTURE_CUBE_MAP)),
            ACTIVE_TEXTURE => Value::Int((TEXTURE0 as usize + self.active_unit) as i64),
            other => self.params.get(&other).cloned().ok_or(ApiError::InvalidEnum {
                op: a.op.to_string(),
                value: other as i64,
            })?,
        };
        Ok(value)
    }

    fn set(&mut self, pname: u32, value: Value) -> Result<Value, ApiError> {
        self.params.insert(pname, value);
        Ok(Value::Null)
    }

    fn faces(&self, a: &Args, index: usize) -> Result<(bool, bool), ApiError> {
        let face = a.enum_of(index, &[FRONT, BACK, FRONT_AND_BACK])?;
        Ok((face != BACK, face != FRONT))
    }

    fn stencil_func(&mut self, a: &Args, front: bool, back: bool, at: usize) -> Result<Value, ApiError> {
        let func = a.enum_of(at, COMPARE_FUNCS)?;
        let reference = a.int(at + 1)?;
        let mask = a.int(at + 2)?;
        if front {
            self.params.insert(STENCIL_FUNC, Value::Int(func as i64));
            self.params.insert(STENCIL_REF, Value::Int(reference));
            self.params.insert(STENCIL_VALUE_MASK, Value::Int(mask));
        }
        if back {
            self.params.insert(STENCIL_BACK_FUNC, Value::Int(func as i64));
            self.params.insert(STENCIL_BACK_REF, Value::Int(reference));
            self.params.insert(STENCIL_BACK_VALUE_MASK, Value::Int(mask));
        }
        Ok(Value::Null)
    }

    fn stencil_op(&mut self, a: &Args, front: bool, back: bool, at: usize) -> Result<Value, ApiError> {
        let fail = a.enum_of(at, STENCIL_OPS)? as i64;
        let zfail = a.enum_of(at + 1, STENCIL_OPS)? as i64;
        let zpass = a.enum_of(at + 2, STENCIL_OPS)? as i64;
        if front {
            self.params.insert(STENCIL_FAIL, Value::Int(fail));
            self.params.insert(STENCIL_PASS_DEPTH_FAIL, Value::Int(zfail));
            self.params.insert(STENCIL_PASS_DEPTH_PASS, Value::Int(zpass));
        }
        if back {
            self.params.insert(STENCIL_BACK_FAIL, Value::Int(fail));
            self.params.insert(STENCIL_BACK_PASS_DEPTH_FAIL, Value::Int(zfail));
            self.params.insert(STENCIL_BACK_PASS_DEPTH_PASS, Value::Int(zpass));
        }
        Ok(Value::Null)
    }

    fn stencil_mask(&mut self, mask: i64, front: bool, back: bool) -> Result<Value, ApiError> {
        if front {
            self.params.insert(STENCIL_WRITEMASK, Value::Int(mask));
        }
        if back {
            self.params.insert(STENCIL_BACK_WRITEMASK, Value::Int(mask));
        }
        Ok(Value::Null)
    }

    fn dispatch(&mut self, a: &Args) -> Result<Value, ApiError> {
        match a.op {
            "enable" | "disable" => {
                a.expect(1)?;
                let cap = a.enum_of(0, CAPABILITIES)?;
                if a.op == "enable" {
                    self.enabled.insert(cap);
                } else {
                    self.enabled.remove(&cap);
                }
                Ok(Value::Null)
            }
            "depthFunc" => {
                a.expect(1)?;
                let func = a.enum_of(0, COMPARE_FUNCS)?;
                self.set(DEPTH_FUNC, Value::Int(func as i64))
            }
            "depthRange" => {
                a.expect(2)?;
                let near = a.float(0)?.clamp(0.0, 1.0);
                let far = a.float(1)?.clamp(0.0, 1.0);
                self.set(DEPTH_RANGE, Value::List(vec![near.into(), far.into()]))
            }
            "depthMask" => {
                a.expect(1)?;
                self.set(DEPTH_WRITEMASK, Value::Bool(a.boolean(0)))
            }
            "blendFunc" => {
                a.expect(2)?;
                let src = a.enum_of(0, BLEND_FUNCS)? as i64;
                let dst = a.enum_of(1, BLEND_FUNCS)? as i64;
                self.params.insert(BLEND_SRC_RGB, Value::Int(src));
                self.params.insert(BLEND_SRC_ALPHA, Value::Int(src));
                self.params.insert(BLEND_DST_RGB, Value::Int(dst));
                self.set(BLEND_DST_ALPHA, Value::Int(dst))
            }
            "blendFuncSeparate" => {
                a.expect(4)?;
                let pnames = [BLEND_SRC_RGB, BLEND_DST_RGB, BLEND_SRC_ALPHA, BLEND_DST_ALPHA];
                for (i, pname) in pnames.into_iter().enumerate() {
                    let func = a.enum_of(i, BLEND_FUNCS)?;
                    self.params.insert(pname, Value::Int(func as i64));
                }
                Ok(Value::Null)
            }
            "blendEquation" => {
                a.expect(1)?;
                let mode = a.enum_of(0, BLEND_EQUATIONS)? as i64;
                self.params.insert(BLEND_EQUATION_RGB, Value::Int(mode));
                self.set(BLEND_EQUATION_ALPHA, Value::Int(mode))
            }
            "blendEquationSeparate" => {
                a.expect(2)?;
                let rgb = a.enum_of(0, BLEND_EQUATIONS)? as i64;
                let alpha = a.enum_of(1, BLEND_EQUATIONS)? as i64;
                self.params.insert(BLEND_EQUATION_RGB, Value::Int(rgb));
                self.set(BLEND_EQUATION_ALPHA, Value::Int(alpha))
            }
            "blendColor" => {
                a.expect(4)?;
                let color = a.floats(0..4)?;
                self.set(BLEND_COLOR, color)
            }
            "clearColor" => {
                a.expect(4)?;
                let color = a.floats(0..4)?;
                self.set(COLOR_CLEAR_VALUE, color)
            }
            "clearDepth" => {
                a.expect(1)?;
                let depth = a.float(0)?.clamp(0.0, 1.0);
                self.set(DEPTH_CLEAR_VALUE, Value::Float(depth))
            }
            "clearStencil" => {
                a.expect(1)?;
                let s = a.int(0)?;
                self.set(STENCIL_CLEAR_VALUE, Value::Int(s))
            }
            "viewport" | "scissor" => {
                a.expect(4)?;
                let rect = a.ints(0..4)?;
                let pname = if a.op == "viewport" { VIEWPORT } else { SCISSOR_BOX };
                self.set(pname, rect)
            }
            "colorMask" => {
                a.expect(4)?;
                let mask = (0..4).map(|i| Value::Bool(a.boolean(i))).collect();
                self.set(COLOR_WRITEMASK, Value::List(mask))
            }
            "cullFace" => {
                a.expect(1)?;
                let mode = a.enum_of(0, &[FRONT, BACK, FRONT_AND_BACK])?;
                self.set(CULL_FACE_MODE, Value::Int(mode as i64))
            }
            "frontFace" => {
                a.expect(1)?;
                let mode = a.enum_of(0, &[CW, CCW])?;
                self.set(FRONT_FACE, Value::Int(mode as i64))
            }
            "lineWidth" => {
                a.expect(1)?;
                let width = a.float(0)?;
                self.set(LINE_WIDTH, Value::Float(width))
            }
            "polygonOffset" => {
                a.expect(2)?;
                let factor = a.float(0)?;
                let units = a.float(1)?;
                self.params.insert(POLYGON_OFFSET_FACTOR, Value::Float(factor));
                self.set(POLYGON_OFFSET_UNITS, Value::Float(units))
            }
            "sampleCoverage" => {
                a.expect(2)?;
                let value = a.float(0)?.clamp(0.0, 1.0);
                self.params.insert(SAMPLE_COVERAGE_VALUE, Value::Float(value));
                self.set(SAMPLE_COVERAGE_INVERT, Value::Bool(a.boolean(1)))
            }
            "pixelStorei" => {
                a.expect(2)?;
                let pname = a.enum_of(0, &[UNPACK_ALIGNMENT, PACK_ALIGNMENT])?;
                let alignment = a.int(1)?;
                if ![1, 2, 4, 8].contains(&alignment) {
                    return Err(a.invalid(1, "1, 2, 4 or 8"));
                }
                self.set(pname, Value::Int(alignment))
            }
            "stencilFunc" => {
                a.expect(3)?;
                self.stencil_func(a, true, true, 0)
            }
            "stencilFuncSeparate" => {
                a.expect(4)?;
                let (front, back) = self.faces(a, 0)?;
                self.stencil_func(a, front, back, 1)
            }
            "stencilOp" => {
                a.expect(3)?;
                self.stencil_op(a, true, true, 0)
            }
            "stencilOpSeparate" => {
                a.expect(4)?;
                let (front, back) = self.faces(a, 0)?;
                self.stencil_op(a, front, back, 1)
            }
            "stencilMask" => {
                a.expect(1)?;
                let mask = a.int(0)?;
                self.stencil_mask(mask, true, true)
            }
            "stencilMaskSeparate" => {
                a.expect(2)?;
                let (front, back) = self.faces(a, 0)?;
                let mask = a.int(1)?;
                self.stencil_mask(mask, front, back)
            }
            "activeTexture" => {
                a.expect(1)?;
                let unit = a.int(0)? - TEXTURE0 as i64;
                if !(0..MAX_TEXTURE_UNITS as i64).contains(&unit) {
                    return Err(ApiError::InvalidEnum {
                        op: a.op.to_string(),
                        value: unit + TEXTURE0 as i64,
                    });
                }
                self.active_unit = unit as usize;
                Ok(Value::Null)
            }
            "createTexture" => {
                a.expect(0)?;
                Ok(self.create(GlObject::Texture {
                    target: None,
                    params: HashMap::new(),
                }))
            }
            "createBuffer" => {
                a.expect(0)?;
                Ok(self.create(GlObject::Buffer {
                    data: Vec::new(),
                    usage: STATIC_DRAW,
                }))
            }
            "createShader" => {
                a.expect(1)?;
                let kind = a.enum_of(0, &[VERTEX_SHADER, FRAGMENT_SHADER])?;
                Ok(self.create(GlObject::Shader {
                    kind,
                    source: String::new(),
                    compiled: false,
                    declarations: Vec::new(),
                }))
            }
            "createProgram" => {
                a.expect(0)?;
                Ok(self.create(GlObject::Program {
                    shaders: Vec::new(),
                    linked: false,
                    bindings: HashMap::new(),
                    interface: ProgramInterface::default(),
                }))
            }
            "deleteTexture" => self.delete(a, "texture"),
            "deleteBuffer" => self.delete(a, "buffer"),
            "deleteShader" => self.delete(a, "shader"),
            "deleteProgram" => self.delete(a, "program"),
            "bindTexture" => self.bind_texture(a),
            "texParameteri" => self.tex_parameter(a),
            "getTexParameter" => self.get_tex_parameter(a),
            "bindBuffer" => self.bind_buffer(a),
            "bufferData" => self.buffer_data(a),
            "shaderSource" => self.shader_source(a),
            "compileShader" => self.compile_shader(a),
            "getShaderSource" => {
                a.expect(1)?;
                let handle = a.required_object(0)?;
                match self.expect_kind(a.op, handle, "shader")? {
                    GlObject::Shader { source, .. } => Ok(Value::Str(source.clone())),
                    _ => Ok(Value::Null),
                }
            }
            "getShaderParameter" => self.get_shader_parameter(a),
            "attachShader" => self.attach_shader(a),
            "getAttachedShaders" => {
                a.expect(1)?;
                let handle = a.required_object(0)?;
                match self.expect_kind(a.op, handle, "program")? {
                    GlObject::Program { shaders, .. } => Ok(Value::List(
                        shaders.iter().copied().map(Value::Object).collect(),
                    )),
                    _ => Ok(Value::Null),
                }
            }
            "linkProgram" => self.link_program(a),
            "bindAttribLocation" => self.bind_attrib_location(a),
            "getActiveAttrib" | "getActiveUniform" => self.get_active(a),
            "getAttribLocation" => {
                a.expect(2)?;
                let name = a.string(1)?;
                Ok(Value::Int(self.linked_interface(a)?.attrib_location(name)))
            }
            "getUniformLocation" => {
                a.expect(2)?;
                let name = a.string(1)?;
                Ok(self
                    .linked_interface(a)?
                    .uniform_location(name)
                    .map_or(Value::Null, |l| Value::Int(l as i64)))
            }
            "getUniform" => {
                a.expect(2)?;
                let interface = self.linked_interface(a)?;
                let location = self.uniform_slot_index(a, interface)?;
                Ok(interface.uniforms[location].value())
            }
            op if op.starts_with("uniform") => self.uniform(a),
            "useProgram" => self.use_program(a),
            "getProgramParameter" => self.get_program_parameter(a),
            "enableVertexAttribArray" | "disableVertexAttribArray" => {
                a.expect(1)?;
                let index = self.attrib_index(a)?;
                self.attribs[index].enabled = a.op == "enableVertexAttribArray";
                Ok(Value::Null)
            }
            "vertexAttribPointer" => self.vertex_attrib_pointer(a),
            "vertexAttrib4f" => {
                a.expect(5)?;
                let index = self.attrib_index(a)?;
                for i in 0..4 {
                    self.attribs[index].value[i] = a.float(i + 1)?;
                }
                Ok(Value::Null)
            }
            "getVertexAttrib" => self.get_vertex_attrib(a),
            "getVertexAttribOffset" => {
                a.expect(2)?;
                let index = self.attrib_index(a)?;
                a.enum_of(1, &[VERTEX_ATTRIB_ARRAY_POINTER])?;
                Ok(Value::Int(self.attribs[index].offset))
            }
            "getParameter" => self.get_parameter(a),
            "clear" => {
                a.expect(1)?;
                let mask = a.int(0)?;
                let all = (COLOR_BUFFER_BIT | DEPTH_BUFFER_BIT | STENCIL_BUFFER_BIT) as i64;
                if mask & !all != 0 {
                    return Err(a.invalid(0, "a combination of *_BUFFER_BIT"));
                }
                Ok(Value::Null)
            }
            "drawArrays" => {
                a.expect(3)?;
                a.enum_of(0, &[TRIANGLES, TRIANGLE_STRIP, TRIANGLE_FAN])?;
                if self.current_program.is_none() {
                    return Err(invalid_op(a.op, "no program in use".to_string()));
                }
                Ok(Value::Null)
            }
            other => Err(ApiError::UnknownOperation(other.to_string())),
        }
    }
}

fn invalid_op(op: &str, reason: String) -> ApiError {
    ApiError::InvalidOperation {
        op: op.to_string(),
        reason,
    }
}

impl ObservedApi for SoftGl {
    fn operations(&self) -> Vec<&'static str> {
        OPERATIONS.to_vec()
    }

    fn invoke(&mut self, name: &str, args: &[Value]) -> Result<Value, ApiError> {
        trace!("SoftGl: {}({:?})", name, args);
        self.dispatch(&Args { op: name, values: args })
    }

    fn has_operation(&self, name: &str) -> bool {
        OPERATIONS.contains(&name)
    }
}

/// Shape of one `uniform*` entry point, read from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct UniformSetter {
    components: usize,
    float: bool,
    vector: bool,
    matrix: bool,
}

impl UniformSetter {
    fn parse(op: &str) -> Option<Self> {
        let rest = op.strip_prefix("uniform")?;
        if let Some(n) = rest.strip_prefix("Matrix").and_then(|m| m.strip_suffix("fv")) {
            let n: usize = n.parse().ok().filter(|n| (2..=4).contains(n))?;
            return Some(UniformSetter {
                components: n * n,
                float: true,
                vector: true,
                matrix: true,
            });
        }
        let mut chars = rest.chars();
        let components = chars.next()?.to_digit(10).filter(|n| (1..=4).contains(n))? as usize;
        let (float, vector) = match chars.as_str() {
            "f" => (true, false),
            "i" => (false, false),
            "fv" => (true, true),
            "iv" => (false, true),
            _ => return None,
        };
        Some(UniformSetter {
            components,
            float,
            vector,
            matrix: false,
        })
    }

    fn arity(&self) -> usize {
        match (self.matrix, self.vector) {
            (true, _) => 3,
            (false, true) => 2,
            (false, false) => 1 + self.components,
        }
    }

    fn data_index(&self) -> usize {
        if self.matrix {
            2
        } else {
            1
        }
    }

    fn data(&self, a: &Args) -> Result<Vec<f64>, ApiError> {
        if self.matrix && a.boolean(1) {
            return Err(a.invalid(1, "false: WebGL does not transpose"));
        }
        let read = |index: usize| -> Result<f64, ApiError> {
            if self.float {
                a.float(index)
            } else {
                a.int(index).map(|v| v as f64)
            }
        };
        if !self.vector {
            return (1..=self.components).map(read).collect();
        }
        let index = self.data_index();
        let items = a
            .get(index)
            .as_list()
            .ok_or_else(|| a.invalid(index, "a list of numbers"))?;
        items
            .iter()
            .map(|v| {
                let n = if self.float { v.as_f64() } else { v.as_i64().map(|i| i as f64) };
                n.ok_or_else(|| a.invalid(index, "a list of numbers"))
            })
            .collect()
    }
}
