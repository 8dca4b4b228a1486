// src/state_table/descriptors.rs
//! Per-category state descriptors and the queries that read them.

use super::{QueryFn, StateDescriptor};
use crate::api::{Handle, Value};
use crate::error::ApiError;
use crate::format::Formatter;
use crate::gl::constants::lookup;

const ENABLE_DISABLE: &[&str] = &["enable", "disable"];
const BLEND_FUNC_SETTERS: &[&str] = &["blendFunc", "blendFuncSeparate"];
const BLEND_EQUATION_SETTERS: &[&str] = &["blendEquation", "blendEquationSeparate"];
const STENCIL_FUNC_SETTERS: &[&str] = &["stencilFunc", "stencilFuncSeparate"];
const STENCIL_OP_SETTERS: &[&str] = &["stencilOp", "stencilOpSeparate"];
const STENCIL_MASK_SETTERS: &[&str] = &["stencilMask", "stencilMaskSeparate"];

const fn state(
    query_key: &'static str,
    setters: &'static [&'static str],
    formatter: Formatter,
    help: &'static str,
) -> StateDescriptor {
    StateDescriptor {
        query_key,
        setters,
        formatter,
        help,
    }
}

// --- Global state ---

pub static COMMON_STATE: &[StateDescriptor] = &[
    state(
        "VIEWPORT",
        &["viewport"],
        Formatter::Uniform,
        "Where clip space maps to on the canvas: gl.viewport(x, y, width, height).",
    ),
    state(
        "ARRAY_BUFFER_BINDING",
        &[],
        Formatter::Object,
        "Buffer bound to ARRAY_BUFFER. vertexAttribPointer reads from this buffer.",
    ),
    state(
        "CURRENT_PROGRAM",
        &["useProgram"],
        Formatter::Object,
        "Program used by draw calls: gl.useProgram(someProgram).",
    ),
    state(
        "ACTIVE_TEXTURE",
        &["activeTexture"],
        Formatter::Enum,
        "Texture unit affected by bindTexture: gl.activeTexture(gl.TEXTURE0 + unit).",
    ),
];

pub static CLEAR_STATE: &[StateDescriptor] = &[
    state(
        "COLOR_CLEAR_VALUE",
        &["clearColor"],
        Formatter::Uniform,
        "Color used by gl.clear with COLOR_BUFFER_BIT: gl.clearColor(r, g, b, a).",
    ),
    state(
        "DEPTH_CLEAR_VALUE",
        &["clearDepth"],
        Formatter::General,
        "Depth used by gl.clear with DEPTH_BUFFER_BIT: gl.clearDepth(depth).",
    ),
    state(
        "STENCIL_CLEAR_VALUE",
        &["clearStencil"],
        Formatter::Hex2,
        "Stencil value used by gl.clear with STENCIL_BUFFER_BIT: gl.clearStencil(s).",
    ),
];

pub static DEPTH_STATE: &[StateDescriptor] = &[
    state(
        "DEPTH_TEST",
        ENABLE_DISABLE,
        Formatter::Uniform,
        "gl.enable(gl.DEPTH_TEST) / gl.disable(gl.DEPTH_TEST).",
    ),
    state(
        "DEPTH_FUNC",
        &["depthFunc"],
        Formatter::Enum,
        "Comparison used by the depth test: gl.depthFunc(func).",
    ),
    state(
        "DEPTH_RANGE",
        &["depthRange"],
        Formatter::Uniform,
        "How clip space z maps to depth values: gl.depthRange(zNear, zFar).",
    ),
    state(
        "DEPTH_WRITEMASK",
        &["depthMask"],
        Formatter::Boolean,
        "Whether the depth buffer is written: gl.depthMask(trueFalse).",
    ),
];

pub static BLEND_STATE: &[StateDescriptor] = &[
    state(
        "BLEND",
        ENABLE_DISABLE,
        Formatter::Boolean,
        "gl.enable(gl.BLEND) / gl.disable(gl.BLEND).",
    ),
    state(
        "BLEND_DST_RGB",
        BLEND_FUNC_SETTERS,
        Formatter::EnumZero,
        "Blend factor for destination RGB.",
    ),
    state(
        "BLEND_SRC_RGB",
        BLEND_FUNC_SETTERS,
        Formatter::EnumZero,
        "Blend factor for source RGB.",
    ),
    state(
        "BLEND_DST_ALPHA",
        BLEND_FUNC_SETTERS,
        Formatter::EnumZero,
        "Blend factor for destination alpha.",
    ),
    state(
        "BLEND_SRC_ALPHA",
        BLEND_FUNC_SETTERS,
        Formatter::EnumZero,
        "Blend factor for source alpha.",
    ),
    state(
        "BLEND_COLOR",
        &["blendColor"],
        Formatter::Uniform,
        "Constant color used by the CONSTANT_* blend factors: gl.blendColor(r, g, b, a).",
    ),
    state(
        "BLEND_EQUATION_RGB",
        BLEND_EQUATION_SETTERS,
        Formatter::Enum,
        "How source and destination RGB are combined.",
    ),
    state(
        "BLEND_EQUATION_ALPHA",
        BLEND_EQUATION_SETTERS,
        Formatter::Enum,
        "How source and destination alpha are combined.",
    ),
];

pub static MISC_STATE: &[StateDescriptor] = &[
    state(
        "COLOR_WRITEMASK",
        &["colorMask"],
        Formatter::Uniform,
        "Which color channels are written: gl.colorMask(r, g, b, a).",
    ),
    state(
        "SCISSOR_TEST",
        ENABLE_DISABLE,
        Formatter::Uniform,
        "gl.enable(gl.SCISSOR_TEST) / gl.disable(gl.SCISSOR_TEST).",
    ),
    state(
        "SCISSOR_BOX",
        &["scissor"],
        Formatter::Uniform,
        "Area drawing is limited to when the scissor test is on: gl.scissor(x, y, width, height).",
    ),
    state(
        "UNPACK_ALIGNMENT",
        &["pixelStorei"],
        Formatter::Uniform,
        "Row alignment of data uploaded with texImage2D: gl.pixelStorei(gl.UNPACK_ALIGNMENT, n).",
    ),
    state(
        "PACK_ALIGNMENT",
        &["pixelStorei"],
        Formatter::Uniform,
        "Row alignment of data read with readPixels: gl.pixelStorei(gl.PACK_ALIGNMENT, n).",
    ),
];

pub static STENCIL_STATE: &[StateDescriptor] = &[
    state(
        "STENCIL_TEST",
        ENABLE_DISABLE,
        Formatter::Uniform,
        "gl.enable(gl.STENCIL_TEST) / gl.disable(gl.STENCIL_TEST).",
    ),
    state(
        "STENCIL_FUNC",
        STENCIL_FUNC_SETTERS,
        Formatter::Enum,
        "Stencil test function for front facing triangles.",
    ),
    state(
        "STENCIL_FAIL",
        STENCIL_OP_SETTERS,
        Formatter::Enum,
        "Operation when the stencil test fails (front).",
    ),
    state(
        "STENCIL_PASS_DEPTH_FAIL",
        STENCIL_OP_SETTERS,
        Formatter::Enum,
        "Operation when the stencil test passes and the depth test fails (front).",
    ),
    state(
        "STENCIL_PASS_DEPTH_PASS",
        STENCIL_OP_SETTERS,
        Formatter::Enum,
        "Operation when both tests pass (front).",
    ),
    state(
        "STENCIL_REF",
        STENCIL_FUNC_SETTERS,
        Formatter::Hex2,
        "Reference value for the front stencil test.",
    ),
    state(
        "STENCIL_VALUE_MASK",
        STENCIL_FUNC_SETTERS,
        Formatter::Hex2,
        "Mask applied before the front stencil test.",
    ),
    state(
        "STENCIL_WRITEMASK",
        STENCIL_MASK_SETTERS,
        Formatter::Hex2,
        "Stencil write mask for front facing triangles.",
    ),
    state(
        "STENCIL_BACK_FUNC",
        STENCIL_FUNC_SETTERS,
        Formatter::Enum,
        "Stencil test function for back facing triangles.",
    ),
    state(
        "STENCIL_BACK_FAIL",
        STENCIL_OP_SETTERS,
        Formatter::Enum,
        "Operation when the stencil test fails (back).",
    ),
    state(
        "STENCIL_BACK_PASS_DEPTH_FAIL",
        STENCIL_OP_SETTERS,
        Formatter::Enum,
        "Operation when the stencil test passes and the depth test fails (back).",
    ),
    state(
        "STENCIL_BACK_PASS_DEPTH_PASS",
        STENCIL_OP_SETTERS,
        Formatter::Enum,
        "Operation when both tests pass (back).",
    ),
    state(
        "STENCIL_BACK_REF",
        STENCIL_FUNC_SETTERS,
        Formatter::Hex2,
        "Reference value for the back stencil test.",
    ),
    state(
        "STENCIL_BACK_VALUE_MASK",
        STENCIL_FUNC_SETTERS,
        Formatter::Hex2,
        "Mask applied before the back stencil test.",
    ),
    state(
        "STENCIL_BACK_WRITEMASK",
        STENCIL_MASK_SETTERS,
        Formatter::Hex2,
        "Stencil write mask for back facing triangles.",
    ),
];

pub static POLYGON_STATE: &[StateDescriptor] = &[
    state(
        "CULL_FACE",
        ENABLE_DISABLE,
        Formatter::Boolean,
        "Whether triangles are culled by facing: gl.enable(gl.CULL_FACE).",
    ),
    state(
        "CULL_FACE_MODE",
        &["cullFace"],
        Formatter::Enum,
        "Which faces are culled: FRONT, BACK or FRONT_AND_BACK.",
    ),
    state(
        "FRONT_FACE",
        &["frontFace"],
        Formatter::Enum,
        "Winding that counts as front facing: CW or CCW.",
    ),
    state(
        "POLYGON_OFFSET_UNITS",
        &["polygonOffset"],
        Formatter::Uniform,
        "Constant depth offset: gl.polygonOffset(factor, units).",
    ),
    state(
        "POLYGON_OFFSET_FACTOR",
        &["polygonOffset"],
        Formatter::Uniform,
        "Slope scaled depth offset: gl.polygonOffset(factor, units).",
    ),
];

/// Global tables in display order.
pub static GLOBAL_TABLES: &[(&str, &[StateDescriptor])] = &[
    ("common state", COMMON_STATE),
    ("clear state", CLEAR_STATE),
    ("depth state", DEPTH_STATE),
    ("blend state", BLEND_STATE),
    ("misc state", MISC_STATE),
    ("stencil state", STENCIL_STATE),
    ("polygon state", POLYGON_STATE),
];

// --- Object state ---

pub static TEXTURE_STATE: &[StateDescriptor] = &[
    state(
        "TEXTURE_WRAP_S",
        &["texParameteri"],
        Formatter::Enum,
        "What happens to s coordinates outside 0 to 1: REPEAT, CLAMP_TO_EDGE or MIRRORED_REPEAT.",
    ),
    state(
        "TEXTURE_WRAP_T",
        &["texParameteri"],
        Formatter::Enum,
        "What happens to t coordinates outside 0 to 1: REPEAT, CLAMP_TO_EDGE or MIRRORED_REPEAT.",
    ),
    state(
        "TEXTURE_MIN_FILTER",
        &["texParameteri"],
        Formatter::Enum,
        "How the texture is sampled when drawn smaller than its size.",
    ),
    state(
        "TEXTURE_MAG_FILTER",
        &["texParameteri"],
        Formatter::Enum,
        "How the texture is sampled when drawn larger than its size: NEAREST or LINEAR.",
    ),
];

pub static SHADER_STATE: &[StateDescriptor] = &[state(
    "COMPILE_STATUS",
    &["compileShader"],
    Formatter::Uniform,
    "Whether the last gl.compileShader succeeded.",
)];

pub static PROGRAM_STATE: &[StateDescriptor] = &[state(
    "LINK_STATUS",
    &["linkProgram"],
    Formatter::Uniform,
    "Whether the last gl.linkProgram succeeded.",
)];

pub static VERTEX_ARRAY_STATE: &[StateDescriptor] = &[state(
    "ELEMENT_ARRAY_BUFFER_BINDING",
    &[],
    Formatter::Object,
    "Buffer holding the indices used by gl.drawElements: gl.bindBuffer(gl.ELEMENT_ARRAY_BUFFER, someBuffer).",
)];

// --- Queries ---

fn pname(descriptor: &StateDescriptor) -> Result<Value, ApiError> {
    lookup(descriptor.query_key)
        .map(Value::from)
        .ok_or_else(|| ApiError::InvalidArgument {
            op: descriptor.query_key.to_string(),
            index: 0,
            expected: "a known GL constant",
        })
}

/// `getParameter(<query_key>)`.
pub fn parameter_query() -> QueryFn {
    Box::new(|api, descriptor| api.invoke("getParameter", &[pname(descriptor)?]))
}

/// `getTexParameter(target, <query_key>)` on the texture bound to `target`.
pub fn texture_query(target: u32) -> QueryFn {
    Box::new(move |api, descriptor| {
        api.invoke("getTexParameter", &[Value::from(target), pname(descriptor)?])
    })
}

/// `getShaderParameter(shader, <query_key>)`.
pub fn shader_query(shader: Handle) -> QueryFn {
    Box::new(move |api, descriptor| {
        api.invoke("getShaderParameter", &[Value::Object(shader), pname(descriptor)?])
    })
}

/// `getProgramParameter(program, <query_key>)`.
pub fn program_query(program: Handle) -> QueryFn {
    Box::new(move |api, descriptor| {
        api.invoke(
            "getProgramParameter",
            &[Value::Object(program), pname(descriptor)?],
        )
    })
}
