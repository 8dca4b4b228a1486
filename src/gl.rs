// src/gl.rs
//! The observed graphics API: WebGL 1 constants and a software context.

pub mod constants;
pub mod context;
pub mod program;

pub use context::{SoftGl, MAX_TEXTURE_UNITS, MAX_VERTEX_ATTRIBS};
