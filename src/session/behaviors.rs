// src/session/behaviors.rs
//! What the diagram does for each wrapped operation.
//!
//! Three generic shapes cover most of the API:
//! - creation: call, name the new object, build its panel, register it
//! - deletion: call, unregister, tear the panel down, refresh bindings
//! - mutation: call, then run every table subscribed to the operation
//!
//! The remaining operations touch object panels, the binding grids or the
//! current program's uniforms and get their own behavior. Each of those still notifies subscribers at the end,
//! so a descriptor naming one of them as a setter is honored.
//!
//! Every behavior resolves object arguments through the registry before the
//! real call; an unregistered handle fails with `UnknownHandle`.

use log::{debug, info};

use super::views::ObjectKind;
use super::Diagram;
use crate::api::{Handle, ObservedApi, Value};
use crate::error::SessionError;
use crate::gl::constants::{ARRAY_BUFFER, CURRENT_PROGRAM, ELEMENT_ARRAY_BUFFER};
use crate::intercept::{behavior, Behavior, Interceptor, Original};
use crate::subscription::SubscriptionIndex;

const CREATIONS: &[&str] = &["createTexture", "createBuffer", "createShader", "createProgram"];

const DELETIONS: &[&str] = &["deleteTexture", "deleteBuffer", "deleteShader", "deleteProgram"];

const ATTRIBUTE_SETTERS: &[&str] = &[
    "enableVertexAttribArray",
    "disableVertexAttribArray",
    "vertexAttribPointer",
    "vertexAttrib4f",
];

/// Wraps every operation the diagram reacts to.
pub(super) fn install(
    interceptor: &mut Interceptor<Diagram>,
    subscriptions: &SubscriptionIndex,
) -> Result<(), SessionError> {
    for &operation in CREATIONS {
        if let Some(kind) = ObjectKind::created_by(operation) {
            interceptor.wrap(operation, creation(kind))?;
        }
    }
    for &operation in DELETIONS {
        interceptor.wrap(operation, deletion())?;
    }
    interceptor.wrap("bindTexture", bind_texture())?;
    interceptor.wrap("texParameteri", tex_parameter())?;
    interceptor.wrap("bindBuffer", bind_buffer())?;
    interceptor.wrap("bufferData", buffer_data())?;
    interceptor.wrap("shaderSource", shader_source())?;
    interceptor.wrap("compileShader", object_state())?;
    interceptor.wrap("linkProgram", link_program())?;
    interceptor.wrap("attachShader", attach_shader())?;
    for &operation in ATTRIBUTE_SETTERS {
        interceptor.wrap(operation, attributes())?;
    }
    let setters: Vec<&'static str> = interceptor
        .api()
        .operations()
        .into_iter()
        .filter(|op| op.starts_with("uniform"))
        .collect();
    for operation in setters {
        interceptor.wrap(operation, uniforms())?;
    }

    for operation in subscriptions.operations() {
        if !interceptor.is_wrapped(operation) {
            interceptor.wrap(operation, mutation())?;
        }
    }
    Ok(())
}

/// Checks handles, then runs the original.
fn call_checked(
    diagram: &Diagram,
    original: &mut Original<'_>,
    args: &[Value],
) -> Result<Value, SessionError> {
    diagram.check_handles(args)?;
    original.call(args)
}

fn arg_u32(args: &[Value], index: usize) -> Option<u32> {
    args.get(index).and_then(Value::as_u32)
}

fn arg_object(args: &[Value], index: usize) -> Option<Handle> {
    args.get(index).and_then(Value::as_object).flatten()
}

// --- Generic shapes ---

fn creation(kind: ObjectKind) -> Behavior<Diagram> {
    behavior(move |diagram: &mut Diagram, mut original, args| {
        let value = original.call(args)?;
        let Some(Some(handle)) = value.as_object() else {
            return Ok(value);
        };
        let name = diagram.names.name_for(&diagram.current_line);
        let panel = diagram.display.create_panel(kind.panel_kind(), &name)?;
        let view = diagram.build_view(kind, handle, panel, original.api())?;
        diagram.registry.register(handle, &name, panel, view)?;
        info!("Diagram: {} '{}' created", kind.panel_kind(), name);
        Ok(value)
    })
}

fn deletion() -> Behavior<Diagram> {
    behavior(|diagram: &mut Diagram, mut original, args| {
        let operation = original.operation();
        let value = original.call(args)?;
        let Some(handle) = arg_object(args, 0) else {
            return Ok(value);
        };
        let panel = diagram.registry.unregister(handle)?;
        diagram.display.remove(panel)?;
        let api = original.api();
        diagram.refresh_globals(api)?;
        diagram.notify(operation, api)?;
        Ok(value)
    })
}

fn mutation() -> Behavior<Diagram> {
    behavior(|diagram: &mut Diagram, mut original, args| {
        let value = call_checked(diagram, &mut original, args)?;
        let changed = diagram.notify(original.operation(), original.api())?;
        debug!("Diagram: {} changed {} cells", original.operation(), changed);
        Ok(value)
    })
}

// --- Object panels ---

fn bind_texture() -> Behavior<Diagram> {
    behavior(|diagram: &mut Diagram, mut original, args| {
        let value = call_checked(diagram, &mut original, args)?;
        let operation = original.operation();
        let api = original.api();
        if let (Some(target), Some(texture)) = (arg_u32(args, 0), arg_object(args, 1)) {
            diagram.texture_bound(texture, target, api)?;
        }
        diagram.update_active_texture_unit(api)?;
        diagram.notify(operation, api)?;
        Ok(value)
    })
}

fn tex_parameter() -> Behavior<Diagram> {
    behavior(|diagram: &mut Diagram, mut original, args| {
        let value = call_checked(diagram, &mut original, args)?;
        let operation = original.operation();
        let api = original.api();
        if let Some(target) = arg_u32(args, 0) {
            diagram.update_bound_texture(target, api)?;
        }
        diagram.notify(operation, api)?;
        Ok(value)
    })
}

fn bind_buffer() -> Behavior<Diagram> {
    behavior(|diagram: &mut Diagram, mut original, args| {
        let value = call_checked(diagram, &mut original, args)?;
        let operation = original.operation();
        let api = original.api();
        match arg_u32(args, 0) {
            Some(ARRAY_BUFFER) => {
                diagram.update_global("common state", api)?;
            }
            Some(ELEMENT_ARRAY_BUFFER) => {
                let table = diagram.vertex_array.table;
                diagram.update_table(table, api)?;
            }
            _ => {}
        }
        diagram.notify(operation, api)?;
        Ok(value)
    })
}

fn buffer_data() -> Behavior<Diagram> {
    behavior(|diagram: &mut Diagram, mut original, args| {
        let value = call_checked(diagram, &mut original, args)?;
        let operation = original.operation();
        let api = original.api();
        if let (Some(target), Some(data)) = (arg_u32(args, 0), args.get(1)) {
            diagram.buffer_uploaded(target, data, api)?;
        }
        diagram.notify(operation, api)?;
        Ok(value)
    })
}

fn shader_source() -> Behavior<Diagram> {
    behavior(|diagram: &mut Diagram, mut original, args| {
        let value = call_checked(diagram, &mut original, args)?;
        let operation = original.operation();
        let source = args.get(1).and_then(Value::as_str);
        if let (Some(shader), Some(source)) = (arg_object(args, 0), source) {
            diagram.shader_source_set(shader, source)?;
        }
        diagram.notify(operation, original.api())?;
        Ok(value)
    })
}

/// `compileShader`: refresh the shader's own state table.
fn object_state() -> Behavior<Diagram> {
    behavior(|diagram: &mut Diagram, mut original, args| {
        let value = call_checked(diagram, &mut original, args)?;
        let operation = original.operation();
        let api = original.api();
        if let Some(object) = arg_object(args, 0) {
            diagram.update_object_table(object, api)?;
        }
        diagram.notify(operation, api)?;
        Ok(value)
    })
}

/// Refreshes the state table and the attached list, which drops shaders
/// deleted since, then reads the program's attributes and uniforms.
fn link_program() -> Behavior<Diagram> {
    behavior(|diagram: &mut Diagram, mut original, args| {
        let value = call_checked(diagram, &mut original, args)?;
        let operation = original.operation();
        let api = original.api();
        if let Some(program) = arg_object(args, 0) {
            diagram.update_object_table(program, api)?;
            diagram.update_attached_shaders(program, api)?;
            diagram.scan_program(program, api)?;
        }
        diagram.notify(operation, api)?;
        Ok(value)
    })
}

fn attach_shader() -> Behavior<Diagram> {
    behavior(|diagram: &mut Diagram, mut original, args| {
        let value = call_checked(diagram, &mut original, args)?;
        let operation = original.operation();
        let api = original.api();
        if let Some(program) = arg_object(args, 0) {
            diagram.update_attached_shaders(program, api)?;
        }
        diagram.notify(operation, api)?;
        Ok(value)
    })
}

// --- Vertex attributes ---

fn attributes() -> Behavior<Diagram> {
    behavior(|diagram: &mut Diagram, mut original, args| {
        let value = call_checked(diagram, &mut original, args)?;
        let operation = original.operation();
        let api: &mut dyn ObservedApi = original.api();
        diagram.update_attributes(api, true)?;
        diagram.notify(operation, api)?;
        Ok(value)
    })
}

// --- Uniforms ---

/// `uniform*` setters write to the current program.
fn uniforms() -> Behavior<Diagram> {
    behavior(|diagram: &mut Diagram, mut original, args| {
        let value = call_checked(diagram, &mut original, args)?;
        let operation = original.operation();
        let api = original.api();
        let current = api.invoke("getParameter", &[Value::from(CURRENT_PROGRAM)])?;
        if let Some(Some(program)) = current.as_object() {
            let changed = diagram.update_uniforms(program, api)?;
            debug!("Diagram: {} changed {} uniforms", operation, changed);
        }
        diagram.notify(operation, api)?;
        Ok(value)
    })
}
