// src/session/tests.rs

use super::*;
use crate::display::{HeadlessProbe, HeadlessSurface};
use crate::error::{ParseBoundaryError, RegistryError};
use crate::gl::constants::{ARRAY_BUFFER, TEXTURE_2D, TEXTURE_BINDING_2D};
use crate::gl::SoftGl;
use test_log::test;

fn session() -> (Session, HeadlessProbe) {
    let (surface, probe) = HeadlessSurface::new();
    let session = Session::new(
        Box::new(SoftGl::new()),
        Box::new(surface),
        &SessionSettings::default(),
    )
    .unwrap();
    (session, probe)
}

/// Runs one statement the way the stepper would: naming line first.
fn run(session: &mut Session, script: &mut ScriptExecutor, text: &str) -> Option<Value> {
    session.set_current_line(text);
    let value = script.evaluate(session, text).unwrap();
    session.clear_current_line();
    value
}

fn handle(session: &Session, name: &str) -> Handle {
    session.diagram().object(name).unwrap().handle
}

fn global_text<'a>(session: &'a Session, table: &str, key: &str) -> &'a str {
    session
        .diagram()
        .global_table(table)
        .unwrap()
        .text(key)
        .unwrap()
}

// --- Construction ---

#[test]
fn initial_views_paint_without_flashing() {
    let (session, probe) = session();
    assert_eq!(probe.total_flashes(), 0);
    assert!(probe.panel("global state").is_some());
    assert!(probe.panel("default vertex array").is_some());
    assert_eq!(global_text(&session, "depth state", "DEPTH_TEST"), "false");
    assert_eq!(global_text(&session, "common state", "ACTIVE_TEXTURE"), "TEXTURE0");
    assert_eq!(global_text(&session, "common state", "ARRAY_BUFFER_BINDING"), "null");
    assert_eq!(session.diagram().texture_unit_text(0, 0), Some("null"));
    assert_eq!(session.diagram().attribute_text(0, "enabled"), Some("false"));
    assert!(session.diagram().registry().is_empty());
}

#[test]
fn subscribed_operations_are_wrapped() {
    let (session, _probe) = session();
    let wrapped = session.interceptor().wrapped();
    for op in ["enable", "blendFunc", "createTexture", "bindTexture", "vertexAttribPointer"] {
        assert!(wrapped.contains(&op), "{} is not wrapped", op);
    }
    assert!(!session.interceptor().is_wrapped("getParameter"));
}

#[test]
fn oversized_settings_are_clamped() {
    let (surface, _probe) = HeadlessSurface::new();
    let settings = SessionSettings {
        texture_units: 64,
        vertex_attribs: 2,
        ..SessionSettings::default()
    };
    let session = Session::new(Box::new(SoftGl::new()), Box::new(surface), &settings).unwrap();
    assert!(session.diagram().texture_unit_text(MAX_TEXTURE_UNITS - 1, 0).is_some());
    assert!(session.diagram().texture_unit_text(MAX_TEXTURE_UNITS, 0).is_none());
    assert!(session.diagram().attribute_text(1, "size").is_some());
    assert!(session.diagram().attribute_text(2, "size").is_none());
}

#[test]
fn bad_naming_pattern_is_rejected() {
    let (surface, _probe) = HeadlessSurface::new();
    let settings = SessionSettings {
        naming_pattern: "(unclosed".to_string(),
        ..SessionSettings::default()
    };
    let result = Session::new(Box::new(SoftGl::new()), Box::new(surface), &settings);
    assert!(matches!(result, Err(SessionError::NamingPattern(_))));
}

// --- Objects ---

#[test]
fn creation_names_object_and_builds_panel() {
    let (mut session, probe) = session();
    let mut script = ScriptExecutor::new();
    run(&mut session, &mut script, "const tex = gl.createTexture();");
    let record = session.diagram().object("tex").unwrap();
    assert_eq!(record.extra.kind(), ObjectKind::Texture);
    assert_eq!(probe.panel("tex"), Some(record.display));
    assert!(probe.is_attached(record.display));
}

#[test]
fn unnamed_creations_are_numbered_per_session() {
    let (mut first, probe) = session();
    let (mut second, _other) = session();
    let mut script = ScriptExecutor::new();
    run(&mut first, &mut script, "gl.createBuffer();");
    run(&mut first, &mut script, "gl.createShader(gl.VERTEX_SHADER);");
    run(&mut second, &mut script, "gl.createProgram();");
    assert!(probe.panel("unknown-1").is_some());
    assert!(probe.panel("unknown-2").is_some());
    assert!(second.diagram().object("unknown-1").is_some());
}

#[test]
fn deletion_removes_panel_and_rejects_reuse() {
    let (mut session, probe) = session();
    let mut script = ScriptExecutor::new();
    run(&mut session, &mut script, "const buf = gl.createBuffer();");
    let buf = handle(&session, "buf");
    let panel = session.diagram().panel_of(buf).unwrap();

    run(&mut session, &mut script, "gl.deleteBuffer(buf);");
    assert!(!probe.is_attached(panel));
    assert!(session.diagram().object("buf").is_none());

    let err = session.call("deleteBuffer", &[Value::Object(buf)]).unwrap_err();
    assert!(matches!(
        err,
        SessionError::Registry(RegistryError::AlreadyDeleted(h)) if h == buf
    ));
    let err = session
        .call("bindBuffer", &[Value::from(ARRAY_BUFFER), Value::Object(buf)])
        .unwrap_err();
    assert!(matches!(err, SessionError::Registry(RegistryError::UnknownHandle(_))));
}

#[test]
fn handles_from_unwrapped_calls_are_unknown() {
    let (mut session, _probe) = session();
    let raw = session.api().invoke("createTexture", &[]).unwrap();
    let err = session
        .call("bindTexture", &[Value::from(TEXTURE_2D), raw.clone()])
        .unwrap_err();
    assert!(matches!(err, SessionError::Registry(RegistryError::UnknownHandle(_))));
    // The real call never ran.
    let bound = session
        .api()
        .invoke("getParameter", &[Value::from(TEXTURE_BINDING_2D)])
        .unwrap();
    assert_eq!(bound, Value::Null);
}

// --- Global state ---

#[test]
fn mutation_flashes_changed_cells_once() {
    let (mut session, probe) = session();
    let mut script = ScriptExecutor::new();
    run(&mut session, &mut script, "gl.enable(gl.DEPTH_TEST);");
    assert_eq!(global_text(&session, "depth state", "DEPTH_TEST"), "true");
    let cell = session
        .diagram()
        .global_table("depth state")
        .unwrap()
        .cell("DEPTH_TEST")
        .unwrap();
    assert_eq!(probe.flash_count(cell), 1);

    run(&mut session, &mut script, "gl.enable(gl.DEPTH_TEST);");
    assert_eq!(probe.flash_count(cell), 1);
}

#[test]
fn multi_value_setter_updates_every_row() {
    let (mut session, _probe) = session();
    let mut script = ScriptExecutor::new();
    run(&mut session, &mut script, "gl.blendFunc(gl.SRC_ALPHA, gl.ONE_MINUS_SRC_ALPHA);");
    assert_eq!(global_text(&session, "blend state", "BLEND_SRC_RGB"), "SRC_ALPHA");
    assert_eq!(global_text(&session, "blend state", "BLEND_SRC_ALPHA"), "SRC_ALPHA");
    assert_eq!(
        global_text(&session, "blend state", "BLEND_DST_RGB"),
        "ONE_MINUS_SRC_ALPHA"
    );
}

#[test]
fn failed_calls_leave_tables_alone() {
    let (mut session, probe) = session();
    assert!(session.call("enable", &[Value::Int(7)]).is_err());
    assert_eq!(probe.total_flashes(), 0);
}

// --- Textures ---

#[test]
fn bind_texture_paints_table_unit_and_arrow() {
    let (mut session, probe) = session();
    let mut script = ScriptExecutor::new();
    run(&mut session, &mut script, "const tex = gl.createTexture();");
    let tex = handle(&session, "tex");
    assert_eq!(
        session.diagram().object_table(tex).unwrap().text("TEXTURE_WRAP_S"),
        None
    );

    run(&mut session, &mut script, "gl.bindTexture(gl.TEXTURE_2D, tex);");
    let table = session.diagram().object_table(tex).unwrap();
    assert_eq!(table.text("TEXTURE_WRAP_S"), Some("REPEAT"));
    assert_eq!(table.text("TEXTURE_MIN_FILTER"), Some("NEAREST_MIPMAP_LINEAR"));
    assert_eq!(session.diagram().texture_unit_text(0, 0), Some("tex"));

    let cell = session.diagram().texture_unit_cell(0, 0).unwrap();
    assert_eq!(probe.flash_count(cell), 1);
    let panel = session.diagram().panel_of(tex).unwrap();
    let links = session.diagram().arrows().links();
    assert_eq!(links.len(), 1);
    assert_eq!((links[0].from, links[0].to), (cell, panel));
    assert_eq!(links[0].color, "red");
}

#[test]
fn tex_parameter_updates_bound_texture() {
    let (mut session, _probe) = session();
    let mut script = ScriptExecutor::new();
    run(&mut session, &mut script, "const tex = gl.createTexture();");
    run(&mut session, &mut script, "gl.bindTexture(gl.TEXTURE_2D, tex);");
    run(
        &mut session,
        &mut script,
        "gl.texParameteri(gl.TEXTURE_2D, gl.TEXTURE_WRAP_S, gl.CLAMP_TO_EDGE);",
    );
    let tex = handle(&session, "tex");
    let table = session.diagram().object_table(tex).unwrap();
    assert_eq!(table.text("TEXTURE_WRAP_S"), Some("CLAMP_TO_EDGE"));
    assert_eq!(table.text("TEXTURE_WRAP_T"), Some("REPEAT"));
}

#[test]
fn other_units_follow_active_texture() {
    let (mut session, _probe) = session();
    let mut script = ScriptExecutor::new();
    run(&mut session, &mut script, "const cube = gl.createTexture();");
    run(&mut session, &mut script, "gl.activeTexture(gl.TEXTURE0 + 2);");
    run(&mut session, &mut script, "gl.bindTexture(gl.TEXTURE_CUBE_MAP, cube);");
    assert_eq!(global_text(&session, "common state", "ACTIVE_TEXTURE"), "TEXTURE2");
    assert_eq!(session.diagram().texture_unit_text(2, 1), Some("cube"));
    assert_eq!(session.diagram().texture_unit_text(0, 1), Some("null"));
}

#[test]
fn deleting_bound_texture_clears_unit_and_restores_active_unit() {
    let (mut session, _probe) = session();
    let mut script = ScriptExecutor::new();
    run(&mut session, &mut script, "const tex = gl.createTexture();");
    run(&mut session, &mut script, "gl.activeTexture(gl.TEXTURE1);");
    run(&mut session, &mut script, "gl.bindTexture(gl.TEXTURE_2D, tex);");
    run(&mut session, &mut script, "gl.activeTexture(gl.TEXTURE3);");
    assert_eq!(session.diagram().arrows().len(), 1);

    run(&mut session, &mut script, "gl.deleteTexture(tex);");
    assert_eq!(session.diagram().texture_unit_text(1, 0), Some("null"));
    assert!(session.diagram().arrows().is_empty());
    assert_eq!(global_text(&session, "common state", "ACTIVE_TEXTURE"), "TEXTURE3");
}

// --- Buffers ---

#[test]
fn buffer_data_shows_preview_and_flashes_every_upload() {
    let (mut session, probe) = session();
    let mut script = ScriptExecutor::new();
    run(&mut session, &mut script, "const buf = gl.createBuffer();");
    run(&mut session, &mut script, "gl.bindBuffer(gl.ARRAY_BUFFER, buf);");
    assert_eq!(global_text(&session, "common state", "ARRAY_BUFFER_BINDING"), "buf");

    let upload = "gl.bufferData(gl.ARRAY_BUFFER, new Float32Array([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]), gl.STATIC_DRAW);";
    run(&mut session, &mut script, upload);
    let buf = handle(&session, "buf");
    assert_eq!(
        session.diagram().object_text(buf),
        Some("1, 2, 3, 4, 5, 6, 7, 8, 9, ...")
    );
    let ObjectView::Buffer { data } = &session.diagram().object("buf").unwrap().extra else {
        panic!("buf is not a buffer");
    };
    let cell = data.element();
    assert_eq!(probe.flash_count(cell), 1);

    run(&mut session, &mut script, upload);
    assert_eq!(probe.flash_count(cell), 2);
}

#[test]
fn buffer_preview_handles_sizes_and_short_lists() {
    let short = Value::List(vec![Value::Float(0.5), Value::Int(2)]);
    assert_eq!(buffer_preview(&short, 9), "0.5, 2");
    assert_eq!(buffer_preview(&Value::Int(3), 9), "0, 0, 0");
    assert_eq!(buffer_preview(&Value::Int(4), 2), "0, 0, ...");
}

#[test]
fn element_array_binding_lives_on_vertex_array() {
    let (mut session, _probe) = session();
    let mut script = ScriptExecutor::new();
    run(&mut session, &mut script, "const indices = gl.createBuffer();");
    run(&mut session, &mut script, "gl.bindBuffer(gl.ELEMENT_ARRAY_BUFFER, indices);");
    let table = session.diagram().vertex_array_table().unwrap();
    assert_eq!(table.text("ELEMENT_ARRAY_BUFFER_BINDING"), Some("indices"));
    assert_eq!(global_text(&session, "common state", "ARRAY_BUFFER_BINDING"), "null");
}

// --- Shaders and programs ---

#[test]
fn shader_source_and_compile_status() {
    let (mut session, _probe) = session();
    let mut script = ScriptExecutor::new();
    run(&mut session, &mut script, "const vs = gl.createShader(gl.VERTEX_SHADER);");
    let vs = handle(&session, "vs");
    assert_eq!(
        session.diagram().object_table(vs).unwrap().text("COMPILE_STATUS"),
        Some("false")
    );
    run(&mut session, &mut script, "gl.shaderSource(vs, `void main() {}`);");
    assert_eq!(session.diagram().object_text(vs), Some("void main() {}"));
    run(&mut session, &mut script, "gl.compileShader(vs);");
    assert_eq!(
        session.diagram().object_table(vs).unwrap().text("COMPILE_STATUS"),
        Some("true")
    );
}

#[test]
fn attached_shaders_list_vertex_first_with_arrows() {
    let (mut session, _probe) = session();
    let mut script = ScriptExecutor::new();
    for line in [
        "const vs = gl.createShader(gl.VERTEX_SHADER);",
        "const fs = gl.createShader(gl.FRAGMENT_SHADER);",
        "gl.shaderSource(vs, 'void main() {}');",
        "gl.shaderSource(fs, 'void main() {}');",
        "gl.compileShader(vs);",
        "gl.compileShader(fs);",
        "const prog = gl.createProgram();",
        "gl.attachShader(prog, fs);",
        "gl.attachShader(prog, vs);",
        "gl.linkProgram(prog);",
    ] {
        run(&mut session, &mut script, line);
    }
    let (vs, fs, prog) = (
        handle(&session, "vs"),
        handle(&session, "fs"),
        handle(&session, "prog"),
    );
    let ObjectView::Program(view) = &session.diagram().object("prog").unwrap().extra else {
        panic!("prog is not a program");
    };
    assert_eq!(view.attached().collect::<Vec<_>>(), vec![vs, fs]);
    assert_eq!(session.diagram().arrows().len(), 2);
    assert_eq!(
        session.diagram().object_table(prog).unwrap().text("LINK_STATUS"),
        Some("true")
    );
}

#[test]
fn deleted_shader_still_links_and_leaves_the_list() {
    let (mut session, _probe) = session();
    let mut script = ScriptExecutor::new();
    for line in [
        "const vs = gl.createShader(gl.VERTEX_SHADER);",
        "const fs = gl.createShader(gl.FRAGMENT_SHADER);",
        "gl.shaderSource(vs, 'void main() {}');",
        "gl.shaderSource(fs, 'void main() {}');",
        "gl.compileShader(vs);",
        "gl.compileShader(fs);",
        "const prog = gl.createProgram();",
        "gl.attachShader(prog, vs);",
        "gl.deleteShader(vs);",
        "gl.attachShader(prog, fs);",
        "gl.linkProgram(prog);",
    ] {
        run(&mut session, &mut script, line);
    }
    let (fs, prog) = (handle(&session, "fs"), handle(&session, "prog"));
    assert_eq!(
        session.diagram().object_table(prog).unwrap().text("LINK_STATUS"),
        Some("true")
    );
    let ObjectView::Program(view) = &session.diagram().object("prog").unwrap().extra else {
        panic!("prog is not a program");
    };
    assert_eq!(view.attached().collect::<Vec<_>>(), vec![fs]);
    session.refresh_arrows().unwrap();
    assert_eq!(session.diagram().arrows().len(), 1);
}

const LESSON_SHADERS: [&str; 2] = [
    "gl.shaderSource(vs, `
attribute vec4 position;
attribute vec2 texcoord;
uniform vec2 u_offset;
void main() {
  gl_Position = position;
}
`);",
    "gl.shaderSource(fs, `
precision mediump float;
uniform vec4 u_color;
void main() {
  gl_FragColor = u_color;
}
`);",
];

fn linked_lesson(session: &mut Session, script: &mut ScriptExecutor) -> Handle {
    run(session, script, "const vs = gl.createShader(gl.VERTEX_SHADER);");
    run(session, script, "const fs = gl.createShader(gl.FRAGMENT_SHADER);");
    for line in LESSON_SHADERS {
        run(session, script, line);
    }
    for line in [
        "gl.compileShader(vs);",
        "gl.compileShader(fs);",
        "const prog = gl.createProgram();",
        "gl.attachShader(prog, vs);",
        "gl.attachShader(prog, fs);",
        "gl.linkProgram(prog);",
    ] {
        run(session, script, line);
    }
    handle(session, "prog")
}

#[test]
fn link_lists_attributes_and_uniforms() {
    let (mut session, _probe) = session();
    let mut script = ScriptExecutor::new();
    let prog = linked_lesson(&mut session, &mut script);
    let diagram = session.diagram();
    assert_eq!(diagram.program_attribute_text(prog, "position"), Some("0"));
    assert_eq!(diagram.program_attribute_text(prog, "texcoord"), Some("1"));
    assert_eq!(diagram.program_uniform_text(prog, "u_offset"), Some("0, 0"));
    assert_eq!(diagram.program_uniform_text(prog, "u_color"), Some("0, 0, 0, 0"));
    let ObjectView::Program(view) = &diagram.object("prog").unwrap().extra else {
        panic!("prog is not a program");
    };
    assert_eq!(view.uniform_names().collect::<Vec<_>>(), vec!["u_offset", "u_color"]);

    // A failed relink empties both tables.
    run(&mut session, &mut script, "gl.shaderSource(fs, '');");
    run(&mut session, &mut script, "gl.compileShader(fs);");
    run(&mut session, &mut script, "gl.linkProgram(prog);");
    let ObjectView::Program(view) = &session.diagram().object("prog").unwrap().extra else {
        panic!("prog is not a program");
    };
    assert_eq!(view.attribute_names().count(), 0);
    assert_eq!(view.uniform_names().count(), 0);
}

#[test]
fn uniform_setters_refresh_the_current_program() {
    let (mut session, screen) = session();
    let mut script = ScriptExecutor::new();
    let prog = linked_lesson(&mut session, &mut script);
    assert!(session.interceptor().is_wrapped("uniform4f"));
    assert!(session.interceptor().is_wrapped("uniformMatrix4fv"));
    let cell = session.diagram().program_uniform_cell(prog, "u_color").unwrap();
    for line in [
        "gl.useProgram(prog);",
        "const colorLoc = gl.getUniformLocation(prog, 'u_color');",
        "gl.uniform4f(colorLoc, 1, 0.5, 0, 1);",
    ] {
        run(&mut session, &mut script, line);
    }
    assert_eq!(
        session.diagram().program_uniform_text(prog, "u_color"),
        Some("1, 0.5, 0, 1")
    );
    assert_eq!(screen.flash_count(cell), 1);

    // Same value: nothing flashes. A null location is ignored.
    run(&mut session, &mut script, "gl.uniform4f(colorLoc, 1, 0.5, 0, 1);");
    run(&mut session, &mut script, "gl.uniform2f(null, 3, 4);");
    assert_eq!(screen.flash_count(cell), 1);
    assert_eq!(session.diagram().program_uniform_text(prog, "u_offset"), Some("0, 0"));

    let err = script
        .evaluate(&mut session, "gl.uniform3f(colorLoc, 1, 1, 1);")
        .unwrap_err();
    assert!(matches!(err, SessionError::Api(_)));
    assert_eq!(
        session.diagram().program_uniform_text(prog, "u_color"),
        Some("1, 0.5, 0, 1")
    );
}

// --- Vertex attributes ---

#[test]
fn attribute_grid_follows_pointer_setup() {
    let (mut session, _probe) = session();
    let mut script = ScriptExecutor::new();
    for line in [
        "const positions = gl.createBuffer();",
        "gl.bindBuffer(gl.ARRAY_BUFFER, positions);",
        "gl.vertexAttribPointer(0, 3, gl.FLOAT, false, 12, 4);",
        "gl.enableVertexAttribArray(0);",
        "gl.vertexAttrib4f(1, 0.5, 0, 0, 1);",
    ] {
        run(&mut session, &mut script, line);
    }
    let diagram = session.diagram();
    assert_eq!(diagram.attribute_text(0, "enabled"), Some("true"));
    assert_eq!(diagram.attribute_text(0, "size"), Some("3"));
    assert_eq!(diagram.attribute_text(0, "type"), Some("FLOAT"));
    assert_eq!(diagram.attribute_text(0, "stride"), Some("12"));
    assert_eq!(diagram.attribute_text(0, "offset"), Some("4"));
    assert_eq!(diagram.attribute_text(0, "buffer"), Some("positions"));
    assert_eq!(diagram.attribute_text(1, "value"), Some("0.5, 0, 0, 1"));

    let cell = diagram.attribute_buffer_cell(0).unwrap();
    let panel = diagram.panel_of(handle(&session, "positions")).unwrap();
    assert!(diagram
        .arrows()
        .links()
        .iter()
        .any(|link| link.from == cell && link.to == panel));
}

// --- Arrows ---

#[test]
fn refresh_prunes_arrows_to_deleted_objects() {
    let (mut session, probe) = session();
    let mut script = ScriptExecutor::new();
    for line in [
        "const vs = gl.createShader(gl.VERTEX_SHADER);",
        "const prog = gl.createProgram();",
        "gl.attachShader(prog, vs);",
    ] {
        run(&mut session, &mut script, line);
    }
    let group = session.diagram().arrows().links()[0].group;
    run(&mut session, &mut script, "gl.deleteShader(vs);");
    assert_eq!(session.diagram().arrows().len(), 1);

    assert_eq!(session.refresh_arrows().unwrap(), 1);
    assert!(session.diagram().arrows().is_empty());
    assert!(!probe.is_attached(group));
    assert_eq!(session.refresh_arrows().unwrap(), 0);
}

// --- Stepping ---

#[test]
fn stepper_names_objects_from_statement_text() {
    let (mut session, probe) = session();
    let mut stepper = session
        .stepper("const tex = gl.createTexture();\ngl.bindTexture(gl.TEXTURE_2D, tex);\n")
        .unwrap();
    while stepper.step(&mut session).unwrap() {}
    assert!(stepper.is_finished());
    assert!(probe.panel("tex").is_some());
    assert_eq!(session.diagram().texture_unit_text(0, 0), Some("tex"));
    assert_eq!(session.diagram().current_line(), "");
}

#[test]
fn direct_calls_after_a_step_are_not_named_from_it() {
    let (mut session, screen) = session();
    let mut stepper = session.stepper("const tex = gl.createTexture();\n").unwrap();
    stepper.step(&mut session).unwrap();
    session.call("createTexture", &[]).unwrap();
    assert!(screen.panel("tex").is_some());
    assert!(screen.panel("unknown-1").is_some());
    assert_eq!(session.diagram().registry().len(), 2);
}

#[test]
fn failed_statement_does_not_name_later_calls() {
    let (mut session, screen) = session();
    let mut stepper = session
        .stepper("const buf = gl.createBuffer(); gl.enable(12345);\n")
        .unwrap();
    assert!(stepper.step(&mut session).is_err());
    assert_eq!(session.diagram().current_line(), "");
    session.call("createBuffer", &[]).unwrap();
    assert!(screen.panel("buf").is_some());
    assert!(screen.panel("unknown-1").is_some());
}

#[test]
fn statements_before_an_unterminated_literal_still_run() {
    let (mut session, _screen) = session();
    let mut stepper = session
        .stepper(
            "gl.enable(gl.DEPTH_TEST);\n\
             gl.clearColor(1, 0, 0, 1);\n\
             const vs = gl.createShader(gl.VERTEX_SHADER);\n\
             gl.shaderSource(vs, `void main() {};\n",
        )
        .unwrap();
    assert_eq!(stepper.len(), 4);
    for _ in 0..3 {
        assert!(stepper.step(&mut session).unwrap());
    }
    assert_eq!(global_text(&session, "depth state", "DEPTH_TEST"), "true");
    assert!(session.diagram().object("vs").is_some());

    let err = stepper.step(&mut session).unwrap_err();
    assert!(matches!(
        err,
        StepperError::Parse(ParseBoundaryError { line: 4, column: 21 })
    ));
    assert_eq!(stepper.cursor(), 3);
}
