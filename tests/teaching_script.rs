// tests/teaching_script.rs
//! Drives whole scripts through a session, the way the runner does.

use std::time::Duration;

use gl_state_diagram::display::{ElementKind, HeadlessProbe, HeadlessSurface};
use gl_state_diagram::error::{RegistryError, SessionError, StepperError};
use gl_state_diagram::gl::SoftGl;
use gl_state_diagram::session::{Session, SessionSettings};
use gl_state_diagram::stepper::{CancelToken, StepperState};
use test_log::test;

const SCRIPT: &str = "\
const tex = gl.createTexture();
gl.bindTexture(gl.TEXTURE_2D, tex);
gl.texParameteri(gl.TEXTURE_2D, gl.TEXTURE_MAG_FILTER, gl.NEAREST);

const buf = gl.createBuffer();
gl.bindBuffer(gl.ARRAY_BUFFER, buf);
gl.bufferData(gl.ARRAY_BUFFER, new Float32Array([
  -1, -1,
   1, -1,
   0,  1,
]), gl.STATIC_DRAW);
gl.vertexAttribPointer(0, 2, gl.FLOAT, false, 0, 0);
gl.enableVertexAttribArray(0);

gl.createShader(gl.VERTEX_SHADER);
gl.createShader(gl.FRAGMENT_SHADER);
gl.enable(gl.BLEND);
";

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

fn text(session: &Session, table: &str, key: &str) -> String {
    session
        .diagram()
        .global_table(table)
        .and_then(|t| t.text(key))
        .unwrap_or_default()
        .to_string()
}

#[test]
fn full_script_builds_the_diagram() {
    let (mut session, probe) = session();
    let mut stepper = session.stepper(SCRIPT).unwrap();
    assert_eq!(stepper.len(), 11);
    let executed = stepper
        .run(&mut session, Duration::ZERO, &CancelToken::new())
        .unwrap();
    assert_eq!(executed, 11);
    assert_eq!(stepper.state(), StepperState::Finished);

    for name in ["tex", "buf", "unknown-1", "unknown-2"] {
        assert!(probe.panel(name).is_some(), "no panel for {}", name);
    }
    let diagram = session.diagram();
    assert_eq!(diagram.texture_unit_text(0, 0), Some("tex"));
    assert_eq!(diagram.attribute_text(0, "buffer"), Some("buf"));
    assert_eq!(diagram.attribute_text(0, "enabled"), Some("true"));
    assert_eq!(text(&session, "common state", "ARRAY_BUFFER_BINDING"), "buf");
    assert_eq!(text(&session, "blend state", "BLEND"), "true");

    let tex = diagram.object("tex").unwrap().handle;
    assert_eq!(
        diagram.object_table(tex).unwrap().text("TEXTURE_MAG_FILTER"),
        Some("NEAREST")
    );
    let buf = diagram.object("buf").unwrap().handle;
    assert_eq!(diagram.object_text(buf), Some("-1, -1, 1, -1, 0, 1"));

    // Texture unit to texture, attribute to buffer.
    assert_eq!(diagram.arrows().len(), 2);
    // One line per statement plus the two blank spacers.
    assert_eq!(probe.elements_of_kind(ElementKind::CodeLine).len(), 13);
    assert_eq!(probe.current_line(), None);
}

#[test]
fn tables_track_the_latest_call() {
    let (mut session, probe) = session();
    let mut stepper = session
        .stepper(
            "gl.depthFunc(gl.ALWAYS);\n\
             gl.depthFunc(gl.GREATER);\n\
             gl.depthFunc(gl.GREATER);\n",
        )
        .unwrap();
    let cell = session
        .diagram()
        .global_table("depth state")
        .unwrap()
        .cell("DEPTH_FUNC")
        .unwrap();

    stepper.step(&mut session).unwrap();
    assert_eq!(text(&session, "depth state", "DEPTH_FUNC"), "ALWAYS");
    stepper.step(&mut session).unwrap();
    assert_eq!(text(&session, "depth state", "DEPTH_FUNC"), "GREATER");
    assert_eq!(probe.flash_count(cell), 2);

    // Same value again: no new flash.
    stepper.step(&mut session).unwrap();
    assert_eq!(probe.flash_count(cell), 2);
}

#[test]
fn finished_stepper_is_a_no_op() {
    let (mut session, probe) = session();
    let mut stepper = session.stepper("gl.enable(gl.CULL_FACE);\n").unwrap();
    assert!(stepper.step(&mut session).unwrap());
    probe.clear_events();
    assert!(!stepper.step(&mut session).unwrap());
    assert_eq!(stepper.cursor(), 1);
    assert!(probe.events().is_empty());
}

#[test]
fn failing_statement_holds_the_cursor() {
    let (mut session, probe) = session();
    let mut stepper = session
        .stepper("const b = gl.createBuffer();\ngl.bufferData(gl.ARRAY_BUFFER, 4, gl.STATIC_DRAW);\n")
        .unwrap();
    stepper.step(&mut session).unwrap();
    let err = stepper.step(&mut session).unwrap_err();
    assert!(matches!(
        err,
        StepperError::Execution {
            line: 2,
            source: SessionError::Api(_)
        }
    ));
    assert_eq!(stepper.cursor(), 1);
    assert_eq!(probe.current_line(), Some(stepper.lines()[1].element));
}

#[test]
fn deleted_objects_lose_panels_and_arrows() {
    let (mut session, probe) = session();
    let mut stepper = session
        .stepper(
            "const tex = gl.createTexture();\n\
             gl.bindTexture(gl.TEXTURE_2D, tex);\n\
             gl.deleteTexture(tex);\n\
             gl.deleteTexture(tex);\n",
        )
        .unwrap();
    for _ in 0..3 {
        stepper.step(&mut session).unwrap();
    }
    assert!(probe.panel("tex").is_none());
    assert!(session.diagram().arrows().is_empty());
    assert_eq!(session.diagram().texture_unit_text(0, 0), Some("null"));

    let err = stepper.step(&mut session).unwrap_err();
    assert!(matches!(
        err,
        StepperError::Execution {
            source: SessionError::Registry(RegistryError::AlreadyDeleted(_)),
            ..
        }
    ));
}

#[test]
fn sessions_do_not_share_names_or_wrappers() {
    let (mut first, first_probe) = session();
    let (mut second, second_probe) = session();
    first.stepper("gl.createTexture();\n").unwrap().step(&mut first).unwrap();
    second.stepper("gl.createTexture();\n").unwrap().step(&mut second).unwrap();
    assert!(first_probe.panel("unknown-1").is_some());
    assert!(second_probe.panel("unknown-1").is_some());
    assert!(second_probe.panel("unknown-2").is_none());
    assert_eq!(first.diagram().registry().len(), 1);
    assert_eq!(second.diagram().registry().len(), 1);
}

#[test]
fn cancelled_run_leaves_the_script_ready() {
    let (mut session, _probe) = session();
    let mut stepper = session.stepper("gl.enable(gl.BLEND);\n").unwrap();
    let cancel = CancelToken::new();
    cancel.cancel();
    let executed = stepper.run(&mut session, Duration::ZERO, &cancel).unwrap();
    assert_eq!(executed, 0);
    assert_eq!(stepper.state(), StepperState::Ready);
    assert_eq!(text(&session, "blend state", "BLEND"), "false");
}
