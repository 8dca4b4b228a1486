// src/stepper/tests.rs

use super::*;
use crate::display::{ElementKind, HeadlessProbe, HeadlessSurface};
use crate::error::{ParseBoundaryError, ScriptError};
use test_log::test;

// --- Parsing ---

#[test]
fn splits_on_semicolon_newline() {
    let statements = split_statements("a();\nb();\n");
    let texts: Vec<&str> = statements.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["a();\n", "b();\n"]);
    assert_eq!(statements[1].line, 2);
}

#[test]
fn semicolon_inside_a_line_does_not_split() {
    let statements = split_statements("for (;;) x(); y();\nz();\n");
    assert_eq!(statements.len(), 2);
    assert_eq!(statements[0].text, "for (;;) x(); y();\n");
}

#[test]
fn multi_line_statement_keeps_its_text() {
    let source = "gl.bufferData(\n  gl.ARRAY_BUFFER,\n  data,\n  gl.STATIC_DRAW);\nnext();\n";
    let statements = split_statements(source);
    assert_eq!(statements.len(), 2);
    assert_eq!(
        statements[0].text,
        "gl.bufferData(\n  gl.ARRAY_BUFFER,\n  data,\n  gl.STATIC_DRAW);\n"
    );
    assert_eq!(statements[1].line, 5);
}

#[test]
fn template_literals_hide_semicolons() {
    let source = "const src = `\nvoid main() {\n  x = 1;\n}\n`;\ngl.compileShader(sh);\n";
    let statements = split_statements(source);
    assert_eq!(statements.len(), 2);
    assert!(statements[0].text.contains("x = 1;\n}"));
    assert_eq!(statements[1].text, "gl.compileShader(sh);\n");
}

#[test]
fn blank_lines_become_spacers() {
    let statements = split_statements("a();\n\n\nb();\n");
    assert_eq!(statements[0].spacers, 0);
    assert_eq!(statements[1].spacers, 2);
    assert_eq!(statements[1].text, "b();\n");
    assert_eq!(statements[1].line, 4);
}

#[test]
fn double_semicolon_terminates() {
    let statements = split_statements("a();;\nb();");
    let texts: Vec<&str> = statements.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["a();;\n", "b();"]);
}

#[test]
fn trailing_text_is_a_statement() {
    let statements = split_statements("a();\n// done");
    assert_eq!(statements.len(), 2);
    assert_eq!(statements[1].text, "// done");
    assert!(split_statements("a();\n  \n").len() == 1);
}

#[test]
fn unterminated_template_literal_poisons_only_the_tail() {
    let statements = split_statements("a();\nconst s = `abc;\nb();\n");
    assert_eq!(statements.len(), 2);
    assert_eq!(statements[0].text, "a();\n");
    assert!(!statements[0].is_poisoned());
    assert_eq!(statements[1].text, "const s = `abc;\nb();\n");
    assert_eq!(statements[1].line, 2);
    assert_eq!(
        statements[1].unterminated,
        Some(ParseBoundaryError { line: 2, column: 11 })
    );
}

#[test]
fn crlf_line_breaks_terminate() {
    let statements = split_statements("a();\r\n\r\nb();;\r\nc();\r\n");
    let texts: Vec<&str> = statements.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["a();\r\n", "b();;\r\n", "c();\r\n"]);
    assert_eq!(statements[1].spacers, 1);
    assert_eq!(statements[1].line, 3);
    assert_eq!(statements[2].line, 4);
}

// --- Stepping ---

struct Host {
    display: DisplayManager,
    begun: Vec<String>,
    executed: Vec<String>,
    callbacks: usize,
}

impl StepHost for Host {
    fn display(&mut self) -> &mut DisplayManager {
        &mut self.display
    }

    fn begin_statement(&mut self, text: &str) {
        self.begun.push(text.to_string());
    }
}

struct Recorder;

impl StatementExecutor<Host> for Recorder {
    fn execute(&mut self, host: &mut Host, statement: &str) -> Result<(), SessionError> {
        if statement.contains("fail") {
            return Err(ScriptError::UnknownIdentifier("fail".to_string()).into());
        }
        host.executed.push(statement.trim_end().to_string());
        Ok(())
    }
}

fn host() -> (Host, HeadlessProbe) {
    let (surface, probe) = HeadlessSurface::new();
    (
        Host {
            display: DisplayManager::new(Box::new(surface)),
            begun: Vec::new(),
            executed: Vec::new(),
            callbacks: 0,
        },
        probe,
    )
}

#[test]
fn new_highlights_the_first_line() {
    let (mut host, probe) = host();
    let stepper = Stepper::new(&mut host, "a();\n\nb();\n", Recorder).unwrap();
    assert_eq!(stepper.state(), StepperState::Ready);
    assert_eq!(stepper.len(), 2);
    // Two statements plus one spacer line.
    assert_eq!(probe.elements_of_kind(ElementKind::CodeLine).len(), 3);
    assert_eq!(probe.current_line(), Some(stepper.lines()[0].element));
}

#[test]
fn step_executes_and_moves_the_highlight() {
    let (mut host, probe) = host();
    let mut stepper = Stepper::new(&mut host, "a();\nb();\n", Recorder).unwrap();
    assert!(stepper.step(&mut host).unwrap());
    assert_eq!(stepper.state(), StepperState::Stepping);
    assert_eq!(host.executed, vec!["a();"]);
    assert_eq!(host.begun, vec!["a();\n"]);
    assert_eq!(probe.current_line(), Some(stepper.lines()[1].element));

    assert!(stepper.step(&mut host).unwrap());
    assert_eq!(stepper.state(), StepperState::Finished);
    assert_eq!(probe.current_line(), None);
}

#[test]
fn step_at_finished_is_a_no_op() {
    let (mut host, probe) = host();
    let mut stepper = Stepper::new(&mut host, "a();\n", Recorder).unwrap();
    stepper.step(&mut host).unwrap();
    let events = probe.events().len();
    assert!(!stepper.step(&mut host).unwrap());
    assert!(!stepper.step(&mut host).unwrap());
    assert_eq!(stepper.cursor(), 1);
    assert_eq!(host.executed.len(), 1);
    assert_eq!(probe.events().len(), events);
}

#[test]
fn failing_statement_keeps_the_cursor() {
    let (mut host, probe) = host();
    let mut stepper = Stepper::new(&mut host, "a();\nfail();\nb();\n", Recorder).unwrap();
    stepper.step(&mut host).unwrap();
    let err = stepper.step(&mut host).unwrap_err();
    assert!(matches!(err, StepperError::Execution { line: 2, .. }));
    assert_eq!(stepper.cursor(), 1);
    assert_eq!(probe.current_line(), Some(stepper.lines()[1].element));
}

#[test]
fn callback_runs_after_each_step() {
    let (mut host, _probe) = host();
    let mut stepper = Stepper::new(&mut host, "a();\nb();\n", Recorder).unwrap();
    stepper.set_on_step(Box::new(|host: &mut Host| {
        host.callbacks += 1;
        Ok(())
    }));
    stepper.run(&mut host, Duration::ZERO, &CancelToken::new()).unwrap();
    assert_eq!(host.callbacks, 2);
}

#[test]
fn run_steps_to_the_end() {
    let (mut host, _probe) = host();
    let mut stepper = Stepper::new(&mut host, "a();\nb();\nc();\n", Recorder).unwrap();
    let executed = stepper
        .run(&mut host, Duration::from_millis(1), &CancelToken::new())
        .unwrap();
    assert_eq!(executed, 3);
    assert!(stepper.is_finished());
    assert_eq!(host.executed, vec!["a();", "b();", "c();"]);
}

#[test]
fn cancelled_run_stops_before_the_next_step() {
    let (mut host, _probe) = host();
    let mut stepper = Stepper::new(&mut host, "a();\nb();\n", Recorder).unwrap();
    let cancel = CancelToken::new();
    cancel.cancel();
    assert_eq!(stepper.run(&mut host, Duration::ZERO, &cancel).unwrap(), 0);
    assert_eq!(stepper.state(), StepperState::Ready);
}

#[test]
fn unterminated_literal_stops_at_its_statement() {
    let (mut host, screen) = host();
    let mut stepper =
        Stepper::new(&mut host, "a();\nb();\nconst s = `oops;\nc();\n", Recorder).unwrap();
    assert_eq!(stepper.len(), 3);
    assert!(stepper.step(&mut host).unwrap());
    assert!(stepper.step(&mut host).unwrap());
    assert_eq!(host.executed, vec!["a();", "b();"]);

    let err = stepper.step(&mut host).unwrap_err();
    assert!(matches!(
        err,
        StepperError::Parse(ParseBoundaryError { line: 3, column: 11 })
    ));
    assert_eq!(stepper.cursor(), 2);
    assert_eq!(stepper.state(), StepperState::Stepping);
    assert_eq!(screen.current_line(), Some(stepper.lines()[2].element));
    assert_eq!(host.begun.len(), 2);

    // Running does not get past it either.
    assert!(stepper.run(&mut host, Duration::ZERO, &CancelToken::new()).is_err());
    assert_eq!(stepper.cursor(), 2);
}
