// src/main.rs

//! Command-line runner: steps a script through a software GL context and
//! prints the resulting diagram.
//!
//! Without `--run`, statements are stepped from stdin commands:
//! `step` (or an empty line), `run`, `print`, `quit`.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::{error, info, warn};

use gl_state_diagram::config::CONFIG;
use gl_state_diagram::display::HeadlessSurface;
use gl_state_diagram::error::StepperError;
use gl_state_diagram::gl::SoftGl;
use gl_state_diagram::script::ScriptExecutor;
use gl_state_diagram::session::Session;
use gl_state_diagram::stepper::{CancelToken, Stepper};

/// Lesson used when no script is given.
const DEFAULT_LESSON: &str = "\
const vs = gl.createShader(gl.VERTEX_SHADER);
gl.shaderSource(vs, `
attribute vec4 position;
void main() {
  gl_Position = position;
}
`);
gl.compileShader(vs);

const fs = gl.createShader(gl.FRAGMENT_SHADER);
gl.shaderSource(fs, `
precision mediump float;
uniform vec4 u_color;
void main() {
  gl_FragColor = u_color;
}
`);
gl.compileShader(fs);

const prog = gl.createProgram();
gl.attachShader(prog, vs);
gl.attachShader(prog, fs);
gl.linkProgram(prog);

const positionBuffer = gl.createBuffer();
gl.bindBuffer(gl.ARRAY_BUFFER, positionBuffer);
gl.bufferData(gl.ARRAY_BUFFER, new Float32Array([
  0, 0,
  0, 0.5,
  0.7, 0,
]), gl.STATIC_DRAW);
gl.enableVertexAttribArray(0);
gl.vertexAttribPointer(0, 2, gl.FLOAT, false, 0, 0);

const tex = gl.createTexture();
gl.activeTexture(gl.TEXTURE0 + 1);
gl.bindTexture(gl.TEXTURE_2D, tex);
gl.texParameteri(gl.TEXTURE_2D, gl.TEXTURE_MIN_FILTER, gl.LINEAR);

gl.enable(gl.DEPTH_TEST);
gl.clearColor(0.2, 0.3, 0.4, 1);
gl.useProgram(prog);
const colorLoc = gl.getUniformLocation(prog, 'u_color');
gl.uniform4f(colorLoc, 1, 0.5, 0, 1);
gl.drawArrays(gl.TRIANGLES, 0, 3);
";

#[derive(Parser, Debug)]
#[command(name = "gl-state-diagram")]
#[command(about = "Steps a GL teaching script and prints the state diagram")]
#[command(version)]
struct Cli {
    /// Script to step (the built-in lesson if omitted)
    script: Option<PathBuf>,
    /// Run every statement instead of stepping from stdin
    #[arg(long)]
    run: bool,
}

fn main() -> anyhow::Result<()> {
    // Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let args = Cli::parse();

    // --- Script ---
    let source = match &args.script {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?,
        None => {
            info!("No script given, using the built-in lesson.");
            DEFAULT_LESSON.to_string()
        }
    };

    // --- Session ---
    let (surface, probe) = HeadlessSurface::with_layout(CONFIG.layout);
    let mut session = Session::new(
        Box::new(SoftGl::new()),
        Box::new(surface),
        &CONFIG.session_settings(),
    )
    .context("Failed to build the diagram session")?;
    let mut stepper = session
        .stepper(&source)
        .context("Failed to split the script into statements")?;
    info!("Loaded {} statements.", stepper.len());

    if args.run {
        stepper
            .run(&mut session, CONFIG.run_delay(), &CancelToken::new())
            .context("Script failed")?;
        print!("{}", probe.render());
        info!("Script finished.");
        return Ok(());
    }

    // --- Interactive Loop ---
    let stdin = io::stdin();
    prompt(&stepper)?;
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read stdin")?;
        match line.trim() {
            "" | "s" | "step" => match stepper.step(&mut session) {
                Ok(true) => print!("{}", probe.render()),
                Ok(false) => info!("Script is finished."),
                Err(e) => report(&e),
            },
            "r" | "run" => {
                if let Err(e) = stepper.run(&mut session, CONFIG.run_delay(), &CancelToken::new()) {
                    report(&e);
                }
                print!("{}", probe.render());
            }
            "p" | "print" => print!("{}", probe.render()),
            "q" | "quit" => break,
            other => warn!("Unknown command '{}': use step, run, print or quit.", other),
        }
        prompt(&stepper)?;
    }
    info!("Exiting.");
    Ok(())
}

fn prompt(stepper: &Stepper<Session, ScriptExecutor>) -> anyhow::Result<()> {
    let mut out = io::stdout();
    match stepper.lines().get(stepper.cursor()) {
        Some(line) => writeln!(out, "[{}] {}", line.line, line.text.trim_end())?,
        None => writeln!(out, "[done]")?,
    }
    write!(out, "> ")?;
    out.flush()?;
    Ok(())
}

fn report(e: &StepperError) {
    error!("{}", e);
    if let StepperError::Execution { source, .. } = e {
        error!("Root cause: {}", source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn cli_takes_an_optional_script_and_run_flag() {
        let cli = Cli::try_parse_from(["gl-state-diagram"]).unwrap();
        assert_eq!(cli.script, None);
        assert!(!cli.run);

        let cli = Cli::try_parse_from(["gl-state-diagram", "lesson.js", "--run"]).unwrap();
        assert_eq!(cli.script, Some(PathBuf::from("lesson.js")));
        assert!(cli.run);
    }

    #[test]
    fn cli_rejects_unknown_flags_and_extra_scripts() {
        assert!(Cli::try_parse_from(["gl-state-diagram", "--fast"]).is_err());
        assert!(Cli::try_parse_from(["gl-state-diagram", "a.js", "b.js"]).is_err());
    }

    #[test]
    fn default_lesson_runs_to_the_end() {
        let (surface, screen) = HeadlessSurface::new();
        let mut session = Session::new(
            Box::new(SoftGl::new()),
            Box::new(surface),
            &gl_state_diagram::session::SessionSettings::default(),
        )
        .unwrap();
        let mut stepper = session.stepper(DEFAULT_LESSON).unwrap();
        let executed = stepper
            .run(&mut session, std::time::Duration::ZERO, &CancelToken::new())
            .unwrap();
        assert_eq!(executed, stepper.len());
        let prog = session.diagram().object("prog").unwrap().handle;
        assert_eq!(
            session.diagram().program_uniform_text(prog, "u_color"),
            Some("1, 0.5, 0, 1")
        );
        assert_eq!(session.diagram().program_attribute_text(prog, "position"), Some("0"));
        assert!(screen.render().contains("u_color"));
    }
}
