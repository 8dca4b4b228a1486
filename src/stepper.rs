// src/stepper.rs
//! Line stepper: executes a teaching script one statement at a time.
//!
//! The stepper only sequences opaque statements. Executing one is delegated
//! to a [`StatementExecutor`]; the display and the "current line" bookkeeping
//! are reached through a [`StepHost`].
//!
//! ## States
//! - `Ready`: nothing executed yet, line 0 highlighted
//! - `Stepping`: some statements executed, the next one highlighted
//! - `Finished`: cursor at the end, nothing highlighted; `step` is a no-op

pub mod parse;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, info};

use crate::display::{DisplayManager, ElementId};
use crate::error::{ParseBoundaryError, SessionError, StepperError};

pub use parse::{split_statements, Statement};

/// Delay between statements in [`Stepper::run`].
pub const DEFAULT_RUN_DELAY: Duration = Duration::from_millis(50);

/// What the stepper needs from whoever owns the display.
pub trait StepHost {
    fn display(&mut self) -> &mut DisplayManager;

    /// Called with the statement's text right before it executes.
    fn begin_statement(&mut self, text: &str);

    /// Called once the statement has executed, whether or not it failed.
    fn end_statement(&mut self) {}
}

/// Turns one statement's text into an effect on the host.
pub trait StatementExecutor<H> {
    fn execute(&mut self, host: &mut H, statement: &str) -> Result<(), SessionError>;
}

/// Completion callback run after every successful step.
pub type StepCallback<H> = Box<dyn FnMut(&mut H) -> Result<(), SessionError>>;

/// Stop request for [`Stepper::run`], checked before every step.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepperState {
    Ready,
    Stepping,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepperLine {
    pub text: String,
    pub element: ElementId,
    /// 1-based source line.
    pub line: usize,
    /// The template literal that never closes, on the last line only.
    pub unterminated: Option<ParseBoundaryError>,
}

pub struct Stepper<H, E> {
    lines: Vec<StepperLine>,
    cursor: usize,
    executor: E,
    on_step: Option<StepCallback<H>>,
}

impl<H: StepHost, E: StatementExecutor<H>> Stepper<H, E> {
    /// Parses `source`, shows one code line per statement and highlights the
    /// first. An unterminated template literal only poisons the statement it
    /// starts in; the ones before it still step.
    pub fn new(host: &mut H, source: &str, executor: E) -> Result<Self, StepperError> {
        let statements = split_statements(source);
        let display = host.display();
        let mut lines = Vec::with_capacity(statements.len());
        for statement in statements {
            for _ in 0..statement.spacers {
                display.create_code_line(" ")?;
            }
            let element = display.create_code_line(&statement.text)?;
            lines.push(StepperLine {
                text: statement.text,
                element,
                line: statement.line,
                unterminated: statement.unterminated,
            });
        }
        info!("Stepper: {} statements", lines.len());
        let mut stepper = Self {
            lines,
            cursor: 0,
            executor,
            on_step: None,
        };
        stepper.highlight_current(host)?;
        Ok(stepper)
    }

    pub fn set_on_step(&mut self, callback: StepCallback<H>) {
        self.on_step = Some(callback);
    }

    pub fn state(&self) -> StepperState {
        if self.cursor >= self.lines.len() {
            StepperState::Finished
        } else if self.cursor == 0 {
            StepperState::Ready
        } else {
            StepperState::Stepping
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state() == StepperState::Finished
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[StepperLine] {
        &self.lines
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    fn highlight_current(&self, host: &mut H) -> Result<(), StepperError> {
        if let Some(line) = self.lines.get(self.cursor) {
            let display = host.display();
            display.set_current_line(line.element, true)?;
            display.scroll_into_view(line.element)?;
        }
        Ok(())
    }

    /// Executes the statement under the cursor. Returns `false`, and does
    /// nothing else, once the script is finished.
    ///
    /// A failing statement leaves the cursor on it, highlighted. So does a
    /// statement with an unterminated template literal, which is never run.
    pub fn step(&mut self, host: &mut H) -> Result<bool, StepperError> {
        let Some(line) = self.lines.get(self.cursor) else {
            return Ok(false);
        };
        if let Some(err) = &line.unterminated {
            return Err(StepperError::Parse(err.clone()));
        }
        let element = line.element;
        let number = line.line;
        let text = line.text.clone();

        host.display().set_current_line(element, false)?;
        debug!("Stepper: line {}: {}", number, text.trim_end());
        host.begin_statement(&text);
        let result = self.executor.execute(host, &text);
        host.end_statement();
        if let Err(source) = result {
            self.highlight_current(host)?;
            return Err(StepperError::Execution {
                line: number,
                source,
            });
        }
        self.cursor += 1;
        self.highlight_current(host)?;

        if let Some(callback) = self.on_step.as_mut() {
            callback(host).map_err(|source| StepperError::Execution {
                line: number,
                source,
            })?;
        }
        Ok(true)
    }

    /// Steps until finished or cancelled, sleeping `delay` between steps.
    /// Returns the number of statements executed.
    pub fn run(
        &mut self,
        host: &mut H,
        delay: Duration,
        cancel: &CancelToken,
    ) -> Result<usize, StepperError> {
        let mut executed = 0;
        while !self.is_finished() {
            if cancel.is_cancelled() {
                info!("Stepper: run cancelled at statement {}", self.cursor);
                break;
            }
            self.step(host)?;
            executed += 1;
            if !self.is_finished() && !delay.is_zero() {
                thread::sleep(delay);
            }
        }
        Ok(executed)
    }
}

#[cfg(test)]
mod tests;
