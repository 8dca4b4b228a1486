// src/error.rs
//! Error taxonomy for the diagram engine.
//!
//! Every failure here is local and synchronous. None of them are retried: the
//! tool is itself a debugging aid, so a failure halts the current operation
//! and is surfaced to whoever drives the session.

use thiserror::Error;

use crate::api::Handle;
use crate::display::ElementId;

/// Misuse of the object registry. Always a broken internal contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown handle {0}: every handle must come from a wrapped creation call")]
    UnknownHandle(Handle),
    #[error("handle {0} is already registered")]
    DuplicateHandle(Handle),
    #[error("handle {0} was already deleted")]
    AlreadyDeleted(Handle),
}

/// Failure reported by the observed API itself.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("no entry point named '{0}'")]
    UnknownOperation(String),
    #[error("{op}: expected {expected} arguments, got {got}")]
    Arity {
        op: String,
        expected: usize,
        got: usize,
    },
    #[error("{op}: argument {index} should be {expected}")]
    InvalidArgument {
        op: String,
        index: usize,
        expected: &'static str,
    },
    #[error("{op}: invalid enum 0x{value:x}")]
    InvalidEnum { op: String, value: i64 },
    #[error("{op}: {reason}")]
    InvalidOperation { op: String, reason: String },
}

/// Failure reported by a display surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DisplayError {
    #[error("unknown display element {0}")]
    UnknownElement(ElementId),
    #[error("display element {0} is not attached to the document")]
    Detached(ElementId),
    #[error("unexpected display response: {0}")]
    UnexpectedResponse(String),
}

/// An unterminated template literal in teaching-script text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unterminated template literal starting at line {line}, column {column}")]
pub struct ParseBoundaryError {
    pub line: usize,
    pub column: usize,
}

/// Failure evaluating one teaching-script statement.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    #[error("cannot parse statement '{text}': {reason}")]
    Syntax { text: String, reason: String },
    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),
    #[error("unknown constant 'gl.{0}'")]
    UnknownConstant(String),
}

/// Anything that can go wrong while a session reacts to an API call.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Display(#[from] DisplayError),
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error("'{0}' is already wrapped")]
    AlreadyWrapped(String),
    #[error("'{0}' is not an entry point of the observed API")]
    NotAnOperation(String),
    #[error("invalid naming pattern")]
    NamingPattern(#[from] regex::Error),
}

/// Failure while stepping through a teaching script.
#[derive(Error, Debug)]
pub enum StepperError {
    #[error(transparent)]
    Parse(#[from] ParseBoundaryError),
    #[error("statement {line} failed")]
    Execution {
        line: usize,
        #[source]
        source: SessionError,
    },
    #[error(transparent)]
    Display(#[from] DisplayError),
}
