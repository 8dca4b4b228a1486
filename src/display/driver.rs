// src/display/driver.rs
//! DisplaySurface trait - minimal interface to whatever renders the diagram.
//!
//! The surface owns every element. The engine talks to it only through
//! `handle_request`, so a browser document, a terminal renderer and the
//! in-memory headless surface are interchangeable.

use crate::display::messages::{DisplayRequest, DisplayResponse};
use crate::error::DisplayError;

/// Injected display factory.
///
/// ## Request/Response Pairs
/// - `CreatePanel`, `CreateExpander`, `CreateTable`, `CreateText`,
///   `CreateMarker`, `CreateCodeLine` → `Created`
/// - `CreateRow` → `RowCreated`
/// - `CreateArrow` → `ArrowCreated`
/// - `IsAttached` → `Attached`
/// - `Bounds` → `Bounds`
/// - everything else → `Done`
pub trait DisplaySurface {
    fn handle_request(&mut self, request: DisplayRequest) -> Result<DisplayResponse, DisplayError>;
}
