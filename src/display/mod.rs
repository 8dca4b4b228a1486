// src/display/mod.rs
//! Message-based display system.
//!
//! - DisplaySurface: whatever actually shows the diagram
//! - DisplayManager: typed requests and response checking
//! - Messages: Request/Response protocol for communication

pub mod driver;
pub mod drivers;
pub mod manager;
pub mod messages;

pub use driver::DisplaySurface;
pub use drivers::{
    ElementFlags, ElementKind, HeadlessEvent, HeadlessLayout, HeadlessProbe, HeadlessSurface,
};
pub use manager::{ArrowHandle, DisplayManager, RowHandle};
pub use messages::{DisplayRequest, DisplayResponse, ElementId, Rect};
