// src/display/messages.rs
//! Message types for communication between DisplayManager and a DisplaySurface.
//!
//! Every element the diagram shows (panels, table rows, code lines, arrows)
//! is created, patched and torn down through these requests. Surfaces own the
//! elements; the engine only ever holds their [`ElementId`]s.

use std::fmt;

/// Identity of an element owned by a display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u32);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Axis-aligned element bounds in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Requests sent from DisplayManager to a DisplaySurface.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayRequest {
    /// Top-level draggable panel. `kind` is the object kind or `"global"`.
    /// Surface responds with Created.
    CreatePanel { kind: String, title: String },

    /// Collapsible section inside `parent`. Responds with Created.
    CreateExpander { parent: ElementId, title: String },

    /// Table inside `parent`. Responds with Created.
    CreateTable { parent: ElementId },

    /// Row with a label cell followed by `columns` value cells.
    /// `help` is the tooltip text. Responds with RowCreated.
    CreateRow {
        table: ElementId,
        label: String,
        help: String,
        columns: usize,
    },

    /// Free-standing text block inside `parent`. Responds with Created.
    CreateText { parent: ElementId, text: String },

    SetText { element: ElementId, text: String },

    /// Transient emphasis on a changed element.
    Flash { element: ElementId },

    /// Detaches the element and all its descendants.
    Remove { element: ElementId },

    /// Responds with Attached.
    IsAttached { element: ElementId },

    /// Responds with Bounds. Fails for detached elements.
    Bounds { element: ElementId },

    /// Arrowhead definition for `color`. Responds with Created.
    CreateMarker { color: String },

    /// Arrow group and its path, using `marker` as the head.
    /// Responds with ArrowCreated.
    CreateArrow { marker: ElementId, color: String },

    /// Replaces the path data of an arrow path.
    SetPath { path: ElementId, d: String },

    /// One statement of the teaching script. Responds with Created.
    CreateCodeLine { text: String },

    SetCurrentLine { element: ElementId, current: bool },

    ScrollIntoView { element: ElementId },
}

/// Responses sent from a DisplaySurface to DisplayManager.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayResponse {
    Created(ElementId),
    RowCreated {
        row: ElementId,
        cells: Vec<ElementId>,
    },
    ArrowCreated {
        group: ElementId,
        path: ElementId,
    },
    Attached(bool),
    Bounds(Rect),
    /// The request was applied and carries no result.
    Done,
}
