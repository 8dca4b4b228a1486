// src/display/manager.rs
//! DisplayManager - typed, synchronous wrapper around a DisplaySurface.

use crate::display::driver::DisplaySurface;
use crate::display::messages::{DisplayRequest, DisplayResponse, ElementId, Rect};
use crate::error::DisplayError;
use log::trace;

/// A freshly created table row: the row itself and its value cells.
#[derive(Debug, Clone, PartialEq)]
pub struct RowHandle {
    pub row: ElementId,
    pub cells: Vec<ElementId>,
}

/// An arrow's group element and the path inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowHandle {
    pub group: ElementId,
    pub path: ElementId,
}

/// DisplayManager owns the surface and checks every response's shape.
pub struct DisplayManager {
    surface: Box<dyn DisplaySurface>,
}

fn unexpected(expected: &str, response: DisplayResponse) -> DisplayError {
    DisplayError::UnexpectedResponse(format!("expected {}, got {:?}", expected, response))
}

impl DisplayManager {
    pub fn new(surface: Box<dyn DisplaySurface>) -> Self {
        Self { surface }
    }

    /// Forward a request to the surface.
    pub fn handle_request(
        &mut self,
        request: DisplayRequest,
    ) -> Result<DisplayResponse, DisplayError> {
        trace!("DisplayManager: {:?}", request);
        self.surface.handle_request(request)
    }

    fn created(&mut self, request: DisplayRequest) -> Result<ElementId, DisplayError> {
        match self.handle_request(request)? {
            DisplayResponse::Created(id) => Ok(id),
            other => Err(unexpected("Created", other)),
        }
    }

    fn done(&mut self, request: DisplayRequest) -> Result<(), DisplayError> {
        match self.handle_request(request)? {
            DisplayResponse::Done => Ok(()),
            other => Err(unexpected("Done", other)),
        }
    }

    // --- Element creation ---

    pub fn create_panel(&mut self, kind: &str, title: &str) -> Result<ElementId, DisplayError> {
        self.created(DisplayRequest::CreatePanel {
            kind: kind.to_string(),
            title: title.to_string(),
        })
    }

    pub fn create_expander(
        &mut self,
        parent: ElementId,
        title: &str,
    ) -> Result<ElementId, DisplayError> {
        self.created(DisplayRequest::CreateExpander {
            parent,
            title: title.to_string(),
        })
    }

    pub fn create_table(&mut self, parent: ElementId) -> Result<ElementId, DisplayError> {
        self.created(DisplayRequest::CreateTable { parent })
    }

    pub fn create_row(
        &mut self,
        table: ElementId,
        label: &str,
        help: &str,
        columns: usize,
    ) -> Result<RowHandle, DisplayError> {
        let request = DisplayRequest::CreateRow {
            table,
            label: label.to_string(),
            help: help.to_string(),
            columns,
        };
        match self.handle_request(request)? {
            DisplayResponse::RowCreated { row, cells } if cells.len() == columns => {
                Ok(RowHandle { row, cells })
            }
            other => Err(unexpected("RowCreated", other)),
        }
    }

    pub fn create_text(&mut self, parent: ElementId, text: &str) -> Result<ElementId, DisplayError> {
        self.created(DisplayRequest::CreateText {
            parent,
            text: text.to_string(),
        })
    }

    pub fn create_marker(&mut self, color: &str) -> Result<ElementId, DisplayError> {
        self.created(DisplayRequest::CreateMarker {
            color: color.to_string(),
        })
    }

    pub fn create_arrow(
        &mut self,
        marker: ElementId,
        color: &str,
    ) -> Result<ArrowHandle, DisplayError> {
        let request = DisplayRequest::CreateArrow {
            marker,
            color: color.to_string(),
        };
        match self.handle_request(request)? {
            DisplayResponse::ArrowCreated { group, path } => Ok(ArrowHandle { group, path }),
            other => Err(unexpected("ArrowCreated", other)),
        }
    }

    pub fn create_code_line(&mut self, text: &str) -> Result<ElementId, DisplayError> {
        self.created(DisplayRequest::CreateCodeLine {
            text: text.to_string(),
        })
    }

    // --- Patching ---

    pub fn set_text(&mut self, element: ElementId, text: &str) -> Result<(), DisplayError> {
        self.done(DisplayRequest::SetText {
            element,
            text: text.to_string(),
        })
    }

    pub fn flash(&mut self, element: ElementId) -> Result<(), DisplayError> {
        self.done(DisplayRequest::Flash { element })
    }

    pub fn remove(&mut self, element: ElementId) -> Result<(), DisplayError> {
        self.done(DisplayRequest::Remove { element })
    }

    pub fn set_path(&mut self, path: ElementId, d: &str) -> Result<(), DisplayError> {
        self.done(DisplayRequest::SetPath {
            path,
            d: d.to_string(),
        })
    }

    pub fn set_current_line(&mut self, element: ElementId, current: bool) -> Result<(), DisplayError> {
        self.done(DisplayRequest::SetCurrentLine { element, current })
    }

    pub fn scroll_into_view(&mut self, element: ElementId) -> Result<(), DisplayError> {
        self.done(DisplayRequest::ScrollIntoView { element })
    }

    // --- Queries ---

    pub fn is_attached(&mut self, element: ElementId) -> Result<bool, DisplayError> {
        match self.handle_request(DisplayRequest::IsAttached { element })? {
            DisplayResponse::Attached(attached) => Ok(attached),
            other => Err(unexpected("Attached", other)),
        }
    }

    pub fn bounds(&mut self, element: ElementId) -> Result<Rect, DisplayError> {
        match self.handle_request(DisplayRequest::Bounds { element })? {
            DisplayResponse::Bounds(rect) => Ok(rect),
            other => Err(unexpected("Bounds", other)),
        }
    }
}
