// src/display/drivers/headless.rs
//! Headless display surface.
//!
//! Keeps the whole element tree in memory and records every visible effect
//! (text changes, flashes, removals, path updates) in an ordered event log.
//! A [`HeadlessProbe`] shares the same state so tests and the binary can
//! inspect the diagram, and simulate drags, while the session owns the
//! surface.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt::Write as _;
use std::rc::Rc;

use bitflags::bitflags;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::display::driver::DisplaySurface;
use crate::display::messages::{DisplayRequest, DisplayResponse, ElementId, Rect};
use crate::error::DisplayError;

const LINE_HEIGHT: f64 = 20.0;
const LABEL_WIDTH: f64 = 100.0;
const CELL_WIDTH: f64 = 60.0;

/// Events kept in the log; older ones are dropped first.
pub const MAX_EVENTS: usize = 4096;

/// Grid the headless surface places panels on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlessLayout {
    pub panel_width: f64,
    pub panel_height: f64,
    pub panel_gap: f64,
    pub panels_per_row: usize,
}

impl Default for HeadlessLayout {
    fn default() -> Self {
        Self {
            panel_width: 240.0,
            panel_height: 280.0,
            panel_gap: 20.0,
            panels_per_row: 4,
        }
    }
}

bitflags! {
    /// Per-element display state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ElementFlags: u8 {
        const REMOVED      = 1 << 0;
        /// Set by a flash, cleared by `HeadlessProbe::settle`.
        const FLASHED      = 1 << 1;
        const CURRENT_LINE = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Panel,
    Expander,
    Table,
    Row,
    Cell,
    Text,
    Marker,
    ArrowGroup,
    Path,
    CodeLine,
}

/// One visible effect, in the order the surface applied it.
#[derive(Debug, Clone, PartialEq)]
pub enum HeadlessEvent {
    Created(ElementId, ElementKind),
    TextSet(ElementId, String),
    Flashed(ElementId),
    Removed(ElementId),
    PathSet(ElementId, String),
    CurrentLine(ElementId, bool),
    Scrolled(ElementId),
}

#[derive(Debug, Clone)]
struct Element {
    kind: ElementKind,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    text: String,
    help: String,
    /// Offset from the parent's origin (absolute for roots).
    local: Rect,
    flags: ElementFlags,
    flash_count: usize,
}

#[derive(Debug, Default)]
struct SurfaceState {
    layout: HeadlessLayout,
    elements: Vec<Element>,
    events: VecDeque<HeadlessEvent>,
    panels: usize,
    code_lines: usize,
}

impl SurfaceState {
    fn record(&mut self, event: HeadlessEvent) {
        if self.events.len() == MAX_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    fn get(&self, id: ElementId) -> Result<&Element, DisplayError> {
        self.elements
            .get(id.0 as usize)
            .ok_or(DisplayError::UnknownElement(id))
    }

    fn get_mut(&mut self, id: ElementId) -> Result<&mut Element, DisplayError> {
        self.elements
            .get_mut(id.0 as usize)
            .ok_or(DisplayError::UnknownElement(id))
    }

    fn insert(
        &mut self,
        kind: ElementKind,
        parent: Option<ElementId>,
        text: String,
        local: Rect,
    ) -> Result<ElementId, DisplayError> {
        let id = ElementId(self.elements.len() as u32);
        if let Some(parent) = parent {
            self.get_mut(parent)?.children.push(id);
        }
        self.elements.push(Element {
            kind,
            parent,
            children: Vec::new(),
            text,
            help: String::new(),
            local,
            flags: ElementFlags::empty(),
            flash_count: 0,
        });
        trace!("HeadlessSurface: created {:?} {}", kind, id);
        self.record(HeadlessEvent::Created(id, kind));
        Ok(id)
    }

    /// Next slot below the existing children of `parent`.
    fn child_rect(&self, parent: ElementId) -> Result<Rect, DisplayError> {
        let parent_el = self.get(parent)?;
        Ok(Rect {
            left: 0.0,
            top: LINE_HEIGHT * (parent_el.children.len() + 1) as f64,
            width: parent_el.local.width,
            height: LINE_HEIGHT,
        })
    }

    fn is_attached(&self, id: ElementId) -> Result<bool, DisplayError> {
        let mut current = Some(id);
        while let Some(el_id) = current {
            let el = self.get(el_id)?;
            if el.flags.contains(ElementFlags::REMOVED) {
                return Ok(false);
            }
            current = el.parent;
        }
        Ok(true)
    }

    fn bounds(&self, id: ElementId) -> Result<Rect, DisplayError> {
        if !self.is_attached(id)? {
            return Err(DisplayError::Detached(id));
        }
        let el = self.get(id)?;
        let mut rect = el.local;
        let mut current = el.parent;
        while let Some(parent) = current {
            let p = self.get(parent)?;
            rect.left += p.local.left;
            rect.top += p.local.top;
            current = p.parent;
        }
        Ok(rect)
    }

    fn apply(&mut self, request: DisplayRequest) -> Result<DisplayResponse, DisplayError> {
        match request {
            DisplayRequest::CreatePanel { kind, title } => {
                let n = self.panels;
                self.panels += 1;
                let layout = self.layout;
                let per_row = layout.panels_per_row.max(1);
                let local = Rect {
                    left: layout.panel_gap
                        + (n % per_row) as f64 * (layout.panel_width + layout.panel_gap),
                    top: layout.panel_gap
                        + (n / per_row) as f64 * (layout.panel_height + layout.panel_gap),
                    width: layout.panel_width,
                    height: layout.panel_height,
                };
                debug!("HeadlessSurface: panel '{}' ({})", title, kind);
                self.insert(ElementKind::Panel, None, title, local)
                    .map(DisplayResponse::Created)
            }
            DisplayRequest::CreateExpander { parent, title } => {
                let local = self.child_rect(parent)?;
                self.insert(ElementKind::Expander, Some(parent), title, local)
                    .map(DisplayResponse::Created)
            }
            DisplayRequest::CreateTable { parent } => {
                let local = self.child_rect(parent)?;
                self.insert(ElementKind::Table, Some(parent), String::new(), local)
                    .map(DisplayResponse::Created)
            }
            DisplayRequest::CreateRow {
                table,
                label,
                help,
                columns,
            } => {
                let local = self.child_rect(table)?;
                let row = self.insert(ElementKind::Row, Some(table), label, local)?;
                self.get_mut(row)?.help = help;
                let mut cells = Vec::with_capacity(columns);
                for column in 0..columns {
                    let cell_rect = Rect {
                        left: LABEL_WIDTH + CELL_WIDTH * column as f64,
                        top: 0.0,
                        width: CELL_WIDTH,
                        height: LINE_HEIGHT,
                    };
                    cells.push(self.insert(ElementKind::Cell, Some(row), String::new(), cell_rect)?);
                }
                Ok(DisplayResponse::RowCreated { row, cells })
            }
            DisplayRequest::CreateText { parent, text } => {
                let local = self.child_rect(parent)?;
                self.insert(ElementKind::Text, Some(parent), text, local)
                    .map(DisplayResponse::Created)
            }
            DisplayRequest::SetText { element, text } => {
                self.get_mut(element)?.text = text.clone();
                self.record(HeadlessEvent::TextSet(element, text));
                Ok(DisplayResponse::Done)
            }
            DisplayRequest::Flash { element } => {
                let el = self.get_mut(element)?;
                el.flags.insert(ElementFlags::FLASHED);
                el.flash_count += 1;
                self.record(HeadlessEvent::Flashed(element));
                Ok(DisplayResponse::Done)
            }
            DisplayRequest::Remove { element } => {
                let el = self.get_mut(element)?;
                if !el.flags.contains(ElementFlags::REMOVED) {
                    el.flags.insert(ElementFlags::REMOVED);
                    debug!("HeadlessSurface: removed {}", element);
                    self.record(HeadlessEvent::Removed(element));
                }
                Ok(DisplayResponse::Done)
            }
            DisplayRequest::IsAttached { element } => {
                self.is_attached(element).map(DisplayResponse::Attached)
            }
            DisplayRequest::Bounds { element } => self.bounds(element).map(DisplayResponse::Bounds),
            DisplayRequest::CreateMarker { color } => self
                .insert(ElementKind::Marker, None, color, Rect::default())
                .map(DisplayResponse::Created),
            DisplayRequest::CreateArrow { marker, color } => {
                self.get(marker)?;
                let group = self.insert(ElementKind::ArrowGroup, None, color, Rect::default())?;
                let path = self.insert(ElementKind::Path, Some(group), String::new(), Rect::default())?;
                Ok(DisplayResponse::ArrowCreated { group, path })
            }
            DisplayRequest::SetPath { path, d } => {
                self.get_mut(path)?.text = d.clone();
                self.record(HeadlessEvent::PathSet(path, d));
                Ok(DisplayResponse::Done)
            }
            DisplayRequest::CreateCodeLine { text } => {
                let n = self.code_lines;
                self.code_lines += 1;
                let local = Rect {
                    left: 0.0,
                    top: LINE_HEIGHT * n as f64,
                    width: self.layout.panel_width,
                    height: LINE_HEIGHT,
                };
                self.insert(ElementKind::CodeLine, None, text, local)
                    .map(DisplayResponse::Created)
            }
            DisplayRequest::SetCurrentLine { element, current } => {
                self.get_mut(element)?
                    .flags
                    .set(ElementFlags::CURRENT_LINE, current);
                self.record(HeadlessEvent::CurrentLine(element, current));
                Ok(DisplayResponse::Done)
            }
            DisplayRequest::ScrollIntoView { element } => {
                self.get(element)?;
                self.record(HeadlessEvent::Scrolled(element));
                Ok(DisplayResponse::Done)
            }
        }
    }

    fn render_element(&self, id: ElementId, depth: usize, out: &mut String) {
        let Ok(el) = self.get(id) else {
            return;
        };
        if el.flags.contains(ElementFlags::REMOVED) {
            return;
        }
        let indent = "  ".repeat(depth);
        match el.kind {
            ElementKind::Row => {
                let cells: Vec<&str> = el
                    .children
                    .iter()
                    .filter_map(|c| self.get(*c).ok())
                    .map(|c| c.text.as_str())
                    .collect();
                let _ = writeln!(out, "{}{}: {}", indent, el.text, cells.join(" | "));
                return;
            }
            ElementKind::Table => {}
            _ if el.text.is_empty() => {}
            _ => {
                for line in el.text.lines() {
                    let _ = writeln!(out, "{}{}", indent, line);
                }
            }
        }
        let depth = if el.kind == ElementKind::Table { depth } else { depth + 1 };
        for child in &el.children {
            self.render_element(*child, depth, out);
        }
    }
}

/// In-memory display surface.
pub struct HeadlessSurface {
    state: Rc<RefCell<SurfaceState>>,
}

impl HeadlessSurface {
    /// Creates a surface with the default layout and the probe that
    /// observes it.
    pub fn new() -> (Self, HeadlessProbe) {
        Self::with_layout(HeadlessLayout::default())
    }

    pub fn with_layout(layout: HeadlessLayout) -> (Self, HeadlessProbe) {
        let state = Rc::new(RefCell::new(SurfaceState {
            layout,
            ..SurfaceState::default()
        }));
        (
            HeadlessSurface {
                state: Rc::clone(&state),
            },
            HeadlessProbe { state },
        )
    }
}

impl DisplaySurface for HeadlessSurface {
    fn handle_request(&mut self, request: DisplayRequest) -> Result<DisplayResponse, DisplayError> {
        self.state.borrow_mut().apply(request)
    }
}

/// Read access to a [`HeadlessSurface`], plus simulated user drags.
#[derive(Clone)]
pub struct HeadlessProbe {
    state: Rc<RefCell<SurfaceState>>,
}

impl HeadlessProbe {
    /// The most recent [`MAX_EVENTS`] events, oldest first.
    pub fn events(&self) -> Vec<HeadlessEvent> {
        self.state.borrow().events.iter().cloned().collect()
    }

    pub fn clear_events(&self) {
        self.state.borrow_mut().events.clear();
    }

    pub fn text(&self, id: ElementId) -> Option<String> {
        self.state.borrow().get(id).ok().map(|el| el.text.clone())
    }

    pub fn help(&self, id: ElementId) -> Option<String> {
        self.state.borrow().get(id).ok().map(|el| el.help.clone())
    }

    pub fn kind(&self, id: ElementId) -> Option<ElementKind> {
        self.state.borrow().get(id).ok().map(|el| el.kind)
    }

    pub fn flags(&self, id: ElementId) -> ElementFlags {
        self.state
            .borrow()
            .get(id)
            .map(|el| el.flags)
            .unwrap_or_default()
    }

    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.state
            .borrow()
            .get(id)
            .map(|el| el.children.clone())
            .unwrap_or_default()
    }

    pub fn flash_count(&self, id: ElementId) -> usize {
        self.state.borrow().get(id).map(|el| el.flash_count).unwrap_or(0)
    }

    pub fn total_flashes(&self) -> usize {
        self.state.borrow().elements.iter().map(|el| el.flash_count).sum()
    }

    pub fn is_attached(&self, id: ElementId) -> bool {
        self.state.borrow().is_attached(id).unwrap_or(false)
    }

    pub fn bounds(&self, id: ElementId) -> Option<Rect> {
        self.state.borrow().bounds(id).ok()
    }

    /// Every element of `kind`, attached or not, in creation order.
    pub fn elements_of_kind(&self, kind: ElementKind) -> Vec<ElementId> {
        self.state
            .borrow()
            .elements
            .iter()
            .enumerate()
            .filter(|(_, el)| el.kind == kind)
            .map(|(i, _)| ElementId(i as u32))
            .collect()
    }

    /// The attached panel whose title is `title`.
    pub fn panel(&self, title: &str) -> Option<ElementId> {
        let state = self.state.borrow();
        state
            .elements
            .iter()
            .enumerate()
            .filter(|(i, el)| {
                el.kind == ElementKind::Panel
                    && el.text == title
                    && state.is_attached(ElementId(*i as u32)).unwrap_or(false)
            })
            .map(|(i, _)| ElementId(i as u32))
            .last()
    }

    /// The code line currently marked as current, if any.
    pub fn current_line(&self) -> Option<ElementId> {
        self.state
            .borrow()
            .elements
            .iter()
            .position(|el| {
                el.kind == ElementKind::CodeLine && el.flags.contains(ElementFlags::CURRENT_LINE)
            })
            .map(|i| ElementId(i as u32))
    }

    /// Drags an element by `(dx, dy)`; descendants move with it.
    pub fn move_element(&self, id: ElementId, dx: f64, dy: f64) -> Result<(), DisplayError> {
        let mut state = self.state.borrow_mut();
        let el = state.get_mut(id)?;
        el.local.left += dx;
        el.local.top += dy;
        Ok(())
    }

    /// Ends every running flash animation.
    pub fn settle(&self) {
        for el in &mut self.state.borrow_mut().elements {
            el.flags.remove(ElementFlags::FLASHED);
        }
    }

    /// Text rendering of every attached panel, one line per row or text block.
    pub fn render(&self) -> String {
        let state = self.state.borrow();
        let mut out = String::new();
        for (i, el) in state.elements.iter().enumerate() {
            if el.kind == ElementKind::Panel {
                state.render_element(ElementId(i as u32), 0, &mut out);
            }
        }
        out
    }
}
