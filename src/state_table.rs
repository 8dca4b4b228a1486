// src/state_table.rs
//! Declarative state tables.
//!
//! A table is built from a static list of [`StateDescriptor`]s. Each
//! descriptor owns one row; the rows are created in descriptor order and are
//! never reordered, so row `i` always shows descriptor `i`. Updating re-runs the
//! table's query for every row and patches (and flashes) only the cells whose
//! formatted text changed.

pub mod descriptors;

use log::debug;

use crate::api::{ObservedApi, Value};
use crate::display::{DisplayManager, ElementId, RowHandle};
use crate::error::{ApiError, DisplayError, SessionError};
use crate::format::{Formatter, NameLookup};

/// Static declaration of one queryable state slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateDescriptor {
    /// GL constant name passed to the query.
    pub query_key: &'static str,
    /// Operations that may change this slot.
    pub setters: &'static [&'static str],
    pub formatter: Formatter,
    pub help: &'static str,
}

/// Reads the current value of one descriptor from the observed API.
pub type QueryFn = Box<dyn Fn(&mut dyn ObservedApi, &StateDescriptor) -> Result<Value, ApiError>>;

/// Index of a table inside a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(pub usize);

/// One display cell that remembers the text it last showed.
#[derive(Debug, Clone)]
pub struct DiffCell {
    element: ElementId,
    last: Option<String>,
}

impl DiffCell {
    pub fn new(element: ElementId) -> Self {
        Self {
            element,
            last: None,
        }
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn text(&self) -> Option<&str> {
        self.last.as_deref()
    }

    /// Shows `text` unless it is already shown. A changed cell is flashed
    /// when `flash` is set. Returns whether the text changed.
    pub fn set(
        &mut self,
        display: &mut DisplayManager,
        text: &str,
        flash: bool,
    ) -> Result<bool, DisplayError> {
        if self.last.as_deref() == Some(text) {
            return Ok(false);
        }
        display.set_text(self.element, text)?;
        if flash {
            display.flash(self.element)?;
        }
        self.last = Some(text.to_string());
        Ok(true)
    }
}

pub struct StateTable {
    title: String,
    descriptors: &'static [StateDescriptor],
    /// Parallel to `descriptors`.
    rows: Vec<RowHandle>,
    /// Parallel to `descriptors`.
    cells: Vec<DiffCell>,
    expander: ElementId,
    query: Option<QueryFn>,
}

impl StateTable {
    /// Builds the rows and paints the current values without flashing.
    pub fn build(
        display: &mut DisplayManager,
        parent: ElementId,
        title: &str,
        descriptors: &'static [StateDescriptor],
        query: QueryFn,
        api: &mut dyn ObservedApi,
        names: &dyn NameLookup,
    ) -> Result<Self, SessionError> {
        let mut table = Self::build_deferred(display, parent, title, descriptors)?;
        table.query = Some(query);
        table.refresh(display, api, names, false)?;
        Ok(table)
    }

    /// Builds the rows with blank cells and no query. Nothing is shown until
    /// [`attach_query`](Self::attach_query) and the next update.
    pub fn build_deferred(
        display: &mut DisplayManager,
        parent: ElementId,
        title: &str,
        descriptors: &'static [StateDescriptor],
    ) -> Result<Self, DisplayError> {
        let expander = display.create_expander(parent, title)?;
        let table = display.create_table(expander)?;
        let mut rows = Vec::with_capacity(descriptors.len());
        let mut cells = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let row = display.create_row(table, descriptor.query_key, descriptor.help, 1)?;
            let mut cell = DiffCell::new(row.cells[0]);
            cell.set(display, "", false)?;
            cells.push(cell);
            rows.push(row);
        }
        Ok(Self {
            title: title.to_string(),
            descriptors,
            rows,
            cells,
            expander,
            query: None,
        })
    }

    pub fn attach_query(&mut self, query: QueryFn) {
        self.query = Some(query);
    }

    pub fn is_deferred(&self) -> bool {
        self.query.is_none()
    }

    /// Re-queries every row and flashes the cells that changed.
    /// Returns the number of changed cells.
    pub fn update(
        &mut self,
        display: &mut DisplayManager,
        api: &mut dyn ObservedApi,
        names: &dyn NameLookup,
    ) -> Result<usize, SessionError> {
        self.refresh(display, api, names, true)
    }

    fn refresh(
        &mut self,
        display: &mut DisplayManager,
        api: &mut dyn ObservedApi,
        names: &dyn NameLookup,
        flash: bool,
    ) -> Result<usize, SessionError> {
        let Some(query) = &self.query else {
            return Ok(0);
        };
        let mut changed = 0;
        for (descriptor, cell) in self.descriptors.iter().zip(self.cells.iter_mut()) {
            let value = query(api, descriptor)?;
            let text = descriptor.formatter.format(&value, names);
            if cell.set(display, &text, flash)? {
                debug!(
                    "StateTable '{}': {} = {}",
                    self.title, descriptor.query_key, text
                );
                changed += 1;
            }
        }
        Ok(changed)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn descriptors(&self) -> &'static [StateDescriptor] {
        self.descriptors
    }

    pub fn rows(&self) -> &[RowHandle] {
        &self.rows
    }

    /// Root element of the table (its expander).
    pub fn element(&self) -> ElementId {
        self.expander
    }

    /// Value cell of the row for `query_key`.
    pub fn cell(&self, query_key: &str) -> Option<ElementId> {
        self.descriptors
            .iter()
            .position(|d| d.query_key == query_key)
            .map(|i| self.cells[i].element())
    }

    /// Text currently shown for `query_key`.
    pub fn text(&self, query_key: &str) -> Option<&str> {
        self.descriptors
            .iter()
            .position(|d| d.query_key == query_key)
            .and_then(|i| self.cells[i].text())
    }
}
