// src/session.rs
//! Session: one observed API, one diagram.
//!
//! A [`Session`] owns the interceptor proxy around the observed API and the
//! [`Diagram`] that wrapped calls update: the object registry, the
//! subscription index, every state table, the global views, the arrow
//! manager and the naming heuristic. Nothing here is global, so any number
//! of sessions can live side by side.
//!
//! Control flow for one call:
//! 1. `Session::call` hands the call to the interceptor
//! 2. the operation's behavior runs against the `Diagram`
//! 3. the behavior invokes the real entry point, then refreshes whatever
//!    that operation may have changed
//!
//! Arrows are not redrawn per call; [`Session::refresh_arrows`] runs after
//! every stepper step.

mod behaviors;
mod views;

use log::{info, warn};

use crate::api::{Handle, ObservedApi, Value};
use crate::arrows::{ArrowGeometry, ArrowManager};
use crate::display::{DisplayManager, DisplaySurface, ElementId};
use crate::error::{SessionError, StepperError};
use crate::format::NameLookup;
use crate::gl::{MAX_TEXTURE_UNITS, MAX_VERTEX_ATTRIBS};
use crate::intercept::Interceptor;
use crate::naming::{AssignmentPattern, NameGenerator, DEFAULT_PATTERN};
use crate::registry::{ObjectRecord, ObjectRegistry};
use crate::script::{ScriptExecutor, ScriptHost};
use crate::state_table::descriptors::{parameter_query, GLOBAL_TABLES};
use crate::state_table::{StateTable, TableId};
use crate::stepper::{StepCallback, StepHost, Stepper};
use crate::subscription::SubscriptionIndex;

pub use views::{
    buffer_preview, AttributeColumn, ObjectKind, ObjectView, ProgramView, ATTRIBUTE_COLUMNS,
};

use views::{TextureUnitsView, VertexArrayView};

/// Knobs a session is built with.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    /// Regex whose first group names an object from its creation line.
    pub naming_pattern: String,
    /// Prefix of fallback names (`unknown-1`, `unknown-2`, ...).
    pub unknown_prefix: String,
    pub arrow_geometry: ArrowGeometry,
    pub arrow_color: String,
    pub texture_units: usize,
    pub vertex_attribs: usize,
    /// Values shown in a buffer's data cell.
    pub buffer_preview: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            naming_pattern: DEFAULT_PATTERN.to_string(),
            unknown_prefix: "unknown".to_string(),
            arrow_geometry: ArrowGeometry::default(),
            arrow_color: "red".to_string(),
            texture_units: MAX_TEXTURE_UNITS,
            vertex_attribs: MAX_VERTEX_ATTRIBS,
            buffer_preview: 9,
        }
    }
}

/// Everything wrapped calls update.
pub struct Diagram {
    display: DisplayManager,
    registry: ObjectRegistry<ObjectView>,
    subscriptions: SubscriptionIndex,
    /// Every state table, global and per-object. `TableId` indexes this.
    tables: Vec<StateTable>,
    /// Global tables by title.
    globals: Vec<(&'static str, TableId)>,
    texture_units: TextureUnitsView,
    vertex_array: VertexArrayView,
    arrows: ArrowManager,
    names: NameGenerator,
    /// Text of the statement being executed, for naming.
    current_line: String,
    arrow_color: String,
    buffer_preview: usize,
}

impl Diagram {
    pub fn registry(&self) -> &ObjectRegistry<ObjectView> {
        &self.registry
    }

    pub fn subscriptions(&self) -> &SubscriptionIndex {
        &self.subscriptions
    }

    pub fn arrows(&self) -> &ArrowManager {
        &self.arrows
    }

    pub fn table(&self, id: TableId) -> Option<&StateTable> {
        self.tables.get(id.0)
    }

    /// Global state table with the given title.
    pub fn global_table(&self, title: &str) -> Option<&StateTable> {
        self.globals
            .iter()
            .find(|(t, _)| *t == title)
            .and_then(|&(_, id)| self.table(id))
    }

    /// The live record named `name`.
    pub fn object(&self, name: &str) -> Option<&ObjectRecord<ObjectView>> {
        self.registry.live().find(|record| record.name == name)
    }

    /// Panel of a live object.
    pub fn panel_of(&self, handle: Handle) -> Option<ElementId> {
        self.registry.resolve(handle).ok().map(|record| record.display)
    }

    pub fn current_line(&self) -> &str {
        &self.current_line
    }

    // --- Refresh helpers used by behaviors ---

    fn update_table(&mut self, id: TableId, api: &mut dyn ObservedApi) -> Result<usize, SessionError> {
        match self.tables.get_mut(id.0) {
            Some(table) => table.update(&mut self.display, api, &self.registry),
            None => Ok(0),
        }
    }

    fn update_global(&mut self, title: &str, api: &mut dyn ObservedApi) -> Result<usize, SessionError> {
        match self.globals.iter().find(|(t, _)| *t == title) {
            Some(&(_, id)) => self.update_table(id, api),
            None => {
                warn!("Diagram: no global table '{}'", title);
                Ok(0)
            }
        }
    }

    /// Runs every table subscribed to `operation`, in subscription order.
    fn notify(&mut self, operation: &str, api: &mut dyn ObservedApi) -> Result<usize, SessionError> {
        let mut changed = 0;
        for &id in self.subscriptions.subscribers(operation) {
            if let Some(table) = self.tables.get_mut(id.0) {
                changed += table.update(&mut self.display, api, &self.registry)?;
            }
        }
        Ok(changed)
    }

    /// Every object argument must be a registered, live handle.
    fn check_handles(&self, args: &[Value]) -> Result<(), SessionError> {
        for arg in args {
            if let Value::Object(handle) = arg {
                self.registry.resolve(*handle)?;
            }
        }
        Ok(())
    }

    /// Refreshes every global view. Used after deletions, which can unbind
    /// an object from anywhere.
    fn refresh_globals(&mut self, api: &mut dyn ObservedApi) -> Result<(), SessionError> {
        for id in self.globals.iter().map(|&(_, id)| id).collect::<Vec<_>>() {
            self.update_table(id, api)?;
        }
        self.update_table(self.vertex_array.table, api)?;
        self.update_all_texture_units(api, true)?;
        self.update_attributes(api, true)?;
        Ok(())
    }
}

impl NameLookup for Diagram {
    fn name_of(&self, handle: Handle) -> Option<String> {
        self.registry.name_of(handle)
    }
}

pub struct Session {
    interceptor: Interceptor<Diagram>,
    diagram: Diagram,
}

impl Session {
    /// Builds the global views from the API's current state and wraps every
    /// operation the diagram reacts to.
    pub fn new(
        api: Box<dyn ObservedApi>,
        surface: Box<dyn DisplaySurface>,
        settings: &SessionSettings,
    ) -> Result<Self, SessionError> {
        let mut interceptor = Interceptor::new(api);
        let mut display = DisplayManager::new(surface);
        let registry = ObjectRegistry::new();
        let mut subscriptions = SubscriptionIndex::new();
        let mut tables = Vec::new();
        let mut globals = Vec::new();

        let panel = display.create_panel("global", "global state")?;
        for &(title, descriptors) in GLOBAL_TABLES {
            let id = TableId(tables.len());
            let table = StateTable::build(
                &mut display,
                panel,
                title,
                descriptors,
                parameter_query(),
                interceptor.api(),
                &registry,
            )?;
            subscriptions.subscribe_table(id, descriptors);
            tables.push(table);
            globals.push((title, id));
        }

        let units = settings.texture_units.min(MAX_TEXTURE_UNITS);
        if units < settings.texture_units {
            warn!(
                "Session: {} texture units requested, showing {}",
                settings.texture_units, units
            );
        }
        let attribs = settings.vertex_attribs.min(MAX_VERTEX_ATTRIBS);
        if attribs < settings.vertex_attribs {
            warn!(
                "Session: {} vertex attributes requested, showing {}",
                settings.vertex_attribs, attribs
            );
        }
        let texture_units = TextureUnitsView::build(&mut display, panel, units)?;
        let vertex_array = VertexArrayView::build(
            &mut display,
            &mut tables,
            interceptor.api(),
            &registry,
            attribs,
        )?;

        let inference = AssignmentPattern::new(&settings.naming_pattern)?;
        let mut diagram = Diagram {
            display,
            registry,
            subscriptions,
            tables,
            globals,
            texture_units,
            vertex_array,
            arrows: ArrowManager::new(settings.arrow_geometry),
            names: NameGenerator::new(Box::new(inference), &settings.unknown_prefix),
            current_line: String::new(),
            arrow_color: settings.arrow_color.clone(),
            buffer_preview: settings.buffer_preview,
        };
        diagram.update_all_texture_units(interceptor.api(), false)?;
        diagram.update_attributes(interceptor.api(), false)?;

        behaviors::install(&mut interceptor, &diagram.subscriptions)?;
        info!(
            "Session: {} tables, {} wrapped operations",
            diagram.tables.len(),
            interceptor.wrapped().len()
        );
        Ok(Self {
            interceptor,
            diagram,
        })
    }

    /// Calls an API operation through its wrapper, if it has one.
    pub fn call(&mut self, operation: &str, args: &[Value]) -> Result<Value, SessionError> {
        self.interceptor.call(&mut self.diagram, operation, args)
    }

    /// Sets the source text used to name objects created by later calls.
    pub fn set_current_line(&mut self, text: &str) {
        self.diagram.current_line = text.to_string();
    }

    /// Forgets the current line; later creations fall back to generated names.
    pub fn clear_current_line(&mut self) {
        self.diagram.current_line.clear();
    }

    /// Prunes arrows whose endpoints are gone and redraws the rest.
    /// Returns the number pruned.
    pub fn refresh_arrows(&mut self) -> Result<usize, SessionError> {
        let diagram = &mut self.diagram;
        Ok(diagram.arrows.update(&mut diagram.display)?)
    }

    /// Completion callback for a stepper driving this session.
    pub fn arrow_refresher() -> StepCallback<Session> {
        Box::new(|session: &mut Session| session.refresh_arrows().map(|_| ()))
    }

    /// A stepper over `source` that evaluates statements with a fresh
    /// [`ScriptExecutor`] and refreshes arrows after every step.
    pub fn stepper(&mut self, source: &str) -> Result<Stepper<Session, ScriptExecutor>, StepperError> {
        let mut stepper = Stepper::new(self, source, ScriptExecutor::new())?;
        stepper.set_on_step(Self::arrow_refresher());
        Ok(stepper)
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn interceptor(&self) -> &Interceptor<Diagram> {
        &self.interceptor
    }

    /// The observed API, bypassing every wrapper.
    pub fn api(&mut self) -> &mut dyn ObservedApi {
        self.interceptor.api()
    }
}

impl StepHost for Session {
    fn display(&mut self) -> &mut DisplayManager {
        &mut self.diagram.display
    }

    fn begin_statement(&mut self, text: &str) {
        self.set_current_line(text);
    }

    fn end_statement(&mut self) {
        self.clear_current_line();
    }
}

impl ScriptHost for Session {
    fn call(&mut self, operation: &str, args: &[Value]) -> Result<Value, SessionError> {
        Session::call(self, operation, args)
    }
}

#[cfg(test)]
mod tests;
