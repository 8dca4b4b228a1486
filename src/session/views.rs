// src/session/views.rs
//! Per-object panels and the global binding grids.
//!
//! Object panels are built when a creation call is intercepted. The texture
//! units grid and the vertex attribute grid are global and live for the whole
//! session; their cells diff and flash like state-table cells, and each
//! binding cell keeps an arrow to the panel of the object it shows.

use std::mem;

use log::{debug, trace};

use super::Diagram;
use crate::api::{Handle, ObservedApi, Value};
use crate::arrows::{ArrowId, ArrowManager};
use crate::display::{DisplayManager, ElementId, RowHandle};
use crate::error::SessionError;
use crate::format::{format_number, Formatter, NameLookup, NoNames};
use crate::gl::constants::*;
use crate::gl::program::ActiveInfo;
use crate::registry::ObjectRegistry;
use crate::state_table::descriptors::{
    parameter_query, program_query, shader_query, texture_query, PROGRAM_STATE, SHADER_STATE,
    TEXTURE_STATE, VERTEX_ARRAY_STATE,
};
use crate::state_table::{DiffCell, StateTable, TableId};

// --- Object views ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Texture,
    Buffer,
    Shader,
    Program,
}

impl ObjectKind {
    /// Kind created by a creation operation.
    pub fn created_by(operation: &str) -> Option<Self> {
        match operation {
            "createTexture" => Some(ObjectKind::Texture),
            "createBuffer" => Some(ObjectKind::Buffer),
            "createShader" => Some(ObjectKind::Shader),
            "createProgram" => Some(ObjectKind::Program),
            _ => None,
        }
    }

    pub fn panel_kind(self) -> &'static str {
        match self {
            ObjectKind::Texture => "texture",
            ObjectKind::Buffer => "buffer",
            ObjectKind::Shader => "shader",
            ObjectKind::Program => "program",
        }
    }
}

/// Kind-specific part of an object's record.
#[derive(Debug)]
pub enum ObjectView {
    Texture {
        /// Set by the first `bindTexture`; the state table is blank until then.
        target: Option<u32>,
        table: TableId,
    },
    Buffer {
        data: DiffCell,
    },
    Shader {
        source: DiffCell,
        table: TableId,
    },
    Program(ProgramView),
}

impl ObjectView {
    pub fn kind(&self) -> ObjectKind {
        match self {
            ObjectView::Texture { .. } => ObjectKind::Texture,
            ObjectView::Buffer { .. } => ObjectKind::Buffer,
            ObjectView::Shader { .. } => ObjectKind::Shader,
            ObjectView::Program(_) => ObjectKind::Program,
        }
    }

    /// The object's state table, if it has one.
    pub fn table(&self) -> Option<TableId> {
        match self {
            ObjectView::Texture { table, .. } | ObjectView::Shader { table, .. } => Some(*table),
            ObjectView::Program(program) => Some(program.table),
            ObjectView::Buffer { .. } => None,
        }
    }
}

#[derive(Debug)]
pub struct ProgramView {
    /// Table listing attached shaders.
    list: ElementId,
    attached: Vec<AttachedShader>,
    table: TableId,
    /// Attribute name and location, filled by a successful link.
    attribute_list: ElementId,
    attributes: Vec<VariableRow>,
    /// Uniform name and current value.
    uniform_list: ElementId,
    uniforms: Vec<VariableRow>,
}

impl ProgramView {
    /// Attached shaders in display order.
    pub fn attached(&self) -> impl Iterator<Item = Handle> + '_ {
        self.attached.iter().map(|a| a.shader)
    }

    /// Names of the active attributes, in location query order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.attributes.iter().map(|a| a.name.as_str())
    }

    pub fn uniform_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.uniforms.iter().map(|u| u.name.as_str())
    }
}

/// One row of a program's attribute or uniform table.
#[derive(Debug)]
struct VariableRow {
    name: String,
    row: ElementId,
    cell: DiffCell,
    /// Uniform location; unused for attributes.
    location: Value,
}

fn find_row<'a>(rows: &'a [VariableRow], name: &str) -> Option<&'a VariableRow> {
    rows.iter().find(|r| r.name == name)
}

#[derive(Debug)]
struct AttachedShader {
    shader: Handle,
    row: RowHandle,
    arrow: ArrowId,
}

/// Text for a buffer's data cell: the first `limit` values, then `, ...`.
/// A byte size shows as zeros.
pub fn buffer_preview(data: &Value, limit: usize) -> String {
    let (values, total): (Vec<String>, usize) = match data {
        Value::List(items) => (
            items
                .iter()
                .take(limit)
                .map(|v| Formatter::General.format(v, &NoNames))
                .collect(),
            items.len(),
        ),
        other => {
            let size = other.as_i64().unwrap_or(0).max(0) as usize;
            (vec![format_number(0.0); size.min(limit)], size)
        }
    };
    let mut text = values.join(", ");
    if total > limit {
        text.push_str(", ...");
    }
    text
}

/// A binding cell's arrow and the object it points at.
#[derive(Debug, Default)]
struct BindingArrow {
    target: Option<Handle>,
    arrow: Option<ArrowId>,
}

impl BindingArrow {
    /// Points the arrow from `from` at the panel of `bound`, replacing the
    /// old arrow when the binding changed.
    fn retarget(
        &mut self,
        bound: Option<Handle>,
        from: ElementId,
        display: &mut DisplayManager,
        arrows: &mut ArrowManager,
        registry: &ObjectRegistry<ObjectView>,
        color: &str,
    ) -> Result<(), SessionError> {
        if bound == self.target && self.arrow.map_or(bound.is_none(), |a| arrows.contains(a)) {
            return Ok(());
        }
        if let Some(arrow) = self.arrow.take() {
            arrows.remove(display, arrow)?;
        }
        self.target = bound;
        if let Some(handle) = bound {
            if let Ok(record) = registry.resolve(handle) {
                self.arrow = Some(arrows.add(display, from, record.display, color)?);
            }
        }
        Ok(())
    }
}

// --- Texture units ---

/// Targets shown per texture unit: column header, bind target, binding query.
const UNIT_TARGETS: [(&str, u32, u32); 2] = [
    ("TEXTURE_2D", TEXTURE_2D, TEXTURE_BINDING_2D),
    ("TEXTURE_CUBE_MAP", TEXTURE_CUBE_MAP, TEXTURE_BINDING_CUBE_MAP),
];

pub(super) struct TextureUnitsView {
    rows: Vec<RowHandle>,
    cells: Vec<[DiffCell; 2]>,
    arrows: Vec<[BindingArrow; 2]>,
}

impl TextureUnitsView {
    pub(super) fn build(
        display: &mut DisplayManager,
        panel: ElementId,
        units: usize,
    ) -> Result<Self, SessionError> {
        let expander = display.create_expander(panel, "texture units")?;
        let table = display.create_table(expander)?;
        let header = display.create_row(table, "unit", "", UNIT_TARGETS.len())?;
        for (cell, (name, _, _)) in header.cells.iter().zip(UNIT_TARGETS) {
            display.set_text(*cell, name)?;
        }
        let mut rows = Vec::with_capacity(units);
        let mut cells = Vec::with_capacity(units);
        let mut arrows = Vec::with_capacity(units);
        for unit in 0..units {
            let row = display.create_row(
                table,
                &unit.to_string(),
                "Textures bound to this unit: gl.activeTexture(gl.TEXTURE0 + unit) then gl.bindTexture.",
                UNIT_TARGETS.len(),
            )?;
            cells.push([DiffCell::new(row.cells[0]), DiffCell::new(row.cells[1])]);
            arrows.push([BindingArrow::default(), BindingArrow::default()]);
            rows.push(row);
        }
        Ok(Self {
            rows,
            cells,
            arrows,
        })
    }
}

// --- Vertex array ---

/// One column of the attribute grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeColumn {
    pub header: &'static str,
    pub pname: u32,
    pub formatter: Formatter,
}

pub static ATTRIBUTE_COLUMNS: &[AttributeColumn] = &[
    AttributeColumn {
        header: "enabled",
        pname: VERTEX_ATTRIB_ARRAY_ENABLED,
        formatter: Formatter::Boolean,
    },
    AttributeColumn {
        header: "value",
        pname: CURRENT_VERTEX_ATTRIB,
        formatter: Formatter::Uniform,
    },
    AttributeColumn {
        header: "size",
        pname: VERTEX_ATTRIB_ARRAY_SIZE,
        formatter: Formatter::General,
    },
    AttributeColumn {
        header: "type",
        pname: VERTEX_ATTRIB_ARRAY_TYPE,
        formatter: Formatter::Enum,
    },
    AttributeColumn {
        header: "normalize",
        pname: VERTEX_ATTRIB_ARRAY_NORMALIZED,
        formatter: Formatter::Boolean,
    },
    AttributeColumn {
        header: "stride",
        pname: VERTEX_ATTRIB_ARRAY_STRIDE,
        formatter: Formatter::General,
    },
    AttributeColumn {
        header: "offset",
        pname: VERTEX_ATTRIB_ARRAY_POINTER,
        formatter: Formatter::General,
    },
    AttributeColumn {
        header: "buffer",
        pname: VERTEX_ATTRIB_ARRAY_BUFFER_BINDING,
        formatter: Formatter::Object,
    },
];

const BUFFER_COLUMN: usize = 7;

pub(super) struct VertexArrayView {
    /// `ELEMENT_ARRAY_BUFFER_BINDING` table.
    pub(super) table: TableId,
    cells: Vec<Vec<DiffCell>>,
    arrows: Vec<BindingArrow>,
}

impl VertexArrayView {
    pub(super) fn build(
        display: &mut DisplayManager,
        tables: &mut Vec<StateTable>,
        api: &mut dyn ObservedApi,
        names: &dyn NameLookup,
        attribs: usize,
    ) -> Result<Self, SessionError> {
        let panel = display.create_panel("vertex-array", "default vertex array")?;
        let table = StateTable::build(
            display,
            panel,
            "vertex array state",
            VERTEX_ARRAY_STATE,
            parameter_query(),
            api,
            names,
        )?;
        let table_id = TableId(tables.len());
        tables.push(table);

        let expander = display.create_expander(panel, "attributes")?;
        let grid = display.create_table(expander)?;
        let header = display.create_row(grid, "", "", ATTRIBUTE_COLUMNS.len())?;
        for (cell, column) in header.cells.iter().zip(ATTRIBUTE_COLUMNS) {
            display.set_text(*cell, column.header)?;
        }
        let mut cells = Vec::with_capacity(attribs);
        let mut arrows = Vec::with_capacity(attribs);
        for index in 0..attribs {
            let row = display.create_row(
                grid,
                &index.to_string(),
                "Set with gl.vertexAttribPointer, gl.enableVertexAttribArray and gl.vertexAttrib4f.",
                ATTRIBUTE_COLUMNS.len(),
            )?;
            cells.push(row.cells.iter().copied().map(DiffCell::new).collect());
            arrows.push(BindingArrow::default());
        }
        Ok(Self {
            table: table_id,
            cells,
            arrows,
        })
    }
}

// --- Diagram updates ---

impl Diagram {
    /// Builds the panel contents for a freshly created object.
    pub(super) fn build_view(
        &mut self,
        kind: ObjectKind,
        handle: Handle,
        panel: ElementId,
        api: &mut dyn ObservedApi,
    ) -> Result<ObjectView, SessionError> {
        let display = &mut self.display;
        let view = match kind {
            ObjectKind::Texture => {
                let table =
                    StateTable::build_deferred(display, panel, "texture state", TEXTURE_STATE)?;
                ObjectView::Texture {
                    target: None,
                    table: self.push_table(table),
                }
            }
            ObjectKind::Buffer => {
                let data = DiffCell::new(display.create_text(panel, "")?);
                ObjectView::Buffer { data }
            }
            ObjectKind::Shader => {
                let source = DiffCell::new(display.create_text(panel, "")?);
                let table = StateTable::build(
                    display,
                    panel,
                    "state",
                    SHADER_STATE,
                    shader_query(handle),
                    api,
                    &self.registry,
                )?;
                ObjectView::Shader {
                    source,
                    table: self.push_table(table),
                }
            }
            ObjectKind::Program => {
                let expander = display.create_expander(panel, "attached shaders")?;
                let list = display.create_table(expander)?;
                let table = StateTable::build(
                    display,
                    panel,
                    "state",
                    PROGRAM_STATE,
                    program_query(handle),
                    api,
                    &self.registry,
                )?;
                let expander = display.create_expander(panel, "attribute info")?;
                let attribute_list = display.create_table(expander)?;
                let expander = display.create_expander(panel, "uniforms")?;
                let uniform_list = display.create_table(expander)?;
                ObjectView::Program(ProgramView {
                    list,
                    attached: Vec::new(),
                    table: self.push_table(table),
                    attribute_list,
                    attributes: Vec::new(),
                    uniform_list,
                    uniforms: Vec::new(),
                })
            }
        };
        Ok(view)
    }

    fn push_table(&mut self, table: StateTable) -> TableId {
        let id = TableId(self.tables.len());
        self.tables.push(table);
        id
    }

    fn view_mut(&mut self, handle: Handle) -> Result<&mut ObjectView, SessionError> {
        Ok(&mut self.registry.resolve_mut(handle)?.extra)
    }

    /// Records the target of a texture's first bind and paints its table.
    pub(super) fn texture_bound(
        &mut self,
        texture: Handle,
        bind_target: u32,
        api: &mut dyn ObservedApi,
    ) -> Result<(), SessionError> {
        let table = match self.view_mut(texture)? {
            ObjectView::Texture { target, table } if target.is_none() => {
                *target = Some(bind_target);
                *table
            }
            _ => return Ok(()),
        };
        debug!("Diagram: texture {} bound to {:#x}", texture, bind_target);
        if let Some(table) = self.tables.get_mut(table.0) {
            table.attach_query(texture_query(bind_target));
        }
        self.update_table(table, api)?;
        Ok(())
    }

    /// Refreshes the table of the texture bound to `target` on the active
    /// unit.
    pub(super) fn update_bound_texture(
        &mut self,
        target: u32,
        api: &mut dyn ObservedApi,
    ) -> Result<(), SessionError> {
        let Some(&(_, _, binding)) = UNIT_TARGETS.iter().find(|(_, t, _)| *t == target) else {
            return Ok(());
        };
        let Some(Some(texture)) = api.invoke("getParameter", &[Value::from(binding)])?.as_object()
        else {
            return Ok(());
        };
        if let ObjectView::Texture {
            table,
            target: Some(_),
        } = self.view_mut(texture)?
        {
            let table = *table;
            self.update_table(table, api)?;
        }
        Ok(())
    }

    /// Shows new buffer contents in the data cell of the buffer bound to
    /// `target`. Flashes on every upload.
    pub(super) fn buffer_uploaded(
        &mut self,
        target: u32,
        data: &Value,
        api: &mut dyn ObservedApi,
    ) -> Result<(), SessionError> {
        let binding = match target {
            ARRAY_BUFFER => ARRAY_BUFFER_BINDING,
            ELEMENT_ARRAY_BUFFER => ELEMENT_ARRAY_BUFFER_BINDING,
            _ => return Ok(()),
        };
        let Some(Some(buffer)) = api.invoke("getParameter", &[Value::from(binding)])?.as_object()
        else {
            return Ok(());
        };
        let text = buffer_preview(data, self.buffer_preview);
        let record = self.registry.resolve_mut(buffer)?;
        if let ObjectView::Buffer { data } = &mut record.extra {
            data.set(&mut self.display, &text, false)?;
            self.display.flash(data.element())?;
        }
        Ok(())
    }

    pub(super) fn shader_source_set(&mut self, shader: Handle, source: &str) -> Result<(), SessionError> {
        let record = self.registry.resolve_mut(shader)?;
        if let ObjectView::Shader { source: cell, .. } = &mut record.extra {
            cell.set(&mut self.display, source, true)?;
        }
        Ok(())
    }

    /// Re-queries the state table of an object, if it has one.
    pub(super) fn update_object_table(
        &mut self,
        handle: Handle,
        api: &mut dyn ObservedApi,
    ) -> Result<usize, SessionError> {
        match self.registry.resolve(handle)?.extra.table() {
            Some(table) => self.update_table(table, api),
            None => Ok(0),
        }
    }

    /// Rebuilds a program's attached-shader list, vertex shaders first, and
    /// connects the program to every attached shader.
    pub(super) fn update_attached_shaders(
        &mut self,
        program: Handle,
        api: &mut dyn ObservedApi,
    ) -> Result<(), SessionError> {
        let listed = api.invoke("getAttachedShaders", &[Value::Object(program)])?;
        let mut shaders = Vec::new();
        for value in listed.as_list().unwrap_or(&[]) {
            let Some(Some(shader)) = value.as_object() else {
                continue;
            };
            // A deleted shader stays attached in GL but has no panel left.
            let Ok(record) = self.registry.resolve(shader) else {
                continue;
            };
            let shader_type = api
                .invoke("getShaderParameter", &[Value::Object(shader), Value::from(SHADER_TYPE)])?
                .as_u32();
            let order = if shader_type == Some(VERTEX_SHADER) { 0 } else { 1 };
            shaders.push((order, shader, record.name.clone(), record.display));
        }
        shaders.sort_by_key(|&(order, ..)| order);

        let record = self.registry.resolve_mut(program)?;
        let program_panel = record.display;
        let ObjectView::Program(view) = &mut record.extra else {
            return Ok(());
        };
        let display = &mut self.display;
        let mut previous = mem::take(&mut view.attached);
        for old in &previous {
            display.remove(old.row.row)?;
        }
        for (_, shader, name, panel) in shaders {
            let row = display.create_row(view.list, &name, "", 0)?;
            let arrow = match previous.iter().position(|a| a.shader == shader) {
                Some(index) => previous.swap_remove(index).arrow,
                None => {
                    display.flash(row.row)?;
                    self.arrows.add(display, program_panel, panel, &self.arrow_color)?
                }
            };
            view.attached.push(AttachedShader { shader, row, arrow });
        }
        for gone in previous {
            self.arrows.remove(display, gone.arrow)?;
        }
        trace!("Diagram: program {} has {} shaders", program, view.attached.len());
        Ok(())
    }

    /// Rebuilds a program's attribute and uniform tables from what the
    /// last link exposed. Both are emptied when the link failed.
    pub(super) fn scan_program(
        &mut self,
        program: Handle,
        api: &mut dyn ObservedApi,
    ) -> Result<(), SessionError> {
        let target = Value::Object(program);
        let linked = api
            .invoke("getProgramParameter", &[target.clone(), Value::from(LINK_STATUS)])?
            .truthy();
        let mut attributes = Vec::new();
        let mut uniforms = Vec::new();
        if linked {
            for info in active_variables(api, &target, "getActiveAttrib", ACTIVE_ATTRIBUTES)? {
                let name = Value::from(info.name.as_str());
                let location = api.invoke("getAttribLocation", &[target.clone(), name])?;
                let text = Formatter::General.format(&location, &NoNames);
                attributes.push((info.name, Value::Null, text));
            }
            for info in active_variables(api, &target, "getActiveUniform", ACTIVE_UNIFORMS)? {
                let name = Value::from(info.name.as_str());
                let location = api.invoke("getUniformLocation", &[target.clone(), name])?;
                let value = match location {
                    Value::Null => Value::Null,
                    _ => api.invoke("getUniform", &[target.clone(), location.clone()])?,
                };
                let text = Formatter::Uniform.format(&value, &self.registry);
                uniforms.push((info.name, location, text));
            }
        }

        let record = self.registry.resolve_mut(program)?;
        let ObjectView::Program(view) = &mut record.extra else {
            return Ok(());
        };
        let display = &mut self.display;
        view.attributes = rebuild_rows(display, view.attribute_list, &view.attributes, attributes)?;
        view.uniforms = rebuild_rows(display, view.uniform_list, &view.uniforms, uniforms)?;
        debug!(
            "Diagram: program {} has {} attributes, {} uniforms",
            program,
            view.attributes.len(),
            view.uniforms.len()
        );
        Ok(())
    }

    /// Re-reads every uniform of `program`. Returns the number of values
    /// that changed; those cells flash.
    pub(super) fn update_uniforms(
        &mut self,
        program: Handle,
        api: &mut dyn ObservedApi,
    ) -> Result<usize, SessionError> {
        let record = self.registry.resolve_mut(program)?;
        let ObjectView::Program(view) = &mut record.extra else {
            return Ok(0);
        };
        let mut changed = 0;
        for uniform in &mut view.uniforms {
            if uniform.location == Value::Null {
                continue;
            }
            let value = api.invoke(
                "getUniform",
                &[Value::Object(program), uniform.location.clone()],
            )?;
            // Uniform values hold no handles.
            let text = Formatter::Uniform.format(&value, &NoNames);
            if uniform.cell.set(&mut self.display, &text, true)? {
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Refreshes one texture unit's cells and arrows. `getParameter` answers
    /// for the active unit, so `unit` must be active.
    fn update_texture_unit(
        &mut self,
        unit: usize,
        api: &mut dyn ObservedApi,
        flash: bool,
    ) -> Result<(), SessionError> {
        let view = &mut self.texture_units;
        let (Some(cells), Some(arrows)) = (view.cells.get_mut(unit), view.arrows.get_mut(unit))
        else {
            return Ok(());
        };
        for (i, &(_, _, binding)) in UNIT_TARGETS.iter().enumerate() {
            let value = api.invoke("getParameter", &[Value::from(binding)])?;
            let text = Formatter::Object.format(&value, &self.registry);
            cells[i].set(&mut self.display, &text, flash)?;
            arrows[i].retarget(
                value.as_object().flatten(),
                cells[i].element(),
                &mut self.display,
                &mut self.arrows,
                &self.registry,
                &self.arrow_color,
            )?;
        }
        Ok(())
    }

    fn active_unit(api: &mut dyn ObservedApi) -> Result<usize, SessionError> {
        let active = api.invoke("getParameter", &[Value::from(ACTIVE_TEXTURE)])?;
        Ok(active
            .as_u32()
            .and_then(|v| v.checked_sub(TEXTURE0))
            .unwrap_or(0) as usize)
    }

    pub(super) fn update_active_texture_unit(
        &mut self,
        api: &mut dyn ObservedApi,
    ) -> Result<(), SessionError> {
        let unit = Self::active_unit(api)?;
        self.update_texture_unit(unit, api, true)
    }

    /// Refreshes every unit by switching the active unit on the unwrapped
    /// API, then restores it.
    pub(super) fn update_all_texture_units(
        &mut self,
        api: &mut dyn ObservedApi,
        flash: bool,
    ) -> Result<(), SessionError> {
        let active = Self::active_unit(api)?;
        for unit in 0..self.texture_units.rows.len() {
            api.invoke("activeTexture", &[Value::from(TEXTURE0 + unit as u32)])?;
            self.update_texture_unit(unit, api, flash)?;
        }
        api.invoke("activeTexture", &[Value::from(TEXTURE0 + active as u32)])?;
        Ok(())
    }

    /// Refreshes the attribute grid.
    pub(super) fn update_attributes(
        &mut self,
        api: &mut dyn ObservedApi,
        flash: bool,
    ) -> Result<usize, SessionError> {
        let view = &mut self.vertex_array;
        let mut changed = 0;
        for (index, (cells, arrow)) in view.cells.iter_mut().zip(&mut view.arrows).enumerate() {
            let index_arg = Value::from(index as u32);
            for (column, cell) in ATTRIBUTE_COLUMNS.iter().zip(cells.iter_mut()) {
                let operation = if column.pname == VERTEX_ATTRIB_ARRAY_POINTER {
                    "getVertexAttribOffset"
                } else {
                    "getVertexAttrib"
                };
                let value =
                    api.invoke(operation, &[index_arg.clone(), Value::from(column.pname)])?;
                let text = column.formatter.format(&value, &self.registry);
                if cell.set(&mut self.display, &text, flash)? {
                    changed += 1;
                }
                if column.pname == VERTEX_ATTRIB_ARRAY_BUFFER_BINDING {
                    arrow.retarget(
                        value.as_object().flatten(),
                        cell.element(),
                        &mut self.display,
                        &mut self.arrows,
                        &self.registry,
                        &self.arrow_color,
                    )?;
                }
            }
        }
        Ok(changed)
    }

    /// Text of a texture unit cell; `target_index` 0 is 2D, 1 is cube map.
    pub fn texture_unit_text(&self, unit: usize, target_index: usize) -> Option<&str> {
        self.texture_units
            .cells
            .get(unit)
            .and_then(|cells| cells.get(target_index))
            .and_then(DiffCell::text)
    }

    /// Text of one attribute grid cell, by column header.
    pub fn attribute_text(&self, index: usize, header: &str) -> Option<&str> {
        let column = ATTRIBUTE_COLUMNS.iter().position(|c| c.header == header)?;
        self.vertex_array
            .cells
            .get(index)
            .and_then(|cells| cells.get(column))
            .and_then(DiffCell::text)
    }

    /// Value cell of the buffer column for attribute `index`.
    pub fn attribute_buffer_cell(&self, index: usize) -> Option<ElementId> {
        self.vertex_array
            .cells
            .get(index)
            .and_then(|cells| cells.get(BUFFER_COLUMN))
            .map(DiffCell::element)
    }

    /// Cell showing the texture bound to `target_index` of `unit`.
    pub fn texture_unit_cell(&self, unit: usize, target_index: usize) -> Option<ElementId> {
        self.texture_units
            .cells
            .get(unit)
            .and_then(|cells| cells.get(target_index))
            .map(DiffCell::element)
    }

    /// Text shown in a buffer's data cell or a shader's source cell.
    pub fn object_text(&self, handle: Handle) -> Option<&str> {
        match &self.registry.resolve(handle).ok()?.extra {
            ObjectView::Buffer { data } => data.text(),
            ObjectView::Shader { source, .. } => source.text(),
            _ => None,
        }
    }

    fn program_view(&self, program: Handle) -> Option<&ProgramView> {
        match &self.registry.resolve(program).ok()?.extra {
            ObjectView::Program(view) => Some(view),
            _ => None,
        }
    }

    /// Location shown for an active attribute of a program.
    pub fn program_attribute_text(&self, program: Handle, name: &str) -> Option<&str> {
        find_row(&self.program_view(program)?.attributes, name)?.cell.text()
    }

    /// Value shown for a uniform of a program, by its active name.
    pub fn program_uniform_text(&self, program: Handle, name: &str) -> Option<&str> {
        find_row(&self.program_view(program)?.uniforms, name)?.cell.text()
    }

    /// Cell showing a program's uniform.
    pub fn program_uniform_cell(&self, program: Handle, name: &str) -> Option<ElementId> {
        find_row(&self.program_view(program)?.uniforms, name).map(|r| r.cell.element())
    }

    /// State table of a live object.
    pub fn object_table(&self, handle: Handle) -> Option<&StateTable> {
        let id = self.registry.resolve(handle).ok()?.extra.table()?;
        self.table(id)
    }

    pub fn vertex_array_table(&self) -> Option<&StateTable> {
        self.table(self.vertex_array.table)
    }
}

// --- Program interface ---

/// Active attributes or uniforms of a linked program, built-ins left out.
fn active_variables(
    api: &mut dyn ObservedApi,
    program: &Value,
    operation: &str,
    count: u32,
) -> Result<Vec<ActiveInfo>, SessionError> {
    let count = api
        .invoke("getProgramParameter", &[program.clone(), Value::from(count)])?
        .as_i64()
        .unwrap_or(0);
    let mut infos = Vec::new();
    for index in 0..count {
        let reply = api.invoke(operation, &[program.clone(), Value::Int(index)])?;
        match ActiveInfo::from_value(&reply) {
            Some(info) if !info.is_built_in() => infos.push(info),
            Some(_) => {}
            None => trace!("Diagram: {} {} returned {:?}", operation, index, reply),
        }
    }
    Ok(infos)
}

/// Replaces the rows of `table` with one row per `(name, location, text)`.
/// Rows new to the table flash.
fn rebuild_rows(
    display: &mut DisplayManager,
    table: ElementId,
    old: &[VariableRow],
    rows: Vec<(String, Value, String)>,
) -> Result<Vec<VariableRow>, SessionError> {
    for row in old {
        display.remove(row.row)?;
    }
    let mut built = Vec::with_capacity(rows.len());
    for (name, location, text) in rows {
        let handle = display.create_row(table, &name, "", 1)?;
        let mut cell = DiffCell::new(handle.cells[0]);
        cell.set(display, &text, false)?;
        if find_row(old, &name).is_none() {
            display.flash(handle.row)?;
        }
        built.push(VariableRow {
            name,
            row: handle.row,
            cell,
            location,
        });
    }
    Ok(built)
}
