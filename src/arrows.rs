// src/arrows.rs
//! Arrow manager: curved connectors between two independently draggable
//! elements.
//!
//! The manager never owns the elements it connects. Layout changes are not
//! observed; callers invoke [`ArrowManager::update`] after anything that may
//! have moved or removed an endpoint.

use std::collections::HashMap;

use log::debug;

use crate::display::{DisplayManager, ElementId, Rect};
use crate::error::DisplayError;

/// Margins used to place an arrow between two elements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowGeometry {
    /// Gap between the right edge of the source and the arrow's start.
    pub start_offset: f64,
    /// Gap between the arrow's end and the left edge of the target (room for the head).
    pub end_offset: f64,
    /// Horizontal distance of the bezier control points from each end.
    pub control_point_offset: f64,
}

impl Default for ArrowGeometry {
    fn default() -> Self {
        Self {
            start_offset: 1.0,
            end_offset: 15.0,
            control_point_offset: 50.0,
        }
    }
}

/// SVG path data from the right edge of `a` to the left edge of `b`.
pub fn arrow_path(a: Rect, b: Rect, geometry: &ArrowGeometry) -> String {
    let ax = a.right() + geometry.start_offset;
    let ay = a.top + a.height / 2.0;
    let bx = b.left - geometry.end_offset;
    let by = b.top + b.height / 2.0;
    let cp = geometry.control_point_offset;
    format!(
        "M{},{} C{},{} {},{} {},{}",
        ax,
        ay,
        ax + cp,
        ay,
        bx - cp,
        by,
        bx,
        by
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArrowId(u32);

#[derive(Debug, Clone)]
pub struct ArrowLink {
    pub id: ArrowId,
    pub from: ElementId,
    pub to: ElementId,
    pub group: ElementId,
    pub path: ElementId,
    pub color: String,
    last_d: String,
}

pub struct ArrowManager {
    geometry: ArrowGeometry,
    links: Vec<ArrowLink>,
    /// Arrowhead definitions, one per color.
    markers: HashMap<String, ElementId>,
    next_id: u32,
}

impl ArrowManager {
    pub fn new(geometry: ArrowGeometry) -> Self {
        Self {
            geometry,
            links: Vec::new(),
            markers: HashMap::new(),
            next_id: 0,
        }
    }

    fn marker(&mut self, display: &mut DisplayManager, color: &str) -> Result<ElementId, DisplayError> {
        if let Some(marker) = self.markers.get(color) {
            return Ok(*marker);
        }
        let marker = display.create_marker(color)?;
        self.markers.insert(color.to_string(), marker);
        Ok(marker)
    }

    /// Connects `from` to `to` and draws the arrow at once.
    pub fn add(
        &mut self,
        display: &mut DisplayManager,
        from: ElementId,
        to: ElementId,
        color: &str,
    ) -> Result<ArrowId, DisplayError> {
        let marker = self.marker(display, color)?;
        let arrow = display.create_arrow(marker, color)?;
        let d = arrow_path(display.bounds(from)?, display.bounds(to)?, &self.geometry);
        display.set_path(arrow.path, &d)?;
        let id = ArrowId(self.next_id);
        self.next_id += 1;
        debug!("ArrowManager: {:?} {} -> {} ({})", id, from, to, color);
        self.links.push(ArrowLink {
            id,
            from,
            to,
            group: arrow.group,
            path: arrow.path,
            color: color.to_string(),
            last_d: d,
        });
        Ok(id)
    }

    /// Detaches the arrow. Unknown ids are skipped.
    pub fn remove(&mut self, display: &mut DisplayManager, id: ArrowId) -> Result<(), DisplayError> {
        let Some(index) = self.links.iter().position(|l| l.id == id) else {
            debug!("ArrowManager: {:?} not found, nothing to remove", id);
            return Ok(());
        };
        let link = self.links.remove(index);
        display.remove(link.group)
    }

    /// Drops arrows whose endpoints left the document, then redraws the rest.
    /// Returns the number of arrows dropped. On error, links not yet checked
    /// are kept.
    pub fn update(&mut self, display: &mut DisplayManager) -> Result<usize, DisplayError> {
        let mut pruned = 0;
        let mut index = 0;
        while let Some(link) = self.links.get(index) {
            if display.is_attached(link.to)? && display.is_attached(link.from)? {
                index += 1;
                continue;
            }
            debug!("ArrowManager: pruning {:?}, endpoint detached", link.id);
            display.remove(link.group)?;
            self.links.remove(index);
            pruned += 1;
        }

        for link in &mut self.links {
            let d = arrow_path(
                display.bounds(link.from)?,
                display.bounds(link.to)?,
                &self.geometry,
            );
            if d != link.last_d {
                display.set_path(link.path, &d)?;
                link.last_d = d;
            }
        }
        Ok(pruned)
    }

    pub fn links(&self) -> &[ArrowLink] {
        &self.links
    }

    pub fn contains(&self, id: ArrowId) -> bool {
        self.links.iter().any(|l| l.id == id)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[cfg(test)]
mod tests;
