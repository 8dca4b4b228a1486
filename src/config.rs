// src/config.rs

//! Configuration for the diagram runner.
//!
//! Every section deserializes with defaults for missing fields, so a config
//! file only names what it changes. Files are JSON. The process-wide
//! [`CONFIG`] is read once from the path in `GL_STATE_DIAGRAM_CONFIG`, falling
//! back to defaults when the variable is unset or the file is unusable.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::arrows::ArrowGeometry;
use crate::display::HeadlessLayout;
use crate::gl::{MAX_TEXTURE_UNITS, MAX_VERTEX_ATTRIBS};
use crate::naming::DEFAULT_PATTERN;
use crate::session::SessionSettings;

/// Environment variable holding the config file path.
pub const CONFIG_ENV: &str = "GL_STATE_DIAGRAM_CONFIG";

/// Loaded on first use.
pub static CONFIG: Lazy<Config> = Lazy::new(|| match std::env::var(CONFIG_ENV) {
    Ok(path) => Config::load(&path).unwrap_or_else(|e| {
        warn!("Config: {:#}, using defaults", e);
        Config::default()
    }),
    Err(_) => Config::default(),
});

// --- Top-Level Configuration Structure ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub stepper: StepperConfig,
    pub arrows: ArrowConfig,
    pub naming: NamingConfig,
    /// Panel grid of the headless surface.
    pub layout: HeadlessLayout,
    pub diagram: DiagramConfig,
}

impl Config {
    /// Reads a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        info!("Config: loaded {}", path.display());
        Ok(config)
    }

    /// Settings for a new [`crate::session::Session`].
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            naming_pattern: self.naming.pattern.clone(),
            unknown_prefix: self.naming.unknown_prefix.clone(),
            arrow_geometry: ArrowGeometry {
                start_offset: self.arrows.start_offset,
                end_offset: self.arrows.end_offset,
                control_point_offset: self.arrows.control_point_offset,
            },
            arrow_color: self.arrows.color.clone(),
            texture_units: self.diagram.texture_units,
            vertex_attribs: self.diagram.vertex_attribs,
            buffer_preview: self.diagram.buffer_preview,
        }
    }

    /// Pause between statements in run mode.
    pub fn run_delay(&self) -> Duration {
        Duration::from_millis(self.stepper.run_delay_ms)
    }
}

// --- Sections ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepperConfig {
    pub run_delay_ms: u64,
}

impl Default for StepperConfig {
    fn default() -> Self {
        StepperConfig { run_delay_ms: 50 }
    }
}

/// Arrow look. Offsets are in surface units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrowConfig {
    pub start_offset: f64,
    pub end_offset: f64,
    pub control_point_offset: f64,
    pub color: String,
}

impl Default for ArrowConfig {
    fn default() -> Self {
        let geometry = ArrowGeometry::default();
        ArrowConfig {
            start_offset: geometry.start_offset,
            end_offset: geometry.end_offset,
            control_point_offset: geometry.control_point_offset,
            color: "red".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Regex whose first group is the created object's identifier.
    pub pattern: String,
    pub unknown_prefix: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        NamingConfig {
            pattern: DEFAULT_PATTERN.to_string(),
            unknown_prefix: "unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    /// Rows in the texture units grid. Capped at the context's unit count.
    pub texture_units: usize,
    /// Rows in the attribute grid. Capped at the context's attribute count.
    pub vertex_attribs: usize,
    /// Values shown in a buffer's data cell.
    pub buffer_preview: usize,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        DiagramConfig {
            texture_units: MAX_TEXTURE_UNITS,
            vertex_attribs: MAX_VERTEX_ATTRIBS,
            buffer_preview: 9,
        }
    }
}
