//! Editor configuration.
//!
//! All tolerances, bounds and policies the engine uses are collected in
//! [`EditorConfig`]. Every field has a default, so a TOML file only needs to
//! list the values it changes:
//!
//! ```toml
//! snap_to_grid = true
//! grid_size = 25.0
//! max_zoom = 4.0
//!
//! [socket_layout]
//! spacing = 24.0
//! ```

use crate::error::ConfigError;
use crate::model::SocketLayout;
use crate::path::DEFAULT_SEGMENTS;
use crate::state::CurveParams;
use crate::viewport::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    // Grid
    pub grid_size: f32,
    /// Every n-th grid line is drawn as a major line
    pub major_grid_every: u32,
    pub snap_to_grid: bool,

    // Zoom and pan
    pub zoom_enabled: bool,
    pub pan_enabled: bool,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Zoom factor per wheel notch
    pub scroll_zoom_speed: f32,
    pub pan_speed: f32,
    /// World units of margin around content when framing
    pub frame_padding: f32,

    // Hit-testing and geometry
    /// Socket hit radius as a multiple of the visual socket radius
    pub socket_hit_scale: f32,
    /// Connection hit tolerance in screen pixels
    pub connection_hit_tolerance: f32,
    pub bezier_segments: usize,
    pub bezier_min_offset: f32,
    pub bezier_offset_ratio: f32,
    /// Screen pixels added around the panel when culling
    pub viewport_padding: f32,

    // Selection
    pub allow_multiple_selection: bool,
    pub rectangle_selection_enabled: bool,
    /// Clicking empty background clears the selection, and clicking a
    /// connection clears the node selection
    pub allow_background_deselection: bool,

    // Connections
    pub allow_duplicate_connections: bool,
    /// Reject connections that would close a cycle
    pub forbid_cycles: bool,

    // Feedback
    pub highlight_hovered_elements: bool,
    pub context_menu_on_background: bool,
    pub context_menu_on_nodes: bool,
    pub context_menu_on_connections: bool,

    pub socket_layout: SocketLayout,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: 20.0,
            major_grid_every: 5,
            snap_to_grid: false,
            zoom_enabled: true,
            pan_enabled: true,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            scroll_zoom_speed: 0.1,
            pan_speed: 1.0,
            frame_padding: 50.0,
            socket_hit_scale: 2.0,
            connection_hit_tolerance: 8.0,
            bezier_segments: DEFAULT_SEGMENTS,
            bezier_min_offset: 50.0,
            bezier_offset_ratio: 0.5,
            viewport_padding: 100.0,
            allow_multiple_selection: true,
            rectangle_selection_enabled: true,
            allow_background_deselection: true,
            allow_duplicate_connections: false,
            forbid_cycles: false,
            highlight_hovered_elements: true,
            context_menu_on_background: true,
            context_menu_on_nodes: true,
            context_menu_on_connections: true,
            socket_layout: SocketLayout::default(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        tracing::debug!(?path, "loading editor config");
        Self::from_toml_str(&source)
    }

    /// Load a config file, falling back to defaults on any error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::from_path(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load editor config, using defaults: {}", e);
            Self::default()
        })
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Check that values are usable together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("min_zoom", self.min_zoom)?;
        positive("max_zoom", self.max_zoom)?;
        if self.min_zoom > self.max_zoom {
            return Err(ConfigError::invalid(
                "min_zoom",
                format!("{} is greater than max_zoom {}", self.min_zoom, self.max_zoom),
            ));
        }
        positive("grid_size", self.grid_size)?;
        positive("scroll_zoom_speed", self.scroll_zoom_speed)?;
        positive("pan_speed", self.pan_speed)?;
        positive("socket_hit_scale", self.socket_hit_scale)?;
        non_negative("connection_hit_tolerance", self.connection_hit_tolerance)?;
        non_negative("bezier_min_offset", self.bezier_min_offset)?;
        non_negative("bezier_offset_ratio", self.bezier_offset_ratio)?;
        non_negative("viewport_padding", self.viewport_padding)?;
        non_negative("frame_padding", self.frame_padding)?;
        non_negative("socket_layout.radius", self.socket_layout.radius)?;
        non_negative("socket_layout.spacing", self.socket_layout.spacing)?;
        if self.bezier_segments == 0 {
            return Err(ConfigError::invalid("bezier_segments", "must be at least 1"));
        }
        if self.major_grid_every == 0 {
            return Err(ConfigError::invalid("major_grid_every", "must be at least 1"));
        }
        Ok(())
    }

    /// World-space radius within which a pointer grabs a socket.
    pub fn socket_hit_radius(&self) -> f32 {
        self.socket_layout.radius * self.socket_hit_scale
    }

    pub fn curve_params(&self) -> CurveParams {
        CurveParams {
            min_offset: self.bezier_min_offset,
            offset_ratio: self.bezier_offset_ratio,
            segments: self.bezier_segments,
        }
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be positive, got {}", value)))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must not be negative, got {}", value)))
    }
}
