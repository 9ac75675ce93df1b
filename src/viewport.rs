//! Pan/zoom state and world <-> screen conversion.
//!
//! The transform is `screen = (world + pan) * zoom`. Pan is stored in world
//! units, so panning by a screen delta divides by the current zoom.

use crate::graph::Graph;
use crate::hit_test::Rect;
use crate::model::{ConnectionId, Node, NodeId};
use std::collections::HashSet;

pub const DEFAULT_MIN_ZOOM: f32 = 0.2;
pub const DEFAULT_MAX_ZOOM: f32 = 3.0;

/// Smallest zoom ever applied, whatever the configured bounds say.
const ZOOM_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewportTransform {
    zoom: f32,
    pan: (f32, f32),
    panel_size: (f32, f32),
    min_zoom: f32,
    max_zoom: f32,
}

/// Entities whose geometry overlaps the visible area.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CullResult {
    /// Visible nodes in draw order
    pub nodes: Vec<NodeId>,
    /// Visible connections in insertion order
    pub connections: Vec<ConnectionId>,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::new((0.0, 0.0))
    }
}

impl ViewportTransform {
    pub fn new(panel_size: (f32, f32)) -> Self {
        Self {
            zoom: 1.0,
            pan: (0.0, 0.0),
            panel_size,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }

    /// Set the zoom bounds. Bounds are sanitized so that
    /// `0 < min_zoom <= max_zoom`, and the current zoom is re-clamped.
    pub fn with_zoom_bounds(mut self, min_zoom: f32, max_zoom: f32) -> Self {
        let min = if min_zoom.is_finite() { min_zoom.max(ZOOM_EPSILON) } else { DEFAULT_MIN_ZOOM };
        let max = if max_zoom.is_finite() { max_zoom.max(min) } else { DEFAULT_MAX_ZOOM.max(min) };
        if min != min_zoom || max != max_zoom {
            tracing::warn!(min_zoom, max_zoom, min, max, "zoom bounds adjusted");
        }
        self.min_zoom = min;
        self.max_zoom = max;
        self.zoom = self.clamp_zoom(self.zoom);
        self
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn pan(&self) -> (f32, f32) {
        self.pan
    }

    pub fn panel_size(&self) -> (f32, f32) {
        self.panel_size
    }

    pub fn zoom_bounds(&self) -> (f32, f32) {
        (self.min_zoom, self.max_zoom)
    }

    pub fn set_panel_size(&mut self, width: f32, height: f32) {
        self.panel_size = (width.max(0.0), height.max(0.0));
    }

    /// Clamp a zoom value to the configured bounds. Non-finite input falls
    /// back to the current zoom.
    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        if zoom.is_finite() {
            zoom.clamp(self.min_zoom, self.max_zoom)
        } else {
            self.zoom
        }
    }

    pub fn world_to_screen(&self, world: (f32, f32)) -> (f32, f32) {
        (
            (world.0 + self.pan.0) * self.zoom,
            (world.1 + self.pan.1) * self.zoom,
        )
    }

    pub fn screen_to_world(&self, screen: (f32, f32)) -> (f32, f32) {
        (
            screen.0 / self.zoom - self.pan.0,
            screen.1 / self.zoom - self.pan.1,
        )
    }

    /// Convert a world-space length to screen pixels.
    pub fn scale_to_screen(&self, length: f32) -> f32 {
        length * self.zoom
    }

    /// Convert a screen-space length to world units.
    pub fn scale_to_world(&self, length: f32) -> f32 {
        length / self.zoom
    }

    pub fn world_rect_to_screen(&self, rect: &Rect) -> Rect {
        let (x, y) = self.world_to_screen((rect.x, rect.y));
        Rect::new(x, y, self.scale_to_screen(rect.width), self.scale_to_screen(rect.height))
    }

    pub fn screen_rect_to_world(&self, rect: &Rect) -> Rect {
        let (x, y) = self.screen_to_world((rect.x, rect.y));
        Rect::new(x, y, self.scale_to_world(rect.width), self.scale_to_world(rect.height))
    }

    /// Set the zoom without adjusting pan. Returns true if the zoom changed.
    pub fn set_zoom(&mut self, zoom: f32) -> bool {
        let zoom = self.clamp_zoom(zoom);
        let changed = zoom != self.zoom;
        self.zoom = zoom;
        changed
    }

    /// Zoom so that the world point under `screen_anchor` stays put.
    ///
    /// Solving `(world_before + pan') * zoom' == anchor` for `pan'` gives
    /// `pan' = anchor / zoom' - world_before`. Returns true if the zoom changed.
    pub fn set_zoom_centered(&mut self, zoom: f32, screen_anchor: (f32, f32)) -> bool {
        let zoom = self.clamp_zoom(zoom);
        if zoom == self.zoom {
            return false;
        }
        let world_before = self.screen_to_world(screen_anchor);
        self.zoom = zoom;
        self.pan = (
            screen_anchor.0 / zoom - world_before.0,
            screen_anchor.1 / zoom - world_before.1,
        );
        true
    }

    pub fn set_pan(&mut self, x: f32, y: f32) {
        if x.is_finite() && y.is_finite() {
            self.pan = (x, y);
        }
    }

    /// Shift pan by a world-space delta.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.set_pan(self.pan.0 + dx, self.pan.1 + dy);
    }

    /// Shift pan so the content follows a screen-space pointer delta.
    pub fn pan_by_screen(&mut self, dx: f32, dy: f32) {
        self.pan_by(dx / self.zoom, dy / self.zoom);
    }

    /// Back to zoom 1 and no pan.
    pub fn reset(&mut self) {
        self.zoom = self.clamp_zoom(1.0);
        self.pan = (0.0, 0.0);
    }

    /// Visible area in world coordinates, grown by `padding` screen pixels on
    /// every side.
    pub fn visible_world_rect(&self, padding: f32) -> Rect {
        let screen = Rect::new(0.0, 0.0, self.panel_size.0, self.panel_size.1).expand(padding);
        self.screen_rect_to_world(&screen)
    }

    /// Zoom and pan so that `rect` (grown by `padding` world units) fills the
    /// panel and is centred in it.
    pub fn frame_rect(&mut self, rect: &Rect, padding: f32) {
        let padded = rect.expand(padding);
        let (panel_w, panel_h) = self.panel_size;
        if panel_w <= 0.0 || panel_h <= 0.0 {
            return;
        }
        let zoom_x = panel_w / padded.width.max(1.0);
        let zoom_y = panel_h / padded.height.max(1.0);
        self.zoom = self.clamp_zoom(zoom_x.min(zoom_y));

        let (cx, cy) = padded.center();
        self.pan = (
            panel_w * 0.5 / self.zoom - cx,
            panel_h * 0.5 / self.zoom - cy,
        );
    }

    /// Nodes intersecting the padded visible area, and connections with at
    /// least one visible endpoint node.
    pub fn cull(&self, graph: &Graph, padding: f32) -> CullResult {
        let visible = self.visible_world_rect(padding);
        let nodes: Vec<NodeId> = graph
            .nodes_in_rect(&visible)
            .into_iter()
            .map(Node::id)
            .cloned()
            .collect();

        let lookup: HashSet<&NodeId> = nodes.iter().collect();
        let connections = graph
            .connections()
            .filter(|c| lookup.contains(&c.start().node) || lookup.contains(&c.end().node))
            .map(|c| c.id().clone())
            .collect();

        CullResult { nodes, connections }
    }
}
