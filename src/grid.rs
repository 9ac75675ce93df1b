use crate::viewport::ViewportTransform;
use std::fmt::Write;

/// Lines closer together than this (in pixels) are not drawn.
pub const MIN_VISIBLE_SPACING: f32 = 4.0;

/// Round a coordinate to the nearest multiple of `grid`.
///
/// A non-positive or non-finite grid leaves the value unchanged.
pub fn snap_to_grid(value: f32, grid: f32) -> f32 {
    if grid <= 0.0 || !grid.is_finite() {
        return value;
    }
    (value / grid).round() * grid
}

pub fn snap_point(point: (f32, f32), grid: f32) -> (f32, f32) {
    (snap_to_grid(point.0, grid), snap_to_grid(point.1, grid))
}

/// One grid line in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    /// X for vertical lines, Y for horizontal lines
    pub position: f32,
    /// Every `major_every`-th world line is major
    pub major: bool,
}

/// Visible grid lines for the current viewport.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridLines {
    pub vertical: Vec<GridLine>,
    pub horizontal: Vec<GridLine>,
    /// Panel size the lines were computed for
    pub extent: (f32, f32),
}

impl GridLines {
    /// Compute the grid lines covering the viewport's panel.
    ///
    /// `spacing` is in world units. Lines sit at world multiples of `spacing`,
    /// so the grid scrolls with the content. Returns no lines when the zoomed
    /// spacing is below [`MIN_VISIBLE_SPACING`].
    pub fn compute(viewport: &ViewportTransform, spacing: f32, major_every: u32) -> Self {
        let extent = viewport.panel_size();
        let step = viewport.scale_to_screen(spacing);
        if !step.is_finite() || step < MIN_VISIBLE_SPACING {
            return Self {
                extent,
                ..Self::default()
            };
        }

        let (pan_x, pan_y) = viewport.pan();
        Self {
            vertical: lines_along(extent.0, pan_x * viewport.zoom(), step, major_every),
            horizontal: lines_along(extent.1, pan_y * viewport.zoom(), step, major_every),
            extent,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertical.is_empty() && self.horizontal.is_empty()
    }

    /// SVG path commands for the minor or major lines.
    pub fn to_svg_path(&self, major: bool) -> String {
        let (width, height) = self.extent;
        let mut commands = String::new();
        for line in self.vertical.iter().filter(|l| l.major == major) {
            if !commands.is_empty() {
                commands.push(' ');
            }
            let _ = write!(commands, "M {} 0 L {} {}", line.position, line.position, height);
        }
        for line in self.horizontal.iter().filter(|l| l.major == major) {
            if !commands.is_empty() {
                commands.push(' ');
            }
            let _ = write!(commands, "M 0 {} L {} {}", line.position, width, line.position);
        }
        commands
    }
}

/// Screen positions of grid lines along one axis of length `length`.
///
/// World line `k` sits at screen `k * step + pan_screen`.
fn lines_along(length: f32, pan_screen: f32, step: f32, major_every: u32) -> Vec<GridLine> {
    let first = (-pan_screen / step).ceil() as i64;
    let last = ((length - pan_screen) / step).floor() as i64;
    let major_every = i64::from(major_every.max(1));
    (first..=last)
        .map(|k| GridLine {
            position: k as f32 * step + pan_screen,
            major: k.rem_euclid(major_every) == 0,
        })
        .collect()
}
