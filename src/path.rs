/// Default number of uniform segments a connection curve is sampled into.
pub const DEFAULT_SEGMENTS: usize = 32;

/// Cubic bezier curve used for connection geometry
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
    pub p0: (f32, f32), // Start point
    pub p1: (f32, f32), // Control point 1
    pub p2: (f32, f32), // Control point 2
    pub p3: (f32, f32), // End point
}

impl CubicBezier {
    /// Create a horizontal-biased bezier between two socket positions.
    ///
    /// Control points extend horizontally: `p1 = start + (offset, 0)` and
    /// `p2 = end - (offset, 0)` with `offset = max(min_offset, |dx| * offset_ratio)`.
    ///
    /// # Arguments
    /// * `start` - Output socket position
    /// * `end` - Input socket position
    /// * `min_offset` - Minimum control point offset (default: 50.0)
    /// * `offset_ratio` - Fraction of the horizontal span used as offset (default: 0.5)
    pub fn from_endpoints(
        start: (f32, f32),
        end: (f32, f32),
        min_offset: f32,
        offset_ratio: f32,
    ) -> Self {
        let offset = control_offset(start, end, min_offset, offset_ratio);
        CubicBezier {
            p0: start,
            p1: (start.0 + offset, start.1),
            p2: (end.0 - offset, end.1),
            p3: end,
        }
    }

    /// Evaluate the bezier curve at parameter t (0.0 to 1.0)
    pub fn eval(&self, t: f32) -> (f32, f32) {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        let x = mt3 * self.p0.0
            + 3.0 * mt2 * t * self.p1.0
            + 3.0 * mt * t2 * self.p2.0
            + t3 * self.p3.0;
        let y = mt3 * self.p0.1
            + 3.0 * mt2 * t * self.p1.1
            + 3.0 * mt * t2 * self.p2.1
            + t3 * self.p3.1;

        (x, y)
    }

    /// Sample the curve into `segments` uniform segments (`segments + 1` points).
    ///
    /// A segment count of zero falls back to [`DEFAULT_SEGMENTS`].
    pub fn sample(&self, segments: usize) -> Vec<(f32, f32)> {
        let segments = if segments == 0 { DEFAULT_SEGMENTS } else { segments };
        (0..=segments)
            .map(|i| self.eval(i as f32 / segments as f32))
            .collect()
    }

    /// SVG path command for this curve (e.g. "M 10 20 C 60 20 90 80 140 80")
    pub fn to_svg_path(&self) -> String {
        format!(
            "M {} {} C {} {} {} {} {} {}",
            self.p0.0,
            self.p0.1,
            self.p1.0,
            self.p1.1,
            self.p2.0,
            self.p2.1,
            self.p3.0,
            self.p3.1
        )
    }
}

/// Horizontal control point distance for a connection curve.
pub fn control_offset(start: (f32, f32), end: (f32, f32), min_offset: f32, offset_ratio: f32) -> f32 {
    let offset = ((end.0 - start.0).abs() * offset_ratio).max(min_offset);
    if offset.is_finite() {
        offset
    } else {
        min_offset
    }
}

/// Generate SVG path command for a bezier link between two points
///
/// Shorthand for [`CubicBezier::from_endpoints`] followed by
/// [`CubicBezier::to_svg_path`].
pub fn generate_bezier_path(
    start: (f32, f32),
    end: (f32, f32),
    min_offset: f32,
    offset_ratio: f32,
) -> String {
    CubicBezier::from_endpoints(start, end, min_offset, offset_ratio).to_svg_path()
}

/// SVG path command for a sampled polyline ("M x y L x y L ...").
pub fn polyline_to_svg_path(points: &[(f32, f32)]) -> String {
    let mut commands = String::with_capacity(points.len() * 16);
    for (i, (x, y)) in points.iter().enumerate() {
        if i > 0 {
            commands.push(' ');
        }
        commands.push_str(&format!("{} {} {}", if i == 0 { "M" } else { "L" }, x, y));
    }
    commands
}

/// Calculate squared distance from a point to a line segment
pub fn distance_to_segment_sq(point: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let ab = (b.0 - a.0, b.1 - a.1);
    let ap = (point.0 - a.0, point.1 - a.1);

    let ab_len_sq = ab.0 * ab.0 + ab.1 * ab.1;

    if ab_len_sq < f32::EPSILON {
        // Degenerate segment (a == b)
        return ap.0 * ap.0 + ap.1 * ap.1;
    }

    // Project point onto line, clamped to segment
    let t = ((ap.0 * ab.0 + ap.1 * ab.1) / ab_len_sq).clamp(0.0, 1.0);

    let closest = (a.0 + t * ab.0, a.1 + t * ab.1);

    let dx = point.0 - closest.0;
    let dy = point.1 - closest.1;
    dx * dx + dy * dy
}

/// Minimum distance from a point to a sampled polyline.
///
/// Returns `f32::INFINITY` for an empty polyline and the point distance for a
/// single-point one.
pub fn distance_to_polyline(point: (f32, f32), points: &[(f32, f32)]) -> f32 {
    match points {
        [] => f32::INFINITY,
        [only] => distance_to_segment_sq(point, *only, *only).sqrt(),
        _ => points
            .windows(2)
            .map(|w| distance_to_segment_sq(point, w[0], w[1]))
            .fold(f32::MAX, f32::min)
            .sqrt(),
    }
}
