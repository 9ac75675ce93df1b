use crate::graph::Graph;
use crate::hit_test::{find_link_at, LinkGeometry};
use crate::model::{ConnectionId, SocketRef};
use crate::path::{polyline_to_svg_path, CubicBezier, DEFAULT_SEGMENTS};
use crate::viewport::ViewportTransform;
use std::collections::HashMap;

/// Parameters for building connection curves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveParams {
    /// Minimum horizontal control point offset, in pixels
    pub min_offset: f32,
    /// Fraction of the horizontal span used as offset
    pub offset_ratio: f32,
    /// Uniform segments per curve
    pub segments: usize,
}

impl Default for CurveParams {
    fn default() -> Self {
        Self {
            min_offset: 50.0,
            offset_ratio: 0.5,
            segments: DEFAULT_SEGMENTS,
        }
    }
}

/// Screen-space geometry of one connection, shared by rendering and
/// hit-testing.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkPath {
    pub id: ConnectionId,
    pub curve: CubicBezier,
    pub points: Vec<(f32, f32)>,
}

impl LinkPath {
    pub fn build(id: ConnectionId, start: (f32, f32), end: (f32, f32), params: &CurveParams) -> Self {
        let curve = CubicBezier::from_endpoints(start, end, params.min_offset, params.offset_ratio);
        let points = curve.sample(params.segments);
        Self { id, curve, points }
    }

    /// Exact curve as an SVG path.
    pub fn svg_path(&self) -> String {
        self.curve.to_svg_path()
    }

    /// The sampled polyline as an SVG path.
    pub fn polyline_svg_path(&self) -> String {
        polyline_to_svg_path(&self.points)
    }
}

impl LinkGeometry for LinkPath {
    type Id = ConnectionId;

    fn id(&self) -> &ConnectionId {
        &self.id
    }

    fn points(&self) -> &[(f32, f32)] {
        &self.points
    }
}

/// Per-frame cache of screen-space socket positions and connection curves.
///
/// Anything that moves nodes, changes connections or changes the viewport
/// marks the cache dirty; [`GeometryCache::refresh`] then rebuilds it once
/// before the next query.
#[derive(Debug, Clone)]
pub struct GeometryCache {
    sockets: HashMap<SocketRef, (f32, f32)>,
    links: Vec<LinkPath>,
    params: CurveParams,
    dirty: bool,
}

impl Default for GeometryCache {
    fn default() -> Self {
        Self::new(CurveParams::default())
    }
}

impl GeometryCache {
    pub fn new(params: CurveParams) -> Self {
        Self {
            sockets: HashMap::new(),
            links: Vec::new(),
            params,
            dirty: true,
        }
    }

    pub fn params(&self) -> &CurveParams {
        &self.params
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Rebuild if dirty. Returns true if a rebuild happened.
    pub fn refresh(&mut self, graph: &Graph, viewport: &ViewportTransform) -> bool {
        if !self.dirty {
            return false;
        }
        self.rebuild(graph, viewport);
        true
    }

    /// Recompute every socket position and connection curve.
    pub fn rebuild(&mut self, graph: &Graph, viewport: &ViewportTransform) {
        self.sockets.clear();
        for node in graph.nodes() {
            for socket in node.sockets() {
                if let Some(world) = node.socket_world_position(socket.id().as_str()) {
                    self.sockets.insert(
                        SocketRef::new(node.id().clone(), socket.id().clone()),
                        viewport.world_to_screen(world),
                    );
                }
            }
        }

        self.links = graph
            .connections()
            .filter_map(|c| {
                let start = *self.sockets.get(c.start())?;
                let end = *self.sockets.get(c.end())?;
                Some(LinkPath::build(c.id().clone(), start, end, &self.params))
            })
            .collect();

        self.dirty = false;
        tracing::trace!(sockets = self.sockets.len(), links = self.links.len(), "geometry rebuilt");
    }

    pub fn socket_screen_position(&self, socket: &SocketRef) -> Option<(f32, f32)> {
        self.sockets.get(socket).copied()
    }

    /// Connection curves in connection insertion order.
    pub fn links(&self) -> &[LinkPath] {
        &self.links
    }

    pub fn link(&self, id: &ConnectionId) -> Option<&LinkPath> {
        self.links.iter().find(|l| &l.id == id)
    }

    /// Closest connection within `tolerance` pixels of a screen point.
    pub fn find_link_at(&self, screen: (f32, f32), tolerance: f32) -> Option<&ConnectionId> {
        find_link_at(screen, &self.links, tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Connection, DataKind, Node, Socket};

    /// a.out at world (128, 44), b.in at world (292, 44)
    fn setup_graph() -> Graph {
        let mut graph = Graph::new();
        graph.add_node(
            Node::new("a", "A").with_socket(Socket::output("out", "Out", DataKind::Number)),
        );
        graph.add_node(
            Node::new("b", "B")
                .with_position(300.0, 0.0)
                .with_socket(Socket::input("in", "In", DataKind::Number)),
        );
        graph.add_connection(Connection::new(
            "c1",
            SocketRef::new("a", "out"),
            SocketRef::new("b", "in"),
        ));
        graph
    }

    #[test]
    fn test_new_cache_is_dirty_and_empty() {
        let cache = GeometryCache::default();
        assert!(cache.is_dirty());
        assert!(cache.links().is_empty());
    }

    #[test]
    fn test_refresh_only_when_dirty() {
        let graph = setup_graph();
        let viewport = ViewportTransform::new((800.0, 600.0));
        let mut cache = GeometryCache::default();

        assert!(cache.refresh(&graph, &viewport));
        assert!(!cache.is_dirty());
        assert!(!cache.refresh(&graph, &viewport));

        cache.mark_dirty();
        assert!(cache.refresh(&graph, &viewport));
    }

    #[test]
    fn test_socket_positions_are_screen_space() {
        let graph = setup_graph();
        let mut viewport = ViewportTransform::new((800.0, 600.0));
        viewport.set_zoom(2.0);
        viewport.set_pan(10.0, 0.0);

        let mut cache = GeometryCache::default();
        cache.rebuild(&graph, &viewport);

        assert_eq!(
            cache.socket_screen_position(&SocketRef::new("a", "out")),
            Some((276.0, 88.0))
        );
        assert_eq!(cache.socket_screen_position(&SocketRef::new("a", "nope")), None);
    }

    #[test]
    fn test_link_curve_endpoints_and_samples() {
        let graph = setup_graph();
        let viewport = ViewportTransform::new((800.0, 600.0));
        let mut cache = GeometryCache::default();
        cache.rebuild(&graph, &viewport);

        let link = cache.link(&ConnectionId::from("c1")).unwrap();
        assert_eq!(link.curve.p0, (128.0, 44.0));
        assert_eq!(link.curve.p3, (292.0, 44.0));
        // |dx| = 164, offset = 82
        assert_eq!(link.curve.p1, (210.0, 44.0));
        assert_eq!(link.points.len(), DEFAULT_SEGMENTS + 1);
        assert!(link.svg_path().starts_with("M 128 44 C 210 44"));
        assert!(link.polyline_svg_path().starts_with("M 128 44 L "));
    }

    #[test]
    fn test_find_link_at_uses_cached_curve() {
        let graph = setup_graph();
        let viewport = ViewportTransform::new((800.0, 600.0));
        let mut cache = GeometryCache::default();
        cache.rebuild(&graph, &viewport);

        assert_eq!(
            cache.find_link_at((210.0, 48.0), 8.0).map(|id| id.as_str()),
            Some("c1")
        );
        assert_eq!(cache.find_link_at((210.0, 80.0), 8.0), None);
    }

    #[test]
    fn test_rebuild_drops_removed_connections() {
        let mut graph = setup_graph();
        let viewport = ViewportTransform::new((800.0, 600.0));
        let mut cache = GeometryCache::default();
        cache.rebuild(&graph, &viewport);
        assert_eq!(cache.links().len(), 1);

        graph.remove_node("b");
        cache.mark_dirty();
        cache.refresh(&graph, &viewport);
        assert!(cache.links().is_empty());
        assert_eq!(cache.socket_screen_position(&SocketRef::new("b", "in")), None);
    }

    #[test]
    fn test_custom_segment_count() {
        let graph = setup_graph();
        let viewport = ViewportTransform::new((800.0, 600.0));
        let mut cache = GeometryCache::new(CurveParams {
            segments: 8,
            ..CurveParams::default()
        });
        cache.rebuild(&graph, &viewport);
        assert_eq!(cache.links()[0].points.len(), 9);
    }
}
