//! Layered automatic layout.
//!
//! Wraps the Sugiyama implementation from `rust-sugiyama`. The algorithm
//! works in `f64` on dense `u32` vertex indices; this module maps arbitrary
//! node keys onto those indices and back.
//!
//! Requires the `layout` feature.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::graph::Graph;
use crate::model::NodeId;

/// Direction in which layers follow each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum Direction {
    #[default]
    TopToBottom,
    /// Layers flow left to right, matching output-right/input-left sockets.
    LeftToRight,
}

/// Top-left corner computed for one node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodePosition<K> {
    pub id: K,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct SugiyamaConfig {
    /// Minimum spacing between vertices; 0 keeps the library default.
    pub vertex_spacing: f64,
    /// Minimum number of layers an edge spans; 0 keeps the library default.
    pub minimum_length: u32,
    pub dummy_vertices: bool,
    pub direction: Direction,
}

impl SugiyamaConfig {
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_vertex_spacing(mut self, spacing: f64) -> Self {
        self.vertex_spacing = spacing;
        self
    }
}

/// Lay out `node_sizes` in layers following `edges`.
///
/// Edges naming unknown nodes are skipped. When a key appears more than once
/// in `node_sizes`, its first size is used.
pub fn sugiyama_layout<K>(
    edges: &[(K, K)],
    node_sizes: &[(K, (f64, f64))],
    config: &SugiyamaConfig,
) -> Vec<NodePosition<K>>
where
    K: Eq + Hash + Clone,
{
    if node_sizes.is_empty() {
        return Vec::new();
    }
    let horizontal = config.direction == Direction::LeftToRight;

    let mut index_of: HashMap<&K, u32> = HashMap::new();
    let mut keys: Vec<&K> = Vec::with_capacity(node_sizes.len());
    let mut vertices: Vec<(u32, (f64, f64))> = Vec::with_capacity(node_sizes.len());
    for (key, (w, h)) in node_sizes {
        if let Entry::Vacant(slot) = index_of.entry(key) {
            let index = keys.len() as u32;
            slot.insert(index);
            keys.push(key);
            // Layers are spaced along y, so swap sizes for horizontal flow
            let size = if horizontal { (*h, *w) } else { (*w, *h) };
            vertices.push((index, size));
        }
    }

    let mapped_edges: Vec<(u32, u32)> = edges
        .iter()
        .filter_map(|(src, dst)| Some((*index_of.get(src)?, *index_of.get(dst)?)))
        .collect();

    let mut sg_config = rust_sugiyama::configure::Config {
        dummy_vertices: config.dummy_vertices,
        ..Default::default()
    };
    if config.vertex_spacing > 0.0 {
        sg_config.vertex_spacing = config.vertex_spacing;
    }
    if config.minimum_length > 0 {
        sg_config.minimum_length = config.minimum_length;
    }

    let subgraphs = rust_sugiyama::from_vertices_and_edges(&vertices, &mapped_edges, &sg_config);
    tracing::debug!(
        vertices = vertices.len(),
        edges = mapped_edges.len(),
        components = subgraphs.len(),
        "sugiyama layout"
    );

    let mut positions = Vec::with_capacity(keys.len());
    for (layout, _width, _height) in &subgraphs {
        for &(index, (x, y)) in layout {
            if let Some(key) = keys.get(index) {
                let (x, y) = if horizontal { (y, x) } else { (x, y) };
                positions.push(NodePosition {
                    id: (*key).clone(),
                    x,
                    y,
                });
            }
        }
    }
    positions
}

/// Lay out every node of `graph`, returning new world positions in node
/// draw order.
///
/// Parallel connections between the same pair of nodes count once and
/// connections from a node to itself are ignored.
pub fn arrange_graph(graph: &Graph, config: &SugiyamaConfig) -> Vec<(NodeId, (f32, f32))> {
    let mut seen = HashSet::new();
    let edges: Vec<(NodeId, NodeId)> = graph
        .node_edges()
        .filter(|(from, to)| from != to)
        .filter(|&(from, to)| seen.insert((from, to)))
        .map(|(from, to)| (from.clone(), to.clone()))
        .collect();
    let sizes: Vec<(NodeId, (f64, f64))> = graph
        .nodes()
        .map(|n| {
            let (w, h) = n.size();
            (n.id().clone(), (w as f64, h as f64))
        })
        .collect();

    let mut by_id: HashMap<NodeId, (f32, f32)> = sugiyama_layout(&edges, &sizes, config)
        .into_iter()
        .map(|p| (p.id, (p.x as f32, p.y as f32)))
        .collect();
    graph
        .node_ids()
        .iter()
        .filter_map(|id| Some((id.clone(), by_id.remove(id)?)))
        .collect()
}
