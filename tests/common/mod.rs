//! Shared helpers for the integration tests.

#![allow(dead_code)]

pub mod harness;

use node_graph_editor::{ConnectionId, EditorEvent, NodeId};

/// Short name of an event variant, for asserting on event order.
pub fn kind(event: &EditorEvent) -> &'static str {
    match event {
        EditorEvent::NodeAdded { .. } => "node_added",
        EditorEvent::NodeRemoved { .. } => "node_removed",
        EditorEvent::NodeSelected { .. } => "node_selected",
        EditorEvent::NodeDeselected { .. } => "node_deselected",
        EditorEvent::NodeMoved { .. } => "node_moved",
        EditorEvent::ConnectionCreated { .. } => "connection_created",
        EditorEvent::ConnectionRemoved { .. } => "connection_removed",
        EditorEvent::SelectionChanged { .. } => "selection_changed",
        EditorEvent::ZoomChanged { .. } => "zoom_changed",
        EditorEvent::PanChanged { .. } => "pan_changed",
        EditorEvent::ContextMenuRequested { .. } => "context_menu_requested",
        EditorEvent::GraphCleared => "graph_cleared",
    }
}

/// Recorded events with query helpers.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    pub events: Vec<EditorEvent>,
}

impl EventLog {
    pub fn new(events: Vec<EditorEvent>) -> Self {
        Self { events }
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.events.iter().map(kind).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.events.iter().filter(|e| kind(e) == name).count()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Ids of nodes named by events of the given kind, in order.
    pub fn nodes(&self, name: &str) -> Vec<NodeId> {
        self.events
            .iter()
            .filter(|e| kind(e) == name)
            .filter_map(|e| e.node_id().cloned())
            .collect()
    }

    pub fn connections(&self, name: &str) -> Vec<ConnectionId> {
        self.events
            .iter()
            .filter(|e| kind(e) == name)
            .filter_map(|e| e.connection_id().cloned())
            .collect()
    }

    /// `(id, from, to)` for every move event.
    pub fn moves(&self) -> Vec<(NodeId, (f32, f32), (f32, f32))> {
        self.events
            .iter()
            .filter_map(|e| match e {
                EditorEvent::NodeMoved { id, from, to } => Some((id.clone(), *from, *to)),
                _ => None,
            })
            .collect()
    }

    /// Node ids carried by the last selection-changed event.
    pub fn last_selection(&self) -> Option<Vec<NodeId>> {
        self.events.iter().rev().find_map(|e| match e {
            EditorEvent::SelectionChanged { nodes, .. } => Some(nodes.clone()),
            _ => None,
        })
    }
}

pub fn ids(names: &[&str]) -> Vec<NodeId> {
    names.iter().map(|n| NodeId::from(*n)).collect()
}

pub fn assert_close(actual: (f32, f32), expected: (f32, f32)) {
    let dx = (actual.0 - expected.0).abs();
    let dy = (actual.1 - expected.1).abs();
    assert!(
        dx < 1e-3 && dy < 1e-3,
        "expected {:?}, got {:?}",
        expected,
        actual
    );
}
