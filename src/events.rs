use crate::model::{ConnectionId, NodeId};
use serde::Serialize;

/// What the pointer was over when a context menu was requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContextTarget {
    Node { id: NodeId },
    Connection { id: ConnectionId },
    Background { world_position: (f32, f32) },
}

/// Change notifications emitted by the [`InteractionEngine`](crate::InteractionEngine).
///
/// Every mutation produces exactly one event, queued in the order the
/// mutations happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EditorEvent {
    NodeAdded { id: NodeId },
    NodeRemoved { id: NodeId },
    NodeSelected { id: NodeId },
    NodeDeselected { id: NodeId },
    NodeMoved {
        id: NodeId,
        from: (f32, f32),
        to: (f32, f32),
    },
    ConnectionCreated { id: ConnectionId },
    ConnectionRemoved { id: ConnectionId },
    /// Node or connection selection changed; sent once after the per-node events
    SelectionChanged {
        nodes: Vec<NodeId>,
        connections: Vec<ConnectionId>,
    },
    ZoomChanged { zoom: f32 },
    PanChanged { pan: (f32, f32) },
    ContextMenuRequested {
        target: ContextTarget,
        screen_position: (f32, f32),
    },
    GraphCleared,
}

impl EditorEvent {
    /// The node this event is about, if any.
    pub fn node_id(&self) -> Option<&NodeId> {
        match self {
            Self::NodeAdded { id }
            | Self::NodeRemoved { id }
            | Self::NodeSelected { id }
            | Self::NodeDeselected { id }
            | Self::NodeMoved { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn connection_id(&self) -> Option<&ConnectionId> {
        match self {
            Self::ConnectionCreated { id } | Self::ConnectionRemoved { id } => Some(id),
            _ => None,
        }
    }
}
