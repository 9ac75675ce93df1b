//! # Node Graph Editor Core
//!
//! Toolkit-independent model and interaction logic for visual node editors:
//! data flow diagrams, shader graphs, visual scripting and similar
//! node-based interfaces.
//!
//! ## Features
//!
//! - **Typed graph model** - nodes with typed input and output sockets,
//!   connections validated for direction, data kind and cardinality
//! - **Pluggable validation** - [`ConnectionValidator`] rules run after the
//!   built-in checks
//! - **Viewport** - zoom and pan with anchor-preserving zoom, framing and
//!   culling
//! - **Interaction engine** - node dragging, connection dragging, box and
//!   click selection, keyboard shortcuts, context menu requests
//! - **Event stream** - every mutation queues one [`EditorEvent`]
//! - **Optional** Slint adapter (`slint` feature) and layered auto-layout
//!   (`layout` feature)
//!
//! ## Quick Start
//!
//! ```
//! use node_graph_editor::{
//!     DataKind, EditorConfig, EditorEvent, InputEvent, InteractionEngine, Node, Socket,
//! };
//!
//! let mut editor = InteractionEngine::new(EditorConfig::default());
//! editor.set_panel_size(800.0, 600.0);
//! editor.add_node(Node::new("src", "Source").with_socket(Socket::output("out", "Value", DataKind::Number)));
//! editor.add_node(
//!     Node::new("dst", "Sink")
//!         .with_position(300.0, 0.0)
//!         .with_socket(Socket::input("in", "Value", DataKind::Number)),
//! );
//!
//! // Drag from the output socket onto the input socket
//! editor.handle_input(&InputEvent::pointer_down(128.0, 44.0));
//! editor.handle_input(&InputEvent::pointer_move(250.0, 44.0));
//! editor.handle_input(&InputEvent::pointer_up(292.0, 44.0));
//!
//! assert_eq!(editor.graph().connection_count(), 1);
//! assert!(editor
//!     .drain_events()
//!     .iter()
//!     .any(|e| matches!(e, EditorEvent::ConnectionCreated { .. })));
//! ```
//!
//! ## Coordinate Spaces
//!
//! Node positions and sizes are in **world** units. Pointer input, connection
//! curves and grid lines are in **screen** pixels relative to the editor
//! panel. [`ViewportTransform`] converts between the two:
//! `screen = (world + pan) * zoom`.

pub mod config;
pub mod error;
pub mod events;
pub mod graph;
pub mod grid;
pub mod input;
pub mod interaction;
pub mod model;
pub mod path;
pub mod selection;
pub mod state;
pub mod viewport;

#[cfg(feature = "layout")]
pub mod layout;

#[cfg(feature = "slint")]
pub mod controller;

pub use config::EditorConfig;
pub use error::{ConfigError, ConnectionError, GraphError};
pub use events::{ContextTarget, EditorEvent};
pub use graph::{
    CompositeValidator, ConnectionValidator, Graph, NoCyclesValidator, NoDuplicatesValidator,
    RemovedNode,
};
pub use grid::{snap_point, snap_to_grid, GridLine, GridLines};
pub use hit_test::{find_link_at, find_node_at, find_socket_at, LinkGeometry, NodeGeometry, Rect};
pub use input::{InputEvent, Key, Modifiers, PointerButton};
pub use interaction::{HoverState, InteractionEngine, InteractionMode};
pub use model::{
    Color, Connection, ConnectionId, DataKind, Node, NodeId, Socket, SocketDirection, SocketId,
    SocketLayout, SocketRef,
};
pub use path::{generate_bezier_path, CubicBezier};
pub use selection::{SelectionChange, SelectionManager};
pub use state::{CurveParams, GeometryCache, LinkPath};
pub use viewport::{CullResult, ViewportTransform};

#[cfg(feature = "layout")]
pub use layout::{arrange_graph, sugiyama_layout, Direction, NodePosition, SugiyamaConfig};

#[cfg(feature = "slint")]
pub use controller::NodeEditorController;
