//! Graph data model: identifiers, sockets, nodes and connections.
//!
//! Sockets never hold references to connections or nodes; they keep the ids of
//! the connections attached to them and every cross-reference is resolved
//! through the owning [`Graph`](crate::Graph).

use crate::hit_test::Rect;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of a node, unique within a graph.
    NodeId
);
string_id!(
    /// Identifier of a socket, unique within its node.
    SocketId
);
string_id!(
    /// Identifier of a connection, unique within a graph.
    ConnectionId
);

/// Fully qualified socket address: owning node plus socket id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SocketRef {
    pub node: NodeId,
    pub socket: SocketId,
}

impl SocketRef {
    pub fn new(node: impl Into<NodeId>, socket: impl Into<SocketId>) -> Self {
        Self {
            node: node.into(),
            socket: socket.into(),
        }
    }
}

impl fmt::Display for SocketRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.socket)
    }
}

/// RGBA colour used for presentation-only attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::from_rgb_u8(255, 255, 255);

    pub const fn from_rgb_u8(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn from_argb_u8(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// Kind of data carried through a socket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    /// Execution flow
    Exec,
    Number,
    String,
    Boolean,
    Vector,
    Color,
    Object,
    /// Wildcard, compatible with every kind
    Any,
}

impl DataKind {
    /// `Any` matches anything; otherwise kinds must be equal.
    pub fn is_compatible_with(self, other: DataKind) -> bool {
        self == DataKind::Any || other == DataKind::Any || self == other
    }

    /// Default link colour for this kind (dark theme palette).
    pub fn color(self) -> Color {
        match self {
            DataKind::Exec => Color::from_rgb_u8(255, 255, 255),
            DataKind::Number => Color::from_rgb_u8(100, 200, 100),
            DataKind::String => Color::from_rgb_u8(200, 100, 100),
            DataKind::Boolean => Color::from_rgb_u8(200, 200, 100),
            DataKind::Vector => Color::from_rgb_u8(100, 100, 200),
            DataKind::Color => Color::from_rgb_u8(200, 100, 200),
            DataKind::Object => Color::from_rgb_u8(150, 150, 150),
            DataKind::Any => Color::from_rgb_u8(100, 100, 100),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocketDirection {
    Input,
    Output,
}

/// Placement rules for sockets along a node's edges, in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocketLayout {
    /// Height of the title bar; sockets start below it
    pub header_height: f32,
    /// Vertical distance between consecutive sockets
    pub spacing: f32,
    /// Visual socket radius; sockets sit this far outside the node edge
    pub radius: f32,
}

impl Default for SocketLayout {
    fn default() -> Self {
        Self {
            header_height: 24.0,
            spacing: 20.0,
            radius: 8.0,
        }
    }
}

/// A typed connection point on a node.
///
/// The direction is fixed by the constructor ([`Socket::input`] or
/// [`Socket::output`]) and cannot change afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Socket {
    id: SocketId,
    pub label: String,
    kind: DataKind,
    direction: SocketDirection,
    position: (f32, f32),
    pub default_value: Option<serde_json::Value>,
    allow_multiple: bool,
    pub required: bool,
    connections: Vec<ConnectionId>,
}

impl Socket {
    fn new(
        id: impl Into<SocketId>,
        label: impl Into<String>,
        kind: DataKind,
        direction: SocketDirection,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            direction,
            position: (0.0, 0.0),
            default_value: None,
            allow_multiple: false,
            required: false,
            connections: Vec::new(),
        }
    }

    pub fn input(id: impl Into<SocketId>, label: impl Into<String>, kind: DataKind) -> Self {
        Self::new(id, label, kind, SocketDirection::Input)
    }

    pub fn output(id: impl Into<SocketId>, label: impl Into<String>, kind: DataKind) -> Self {
        Self::new(id, label, kind, SocketDirection::Output)
    }

    /// Allow more than one simultaneous connection.
    pub fn with_multiple(mut self, allow_multiple: bool) -> Self {
        self.allow_multiple = allow_multiple;
        self
    }

    pub fn with_default(mut self, value: serde_json::Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn id(&self) -> &SocketId {
        &self.id
    }

    pub fn kind(&self) -> DataKind {
        self.kind
    }

    pub fn direction(&self) -> SocketDirection {
        self.direction
    }

    pub fn allows_multiple(&self) -> bool {
        self.allow_multiple
    }

    /// Offset relative to the owning node's top-left corner.
    pub fn position(&self) -> (f32, f32) {
        self.position
    }

    /// Ids of connections currently attached to this socket.
    pub fn connections(&self) -> &[ConnectionId] {
        &self.connections
    }

    pub fn is_connected(&self) -> bool {
        !self.connections.is_empty()
    }

    /// True if another connection would break this socket's cardinality.
    pub fn is_saturated(&self) -> bool {
        !self.allow_multiple && !self.connections.is_empty()
    }

    pub(crate) fn attach(&mut self, connection: &ConnectionId) {
        if !self.connections.contains(connection) {
            self.connections.push(connection.clone());
        }
    }

    pub(crate) fn detach(&mut self, connection: &ConnectionId) {
        self.connections.retain(|c| c != connection);
    }

    pub(crate) fn detach_all(&mut self) {
        self.connections.clear();
    }
}

/// A positioned, sized container of sockets plus free-form properties.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    id: NodeId,
    pub title: String,
    pub category: String,
    pub description: String,
    position: (f32, f32),
    size: (f32, f32),
    inputs: Vec<Socket>,
    outputs: Vec<Socket>,
    pub properties: HashMap<String, serde_json::Value>,
    selected: bool,
    pub collapsed: bool,
    layout: SocketLayout,
}

impl Node {
    pub const DEFAULT_WIDTH: f32 = 120.0;
    pub const DEFAULT_HEIGHT: f32 = 80.0;

    pub fn new(id: impl Into<NodeId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            category: "General".to_owned(),
            description: String::new(),
            position: (0.0, 0.0),
            size: (Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT),
            inputs: Vec::new(),
            outputs: Vec::new(),
            properties: HashMap::new(),
            selected: false,
            collapsed: false,
            layout: SocketLayout::default(),
        }
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = (x, y);
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.resize(width, height);
        self
    }

    pub fn with_socket(mut self, socket: Socket) -> Self {
        self.add_socket(socket);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// World-space top-left corner.
    pub fn position(&self) -> (f32, f32) {
        self.position
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position = (x, y);
    }

    pub fn size(&self) -> (f32, f32) {
        self.size
    }

    /// Change the node size and re-place its sockets.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.size = (width.max(0.0), height.max(0.0));
        self.layout_sockets();
    }

    /// World-space bounding rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(self.position.0, self.position.1, self.size.0, self.size.1)
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn socket_layout(&self) -> SocketLayout {
        self.layout
    }

    pub fn set_socket_layout(&mut self, layout: SocketLayout) {
        self.layout = layout;
        self.layout_sockets();
    }

    /// Add a socket to the input or output list according to its direction.
    ///
    /// Returns false if a socket with the same id already exists on this node.
    pub fn add_socket(&mut self, socket: Socket) -> bool {
        if self.socket(socket.id.as_str()).is_some() {
            return false;
        }
        match socket.direction {
            SocketDirection::Input => self.inputs.push(socket),
            SocketDirection::Output => self.outputs.push(socket),
        }
        self.layout_sockets();
        true
    }

    /// Forget every connection id held by this node's sockets.
    pub(crate) fn detach_all(&mut self) {
        for socket in self.inputs.iter_mut().chain(self.outputs.iter_mut()) {
            socket.detach_all();
        }
    }

    /// Detach a socket from the node. Connection bookkeeping is the graph's job,
    /// see [`Graph::remove_socket`](crate::Graph::remove_socket).
    pub(crate) fn take_socket(&mut self, socket_id: &str) -> Option<Socket> {
        let taken = if let Some(i) = self.inputs.iter().position(|s| s.id.as_str() == socket_id) {
            Some(self.inputs.remove(i))
        } else if let Some(i) = self.outputs.iter().position(|s| s.id.as_str() == socket_id) {
            Some(self.outputs.remove(i))
        } else {
            None
        };
        if taken.is_some() {
            self.layout_sockets();
        }
        taken
    }

    pub fn inputs(&self) -> &[Socket] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Socket] {
        &self.outputs
    }

    /// Inputs first, then outputs.
    pub fn sockets(&self) -> impl Iterator<Item = &Socket> {
        self.inputs.iter().chain(self.outputs.iter())
    }

    pub fn socket(&self, socket_id: &str) -> Option<&Socket> {
        self.sockets().find(|s| s.id.as_str() == socket_id)
    }

    pub(crate) fn socket_mut(&mut self, socket_id: &str) -> Option<&mut Socket> {
        self.inputs
            .iter_mut()
            .chain(self.outputs.iter_mut())
            .find(|s| s.id.as_str() == socket_id)
    }

    /// World-space centre of a socket.
    pub fn socket_world_position(&self, socket_id: &str) -> Option<(f32, f32)> {
        let (rx, ry) = self.socket(socket_id)?.position;
        Some((self.position.0 + rx, self.position.1 + ry))
    }

    /// Find the first socket within `radius` of a node-local point.
    pub fn socket_at(&self, local: (f32, f32), radius: f32) -> Option<&Socket> {
        let radius_sq = radius * radius;
        self.sockets().find(|s| {
            let dx = local.0 - s.position.0;
            let dy = local.1 - s.position.1;
            dx * dx + dy * dy <= radius_sq
        })
    }

    fn layout_sockets(&mut self) {
        let layout = self.layout;
        let width = self.size.0;
        for (i, socket) in self.inputs.iter_mut().enumerate() {
            socket.position = (
                -layout.radius,
                layout.header_height + (i + 1) as f32 * layout.spacing,
            );
        }
        for (i, socket) in self.outputs.iter_mut().enumerate() {
            socket.position = (
                width + layout.radius,
                layout.header_height + (i + 1) as f32 * layout.spacing,
            );
        }
    }
}

/// A directed edge from an output socket to an input socket.
#[derive(Clone, Debug, PartialEq)]
pub struct Connection {
    id: ConnectionId,
    start: SocketRef,
    end: SocketRef,
    pub color: Color,
    pub width: f32,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Connection {
    pub const DEFAULT_WIDTH: f32 = 3.0;

    /// Create a connection. The graph reorders the ends on insertion so that
    /// `start` is always the output side.
    pub fn new(id: impl Into<ConnectionId>, start: SocketRef, end: SocketRef) -> Self {
        Self {
            id: id.into(),
            start,
            end,
            color: Color::WHITE,
            width: Self::DEFAULT_WIDTH,
            metadata: HashMap::new(),
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn start(&self) -> &SocketRef {
        &self.start
    }

    pub fn end(&self) -> &SocketRef {
        &self.end
    }

    /// True if either end belongs to `node`.
    pub fn touches_node(&self, node: &str) -> bool {
        self.start.node.as_str() == node || self.end.node.as_str() == node
    }

    pub(crate) fn swap_ends(&mut self) {
        std::mem::swap(&mut self.start, &mut self.end);
    }
}
