use crate::error::{ConnectionError, GraphError};
use crate::hit_test::Rect;
use crate::model::{Connection, ConnectionId, Node, NodeId, Socket, SocketDirection, SocketRef};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Owns all nodes and connections and enforces connection validity.
///
/// Nodes keep their insertion order, which doubles as draw order: later nodes
/// are drawn on top and win overlapping hit-tests. The graph never emits
/// notifications; the [`InteractionEngine`](crate::InteractionEngine) reports
/// mutations to observers.
///
/// Multi-hop cycles are permitted unless a [`NoCyclesValidator`] is installed.
#[derive(Default)]
pub struct Graph {
    nodes: HashMap<NodeId, Node>,
    node_order: Vec<NodeId>,
    connections: HashMap<ConnectionId, Connection>,
    connection_order: Vec<ConnectionId>,
    validator: Option<Box<dyn ConnectionValidator>>,
    next_connection: u64,
}

/// A node removed from the graph together with the connections that were
/// severed on its behalf, in removal order.
#[derive(Debug, Clone)]
pub struct RemovedNode {
    pub node: Node,
    pub connections: Vec<Connection>,
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("nodes", &self.node_order)
            .field("connections", &self.connection_order)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install an additional validator, consulted after the built-in rules.
    pub fn set_validator<V: ConnectionValidator + 'static>(&mut self, validator: V) {
        self.validator = Some(Box::new(validator));
    }

    pub fn clear_validator(&mut self) {
        self.validator = None;
    }

    // === Nodes ===

    /// Insert a node. Returns false if a node with the same id exists.
    pub fn add_node(&mut self, node: Node) -> bool {
        self.try_add_node(node).is_ok()
    }

    /// Insert a node. Connection ids its sockets carry from another graph
    /// are dropped; only connections added to this graph attach to it.
    pub fn try_add_node(&mut self, mut node: Node) -> Result<(), GraphError> {
        if self.nodes.contains_key(node.id()) {
            tracing::debug!(node = %node.id(), "rejected duplicate node");
            return Err(GraphError::DuplicateNode(node.id().clone()));
        }
        node.detach_all();
        let id = node.id().clone();
        tracing::debug!(node = %id, "node added");
        self.node_order.push(id.clone());
        self.nodes.insert(id, node);
        Ok(())
    }

    /// Remove a node and every connection touching its sockets.
    pub fn remove_node(&mut self, id: &str) -> bool {
        self.take_node(id).is_some()
    }

    /// Remove a node, returning it along with the severed connections.
    ///
    /// Connections are detached from both sockets and removed before the node
    /// itself, so the graph never holds a dangling connection.
    pub fn take_node(&mut self, id: &str) -> Option<RemovedNode> {
        if !self.nodes.contains_key(id) {
            return None;
        }

        let touching: Vec<ConnectionId> = self
            .connection_order
            .iter()
            .filter(|cid| self.connections[*cid].touches_node(id))
            .cloned()
            .collect();
        let connections: Vec<Connection> = touching
            .iter()
            .filter_map(|cid| self.take_connection(cid.as_str()))
            .collect();

        self.node_order.retain(|n| n.as_str() != id);
        let node = self.nodes.remove(id)?;
        tracing::debug!(node = %id, severed = connections.len(), "node removed");
        Some(RemovedNode { node, connections })
    }

    /// Remove a socket from a node, severing its connections first.
    ///
    /// Returns the socket and the removed connections, or `None` if either the
    /// node or the socket does not exist.
    pub fn remove_socket(&mut self, node: &str, socket: &str) -> Option<(Socket, Vec<Connection>)> {
        let attached = self.nodes.get(node)?.socket(socket)?.connections().to_vec();
        let severed = attached
            .iter()
            .filter_map(|cid| self.take_connection(cid.as_str()))
            .collect();
        let removed = self.nodes.get_mut(node)?.take_socket(socket)?;
        tracing::debug!(node, socket, "socket removed");
        Some((removed, severed))
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Nodes in draw order (bottom first).
    pub fn nodes(&self) -> impl DoubleEndedIterator<Item = &Node> + '_ {
        self.node_order.iter().filter_map(move |id| self.nodes.get(id))
    }

    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_order
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All nodes whose bounding rectangle intersects `area`, in draw order.
    pub fn nodes_in_rect(&self, area: &Rect) -> Vec<&Node> {
        self.nodes().filter(|n| n.rect().intersects(area)).collect()
    }

    /// Bounding box of the given nodes (all nodes when `ids` is `None`).
    pub fn bounds(&self, ids: Option<&[NodeId]>) -> Option<Rect> {
        let rects: Vec<Rect> = match ids {
            Some(ids) => ids.iter().filter_map(|id| self.node(id.as_str())).map(Node::rect).collect(),
            None => self.nodes().map(Node::rect).collect(),
        };
        let (first, rest) = rects.split_first()?;
        Some(rest.iter().fold(*first, |acc, r| acc.union(r)))
    }

    // === Sockets ===

    pub fn socket(&self, socket: &SocketRef) -> Option<&Socket> {
        self.nodes.get(&socket.node)?.socket(socket.socket.as_str())
    }

    fn socket_mut(&mut self, socket: &SocketRef) -> Option<&mut Socket> {
        self.nodes.get_mut(&socket.node)?.socket_mut(socket.socket.as_str())
    }

    /// World-space centre of a socket.
    pub fn socket_world_position(&self, socket: &SocketRef) -> Option<(f32, f32)> {
        self.nodes
            .get(&socket.node)?
            .socket_world_position(socket.socket.as_str())
    }

    // === Connections ===

    /// Insert a connection after validating it. Returns false on any failure.
    pub fn add_connection(&mut self, connection: Connection) -> bool {
        match self.try_add_connection(connection) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(%err, "connection rejected");
                false
            }
        }
    }

    /// Insert a connection, reporting why it was refused.
    ///
    /// The ends are reordered if necessary so that `start` is the output side.
    /// Checks run in this order: duplicate id, same socket, socket existence,
    /// direction, data kind, cardinality, then the installed validator.
    pub fn try_add_connection(&mut self, mut connection: Connection) -> Result<(), ConnectionError> {
        if self.connections.contains_key(connection.id()) {
            return Err(ConnectionError::DuplicateId(connection.id().clone()));
        }
        let (start, _) = self.check_link(connection.start(), connection.end())?;
        if start.direction() == SocketDirection::Input {
            connection.swap_ends();
        }
        if let Some(validator) = &self.validator {
            validator.validate(self, connection.start(), connection.end())?;
        }

        let id = connection.id().clone();
        let (start, end) = (connection.start().clone(), connection.end().clone());
        if let Some(socket) = self.socket_mut(&start) {
            socket.attach(&id);
        }
        if let Some(socket) = self.socket_mut(&end) {
            socket.attach(&id);
        }
        tracing::debug!(connection = %id, %start, %end, "connection added");
        self.connection_order.push(id.clone());
        self.connections.insert(id, connection);
        Ok(())
    }

    /// Check whether two sockets may be linked, ignoring installed validators.
    ///
    /// The pair may be given in either order. On success returns the two
    /// sockets in the order given.
    pub fn check_link(&self, a: &SocketRef, b: &SocketRef) -> Result<(&Socket, &Socket), ConnectionError> {
        if a == b {
            return Err(ConnectionError::SameSocket);
        }
        let sa = self
            .socket(a)
            .ok_or_else(|| ConnectionError::SocketNotFound(a.clone()))?;
        let sb = self
            .socket(b)
            .ok_or_else(|| ConnectionError::SocketNotFound(b.clone()))?;
        if sa.direction() == sb.direction() {
            return Err(ConnectionError::SameDirection);
        }
        if !sa.kind().is_compatible_with(sb.kind()) {
            let (output, input) = if sa.direction() == SocketDirection::Output {
                (sa.kind(), sb.kind())
            } else {
                (sb.kind(), sa.kind())
            };
            return Err(ConnectionError::KindMismatch { output, input });
        }
        if sa.is_saturated() {
            return Err(ConnectionError::CardinalityExceeded(a.clone()));
        }
        if sb.is_saturated() {
            return Err(ConnectionError::CardinalityExceeded(b.clone()));
        }
        Ok((sa, sb))
    }

    /// Remove a connection, detaching it from both sockets.
    pub fn remove_connection(&mut self, id: &str) -> bool {
        self.take_connection(id).is_some()
    }

    pub fn try_remove_connection(&mut self, id: &str) -> Result<Connection, GraphError> {
        self.take_connection(id)
            .ok_or_else(|| GraphError::ConnectionNotFound(ConnectionId::from(id)))
    }

    fn take_connection(&mut self, id: &str) -> Option<Connection> {
        let connection = self.connections.remove(id)?;
        self.connection_order.retain(|c| c.as_str() != id);
        let (start, end) = (connection.start().clone(), connection.end().clone());
        if let Some(socket) = self.socket_mut(&start) {
            socket.detach(connection.id());
        }
        if let Some(socket) = self.socket_mut(&end) {
            socket.detach(connection.id());
        }
        tracing::debug!(connection = %id, "connection removed");
        Some(connection)
    }

    pub fn connection(&self, id: &str) -> Option<&Connection> {
        self.connections.get(id)
    }

    /// Connections in insertion order.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> + '_ {
        self.connection_order
            .iter()
            .filter_map(move |id| self.connections.get(id))
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// True if a connection already links `output` to `input`.
    pub fn link_exists(&self, output: &SocketRef, input: &SocketRef) -> bool {
        self.connections()
            .any(|c| c.start() == output && c.end() == input)
    }

    /// World-space positions of a connection's start and end sockets.
    pub fn connection_endpoints(&self, connection: &Connection) -> Option<((f32, f32), (f32, f32))> {
        Some((
            self.socket_world_position(connection.start())?,
            self.socket_world_position(connection.end())?,
        ))
    }

    /// Directed node-level edges (output node, input node), one per connection.
    pub fn node_edges(&self) -> impl Iterator<Item = (&NodeId, &NodeId)> + '_ {
        self.connections().map(|c| (&c.start().node, &c.end().node))
    }

    /// True if adding an edge `from -> to` would close a cycle.
    pub fn would_create_cycle(&self, from: &NodeId, to: &NodeId) -> bool {
        if from == to {
            return true;
        }
        let mut stack = vec![to];
        let mut visited: HashSet<&NodeId> = HashSet::new();
        while let Some(current) = stack.pop() {
            if current == from {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            stack.extend(
                self.node_edges()
                    .filter(|(src, _)| *src == current)
                    .map(|(_, dst)| dst),
            );
        }
        false
    }

    /// Generate a connection id not used by any existing connection.
    pub fn next_connection_id(&mut self) -> ConnectionId {
        loop {
            self.next_connection += 1;
            let id = ConnectionId::new(format!("conn-{}", self.next_connection));
            if !self.connections.contains_key(&id) {
                return id;
            }
        }
    }

    /// Remove every node and connection.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.node_order.clear();
        self.connections.clear();
        self.connection_order.clear();
        tracing::debug!("graph cleared");
    }
}

// ============================================================================
// Connection Validation Framework
// ============================================================================

/// Extra rules for connecting sockets, on top of the built-in direction, kind
/// and cardinality checks.
///
/// `output` and `input` are already normalized when a validator runs.
///
/// # Example
///
/// ```
/// use node_graph_editor::{ConnectionError, ConnectionValidator, Graph, SocketRef};
///
/// struct NoSelfLoops;
///
/// impl ConnectionValidator for NoSelfLoops {
///     fn validate(&self, _graph: &Graph, output: &SocketRef, input: &SocketRef) -> Result<(), ConnectionError> {
///         if output.node == input.node {
///             return Err(ConnectionError::Rejected("node cannot feed itself".into()));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait ConnectionValidator {
    fn validate(&self, graph: &Graph, output: &SocketRef, input: &SocketRef) -> Result<(), ConnectionError>;
}

impl<V: ConnectionValidator + ?Sized> ConnectionValidator for Box<V> {
    fn validate(&self, graph: &Graph, output: &SocketRef, input: &SocketRef) -> Result<(), ConnectionError> {
        (**self).validate(graph, output, input)
    }
}

/// Rejects a second connection between the same output and input.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDuplicatesValidator;

impl ConnectionValidator for NoDuplicatesValidator {
    fn validate(&self, graph: &Graph, output: &SocketRef, input: &SocketRef) -> Result<(), ConnectionError> {
        if graph.link_exists(output, input) {
            Err(ConnectionError::DuplicateLink)
        } else {
            Ok(())
        }
    }
}

/// Rejects connections that would close a cycle through the graph.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCyclesValidator;

impl ConnectionValidator for NoCyclesValidator {
    fn validate(&self, graph: &Graph, output: &SocketRef, input: &SocketRef) -> Result<(), ConnectionError> {
        if graph.would_create_cycle(&output.node, &input.node) {
            Err(ConnectionError::WouldCreateCycle)
        } else {
            Ok(())
        }
    }
}

/// Composite validator that combines multiple validators
///
/// All validators must accept the link. Returns the first error encountered.
#[derive(Default)]
pub struct CompositeValidator {
    validators: Vec<Box<dyn ConnectionValidator>>,
}

impl CompositeValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validator; validators run in the order they were added.
    pub fn add<V: ConnectionValidator + 'static>(mut self, validator: V) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl ConnectionValidator for CompositeValidator {
    fn validate(&self, graph: &Graph, output: &SocketRef, input: &SocketRef) -> Result<(), ConnectionError> {
        self.validators
            .iter()
            .try_for_each(|v| v.validate(graph, output, input))
    }
}

// ============================================================================
// Tests
// ============================================================================
