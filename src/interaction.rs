//! The interaction engine.
//!
//! [`InteractionEngine`] owns the [`Graph`], the [`ViewportTransform`] and all
//! selection and interaction state. It consumes [`InputEvent`]s, mutates the
//! graph and viewport, and queues one [`EditorEvent`] per mutation for the
//! caller to drain.
//!
//! Left-button interaction runs one of three mutually exclusive modes:
//!
//! | pointer-down on | mode                 | pointer-up                       |
//! |-----------------|----------------------|----------------------------------|
//! | socket          | `ConnectingSocket`   | connect to the socket under it   |
//! | node            | `DraggingNodes`      | report moved nodes               |
//! | connection      | stays `Idle`         | -                                |
//! | background      | `BoxSelecting`       | add intersected nodes            |
//!
//! Middle-button panning is tracked separately and can overlap any mode.

use crate::config::EditorConfig;
use crate::error::{ConnectionError, GraphError};
use crate::events::{ContextTarget, EditorEvent};
use crate::graph::{CompositeValidator, ConnectionValidator, Graph, NoCyclesValidator, NoDuplicatesValidator};
use crate::grid::{snap_point, GridLines};
use crate::hit_test::{find_node_at, find_socket_at, Rect};
use crate::input::{InputEvent, Key, Modifiers, PointerButton};
use crate::model::{Connection, ConnectionId, Node, NodeId, SocketDirection, SocketRef};
use crate::path::CubicBezier;
use crate::selection::{SelectionChange, SelectionManager};
use crate::state::GeometryCache;
use crate::viewport::{CullResult, ViewportTransform};

/// Current left-button interaction.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    /// Rubber-band selection; both corners in screen space
    BoxSelecting {
        anchor: (f32, f32),
        current: (f32, f32),
    },
    /// Moving the selected nodes; positions in world space
    DraggingNodes {
        anchor: (f32, f32),
        current: (f32, f32),
    },
    /// Dragging a new connection out of `source`; `current` in screen space
    ConnectingSocket {
        source: SocketRef,
        current: (f32, f32),
    },
}

impl InteractionMode {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionMode::Idle)
    }

    fn name(&self) -> &'static str {
        match self {
            InteractionMode::Idle => "idle",
            InteractionMode::BoxSelecting { .. } => "box-selecting",
            InteractionMode::DraggingNodes { .. } => "dragging-nodes",
            InteractionMode::ConnectingSocket { .. } => "connecting-socket",
        }
    }
}

/// What is under the pointer while idle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoverState {
    pub node: Option<NodeId>,
    pub socket: Option<SocketRef>,
    pub connection: Option<ConnectionId>,
}

pub struct InteractionEngine {
    graph: Graph,
    viewport: ViewportTransform,
    config: EditorConfig,
    geometry: GeometryCache,
    node_selection: SelectionManager<NodeId>,
    connection_selection: SelectionManager<ConnectionId>,
    mode: InteractionMode,
    /// Selected nodes and their positions when the drag began
    drag_origins: Vec<(NodeId, (f32, f32))>,
    /// Last pointer position while middle-button panning
    pan_anchor: Option<(f32, f32)>,
    hover: HoverState,
    events: Vec<EditorEvent>,
}

impl Default for InteractionEngine {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl InteractionEngine {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_graph(config, Graph::new())
    }

    /// Take ownership of an existing graph.
    ///
    /// The configured socket layout is applied to every node, and any
    /// validator already installed on the graph is replaced by the configured
    /// connection policy. Use [`set_connection_validator`](Self::set_connection_validator)
    /// to add custom rules.
    pub fn with_graph(config: EditorConfig, mut graph: Graph) -> Self {
        if let Err(err) = config.validate() {
            tracing::warn!(%err, "editor config has invalid values");
        }
        let ids = graph.node_ids().to_vec();
        for id in &ids {
            if let Some(node) = graph.node_mut(id.as_str()) {
                node.set_socket_layout(config.socket_layout);
                node.set_selected(false);
            }
        }

        let mut engine = Self {
            viewport: ViewportTransform::default().with_zoom_bounds(config.min_zoom, config.max_zoom),
            geometry: GeometryCache::new(config.curve_params()),
            graph,
            config,
            node_selection: SelectionManager::new(),
            connection_selection: SelectionManager::new(),
            mode: InteractionMode::Idle,
            drag_origins: Vec::new(),
            pan_anchor: None,
            hover: HoverState::default(),
            events: Vec::new(),
        };
        engine.apply_connection_policy(None);
        engine
    }

    /// Add a custom validator, consulted after the duplicate and cycle
    /// policies from the config.
    pub fn set_connection_validator<V: ConnectionValidator + 'static>(&mut self, validator: V) {
        self.apply_connection_policy(Some(Box::new(validator)));
    }

    fn apply_connection_policy(&mut self, custom: Option<Box<dyn ConnectionValidator>>) {
        let mut validator = CompositeValidator::new();
        if !self.config.allow_duplicate_connections {
            validator = validator.add(NoDuplicatesValidator);
        }
        if self.config.forbid_cycles {
            validator = validator.add(NoCyclesValidator);
        }
        if let Some(custom) = custom {
            validator = validator.add(custom);
        }
        if validator.is_empty() {
            self.graph.clear_validator();
        } else {
            self.graph.set_validator(validator);
        }
    }

    // ========================================================================
    // Read-only queries
    // ========================================================================

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn viewport(&self) -> &ViewportTransform {
        &self.viewport
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn mode(&self) -> &InteractionMode {
        &self.mode
    }

    pub fn hover(&self) -> &HoverState {
        &self.hover
    }

    pub fn is_panning(&self) -> bool {
        self.pan_anchor.is_some()
    }

    /// Selected node ids, in id order.
    pub fn selected_nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.node_selection.iter()
    }

    /// Selected connection ids, in id order.
    pub fn selected_connections(&self) -> impl Iterator<Item = &ConnectionId> {
        self.connection_selection.iter()
    }

    pub fn is_node_selected(&self, id: &str) -> bool {
        self.graph.node(id).map_or(false, Node::is_selected)
    }

    pub fn is_connection_selected(&self, id: &str) -> bool {
        self.connection_selection.contains(&ConnectionId::from(id))
    }

    /// Screen-space selection rectangle while box-selecting.
    pub fn selection_rect(&self) -> Option<Rect> {
        match self.mode {
            InteractionMode::BoxSelecting { anchor, current } => Some(Rect::from_corners(anchor, current)),
            _ => None,
        }
    }

    /// Screen-space curve of the connection being dragged, oriented from the
    /// output side.
    pub fn connection_preview(&self) -> Option<CubicBezier> {
        let InteractionMode::ConnectingSocket { source, current } = &self.mode else {
            return None;
        };
        let socket = self.graph.socket(source)?;
        let anchor = self.socket_screen_position(source)?;
        let (start, end) = match socket.direction() {
            SocketDirection::Output => (anchor, *current),
            SocketDirection::Input => (*current, anchor),
        };
        Some(CubicBezier::from_endpoints(
            start,
            end,
            self.config.bezier_min_offset,
            self.config.bezier_offset_ratio,
        ))
    }

    pub fn socket_screen_position(&self, socket: &SocketRef) -> Option<(f32, f32)> {
        self.graph
            .socket_world_position(socket)
            .map(|world| self.viewport.world_to_screen(world))
    }

    /// Screen-space geometry for rendering, rebuilt if anything changed.
    pub fn geometry(&mut self) -> &GeometryCache {
        self.geometry.refresh(&self.graph, &self.viewport);
        &self.geometry
    }

    /// Nodes and connections worth drawing this frame.
    pub fn visible(&self) -> CullResult {
        self.viewport.cull(&self.graph, self.config.viewport_padding)
    }

    pub fn grid_lines(&self) -> GridLines {
        GridLines::compute(&self.viewport, self.config.grid_size, self.config.major_grid_every)
    }

    /// Events queued since the last drain.
    pub fn events(&self) -> &[EditorEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // Graph mutation
    // ========================================================================

    /// Add a node, applying the configured socket layout.
    pub fn add_node(&mut self, node: Node) -> bool {
        self.try_add_node(node).is_ok()
    }

    pub fn try_add_node(&mut self, mut node: Node) -> Result<(), GraphError> {
        node.set_socket_layout(self.config.socket_layout);
        node.set_selected(false);
        let id = node.id().clone();
        self.graph.try_add_node(node)?;
        self.geometry.mark_dirty();
        self.emit(EditorEvent::NodeAdded { id });
        Ok(())
    }

    /// Mutable access to a node's data. Position changes made here are not
    /// reported; use [`move_node`](Self::move_node) for that.
    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.geometry.mark_dirty();
        self.graph.node_mut(id)
    }

    /// Remove a node. Its connections are removed and reported first.
    pub fn remove_node(&mut self, id: &str) -> bool {
        self.try_remove_node(id).is_ok()
    }

    pub fn try_remove_node(&mut self, id: &str) -> Result<(), GraphError> {
        let selection_changed = self
            .take_node_with_events(id)
            .ok_or_else(|| GraphError::NodeNotFound(NodeId::from(id)))?;
        if selection_changed {
            self.emit_selection_changed();
        }
        Ok(())
    }

    /// Returns `None` if the node is absent, otherwise whether the selection
    /// changed.
    fn take_node_with_events(&mut self, id: &str) -> Option<bool> {
        let removed = self.graph.take_node(id)?;
        let mut selection_changed = false;
        for connection in &removed.connections {
            selection_changed |= self.connection_selection.deselect(connection.id());
            self.emit(EditorEvent::ConnectionRemoved {
                id: connection.id().clone(),
            });
        }
        selection_changed |= self.node_selection.deselect(removed.node.id());
        self.drag_origins.retain(|(node, _)| node != removed.node.id());
        self.emit(EditorEvent::NodeRemoved {
            id: removed.node.id().clone(),
        });
        self.forget_hover();
        Some(selection_changed)
    }

    pub fn add_connection(&mut self, connection: Connection) -> bool {
        self.try_add_connection(connection).is_ok()
    }

    pub fn try_add_connection(&mut self, connection: Connection) -> Result<(), ConnectionError> {
        let id = connection.id().clone();
        self.graph.try_add_connection(connection)?;
        self.geometry.mark_dirty();
        self.emit(EditorEvent::ConnectionCreated { id });
        Ok(())
    }

    /// Connect two sockets given in either order, generating the connection id.
    ///
    /// The connection takes its colour from the data kind of `source`.
    pub fn connect(&mut self, source: &SocketRef, target: &SocketRef) -> Result<ConnectionId, ConnectionError> {
        let (socket, _) = self.graph.check_link(source, target)?;
        let color = socket.kind().color();
        let id = self.graph.next_connection_id();
        self.try_add_connection(
            Connection::new(id.clone(), source.clone(), target.clone()).with_color(color),
        )?;
        Ok(id)
    }

    pub fn remove_connection(&mut self, id: &str) -> bool {
        match self.take_connection_with_events(id) {
            Some(selection_changed) => {
                if selection_changed {
                    self.emit_selection_changed();
                }
                true
            }
            None => false,
        }
    }

    fn take_connection_with_events(&mut self, id: &str) -> Option<bool> {
        let connection = self.graph.try_remove_connection(id).ok()?;
        let selection_changed = self.connection_selection.deselect(connection.id());
        self.emit(EditorEvent::ConnectionRemoved {
            id: connection.id().clone(),
        });
        self.forget_hover();
        Some(selection_changed)
    }

    /// Remove a socket from a node, reporting its severed connections.
    pub fn remove_socket(&mut self, node: &str, socket: &str) -> bool {
        let Some((_, severed)) = self.graph.remove_socket(node, socket) else {
            return false;
        };
        let mut selection_changed = false;
        for connection in &severed {
            selection_changed |= self.connection_selection.deselect(connection.id());
            self.emit(EditorEvent::ConnectionRemoved {
                id: connection.id().clone(),
            });
        }
        self.forget_hover();
        if selection_changed {
            self.emit_selection_changed();
        }
        true
    }

    /// Move a node to a world position. Returns false if the node is missing.
    pub fn move_node(&mut self, id: &str, x: f32, y: f32) -> bool {
        let Some(node) = self.graph.node_mut(id) else {
            return false;
        };
        let from = node.position();
        node.set_position(x, y);
        if from != (x, y) {
            self.geometry.mark_dirty();
            self.emit(EditorEvent::NodeMoved {
                id: NodeId::from(id),
                from,
                to: (x, y),
            });
        }
        true
    }

    /// Remove every selected connection, then every selected node.
    ///
    /// Returns the number of removed entities, not counting connections
    /// removed along with their nodes.
    pub fn delete_selected(&mut self) -> usize {
        let connections: Vec<ConnectionId> = self
            .graph
            .connections()
            .filter(|c| self.connection_selection.contains(c.id()))
            .map(|c| c.id().clone())
            .collect();
        let nodes: Vec<NodeId> = self
            .graph
            .nodes()
            .filter(|n| n.is_selected())
            .map(|n| n.id().clone())
            .collect();
        if connections.is_empty() && nodes.is_empty() {
            return 0;
        }

        let mut removed = 0;
        for id in &connections {
            if self.take_connection_with_events(id.as_str()).is_some() {
                removed += 1;
            }
        }
        for id in &nodes {
            if self.take_node_with_events(id.as_str()).is_some() {
                removed += 1;
            }
        }
        let graph = &self.graph;
        self.node_selection.retain(|id| graph.contains_node(id.as_str()));
        self.connection_selection.retain(|id| graph.connection(id.as_str()).is_some());
        tracing::debug!(removed, "deleted selection");
        self.emit_selection_changed();
        removed
    }

    /// Remove all nodes and connections and reset interaction state.
    pub fn clear_graph(&mut self) {
        self.graph.clear();
        self.node_selection.clear();
        self.connection_selection.clear();
        self.drag_origins.clear();
        self.set_mode(InteractionMode::Idle);
        self.forget_hover();
        self.emit(EditorEvent::GraphCleared);
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Select a node as if it had been clicked. Returns false if missing.
    pub fn select_node(&mut self, id: &str, additive: bool) -> bool {
        if !self.graph.contains_node(id) {
            return false;
        }
        self.click_node(NodeId::from(id), additive);
        true
    }

    pub fn deselect_node(&mut self, id: &str) -> bool {
        let id = NodeId::from(id);
        if !self.node_selection.deselect(&id) {
            return false;
        }
        self.apply_node_change(SelectionChange {
            added: Vec::new(),
            removed: vec![id],
        });
        self.emit_selection_changed();
        true
    }

    /// Select a connection as if it had been clicked. Returns false if missing.
    pub fn select_connection(&mut self, id: &str, additive: bool) -> bool {
        if self.graph.connection(id).is_none() {
            return false;
        }
        self.click_connection(ConnectionId::from(id), additive);
        true
    }

    pub fn deselect_connection(&mut self, id: &str) -> bool {
        if !self.connection_selection.deselect(&ConnectionId::from(id)) {
            return false;
        }
        self.emit_selection_changed();
        true
    }

    pub fn select_all(&mut self) {
        let ids: Vec<NodeId> = self.graph.node_ids().to_vec();
        let added = self.node_selection.extend(ids);
        if self.apply_node_change(SelectionChange {
            added,
            removed: Vec::new(),
        }) {
            self.emit_selection_changed();
        }
    }

    pub fn clear_selection(&mut self) {
        let nodes = self.clear_node_selection();
        let connections = self.clear_connection_selection();
        if nodes || connections {
            self.emit_selection_changed();
        }
    }

    fn click_node(&mut self, id: NodeId, additive: bool) {
        let change = self.node_selection.handle_interaction(&id, additive);
        let nodes = self.apply_node_change(change);
        let connections = self.clear_connection_selection();
        if nodes || connections {
            self.emit_selection_changed();
        }
    }

    fn click_connection(&mut self, id: ConnectionId, additive: bool) {
        let connections = !self.connection_selection.handle_interaction(&id, additive).is_empty();
        let nodes = self.config.allow_background_deselection && self.clear_node_selection();
        if nodes || connections {
            self.emit_selection_changed();
        }
    }

    /// Sync node flags and emit per-node events. Returns true if anything changed.
    fn apply_node_change(&mut self, change: SelectionChange<NodeId>) -> bool {
        for id in &change.removed {
            if let Some(node) = self.graph.node_mut(id.as_str()) {
                node.set_selected(false);
            }
            self.emit(EditorEvent::NodeDeselected { id: id.clone() });
        }
        for id in &change.added {
            if let Some(node) = self.graph.node_mut(id.as_str()) {
                node.set_selected(true);
            }
            self.emit(EditorEvent::NodeSelected { id: id.clone() });
        }
        !change.is_empty()
    }

    fn clear_node_selection(&mut self) -> bool {
        let removed = self.node_selection.clear();
        self.apply_node_change(SelectionChange {
            added: Vec::new(),
            removed,
        })
    }

    fn clear_connection_selection(&mut self) -> bool {
        !self.connection_selection.clear().is_empty()
    }

    fn emit_selection_changed(&mut self) {
        self.emit(EditorEvent::SelectionChanged {
            nodes: self.node_selection.iter().cloned().collect(),
            connections: self.connection_selection.iter().cloned().collect(),
        });
    }

    // ========================================================================
    // Viewport
    // ========================================================================

    pub fn set_panel_size(&mut self, width: f32, height: f32) {
        self.viewport.set_panel_size(width, height);
        self.geometry.mark_dirty();
    }

    /// Zoom around the panel centre.
    pub fn set_zoom(&mut self, zoom: f32) -> bool {
        let (w, h) = self.viewport.panel_size();
        self.zoom_at(zoom, (w * 0.5, h * 0.5))
    }

    /// Zoom keeping the world point under `screen_anchor` in place.
    pub fn zoom_at(&mut self, zoom: f32, screen_anchor: (f32, f32)) -> bool {
        let before = self.view_state();
        self.viewport.set_zoom_centered(zoom, screen_anchor);
        self.after_view_change(before)
    }

    /// Pan by a screen-space delta.
    pub fn pan_by(&mut self, dx: f32, dy: f32) -> bool {
        let before = self.view_state();
        self.viewport.pan_by_screen(dx, dy);
        self.after_view_change(before)
    }

    pub fn set_pan(&mut self, x: f32, y: f32) -> bool {
        let before = self.view_state();
        self.viewport.set_pan(x, y);
        self.after_view_change(before)
    }

    /// Fit every node into the panel. Returns false for an empty graph.
    pub fn frame_all(&mut self) -> bool {
        match self.graph.bounds(None) {
            Some(bounds) => self.frame_rect(&bounds),
            None => false,
        }
    }

    /// Fit the given nodes into the panel. Unknown ids are ignored.
    pub fn frame_nodes(&mut self, ids: &[NodeId]) -> bool {
        match self.graph.bounds(Some(ids)) {
            Some(bounds) => self.frame_rect(&bounds),
            None => false,
        }
    }

    fn frame_rect(&mut self, bounds: &Rect) -> bool {
        let before = self.view_state();
        self.viewport.frame_rect(bounds, self.config.frame_padding);
        self.after_view_change(before);
        true
    }

    pub fn reset_view(&mut self) -> bool {
        let before = self.view_state();
        self.viewport.reset();
        self.after_view_change(before)
    }

    fn view_state(&self) -> (f32, (f32, f32)) {
        (self.viewport.zoom(), self.viewport.pan())
    }

    /// Emit zoom/pan events for whatever changed. Returns true if anything did.
    fn after_view_change(&mut self, (zoom_before, pan_before): (f32, (f32, f32))) -> bool {
        let zoom = self.viewport.zoom();
        let pan = self.viewport.pan();
        if zoom != zoom_before {
            self.emit(EditorEvent::ZoomChanged { zoom });
        }
        if pan != pan_before {
            self.emit(EditorEvent::PanChanged { pan });
        }
        let changed = zoom != zoom_before || pan != pan_before;
        if changed {
            self.geometry.mark_dirty();
        }
        changed
    }

    // ========================================================================
    // Input handling
    // ========================================================================

    /// Feed one input event. Returns true if the event was used.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::PointerDown {
                position,
                button,
                modifiers,
            } => self.pointer_down(*position, *button, *modifiers),
            InputEvent::PointerMove { position, .. } => self.pointer_move(*position),
            InputEvent::PointerUp {
                position, button, ..
            } => self.pointer_up(*position, *button),
            InputEvent::Wheel {
                position, delta, ..
            } => self.wheel(*position, *delta),
            InputEvent::KeyDown { key, modifiers } => self.key_down(key, *modifiers),
            InputEvent::KeyUp { .. } => false,
            InputEvent::Resize { width, height } => {
                self.set_panel_size(*width, *height);
                true
            }
        }
    }

    /// Abort the active mode. Box selections and connection drags are
    /// discarded; dragged nodes stay where they are and are reported moved.
    pub fn cancel_interaction(&mut self) -> bool {
        let was_panning = self.pan_anchor.take().is_some();
        match self.take_mode() {
            InteractionMode::Idle => was_panning,
            InteractionMode::DraggingNodes { .. } => {
                self.finish_drag();
                true
            }
            InteractionMode::BoxSelecting { .. } | InteractionMode::ConnectingSocket { .. } => true,
        }
    }

    fn pointer_down(&mut self, position: (f32, f32), button: PointerButton, modifiers: Modifiers) -> bool {
        match button {
            PointerButton::Left => self.left_down(position, modifiers),
            PointerButton::Middle => {
                if !self.config.pan_enabled {
                    return false;
                }
                self.pan_anchor = Some(position);
                true
            }
            PointerButton::Right => self.request_context_menu(position),
        }
    }

    fn left_down(&mut self, position: (f32, f32), modifiers: Modifiers) -> bool {
        if !self.mode.is_idle() {
            return false;
        }
        let world = self.viewport.screen_to_world(position);
        let additive = modifiers.is_additive() && self.config.allow_multiple_selection;

        if let Some(source) = self.socket_at(world) {
            self.set_mode(InteractionMode::ConnectingSocket {
                source,
                current: position,
            });
            return true;
        }

        if let Some(id) = self.node_at(world) {
            self.click_node(id, additive);
            self.drag_origins = self
                .graph
                .nodes()
                .filter(|n| n.is_selected())
                .map(|n| (n.id().clone(), n.position()))
                .collect();
            self.set_mode(InteractionMode::DraggingNodes {
                anchor: world,
                current: world,
            });
            return true;
        }

        if let Some(id) = self.connection_at(position) {
            self.click_connection(id, additive);
            return true;
        }

        if !additive && self.config.allow_background_deselection {
            self.clear_selection();
        }
        if self.config.rectangle_selection_enabled {
            self.set_mode(InteractionMode::BoxSelecting {
                anchor: position,
                current: position,
            });
        }
        true
    }

    fn pointer_move(&mut self, position: (f32, f32)) -> bool {
        let mut handled = false;
        if let Some(last) = self.pan_anchor {
            self.pan_anchor = Some(position);
            let speed = self.config.pan_speed;
            handled = self.pan_by((position.0 - last.0) * speed, (position.1 - last.1) * speed);
        }

        match self.mode.clone() {
            InteractionMode::Idle => {
                if self.config.highlight_hovered_elements {
                    handled |= self.update_hover(position);
                }
                handled
            }
            InteractionMode::DraggingNodes { anchor, .. } => {
                let world = self.viewport.screen_to_world(position);
                self.drag_to(anchor, world);
                self.mode = InteractionMode::DraggingNodes {
                    anchor,
                    current: world,
                };
                true
            }
            InteractionMode::BoxSelecting { anchor, .. } => {
                self.mode = InteractionMode::BoxSelecting {
                    anchor,
                    current: position,
                };
                true
            }
            InteractionMode::ConnectingSocket { source, .. } => {
                self.mode = InteractionMode::ConnectingSocket {
                    source,
                    current: position,
                };
                true
            }
        }
    }

    /// Place every dragged node at its start position plus the total pointer
    /// offset, snapping if enabled.
    fn drag_to(&mut self, anchor: (f32, f32), world: (f32, f32)) {
        let offset = (world.0 - anchor.0, world.1 - anchor.1);
        let grid = self.config.snap_to_grid.then_some(self.config.grid_size);
        for (id, origin) in &self.drag_origins {
            let mut target = (origin.0 + offset.0, origin.1 + offset.1);
            if let Some(grid) = grid {
                target = snap_point(target, grid);
            }
            if let Some(node) = self.graph.node_mut(id.as_str()) {
                node.set_position(target.0, target.1);
            }
        }
        self.geometry.mark_dirty();
    }

    fn pointer_up(&mut self, position: (f32, f32), button: PointerButton) -> bool {
        match button {
            PointerButton::Left => self.left_up(position),
            PointerButton::Middle => self.pan_anchor.take().is_some(),
            PointerButton::Right => false,
        }
    }

    fn left_up(&mut self, position: (f32, f32)) -> bool {
        match self.take_mode() {
            InteractionMode::Idle => false,
            InteractionMode::DraggingNodes { .. } => {
                self.finish_drag();
                true
            }
            InteractionMode::BoxSelecting { anchor, .. } => {
                self.finish_box(Rect::from_corners(anchor, position));
                true
            }
            InteractionMode::ConnectingSocket { source, .. } => {
                self.finish_connection(&source, position);
                true
            }
        }
    }

    fn finish_drag(&mut self) {
        for (id, from) in std::mem::take(&mut self.drag_origins) {
            let Some(to) = self.graph.node(id.as_str()).map(Node::position) else {
                continue;
            };
            if to != from {
                self.emit(EditorEvent::NodeMoved { id, from, to });
            }
        }
    }

    fn finish_box(&mut self, screen_rect: Rect) {
        let area = self.viewport.screen_rect_to_world(&screen_rect);
        let mut hits: Vec<NodeId> = self
            .graph
            .nodes_in_rect(&area)
            .into_iter()
            .map(|n| n.id().clone())
            .collect();
        tracing::debug!(?area, hits = hits.len(), "box selection");

        let change = if self.config.allow_multiple_selection {
            SelectionChange {
                added: self.node_selection.extend(hits),
                removed: Vec::new(),
            }
        } else {
            match hits.pop() {
                Some(top) => self.node_selection.replace_selection([top]),
                None => SelectionChange::default(),
            }
        };
        if self.apply_node_change(change) {
            self.emit_selection_changed();
        }
    }

    fn finish_connection(&mut self, source: &SocketRef, position: (f32, f32)) {
        let world = self.viewport.screen_to_world(position);
        let Some(target) = self.socket_at(world) else {
            tracing::debug!(%source, "connection drag dropped on empty space");
            return;
        };
        match self.connect(source, &target) {
            Ok(id) => tracing::debug!(connection = %id, "connection created by drag"),
            Err(err) => tracing::debug!(%err, %source, %target, "connection drag discarded"),
        }
    }

    fn request_context_menu(&mut self, position: (f32, f32)) -> bool {
        if !self.mode.is_idle() {
            return false;
        }
        let world = self.viewport.screen_to_world(position);
        let target = if let Some(id) = self.node_at(world) {
            self.config.context_menu_on_nodes.then_some(ContextTarget::Node { id })
        } else if let Some(id) = self.connection_at(position) {
            self.config
                .context_menu_on_connections
                .then_some(ContextTarget::Connection { id })
        } else {
            self.config
                .context_menu_on_background
                .then_some(ContextTarget::Background {
                    world_position: world,
                })
        };

        match target {
            Some(target) => {
                self.emit(EditorEvent::ContextMenuRequested {
                    target,
                    screen_position: position,
                });
                true
            }
            None => false,
        }
    }

    fn wheel(&mut self, position: (f32, f32), delta: f32) -> bool {
        if !self.config.zoom_enabled || delta == 0.0 || !delta.is_finite() {
            return false;
        }
        let zoom = self.viewport.zoom() * (1.0 + delta * self.config.scroll_zoom_speed);
        self.zoom_at(zoom, position)
    }

    fn key_down(&mut self, key: &Key, modifiers: Modifiers) -> bool {
        match key {
            Key::Escape => self.cancel_interaction(),
            Key::Delete | Key::Backspace => self.mode.is_idle() && self.delete_selected() > 0,
            Key::Character(c) if c.eq_ignore_ascii_case(&'a') && modifiers.is_command() => {
                if !self.mode.is_idle() {
                    return false;
                }
                self.select_all();
                true
            }
            Key::Character(c) if c.eq_ignore_ascii_case(&'f') && !modifiers.is_command() => {
                self.mode.is_idle() && self.frame_all()
            }
            _ => false,
        }
    }

    // ========================================================================
    // Hit-testing helpers
    // ========================================================================

    fn socket_at(&self, world: (f32, f32)) -> Option<SocketRef> {
        find_socket_at(world, self.graph.nodes(), self.config.socket_hit_radius())
            .map(|(node, socket)| SocketRef::new(node.clone(), socket.clone()))
    }

    fn node_at(&self, world: (f32, f32)) -> Option<NodeId> {
        find_node_at(world, self.graph.nodes()).cloned()
    }

    fn connection_at(&mut self, screen: (f32, f32)) -> Option<ConnectionId> {
        self.geometry.refresh(&self.graph, &self.viewport);
        self.geometry
            .find_link_at(screen, self.config.connection_hit_tolerance)
            .cloned()
    }

    fn update_hover(&mut self, position: (f32, f32)) -> bool {
        let world = self.viewport.screen_to_world(position);
        let socket = self.socket_at(world);
        let node = self.node_at(world);
        let connection = if socket.is_none() && node.is_none() {
            self.connection_at(position)
        } else {
            None
        };
        let hover = HoverState {
            node,
            socket,
            connection,
        };
        if hover == self.hover {
            return false;
        }
        tracing::trace!(?hover, "hover changed");
        self.hover = hover;
        true
    }

    fn forget_hover(&mut self) {
        self.hover = HoverState::default();
        self.geometry.mark_dirty();
    }

    fn set_mode(&mut self, mode: InteractionMode) {
        if mode != self.mode {
            tracing::debug!(from = self.mode.name(), to = mode.name(), "interaction mode");
        }
        self.mode = mode;
    }

    fn take_mode(&mut self) -> InteractionMode {
        let mode = std::mem::take(&mut self.mode);
        if !mode.is_idle() {
            tracing::debug!(from = mode.name(), "interaction finished");
        }
        mode
    }

    fn emit(&mut self, event: EditorEvent) {
        tracing::trace!(?event, "editor event");
        self.events.push(event);
    }
}

#[cfg(feature = "layout")]
impl InteractionEngine {
    /// Arrange all nodes in layers following their connections, reporting
    /// every node that moved.
    pub fn auto_arrange(&mut self, config: &crate::layout::SugiyamaConfig) -> usize {
        let positions = crate::layout::arrange_graph(&self.graph, config);
        let mut moved = 0;
        for (id, (x, y)) in positions {
            let before = self.graph.node(id.as_str()).map(Node::position);
            if before != Some((x, y)) && self.move_node(id.as_str(), x, y) {
                moved += 1;
            }
        }
        moved
    }
}
