//! Error types for graph mutation and configuration loading.
//!
//! The public graph API reports failures as `bool` (or `Option`) results; the
//! `try_*` variants return these errors so callers can tell *why* an operation
//! was refused.

use crate::model::{ConnectionId, DataKind, NodeId, SocketRef};
use thiserror::Error;

/// Reasons a connection could not be added to a [`Graph`](crate::Graph).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// A connection with this id already exists
    #[error("Connection {0} already exists")]
    DuplicateId(ConnectionId),

    /// One of the referenced sockets is not part of the graph
    #[error("Socket {0} not found")]
    SocketNotFound(SocketRef),

    /// Start and end refer to the same socket
    #[error("Cannot connect socket to itself")]
    SameSocket,

    /// Both sockets are inputs or both are outputs
    #[error("Must connect an output to an input")]
    SameDirection,

    /// Data kinds differ and neither side is `Any`
    #[error("Kind mismatch: output is {output:?}, input is {input:?}")]
    KindMismatch { output: DataKind, input: DataKind },

    /// A single-connection socket already has a connection
    #[error("Socket {0} does not accept another connection")]
    CardinalityExceeded(SocketRef),

    /// A connection between these two sockets already exists
    #[error("Sockets are already connected")]
    DuplicateLink,

    /// The connection would close a cycle through the graph
    #[error("Connection would create a cycle")]
    WouldCreateCycle,

    /// Rejected by a custom validator
    #[error("{0}")]
    Rejected(String),
}

/// Errors from node-level graph operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A node with this id already exists
    #[error("Node {0} already exists")]
    DuplicateNode(NodeId),

    /// No node with this id exists
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    /// No connection with this id exists
    #[error("Connection {0} not found")]
    ConnectionNotFound(ConnectionId),
}

/// Errors raised while loading or validating an [`EditorConfig`](crate::EditorConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML document is malformed or has wrong field types
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be written as TOML
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is outside its allowed range
    #[error("Invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_display() {
        assert_eq!(
            ConnectionError::DuplicateId(ConnectionId::from("c1")).to_string(),
            "Connection c1 already exists"
        );
        assert_eq!(
            ConnectionError::SameSocket.to_string(),
            "Cannot connect socket to itself"
        );
        assert_eq!(
            ConnectionError::SameDirection.to_string(),
            "Must connect an output to an input"
        );
        assert_eq!(
            ConnectionError::KindMismatch {
                output: DataKind::Number,
                input: DataKind::String,
            }
            .to_string(),
            "Kind mismatch: output is Number, input is String"
        );
        assert_eq!(
            ConnectionError::CardinalityExceeded(SocketRef::new("a", "out")).to_string(),
            "Socket a.out does not accept another connection"
        );
        assert_eq!(
            ConnectionError::Rejected("no loops here".into()).to_string(),
            "no loops here"
        );
    }

    #[test]
    fn test_graph_error_display() {
        assert_eq!(
            GraphError::DuplicateNode(NodeId::from("n1")).to_string(),
            "Node n1 already exists"
        );
        assert_eq!(
            GraphError::NodeNotFound(NodeId::from("n2")).to_string(),
            "Node n2 not found"
        );
    }

    #[test]
    fn test_config_error_invalid_display() {
        let err = ConfigError::invalid("min_zoom", "must be positive");
        assert_eq!(err.to_string(), "Invalid value for `min_zoom`: must be positive");
    }
}
