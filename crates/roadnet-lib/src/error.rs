use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::graph::NodeId;

/// Convenient result alias for the roadnet library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a request is missing data or carries an unusable shape.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// Raised when a latitude/longitude pair is non-finite or out of range.
    #[error("invalid coordinate ({lat}, {lon}): latitude must be within [-90, 90] and longitude within [-180, 180]")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// Raised when a nearest-node lookup runs against a graph without nodes.
    #[error("road graph contains no nodes")]
    EmptyGraph,

    /// Raised when no path connects the resolved origin and destination nodes.
    #[error("no path found between node {source_node} and node {target_node}")]
    NoPathFound {
        source_node: NodeId,
        target_node: NodeId,
    },

    /// Raised when the engine is used before a road graph has been supplied.
    #[error("road graph unavailable: {reason}")]
    GraphUnavailable { reason: String },

    /// Raised when an in-flight search was abandoned by its caller.
    #[error("route search was cancelled")]
    Cancelled,

    /// Raised when a node identifier is added to a graph twice.
    #[error("duplicate node id {id}")]
    DuplicateNode { id: NodeId },

    /// Raised when an edge references a node that is not part of the graph.
    #[error("edge references unknown node {id}")]
    UnknownNode { id: NodeId },

    /// Raised when an edge carries a negative or non-finite weight.
    #[error("edge {source_node} -> {target_node} has invalid {field}: {value}")]
    InvalidEdge {
        source_node: NodeId,
        target_node: NodeId,
        field: &'static str,
        value: f64,
    },

    /// Raised when a road graph document cannot be parsed.
    #[error("failed to parse road graph from {path}: {source}")]
    GraphParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Raised when serializing a graph snapshot fails.
    #[error("failed to serialize graph snapshot: {message}")]
    SnapshotSerialize { message: String },

    /// Raised when loading a graph snapshot from a file fails.
    #[error("failed to load graph snapshot from {path}: {message}")]
    SnapshotLoad { path: PathBuf, message: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Machine-readable classification of an [`Error`].
///
/// The HTTP layer reports this value alongside the human-readable message so
/// callers can branch on the failure without parsing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidRequest,
    InvalidCoordinate,
    EmptyGraph,
    NoPathFound,
    GraphUnavailable,
    Cancelled,
    InvalidGraph,
    Internal,
}

impl ErrorKind {
    /// Stable snake_case label, also used as a metric label.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::InvalidCoordinate => "invalid_coordinate",
            ErrorKind::EmptyGraph => "empty_graph",
            ErrorKind::NoPathFound => "no_path_found",
            ErrorKind::GraphUnavailable => "graph_unavailable",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::InvalidGraph => "invalid_graph",
            ErrorKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Classify this error for callers that need a stable discriminant.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            Error::InvalidCoordinate { .. } => ErrorKind::InvalidCoordinate,
            Error::EmptyGraph => ErrorKind::EmptyGraph,
            Error::NoPathFound { .. } => ErrorKind::NoPathFound,
            Error::GraphUnavailable { .. } => ErrorKind::GraphUnavailable,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::DuplicateNode { .. }
            | Error::UnknownNode { .. }
            | Error::InvalidEdge { .. }
            | Error::GraphParse { .. } => ErrorKind::InvalidGraph,
            Error::SnapshotSerialize { .. } | Error::SnapshotLoad { .. } | Error::Io(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Shorthand for building an [`Error::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Error::InvalidRequest {
            message: message.into(),
        }
    }
}
