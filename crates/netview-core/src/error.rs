use crate::{ElementId, NetworkId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Element {0} already exists in network")]
    DuplicateElement(ElementId),
    #[error("Edge {edge} references missing node {node}")]
    DanglingEdge { edge: ElementId, node: ElementId },
    #[error("Column {column} expects {expected}, got {actual}")]
    ColumnTypeMismatch {
        column: String,
        expected: String,
        actual: String,
    },
    #[error("Unknown network: {0}")]
    UnknownNetwork(NetworkId),
}
