use crate::graph::VertexId;

/// Result type for graph, heap and loader operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the graph store, the indexed heap, path reconstruction and
/// the `.poly` loader. All of them mean the caller broke a contract or fed in
/// malformed input; an unreachable target is not an error.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unknown vertex: {0}")]
    UnknownVertex(i64),

    #[error("duplicate vertex: {0}")]
    DuplicateVertex(i64),

    #[error("vertex {0} has a non-finite coordinate")]
    NonFiniteCoordinate(VertexId),

    #[error("index {index} out of range for capacity {capacity}")]
    IndexOutOfRange { index: usize, capacity: usize },

    #[error("heap is empty")]
    EmptyHeap,

    #[error("vertex {0} is already in the heap")]
    AlreadyPresent(VertexId),

    #[error("predecessors from {target} do not lead back to {start}")]
    NoPathReconstructable { start: VertexId, target: VertexId },

    #[error("malformed .poly input at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
