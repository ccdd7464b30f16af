use thiserror::Error;

/// Top-level error type for edge offsetting and the mesh it runs on.
#[derive(Debug, Error)]
pub enum OffsetEdgesError {
    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

impl OffsetEdgesError {
    /// Returns `true` if the error rejected the input before any mutation.
    #[must_use]
    pub fn is_input_rejection(&self) -> bool {
        matches!(
            self,
            Self::Selection(_) | Self::Operation(OperationError::InvalidInput(_))
        )
    }
}

/// Errors related to mesh topology and entity lookup.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("edge already exists between the given vertices")]
    DuplicateEdge,

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors raised while validating the edge selection.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("no edges selected")]
    NoEdgesSelected,

    #[error("select non-branching edge chains ({selected_edges} selected edges meet at one vertex)")]
    Branching { selected_edges: usize },
}

/// Errors related to mesh operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("operation failed: {0}")]
    Failed(String),
}

/// Convenience type alias for results using [`OffsetEdgesError`].
pub type Result<T> = std::result::Result<T, OffsetEdgesError>;
