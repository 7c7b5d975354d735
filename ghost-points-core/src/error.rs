use thiserror::Error;

/// Failures raised by a layer implementation.
#[derive(Debug, Error)]
pub enum LayerError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("layer is not in editing mode")]
    NotEditing,
    #[error("layer is already in editing mode")]
    AlreadyEditing,
    #[error("field already exists: {0}")]
    FieldExists(String),
    #[error("field index out of range: {0}")]
    FieldIndexOutOfRange(usize),
    #[error("field not found: {0}")]
    FieldNotFound(String),
    #[error("layer table not found: {0}")]
    TableNotFound(String),
    #[error("commit rejected: {0}")]
    CommitRejected(String),
}

/// Errors surfaced by the visibility operations.
#[derive(Debug, Error)]
pub enum GhostError {
    #[error("Layer must be a vector layer.")]
    UnsupportedLayerKind,
    #[error("Error adding \"_hidden\" field:\n{0}")]
    FieldCreation(#[source] LayerError),
    #[error("Error applying visibility:\n{0}")]
    VisibilityApply(#[source] LayerError),
    #[error("Please select a valid point layer.")]
    InvalidLayerSelection,
    #[error("No features selected.")]
    NoFeaturesSelected,
}

impl GhostError {
    /// Informational outcomes are reported but are not failures.
    pub fn is_informational(&self) -> bool {
        matches!(self, Self::NoFeaturesSelected)
    }
}

pub type Result<T, E = GhostError> = std::result::Result<T, E>;
