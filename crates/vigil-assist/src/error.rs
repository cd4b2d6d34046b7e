//! Error types for vigil-assist

use thiserror::Error;

/// Browser assistant errors
#[derive(Error, Debug)]
pub enum AssistError {
    #[error("Invalid observation: {0}")]
    InvalidObservation(String),

    #[error("Export refused: extension `{extension}` is not a static format")]
    ExportRefused { extension: String },

    #[error("Unknown assistant output: {output_id}")]
    UnknownOutput { output_id: String },

    #[error("Unknown checklist item: {item_id}")]
    UnknownChecklistItem { item_id: String },

    /// The boundary guard refused a component at construction.
    #[error(transparent)]
    Boundary(#[from] vigil_boundary::BoundaryError),
}

/// Result type alias for vigil-assist
pub type Result<T> = std::result::Result<T, AssistError>;
