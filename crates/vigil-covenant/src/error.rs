//! Error types for vigil-covenant

use thiserror::Error;

/// Patch covenant errors
#[derive(Error, Debug)]
pub enum CovenantError {
    /// Apply was attempted without a confirmed human decision.
    #[error("Human confirmation required to apply patch {patch_id}")]
    ConfirmationRequired { patch_id: String },

    /// Apply was attempted against a rejected decision record.
    #[error("Patch {patch_id} was rejected by the human reviewer")]
    PatchRejected { patch_id: String },

    /// The binding does not verify against its component hashes.
    #[error("Patch binding {binding_hash} failed verification")]
    BindingInvalid { binding_hash: String },

    /// A modified symbol violated the static constraints.
    #[error("Symbol constraints violated: {0:?}")]
    SymbolsBlocked(Vec<String>),

    /// The boundary guard refused a component at construction.
    #[error(transparent)]
    Boundary(#[from] vigil_boundary::BoundaryError),
}

/// Result type alias for vigil-covenant
pub type Result<T> = std::result::Result<T, CovenantError>;
