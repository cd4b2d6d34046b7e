//! VIGIL Patch Covenant
//!
//! Software evolution without reopening the governance guarantees:
//! every code patch is hash-bound to a frozen human decision record,
//! validated against static symbol constraints, and applied only
//! through the single confirmation-gated write path.
//!
//! Nothing in this crate analyzes, scores, or recommends. It hashes,
//! binds, checks membership, and refuses.

pub mod applicator;
pub mod binding;
pub mod confirmation;
pub mod covenant;
pub mod diff;
pub mod error;
pub mod hashing;
pub mod log;
pub mod symbols;
pub mod types;

pub use applicator::apply_patch;
pub use binding::{create_binding, verify_binding};
pub use confirmation::{record_confirmation, record_rejection};
pub use covenant::PatchCovenant;
pub use diff::{extract_symbols, generate_diff, DiffResult};
pub use error::{CovenantError, Result};
pub use hashing::{binding_hash, decision_hash, patch_hash};
pub use log::CovenantLog;
pub use symbols::{default_constraints, validate_symbols, CONSTRAINT_VERSION};
pub use types::{ApplyResult, PatchBinding, PatchRecord, SymbolConstraints, SymbolValidation};
