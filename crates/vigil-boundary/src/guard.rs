//! Component admission and runtime capability checks
//!
//! Every core component presents a manifest at construction. The guard
//! refuses components that import forbidden modules, expose forbidden
//! method names, or declare write targets inside read-only phases. At
//! runtime, guarded operations present a capability token for the exact
//! capability they exercise.

use tracing::warn;

use crate::advisory::AdvisoryStamp;
use crate::capability::{Capability, CapabilityToken};
use crate::catalog::{ForbiddenCatalog, PhaseId};
use crate::error::{BoundaryError, Result};

/// Declaration a component makes about itself before admission.
#[derive(Debug, Clone)]
pub struct ComponentManifest {
    /// Component name, used in violation messages.
    pub component: String,
    /// Module names the component links against.
    pub imports: Vec<String>,
    /// Public method names the component exposes.
    pub methods: Vec<String>,
    /// Phases the component intends to write.
    pub write_targets: Vec<PhaseId>,
}

impl ComponentManifest {
    /// Start a manifest for the named component.
    pub fn new(component: impl Into<String>) -> Self {
        ComponentManifest {
            component: component.into(),
            imports: Vec::new(),
            methods: Vec::new(),
            write_targets: Vec::new(),
        }
    }

    /// Declare an imported module.
    pub fn with_import(mut self, module: impl Into<String>) -> Self {
        self.imports.push(module.into());
        self
    }

    /// Declare an exposed method name.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.methods.push(method.into());
        self
    }

    /// Declare a phase the component writes to.
    pub fn with_write_target(mut self, phase: PhaseId) -> Self {
        self.write_targets.push(phase);
        self
    }
}

/// Admission and capability checker shared by every core component.
#[derive(Debug, Clone)]
pub struct BoundaryGuard {
    catalog: ForbiddenCatalog,
}

impl BoundaryGuard {
    /// Build a guard around an immutable catalog.
    pub fn new(catalog: ForbiddenCatalog) -> Self {
        BoundaryGuard { catalog }
    }

    /// Admit a component or refuse its construction.
    ///
    /// Checks, in order: forbidden imports, forbidden method names,
    /// read-only write targets. The first failure is returned; the
    /// component must treat it as fatal.
    pub fn admit(&self, manifest: &ComponentManifest) -> Result<()> {
        for module in &manifest.imports {
            if self.catalog.is_forbidden_module(module) {
                warn!(component = %manifest.component, module = %module, "admission refused");
                return Err(BoundaryError::ArchitecturalViolation {
                    component: manifest.component.clone(),
                    detail: format!("forbidden module import `{module}`"),
                });
            }
        }
        for method in &manifest.methods {
            if self.catalog.is_forbidden_action(method) {
                warn!(component = %manifest.component, method = %method, "admission refused");
                return Err(BoundaryError::ArchitecturalViolation {
                    component: manifest.component.clone(),
                    detail: format!("forbidden method name `{method}`"),
                });
            }
        }
        for phase in &manifest.write_targets {
            if phase.is_read_only() {
                warn!(component = %manifest.component, phase = phase.0, "admission refused");
                return Err(BoundaryError::ReadOnlyViolation {
                    component: manifest.component.clone(),
                    phase: phase.0,
                });
            }
        }
        Ok(())
    }

    /// Mint a capability token for an admitted component.
    pub fn grant(&self, capability: Capability, component: &str) -> CapabilityToken {
        CapabilityToken::mint(capability, component)
    }

    /// Check that a token carries the capability an operation requires.
    pub fn require(
        &self,
        token: &CapabilityToken,
        required: Capability,
        operation: &str,
    ) -> Result<()> {
        if token.capability() != required {
            return Err(BoundaryError::CapabilityMissing {
                required: required.as_str().to_string(),
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    /// Refuse a write into a read-only phase at runtime.
    pub fn deny_write(&self, component: &str, phase: PhaseId) -> Result<()> {
        if phase.is_read_only() {
            return Err(BoundaryError::ReadOnlyViolation {
                component: component.to_string(),
                phase: phase.0,
            });
        }
        Ok(())
    }

    /// Stamp for an assistive output. Both flags are always true.
    pub fn stamp(&self) -> AdvisoryStamp {
        AdvisoryStamp::new()
    }
}

impl Default for BoundaryGuard {
    fn default() -> Self {
        Self::new(ForbiddenCatalog::default())
    }
}
