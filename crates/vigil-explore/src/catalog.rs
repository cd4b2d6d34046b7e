//! Hypothesis template catalog
//!
//! Fixed templates per invariant category with a base testability
//! each. `{endpoint}` is substituted at generation time. Base scores
//! rank ease of testing only.

use crate::types::InvariantCategory;

/// Templates and base testability for one category.
pub struct CategoryTemplates {
    pub category: InvariantCategory,
    pub templates: &'static [&'static str],
    pub base_testability: f64,
}

/// The fixed catalog.
pub const CATALOG: &[CategoryTemplates] = &[
    CategoryTemplates {
        category: InvariantCategory::Authorization,
        templates: &[
            "Cross-user object access via {endpoint}",
            "Privilege escalation through {endpoint}",
            "Horizontal access control bypass at {endpoint}",
            "Vertical privilege boundary violation at {endpoint}",
        ],
        base_testability: 0.7,
    },
    CategoryTemplates {
        category: InvariantCategory::Monetary,
        templates: &[
            "Balance manipulation via {endpoint}",
            "Double-spend possibility at {endpoint}",
            "Transaction atomicity violation at {endpoint}",
            "Negative balance creation at {endpoint}",
        ],
        base_testability: 0.6,
    },
    CategoryTemplates {
        category: InvariantCategory::Workflow,
        templates: &[
            "Workflow step bypass at {endpoint}",
            "Step ordering violation via {endpoint}",
            "Workflow state manipulation at {endpoint}",
        ],
        base_testability: 0.65,
    },
    CategoryTemplates {
        category: InvariantCategory::Trust,
        templates: &[
            "Client-controlled trust decision at {endpoint}",
            "Server-side validation bypass at {endpoint}",
        ],
        base_testability: 0.7,
    },
    CategoryTemplates {
        category: InvariantCategory::SessionManagement,
        templates: &[
            "Session fixation at {endpoint}",
            "Session hijacking possibility at {endpoint}",
            "Session user binding violation at {endpoint}",
        ],
        base_testability: 0.75,
    },
    CategoryTemplates {
        category: InvariantCategory::InputValidation,
        templates: &[
            "Input length bounds violation at {endpoint}",
            "Input type confusion at {endpoint}",
        ],
        base_testability: 0.8,
    },
];

/// Templates for one category, if the catalog carries any.
pub fn templates_for(category: InvariantCategory) -> Option<&'static CategoryTemplates> {
    CATALOG.iter().find(|entry| entry.category == category)
}
