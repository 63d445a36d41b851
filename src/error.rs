//! Error types for form construction, control updates and rule evaluation

use crate::validation::RuleId;

/// Violations detected while building a field registry
///
/// Any of these makes the form impossible to instantiate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    /// A field was declared without a name
    #[error("field name must not be empty (label '{label}')")]
    EmptyName { label: String },

    /// Two fields share the same name
    #[error("field '{name}' is declared more than once")]
    DuplicateField { name: String },

    /// The initial value does not fit the declared kind
    #[error("field '{field}' of kind '{kind}' cannot hold a {actual} value")]
    ValueKind {
        field: String,
        kind: &'static str,
        actual: &'static str,
    },

    /// Two rules on one field use the same identifier
    #[error("field '{field}' has more than one rule with id '{rule}'")]
    DuplicateRule { field: String, rule: RuleId },

    /// Numeric constraints contradict each other
    #[error("field '{field}' has invalid constraints: {reason}")]
    InvalidConstraint { field: String, reason: String },

    /// A cross-field rule points at a field the form does not declare
    #[error("rule '{rule}' on field '{field}' depends on unknown field '{target}'")]
    UnknownDependency {
        field: String,
        rule: RuleId,
        target: String,
    },

    /// A pattern rule carries a regex that does not compile
    #[error("field '{field}' has an invalid pattern: {reason}")]
    InvalidPattern { field: String, reason: String },
}

impl SchemaError {
    /// Creates a constraint error.
    pub fn constraint(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConstraint {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors returned by the form engine
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// The form definition is structurally invalid
    #[error("invalid form schema: {0}")]
    Schema(#[from] SchemaError),

    /// A field name was looked up that the form does not declare
    #[error("field '{name}' not found")]
    NotFound { name: String },

    /// A value was written that the field's kind cannot hold
    #[error("field '{field}' expects a {expected} value, got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// A form definition document could not be parsed
    #[error("failed to parse form definition: {0}")]
    Definition(#[from] serde_json::Error),

    /// The submission collaborator rejected the payload
    #[error(transparent)]
    Submission(#[from] anyhow::Error),
}

impl FormError {
    /// Creates a not-found error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }
}

/// A validation rule that failed to produce a verdict
///
/// Faults never abort evaluation; the engine records one per failing rule
/// and substitutes a synthetic validation error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("rule '{rule}' on field '{field}' failed: {reason}")]
pub struct RuleFault {
    pub field: String,
    pub rule: RuleId,
    pub reason: String,
}
