use std::io;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PlanError>;

/// Errors raised while normalizing, comparing, or annotating plans.
///
/// Nothing here is retried: a failure aborts the whole explain request.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The plan document does not have the shape `EXPLAIN (FORMAT JSON)` produces.
    #[error("malformed plan: {0}")]
    MalformedPlan(String),
    /// A field required by the normalizer or a node template is absent or mistyped.
    #[error("malformed plan: '{kind}' node is missing field '{field}'")]
    MissingField {
        /// Node kind being processed (or `<unknown>` when `Node Type` itself is missing).
        kind: String,
        /// Name of the absent field.
        field: &'static str,
    },
    /// The plan nests deeper than the configured ceiling allows.
    #[error("malformed plan: nesting exceeds depth {limit}")]
    DepthExceeded {
        /// Ceiling that was hit.
        limit: usize,
    },
    /// The traversal visited more nodes than the configured ceiling allows.
    #[error("malformed plan: traversal exceeded {limit} node visits")]
    TooManyNodes {
        /// Ceiling that was hit.
        limit: usize,
    },
    /// An aggregate node reported a strategy outside `Sorted`, `Hashed`, `Plain`.
    #[error("invalid aggregate strategy '{strategy}'")]
    InvalidStrategy {
        /// Strategy value found on the node.
        strategy: String,
    },
    /// The explain source failed to produce a plan.
    #[error("query execution failed: {0}")]
    QueryExecution(String),
    /// Raw EXPLAIN output could not be parsed as JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// I/O error while reading plan documents.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl PlanError {
    pub(crate) fn missing_field(kind: impl Into<String>, field: &'static str) -> Self {
        PlanError::MissingField {
            kind: kind.into(),
            field,
        }
    }

    /// Returns true for every variant describing a badly formed plan document.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            PlanError::MalformedPlan(_)
                | PlanError::MissingField { .. }
                | PlanError::DepthExceeded { .. }
                | PlanError::TooManyNodes { .. }
        )
    }

    /// Returns a machine-readable code for the error variant.
    pub fn code(&self) -> &'static str {
        match self {
            PlanError::MalformedPlan(_)
            | PlanError::MissingField { .. }
            | PlanError::DepthExceeded { .. }
            | PlanError::TooManyNodes { .. } => "MalformedPlan",
            PlanError::InvalidStrategy { .. } => "InvalidStrategy",
            PlanError::QueryExecution(_) => "QueryExecution",
            PlanError::Json(_) => "Json",
            PlanError::Io(_) => "Io",
        }
    }
}
