//! Error types for qstate kernel operations.

use crate::state::CompositeKind;

/// Error type produced by query methods and evaluators.
///
/// The kernel never inspects these; it only carries them to the caller.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A query method failed.
///
/// The cache of the querier is left as it was when the call started.
#[derive(Debug, thiserror::Error)]
#[error("query failed for querier '{querier}': {source}")]
pub struct QueryError {
    /// Display name of the querier whose method failed.
    pub querier: String,

    /// The error returned by the method, unchanged.
    #[source]
    pub source: BoxError,
}

/// Errors arising from building or inspecting a state tree.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// A disjunction or conjunction was built without children.
    #[error("{kind} requires at least one child state")]
    EmptyComposite { kind: CompositeKind },

    /// A querier reachable from the inspected state failed to fetch.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// An evaluator rejected the raw value produced by its querier.
    #[error("evaluator failed for state '{state}': {source}")]
    Evaluation {
        state: String,
        #[source]
        source: BoxError,
    },
}

impl StateError {
    /// Whether this error was raised while building a tree rather than
    /// while inspecting one.
    pub fn is_construction(&self) -> bool {
        matches!(self, Self::EmptyComposite { .. })
    }
}
