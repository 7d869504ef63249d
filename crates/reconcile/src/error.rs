//! Error types for reconciliation.

use std::fmt;

/// Result type alias for reconciliation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while assigning identities or computing a change set.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The identity generator needs a workspace name to derive its seed.
    #[error("workspace name is required to derive stable identities")]
    MissingWorkspace,

    /// Two or more descriptors resolved to the same identity.
    #[error("duplicate {kind} ids in namespace '{namespace}': {}", .ids.join(", "))]
    DuplicateIds {
        /// Entity kind ("monitor" or "sql test").
        kind: &'static str,
        /// Namespace the descriptors belong to.
        namespace: String,
        /// The colliding identities.
        ids: Vec<String>,
    },

    /// A descriptor could not be turned into its canonical representation.
    #[error("failed to serialize {id}: {source}")]
    Serialize {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Apply stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Create,
    Delete,
    Update,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Delete => write!(f, "delete"),
            Self::Update => write!(f, "update"),
        }
    }
}

/// A batch failed while applying a change set.
///
/// Batches that completed before the failure are not rolled back.
#[derive(Debug, thiserror::Error)]
#[error("{stage} batch failed{}", completed_suffix(.completed))]
pub struct ApplyError {
    /// The stage whose batch failed.
    pub stage: Stage,
    /// Stages that had already been applied.
    pub completed: Vec<Stage>,
    /// Underlying failure.
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

fn completed_suffix(completed: &[Stage]) -> String {
    if completed.is_empty() {
        String::new()
    } else {
        let names: Vec<String> = completed.iter().map(ToString::to_string).collect();
        format!(" after {} succeeded", names.join(", "))
    }
}
