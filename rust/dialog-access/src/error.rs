//! Error types for the rule engine

use thiserror::Error;

/// Errors raised while checking or compiling permission rules.
///
/// The first three variants are configuration errors: a rule was declared in
/// a way that cannot be honored in the requested mode. None of them are
/// transient, so callers should surface them rather than retry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AccessError {
    /// An instance check reached a rule whose condition can only be decided
    /// by a store, and the rule has no fallback block.
    #[error(
        "Cannot check {action:?} on {subject:?} against a single instance: the rule uses a {kind} condition without a block"
    )]
    UnevaluableCondition {
        /// Action the rule was declared for.
        action: String,
        /// Subject type the rule was declared for.
        subject: String,
        /// Kind of condition that could not be evaluated.
        kind: &'static str,
    },

    /// A scope was combined with other conditions for the same query.
    #[error(
        "Unable to merge a scope with other conditions for {action:?} on {subject:?}; use hash conditions or fragments instead"
    )]
    ScopeMerge {
        /// Requested action.
        action: String,
        /// Requested subject type.
        subject: String,
    },

    /// Query conditions were requested but the relevant rules are only
    /// expressible as blocks.
    #[error(
        "Cannot build query conditions for {action:?} on {subject:?}: a rule is declared with a block only"
    )]
    BlockOnly {
        /// Requested action.
        action: String,
        /// Requested subject type.
        subject: String,
    },

    /// The actor is not permitted to perform the action.
    #[error("{message}")]
    AccessDenied {
        /// Requested action.
        action: String,
        /// Subject type of the target.
        subject: String,
        /// Human readable message.
        message: String,
    },

    /// An object looked up for authorization does not exist.
    #[error("No {subject:?} found with id {id}")]
    NotFound {
        /// Subject type that was searched.
        subject: String,
        /// Identifier that was searched for.
        id: String,
    },

    /// A store binding failed to translate or execute a condition tree.
    #[error("Store error: {message}")]
    Store {
        /// Description of the failure.
        message: String,
    },

    /// Settings could not be loaded or are inconsistent.
    #[error("Invalid settings: {message}")]
    Settings {
        /// Description of the problem.
        message: String,
    },
}

impl AccessError {
    /// Create a store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create a settings error
    pub fn settings(message: impl Into<String>) -> Self {
        Self::Settings {
            message: message.into(),
        }
    }
}

/// Result type for rule engine operations
pub type AccessResult<T> = Result<T, AccessError>;

impl From<serde_json::Error> for AccessError {
    fn from(err: serde_json::Error) -> Self {
        Self::Settings {
            message: err.to_string(),
        }
    }
}
