//! Error types shared across the core.

use thiserror::Error;

use crate::action::Action;
use crate::tracker::TrackerState;

/// Errors surfaced by tracker operations.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The attempted action is not legal in the current state. The
    /// tracker is left untouched.
    #[error("cannot {action} from {state} state")]
    InvalidTransition {
        state: TrackerState,
        action: Action,
    },

    /// A pause was requested without a usable reason. The tracker is
    /// left untouched.
    #[error("pause reason must not be empty")]
    EmptyReason,

    /// The event store failed; the attempted operation did not commit.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// An event store failure, opaque to the core.
///
/// Store implementations wrap their own error types in this so the
/// tracker and aggregation code stay independent of any backend.
#[derive(Debug, Error)]
#[error("event store error: {0}")]
pub struct StorageError(#[source] Box<dyn std::error::Error + Send + Sync>);

impl StorageError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(source.into())
    }
}
