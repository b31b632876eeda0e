//! Immutable work-day events and their identifiers.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::action::Action;

/// Label used when a pause event is missing its reason.
pub(crate) const MISSING_REASON: &str = "unspecified";

/// Validation errors for event fields.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
}

/// A validated event identifier.
///
/// Event IDs must be non-empty strings. Uniqueness is enforced by the
/// event store, not here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventId(String);

impl EventId {
    /// Creates a new ID after validation.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::Empty { field: "event ID" });
        }
        Ok(Self(id))
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EventId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EventId> for String {
    fn from(id: EventId) -> Self {
        id.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EventId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An append-only record of a state-changing action.
///
/// Events are never edited in place; corrections are new events. The
/// `date` is the local calendar bucket the event belongs to, while
/// `timestamp` is the UTC instant of occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier, assigned by the store.
    pub id: EventId,
    /// The calendar day this event is bucketed under.
    pub date: NaiveDate,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The recorded action.
    pub action: Action,
    /// Break reason; present only on pause events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Event {
    /// The break reason, falling back to a placeholder for malformed
    /// pause events.
    pub(crate) fn reason_or_placeholder(&self) -> String {
        self.reason
            .clone()
            .unwrap_or_else(|| MISSING_REASON.to_string())
    }
}
