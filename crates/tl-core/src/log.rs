//! The append-only event log contract the core depends on.

use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::action::Action;
use crate::error::StorageError;
use crate::event::{Event, EventId};

/// Append-only storage of work-day events.
///
/// The log is the sole source of truth: the tracker is a projection of
/// it and can be rebuilt at any time. Implementations must never expose
/// update or delete, and every fetch must return events in
/// chronological order (date, then timestamp, then insertion order).
pub trait EventLog {
    /// Durably stores one event and returns its identifier.
    fn append(
        &mut self,
        date: NaiveDate,
        action: Action,
        reason: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> Result<EventId, StorageError>;

    /// All events bucketed under `date`, in chronological order.
    fn events_for_date(&self, date: NaiveDate) -> Result<Vec<Event>, StorageError>;

    /// All events whose date falls within `[start, end]`, ordered by
    /// date then timestamp.
    fn events_for_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Event>, StorageError>;

    /// Convenience fetch for the local calendar day.
    fn events_for_today(&self) -> Result<Vec<Event>, StorageError> {
        self.events_for_date(Local::now().date_naive())
    }
}
