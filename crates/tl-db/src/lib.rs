//! SQLite-backed append-only event store.
//!
//! Implements the `tl-core` [`EventLog`] contract on top of `rusqlite`.
//!
//! # Thread Safety
//!
//! [`EventStore`] wraps a `rusqlite::Connection`, which is `Send` but not
//! `Sync`: an instance can be moved between threads but not shared
//! without external synchronization. The tracker is single-instance per
//! process, so no internal locking is done here.
//!
//! # Schema
//!
//! Timestamps are stored as TEXT in RFC 3339 format (e.g.
//! `2024-01-15T10:30:00.000Z`) so lexicographic ordering matches
//! chronological ordering and values stay human-readable. Dates are TEXT
//! `YYYY-MM-DD` local-calendar buckets.
//!
//! The `events` table is append-only by construction: `BEFORE UPDATE`
//! and `BEFORE DELETE` triggers abort any mutation, so corrections have
//! to be recorded as new events.

use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, params};
use thiserror::Error;
use uuid::Uuid;

use tl_core::{Action, Event, EventId, EventLog, StorageError};

/// Event source tag written with every row.
const SOURCE: &str = "timeledger";

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An error from the underlying database, including the append-only
    /// trigger aborts.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored event timestamp.
    #[error("invalid timestamp for event {event_id}: {timestamp}")]
    TimestampParse {
        event_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// Failed to parse a stored event date.
    #[error("invalid date for event {event_id}: {date}")]
    DateParse {
        event_id: String,
        date: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored row violates the event model (unknown action, empty id).
    #[error("invalid event row {event_id}: {message}")]
    InvalidRow { event_id: String, message: String },
}

impl From<StoreError> for StorageError {
    fn from(err: StoreError) -> Self {
        Self::new(err)
    }
}

/// Append-only event store.
///
/// See the [module documentation](self) for schema and thread safety
/// notes.
pub struct EventStore {
    conn: Connection,
}

impl EventStore {
    /// Opens a store at the given path, creating it if necessary.
    ///
    /// The schema is initialized on first open; reopening is a no-op.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init()?;
        tracing::debug!(path = %path.display(), "event store opened");
        Ok(store)
    }

    /// Opens an in-memory store.
    ///
    /// Useful for testing. The store is destroyed when the connection
    /// closes.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    fn init(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "
            -- Events table: the sole source of truth for session state.
            -- date: local calendar bucket ('YYYY-MM-DD')
            -- timestamp: UTC instant, RFC 3339 text
            -- action: START | PAUSE | RESUME | END
            -- reason: free text, present only on PAUSE rows
            CREATE TABLE IF NOT EXISTS events (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                action TEXT NOT NULL,
                reason TEXT,
                source TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_events_date ON events(date);
            CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events(timestamp);

            CREATE TRIGGER IF NOT EXISTS events_no_update
            BEFORE UPDATE ON events
            BEGIN
                SELECT RAISE(ABORT, 'events are append-only');
            END;

            CREATE TRIGGER IF NOT EXISTS events_no_delete
            BEFORE DELETE ON events
            BEGIN
                SELECT RAISE(ABORT, 'events are append-only');
            END;
            ",
        )?;
        Ok(())
    }

    /// Durably stores one event and returns its generated id.
    pub fn append_event(
        &mut self,
        date: NaiveDate,
        action: Action,
        reason: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> Result<EventId, StoreError> {
        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            "
            INSERT INTO events (id, date, timestamp, action, reason, source)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
            params![
                id,
                date.to_string(),
                format_timestamp(timestamp),
                action.as_str(),
                reason,
                SOURCE,
            ],
        )?;
        tracing::debug!(%action, date = %date, "event appended");
        EventId::new(id.clone()).map_err(|err| StoreError::InvalidRow {
            event_id: id,
            message: err.to_string(),
        })
    }

    /// All events bucketed under `date`, in insertion order.
    pub fn events_for_date(&self, date: NaiveDate) -> Result<Vec<Event>, StoreError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, date, timestamp, action, reason
            FROM events
            WHERE date = ?
            ORDER BY timestamp ASC, rowid ASC
            ",
        )?;
        let rows = stmt.query_map([date.to_string()], row_to_raw)?;
        collect_events(rows)
    }

    /// All events whose date falls within `[start, end]`, ordered by
    /// date then timestamp.
    pub fn events_for_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Event>, StoreError> {
        if end < start {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(
            "
            SELECT id, date, timestamp, action, reason
            FROM events
            WHERE date >= ? AND date <= ?
            ORDER BY date ASC, timestamp ASC, rowid ASC
            ",
        )?;
        let rows = stmt.query_map([start.to_string(), end.to_string()], row_to_raw)?;
        collect_events(rows)
    }
}

impl EventLog for EventStore {
    fn append(
        &mut self,
        date: NaiveDate,
        action: Action,
        reason: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> Result<EventId, StorageError> {
        Ok(self.append_event(date, action, reason, timestamp)?)
    }

    fn events_for_date(&self, date: NaiveDate) -> Result<Vec<Event>, StorageError> {
        Ok(Self::events_for_date(self, date)?)
    }

    fn events_for_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Event>, StorageError> {
        Ok(Self::events_for_range(self, start, end)?)
    }
}

/// Raw row before chrono/action parsing.
struct RawEvent {
    id: String,
    date: String,
    timestamp: String,
    action: String,
    reason: Option<String>,
}

fn row_to_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEvent> {
    Ok(RawEvent {
        id: row.get(0)?,
        date: row.get(1)?,
        timestamp: row.get(2)?,
        action: row.get(3)?,
        reason: row.get(4)?,
    })
}

fn collect_events<I>(rows: I) -> Result<Vec<Event>, StoreError>
where
    I: Iterator<Item = rusqlite::Result<RawEvent>>,
{
    let mut events = Vec::new();
    for row in rows {
        events.push(raw_to_event(row?)?);
    }
    Ok(events)
}

fn raw_to_event(raw: RawEvent) -> Result<Event, StoreError> {
    let timestamp = parse_timestamp(&raw.timestamp, &raw.id)?;
    let date = NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d").map_err(|source| {
        StoreError::DateParse {
            event_id: raw.id.clone(),
            date: raw.date.clone(),
            source,
        }
    })?;
    let action: Action = raw.action.parse().map_err(|err: tl_core::UnknownAction| {
        StoreError::InvalidRow {
            event_id: raw.id.clone(),
            message: err.to_string(),
        }
    })?;
    let id = EventId::new(raw.id.clone()).map_err(|err| StoreError::InvalidRow {
        event_id: raw.id,
        message: err.to_string(),
    })?;
    Ok(Event {
        id,
        date,
        timestamp,
        action,
        reason: raw.reason,
    })
}

fn parse_timestamp(timestamp: &str, event_id: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| StoreError::TimestampParse {
            event_id: event_id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn instant(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap() + chrono::Duration::seconds(secs)
    }

    #[test]
    fn open_in_memory_store() {
        let store = EventStore::open_in_memory();
        assert!(store.is_ok());
    }

    #[test]
    fn open_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("tl.db");
        {
            let mut store = EventStore::open(&path).unwrap();
            store
                .append_event(day(), Action::Start, None, instant(0))
                .unwrap();
        }
        let store = EventStore::open(&path).unwrap();
        assert_eq!(store.events_for_date(day()).unwrap().len(), 1);
    }

    #[test]
    fn schema_matches_data_model() {
        let store = EventStore::open_in_memory().unwrap();
        let mut stmt = store.conn.prepare("PRAGMA table_info(events)").unwrap();
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .unwrap()
            .map(|row| row.unwrap())
            .collect();
        assert_eq!(
            columns,
            vec!["id", "date", "timestamp", "action", "reason", "source"]
        );
    }

    #[test]
    fn append_then_fetch_roundtrip() {
        let mut store = EventStore::open_in_memory().unwrap();
        let id = store
            .append_event(day(), Action::Pause, Some("lunch"), instant(100))
            .unwrap();

        let events = store.events_for_date(day()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, id);
        assert_eq!(events[0].date, day());
        assert_eq!(events[0].timestamp, instant(100));
        assert_eq!(events[0].action, Action::Pause);
        assert_eq!(events[0].reason.as_deref(), Some("lunch"));
    }

    #[test]
    fn events_come_back_in_chronological_order() {
        let mut store = EventStore::open_in_memory().unwrap();
        store
            .append_event(day(), Action::Resume, None, instant(700))
            .unwrap();
        store
            .append_event(day(), Action::Start, None, instant(0))
            .unwrap();
        store
            .append_event(day(), Action::Pause, Some("lunch"), instant(100))
            .unwrap();

        let events = store.events_for_date(day()).unwrap();
        let actions: Vec<Action> = events.iter().map(|event| event.action).collect();
        assert_eq!(actions, vec![Action::Start, Action::Pause, Action::Resume]);
    }

    #[test]
    fn range_query_is_inclusive_and_date_ordered() {
        let mut store = EventStore::open_in_memory().unwrap();
        let day_two = day().succ_opt().unwrap();
        let day_three = day_two.succ_opt().unwrap();

        store
            .append_event(day_three, Action::Start, None, instant(200))
            .unwrap();
        store
            .append_event(day(), Action::Start, None, instant(0))
            .unwrap();
        store
            .append_event(day_two, Action::Start, None, instant(100))
            .unwrap();

        let events = store.events_for_range(day(), day_two).unwrap();
        let dates: Vec<NaiveDate> = events.iter().map(|event| event.date).collect();
        assert_eq!(dates, vec![day(), day_two]);

        let all = store.events_for_range(day(), day_three).unwrap();
        assert_eq!(all.len(), 3);

        let inverted = store.events_for_range(day_three, day()).unwrap();
        assert!(inverted.is_empty());
    }

    #[test]
    fn updates_and_deletes_are_rejected() {
        let mut store = EventStore::open_in_memory().unwrap();
        store
            .append_event(day(), Action::Start, None, instant(0))
            .unwrap();

        let update = store
            .conn
            .execute("UPDATE events SET action = 'END'", []);
        assert!(update.is_err());

        let delete = store.conn.execute("DELETE FROM events", []);
        assert!(delete.is_err());

        // The row survives untouched.
        let events = store.events_for_date(day()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, Action::Start);
    }

    #[test]
    fn event_log_trait_is_usable_through_the_seam() {
        fn append_start(log: &mut impl EventLog, date: NaiveDate) -> EventId {
            log.append(date, Action::Start, None, instant(0)).unwrap()
        }

        let mut store = EventStore::open_in_memory().unwrap();
        let id = append_start(&mut store, day());
        let events = EventLog::events_for_date(&store, day()).unwrap();
        assert_eq!(events[0].id, id);
    }
}
