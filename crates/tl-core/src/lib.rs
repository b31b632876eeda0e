//! Core domain logic for the work-time ledger.
//!
//! This crate contains the fundamental types and logic for:
//! - Events: immutable, append-only records of work-day actions
//! - Tracker: the in-memory session state machine rebuilt from the log
//! - Stats: pure aggregation of events into daily/weekly/monthly totals
//!
//! Persistence lives behind the [`EventLog`] trait; the SQLite-backed
//! implementation is in the `tl-db` crate.

pub mod action;
pub mod error;
pub mod event;
pub mod log;
pub mod stats;
pub mod tracker;

pub use action::{Action, UnknownAction};
pub use error::{StorageError, TrackerError};
pub use event::{Event, EventId, ValidationError};
pub use log::EventLog;
pub use stats::{
    TimeStats, day_stats, month_bounds, monthly_stats, stats_for_date, stats_for_range,
    week_bounds, weekly_stats,
};
pub use tracker::{TrackerState, WorkTracker};
