//! Pure read-side aggregation over ordered event sequences.
//!
//! Nothing here mutates the log or the tracker; every function is a pure
//! projection of fetched events, so repeated calls on an unchanged log
//! always yield identical results.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use serde::Serialize;

use crate::action::Action;
use crate::error::StorageError;
use crate::event::Event;
use crate::log::EventLog;

/// Work/break summary for a date or date range. Computed on demand,
/// never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimeStats {
    pub total_span_seconds: i64,
    pub break_seconds: i64,
    pub work_seconds: i64,
    pub break_count: usize,
    pub break_reasons: Vec<String>,
    pub first_start: Option<DateTime<Utc>>,
    pub last_end: Option<DateTime<Utc>>,
}

/// Replays one day's ordered events into a summary.
///
/// A pause that the day ends on (END while on break) is folded into the
/// break total; a pause with no matching RESUME or END contributes
/// nothing. Negative intermediate durations from clock skew are carried
/// through and clamped only in the final work-time computation.
#[must_use]
pub fn day_stats(events: &[Event]) -> TimeStats {
    if events.is_empty() {
        return TimeStats::default();
    }

    let mut stats = TimeStats::default();
    let mut pending_pause: Option<DateTime<Utc>> = None;

    for event in events {
        let ts = event.timestamp;
        match event.action {
            Action::Start => {
                stats.first_start = Some(ts);
            }
            Action::Pause => {
                pending_pause = Some(ts);
                stats.break_count += 1;
                stats.break_reasons.push(event.reason_or_placeholder());
            }
            Action::Resume => {
                if let Some(paused_at) = pending_pause.take() {
                    stats.break_seconds += ts.signed_duration_since(paused_at).num_seconds();
                }
            }
            Action::End => {
                stats.last_end = Some(ts);
                if let Some(paused_at) = pending_pause.take() {
                    stats.break_seconds += ts.signed_duration_since(paused_at).num_seconds();
                }
            }
        }
    }

    if let (Some(first), Some(last)) = (stats.first_start, stats.last_end) {
        stats.total_span_seconds = last.signed_duration_since(first).num_seconds();
    }
    stats.work_seconds = (stats.total_span_seconds - stats.break_seconds).max(0);
    stats
}

/// Summary for a single date, fetched from the log.
pub fn stats_for_date(log: &impl EventLog, date: NaiveDate) -> Result<TimeStats, StorageError> {
    let events = log.events_for_date(date)?;
    Ok(day_stats(&events))
}

/// Aggregate summary over `[start, end]`.
///
/// Each date bucket is replayed independently, then work, break, and
/// break counts are summed and reasons concatenated in date order.
/// `total_span_seconds` for a range is work + break, not the wall-clock
/// distance between the extremes; the earliest start and latest end are
/// still reported for display.
pub fn stats_for_range(
    log: &impl EventLog,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<TimeStats, StorageError> {
    let events = log.events_for_range(start, end)?;

    let mut by_date: BTreeMap<NaiveDate, Vec<Event>> = BTreeMap::new();
    for event in events {
        by_date.entry(event.date).or_default().push(event);
    }

    let mut total = TimeStats::default();
    for bucket in by_date.values() {
        let day = day_stats(bucket);
        total.work_seconds += day.work_seconds;
        total.break_seconds += day.break_seconds;
        total.break_count += day.break_count;
        total.break_reasons.extend(day.break_reasons);

        total.first_start = match (total.first_start, day.first_start) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        total.last_end = match (total.last_end, day.last_end) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }
    total.total_span_seconds = total.work_seconds + total.break_seconds;
    Ok(total)
}

/// Summary for the current ISO week (Monday through Sunday).
pub fn weekly_stats(log: &impl EventLog) -> Result<TimeStats, StorageError> {
    let (start, end) = week_bounds(Local::now().date_naive());
    stats_for_range(log, start, end)
}

/// Summary for the current calendar month.
pub fn monthly_stats(log: &impl EventLog) -> Result<TimeStats, StorageError> {
    let (start, end) = month_bounds(Local::now().date_naive());
    stats_for_range(log, start, end)
}

/// Monday and Sunday of the week containing `today`.
#[must_use]
pub fn week_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let days_since_monday = i64::from(today.weekday().num_days_from_monday());
    let monday = today - chrono::Duration::days(days_since_monday);
    let sunday = monday + chrono::Duration::days(6);
    (monday, sunday)
}

/// First and last day of the month containing `today`.
#[must_use]
pub fn month_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = today.with_day(1).unwrap_or(today);
    let next_month = if today.month() == 12 {
        NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
    };
    let last = next_month
        .and_then(|d| d.pred_opt())
        .unwrap_or(first);
    (first, last)
}
