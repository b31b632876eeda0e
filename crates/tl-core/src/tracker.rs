//! The work-session state machine.
//!
//! A [`WorkTracker`] is an in-memory projection of the event log for one
//! calendar day. It is rebuilt by replaying today's events at startup and
//! mutated only through the four transition operations, each of which
//! appends exactly one event before committing the in-memory update. A
//! failed append leaves the tracker in its pre-transition state.

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::action::Action;
use crate::error::TrackerError;
use crate::event::EventId;
use crate::log::EventLog;

/// Where the tracker currently is in the day's lifecycle.
///
/// `Ended` is terminal for the day; only a date rollover (or an explicit
/// [`WorkTracker::reset_state`]) leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Idle,
    Working,
    Paused,
    Ended,
}

impl TrackerState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Working => "working",
            Self::Paused => "paused",
            Self::Ended => "ended",
        }
    }
}

impl fmt::Display for TrackerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// In-memory session state derived from the event log.
///
/// The store handle is injected at construction; the tracker owns it for
/// the lifetime of the session and appends one event per transition.
#[derive(Debug)]
pub struct WorkTracker<S> {
    store: S,
    state: TrackerState,
    current_date: NaiveDate,
    work_start_time: Option<DateTime<Utc>>,
    work_end_time: Option<DateTime<Utc>>,
    pause_start_time: Option<DateTime<Utc>>,
    interval_start_time: Option<DateTime<Utc>>,
    total_break_seconds: i64,
    break_reasons: Vec<String>,
}

impl<S: EventLog> WorkTracker<S> {
    /// Builds a tracker for today by replaying today's events.
    pub fn restore(store: S) -> Result<Self, TrackerError> {
        Self::restore_at(store, Local::now().date_naive())
    }

    fn restore_at(store: S, today: NaiveDate) -> Result<Self, TrackerError> {
        let mut tracker = Self {
            store,
            state: TrackerState::Idle,
            current_date: today,
            work_start_time: None,
            work_end_time: None,
            pause_start_time: None,
            interval_start_time: None,
            total_break_seconds: 0,
            break_reasons: Vec::new(),
        };
        tracker.restore_state_at(today)?;
        Ok(tracker)
    }

    /// Re-derives the in-memory state from the log.
    ///
    /// If the remembered date no longer equals today, the tracker resets
    /// to a fresh idle state for the new day without replaying anything.
    /// Otherwise today's events are replayed in order; the result is
    /// identical no matter how many times this runs.
    pub fn restore_state(&mut self) -> Result<(), TrackerError> {
        self.restore_state_at(Local::now().date_naive())
    }

    fn restore_state_at(&mut self, today: NaiveDate) -> Result<(), TrackerError> {
        if self.current_date != today {
            tracing::debug!(
                previous = %self.current_date,
                today = %today,
                "date rolled over, resetting tracker"
            );
            self.reset_state();
            self.current_date = today;
            return Ok(());
        }

        let events = self.store.events_for_date(today)?;
        self.reset_state();
        for event in events {
            let ts = event.timestamp;
            match event.action {
                Action::Start => {
                    self.work_start_time = Some(ts);
                    self.state = TrackerState::Working;
                }
                Action::Pause => {
                    self.pause_start_time = Some(ts);
                    self.state = TrackerState::Paused;
                    self.break_reasons.push(event.reason_or_placeholder());
                }
                Action::Resume => {
                    if let Some(paused_at) = self.pause_start_time.take() {
                        self.total_break_seconds +=
                            ts.signed_duration_since(paused_at).num_seconds();
                    }
                    self.state = TrackerState::Working;
                    self.interval_start_time = Some(ts);
                }
                Action::End => {
                    if let Some(paused_at) = self.pause_start_time.take() {
                        self.total_break_seconds +=
                            ts.signed_duration_since(paused_at).num_seconds();
                    }
                    self.state = TrackerState::Ended;
                    self.work_end_time = Some(ts);
                    self.interval_start_time = None;
                }
            }
        }
        tracing::debug!(state = %self.state, date = %today, "tracker state restored");
        Ok(())
    }

    /// Starts a new work session for today.
    pub fn start_work(&mut self) -> Result<EventId, TrackerError> {
        self.start_work_on(Local::now().date_naive(), Utc::now())
    }

    fn start_work_on(
        &mut self,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<EventId, TrackerError> {
        if self.state != TrackerState::Idle {
            return Err(self.invalid(Action::Start));
        }

        let id = self.store.append(date, Action::Start, None, now)?;
        self.current_date = date;
        self.state = TrackerState::Working;
        self.work_start_time = Some(now);
        self.interval_start_time = Some(now);
        self.work_end_time = None;
        tracing::debug!(date = %date, "work started");
        Ok(id)
    }

    /// Pauses work with a reason. The reason is trimmed and must be
    /// non-empty.
    pub fn pause_work(&mut self, reason: &str) -> Result<EventId, TrackerError> {
        self.pause_work_at(reason, Utc::now())
    }

    fn pause_work_at(&mut self, reason: &str, now: DateTime<Utc>) -> Result<EventId, TrackerError> {
        if self.state != TrackerState::Working {
            return Err(self.invalid(Action::Pause));
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(TrackerError::EmptyReason);
        }

        let id = self
            .store
            .append(self.current_date, Action::Pause, Some(reason), now)?;
        self.state = TrackerState::Paused;
        self.pause_start_time = Some(now);
        self.interval_start_time = None;
        self.break_reasons.push(reason.to_string());
        tracing::debug!(reason, "work paused");
        Ok(id)
    }

    /// Resumes work after a pause, folding the completed break into the
    /// day's break total.
    pub fn resume_work(&mut self) -> Result<EventId, TrackerError> {
        self.resume_work_at(Utc::now())
    }

    fn resume_work_at(&mut self, now: DateTime<Utc>) -> Result<EventId, TrackerError> {
        if self.state != TrackerState::Paused {
            return Err(self.invalid(Action::Resume));
        }

        let id = self
            .store
            .append(self.current_date, Action::Resume, None, now)?;
        if let Some(paused_at) = self.pause_start_time.take() {
            self.total_break_seconds += now.signed_duration_since(paused_at).num_seconds();
        }
        self.state = TrackerState::Working;
        self.interval_start_time = Some(now);
        tracing::debug!(break_seconds = self.total_break_seconds, "work resumed");
        Ok(id)
    }

    /// Ends the day. If currently paused, the in-progress break is folded
    /// into the break total as part of the same committed step.
    pub fn end_day(&mut self) -> Result<EventId, TrackerError> {
        self.end_day_at(Utc::now())
    }

    fn end_day_at(&mut self, now: DateTime<Utc>) -> Result<EventId, TrackerError> {
        if !matches!(self.state, TrackerState::Working | TrackerState::Paused) {
            return Err(self.invalid(Action::End));
        }

        let id = self.store.append(self.current_date, Action::End, None, now)?;
        if let Some(paused_at) = self.pause_start_time.take() {
            self.total_break_seconds += now.signed_duration_since(paused_at).num_seconds();
        }
        self.state = TrackerState::Ended;
        self.work_end_time = Some(now);
        self.interval_start_time = None;
        tracing::debug!(date = %self.current_date, "day ended");
        Ok(id)
    }

    const fn invalid(&self, action: Action) -> TrackerError {
        TrackerError::InvalidTransition {
            state: self.state,
            action,
        }
    }

    /// Net work time in seconds: span so far minus completed breaks,
    /// minus the in-progress break when paused. Clamped to zero.
    pub fn elapsed_work_time(&self) -> i64 {
        self.elapsed_work_time_at(Utc::now())
    }

    fn elapsed_work_time_at(&self, now: DateTime<Utc>) -> i64 {
        if self.state == TrackerState::Idle {
            return 0;
        }
        let Some(start) = self.work_start_time else {
            return 0;
        };
        let end = match (self.state, self.work_end_time) {
            (TrackerState::Ended, Some(work_end)) => work_end,
            _ => now,
        };

        let mut work = end.signed_duration_since(start).num_seconds() - self.total_break_seconds;
        if self.state == TrackerState::Paused {
            if let Some(paused_at) = self.pause_start_time {
                work -= end.signed_duration_since(paused_at).num_seconds();
            }
        }
        work.max(0)
    }

    /// Seconds spent in the current uninterrupted work interval, zero
    /// unless actively working.
    pub fn current_session_time(&self) -> i64 {
        self.current_session_time_at(Utc::now())
    }

    fn current_session_time_at(&self, now: DateTime<Utc>) -> i64 {
        match (self.state, self.interval_start_time) {
            (TrackerState::Working, Some(interval_start)) => now
                .signed_duration_since(interval_start)
                .num_seconds()
                .max(0),
            _ => 0,
        }
    }

    /// Forces the in-memory state back to idle without touching the log.
    /// Used when the user declines to resume a restored session.
    pub fn reset_state(&mut self) {
        self.state = TrackerState::Idle;
        self.work_start_time = None;
        self.work_end_time = None;
        self.pause_start_time = None;
        self.interval_start_time = None;
        self.total_break_seconds = 0;
        self.break_reasons.clear();
    }

    pub const fn state(&self) -> TrackerState {
        self.state
    }

    pub const fn current_date(&self) -> NaiveDate {
        self.current_date
    }

    pub const fn total_break_seconds(&self) -> i64 {
        self.total_break_seconds
    }

    pub fn break_reasons(&self) -> &[String] {
        &self.break_reasons
    }

    pub const fn can_start(&self) -> bool {
        matches!(self.state, TrackerState::Idle)
    }

    pub const fn can_pause(&self) -> bool {
        matches!(self.state, TrackerState::Working)
    }

    pub const fn can_resume(&self) -> bool {
        matches!(self.state, TrackerState::Paused)
    }

    pub const fn can_end(&self) -> bool {
        matches!(self.state, TrackerState::Working | TrackerState::Paused)
    }

    /// Whether a restored session is still open (working or paused).
    pub const fn has_active_session(&self) -> bool {
        matches!(self.state, TrackerState::Working | TrackerState::Paused)
    }

    /// Human-readable label for presentation layers.
    #[must_use]
    pub const fn status_text(&self) -> &'static str {
        match self.state {
            TrackerState::Idle => "Ready to Start",
            TrackerState::Working => "Working",
            TrackerState::Paused => "On Break",
            TrackerState::Ended => "Day Ended",
        }
    }

    #[cfg(test)]
    fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}
