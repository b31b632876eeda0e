//! Transition commands: start, pause, resume, end.
//!
//! Each command restores the tracker from the store, runs exactly one
//! transition, and prints a confirmation. Illegal transitions surface as
//! errors without touching the log.

use anyhow::Result;

use tl_core::WorkTracker;
use tl_db::EventStore;

use super::report::format_duration;

pub fn start(store: EventStore) -> Result<()> {
    let mut tracker = WorkTracker::restore(store)?;
    let id = tracker.start_work()?;
    tracing::debug!(%id, "start event appended");
    println!("Work started for {}.", tracker.current_date());
    Ok(())
}

pub fn pause(store: EventStore, reason: &str) -> Result<()> {
    let mut tracker = WorkTracker::restore(store)?;
    let id = tracker.pause_work(reason)?;
    tracing::debug!(%id, "pause event appended");
    println!(
        "On break ({}). Work so far: {}",
        reason.trim(),
        format_duration(tracker.elapsed_work_time())
    );
    Ok(())
}

pub fn resume(store: EventStore) -> Result<()> {
    let mut tracker = WorkTracker::restore(store)?;
    let id = tracker.resume_work()?;
    tracing::debug!(%id, "resume event appended");
    println!(
        "Back to work. Break time today: {}",
        format_duration(tracker.total_break_seconds())
    );
    Ok(())
}

pub fn end(store: EventStore) -> Result<()> {
    let mut tracker = WorkTracker::restore(store)?;
    let id = tracker.end_day()?;
    tracing::debug!(%id, "end event appended");
    println!(
        "Day ended. Net work time: {}",
        format_duration(tracker.elapsed_work_time())
    );
    Ok(())
}
