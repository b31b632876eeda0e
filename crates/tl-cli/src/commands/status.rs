//! Status command for showing the current session state and timers.

use std::io::Write;

use anyhow::Result;

use tl_core::WorkTracker;
use tl_db::EventStore;

use super::report::format_duration;

pub fn run<W: Write>(writer: &mut W, store: EventStore) -> Result<()> {
    let tracker = WorkTracker::restore(store)?;

    writeln!(writer, "Status: {}", tracker.status_text())?;
    writeln!(writer, "Date: {}", tracker.current_date())?;
    writeln!(
        writer,
        "Work time: {}",
        format_duration(tracker.elapsed_work_time())
    )?;
    writeln!(
        writer,
        "Current interval: {}",
        format_duration(tracker.current_session_time())
    )?;
    writeln!(
        writer,
        "Break time: {}",
        format_duration(tracker.total_break_seconds())
    )?;

    let reasons = tracker.break_reasons();
    writeln!(writer, "Breaks: {}", reasons.len())?;
    for reason in reasons {
        writeln!(writer, "- {reason}")?;
    }

    Ok(())
}
