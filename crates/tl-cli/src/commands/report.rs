//! CSV report generation.
//!
//! Writes a `<date>-timeledger.csv` file with a summary section, the
//! day's break reasons, and the full event timeline. Timestamps are
//! rendered in local time; durations as `HH:MM:SS`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, Utc};

use tl_core::{Event, TimeStats, day_stats};
use tl_db::EventStore;

/// Formats non-negative seconds as `HH:MM:SS`. Negative input renders
/// as zero.
#[must_use]
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Renders a UTC instant as local wall-clock time.
#[must_use]
pub fn format_local_time(instant: DateTime<Utc>) -> String {
    instant.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Generates the CSV report for `date` and writes it into `output_dir`.
///
/// Returns the path of the written file.
pub fn run(store: &EventStore, date: NaiveDate, output_dir: &Path) -> Result<PathBuf> {
    let events = store.events_for_date(date)?;
    let stats = day_stats(&events);

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;
    let path = output_dir.join(format!("{date}-timeledger.csv"));

    let body = render_report(date, &stats, &events, Local::now())?;
    std::fs::write(&path, body).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), "report written");
    Ok(path)
}

fn render_report(
    date: NaiveDate,
    stats: &TimeStats,
    events: &[Event],
    generated_at: DateTime<Local>,
) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    // Sections have different widths, so the writer must be flexible.
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(&mut buf);

    writer.write_record(["TimeLedger Daily Report"])?;
    writer.write_record(["Date", &date.to_string()])?;
    writer.write_record([""])?;

    writer.write_record(["=== SUMMARY ==="])?;
    writer.write_record(["Field", "Value"])?;
    writer.write_record([
        "First Start",
        &stats
            .first_start
            .map_or_else(|| "N/A".to_string(), format_local_time),
    ])?;
    writer.write_record([
        "Last End",
        &stats
            .last_end
            .map_or_else(|| "N/A".to_string(), format_local_time),
    ])?;
    writer.write_record(["Total Span", &format_duration(stats.total_span_seconds)])?;
    writer.write_record(["Total Break Time", &format_duration(stats.break_seconds)])?;
    writer.write_record(["Net Work Time", &format_duration(stats.work_seconds)])?;
    writer.write_record(["Number of Breaks", &stats.break_count.to_string()])?;
    writer.write_record([""])?;

    if !stats.break_reasons.is_empty() {
        writer.write_record(["=== BREAK REASONS ==="])?;
        writer.write_record(["Break #", "Reason"])?;
        for (i, reason) in stats.break_reasons.iter().enumerate() {
            writer.write_record([&format!("Break {}", i + 1), reason])?;
        }
        writer.write_record([""])?;
    }

    writer.write_record(["=== EVENT TIMELINE ==="])?;
    writer.write_record(["#", "Time (Local)", "Action", "Reason"])?;
    for (i, event) in events.iter().enumerate() {
        writer.write_record([
            &(i + 1).to_string(),
            &format_local_time(event.timestamp),
            event.action.as_str(),
            event.reason.as_deref().unwrap_or("-"),
        ])?;
    }
    writer.write_record([""])?;

    writer.write_record([
        "Report generated at:",
        &generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    ])?;

    writer.flush()?;
    drop(writer);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, TimeZone};
    use tl_core::Action;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn seeded_store() -> EventStore {
        let mut store = EventStore::open_in_memory().unwrap();
        let base = Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap();
        store
            .append_event(day(), Action::Start, None, base)
            .unwrap();
        store
            .append_event(
                day(),
                Action::Pause,
                Some("lunch"),
                base + Duration::seconds(600),
            )
            .unwrap();
        store
            .append_event(day(), Action::Resume, None, base + Duration::seconds(1200))
            .unwrap();
        store
            .append_event(day(), Action::End, None, base + Duration::seconds(4200))
            .unwrap();
        store
    }

    #[test]
    fn format_duration_is_hh_mm_ss() {
        assert_eq!(format_duration(0), "00:00:00");
        assert_eq!(format_duration(59), "00:00:59");
        assert_eq!(format_duration(3661), "01:01:01");
        assert_eq!(format_duration(-5), "00:00:00");
        assert_eq!(format_duration(36_000), "10:00:00");
    }

    #[test]
    fn report_contains_summary_and_timeline() {
        let store = seeded_store();
        let events = store.events_for_date(day()).unwrap();
        let stats = day_stats(&events);

        let generated_at = Local.with_ymd_and_hms(2025, 3, 10, 18, 0, 0).unwrap();
        let body = render_report(day(), &stats, &events, generated_at).unwrap();
        let body = String::from_utf8(body).unwrap();

        assert!(body.starts_with("TimeLedger Daily Report"));
        assert!(body.contains("Date,2025-03-10"));
        assert!(body.contains("=== SUMMARY ==="));
        // Span 4200s, break 600s, work 3600s.
        assert!(body.contains("Total Span,01:10:00"));
        assert!(body.contains("Total Break Time,00:10:00"));
        assert!(body.contains("Net Work Time,01:00:00"));
        assert!(body.contains("Number of Breaks,1"));
        assert!(body.contains("=== BREAK REASONS ==="));
        assert!(body.contains("Break 1,lunch"));
        assert!(body.contains("=== EVENT TIMELINE ==="));
        assert!(body.contains("START"));
        assert!(body.contains("PAUSE,lunch"));
        assert!(body.contains("Report generated at:,2025-03-10 18:00:00"));
    }

    #[test]
    fn report_for_empty_day_still_renders() {
        let store = EventStore::open_in_memory().unwrap();
        let events = store.events_for_date(day()).unwrap();
        let stats = day_stats(&events);

        let generated_at = Local.with_ymd_and_hms(2025, 3, 10, 18, 0, 0).unwrap();
        let body = render_report(day(), &stats, &events, generated_at).unwrap();
        let body = String::from_utf8(body).unwrap();

        assert!(body.contains("First Start,N/A"));
        assert!(body.contains("Last End,N/A"));
        assert!(body.contains("Number of Breaks,0"));
        assert!(!body.contains("=== BREAK REASONS ==="));
    }

    #[test]
    fn run_writes_the_file_to_disk() {
        let store = seeded_store();
        let temp = tempfile::tempdir().unwrap();

        let path = run(&store, day(), temp.path()).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "2025-03-10-timeledger.csv"
        );
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("TimeLedger Daily Report"));
    }
}
