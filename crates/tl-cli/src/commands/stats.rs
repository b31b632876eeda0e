//! Stats command for daily/weekly/monthly work and break totals.

use std::io::Write;

use anyhow::{Result, bail};
use chrono::{DateTime, Local, NaiveDate, Utc};

use tl_core::{EventLog, TimeStats, month_bounds, stats_for_date, stats_for_range, week_bounds};

use super::report::format_duration;

/// What period the stats cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsRange {
    Day(NaiveDate),
    Week,
    Month,
    Between(NaiveDate, NaiveDate),
}

/// Resolves the mutually exclusive period flags into one range.
pub fn select_range(
    week: bool,
    month: bool,
    date: Option<NaiveDate>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<StatsRange> {
    let selectors = usize::from(week)
        + usize::from(month)
        + usize::from(date.is_some())
        + usize::from(from.is_some() || to.is_some());
    if selectors > 1 {
        bail!("choose one of --week, --month, --date, or --from/--to");
    }

    if week {
        return Ok(StatsRange::Week);
    }
    if month {
        return Ok(StatsRange::Month);
    }
    if let Some(date) = date {
        return Ok(StatsRange::Day(date));
    }
    match (from, to) {
        (Some(from), Some(to)) => {
            if to < from {
                bail!("--to must not be before --from");
            }
            Ok(StatsRange::Between(from, to))
        }
        (None, None) => Ok(StatsRange::Day(Local::now().date_naive())),
        _ => bail!("--from and --to must be used together"),
    }
}

pub fn run<W: Write>(
    writer: &mut W,
    log: &impl EventLog,
    range: StatsRange,
    json: bool,
) -> Result<()> {
    let today = Local::now().date_naive();
    let (label, stats) = match range {
        StatsRange::Day(date) => (date.to_string(), stats_for_date(log, date)?),
        StatsRange::Week => {
            let (start, end) = week_bounds(today);
            (format!("{start}..{end}"), stats_for_range(log, start, end)?)
        }
        StatsRange::Month => {
            let (start, end) = month_bounds(today);
            (format!("{start}..{end}"), stats_for_range(log, start, end)?)
        }
        StatsRange::Between(start, end) => {
            (format!("{start}..{end}"), stats_for_range(log, start, end)?)
        }
    };

    if json {
        serde_json::to_writer_pretty(&mut *writer, &stats)?;
        writeln!(writer)?;
        return Ok(());
    }

    write_text(writer, &label, &stats)
}

fn write_text<W: Write>(writer: &mut W, label: &str, stats: &TimeStats) -> Result<()> {
    writeln!(writer, "STATS: {label}")?;
    writeln!(writer, "First start: {}", format_endpoint(stats.first_start))?;
    writeln!(writer, "Last end:    {}", format_endpoint(stats.last_end))?;
    writeln!(
        writer,
        "Total span:  {}",
        format_duration(stats.total_span_seconds)
    )?;
    writeln!(
        writer,
        "Work time:   {}",
        format_duration(stats.work_seconds)
    )?;
    writeln!(
        writer,
        "Break time:  {}",
        format_duration(stats.break_seconds)
    )?;
    writeln!(writer, "Breaks: {}", stats.break_count)?;
    for reason in &stats.break_reasons {
        writeln!(writer, "- {reason}")?;
    }
    Ok(())
}

fn format_endpoint(instant: Option<DateTime<Utc>>) -> String {
    instant.map_or_else(
        || "N/A".to_string(),
        |instant| {
            instant
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, TimeZone};
    use tl_core::Action;
    use tl_db::EventStore;

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
                base + Duration::seconds(100),
            )
            .unwrap();
        store
            .append_event(day(), Action::Resume, None, base + Duration::seconds(700))
            .unwrap();
        store
            .append_event(day(), Action::End, None, base + Duration::seconds(1700))
            .unwrap();
        store
    }

    #[test]
    fn select_range_rejects_conflicting_flags() {
        assert!(select_range(true, true, None, None, None).is_err());
        assert!(select_range(true, false, Some(day()), None, None).is_err());
        assert!(select_range(false, false, None, Some(day()), None).is_err());
        assert!(
            select_range(false, false, None, Some(day()), Some(day().pred_opt().unwrap()))
                .is_err()
        );
    }

    #[test]
    fn select_range_defaults_to_today() {
        let range = select_range(false, false, None, None, None).unwrap();
        assert_eq!(range, StatsRange::Day(Local::now().date_naive()));
    }

    #[test]
    fn text_output_for_a_day() {
        let store = seeded_store();
        let mut output = Vec::new();
        run(&mut output, &store, StatsRange::Day(day()), false).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("STATS: 2025-03-10"));
        assert!(output.contains("Total span:  00:28:20"));
        assert!(output.contains("Work time:   00:18:20"));
        assert!(output.contains("Break time:  00:10:00"));
        assert!(output.contains("Breaks: 1"));
        assert!(output.contains("- lunch"));
    }

    #[test]
    fn json_output_round_trips() {
        let store = seeded_store();
        let mut output = Vec::new();
        run(&mut output, &store, StatsRange::Day(day()), true).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(value["work_seconds"], 1100);
        assert_eq!(value["break_seconds"], 600);
        assert_eq!(value["total_span_seconds"], 1700);
        assert_eq!(value["break_count"], 1);
        assert_eq!(value["break_reasons"][0], "lunch");
    }
}
