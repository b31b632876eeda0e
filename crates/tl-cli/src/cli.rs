//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Single-user work-time ledger.
///
/// Records clock-in/pause/resume/clock-out events in an append-only log
/// and derives daily, weekly, and monthly work and break totals from it.
#[derive(Debug, Parser)]
#[command(name = "tl", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start a new work session for today.
    Start,

    /// Pause the current session for a break.
    Pause {
        /// Why the break is being taken.
        #[arg(long)]
        reason: String,
    },

    /// Resume work after a break.
    Resume,

    /// End the work day. No further transitions are possible today.
    End,

    /// Show the current session state and timers.
    Status,

    /// Show work/break totals for a day, week, month, or date range.
    Stats {
        /// Current ISO week (Monday through Sunday).
        #[arg(long)]
        week: bool,

        /// Current calendar month.
        #[arg(long)]
        month: bool,

        /// A specific date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Range start (YYYY-MM-DD); requires --to.
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Range end (YYYY-MM-DD); requires --from.
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Write a CSV report for a date.
    Report {
        /// The date to report on (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Directory to write the report into. Defaults to the
        /// configured report directory.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}
