//! Current and longest streak computation.
//!
//! Streaks are always recomputed from the whole ledger. A day with no entry
//! breaks a run exactly like a missed day.

use crate::errors::DataError;
use crate::ledger::Ledger;
use crate::models::{CheckInRecord, CheckInStatus, Streaks};
use chrono::{NaiveDate, TimeZone};

pub fn calculate(ledger: &Ledger) -> Streaks {
    Streaks {
        current: current_streak(ledger),
        longest: longest_streak(ledger),
    }
}

/// Streaks straight from wire records. Any malformed record fails the whole
/// computation; callers fall back to zero streaks for that habit.
pub fn calculate_from_records<Tz: TimeZone>(
    records: &[CheckInRecord],
    tz: &Tz,
) -> Result<Streaks, DataError> {
    let ledger = Ledger::from_records(records, tz)?;
    Ok(calculate(&ledger))
}

/// Completed run ending at the most recent entry.
fn current_streak(ledger: &Ledger) -> u32 {
    let mut streak = 0;
    let mut later: Option<NaiveDate> = None;
    for entry in ledger.entries().rev() {
        if entry.status != CheckInStatus::Completed {
            break;
        }
        if let Some(later) = later {
            if !is_next_day(entry.date, later) {
                break;
            }
        }
        streak += 1;
        later = Some(entry.date);
    }
    streak
}

fn longest_streak(ledger: &Ledger) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for entry in ledger.entries() {
        if entry.status != CheckInStatus::Completed {
            run = 0;
            previous = None;
            continue;
        }
        run = match previous {
            Some(previous) if is_next_day(previous, entry.date) => run + 1,
            _ => 1,
        };
        previous = Some(entry.date);
        longest = longest.max(run);
    }
    longest
}

fn is_next_day(earlier: NaiveDate, later: NaiveDate) -> bool {
    earlier.succ_opt() == Some(later)
}
