//! Per-habit check-in ledger and the ingestion boundary for wire dates.
//!
//! Every date entering the core is reduced to a local calendar day here;
//! nothing downstream compares instants.

use crate::errors::DataError;
use crate::models::{CheckIn, CheckInRecord, CheckInStatus, Habit, HabitRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use std::collections::BTreeMap;
use tracing::warn;

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Completed/missed entries keyed by day. A day without an entry is
/// `CheckInStatus::NoRecord`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    entries: BTreeMap<NaiveDate, CheckInStatus>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strict ingestion: the first malformed record fails the whole ledger.
    pub fn from_records<Tz: TimeZone>(records: &[CheckInRecord], tz: &Tz) -> Result<Self, DataError> {
        let mut ledger = Self::new();
        for record in records {
            let (day, status) = normalize_record(record, tz)?;
            ledger.record(day, status);
        }
        Ok(ledger)
    }

    /// Lenient ingestion: malformed records are logged and skipped.
    pub fn from_records_lenient<Tz: TimeZone>(records: &[CheckInRecord], tz: &Tz) -> Self {
        let mut ledger = Self::new();
        for record in records {
            match normalize_record(record, tz) {
                Ok((day, status)) => ledger.record(day, status),
                Err(err) => warn!("skipping check-in: {err}"),
            }
        }
        ledger
    }

    /// Sets the status for `day`, replacing any earlier entry. `NoRecord`
    /// clears the day.
    pub fn record(&mut self, day: NaiveDate, status: CheckInStatus) {
        match status {
            CheckInStatus::NoRecord => {
                self.entries.remove(&day);
            }
            status => {
                self.entries.insert(day, status);
            }
        }
    }

    pub fn status_on(&self, day: NaiveDate) -> CheckInStatus {
        self.entries
            .get(&day)
            .copied()
            .unwrap_or(CheckInStatus::NoRecord)
    }

    /// Entries in ascending date order.
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = CheckIn> + '_ {
        self.entries
            .iter()
            .map(|(&date, &status)| CheckIn::new(date, status))
    }

    /// Entries whose day lies in `start..=end`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = CheckIn> + '_ {
        let range = if start <= end {
            self.entries.range(start..=end)
        } else {
            self.entries.range(start..start)
        };
        range.map(|(&date, &status)| CheckIn::new(date, status))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<CheckIn> for Ledger {
    fn from_iter<I: IntoIterator<Item = CheckIn>>(iter: I) -> Self {
        let mut ledger = Self::new();
        for check_in in iter {
            ledger.record(check_in.date, check_in.status);
        }
        ledger
    }
}

/// Reduces a wire date to a local calendar day.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 datetimes (converted into `tz` first) and
/// naive datetimes, which are read as wall-clock time in `tz`.
pub fn parse_day<Tz: TimeZone>(raw: &str, tz: &Tz) -> Result<NaiveDate, DataError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(tz).date_naive());
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.date())
        .ok_or_else(|| DataError::MalformedDate(raw.to_string()))
}

pub fn normalize_record<Tz: TimeZone>(
    record: &CheckInRecord,
    tz: &Tz,
) -> Result<(NaiveDate, CheckInStatus), DataError> {
    let raw = record.date.as_deref().ok_or(DataError::MissingField("date"))?;
    let day = parse_day(raw, tz)?;
    let status = CheckInStatus::parse(record.status.as_deref())?;
    Ok((day, status))
}

/// Replaces whatever the wire list holds for `day` with `status`.
///
/// Records whose date cannot be parsed are left alone.
pub fn upsert_record<Tz: TimeZone>(
    records: &mut Vec<CheckInRecord>,
    day: NaiveDate,
    status: CheckInStatus,
    tz: &Tz,
) {
    records.retain(|record| match record.date.as_deref() {
        Some(raw) => parse_day(raw, tz).map_or(true, |existing| existing != day),
        None => true,
    });
    if let Some(label) = status.as_wire() {
        records.push(CheckInRecord {
            date: Some(day.format("%Y-%m-%d").to_string()),
            status: Some(label.to_string()),
        });
    }
}

/// Normalizes a fetched collection. Habits that cannot be normalized are
/// logged and left out; the rest keep their input order.
pub fn ingest_habits<Tz: TimeZone>(records: &[HabitRecord], tz: &Tz) -> Vec<Habit> {
    records
        .iter()
        .filter_map(|record| match Habit::from_record(record, tz) {
            Ok(habit) => Some(habit),
            Err(err) => {
                warn!(habit = %record.id, "excluding habit: {err}");
                None
            }
        })
        .collect()
}
