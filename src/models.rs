use crate::analytics::TimeRange;
use crate::calendar::ViewMode;
use crate::dashboard::DashboardTab;
use crate::errors::DataError;
use crate::ledger::{self, Ledger};
use crate::streaks;
use chrono::{Datelike, NaiveDate, TimeZone, Weekday};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Day status of a single habit. `NoRecord` covers wire `null`, `"unmarked"`
/// and a missing key alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckInStatus {
    Completed,
    Missed,
    #[serde(rename = "unmarked")]
    NoRecord,
}

impl CheckInStatus {
    pub fn parse(raw: Option<&str>) -> Result<Self, DataError> {
        match raw.map(str::trim) {
            None | Some("") | Some("unmarked") => Ok(Self::NoRecord),
            Some("completed") => Ok(Self::Completed),
            Some("missed") => Ok(Self::Missed),
            Some(other) => Err(DataError::UnknownStatus(other.to_string())),
        }
    }

    /// Wire label, `None` for a day without a record.
    pub fn as_wire(self) -> Option<&'static str> {
        match self {
            Self::Completed => Some("completed"),
            Self::Missed => Some("missed"),
            Self::NoRecord => None,
        }
    }

    pub fn is_completed(self) -> bool {
        self == Self::Completed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckIn {
    pub date: NaiveDate,
    pub status: CheckInStatus,
}

impl CheckIn {
    pub fn new(date: NaiveDate, status: CheckInStatus) -> Self {
        Self { date, status }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streaks {
    pub current: u32,
    pub longest: u32,
}

/// Weekdays a habit is scheduled on, one bit per day with bit 0 = Sunday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetDays(u8);

impl TargetDays {
    pub const ALL: TargetDays = TargetDays(0b0111_1111);

    pub fn from_index(index: i64) -> Result<Self, DataError> {
        if (0..=6).contains(&index) {
            Ok(Self(1 << index))
        } else {
            Err(DataError::InvalidWeekday(index))
        }
    }

    pub fn from_indices(indices: &[i64]) -> Result<Self, DataError> {
        let mut days = Self::default();
        for &index in indices {
            days = days | Self::from_index(index)?;
        }
        Ok(days)
    }

    pub fn contains(self, weekday: Weekday) -> bool {
        self.0 & (1 << weekday.num_days_from_sunday()) != 0
    }

    /// Sorted weekday indices, Sunday first.
    pub fn indices(self) -> Vec<i64> {
        (0..7).filter(|bit| self.0 & (1 << *bit) != 0).collect()
    }
}

impl std::ops::BitOr for TargetDays {
    type Output = TargetDays;

    fn bitor(self, rhs: Self) -> Self::Output {
        TargetDays(self.0 | rhs.0)
    }
}

/// A habit normalized for computation: dates are local calendar days and the
/// ledger is sorted and deduplicated.
#[derive(Debug, Clone, PartialEq)]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub target_days: TargetDays,
    pub ledger: Ledger,
    pub streaks: Streaks,
}

impl Habit {
    /// A fresh habit: empty ledger, zero streaks.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start_date: NaiveDate,
        target_days: TargetDays,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            start_date,
            target_days,
            ledger: Ledger::new(),
            streaks: Streaks::default(),
        }
    }

    /// Normalizes a wire record.
    ///
    /// Fails only when `id` or `startDate` is unusable. Bad check-ins are
    /// dropped from the ledger, and if any check-in is malformed the streaks
    /// fall back to zero. Out-of-range weekday indices are ignored.
    pub fn from_record<Tz: TimeZone>(record: &HabitRecord, tz: &Tz) -> Result<Self, DataError> {
        if record.id.trim().is_empty() {
            return Err(DataError::MissingField("id"));
        }
        let start_date = record
            .start_date
            .as_deref()
            .ok_or(DataError::MissingField("startDate"))
            .and_then(|raw| ledger::parse_day(raw, tz))?;

        let target_days = record.target_days.iter().fold(TargetDays::default(), |days, &index| {
            match TargetDays::from_index(index) {
                Ok(day) => days | day,
                Err(err) => {
                    warn!(habit = %record.id, "ignoring target day: {err}");
                    days
                }
            }
        });

        let streaks = streaks::calculate_from_records(&record.check_ins, tz).unwrap_or_else(|err| {
            warn!(habit = %record.id, "streaks unavailable: {err}");
            Streaks::default()
        });

        Ok(Self {
            id: record.id.clone(),
            name: record.name.clone(),
            description: record.description.clone(),
            start_date,
            target_days,
            ledger: Ledger::from_records_lenient(&record.check_ins, tz),
            streaks,
        })
    }

    /// Whether the habit exists and is scheduled on `day`.
    pub fn is_applicable(&self, day: NaiveDate) -> bool {
        day >= self.start_date && self.target_days.contains(day.weekday())
    }

    pub fn status_on(&self, day: NaiveDate) -> CheckInStatus {
        self.ledger.status_on(day)
    }

    /// Sets or clears the status for `day` and recomputes streaks from the
    /// whole ledger.
    pub fn record_check_in(&mut self, day: NaiveDate, status: CheckInStatus) {
        self.ledger.record(day, status);
        self.refresh_streaks();
    }

    pub fn refresh_streaks(&mut self) {
        self.streaks = streaks::calculate(&self.ledger);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub target_days: Vec<i64>,
    #[serde(default)]
    pub check_ins: Vec<CheckInRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInRecord {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    pub time_range: TimeRange,
    pub calendar_view: ViewMode,
    pub show_daily_quote: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            time_range: TimeRange::Week,
            calendar_view: ViewMode::Month,
            show_daily_quote: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    #[serde(default)]
    pub habits: Vec<HabitRecord>,
    #[serde(default)]
    pub preferences: Preferences,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHabitRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub target_days: Option<Vec<i64>>,
    #[serde(default)]
    pub start_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHabitRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub target_days: Option<Vec<i64>>,
    #[serde(default)]
    pub start_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    pub date: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    #[serde(default)]
    pub time_range: Option<TimeRange>,
    #[serde(default)]
    pub calendar_view: Option<ViewMode>,
    #[serde(default)]
    pub show_daily_quote: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HabitResponse {
    #[serde(flatten)]
    pub habit: HabitRecord,
    pub streaks: Streaks,
}

#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    #[serde(default)]
    pub view: Option<ViewMode>,
    #[serde(default)]
    pub date: Option<String>,
    /// Whole weeks or months to move away from `date`.
    #[serde(default)]
    pub offset: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DayQuery {
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    #[serde(default)]
    pub time_range: Option<TimeRange>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub tab: Option<DashboardTab>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn status_parse_unifies_unmarked_forms() {
        assert_eq!(CheckInStatus::parse(None).unwrap(), CheckInStatus::NoRecord);
        assert_eq!(CheckInStatus::parse(Some("unmarked")).unwrap(), CheckInStatus::NoRecord);
        assert_eq!(CheckInStatus::parse(Some("completed")).unwrap(), CheckInStatus::Completed);
        assert_eq!(
            CheckInStatus::parse(Some("done")),
            Err(DataError::UnknownStatus("done".to_string()))
        );
    }

    #[test]
    fn target_days_reject_out_of_range_index() {
        assert_eq!(TargetDays::from_indices(&[1, 7]), Err(DataError::InvalidWeekday(7)));
        let weekdays = TargetDays::from_indices(&[5, 1, 3]).unwrap();
        assert_eq!(weekdays.indices(), vec![1, 3, 5]);
        assert!(weekdays.contains(Weekday::Mon));
        assert!(!weekdays.contains(Weekday::Sun));
    }

    #[test]
    fn from_record_keeps_habit_when_check_in_is_malformed() {
        let record = HabitRecord {
            id: "h1".into(),
            name: "Read".into(),
            start_date: Some("2024-01-01".into()),
            target_days: vec![1, 2, 9],
            check_ins: vec![
                CheckInRecord {
                    date: Some("2024-01-08".into()),
                    status: Some("completed".into()),
                },
                CheckInRecord {
                    date: Some("not a date".into()),
                    status: Some("completed".into()),
                },
            ],
            ..HabitRecord::default()
        };

        let habit = Habit::from_record(&record, &Utc).unwrap();
        assert_eq!(habit.streaks, Streaks::default());
        assert_eq!(habit.ledger.len(), 1);
        assert_eq!(habit.target_days.indices(), vec![1, 2]);
        assert_eq!(habit.status_on(day(2024, 1, 8)), CheckInStatus::Completed);
    }

    #[test]
    fn from_record_requires_start_date() {
        let record = HabitRecord {
            id: "h1".into(),
            ..HabitRecord::default()
        };
        assert_eq!(
            Habit::from_record(&record, &Utc),
            Err(DataError::MissingField("startDate"))
        );
    }

    #[test]
    fn applicability_respects_start_date_and_weekday() {
        let habit = Habit::new("h1", "Walk", day(2024, 1, 3), TargetDays::from_indices(&[1, 3]).unwrap());
        assert!(!habit.is_applicable(day(2024, 1, 1)));
        assert!(habit.is_applicable(day(2024, 1, 3)));
        assert!(!habit.is_applicable(day(2024, 1, 4)));
        assert!(habit.is_applicable(day(2024, 1, 8)));
    }

    #[test]
    fn record_check_in_recomputes_streaks() {
        let mut habit = Habit::new("h1", "Walk", day(2024, 1, 1), TargetDays::ALL);
        habit.record_check_in(day(2024, 1, 1), CheckInStatus::Completed);
        habit.record_check_in(day(2024, 1, 2), CheckInStatus::Completed);
        assert_eq!(habit.streaks, Streaks { current: 2, longest: 2 });

        habit.record_check_in(day(2024, 1, 2), CheckInStatus::NoRecord);
        assert_eq!(habit.streaks, Streaks { current: 1, longest: 1 });
    }
}
