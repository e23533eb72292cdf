//! Week and month calendar aggregation for the heatmap.

use crate::errors::DataError;
use crate::models::{CheckInStatus, Habit};
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Week,
    #[default]
    Month,
}

impl ViewMode {
    /// Inclusive bounds of the week (Sunday start) or month holding `anchor`.
    /// `None` when the period runs past the representable date range.
    pub fn period(self, anchor: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            ViewMode::Week => {
                let offset = anchor.weekday().num_days_from_sunday();
                let start = anchor.checked_sub_days(Days::new(u64::from(offset)))?;
                Some((start, start.checked_add_days(Days::new(6))?))
            }
            ViewMode::Month => {
                let first = anchor.with_day(1)?;
                let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
                Some((first, last))
            }
        }
    }

    /// Moves `anchor` by `delta` weeks or months.
    pub fn shift(self, anchor: NaiveDate, delta: i32) -> Option<NaiveDate> {
        match self {
            ViewMode::Week => {
                let days = Days::new(u64::from(delta.unsigned_abs()) * 7);
                if delta >= 0 {
                    anchor.checked_add_days(days)
                } else {
                    anchor.checked_sub_days(days)
                }
            }
            ViewMode::Month => {
                let months = Months::new(delta.unsigned_abs());
                if delta >= 0 {
                    anchor.checked_add_months(months)
                } else {
                    anchor.checked_sub_months(months)
                }
            }
        }
    }

    /// Heading for the period, e.g. `January 2024` or `Jan 7 - 13, 2024`.
    pub fn label(self, anchor: NaiveDate) -> Option<String> {
        let (start, end) = self.period(anchor)?;
        let label = match self {
            ViewMode::Month => start.format("%B %Y").to_string(),
            ViewMode::Week if start.year() == end.year() && start.month() == end.month() => {
                format!("{} - {}", start.format("%b %-d"), end.format("%-d, %Y"))
            }
            ViewMode::Week => {
                format!("{} - {}", start.format("%b %-d, %Y"), end.format("%b %-d, %Y"))
            }
        };
        Some(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DayStatus {
    Future,
    NoHabits,
    AllCompleted,
    PartiallyCompleted,
    NoneCompleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAggregate {
    pub date: NaiveDate,
    pub scheduled_count: usize,
    pub completed_count: usize,
    pub status: DayStatus,
    pub selectable: bool,
}

/// One grid cell; blanks pad the month grid before the 1st.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CalendarCell {
    Blank,
    Day(DayAggregate),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarView {
    pub view: ViewMode,
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub leading_blanks: usize,
    pub selected: Option<NaiveDate>,
    pub cells: Vec<CalendarCell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitDayEntry {
    pub id: String,
    pub name: String,
    pub status: CheckInStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayDetail {
    pub date: NaiveDate,
    pub status: DayStatus,
    pub selectable: bool,
    pub completed: Vec<HabitDayEntry>,
    pub incomplete: Vec<HabitDayEntry>,
}

pub fn is_future(day: NaiveDate, today: NaiveDate) -> bool {
    day > today
}

/// `(scheduled, completed)` across the habits applicable on `day`.
pub fn day_counts(habits: &[Habit], day: NaiveDate) -> (usize, usize) {
    habits
        .iter()
        .filter(|habit| habit.is_applicable(day))
        .fold((0, 0), |(scheduled, completed), habit| {
            let done = habit.status_on(day).is_completed();
            (scheduled + 1, completed + usize::from(done))
        })
}

/// Status of a past or present day from its counts.
pub fn composite_status(scheduled: usize, completed: usize) -> DayStatus {
    if scheduled == 0 {
        DayStatus::NoHabits
    } else if completed == scheduled {
        DayStatus::AllCompleted
    } else if completed == 0 {
        DayStatus::NoneCompleted
    } else {
        DayStatus::PartiallyCompleted
    }
}

pub fn aggregate_day(habits: &[Habit], day: NaiveDate, today: NaiveDate) -> DayAggregate {
    let (scheduled_count, completed_count) = day_counts(habits, day);
    let future = is_future(day, today);
    let status = if future {
        DayStatus::Future
    } else {
        composite_status(scheduled_count, completed_count)
    };
    DayAggregate {
        date: day,
        scheduled_count,
        completed_count,
        status,
        selectable: !future,
    }
}

/// Aggregates for every day in `start..=end`; empty when `start > end`.
pub fn aggregate_range(
    habits: &[Habit],
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> Vec<DayAggregate> {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|day| aggregate_day(habits, day, today))
        .collect()
}

/// Fails when the period around `anchor` falls outside the supported dates.
pub fn build_calendar(
    habits: &[Habit],
    view: ViewMode,
    anchor: NaiveDate,
    today: NaiveDate,
) -> Result<CalendarView, DataError> {
    let (start, end) = view
        .period(anchor)
        .ok_or(DataError::DateOutOfRange(anchor))?;
    let label = view.label(anchor).ok_or(DataError::DateOutOfRange(anchor))?;
    let leading_blanks = match view {
        ViewMode::Month => start.weekday().num_days_from_sunday() as usize,
        ViewMode::Week => 0,
    };

    let mut cells = Vec::with_capacity(leading_blanks + 31);
    cells.extend(std::iter::repeat(CalendarCell::Blank).take(leading_blanks));
    cells.extend(
        aggregate_range(habits, start, end, today)
            .into_iter()
            .map(CalendarCell::Day),
    );

    Ok(CalendarView {
        view,
        label,
        start,
        end,
        leading_blanks,
        selected: (start..=end).contains(&today).then_some(today),
        cells,
    })
}

/// Applicable habits on `day` split into completed and incomplete. Future
/// days are not selectable and carry no partition.
pub fn day_detail(habits: &[Habit], day: NaiveDate, today: NaiveDate) -> DayDetail {
    let aggregate = aggregate_day(habits, day, today);
    let mut completed = Vec::new();
    let mut incomplete = Vec::new();

    if aggregate.selectable {
        for habit in habits.iter().filter(|habit| habit.is_applicable(day)) {
            let status = habit.status_on(day);
            let entry = HabitDayEntry {
                id: habit.id.clone(),
                name: habit.name.clone(),
                status,
            };
            if status.is_completed() {
                completed.push(entry);
            } else {
                incomplete.push(entry);
            }
        }
    }

    DayDetail {
        date: day,
        status: aggregate.status,
        selectable: aggregate.selectable,
        completed,
        incomplete,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TargetDays;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn habit(id: &str, start: NaiveDate, days: &[i64]) -> Habit {
        Habit::new(id, id.to_uppercase(), start, TargetDays::from_indices(days).unwrap())
    }

    fn sample_habits() -> Vec<Habit> {
        let mut weekdays = habit("weekdays", day(2024, 1, 1), &[1, 2, 3, 4, 5]);
        weekdays.record_check_in(day(2024, 1, 8), CheckInStatus::Completed);
        weekdays.record_check_in(day(2024, 1, 9), CheckInStatus::Completed);
        weekdays.record_check_in(day(2024, 1, 10), CheckInStatus::Missed);

        let mut daily = habit("daily", day(2024, 1, 9), &[0, 1, 2, 3, 4, 5, 6]);
        daily.record_check_in(day(2024, 1, 9), CheckInStatus::Completed);
        // Before the start date; never counted.
        daily.record_check_in(day(2024, 1, 8), CheckInStatus::Completed);

        vec![weekdays, daily]
    }

    #[test]
    fn composite_status_covers_every_count_shape() {
        assert_eq!(composite_status(0, 0), DayStatus::NoHabits);
        assert_eq!(composite_status(2, 2), DayStatus::AllCompleted);
        assert_eq!(composite_status(2, 1), DayStatus::PartiallyCompleted);
        assert_eq!(composite_status(2, 0), DayStatus::NoneCompleted);
    }

    #[test]
    fn per_day_counts_respect_start_date_and_target_days() {
        let habits = sample_habits();
        let today = day(2024, 1, 20);

        let monday = aggregate_day(&habits, day(2024, 1, 8), today);
        assert_eq!((monday.scheduled_count, monday.completed_count), (1, 1));
        assert_eq!(monday.status, DayStatus::AllCompleted);

        let tuesday = aggregate_day(&habits, day(2024, 1, 9), today);
        assert_eq!((tuesday.scheduled_count, tuesday.completed_count), (2, 2));

        let wednesday = aggregate_day(&habits, day(2024, 1, 10), today);
        assert_eq!(wednesday.status, DayStatus::NoneCompleted);

        let sunday = aggregate_day(&habits, day(2024, 1, 7), today);
        assert_eq!(sunday.status, DayStatus::NoHabits);

        let saturday = aggregate_day(&habits, day(2024, 1, 13), today);
        assert_eq!((saturday.scheduled_count, saturday.completed_count), (1, 0));
    }

    #[test]
    fn partially_completed_day() {
        let mut habits = sample_habits();
        habits[1].record_check_in(day(2024, 1, 10), CheckInStatus::Completed);
        let wednesday = aggregate_day(&habits, day(2024, 1, 10), day(2024, 1, 20));
        assert_eq!(wednesday.status, DayStatus::PartiallyCompleted);
    }

    #[test]
    fn days_after_today_are_future_and_not_selectable() {
        let habits = sample_habits();
        let today = day(2024, 1, 9);
        let tomorrow = aggregate_day(&habits, day(2024, 1, 10), today);
        assert_eq!(tomorrow.status, DayStatus::Future);
        assert!(!tomorrow.selectable);
        assert!(aggregate_day(&habits, today, today).selectable);

        let detail = day_detail(&habits, day(2024, 1, 10), today);
        assert!(detail.completed.is_empty() && detail.incomplete.is_empty());
    }

    #[test]
    fn month_view_pads_with_leading_blanks() {
        let view = build_calendar(&sample_habits(), ViewMode::Month, day(2024, 2, 14), day(2024, 2, 20))
            .unwrap();
        // 2024-02-01 is a Thursday.
        assert_eq!(view.leading_blanks, 4);
        assert_eq!(view.cells.len(), 4 + 29);
        assert!(view.cells[..4].iter().all(|cell| *cell == CalendarCell::Blank));
        assert_eq!((view.start, view.end), (day(2024, 2, 1), day(2024, 2, 29)));
        assert_eq!(view.label, "February 2024");
        assert_eq!(view.selected, Some(day(2024, 2, 20)));
    }

    #[test]
    fn week_view_starts_on_sunday() {
        let view = build_calendar(&sample_habits(), ViewMode::Week, day(2024, 1, 10), day(2024, 3, 1))
            .unwrap();
        assert_eq!((view.start, view.end), (day(2024, 1, 7), day(2024, 1, 13)));
        assert_eq!(view.leading_blanks, 0);
        assert_eq!(view.cells.len(), 7);
        assert_eq!(view.label, "Jan 7 - 13, 2024");
        assert_eq!(view.selected, None);
    }

    #[test]
    fn week_label_spanning_years() {
        assert_eq!(
            ViewMode::Week.label(day(2024, 1, 1)).as_deref(),
            Some("Dec 31, 2023 - Jan 6, 2024")
        );
    }

    #[test]
    fn every_in_range_day_has_exactly_one_status() {
        let habits = sample_habits();
        let today = day(2024, 1, 15);
        let days = aggregate_range(&habits, day(2023, 12, 25), day(2024, 1, 31), today);
        assert_eq!(days.len(), 38);
        for aggregate in days {
            let expected = if aggregate.date > today {
                DayStatus::Future
            } else {
                composite_status(aggregate.scheduled_count, aggregate.completed_count)
            };
            assert_eq!(aggregate.status, expected);
        }
    }

    #[test]
    fn empty_collection_yields_no_habit_days() {
        let days = aggregate_range(&[], day(2024, 1, 1), day(2024, 1, 7), day(2024, 1, 7));
        assert!(days.iter().all(|aggregate| aggregate.status == DayStatus::NoHabits));
        assert!(aggregate_range(&[], day(2024, 1, 7), day(2024, 1, 1), day(2024, 1, 7)).is_empty());
    }

    #[test]
    fn selected_day_partitions_applicable_habits() {
        let habits = sample_habits();
        let detail = day_detail(&habits, day(2024, 1, 10), day(2024, 1, 20));
        assert!(detail.completed.is_empty());
        let incomplete: Vec<_> = detail.incomplete.iter().map(|entry| entry.id.as_str()).collect();
        assert_eq!(incomplete, vec!["weekdays", "daily"]);
        assert_eq!(detail.incomplete[0].status, CheckInStatus::Missed);
        assert_eq!(detail.incomplete[1].status, CheckInStatus::NoRecord);
    }

    #[test]
    fn shifting_periods() {
        assert_eq!(ViewMode::Month.shift(day(2024, 1, 31), 1), Some(day(2024, 2, 29)));
        assert_eq!(ViewMode::Month.shift(day(2024, 1, 15), -1), Some(day(2023, 12, 15)));
        assert_eq!(ViewMode::Week.shift(day(2024, 1, 10), -2), Some(day(2023, 12, 27)));
        assert_eq!(ViewMode::Week.shift(NaiveDate::MAX, 1), None);
        assert_eq!(ViewMode::Month.shift(NaiveDate::MIN, -1), None);
    }

    #[test]
    fn periods_at_the_date_limits_are_rejected() {
        let today = day(2024, 1, 10);
        let cases = [
            (ViewMode::Week, NaiveDate::MAX),
            (ViewMode::Week, NaiveDate::MIN),
            (ViewMode::Month, NaiveDate::MAX),
        ];
        for (view, anchor) in cases {
            assert_eq!(
                build_calendar(&[], view, anchor, today).unwrap_err(),
                DataError::DateOutOfRange(anchor)
            );
            assert_eq!(view.label(anchor), None);
        }
    }

    #[test]
    fn periods_near_the_date_limits_still_build() {
        let today = day(2024, 1, 10);
        let late = NaiveDate::MAX.checked_sub_days(Days::new(40)).unwrap();
        let view = build_calendar(&[], ViewMode::Week, late, today).unwrap();
        assert_eq!(view.cells.len(), 7);
        assert_eq!(view.selected, None);

        let first_month = build_calendar(&[], ViewMode::Month, NaiveDate::MIN, today).unwrap();
        assert_eq!(first_month.start, NaiveDate::MIN);
        assert_eq!(first_month.cells.len(), first_month.leading_blanks + 31);
    }
}
