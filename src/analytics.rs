use crate::models::Habit;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

pub const TOP_HABITS: usize = 5;
const NAME_LIMIT: usize = 15;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    #[default]
    Week,
    Month,
}

impl TimeRange {
    /// Inclusive window ending today: the trailing seven days, or the current
    /// month so far.
    pub fn window(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = match self {
            TimeRange::Week => today - Duration::days(6),
            TimeRange::Month => today - Duration::days(i64::from(today.day0())),
        };
        (start, today)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitCompletion {
    pub id: String,
    pub name: String,
    pub completed: usize,
    pub total: usize,
    pub completion_rate: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionSlice {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressPoint {
    pub date: NaiveDate,
    pub label: String,
    pub full_label: String,
    pub scheduled: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakLeader {
    pub streak: u32,
    pub habit_id: String,
    pub habit_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub time_range: TimeRange,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_habits: usize,
    pub overall_completion_rate: f64,
    pub best_habit: Option<HabitCompletion>,
    pub top_by_completion: Vec<CompletionSlice>,
    pub daily_progress: Vec<ProgressPoint>,
    pub longest_streak: Option<StreakLeader>,
    pub best_current_streak: Option<StreakLeader>,
}

pub fn summarize(habits: &[Habit], range: TimeRange, today: NaiveDate) -> AnalyticsSummary {
    let (start, end) = range.window(today);
    let completions: Vec<HabitCompletion> = habits
        .iter()
        .map(|habit| completion(habit, start, end))
        .collect();

    AnalyticsSummary {
        time_range: range,
        start,
        end,
        total_habits: habits.len(),
        overall_completion_rate: overall_rate(&completions),
        best_habit: best_habit(&completions).cloned(),
        top_by_completion: top_by_completion(&completions, TOP_HABITS),
        daily_progress: daily_progress(habits, range, start, end),
        longest_streak: leader_by(habits, |habit| habit.streaks.longest),
        best_current_streak: leader_by(habits, |habit| habit.streaks.current),
    }
}

/// Completed share of the check-ins recorded in `start..=end`, as a
/// percentage. A window without check-ins rates 0.
pub fn completion(habit: &Habit, start: NaiveDate, end: NaiveDate) -> HabitCompletion {
    let (completed, total) = habit
        .ledger
        .between(start, end)
        .fold((0, 0), |(completed, total), entry| {
            (completed + usize::from(entry.status.is_completed()), total + 1)
        });
    let completion_rate = if total > 0 {
        completed as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    HabitCompletion {
        id: habit.id.clone(),
        name: habit.name.clone(),
        completed,
        total,
        completion_rate,
        current_streak: habit.streaks.current,
        longest_streak: habit.streaks.longest,
    }
}

/// Mean of the per-habit rates, so every habit weighs the same.
pub fn overall_rate(completions: &[HabitCompletion]) -> f64 {
    if completions.is_empty() {
        return 0.0;
    }
    completions.iter().map(|c| c.completion_rate).sum::<f64>() / completions.len() as f64
}

/// Highest non-zero rate; the first habit in input order wins a tie. `None`
/// when no habit completed anything in the window.
pub fn best_habit(completions: &[HabitCompletion]) -> Option<&HabitCompletion> {
    completions.iter().fold(None, |best, candidate| {
        let floor = best.map_or(0.0, |best: &HabitCompletion| best.completion_rate);
        if candidate.completion_rate > floor {
            Some(candidate)
        } else {
            best
        }
    })
}

pub fn top_by_completion(completions: &[HabitCompletion], limit: usize) -> Vec<CompletionSlice> {
    let mut ranked: Vec<&HabitCompletion> = completions.iter().collect();
    ranked.sort_by(|a, b| b.completion_rate.total_cmp(&a.completion_rate));
    ranked
        .into_iter()
        .take(limit)
        .map(|c| CompletionSlice {
            name: truncate_name(&c.name),
            value: c.completion_rate,
        })
        .collect()
}

pub fn truncate_name(name: &str) -> String {
    if name.chars().count() > NAME_LIMIT {
        let head: String = name.chars().take(NAME_LIMIT).collect();
        format!("{head}...")
    } else {
        name.to_string()
    }
}

/// First habit holding the maximum of `key`.
pub fn leader_by(habits: &[Habit], key: impl Fn(&Habit) -> u32) -> Option<StreakLeader> {
    let streak = habits.iter().map(&key).max()?;
    habits
        .iter()
        .find(|habit| key(*habit) == streak)
        .map(|habit| StreakLeader {
            streak,
            habit_id: habit.id.clone(),
            habit_name: habit.name.clone(),
        })
}

// Counted here rather than through the calendar so the chart and the heatmap
// stay independent of each other.
fn daily_progress(
    habits: &[Habit],
    range: TimeRange,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<ProgressPoint> {
    let label_format = match range {
        TimeRange::Week => "%a",
        TimeRange::Month => "%d",
    };

    start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|day| {
            let mut scheduled = 0;
            let mut completed = 0;
            for habit in habits.iter().filter(|habit| habit.is_applicable(day)) {
                scheduled += 1;
                if habit.status_on(day).is_completed() {
                    completed += 1;
                }
            }
            ProgressPoint {
                date: day,
                label: day.format(label_format).to_string(),
                full_label: day.format("%b %d").to_string(),
                scheduled,
                completed,
            }
        })
        .collect()
}
