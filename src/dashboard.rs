//! Dashboard view: habit cards filtered by tab, plus the best streaks.

use crate::analytics::{self, StreakLeader};
use crate::models::{CheckInStatus, Habit, Streaks};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardTab {
    #[default]
    All,
    Today,
    Due,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitCard {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub streaks: Streaks,
    pub scheduled_today: bool,
    pub today_status: CheckInStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TabCounts {
    pub all: usize,
    pub today: usize,
    pub due: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BestStreaks {
    pub longest: StreakLeader,
    pub current: StreakLeader,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub tab: DashboardTab,
    pub date: NaiveDate,
    pub counts: TabCounts,
    pub habits: Vec<HabitCard>,
    pub best_streaks: Option<BestStreaks>,
}

/// Scheduled today and not yet completed.
pub fn is_due(habit: &Habit, today: NaiveDate) -> bool {
    habit.is_applicable(today) && !habit.status_on(today).is_completed()
}

fn in_tab(habit: &Habit, tab: DashboardTab, today: NaiveDate) -> bool {
    match tab {
        DashboardTab::All => true,
        DashboardTab::Today => habit.is_applicable(today),
        DashboardTab::Due => is_due(habit, today),
    }
}

pub fn build_dashboard(habits: &[Habit], tab: DashboardTab, today: NaiveDate) -> DashboardView {
    let counts = TabCounts {
        all: habits.len(),
        today: habits.iter().filter(|h| h.is_applicable(today)).count(),
        due: habits.iter().filter(|h| is_due(h, today)).count(),
    };

    let cards = habits
        .iter()
        .filter(|habit| in_tab(habit, tab, today))
        .map(|habit| HabitCard {
            id: habit.id.clone(),
            name: habit.name.clone(),
            description: habit.description.clone(),
            streaks: habit.streaks,
            scheduled_today: habit.is_applicable(today),
            today_status: habit.status_on(today),
        })
        .collect();

    let best_streaks = analytics::leader_by(habits, |h| h.streaks.longest).zip(
        analytics::leader_by(habits, |h| h.streaks.current),
    );

    DashboardView {
        tab,
        date: today,
        counts,
        habits: cards,
        best_streaks: best_streaks.map(|(longest, current)| BestStreaks { longest, current }),
    }
}
