use crate::analytics::{self, AnalyticsSummary};
use crate::calendar::{self, CalendarView, DayDetail};
use crate::dashboard::{self, DashboardView};
use crate::errors::{AppError, DataError};
use crate::ledger;
use crate::models::{
    AnalyticsQuery, CalendarQuery, CheckInRequest, CheckInStatus, CreateHabitRequest,
    DashboardQuery, DayQuery, HabitRecord, HabitResponse, Preferences, PreferencesUpdate, Streaks,
    TargetDays, UpdateHabitRequest,
};
use crate::quote::{self, Quote};
use crate::state::AppState;
use crate::storage::persist_data;
use crate::streaks;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{Local, NaiveDate};
use tracing::{info, warn};
use uuid::Uuid;

pub async fn list_habits(State(state): State<AppState>) -> Json<Vec<HabitResponse>> {
    let data = state.data.lock().await;
    Json(data.habits.iter().map(annotate).collect())
}

pub async fn get_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HabitResponse>, AppError> {
    let data = state.data.lock().await;
    let record = data
        .habits
        .iter()
        .find(|habit| habit.id == id)
        .ok_or_else(|| unknown_habit(&id))?;
    Ok(Json(annotate(record)))
}

pub async fn create_habit(
    State(state): State<AppState>,
    Json(payload): Json<CreateHabitRequest>,
) -> Result<(StatusCode, Json<HabitResponse>), AppError> {
    let name = required_name(&payload.name)?;
    let target_days = match payload.target_days {
        Some(indices) => TargetDays::from_indices(&indices)?,
        None => TargetDays::ALL,
    };
    let start_date = match payload.start_date.as_deref() {
        Some(raw) => ledger::parse_day(raw, &Local)?,
        None => today(),
    };

    let record = HabitRecord {
        id: Uuid::new_v4().to_string(),
        name,
        description: payload.description.filter(|text| !text.trim().is_empty()),
        start_date: Some(date_key(start_date)),
        target_days: target_days.indices(),
        check_ins: Vec::new(),
    };

    let mut data = state.data.lock().await;
    data.habits.push(record.clone());
    persist_data(&state.data_path, &data).await?;
    info!(habit = %record.id, "created habit");

    Ok((StatusCode::CREATED, Json(annotate(&record))))
}

pub async fn update_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateHabitRequest>,
) -> Result<Json<HabitResponse>, AppError> {
    let name = payload.name.as_deref().map(required_name).transpose()?;
    let target_days = payload
        .target_days
        .as_deref()
        .map(TargetDays::from_indices)
        .transpose()?;
    let start_date = payload
        .start_date
        .as_deref()
        .map(|raw| ledger::parse_day(raw, &Local))
        .transpose()?;

    let mut data = state.data.lock().await;
    let record = data
        .habits
        .iter_mut()
        .find(|habit| habit.id == id)
        .ok_or_else(|| unknown_habit(&id))?;

    if let Some(name) = name {
        record.name = name;
    }
    if let Some(description) = payload.description {
        record.description = Some(description).filter(|text| !text.trim().is_empty());
    }
    if let Some(target_days) = target_days {
        record.target_days = target_days.indices();
    }
    if let Some(start_date) = start_date {
        record.start_date = Some(date_key(start_date));
    }
    let response = annotate(record);

    persist_data(&state.data_path, &data).await?;
    info!(habit = %id, "updated habit");
    Ok(Json(response))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut data = state.data.lock().await;
    let before = data.habits.len();
    data.habits.retain(|habit| habit.id != id);
    if data.habits.len() == before {
        return Err(unknown_habit(&id));
    }

    persist_data(&state.data_path, &data).await?;
    info!(habit = %id, "deleted habit");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn check_in(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<CheckInRequest>,
) -> Result<Json<HabitResponse>, AppError> {
    let day = ledger::parse_day(&payload.date, &Local)?;
    if calendar::is_future(day, today()) {
        return Err(AppError::bad_request("cannot check in on a future date"));
    }
    let status = CheckInStatus::parse(payload.status.as_deref())?;

    let mut data = state.data.lock().await;
    let record = data
        .habits
        .iter_mut()
        .find(|habit| habit.id == id)
        .ok_or_else(|| unknown_habit(&id))?;
    ledger::upsert_record(&mut record.check_ins, day, status, &Local);
    let response = annotate(record);

    persist_data(&state.data_path, &data).await?;
    info!(habit = %id, %day, ?status, "recorded check-in");
    Ok(Json(response))
}

pub async fn get_calendar(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarView>, AppError> {
    let today = today();
    let date = query_day(query.date.as_deref(), today)?;
    let view = match query.view {
        Some(view) => view,
        None => state.data.lock().await.preferences.calendar_view,
    };
    let anchor = view
        .shift(date, query.offset.unwrap_or(0))
        .ok_or(DataError::DateOutOfRange(date))?;
    let habits = state.habits().await;
    Ok(Json(calendar::build_calendar(&habits, view, anchor, today)?))
}

pub async fn get_calendar_day(
    State(state): State<AppState>,
    Query(query): Query<DayQuery>,
) -> Result<Json<DayDetail>, AppError> {
    let today = today();
    let day = query_day(query.date.as_deref(), today)?;
    let habits = state.habits().await;
    Ok(Json(calendar::day_detail(&habits, day, today)))
}

pub async fn get_analytics(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Json<AnalyticsSummary> {
    let range = match query.time_range {
        Some(range) => range,
        None => state.data.lock().await.preferences.time_range,
    };
    let habits = state.habits().await;
    Json(analytics::summarize(&habits, range, today()))
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Json<DashboardView> {
    let habits = state.habits().await;
    Json(dashboard::build_dashboard(
        &habits,
        query.tab.unwrap_or_default(),
        today(),
    ))
}

pub async fn get_quote(State(state): State<AppState>) -> Json<Option<Quote>> {
    let show = state.data.lock().await.preferences.show_daily_quote;
    Json(show.then(|| *quote::quote_for(today())))
}

pub async fn get_preferences(State(state): State<AppState>) -> Json<Preferences> {
    let preferences = state.data.lock().await.preferences;
    Json(preferences)
}

pub async fn update_preferences(
    State(state): State<AppState>,
    Json(payload): Json<PreferencesUpdate>,
) -> Result<Json<Preferences>, AppError> {
    let mut data = state.data.lock().await;
    let preferences = &mut data.preferences;
    if let Some(time_range) = payload.time_range {
        preferences.time_range = time_range;
    }
    if let Some(calendar_view) = payload.calendar_view {
        preferences.calendar_view = calendar_view;
    }
    if let Some(show) = payload.show_daily_quote {
        preferences.show_daily_quote = show;
    }
    let updated = *preferences;

    persist_data(&state.data_path, &data).await?;
    Ok(Json(updated))
}

/// Wire record plus freshly computed streaks.
fn annotate(record: &HabitRecord) -> HabitResponse {
    let streaks = streaks::calculate_from_records(&record.check_ins, &Local).unwrap_or_else(|err| {
        warn!(habit = %record.id, "streaks unavailable: {err}");
        Streaks::default()
    });
    HabitResponse {
        habit: record.clone(),
        streaks,
    }
}

fn required_name(raw: &str) -> Result<String, AppError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("name must not be empty"));
    }
    Ok(name.to_string())
}

fn query_day(raw: Option<&str>, today: NaiveDate) -> Result<NaiveDate, AppError> {
    match raw {
        Some(raw) => Ok(ledger::parse_day(raw, &Local)?),
        None => Ok(today),
    }
}

fn unknown_habit(id: &str) -> AppError {
    AppError::not_found(format!("habit {id} not found"))
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
