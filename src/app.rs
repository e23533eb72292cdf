use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/habits",
            get(handlers::list_habits).post(handlers::create_habit),
        )
        .route(
            "/api/habits/:id",
            get(handlers::get_habit)
                .put(handlers::update_habit)
                .delete(handlers::delete_habit),
        )
        .route("/api/habits/:id/check-in", post(handlers::check_in))
        .route("/api/calendar", get(handlers::get_calendar))
        .route("/api/calendar/day", get(handlers::get_calendar_day))
        .route("/api/analytics", get(handlers::get_analytics))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/quote", get(handlers::get_quote))
        .route(
            "/api/preferences",
            get(handlers::get_preferences).put(handlers::update_preferences),
        )
        .with_state(state)
}
