pub mod analytics;
pub mod app;
pub mod calendar;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod quote;
pub mod state;
pub mod storage;
pub mod streaks;

pub use app::router;
pub use config::Config;
pub use errors::{AppError, DataError};
pub use models::{CheckIn, CheckInStatus, Habit, Streaks};
pub use state::AppState;
pub use storage::load_data;
