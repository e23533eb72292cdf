use crate::ledger;
use crate::models::{AppData, Habit};
use chrono::Local;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<AppData>>,
}

impl AppState {
    pub fn new(data_path: PathBuf, data: AppData) -> Self {
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
        }
    }

    /// Normalized copy of the stored habits, taken under the lock.
    pub async fn habits(&self) -> Vec<Habit> {
        let data = self.data.lock().await;
        ledger::ingest_habits(&data.habits, &Local)
    }
}
