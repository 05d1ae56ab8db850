use std::sync::Arc;

use kereta_core::repository::{HistoryStore, ScheduleSource, UserAccounts};

#[derive(Clone)]
pub struct AppState {
    pub history: Arc<dyn HistoryStore>,
    pub schedules: Arc<dyn ScheduleSource>,
    pub users: Arc<dyn UserAccounts>,
}
