pub mod app_config;
pub mod database;
pub mod history_repo;
pub mod local;
pub mod password;
pub mod schedule_repo;
pub mod user_repo;

pub use database::DbClient;
pub use history_repo::SqliteHistoryStore;
pub use local::LocalStore;
pub use schedule_repo::{SqliteScheduleSource, StaticScheduleSource};
pub use user_repo::{MemoryUserAccounts, SqliteUserAccounts};
