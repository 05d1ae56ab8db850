pub mod account;
pub mod booking;
pub mod filter;
pub mod history;
pub mod profile;
pub mod repository;
pub mod schedule;
pub mod stats;
pub mod stations;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Duplicate: {0}")]
    Duplicate(String),
    #[error("Invalid credentials")]
    Unauthorized,
    #[error("Persistence failure: {0}")]
    Persistence(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
