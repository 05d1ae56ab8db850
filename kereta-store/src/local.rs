use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use tracing::warn;

use kereta_core::history::{BookingDraft, BookingRecord, BookingStatus};
use kereta_core::profile::{ProfileUpdate, UserProfile};
use kereta_core::repository::HistoryStore;
use kereta_core::{CoreError, CoreResult};

const HISTORY_FILE: &str = "history.json";
const PROFILE_FILE: &str = "profile.json";

/// Durable key-value record store: one JSON blob per collection under a
/// session data directory. Absent files read as the empty/default state;
/// a blob that no longer parses is treated the same way instead of taking
/// the session down. I/O failures surface as `CoreError::Persistence`.
pub struct LocalStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalStore {
    pub fn open(dir: impl Into<PathBuf>) -> CoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| CoreError::Persistence(format!("create {}: {}", dir.display(), e)))?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    fn read_blob<T: serde::de::DeserializeOwned>(&self, file: &str, default: T) -> CoreResult<T> {
        let path = self.dir.join(file);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(default),
            Err(e) => {
                return Err(CoreError::Persistence(format!("read {}: {}", path.display(), e)))
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "corrupt blob, falling back to default");
                Ok(default)
            }
        }
    }

    fn write_blob<T: serde::Serialize>(&self, file: &str, value: &T) -> CoreResult<()> {
        let path = self.dir.join(file);
        let bytes = serde_json::to_vec_pretty(value)
            .map_err(|e| CoreError::Persistence(format!("encode {}: {}", file, e)))?;
        fs::write(&path, bytes)
            .map_err(|e| CoreError::Persistence(format!("write {}: {}", path.display(), e)))
    }

    fn read_history(&self) -> CoreResult<Vec<BookingRecord>> {
        self.read_blob(HISTORY_FILE, Vec::new())
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl HistoryStore for LocalStore {
    async fn get_history(&self) -> CoreResult<Vec<BookingRecord>> {
        self.read_history()
    }

    async fn add_history_item(&self, draft: BookingDraft) -> CoreResult<BookingRecord> {
        let _guard = self.write_lock.lock().unwrap();
        let mut history = self.read_history()?;

        if history.iter().any(|r| r.order_number == draft.order_number) {
            return Err(CoreError::Duplicate(format!(
                "Order number {} already exists",
                draft.order_number
            )));
        }

        // Time-seeded and bumped past the current maximum, so ids stay
        // unique and monotonic even for same-millisecond inserts.
        let max_id = history.iter().map(|r| r.id).max().unwrap_or(0);
        let id = Utc::now().timestamp_millis().max(max_id + 1);

        let record = draft.into_record(id, Utc::now());
        history.insert(0, record.clone());
        self.write_blob(HISTORY_FILE, &history)?;
        Ok(record)
    }

    async fn update_status(
        &self,
        id: i64,
        status: BookingStatus,
    ) -> CoreResult<Vec<BookingRecord>> {
        let _guard = self.write_lock.lock().unwrap();
        let mut history = self.read_history()?;
        if let Some(record) = history.iter_mut().find(|r| r.id == id) {
            record.status = status;
            self.write_blob(HISTORY_FILE, &history)?;
        }
        Ok(history)
    }

    async fn delete_item(&self, id: i64) -> CoreResult<Vec<BookingRecord>> {
        let _guard = self.write_lock.lock().unwrap();
        let mut history = self.read_history()?;
        let before = history.len();
        history.retain(|r| r.id != id);
        if history.len() != before {
            self.write_blob(HISTORY_FILE, &history)?;
        }
        Ok(history)
    }

    async fn get_profile(&self) -> CoreResult<UserProfile> {
        self.read_blob(PROFILE_FILE, UserProfile::default())
    }

    async fn update_profile(&self, update: ProfileUpdate) -> CoreResult<UserProfile> {
        let _guard = self.write_lock.lock().unwrap();
        let merged = self
            .read_blob(PROFILE_FILE, UserProfile::default())?
            .merged(update);
        self.write_blob(PROFILE_FILE, &merged)?;
        Ok(merged)
    }

    async fn clear_all(&self) -> CoreResult<()> {
        let _guard = self.write_lock.lock().unwrap();
        self.write_blob(HISTORY_FILE, &Vec::<BookingRecord>::new())?;
        self.write_blob(PROFILE_FILE, &UserProfile::default())
    }
}
