use async_trait::async_trait;

use crate::account::{NewUserAccount, UserAccount};
use crate::history::{BookingDraft, BookingRecord, BookingStatus, PassengerDetail};
use crate::profile::{ProfileUpdate, UserProfile};
use crate::schedule::{Train, TrainSchedule};
use crate::stations::Station;
use crate::CoreResult;

/// Record store for one session's booking history and profile. The store
/// exclusively owns the persisted collections; callers never mutate them
/// directly.
///
/// Updates and deletes on an absent id are documented no-ops: the updated
/// collection is returned unchanged. Backend I/O failure surfaces as
/// `CoreError::Persistence`; an absent or corrupt persisted blob reads as
/// the empty/default state instead of failing.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Full history, most recently created first.
    async fn get_history(&self) -> CoreResult<Vec<BookingRecord>>;

    /// Assigns a fresh unique monotonic id and creation timestamp, prepends
    /// the record, persists, and returns the created record.
    async fn add_history_item(&self, draft: BookingDraft) -> CoreResult<BookingRecord>;

    /// Like `add_history_item`, but persisting traveller identity details
    /// alongside the record where the backend supports them. The default
    /// keeps only the passenger count.
    async fn add_history_item_with_passengers(
        &self,
        draft: BookingDraft,
        details: Vec<PassengerDetail>,
    ) -> CoreResult<BookingRecord> {
        let _ = details;
        self.add_history_item(draft).await
    }

    /// Replaces only the `status` field of the matching record.
    async fn update_status(&self, id: i64, status: BookingStatus)
        -> CoreResult<Vec<BookingRecord>>;

    async fn delete_item(&self, id: i64) -> CoreResult<Vec<BookingRecord>>;

    /// Default profile if none has been persisted yet.
    async fn get_profile(&self) -> CoreResult<UserProfile>;

    /// Shallow-merges the update into the stored profile and returns the
    /// merged result.
    async fn update_profile(&self, update: ProfileUpdate) -> CoreResult<UserProfile>;

    /// Empties the history and resets the profile to its default. Idempotent.
    async fn clear_all(&self) -> CoreResult<()>;
}

/// Read-only reference data: stations, trains, and route/time offerings.
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    async fn list_stations(&self) -> CoreResult<Vec<Station>>;

    /// Active trains, ordered by name.
    async fn list_trains(&self) -> CoreResult<Vec<Train>>;

    /// Schedules matching the endpoint substring filters, ordered by
    /// departure time. Blank filters match everything.
    async fn search_schedules(&self, from: &str, to: &str) -> CoreResult<Vec<TrainSchedule>>;
}

/// Account registry for the service-backed variant.
#[async_trait]
pub trait UserAccounts: Send + Sync {
    async fn get_user(&self, user_id: i64) -> CoreResult<Option<UserAccount>>;

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<UserAccount>>;

    /// Fails with `CoreError::Duplicate` when the email is already taken.
    async fn create_user(&self, user: NewUserAccount) -> CoreResult<UserAccount>;
}
