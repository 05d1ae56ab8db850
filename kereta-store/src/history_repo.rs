use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Pool, Sqlite};
use tracing::warn;

use kereta_core::history::{
    BookingDraft, BookingRecord, BookingStatus, PassengerDetail, Route, StationRef,
};
use kereta_core::profile::{ProfileUpdate, UserProfile};
use kereta_core::repository::HistoryStore;
use kereta_core::{CoreError, CoreResult};

/// SQL-backed record store. All sessions share one canonical `history`
/// schema; rows are partitioned by an explicit `session` key handed to the
/// store at construction, so no ambient global decides whose records these
/// are.
pub struct SqliteHistoryStore {
    pool: Pool<Sqlite>,
    session: String,
}

#[derive(sqlx::FromRow)]
struct HistoryRow {
    id: i64,
    order_number: String,
    status: String,
    from_name: String,
    from_code: String,
    from_city: String,
    to_name: String,
    to_code: String,
    to_city: String,
    departure: String,
    arrival: String,
    duration: String,
    train_name: String,
    class: String,
    price: i64,
    passengers: i64,
    travel_date: String,
    created_at: String,
}

impl HistoryRow {
    /// A row that no longer parses is dropped with a warning rather than
    /// failing the whole read.
    fn into_record(self) -> Option<BookingRecord> {
        let status = match BookingStatus::parse(&self.status) {
            Some(status) => status,
            None => {
                warn!(id = self.id, status = %self.status, "unknown status on stored record");
                return None;
            }
        };
        let date = match NaiveDate::parse_from_str(&self.travel_date, "%Y-%m-%d") {
            Ok(date) => date,
            Err(e) => {
                warn!(id = self.id, error = %e, "bad travel date on stored record");
                return None;
            }
        };
        let created_at = match DateTime::parse_from_rfc3339(&self.created_at) {
            Ok(ts) => ts.with_timezone(&Utc),
            Err(e) => {
                warn!(id = self.id, error = %e, "bad creation timestamp on stored record");
                return None;
            }
        };
        Some(BookingRecord {
            id: self.id,
            order_number: self.order_number,
            status,
            route: Route {
                from: StationRef::new(self.from_name, self.from_code, self.from_city),
                to: StationRef::new(self.to_name, self.to_code, self.to_city),
            },
            departure: self.departure,
            arrival: self.arrival,
            duration: self.duration,
            train_name: self.train_name,
            class: self.class,
            price: self.price,
            passengers: self.passengers.max(0) as u32,
            date,
            created_at,
        })
    }
}

fn db_err(e: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.message().contains("UNIQUE") {
            return CoreError::Duplicate(db.message().to_string());
        }
    }
    CoreError::Persistence(e.to_string())
}

const SELECT_HISTORY: &str = "SELECT id, order_number, status, from_name, from_code, from_city, \
     to_name, to_code, to_city, departure, arrival, duration, train_name, class, \
     price, passengers, travel_date, created_at \
     FROM history WHERE session = ? ORDER BY created_at DESC, id DESC";

impl SqliteHistoryStore {
    pub fn new(pool: Pool<Sqlite>, session: impl Into<String>) -> Self {
        Self {
            pool,
            session: session.into(),
        }
    }

    async fn fetch_history(&self) -> CoreResult<Vec<BookingRecord>> {
        let rows = sqlx::query_as::<_, HistoryRow>(SELECT_HISTORY)
            .bind(&self.session)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().filter_map(HistoryRow::into_record).collect())
    }
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn get_history(&self) -> CoreResult<Vec<BookingRecord>> {
        self.fetch_history().await
    }

    async fn add_history_item(&self, draft: BookingDraft) -> CoreResult<BookingRecord> {
        self.add_history_item_with_passengers(draft, Vec::new()).await
    }

    /// The record and its passenger sub-records go in under one
    /// transaction; a failed passenger insert rolls the booking back
    /// instead of leaving a partial write behind.
    async fn add_history_item_with_passengers(
        &self,
        draft: BookingDraft,
        details: Vec<PassengerDetail>,
    ) -> CoreResult<BookingRecord> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let max_id: Option<i64> = sqlx::query_scalar("SELECT MAX(id) FROM history")
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?;
        let id = Utc::now().timestamp_millis().max(max_id.unwrap_or(0) + 1);

        let record = draft.into_record(id, Utc::now());

        sqlx::query(
            "INSERT INTO history (id, session, order_number, status, from_name, from_code, \
             from_city, to_name, to_code, to_city, departure, arrival, duration, train_name, \
             class, price, passengers, travel_date, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id)
        .bind(&self.session)
        .bind(&record.order_number)
        .bind(record.status.as_str())
        .bind(&record.route.from.name)
        .bind(&record.route.from.code)
        .bind(&record.route.from.city)
        .bind(&record.route.to.name)
        .bind(&record.route.to.code)
        .bind(&record.route.to.city)
        .bind(&record.departure)
        .bind(&record.arrival)
        .bind(&record.duration)
        .bind(&record.train_name)
        .bind(&record.class)
        .bind(record.price)
        .bind(record.passengers as i64)
        .bind(record.date.format("%Y-%m-%d").to_string())
        .bind(record.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        for detail in &details {
            sqlx::query(
                "INSERT INTO history_passengers \
                 (history_id, full_name, identity_number, identity_type, passenger_type) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(record.id)
            .bind(&detail.full_name)
            .bind(&detail.identity_number)
            .bind(&detail.identity_type)
            .bind(&detail.passenger_type)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;
        Ok(record)
    }

    async fn update_status(
        &self,
        id: i64,
        status: BookingStatus,
    ) -> CoreResult<Vec<BookingRecord>> {
        // Absent id is a documented no-op: zero rows affected, history
        // returned unchanged.
        sqlx::query("UPDATE history SET status = ? WHERE id = ? AND session = ?")
            .bind(status.as_str())
            .bind(id)
            .bind(&self.session)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        self.fetch_history().await
    }

    async fn delete_item(&self, id: i64) -> CoreResult<Vec<BookingRecord>> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        sqlx::query(
            "DELETE FROM history_passengers WHERE history_id IN \
             (SELECT id FROM history WHERE id = ? AND session = ?)",
        )
        .bind(id)
        .bind(&self.session)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
        sqlx::query("DELETE FROM history WHERE id = ? AND session = ?")
            .bind(id)
            .bind(&self.session)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;
        self.fetch_history().await
    }

    async fn get_profile(&self) -> CoreResult<UserProfile> {
        let blob: Option<String> =
            sqlx::query_scalar("SELECT data FROM profiles WHERE session = ?")
                .bind(&self.session)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        match blob {
            Some(blob) => match serde_json::from_str(&blob) {
                Ok(profile) => Ok(profile),
                Err(e) => {
                    warn!(session = %self.session, error = %e, "corrupt profile blob");
                    Ok(UserProfile::default())
                }
            },
            None => Ok(UserProfile::default()),
        }
    }

    async fn update_profile(&self, update: ProfileUpdate) -> CoreResult<UserProfile> {
        let merged = self.get_profile().await?.merged(update);
        let blob = serde_json::to_string(&merged)
            .map_err(|e| CoreError::Persistence(e.to_string()))?;
        sqlx::query(
            "INSERT INTO profiles (session, data) VALUES (?, ?) \
             ON CONFLICT(session) DO UPDATE SET data = excluded.data",
        )
        .bind(&self.session)
        .bind(blob)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(merged)
    }

    async fn clear_all(&self) -> CoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        sqlx::query(
            "DELETE FROM history_passengers WHERE history_id IN \
             (SELECT id FROM history WHERE session = ?)",
        )
        .bind(&self.session)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
        sqlx::query("DELETE FROM history WHERE session = ?")
            .bind(&self.session)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        sqlx::query("DELETE FROM profiles WHERE session = ?")
            .bind(&self.session)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        tx.commit().await.map_err(db_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DbClient;
    use std::sync::atomic::{AtomicU64, Ordering};

    static DB_SEQ: AtomicU64 = AtomicU64::new(0);

    async fn temp_store() -> SqliteHistoryStore {
        let path = std::env::temp_dir().join(format!(
            "kereta-history-test-{}-{}.db",
            std::process::id(),
            DB_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        let _ = std::fs::remove_file(&path);
        let db = DbClient::new(&format!("sqlite://{}", path.display()))
            .await
            .unwrap();
        db.migrate().await.unwrap();
        SqliteHistoryStore::new(db.pool, "test-session")
    }

    fn draft(order_number: &str) -> BookingDraft {
        BookingDraft {
            order_number: order_number.to_string(),
            status: BookingStatus::Upcoming,
            route: Route {
                from: StationRef::new("Gambir", "GMR", "Jakarta"),
                to: StationRef::new("Surabaya Gubeng", "SGU", "Surabaya"),
            },
            departure: "08:00".to_string(),
            arrival: "15:30".to_string(),
            duration: "7 jam 30 menit".to_string(),
            train_name: "Argo Bromo Anggrek".to_string(),
            class: "Eksekutif".to_string(),
            price: 450_000,
            passengers: 2,
            date: NaiveDate::from_ymd_opt(2023, 11, 15).unwrap(),
        }
    }

    #[tokio::test]
    async fn round_trips_a_record_through_sql() {
        let store = temp_store().await;
        let created = store.add_history_item(draft("TK-20231115-001")).await.unwrap();

        let history = store.get_history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, created.id);
        assert_eq!(history[0].order_number, "TK-20231115-001");
        assert_eq!(history[0].route.to.code, "SGU");
        assert_eq!(history[0].price, 450_000);
        assert_eq!(history[0].passengers, 2);
    }

    #[tokio::test]
    async fn passenger_details_commit_with_the_booking() {
        let store = temp_store().await;
        let details = vec![
            PassengerDetail {
                full_name: "Andi Wijaya".to_string(),
                identity_number: "3175010101900001".to_string(),
                identity_type: "KTP".to_string(),
                passenger_type: "ADULT".to_string(),
            },
            PassengerDetail {
                full_name: "Sari Wijaya".to_string(),
                identity_number: "3175010101920002".to_string(),
                identity_type: "KTP".to_string(),
                passenger_type: "ADULT".to_string(),
            },
        ];
        let created = store
            .add_history_item_with_passengers(draft("TK-20231115-001"), details)
            .await
            .unwrap();

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM history_passengers WHERE history_id = ?",
        )
        .bind(created.id)
        .fetch_one(&store.pool)
        .await
        .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn duplicate_order_number_maps_to_duplicate_error() {
        let store = temp_store().await;
        store.add_history_item(draft("TK-20231115-001")).await.unwrap();
        let err = store.add_history_item(draft("TK-20231115-001")).await.unwrap_err();
        assert!(matches!(err, CoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn update_status_is_tolerant_and_scoped() {
        let store = temp_store().await;
        let created = store.add_history_item(draft("TK-20231115-001")).await.unwrap();

        let unchanged = store.update_status(9999, BookingStatus::Cancelled).await.unwrap();
        assert_eq!(unchanged[0].status, BookingStatus::Upcoming);

        let after = store
            .update_status(created.id, BookingStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(after[0].status, BookingStatus::Cancelled);
        assert_eq!(after[0].order_number, created.order_number);
        assert_eq!(after[0].created_at, created.created_at);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = temp_store().await;
        store.add_history_item(draft("TK-20231115-001")).await.unwrap();

        let other = SqliteHistoryStore::new(store.pool.clone(), "other-session");
        assert!(other.get_history().await.unwrap().is_empty());
        // Same order number is fine in a different session.
        other.add_history_item(draft("TK-20231115-001")).await.unwrap();
    }

    #[tokio::test]
    async fn clear_all_resets_history_and_profile() {
        let store = temp_store().await;
        store.add_history_item(draft("TK-20231115-001")).await.unwrap();
        store
            .update_profile(ProfileUpdate {
                first_name: Some("Budi".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        store.clear_all().await.unwrap();
        store.clear_all().await.unwrap();

        assert!(store.get_history().await.unwrap().is_empty());
        assert_eq!(store.get_profile().await.unwrap(), UserProfile::default());
    }
}
