use async_trait::async_trait;
use sqlx::{Pool, Sqlite};

use kereta_core::history::StationRef;
use kereta_core::repository::ScheduleSource;
use kereta_core::schedule::{self, Train, TrainSchedule};
use kereta_core::stations::{self, Station};
use kereta_core::{CoreError, CoreResult};

/// Reference data served from the built-in demo set. Backs the local
/// storage variant, where no database is around.
pub struct StaticScheduleSource {
    stations: Vec<Station>,
    schedules: Vec<TrainSchedule>,
}

impl StaticScheduleSource {
    pub fn new() -> Self {
        Self {
            stations: stations::reference_stations(),
            schedules: schedule::seed_schedules(),
        }
    }
}

impl Default for StaticScheduleSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScheduleSource for StaticScheduleSource {
    async fn list_stations(&self) -> CoreResult<Vec<Station>> {
        let mut stations = self.stations.clone();
        stations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(stations)
    }

    async fn list_trains(&self) -> CoreResult<Vec<Train>> {
        Ok(schedule::trains_from(&self.schedules))
    }

    async fn search_schedules(&self, from: &str, to: &str) -> CoreResult<Vec<TrainSchedule>> {
        Ok(schedule::search_schedules(&self.schedules, from, to))
    }
}

/// Reference data out of the relational schema: schedules join trains and
/// both endpoint stations, like the service's search query.
pub struct SqliteScheduleSource {
    pool: Pool<Sqlite>,
}

impl SqliteScheduleSource {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct StationRow {
    station_id: i64,
    station_name: String,
    city: String,
    code: String,
}

#[derive(sqlx::FromRow)]
struct TrainRow {
    train_id: i64,
    train_name: String,
    class: String,
    base_price: i64,
}

#[derive(sqlx::FromRow)]
struct ScheduleRow {
    schedule_id: i64,
    train_name: String,
    class: String,
    base_price: i64,
    seats: i64,
    departure_time: String,
    arrival_time: String,
    from_station_name: String,
    from_code: String,
    from_city: String,
    to_station_name: String,
    to_code: String,
    to_city: String,
}

impl ScheduleRow {
    fn into_schedule(self) -> TrainSchedule {
        let duration =
            kereta_core::history::duration_between(&self.departure_time, &self.arrival_time);
        TrainSchedule {
            id: self.schedule_id,
            train_name: self.train_name,
            class: self.class,
            from: StationRef::new(self.from_station_name, self.from_code, self.from_city),
            to: StationRef::new(self.to_station_name, self.to_code, self.to_city),
            departure: self.departure_time,
            arrival: self.arrival_time,
            duration,
            price: self.base_price,
            seats: self.seats.max(0) as u32,
        }
    }
}

fn db_err(e: sqlx::Error) -> CoreError {
    CoreError::Persistence(e.to_string())
}

#[async_trait]
impl ScheduleSource for SqliteScheduleSource {
    async fn list_stations(&self) -> CoreResult<Vec<Station>> {
        let rows = sqlx::query_as::<_, StationRow>(
            "SELECT station_id, station_name, city, code FROM train_stations \
             ORDER BY station_name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows
            .into_iter()
            .map(|r| Station {
                id: r.station_id,
                name: r.station_name,
                city: r.city,
                code: r.code,
            })
            .collect())
    }

    async fn list_trains(&self) -> CoreResult<Vec<Train>> {
        let rows = sqlx::query_as::<_, TrainRow>(
            "SELECT train_id, train_name, class, base_price FROM trains \
             WHERE status = 'ACTIVE' ORDER BY train_name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows
            .into_iter()
            .map(|r| Train {
                id: r.train_id,
                name: r.train_name,
                class: r.class,
                base_price: r.base_price,
            })
            .collect())
    }

    async fn search_schedules(&self, from: &str, to: &str) -> CoreResult<Vec<TrainSchedule>> {
        let rows = sqlx::query_as::<_, ScheduleRow>(
            "SELECT ts.schedule_id, t.train_name, t.class, t.base_price, ts.seats, \
                    ts.departure_time, ts.arrival_time, \
                    fs.station_name AS from_station_name, fs.code AS from_code, \
                    fs.city AS from_city, \
                    ts2.station_name AS to_station_name, ts2.code AS to_code, \
                    ts2.city AS to_city \
             FROM train_schedules ts \
             JOIN trains t ON ts.train_id = t.train_id \
             JOIN train_stations fs ON ts.from_station_id = fs.station_id \
             JOIN train_stations ts2 ON ts.to_station_id = ts2.station_id \
             WHERE ts.status = 'ACTIVE' \
               AND (? = '' OR fs.station_name LIKE '%' || ? || '%') \
               AND (? = '' OR ts2.station_name LIKE '%' || ? || '%') \
             ORDER BY ts.departure_time",
        )
        .bind(from)
        .bind(from)
        .bind(to)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(ScheduleRow::into_schedule).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DbClient;
    use std::sync::atomic::{AtomicU64, Ordering};

    static DB_SEQ: AtomicU64 = AtomicU64::new(0);

    async fn seeded_source() -> SqliteScheduleSource {
        let path = std::env::temp_dir().join(format!(
            "kereta-schedule-test-{}-{}.db",
            std::process::id(),
            DB_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        let _ = std::fs::remove_file(&path);
        let db = DbClient::new(&format!("sqlite://{}", path.display()))
            .await
            .unwrap();
        db.migrate().await.unwrap();
        SqliteScheduleSource::new(db.pool)
    }

    #[tokio::test]
    async fn stations_come_back_ordered_by_name() {
        let source = seeded_source().await;
        let stations = source.list_stations().await.unwrap();
        assert_eq!(stations.len(), 10);
        let names: Vec<_> = stations.iter().map(|s| s.name.clone()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[tokio::test]
    async fn schedule_search_filters_on_endpoints() {
        let source = seeded_source().await;
        let hits = source.search_schedules("Gambir", "Yogya").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].train_name, "Taksaka");
        assert_eq!(hits[0].duration, "6 jam 15 menit");

        let all = source.search_schedules("", "").await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn static_source_matches_seed_set() {
        let source = StaticScheduleSource::new();
        assert_eq!(source.schedules.len(), 3);
        assert_eq!(source.stations.len(), 10);
    }
}
