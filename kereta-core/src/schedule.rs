use serde::{Deserialize, Serialize};

use crate::history::{Route, StationRef};

/// A train's route/time offering, searchable by endpoints. Reference data
/// for the local backend; the SQL backend serves the same shape out of its
/// `train_schedules` join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainSchedule {
    pub id: i64,
    pub train_name: String,
    pub class: String,
    pub from: StationRef,
    pub to: StationRef,
    pub departure: String,
    pub arrival: String,
    pub duration: String,
    pub price: i64,
    pub seats: u32,
}

impl TrainSchedule {
    pub fn route(&self) -> Route {
        Route {
            from: self.from.clone(),
            to: self.to.clone(),
        }
    }
}

/// A train as reference data: name, fare class, and base price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Train {
    pub id: i64,
    pub name: String,
    pub class: String,
    pub base_price: i64,
}

/// Distinct trains out of a schedule set, ordered by name.
pub fn trains_from(schedules: &[TrainSchedule]) -> Vec<Train> {
    let mut trains: Vec<Train> = schedules
        .iter()
        .map(|s| Train {
            id: s.id,
            name: s.train_name.clone(),
            class: s.class.clone(),
            base_price: s.price,
        })
        .collect();
    trains.sort_by(|a, b| a.name.cmp(&b.name));
    trains.dedup_by(|a, b| a.name == b.name);
    trains
}

/// Demo schedule set, matching the seeded SQL data.
pub fn seed_schedules() -> Vec<TrainSchedule> {
    vec![
        TrainSchedule {
            id: 1,
            train_name: "Argo Bromo Anggrek".to_string(),
            class: "Eksekutif".to_string(),
            from: StationRef::new("Gambir", "GMR", "Jakarta"),
            to: StationRef::new("Surabaya Gubeng", "SGU", "Surabaya"),
            departure: "08:00".to_string(),
            arrival: "15:30".to_string(),
            duration: "7 jam 30 menit".to_string(),
            price: 450_000,
            seats: 42,
        },
        TrainSchedule {
            id: 2,
            train_name: "Taksaka".to_string(),
            class: "Eksekutif".to_string(),
            from: StationRef::new("Gambir", "GMR", "Jakarta"),
            to: StationRef::new("Yogyakarta", "YK", "Yogyakarta"),
            departure: "10:30".to_string(),
            arrival: "16:45".to_string(),
            duration: "6 jam 15 menit".to_string(),
            price: 350_000,
            seats: 28,
        },
        TrainSchedule {
            id: 3,
            train_name: "Sembrani".to_string(),
            class: "Bisnis".to_string(),
            from: StationRef::new("Gambir", "GMR", "Jakarta"),
            to: StationRef::new("Surabaya Gubeng", "SGU", "Surabaya"),
            departure: "21:00".to_string(),
            arrival: "05:30".to_string(),
            duration: "8 jam 30 menit".to_string(),
            price: 280_000,
            seats: 56,
        },
    ]
}

/// Endpoint filter used by schedule search: case-insensitive substring on
/// the origin/destination station names, blank filters match everything.
/// Order of the input (departure time) is preserved.
pub fn search_schedules(schedules: &[TrainSchedule], from: &str, to: &str) -> Vec<TrainSchedule> {
    let from = from.trim().to_lowercase();
    let to = to.trim().to_lowercase();
    schedules
        .iter()
        .filter(|s| from.is_empty() || s.from.name.to_lowercase().contains(&from))
        .filter(|s| to.is_empty() || s.to.name.to_lowercase().contains(&to))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_filters_both_endpoints() {
        let schedules = seed_schedules();
        let hits = search_schedules(&schedules, "gambir", "yogya");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].train_name, "Taksaka");
    }

    #[test]
    fn blank_filters_match_everything() {
        let schedules = seed_schedules();
        assert_eq!(search_schedules(&schedules, "", "").len(), schedules.len());
    }
}
