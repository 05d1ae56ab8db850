use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a booking. Records are created `Upcoming`; a cancel
/// action moves them to `Cancelled`. `Completed` is only ever set when a
/// record is seeded as demo data. Both `Completed` and `Cancelled` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Upcoming,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Upcoming => "upcoming",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "upcoming" => Some(BookingStatus::Upcoming),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One end of a route: display name, short code, and city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationRef {
    pub name: String,
    pub code: String,
    pub city: String,
}

impl StationRef {
    pub fn new(name: impl Into<String>, code: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            city: city.into(),
        }
    }

    /// Rendered form used in search and on tickets, e.g. `Gambir (GMR)`.
    pub fn display(&self) -> String {
        format!("{} ({})", self.name, self.code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub from: StationRef,
    pub to: StationRef,
}

/// A persisted booking. `id`, `order_number`, `created_at` and all route,
/// schedule and train fields are immutable once created; only `status` may
/// change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: i64,
    pub order_number: String,
    pub status: BookingStatus,
    pub route: Route,
    pub departure: String,
    pub arrival: String,
    pub duration: String,
    pub train_name: String,
    pub class: String,
    pub price: i64,
    pub passengers: u32,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// A booking as the caller hands it to the store. The store assigns `id`
/// and `created_at` when the draft is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingDraft {
    pub order_number: String,
    pub status: BookingStatus,
    pub route: Route,
    pub departure: String,
    pub arrival: String,
    pub duration: String,
    pub train_name: String,
    pub class: String,
    pub price: i64,
    pub passengers: u32,
    pub date: NaiveDate,
}

impl BookingDraft {
    pub fn into_record(self, id: i64, created_at: DateTime<Utc>) -> BookingRecord {
        BookingRecord {
            id,
            order_number: self.order_number,
            status: self.status,
            route: self.route,
            departure: self.departure,
            arrival: self.arrival,
            duration: self.duration,
            train_name: self.train_name,
            class: self.class,
            price: self.price,
            passengers: self.passengers,
            date: self.date,
            created_at,
        }
    }
}

/// Identity details for one traveller on a booking. Backends without
/// passenger sub-records keep only the count on the record itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassengerDetail {
    pub full_name: String,
    pub identity_number: String,
    #[serde(default = "default_identity_type")]
    pub identity_type: String,
    #[serde(default = "default_passenger_type")]
    pub passenger_type: String,
}

fn default_identity_type() -> String {
    "KTP".to_string()
}

fn default_passenger_type() -> String {
    "ADULT".to_string()
}

/// Whole-hour duration between two `HH:MM` times, wrapping past midnight
/// for overnight arrivals. Falls back to an empty string on unparseable
/// input rather than failing the record.
pub fn duration_between(departure: &str, arrival: &str) -> String {
    let parse = |s: &str| NaiveTime::parse_from_str(s, "%H:%M").ok();
    match (parse(departure), parse(arrival)) {
        (Some(dep), Some(arr)) => {
            let mut minutes = (arr - dep).num_minutes();
            if minutes < 0 {
                minutes += 24 * 60;
            }
            let hours = minutes / 60;
            let rest = minutes % 60;
            if rest == 0 {
                format!("{} jam", hours)
            } else {
                format!("{} jam {} menit", hours, rest)
            }
        }
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(BookingStatus::parse("Upcoming"), Some(BookingStatus::Upcoming));
        assert_eq!(BookingStatus::parse("CANCELLED"), Some(BookingStatus::Cancelled));
        assert_eq!(BookingStatus::parse("refunded"), None);
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&BookingStatus::Upcoming).unwrap();
        assert_eq!(json, "\"upcoming\"");
    }

    #[test]
    fn station_display_includes_code() {
        let gambir = StationRef::new("Gambir", "GMR", "Jakarta");
        assert_eq!(gambir.display(), "Gambir (GMR)");
    }

    #[test]
    fn duration_spans_midnight() {
        assert_eq!(duration_between("08:00", "15:30"), "7 jam 30 menit");
        assert_eq!(duration_between("21:00", "05:30"), "8 jam 30 menit");
        assert_eq!(duration_between("10:00", "16:00"), "6 jam");
        assert_eq!(duration_between("bogus", "16:00"), "");
    }
}
