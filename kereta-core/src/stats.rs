use serde::{Deserialize, Serialize};

use crate::history::{BookingRecord, BookingStatus};

/// Counters derived from a history snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub count: u64,
    pub total_spent: i64,
    pub upcoming_count: u64,
    pub completed_count: u64,
    pub cancelled_count: u64,
}

/// Single pass over the records. `total_spent` accumulates the unit price
/// of every record regardless of status, so cancelled bookings still count
/// toward spend. That mirrors the stored-history semantics the UI reports.
pub fn aggregate(records: &[BookingRecord]) -> HistoryStats {
    let mut stats = HistoryStats::default();
    for record in records {
        stats.count += 1;
        match record.status {
            BookingStatus::Upcoming => stats.upcoming_count += 1,
            BookingStatus::Completed => stats.completed_count += 1,
            BookingStatus::Cancelled => stats.cancelled_count += 1,
        }
        stats.total_spent += record.price;
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{BookingDraft, Route, StationRef};
    use chrono::{NaiveDate, Utc};

    fn record(id: i64, price: i64, status: BookingStatus) -> BookingRecord {
        BookingDraft {
            order_number: format!("TK-20231115-{:03}", id),
            status,
            route: Route {
                from: StationRef::new("Gambir", "GMR", "Jakarta"),
                to: StationRef::new("Surabaya Gubeng", "SGU", "Surabaya"),
            },
            departure: "08:00".to_string(),
            arrival: "15:30".to_string(),
            duration: "7 jam 30 menit".to_string(),
            train_name: "Argo Bromo Anggrek".to_string(),
            class: "Eksekutif".to_string(),
            price,
            passengers: 1,
            date: NaiveDate::from_ymd_opt(2023, 11, 15).unwrap(),
        }
        .into_record(id, Utc::now())
    }

    #[test]
    fn empty_history_is_all_zero() {
        assert_eq!(aggregate(&[]), HistoryStats::default());
    }

    #[test]
    fn counts_and_spend_across_statuses() {
        let records = vec![
            record(1, 450_000, BookingStatus::Completed),
            record(2, 350_000, BookingStatus::Upcoming),
            record(3, 280_000, BookingStatus::Completed),
        ];
        let stats = aggregate(&records);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.total_spent, 1_080_000);
        assert_eq!(stats.completed_count, 2);
        assert_eq!(stats.upcoming_count, 1);
        assert_eq!(stats.cancelled_count, 0);
    }

    #[test]
    fn cancelled_records_still_count_toward_spend() {
        let records = vec![record(1, 100_000, BookingStatus::Cancelled)];
        let stats = aggregate(&records);
        assert_eq!(stats.cancelled_count, 1);
        assert_eq!(stats.total_spent, 100_000);
    }
}
