use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::history::{
    duration_between, BookingDraft, BookingRecord, BookingStatus, PassengerDetail,
};
use crate::repository::HistoryStore;
use crate::schedule::TrainSchedule;
use crate::{CoreError, CoreResult};

/// Creates booking records from a selected schedule and writes them through
/// the record store. The single side effect per booking is one store write.
pub struct BookingService {
    store: Arc<dyn HistoryStore>,
}

impl BookingService {
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self { store }
    }

    /// Validates the selection, generates the order number, and persists a
    /// new `Upcoming` record. A non-positive passenger count clamps to 1
    /// rather than failing; missing route or train data is a validation
    /// error.
    pub async fn create_booking(
        &self,
        schedule: &TrainSchedule,
        travel_date: NaiveDate,
        passengers: u32,
    ) -> CoreResult<BookingRecord> {
        self.create_booking_with_passengers(schedule, travel_date, passengers, Vec::new())
            .await
    }

    /// Booking creation carrying traveller identity details for backends
    /// that persist passenger sub-records. The record and its sub-records
    /// are written as one store operation.
    pub async fn create_booking_with_passengers(
        &self,
        schedule: &TrainSchedule,
        travel_date: NaiveDate,
        passengers: u32,
        details: Vec<PassengerDetail>,
    ) -> CoreResult<BookingRecord> {
        if schedule.train_name.trim().is_empty() {
            return Err(CoreError::Validation("Train name is required".to_string()));
        }
        if schedule.from.name.trim().is_empty() || schedule.to.name.trim().is_empty() {
            return Err(CoreError::Validation(
                "Origin and destination stations are required".to_string(),
            ));
        }
        if schedule.price < 0 {
            return Err(CoreError::Validation("Price must not be negative".to_string()));
        }

        let passengers = passengers.max(1);
        let order_number = self.next_order_number(travel_date).await?;

        let duration = if schedule.duration.is_empty() {
            duration_between(&schedule.departure, &schedule.arrival)
        } else {
            schedule.duration.clone()
        };

        let draft = BookingDraft {
            order_number,
            status: BookingStatus::Upcoming,
            route: schedule.route(),
            departure: schedule.departure.clone(),
            arrival: schedule.arrival.clone(),
            duration,
            train_name: schedule.train_name.clone(),
            class: schedule.class.clone(),
            price: schedule.price,
            passengers,
            date: travel_date,
        };

        let record = self
            .store
            .add_history_item_with_passengers(draft, details)
            .await?;
        info!(
            order_number = %record.order_number,
            train = %record.train_name,
            "booking created"
        );
        Ok(record)
    }

    /// Order numbers are `TK-YYYYMMDD-NNN`, with the sequence scoped to the
    /// travel date within this store. The next number comes from the highest
    /// suffix still present, so deleted bookings never free a number for
    /// reuse. One logical writer per session keeps the sequence
    /// collision-free.
    async fn next_order_number(&self, travel_date: NaiveDate) -> CoreResult<String> {
        let prefix = format!("TK-{}-", travel_date.format("%Y%m%d"));
        let history = self.store.get_history().await?;
        let max_suffix = history
            .iter()
            .filter_map(|r| r.order_number.strip_prefix(&prefix))
            .filter_map(|suffix| suffix.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        Ok(format!("{}{:03}", prefix, max_suffix + 1))
    }
}
