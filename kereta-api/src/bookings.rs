use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use kereta_core::booking::BookingService;
use kereta_core::filter::{self, Category};
use kereta_core::history::{BookingRecord, BookingStatus, PassengerDetail};
use kereta_core::stats::{self, HistoryStats};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/bookings", get(list_bookings).post(create_booking))
        .route("/api/bookings/stats", get(booking_stats))
        .route("/api/bookings/{id}/status", put(update_status))
        .route("/api/bookings/{id}", axum::routing::delete(delete_booking))
        .route("/api/reset", post(reset_history))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateBookingRequest {
    schedule_id: i64,
    date: NaiveDate,
    #[serde(default)]
    passengers: u32,
    #[serde(default)]
    passenger_details: Vec<PassengerDetail>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateBookingResponse {
    booking_id: i64,
    booking_number: String,
    message: String,
}

async fn create_booking(
    State(state): State<AppState>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Json<CreateBookingResponse>, AppError> {
    let schedules = state.schedules.search_schedules("", "").await?;
    let schedule = schedules
        .iter()
        .find(|s| s.id == req.schedule_id)
        .ok_or_else(|| AppError::NotFoundError("Schedule not found".to_string()))?;

    let service = BookingService::new(Arc::clone(&state.history));
    let record = service
        .create_booking_with_passengers(schedule, req.date, req.passengers, req.passenger_details)
        .await?;

    Ok(Json(CreateBookingResponse {
        booking_id: record.id,
        booking_number: record.order_number,
        message: "Booking created successfully".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    #[serde(default)]
    category: String,
    #[serde(default)]
    q: String,
}

/// Category and free-text filters are applied server-side over the session
/// history, in that order. Both default to pass-through.
async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<BookingRecord>>, AppError> {
    let history = state.history.get_history().await?;
    let by_category = filter::filter_by_category(&history, Category::parse(&query.category));
    let matched = filter::search_text(&by_category, &query.q);
    Ok(Json(matched))
}

async fn booking_stats(State(state): State<AppState>) -> Result<Json<HistoryStats>, AppError> {
    let history = state.history.get_history().await?;
    Ok(Json(stats::aggregate(&history)))
}

#[derive(Debug, Deserialize)]
struct UpdateStatusRequest {
    status: String,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let status = BookingStatus::parse(&req.status).ok_or_else(|| {
        AppError::ValidationError(format!("Unknown booking status: {}", req.status))
    })?;

    state.history.update_status(id, status).await?;
    info!(booking_id = id, status = %status, "booking status updated");
    Ok(Json(MessageResponse {
        message: "Booking status updated successfully".to_string(),
    }))
}

async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    state.history.delete_item(id).await?;
    Ok(Json(MessageResponse {
        message: "Booking deleted".to_string(),
    }))
}

async fn reset_history(State(state): State<AppState>) -> Result<Json<MessageResponse>, AppError> {
    state.history.clear_all().await?;
    Ok(Json(MessageResponse {
        message: "History cleared".to_string(),
    }))
}
