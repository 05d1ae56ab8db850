use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use kereta_core::schedule::{Train, TrainSchedule};
use kereta_core::stations::{self, Station};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/stations", get(list_stations))
        .route("/api/trains", get(list_trains))
        .route("/api/schedules", get(search_schedules))
}

#[derive(Debug, Deserialize)]
struct StationQuery {
    #[serde(default)]
    q: String,
}

/// Full reference list, or the autocomplete subset when `q` is given.
async fn list_stations(
    State(state): State<AppState>,
    Query(query): Query<StationQuery>,
) -> Result<Json<Vec<Station>>, AppError> {
    let all = state.schedules.list_stations().await?;
    Ok(Json(stations::search(&all, &query.q)))
}

async fn list_trains(State(state): State<AppState>) -> Result<Json<Vec<Train>>, AppError> {
    Ok(Json(state.schedules.list_trains().await?))
}

#[derive(Debug, Deserialize)]
struct ScheduleQuery {
    #[serde(default)]
    from: String,
    #[serde(default)]
    to: String,
}

async fn search_schedules(
    State(state): State<AppState>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<Vec<TrainSchedule>>, AppError> {
    let schedules = state.schedules.search_schedules(&query.from, &query.to).await?;
    Ok(Json(schedules))
}
