//! Car endpoints

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use docrel_core::dealership::Car;

use crate::http::error::ApiError;
use crate::http::extractors::{JsonPayload, QueryPayload};
use crate::state::AppState;

/// GET /cars - exact filters plus an inclusive `minPrice`/`maxPrice` range
async fn list_cars(
    State(state): State<Arc<AppState>>,
    query: QueryPayload,
) -> Result<Json<Vec<Car>>, ApiError> {
    let cars = state.dealership.list_cars(&query.into_value()).await?;
    Ok(Json(cars))
}

/// POST /cars - create a car, optionally under a dealer and salespeople
async fn create_car(
    State(state): State<Arc<AppState>>,
    JsonPayload(payload): JsonPayload,
) -> Result<(StatusCode, Json<Car>), ApiError> {
    let car = state.dealership.create_car(&payload).await?;
    Ok((StatusCode::CREATED, Json(car)))
}

/// Car routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/cars", get(list_cars).post(create_car))
}
