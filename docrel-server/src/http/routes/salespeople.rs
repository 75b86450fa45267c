//! Salesperson endpoints, including the two link operations

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use docrel_core::dealership::Salesperson;

use crate::http::error::ApiError;
use crate::http::extractors::{JsonPayload, QueryPayload};
use crate::state::AppState;

/// GET /salespeople
async fn list_salespeople(
    State(state): State<Arc<AppState>>,
    query: QueryPayload,
) -> Result<Json<Vec<Salesperson>>, ApiError> {
    let people = state.dealership.list_salespeople(&query.into_value()).await?;
    Ok(Json(people))
}

/// POST /salespeople
async fn create_salesperson(
    State(state): State<Arc<AppState>>,
    JsonPayload(payload): JsonPayload,
) -> Result<(StatusCode, Json<Salesperson>), ApiError> {
    let person = state.dealership.create_salesperson(&payload).await?;
    Ok((StatusCode::CREATED, Json(person)))
}

/// POST /salespeople/dealer - `{ dealerID, salespersonID }`, overwrites
async fn assign_dealer(
    State(state): State<Arc<AppState>>,
    JsonPayload(payload): JsonPayload,
) -> Result<Json<Salesperson>, ApiError> {
    let person = state.dealership.assign_dealer(&payload).await?;
    Ok(Json(person))
}

/// POST /salespeople/cars - `{ salespersonID, carID }`, appends
async fn assign_car(
    State(state): State<Arc<AppState>>,
    JsonPayload(payload): JsonPayload,
) -> Result<Json<Salesperson>, ApiError> {
    let person = state.dealership.assign_car(&payload).await?;
    Ok(Json(person))
}

/// Salesperson routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/salespeople", get(list_salespeople).post(create_salesperson))
        .route("/salespeople/dealer", post(assign_dealer))
        .route("/salespeople/cars", post(assign_car))
}
