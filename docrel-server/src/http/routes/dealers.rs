//! Dealer endpoints

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use docrel_core::dealership::Dealer;

use crate::http::error::ApiError;
use crate::http::extractors::{JsonPayload, QueryPayload};
use crate::state::AppState;

/// GET /dealers - filter by id/address/location, window with `first`/`after`
async fn list_dealers(
    State(state): State<Arc<AppState>>,
    query: QueryPayload,
) -> Result<Json<Vec<Dealer>>, ApiError> {
    let dealers = state.dealership.list_dealers(&query.into_value()).await?;
    Ok(Json(dealers))
}

/// POST /dealers - create a dealer
async fn create_dealer(
    State(state): State<Arc<AppState>>,
    JsonPayload(payload): JsonPayload,
) -> Result<(StatusCode, Json<Dealer>), ApiError> {
    let dealer = state.dealership.create_dealer(&payload).await?;
    Ok((StatusCode::CREATED, Json(dealer)))
}

/// Dealer routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/dealers", get(list_dealers).post(create_dealer))
}
