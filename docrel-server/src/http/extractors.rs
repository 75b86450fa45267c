//! Custom Axum extractors
//!
//! Both hand the core a decoded JSON value and leave all checking to its
//! validators, so malformed input and invalid input produce the same error shape.

use std::collections::HashMap;

use axum::extract::{FromRequest, FromRequestParts, Json, Query, Request};
use axum::http::request::Parts;
use serde_json::{Map, Value};

use super::error::ApiError;

/// JSON request body, any shape
pub struct JsonPayload(pub Value);

impl<S> FromRequest<S> for JsonPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest {
                message: e.body_text(),
            })?;
        Ok(Self(value))
    }
}

/// Query string as a JSON object of strings
pub struct QueryPayload(pub Map<String, Value>);

impl QueryPayload {
    /// Add a path parameter alongside the query keys.
    pub fn with(mut self, key: &str, value: String) -> Value {
        self.0.insert(key.to_owned(), Value::String(value));
        Value::Object(self.0)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl<S> FromRequestParts<S> for QueryPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params): Query<HashMap<String, String>> =
            Query::from_request_parts(parts, state)
                .await
                .map_err(|e| ApiError::BadRequest {
                    message: e.body_text(),
                })?;

        Ok(Self(
            params
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect(),
        ))
    }
}
