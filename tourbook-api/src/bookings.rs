use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tourbook_core::{Booking, CoreError, CreateBookingRequest};

use crate::error::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct EmailQuery {
    email: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", post(create_booking).get(list_bookings))
        .route("/bookings/{id}", get(get_booking))
}

async fn create_booking(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    // An unknown tour id is a bad request body here, not a missing resource.
    let booking = state.bookings.create_booking(req).await.map_err(|e| match e {
        CoreError::NotFound(msg) => AppError::ValidationError(msg),
        other => AppError::from(other),
    })?;
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn get_booking(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.bookings.get_booking(id).await?))
}

async fn list_bookings(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<EmailQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let email = query
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::ValidationError("email query parameter is required".to_string()))?;

    Ok(Json(state.bookings.list_bookings_by_email(email).await?))
}
