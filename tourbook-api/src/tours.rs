use axum::{extract::State, routing::get, Json, Router};
use tourbook_core::search::TourListQuery;
use tourbook_core::{FilterOptions, Tour, TourPage};

use crate::error::AppError;
use crate::extract::{AppPath, AppQuery};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tours", get(list_tours))
        .route("/tours/filters", get(filter_options))
        .route("/tours/{id}", get(get_tour))
}

async fn list_tours(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<TourListQuery>,
) -> Result<Json<TourPage>, AppError> {
    let (filter, page) = query.into_parts()?;
    let result = state.tours.list_tours(&filter, page).await?;
    Ok(Json(result))
}

async fn get_tour(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Tour>, AppError> {
    Ok(Json(state.tours.get_tour(id).await?))
}

async fn filter_options(State(state): State<AppState>) -> Result<Json<FilterOptions>, AppError> {
    Ok(Json(state.tours.filter_options().await?))
}
